//! Validation of transformed batches and of mapping tables.

use serde::Serialize;

use crate::mapping::MappingTables;
use crate::model::TransformedLine;

/// Validation result with warnings.
#[derive(Debug, Default)]
pub struct ValidationResult {
    /// Whether validation passed.
    pub passed: bool,
    /// Warning messages.
    pub warnings: Vec<String>,
    /// Error messages.
    pub errors: Vec<String>,
}

impl ValidationResult {
    /// Create a passing result.
    pub fn ok() -> Self {
        Self {
            passed: true,
            ..Default::default()
        }
    }

    /// Add a warning.
    pub fn add_warning(&mut self, message: impl Into<String>) {
        self.warnings.push(message.into());
    }

    /// Add an error.
    pub fn add_error(&mut self, message: impl Into<String>) {
        self.errors.push(message.into());
        self.passed = false;
    }

    /// Merge another result into this one.
    pub fn merge(&mut self, other: ValidationResult) {
        self.warnings.extend(other.warnings);
        self.errors.extend(other.errors);
        if !other.passed {
            self.passed = false;
        }
    }
}

/// Line counts of a transformed batch.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct BatchSummary {
    pub total: usize,
    pub ok: usize,
    pub errors: usize,
}

impl BatchSummary {
    pub fn of(lines: &[TransformedLine]) -> Self {
        let ok = lines.iter().filter(|line| line.is_ok()).count();
        Self {
            total: lines.len(),
            ok,
            errors: lines.len() - ok,
        }
    }
}

/// Report every line that did not resolve cleanly.
///
/// Erroneous lines are still written to documents; the caller decides
/// whether a failing result blocks generation.
pub fn validate_lines(lines: &[TransformedLine]) -> ValidationResult {
    let mut result = ValidationResult::ok();

    if lines.is_empty() {
        result.add_warning("Delivery note has no lines");
    }

    for (idx, line) in lines.iter().enumerate() {
        if let Some(detail) = &line.error_detail {
            result.add_error(format!(
                "Line {} ({}): {}",
                idx + 1,
                line.external_reference,
                detail
            ));
        }
    }

    result
}

/// Check mapping tables for product keys that shadow each other.
///
/// Resolution takes the first matching key in table order, so a key that
/// prefixes another one changes which product some references resolve to.
/// This is reported, never corrected.
pub fn validate_tables(tables: &MappingTables) -> ValidationResult {
    let mut result = ValidationResult::ok();
    let products: Vec<_> = tables.products.iter().collect();

    for (idx, earlier) in products.iter().enumerate() {
        for later in &products[idx + 1..] {
            if later.key.starts_with(earlier.key.as_str()) {
                result.add_warning(format!(
                    "Product key '{}' shadows later key '{}'",
                    earlier.key, later.key
                ));
            } else if earlier.key.starts_with(later.key.as_str()) {
                result.add_warning(format!(
                    "Product key '{}' overlaps later key '{}'",
                    earlier.key, later.key
                ));
            }
        }
    }

    result
}
