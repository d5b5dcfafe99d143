//! Batch validation and mapping table checks.

mod validate;

pub use validate::{validate_lines, validate_tables, BatchSummary, ValidationResult};
