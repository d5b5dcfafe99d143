//! bl-core - Core library for delivery-note mapping and WMS import generation.
//!
//! Supplier delivery-note lines (already extracted to JSON by a
//! document-understanding service) are resolved against static mapping
//! tables into internal article codes, then laid out into the two import
//! workbooks of the warehouse management system: Bootstrap (new articles)
//! and Reception (expected shipment).
//!
//! # Example
//!
//! ```no_run
//! use bl_core::{generate_reception, parse_extraction_file, Batch, Layout, MappingTables};
//! use std::path::Path;
//!
//! let extraction = parse_extraction_file(Path::new("bl.json")).unwrap();
//! let tables = MappingTables::builtin();
//! let batch = Batch::from_extraction(tables, &extraction);
//! let header = extraction.header().unwrap();
//! let doc = generate_reception(header, &batch.lines, &tables.constants, Layout::Fresh).unwrap();
//! std::fs::write(&doc.filename, &doc.bytes).unwrap();
//! ```

pub mod config;
pub mod error;
pub mod generator;
pub mod mapping;
pub mod model;
pub mod parser;
pub mod transform;
pub mod validation;

// Re-exports for convenience
pub use config::FixedValues;
pub use error::{ConvertError, ErrorCode, Result};
pub use generator::{generate_bootstrap, generate_reception, DocumentKind, GeneratedDocument, Layout};
pub use mapping::{resolve_product_prefix, synthesize_code, MappingEntry, MappingTable, MappingTables};
pub use model::{LineStatus, RawLine, ShipmentHeader, TransformedLine};
pub use parser::{parse_extraction, parse_extraction_file, ExtractionResult};
pub use transform::{transform_line, transform_lines};
pub use validation::{validate_lines, validate_tables, BatchSummary, ValidationResult};

/// A transformed delivery note.
#[derive(Debug)]
pub struct Batch {
    /// Transformed lines, in delivery-note order.
    pub lines: Vec<TransformedLine>,
    /// One error per line that did not resolve cleanly.
    pub validation: ValidationResult,
    pub summary: BatchSummary,
}

impl Batch {
    /// Transform every line of an extraction result.
    ///
    /// The supplier for code synthesis comes from the shipment header,
    /// falling back to [`config::DEFAULT_SUPPLIER`].
    pub fn from_extraction(tables: &MappingTables, extraction: &ExtractionResult) -> Self {
        let lines = transform_lines(tables, &extraction.lignes, extraction.supplier());
        let validation = validate_lines(&lines);
        let summary = BatchSummary::of(&lines);

        tracing::info!(
            "Transformed {} line(s): {} ok, {} in error",
            summary.total,
            summary.ok,
            summary.errors
        );

        Self {
            lines,
            validation,
            summary,
        }
    }

    /// Check if every line resolved cleanly.
    pub fn is_clean(&self) -> bool {
        self.summary.errors == 0
    }
}
