//! Intake of extraction-service results.

mod extraction;

pub use extraction::{parse_extraction, parse_extraction_file, ExtractionResult};
