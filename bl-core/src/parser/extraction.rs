//! Extraction result parsing.
//!
//! The document-understanding service answers with a JSON object, sometimes
//! wrapped in a Markdown code fence:
//!
//! ```text
//! {
//!   "infoBL": { "refCommande": "...", "dateLivraison": "2025-12-13", ... },
//!   "lignes": [ { "ref": "JH001PHXS", "couleur": "DEEP BLACK", ... } ]
//! }
//! ```

use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::config::DEFAULT_SUPPLIER;
use crate::error::{ConvertError, Result};
use crate::model::{RawLine, ShipmentHeader};

/// Structured delivery-note data.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExtractionResult {
    #[serde(rename = "infoBL", default)]
    pub info_bl: Option<ShipmentHeader>,
    #[serde(default)]
    pub lignes: Vec<RawLine>,
}

impl ExtractionResult {
    /// Supplier name used for code synthesis.
    pub fn supplier(&self) -> &str {
        self.info_bl
            .as_ref()
            .map(|header| header.supplier.as_str())
            .filter(|supplier| !supplier.is_empty())
            .unwrap_or(DEFAULT_SUPPLIER)
    }

    /// Get the shipment header, required for Reception documents.
    pub fn header(&self) -> Result<&ShipmentHeader> {
        self.info_bl.as_ref().ok_or(ConvertError::MissingHeader)
    }
}

/// Parse the service response text.
pub fn parse_extraction(text: &str) -> Result<ExtractionResult> {
    let json = strip_code_fence(text);
    let result: ExtractionResult = serde_json::from_str(json)?;
    tracing::debug!(
        "Extraction result: {} line(s), header {}",
        result.lignes.len(),
        if result.info_bl.is_some() { "present" } else { "missing" }
    );
    Ok(result)
}

/// Read and parse an extraction result file.
pub fn parse_extraction_file(path: &Path) -> Result<ExtractionResult> {
    let text = std::fs::read_to_string(path).map_err(|source| ConvertError::ReadFile {
        path: path.to_path_buf(),
        source,
    })?;
    parse_extraction(&text)
}

fn strip_code_fence(text: &str) -> &str {
    let text = text.trim();
    let Some(body) = text.strip_prefix("```") else {
        return text;
    };
    let body = body.strip_prefix("json").unwrap_or(body);
    body.strip_suffix("```").unwrap_or(body).trim()
}
