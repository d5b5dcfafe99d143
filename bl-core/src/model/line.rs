//! Delivery-note lines, before and after mapping.

use serde::{Deserialize, Serialize};

/// One delivery-note line as produced by the extraction service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawLine {
    /// Supplier article reference (e.g. `JH001PHXS`).
    #[serde(rename = "ref")]
    pub reference: String,
    #[serde(rename = "designation", default)]
    pub description: String,
    /// Supplier color name, exactly as printed on the note.
    #[serde(rename = "couleur")]
    pub color: String,
    /// Size label (`0` means one size).
    #[serde(rename = "taille")]
    pub size: String,
    #[serde(rename = "qte")]
    pub quantity: u32,
}

impl RawLine {
    /// Create a new raw line.
    pub fn new(
        reference: impl Into<String>,
        color: impl Into<String>,
        size: impl Into<String>,
        quantity: u32,
    ) -> Self {
        Self {
            reference: reference.into(),
            description: String::new(),
            color: color.into(),
            size: size.into(),
            quantity,
        }
    }
}

/// Mapping outcome of a line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LineStatus {
    Ok,
    Error,
}

/// A delivery-note line resolved against the mapping tables.
///
/// `status` is [`LineStatus::Error`] exactly when `error_detail` carries a
/// non-empty message. `internal_article_code` is never empty: unresolved
/// segments show up as placeholders, or the whole code is the
/// unknown-reference sentinel.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransformedLine {
    pub internal_article_code: String,
    pub label: String,
    pub external_reference: String,
    pub resolved_color: String,
    pub supplier_color: String,
    pub resolved_size: String,
    pub quantity: u32,
    pub status: LineStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_detail: Option<String>,
}

impl TransformedLine {
    /// Check if the line resolved cleanly.
    pub fn is_ok(&self) -> bool {
        self.status == LineStatus::Ok
    }
}
