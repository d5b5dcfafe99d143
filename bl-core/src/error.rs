//! Error types for delivery-note conversion.
//!
//! Only document-level and configuration failures live here. Line-level
//! mapping problems are carried as data on [`crate::model::TransformedLine`].

use std::path::PathBuf;
use thiserror::Error;

/// Error classes, used by the CLI to pick an exit code.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCode {
    /// Unreadable or unparsable input (1)
    Input = 1,
    /// Invalid mapping configuration (2)
    Config = 2,
    /// Template does not match the expected layout (3)
    Template = 3,
    /// Document serialization failed (4)
    Output = 4,
}

/// Main error type for the converter.
#[derive(Debug, Error)]
pub enum ConvertError {
    #[error("Sheet '{sheet}' not found in template")]
    MissingSheet { sheet: String },

    #[error("Invalid template: {message}")]
    InvalidTemplate { message: String },

    #[error("XML error in {part}: {message}")]
    Xml { part: String, message: String },

    #[error("Spreadsheet error: {0}")]
    Xlsx(#[from] rust_xlsxwriter::XlsxError),

    #[error("Zip error: {0}")]
    Zip(#[from] zip::result::ZipError),

    #[error("Invalid extraction result: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Invalid mapping file: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("Duplicate key '{key}' in {table} table")]
    DuplicateKey { table: String, key: String },

    #[error("The {table} table is empty")]
    EmptyTable { table: String },

    #[error("Extraction result has no shipment header (infoBL)")]
    MissingHeader,

    #[error("Cannot read {path}: {source}")]
    ReadFile {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl ConvertError {
    /// Get the error class for this error.
    pub fn code(&self) -> ErrorCode {
        match self {
            ConvertError::MissingSheet { .. } => ErrorCode::Template,
            ConvertError::InvalidTemplate { .. } => ErrorCode::Template,
            ConvertError::Xml { .. } => ErrorCode::Template,
            ConvertError::Zip(_) => ErrorCode::Template,
            ConvertError::Xlsx(_) => ErrorCode::Output,
            ConvertError::Json(_) => ErrorCode::Input,
            ConvertError::MissingHeader => ErrorCode::Input,
            ConvertError::ReadFile { .. } => ErrorCode::Input,
            ConvertError::Toml(_) => ErrorCode::Config,
            ConvertError::DuplicateKey { .. } => ErrorCode::Config,
            ConvertError::EmptyTable { .. } => ErrorCode::Config,
            ConvertError::Io(_) => ErrorCode::Output,
        }
    }

    /// Get the numeric error code value.
    pub fn code_value(&self) -> i32 {
        self.code() as i32
    }
}

/// Result type alias for converter operations.
pub type Result<T> = std::result::Result<T, ConvertError>;
