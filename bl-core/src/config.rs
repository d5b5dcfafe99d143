//! Configuration constants and fixed output values.

use serde::{Deserialize, Serialize};

/// Article code used when the supplier reference matches no known product.
pub const UNKNOWN_REFERENCE_CODE: &str = "ERREUR";

/// Label used when the supplier reference matches no known product.
pub const UNKNOWN_REFERENCE_LABEL: &str = "unknown reference";

/// Placeholder character for unresolved code segments.
pub const PLACEHOLDER_CHAR: char = 'X';

/// Width of the product, color and size code segments.
pub const SEGMENT_WIDTH: usize = 4;

/// Width of the supplier code segment.
pub const SUPPLIER_SEGMENT_WIDTH: usize = 2;

/// Supplier assumed when the extraction result names none.
pub const DEFAULT_SUPPLIER: &str = "IMBRETEX";

/// Stock alert threshold written on every Bootstrap row.
pub const STOCK_ALERT: u32 = 1;

/// Reception type tag.
pub const RECEPTION_TYPE: &str = "ENT";

/// First data row of the Bootstrap template (1-based).
pub const BOOTSTRAP_TEMPLATE_START_ROW: u32 = 16;

/// Header data row of the Reception template (1-based).
pub const RECEPTION_HEADER_TEMPLATE_ROW: u32 = 8;

/// First line row of the Reception template (1-based).
pub const RECEPTION_LINES_TEMPLATE_START_ROW: u32 = 14;

/// First data row of a freshly built document (1-based, after the header).
pub const FRESH_START_ROW: u32 = 2;

/// Output values that are the same on every generated row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FixedValues {
    /// Operation type ("C" = creation).
    pub operation_type: String,
    /// Warehouse (stockeur) id, written as a number.
    pub warehouse_id: u32,
    pub depot: String,
    pub zone: String,
    /// Article family code.
    pub family: String,
    /// "New article" flag.
    pub new_article: String,
    pub movement_type: String,
    /// Barcode placeholder.
    pub barcode: String,
    pub agency: String,
}

impl Default for FixedValues {
    fn default() -> Self {
        Self {
            operation_type: "C".to_string(),
            warehouse_id: 94,
            depot: "Z0".to_string(),
            zone: "PS1".to_string(),
            family: "HSS".to_string(),
            new_article: "O".to_string(),
            movement_type: "ENT".to_string(),
            barcode: "XXX".to_string(),
            agency: "01".to_string(),
        }
    }
}
