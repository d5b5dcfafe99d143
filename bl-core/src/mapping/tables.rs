//! Static lookup tables from supplier vocabulary to internal codes.

use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::Path;

use crate::config::FixedValues;
use crate::error::{ConvertError, Result};

/// A single key to code mapping.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MappingEntry {
    /// Supplier-side key, matched exactly.
    pub key: String,
    /// Internal code segment.
    pub code: String,
    /// Internal label. Empty for supplier entries.
    #[serde(default)]
    pub label: String,
}

impl MappingEntry {
    /// Create a new entry.
    pub fn new(key: impl Into<String>, code: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            code: code.into(),
            label: label.into(),
        }
    }
}

/// An ordered mapping table.
///
/// Definition order is kept: it is the order in which product prefixes are
/// tried during reference resolution.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MappingTable {
    entries: Vec<MappingEntry>,
}

impl MappingTable {
    /// Create a table from entries in resolution order.
    pub fn new(entries: Vec<MappingEntry>) -> Self {
        Self { entries }
    }

    /// Look up an entry by exact key.
    pub fn get(&self, key: &str) -> Option<&MappingEntry> {
        self.entries.iter().find(|entry| entry.key == key)
    }

    /// Iterate entries in definition order.
    pub fn iter(&self) -> impl Iterator<Item = &MappingEntry> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    fn check_unique(&self, table: &str) -> Result<()> {
        let mut seen = HashSet::new();
        for entry in &self.entries {
            if !seen.insert(entry.key.as_str()) {
                return Err(ConvertError::DuplicateKey {
                    table: table.to_string(),
                    key: entry.key.clone(),
                });
            }
        }
        Ok(())
    }
}

impl FromIterator<MappingEntry> for MappingTable {
    fn from_iter<I: IntoIterator<Item = MappingEntry>>(iter: I) -> Self {
        Self::new(iter.into_iter().collect())
    }
}

/// The full set of lookup tables plus the constant output values.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MappingTables {
    /// Supplier reference prefix to product.
    pub products: MappingTable,
    /// Supplier color name to color.
    pub colors: MappingTable,
    /// Size label to size.
    pub sizes: MappingTable,
    /// Supplier name to supplier code.
    pub suppliers: MappingTable,
    #[serde(default)]
    pub constants: FixedValues,
}

static BUILTIN: Lazy<MappingTables> = Lazy::new(MappingTables::default_tables);

impl MappingTables {
    /// Built-in tables, initialised on first use and shared read-only.
    pub fn builtin() -> &'static MappingTables {
        &BUILTIN
    }

    /// Load tables from a TOML document.
    ///
    /// ```toml
    /// [[products]]
    /// key = "JH001"
    /// code = "YP001"
    /// label = "SWEAT A CAPUCHE PETIT CORDON"
    ///
    /// [[suppliers]]
    /// key = "IMBRETEX"
    /// code = "01"
    ///
    /// [constants]
    /// zone = "PS1"
    /// ```
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let tables: MappingTables = toml::from_str(content)?;
        tables.check()?;
        Ok(tables)
    }

    /// Load tables from a TOML file.
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|source| ConvertError::ReadFile {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&content)
    }

    fn check(&self) -> Result<()> {
        if self.products.is_empty() {
            return Err(ConvertError::EmptyTable {
                table: "products".to_string(),
            });
        }
        self.products.check_unique("products")?;
        self.colors.check_unique("colors")?;
        self.sizes.check_unique("sizes")?;
        self.suppliers.check_unique("suppliers")?;
        Ok(())
    }

    fn default_tables() -> Self {
        let products = [
            ("JH001", "YP001", "SWEAT A CAPUCHE PETIT CORDON"),
            ("JH101", "YP002", "SWEAT A CAPUCHE GROS CORDON"),
            ("JH120", "YP003", "SWEAT A CAPUCHE SANS CORDON"),
            ("BF385", "YP004", "BONNET EPAIS"),
        ];
        let colors = [
            ("DEEP BLACK", "0001", "NOIR"),
            ("ARCTIC WHITE", "0002", "BLANC"),
            ("NEW FRENCH", "0003", "BLEU MARINE"),
            ("DUSTY BLUE", "0004", "BLEU FONCE"),
            ("DUSTY GREEN", "0005", "VERT FONCE"),
            // Truncated names as printed on the delivery notes
            ("MARINE GREE", "0006", "GRIS CLAIR"),
            ("NATURAL STO", "0007", "GRIS CLAIR"),
            ("VANILLA", "0008", "BEIGE"),
        ];
        let sizes = [
            ("0", "0000", "TU"),
            ("XS", "0001", "XS"),
            ("S", "0002", "S"),
            ("M", "0003", "M"),
            ("L", "0004", "L"),
            ("XL", "0005", "XL"),
            ("XXL", "0006", "XXL"),
            ("3XL", "0007", "3XL"),
            ("4XL", "0008", "4XL"),
        ];
        let suppliers = [("IMBRETEX", "01"), ("RALAWISE", "02")];

        let table = |rows: &[(&str, &str, &str)]| -> MappingTable {
            rows.iter()
                .map(|(key, code, label)| MappingEntry::new(*key, *code, *label))
                .collect()
        };

        Self {
            products: table(&products),
            colors: table(&colors),
            sizes: table(&sizes),
            suppliers: suppliers
                .iter()
                .map(|(key, code)| MappingEntry::new(*key, *code, ""))
                .collect(),
            constants: FixedValues::default(),
        }
    }
}
