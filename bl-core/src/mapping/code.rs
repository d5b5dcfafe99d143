//! Internal article code synthesis.

use std::fmt;

use super::tables::{MappingTable, MappingTables};
use crate::config::{PLACEHOLDER_CHAR, SEGMENT_WIDTH, SUPPLIER_SEGMENT_WIDTH};

/// One segment of an internal article code.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CodeSegment<'t> {
    /// Code found in the mapping table.
    Resolved(&'t str),
    /// Lookup missed; rendered as `width` placeholder characters.
    Placeholder(usize),
}

impl<'t> CodeSegment<'t> {
    fn lookup(table: &'t MappingTable, key: &str, width: usize) -> Self {
        match table.get(key) {
            Some(entry) => CodeSegment::Resolved(entry.code.as_str()),
            None => CodeSegment::Placeholder(width),
        }
    }

    pub fn is_resolved(&self) -> bool {
        matches!(self, CodeSegment::Resolved(_))
    }
}

impl fmt::Display for CodeSegment<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CodeSegment::Resolved(code) => f.write_str(code),
            CodeSegment::Placeholder(width) => {
                for _ in 0..*width {
                    write!(f, "{}", PLACEHOLDER_CHAR)?;
                }
                Ok(())
            }
        }
    }
}

/// Product-color-size-supplier composite code.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ArticleCode<'t> {
    pub product: CodeSegment<'t>,
    pub color: CodeSegment<'t>,
    pub size: CodeSegment<'t>,
    pub supplier: CodeSegment<'t>,
}

impl ArticleCode<'_> {
    /// Check whether every segment resolved.
    pub fn is_complete(&self) -> bool {
        self.segments().iter().all(CodeSegment::is_resolved)
    }

    fn segments(&self) -> [CodeSegment<'_>; 4] {
        [self.product, self.color, self.size, self.supplier]
    }
}

impl fmt::Display for ArticleCode<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}-{}-{}-{}",
            self.product, self.color, self.size, self.supplier
        )
    }
}

/// Build the internal article code. Never fails: any lookup miss becomes a
/// placeholder segment.
pub fn synthesize_code<'t>(
    tables: &'t MappingTables,
    product_prefix: &str,
    color: &str,
    size: &str,
    supplier: &str,
) -> ArticleCode<'t> {
    ArticleCode {
        product: CodeSegment::lookup(&tables.products, product_prefix, SEGMENT_WIDTH),
        color: CodeSegment::lookup(&tables.colors, color, SEGMENT_WIDTH),
        size: CodeSegment::lookup(&tables.sizes, size, SEGMENT_WIDTH),
        supplier: CodeSegment::lookup(&tables.suppliers, supplier, SUPPLIER_SEGMENT_WIDTH),
    }
}
