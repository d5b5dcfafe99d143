//! Supplier vocabulary mapping: lookup tables, reference resolution and
//! internal article code synthesis.

mod code;
mod resolver;
mod tables;

pub use code::{synthesize_code, ArticleCode, CodeSegment};
pub use resolver::resolve_product_prefix;
pub use tables::{MappingEntry, MappingTable, MappingTables};
