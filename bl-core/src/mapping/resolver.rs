//! Supplier reference to product prefix resolution.

use super::tables::{MappingEntry, MappingTables};

/// Find the product whose key prefixes `reference`.
///
/// Keys are tried in table order and the first match wins, so a key that is
/// itself a prefix of a later key shadows it. Matching is case-sensitive and
/// the reference is not trimmed.
pub fn resolve_product_prefix<'t>(
    tables: &'t MappingTables,
    reference: &str,
) -> Option<&'t MappingEntry> {
    tables
        .products
        .iter()
        .find(|product| reference.starts_with(product.key.as_str()))
}
