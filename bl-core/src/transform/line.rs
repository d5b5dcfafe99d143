//! Mapping of raw delivery-note lines onto internal article records.

use crate::config::{UNKNOWN_REFERENCE_CODE, UNKNOWN_REFERENCE_LABEL};
use crate::mapping::{resolve_product_prefix, synthesize_code, MappingTables};
use crate::model::{LineStatus, RawLine, TransformedLine};

/// Resolve one raw line against the mapping tables.
///
/// Never fails: unresolved fields are reported through
/// [`TransformedLine::status`] and [`TransformedLine::error_detail`].
pub fn transform_line(tables: &MappingTables, line: &RawLine, supplier: &str) -> TransformedLine {
    let Some(product) = resolve_product_prefix(tables, &line.reference) else {
        return TransformedLine {
            internal_article_code: UNKNOWN_REFERENCE_CODE.to_string(),
            label: UNKNOWN_REFERENCE_LABEL.to_string(),
            external_reference: line.reference.clone(),
            resolved_color: String::new(),
            supplier_color: line.color.clone(),
            resolved_size: line.size.clone(),
            quantity: line.quantity,
            status: LineStatus::Error,
            error_detail: Some(format!("unknown supplier reference: {}", line.reference)),
        };
    };

    let color = tables.colors.get(&line.color);
    let size = tables.sizes.get(&line.size);

    let mut problems = Vec::new();
    if color.is_none() {
        problems.push(format!("unknown color: {}", line.color));
    }
    if size.is_none() {
        problems.push(format!("unknown size: {}", line.size));
    }

    let code = synthesize_code(tables, &product.key, &line.color, &line.size, supplier);

    let (status, error_detail) = if problems.is_empty() {
        (LineStatus::Ok, None)
    } else {
        (LineStatus::Error, Some(problems.join(", ")))
    };

    TransformedLine {
        internal_article_code: code.to_string(),
        label: product.label.clone(),
        external_reference: line.reference.clone(),
        resolved_color: color.map_or_else(|| line.color.clone(), |c| c.label.clone()),
        supplier_color: line.color.clone(),
        resolved_size: size.map_or_else(|| line.size.clone(), |s| s.label.clone()),
        quantity: line.quantity,
        status,
        error_detail,
    }
}

/// Transform a batch of lines, preserving input order.
pub fn transform_lines(
    tables: &MappingTables,
    lines: &[RawLine],
    supplier: &str,
) -> Vec<TransformedLine> {
    lines
        .iter()
        .enumerate()
        .map(|(idx, line)| {
            let transformed = transform_line(tables, line, supplier);
            if let Some(detail) = &transformed.error_detail {
                tracing::debug!("line {}: {}", idx + 1, detail);
            }
            transformed
        })
        .collect()
}
