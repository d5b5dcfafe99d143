//! WMS import document generation.
//!
//! Two document kinds share one writing discipline: a field table per sheet
//! and a [`Layout`] choosing between a freshly built workbook and a filled
//! template.

mod layout;
mod sheet;
mod template;

pub use layout::{
    bootstrap_row, excel_serial, reception_header_row, reception_line_row, CellValue, FieldSlot,
    SheetLayout, BOOTSTRAP_FIELDS, BOOTSTRAP_SHEET, RECEPTION_HEADER_FIELDS,
    RECEPTION_HEADER_SHEET, RECEPTION_LINES_SHEET, RECEPTION_LINE_FIELDS,
};

use std::fmt;

use crate::config::FixedValues;
use crate::error::Result;
use crate::model::{ShipmentHeader, TransformedLine};
use sheet::{write_rows, FreshWorkbook, Placement};
use template::TemplateWorkbook;

/// Output document kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentKind {
    /// New article/variant master records.
    Bootstrap,
    /// Expected incoming shipment.
    Reception,
}

impl DocumentKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            DocumentKind::Bootstrap => "bootstrap",
            DocumentKind::Reception => "reception",
        }
    }

    /// Suggested file name for a document of this kind.
    pub fn filename(&self, order_reference: &str) -> String {
        format!("{}_{}.xlsx", self.as_str(), order_reference)
    }
}

impl fmt::Display for DocumentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// How a document is laid out.
#[derive(Debug, Clone, Copy)]
pub enum Layout<'a> {
    /// Build a new workbook with a header row on each sheet.
    Fresh,
    /// Fill the given template workbook at its fixed offsets.
    Template(&'a [u8]),
}

/// A serialized workbook ready for download.
#[derive(Debug, Clone)]
pub struct GeneratedDocument {
    pub kind: DocumentKind,
    pub filename: String,
    pub bytes: Vec<u8>,
}

/// Generate the Bootstrap (article creation) document.
pub fn generate_bootstrap(
    lines: &[TransformedLine],
    order_reference: &str,
    constants: &FixedValues,
    layout: Layout<'_>,
) -> Result<GeneratedDocument> {
    warn_if_empty(DocumentKind::Bootstrap, lines);
    let rows = lines.iter().map(|line| bootstrap_row(line, constants));

    let bytes = match layout {
        Layout::Fresh => {
            let mut workbook = FreshWorkbook::new();
            write_rows(
                &mut workbook.add_sheet(&BOOTSTRAP_SHEET)?,
                &BOOTSTRAP_SHEET,
                Placement::Fresh,
                rows,
            )?;
            workbook.save()?
        }
        Layout::Template(template) => {
            let mut workbook = TemplateWorkbook::open(template)?;
            write_rows(
                workbook.sheet(BOOTSTRAP_SHEET.name)?,
                &BOOTSTRAP_SHEET,
                Placement::Template,
                rows,
            )?;
            workbook.save()?
        }
    };

    Ok(finish(DocumentKind::Bootstrap, order_reference, bytes))
}

/// Generate the Reception (expected delivery) document.
///
/// Both sheets carry the header's order reference; it is the only link
/// between the header row and the line rows.
pub fn generate_reception(
    header: &ShipmentHeader,
    lines: &[TransformedLine],
    constants: &FixedValues,
    layout: Layout<'_>,
) -> Result<GeneratedDocument> {
    warn_if_empty(DocumentKind::Reception, lines);
    let header_row = [reception_header_row(header, constants)];
    let line_rows = lines.iter().map(|line| reception_line_row(header, line));

    let bytes = match layout {
        Layout::Fresh => {
            let mut workbook = FreshWorkbook::new();
            write_rows(
                &mut workbook.add_sheet(&RECEPTION_HEADER_SHEET)?,
                &RECEPTION_HEADER_SHEET,
                Placement::Fresh,
                header_row,
            )?;
            write_rows(
                &mut workbook.add_sheet(&RECEPTION_LINES_SHEET)?,
                &RECEPTION_LINES_SHEET,
                Placement::Fresh,
                line_rows,
            )?;
            workbook.save()?
        }
        Layout::Template(template) => {
            let mut workbook = TemplateWorkbook::open(template)?;
            workbook.require_sheets(&[RECEPTION_HEADER_SHEET.name, RECEPTION_LINES_SHEET.name])?;
            write_rows(
                workbook.sheet(RECEPTION_HEADER_SHEET.name)?,
                &RECEPTION_HEADER_SHEET,
                Placement::Template,
                header_row,
            )?;
            write_rows(
                workbook.sheet(RECEPTION_LINES_SHEET.name)?,
                &RECEPTION_LINES_SHEET,
                Placement::Template,
                line_rows,
            )?;
            workbook.save()?
        }
    };

    Ok(finish(DocumentKind::Reception, &header.order_reference, bytes))
}

fn warn_if_empty(kind: DocumentKind, lines: &[TransformedLine]) {
    if lines.is_empty() {
        tracing::warn!("Generating {} document with no lines", kind);
    }
}

fn finish(kind: DocumentKind, order_reference: &str, bytes: Vec<u8>) -> GeneratedDocument {
    let filename = kind.filename(order_reference);
    tracing::info!("Generated {} ({} bytes)", filename, bytes.len());
    GeneratedDocument {
        kind,
        filename,
        bytes,
    }
}
