//! Fixed cell layouts understood by the WMS import tool.
//!
//! Each sheet has one field table. A freshly built document writes field
//! `i` to column `i + 1` under a header row; a template fill writes it to
//! the field's fixed template column. Columns are 1-based.

use chrono::{Datelike, NaiveDate};

use crate::config::{
    FixedValues, BOOTSTRAP_TEMPLATE_START_ROW, RECEPTION_HEADER_TEMPLATE_ROW,
    RECEPTION_LINES_TEMPLATE_START_ROW, RECEPTION_TYPE, STOCK_ALERT,
};
use crate::model::{ShipmentHeader, TransformedLine};

/// `NaiveDate::num_days_from_ce` of 1899-12-30, day zero of Excel's
/// 1900 date system.
const EXCEL_EPOCH_DAYS_FROM_CE: i32 = 693_594;

/// A value written to one cell.
#[derive(Debug, Clone, PartialEq)]
pub enum CellValue {
    Text(String),
    Number(f64),
    Date(NaiveDate),
}

impl CellValue {
    fn text(value: &str) -> Self {
        CellValue::Text(value.to_string())
    }
}

/// Excel serial day number of a date.
pub fn excel_serial(date: NaiveDate) -> f64 {
    f64::from(date.num_days_from_ce() - EXCEL_EPOCH_DAYS_FROM_CE)
}

/// A field position in a sheet layout.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldSlot {
    /// Header title in a freshly built document.
    pub title: &'static str,
    /// Column in the supplied template.
    pub template_column: u16,
}

const fn slot(title: &'static str, template_column: u16) -> FieldSlot {
    FieldSlot {
        title,
        template_column,
    }
}

/// A worksheet layout.
#[derive(Debug, Clone, Copy)]
pub struct SheetLayout {
    pub name: &'static str,
    pub fields: &'static [FieldSlot],
    /// First data row in the supplied template.
    pub template_start_row: u32,
    /// Column width in a freshly built document.
    pub column_width: f64,
}

pub const BOOTSTRAP_FIELDS: [FieldSlot; 15] = [
    slot("Type opération", 4),
    slot("Stockeur", 5),
    slot("Code Article", 6),
    slot("Libellé Article", 7),
    slot("Référence externe", 9),
    slot("Famille", 10),
    slot("Stock d'Alerte", 13),
    slot("Article Nouveau", 16),
    slot("Dépôt", 66),
    slot("Zone", 67),
    slot("Gencod", 94),
    slot("Type Mouvement", 101),
    slot("Taille", 121),
    slot("Couleur", 122),
    slot("Coloris fournisseur", 123),
];

pub const RECEPTION_HEADER_FIELDS: [FieldSlot; 8] = [
    slot("Stockeur", 4),
    slot("Agence", 5),
    slot("N° Commande", 6),
    slot("Type", 7),
    slot("Fournisseur", 11),
    slot("Transporteur", 15),
    slot("Date réception", 25),
    slot("Commentaire", 38),
];

pub const RECEPTION_LINE_FIELDS: [FieldSlot; 3] = [
    slot("N° Commande", 4),
    slot("Code Article", 6),
    slot("Quantité UVC", 15),
];

pub const BOOTSTRAP_SHEET: SheetLayout = SheetLayout {
    name: "Articles à intégrer",
    fields: &BOOTSTRAP_FIELDS,
    template_start_row: BOOTSTRAP_TEMPLATE_START_ROW,
    column_width: 18.0,
};

pub const RECEPTION_HEADER_SHEET: SheetLayout = SheetLayout {
    name: "Entête Réception",
    fields: &RECEPTION_HEADER_FIELDS,
    template_start_row: RECEPTION_HEADER_TEMPLATE_ROW,
    column_width: 20.0,
};

pub const RECEPTION_LINES_SHEET: SheetLayout = SheetLayout {
    name: "Lignes de Commandes",
    fields: &RECEPTION_LINE_FIELDS,
    template_start_row: RECEPTION_LINES_TEMPLATE_START_ROW,
    column_width: 25.0,
};

/// Bootstrap row values, in [`BOOTSTRAP_FIELDS`] order.
pub fn bootstrap_row(line: &TransformedLine, constants: &FixedValues) -> [CellValue; 15] {
    [
        CellValue::text(&constants.operation_type),
        CellValue::Number(f64::from(constants.warehouse_id)),
        CellValue::text(&line.internal_article_code),
        CellValue::text(&line.label),
        CellValue::text(&line.external_reference),
        CellValue::text(&constants.family),
        CellValue::Number(f64::from(STOCK_ALERT)),
        CellValue::text(&constants.new_article),
        CellValue::text(&constants.depot),
        CellValue::text(&constants.zone),
        CellValue::text(&constants.barcode),
        CellValue::text(&constants.movement_type),
        CellValue::text(&line.resolved_size),
        CellValue::text(&line.resolved_color),
        CellValue::text(&line.supplier_color),
    ]
}

/// Reception header row values, in [`RECEPTION_HEADER_FIELDS`] order.
pub fn reception_header_row(header: &ShipmentHeader, constants: &FixedValues) -> [CellValue; 8] {
    [
        CellValue::Number(f64::from(constants.warehouse_id)),
        CellValue::text(&constants.agency),
        CellValue::text(&header.order_reference),
        CellValue::text(RECEPTION_TYPE),
        CellValue::text(&header.supplier),
        CellValue::text(&header.carrier),
        CellValue::Date(header.delivery_date),
        CellValue::Text(header.reception_comment()),
    ]
}

/// Reception line row values, in [`RECEPTION_LINE_FIELDS`] order.
pub fn reception_line_row(header: &ShipmentHeader, line: &TransformedLine) -> [CellValue; 3] {
    [
        CellValue::text(&header.order_reference),
        CellValue::text(&line.internal_article_code),
        CellValue::Number(f64::from(line.quantity)),
    ]
}
