//! Row placement and the freshly built workbook backend.

use chrono::Datelike;
use rust_xlsxwriter::{Color, ExcelDateTime, Format, FormatPattern, Workbook, Worksheet};

use super::layout::{CellValue, SheetLayout};
use crate::config::FRESH_START_ROW;
use crate::error::Result;

const HEADER_FILL: u32 = 0xE0E0E0;
const DATE_FORMAT: &str = "dd/mm/yyyy";

/// Destination of positioned cell writes. Rows and columns are 1-based.
pub(crate) trait CellSink {
    fn write_cell(&mut self, row: u32, column: u16, value: &CellValue) -> Result<()>;
}

/// Where a sheet's rows go.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Placement {
    /// Header row on row 1, data from row 2, fields in consecutive columns.
    Fresh,
    /// Data from the layout's template row, fields at their template columns.
    Template,
}

impl Placement {
    fn start_row(self, layout: &SheetLayout) -> u32 {
        match self {
            Placement::Fresh => FRESH_START_ROW,
            Placement::Template => layout.template_start_row,
        }
    }

    fn column(self, layout: &SheetLayout, field: usize) -> u16 {
        match self {
            Placement::Fresh => field as u16 + 1,
            Placement::Template => layout.fields[field].template_column,
        }
    }
}

/// Write rows in order from the layout's start row. Returns the number of
/// rows written.
pub(crate) fn write_rows<S, I, R>(
    sink: &mut S,
    layout: &SheetLayout,
    placement: Placement,
    rows: I,
) -> Result<u32>
where
    S: CellSink + ?Sized,
    I: IntoIterator<Item = R>,
    R: AsRef<[CellValue]>,
{
    let start = placement.start_row(layout);
    let mut count = 0;

    for values in rows {
        let row = start + count;
        for (field, value) in values.as_ref().iter().enumerate() {
            sink.write_cell(row, placement.column(layout, field), value)?;
        }
        count += 1;
    }

    tracing::debug!("{}: wrote {} row(s) from row {}", layout.name, count, start);
    Ok(count)
}

/// A workbook built from scratch.
pub(crate) struct FreshWorkbook {
    workbook: Workbook,
    header_format: Format,
    date_format: Format,
}

impl FreshWorkbook {
    pub fn new() -> Self {
        Self {
            workbook: Workbook::new(),
            header_format: Format::new()
                .set_bold()
                .set_pattern(FormatPattern::Solid)
                .set_background_color(Color::RGB(HEADER_FILL)),
            date_format: Format::new().set_num_format(DATE_FORMAT),
        }
    }

    /// Add a sheet with its header row and column widths.
    pub fn add_sheet(&mut self, layout: &SheetLayout) -> Result<FreshSheet<'_>> {
        let worksheet = self.workbook.add_worksheet();
        worksheet.set_name(layout.name)?;

        for (idx, field) in layout.fields.iter().enumerate() {
            let col = idx as u16;
            worksheet.write_string_with_format(0, col, field.title, &self.header_format)?;
            worksheet.set_column_width(col, layout.column_width)?;
        }

        Ok(FreshSheet {
            worksheet,
            date_format: &self.date_format,
        })
    }

    /// Serialize the workbook.
    pub fn save(mut self) -> Result<Vec<u8>> {
        Ok(self.workbook.save_to_buffer()?)
    }
}

/// A sheet of a [`FreshWorkbook`].
pub(crate) struct FreshSheet<'w> {
    worksheet: &'w mut Worksheet,
    date_format: &'w Format,
}

impl CellSink for FreshSheet<'_> {
    fn write_cell(&mut self, row: u32, column: u16, value: &CellValue) -> Result<()> {
        // rust_xlsxwriter indexes from zero
        let (row, col) = (row - 1, column - 1);
        match value {
            CellValue::Text(text) => {
                self.worksheet.write_string(row, col, text)?;
            }
            CellValue::Number(number) => {
                self.worksheet.write_number(row, col, *number)?;
            }
            CellValue::Date(date) => {
                let datetime =
                    ExcelDateTime::from_ymd(date.year() as u16, date.month() as u8, date.day() as u8)?;
                self.worksheet
                    .write_datetime_with_format(row, col, &datetime, self.date_format)?;
            }
        }
        Ok(())
    }
}
