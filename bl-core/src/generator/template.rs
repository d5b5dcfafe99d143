//! Filling of pre-formatted template workbooks.
//!
//! The template package is copied entry by entry. Only the worksheet parts
//! that received cells are rewritten: new cells are merged into the sheet's
//! `<sheetData>` in row and column order, and a template cell at a written
//! position is replaced while keeping its style index.

use quick_xml::events::{BytesEnd, BytesStart, BytesText, Event};
use quick_xml::name::QName;
use quick_xml::{Reader, Writer};
use std::collections::{BTreeMap, HashMap};
use std::io::{Cursor, Read, Write};
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipArchive, ZipWriter};

use super::layout::{excel_serial, CellValue};
use super::sheet::CellSink;
use crate::error::{ConvertError, Result};

const WORKBOOK_PART: &str = "xl/workbook.xml";
const WORKBOOK_RELS_PART: &str = "xl/_rels/workbook.xml.rels";

/// Cells to merge into one worksheet, keyed by row then column.
#[derive(Debug, Default)]
pub(crate) struct SheetPatch {
    rows: BTreeMap<u32, BTreeMap<u16, CellValue>>,
}

impl SheetPatch {
    fn bounds(&self) -> Option<CellRange> {
        let first_row = *self.rows.keys().next()?;
        let last_row = *self.rows.keys().next_back()?;
        let columns = self.rows.values().flat_map(|cells| cells.keys().copied());
        let (first_col, last_col) = columns.fold((u16::MAX, 0), |(lo, hi), col| {
            (lo.min(col), hi.max(col))
        });
        Some(CellRange {
            first_row,
            first_col,
            last_row,
            last_col,
        })
    }
}

impl CellSink for SheetPatch {
    fn write_cell(&mut self, row: u32, column: u16, value: &CellValue) -> Result<()> {
        self.rows
            .entry(row)
            .or_default()
            .insert(column, value.clone());
        Ok(())
    }
}

/// A template workbook being filled.
pub(crate) struct TemplateWorkbook<'a> {
    archive: ZipArchive<Cursor<&'a [u8]>>,
    /// Sheet name to worksheet part path, in workbook order.
    sheets: Vec<(String, String)>,
    /// Worksheet part path to pending cells.
    patches: HashMap<String, SheetPatch>,
}

impl<'a> TemplateWorkbook<'a> {
    /// Open a template from its bytes.
    pub fn open(bytes: &'a [u8]) -> Result<Self> {
        let mut archive =
            ZipArchive::new(Cursor::new(bytes)).map_err(|e| ConvertError::InvalidTemplate {
                message: format!("not a zip package ({})", e),
            })?;

        let workbook = read_part(&mut archive, WORKBOOK_PART)?;
        let rels = read_part(&mut archive, WORKBOOK_RELS_PART)?;
        let targets = parse_relationships(&rels)?;

        let sheets = parse_workbook_sheets(&workbook)?
            .into_iter()
            .filter_map(|(name, rel_id)| {
                targets
                    .get(&rel_id)
                    .map(|target| (name, normalize_target(target)))
            })
            .collect::<Vec<_>>();

        tracing::debug!(
            "Template sheets: {:?}",
            sheets.iter().map(|(name, _)| name.as_str()).collect::<Vec<_>>()
        );

        Ok(Self {
            archive,
            sheets,
            patches: HashMap::new(),
        })
    }

    /// Fail unless every named sheet exists.
    pub fn require_sheets(&self, names: &[&str]) -> Result<()> {
        for name in names {
            self.part_for(name)?;
        }
        Ok(())
    }

    /// Get the patch for a named sheet.
    pub fn sheet(&mut self, name: &str) -> Result<&mut SheetPatch> {
        let part = self.part_for(name)?.to_string();
        Ok(self.patches.entry(part).or_default())
    }

    fn part_for(&self, name: &str) -> Result<&str> {
        self.sheets
            .iter()
            .find(|(sheet, _)| sheet == name)
            .map(|(_, part)| part.as_str())
            .ok_or_else(|| ConvertError::MissingSheet {
                sheet: name.to_string(),
            })
    }

    /// Write the filled package.
    pub fn save(mut self) -> Result<Vec<u8>> {
        let options = SimpleFileOptions::default().compression_method(CompressionMethod::Deflated);
        let mut writer = ZipWriter::new(Cursor::new(Vec::new()));

        for idx in 0..self.archive.len() {
            let name = self.archive.by_index_raw(idx)?.name().to_string();
            match self.patches.get(&name) {
                Some(patch) => {
                    let xml = read_part(&mut self.archive, &name)?;
                    let patched = patch_sheet_xml(&xml, patch, &name)?;
                    writer.start_file(name.as_str(), options)?;
                    writer.write_all(&patched)?;
                }
                None => {
                    let file = self.archive.by_index_raw(idx)?;
                    writer.raw_copy_file(file)?;
                }
            }
        }

        Ok(writer.finish()?.into_inner())
    }
}

fn read_part(archive: &mut ZipArchive<Cursor<&[u8]>>, name: &str) -> Result<Vec<u8>> {
    let mut file = archive
        .by_name(name)
        .map_err(|_| ConvertError::InvalidTemplate {
            message: format!("missing part {}", name),
        })?;
    let mut buf = Vec::new();
    file.read_to_end(&mut buf)?;
    Ok(buf)
}

fn xml_error(part: &str) -> impl Fn(quick_xml::Error) -> ConvertError + '_ {
    move |e| ConvertError::Xml {
        part: part.to_string(),
        message: e.to_string(),
    }
}

fn write_error<E: std::fmt::Display>(part: &str) -> impl Fn(E) -> ConvertError + '_ {
    move |e| ConvertError::Xml {
        part: part.to_string(),
        message: e.to_string(),
    }
}

fn attribute(element: &BytesStart<'_>, key: &[u8], part: &str) -> Result<Option<String>> {
    for attr in element.attributes() {
        let attr = attr.map_err(|e| xml_error(part)(e.into()))?;
        if attr.key.as_ref() == key {
            let value = attr.unescape_value().map_err(xml_error(part))?;
            return Ok(Some(value.into_owned()));
        }
    }
    Ok(None)
}

/// Sheet name and relationship id of each `<sheet>` in workbook order.
fn parse_workbook_sheets(xml: &[u8]) -> Result<Vec<(String, String)>> {
    let mut reader = Reader::from_reader(xml);
    let mut buf = Vec::new();
    let mut sheets = Vec::new();

    loop {
        match reader.read_event_into(&mut buf).map_err(xml_error(WORKBOOK_PART))? {
            Event::Start(e) | Event::Empty(e) if e.name().as_ref() == b"sheet" => {
                let name = attribute(&e, b"name", WORKBOOK_PART)?;
                let rel_id = attribute(&e, b"r:id", WORKBOOK_PART)?;
                if let (Some(name), Some(rel_id)) = (name, rel_id) {
                    sheets.push((name, rel_id));
                }
            }
            Event::Eof => break,
            _ => {}
        }
        buf.clear();
    }

    Ok(sheets)
}

/// Relationship id to target of each worksheet relationship.
fn parse_relationships(xml: &[u8]) -> Result<HashMap<String, String>> {
    let mut reader = Reader::from_reader(xml);
    let mut buf = Vec::new();
    let mut targets = HashMap::new();

    loop {
        match reader
            .read_event_into(&mut buf)
            .map_err(xml_error(WORKBOOK_RELS_PART))?
        {
            Event::Start(e) | Event::Empty(e) if e.name().as_ref() == b"Relationship" => {
                let id = attribute(&e, b"Id", WORKBOOK_RELS_PART)?;
                let target = attribute(&e, b"Target", WORKBOOK_RELS_PART)?;
                let rel_type = attribute(&e, b"Type", WORKBOOK_RELS_PART)?.unwrap_or_default();
                if let (Some(id), Some(target)) = (id, target) {
                    if rel_type.ends_with("/worksheet") {
                        targets.insert(id, target);
                    }
                }
            }
            Event::Eof => break,
            _ => {}
        }
        buf.clear();
    }

    Ok(targets)
}

/// Turn a relationship target into a package part path.
fn normalize_target(target: &str) -> String {
    match target.strip_prefix('/') {
        Some(absolute) => absolute.to_string(),
        None => format!("xl/{}", target),
    }
}

/// Rectangular cell range, 1-based and inclusive.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct CellRange {
    first_row: u32,
    first_col: u16,
    last_row: u32,
    last_col: u16,
}

impl CellRange {
    fn parse(reference: &str) -> Option<Self> {
        let (first, last) = reference.split_once(':').unwrap_or((reference, reference));
        let (first_col, first_row) = parse_cell_ref(first)?;
        let (last_col, last_row) = parse_cell_ref(last)?;
        Some(Self {
            first_row,
            first_col,
            last_row,
            last_col,
        })
    }

    fn union(self, other: Self) -> Self {
        Self {
            first_row: self.first_row.min(other.first_row),
            first_col: self.first_col.min(other.first_col),
            last_row: self.last_row.max(other.last_row),
            last_col: self.last_col.max(other.last_col),
        }
    }

    fn to_reference(self) -> String {
        let first = cell_ref(self.first_row, self.first_col);
        if self.first_row == self.last_row && self.first_col == self.last_col {
            first
        } else {
            format!("{}:{}", first, cell_ref(self.last_row, self.last_col))
        }
    }
}

/// Column letters for a 1-based column index (1 = A, 27 = AA).
pub(crate) fn column_letters(column: u16) -> String {
    let mut letters = Vec::new();
    let mut n = u32::from(column);
    while n > 0 {
        let rem = (n - 1) % 26;
        letters.push(b'A' + rem as u8);
        n = (n - 1) / 26;
    }
    letters.reverse();
    String::from_utf8(letters).unwrap_or_default()
}

/// A1-style reference for a 1-based row and column.
pub(crate) fn cell_ref(row: u32, column: u16) -> String {
    format!("{}{}", column_letters(column), row)
}

/// Parse an A1-style reference (absolute markers allowed) into
/// `(column, row)`.
fn parse_cell_ref(reference: &str) -> Option<(u16, u32)> {
    let reference = reference.replace('$', "");
    let split = reference.find(|c: char| c.is_ascii_digit())?;
    let (letters, digits) = reference.split_at(split);
    if letters.is_empty() || !letters.bytes().all(|b| b.is_ascii_uppercase()) {
        return None;
    }
    let column = letters
        .bytes()
        .try_fold(0u32, |acc, b| acc.checked_mul(26)?.checked_add(u32::from(b - b'A' + 1)))?;
    let row = digits.parse().ok()?;
    Some((u16::try_from(column).ok()?, row))
}

/// Rewrite a worksheet part with the patch cells merged in.
fn patch_sheet_xml(xml: &[u8], patch: &SheetPatch, part: &str) -> Result<Vec<u8>> {
    let mut reader = Reader::from_reader(xml);
    reader.config_mut().trim_text(false);
    let mut writer = Writer::new(Vec::with_capacity(xml.len()));
    let mut pending = patch.rows.iter().peekable();
    let mut buf = Vec::new();
    let mut in_sheet_data = false;
    let mut last_row = 0u32;

    loop {
        let event = reader.read_event_into(&mut buf).map_err(xml_error(part))?;
        match event {
            Event::Empty(e) if e.name().as_ref() == b"dimension" => {
                let existing = attribute(&e, b"ref", part)?.and_then(|r| CellRange::parse(&r));
                let range = match (existing, patch.bounds()) {
                    (Some(existing), Some(bounds)) => Some(existing.union(bounds)),
                    (existing, bounds) => existing.or(bounds),
                };
                match range {
                    Some(range) => {
                        let mut dimension = BytesStart::new("dimension");
                        dimension.push_attribute(("ref", range.to_reference().as_str()));
                        write_event(&mut writer, Event::Empty(dimension), part)?;
                    }
                    None => write_event(&mut writer, Event::Empty(e), part)?,
                }
            }
            Event::Start(e) if e.name().as_ref() == b"sheetData" => {
                in_sheet_data = true;
                write_event(&mut writer, Event::Start(e), part)?;
            }
            Event::Empty(e) if e.name().as_ref() == b"sheetData" => {
                write_event(&mut writer, Event::Start(e), part)?;
                for (row, cells) in pending.by_ref() {
                    write_new_row(&mut writer, *row, cells, part)?;
                }
                write_event(&mut writer, Event::End(BytesEnd::new("sheetData")), part)?;
            }
            Event::End(e) if e.name().as_ref() == b"sheetData" => {
                for (row, cells) in pending.by_ref() {
                    write_new_row(&mut writer, *row, cells, part)?;
                }
                in_sheet_data = false;
                write_event(&mut writer, Event::End(e), part)?;
            }
            Event::Start(e) if in_sheet_data && e.name().as_ref() == b"row" => {
                let row = row_number(&e, part)?.unwrap_or(last_row + 1);
                last_row = row;
                while let Some((new_row, cells)) = pending.next_if(|(r, _)| **r < row) {
                    write_new_row(&mut writer, *new_row, cells, part)?;
                }
                match pending.next_if(|(r, _)| **r == row) {
                    Some((_, cells)) => {
                        write_event(&mut writer, Event::Start(row_start(&e, part)?), part)?;
                        merge_row(&mut reader, &mut writer, row, cells, part)?;
                    }
                    None => write_event(&mut writer, Event::Start(e), part)?,
                }
            }
            Event::Empty(e) if in_sheet_data && e.name().as_ref() == b"row" => {
                let row = row_number(&e, part)?.unwrap_or(last_row + 1);
                last_row = row;
                while let Some((new_row, cells)) = pending.next_if(|(r, _)| **r < row) {
                    write_new_row(&mut writer, *new_row, cells, part)?;
                }
                match pending.next_if(|(r, _)| **r == row) {
                    Some((_, cells)) => {
                        write_event(&mut writer, Event::Start(row_start(&e, part)?), part)?;
                        for (col, value) in cells {
                            write_cell(&mut writer, row, *col, value, None, part)?;
                        }
                        write_event(&mut writer, Event::End(BytesEnd::new("row")), part)?;
                    }
                    None => write_event(&mut writer, Event::Empty(e), part)?,
                }
            }
            Event::Eof => break,
            other => write_event(&mut writer, other, part)?,
        }
        buf.clear();
    }

    Ok(writer.into_inner())
}

/// Copy a row's existing cells, inserting or replacing patch cells, up to
/// and including the row's end tag.
fn merge_row(
    reader: &mut Reader<&[u8]>,
    writer: &mut Writer<Vec<u8>>,
    row: u32,
    cells: &BTreeMap<u16, CellValue>,
    part: &str,
) -> Result<()> {
    let mut pending = cells.iter().peekable();
    let mut buf = Vec::new();
    let mut skip_buf = Vec::new();
    let mut last_col = 0u16;

    loop {
        let event = reader.read_event_into(&mut buf).map_err(xml_error(part))?;
        let (element, is_empty) = match event {
            Event::Start(e) if e.name().as_ref() == b"c" => (e, false),
            Event::Empty(e) if e.name().as_ref() == b"c" => (e, true),
            Event::End(e) if e.name().as_ref() == b"row" => {
                for (col, value) in pending.by_ref() {
                    write_cell(writer, row, *col, value, None, part)?;
                }
                return write_event(writer, Event::End(e), part);
            }
            Event::Eof => {
                return Err(ConvertError::Xml {
                    part: part.to_string(),
                    message: format!("unexpected end of file inside row {}", row),
                })
            }
            other => {
                write_event(writer, other, part)?;
                buf.clear();
                continue;
            }
        };

        let col = cell_column(&element, part)?.unwrap_or(last_col + 1);
        last_col = col;
        while let Some((new_col, value)) = pending.next_if(|(c, _)| **c < col) {
            write_cell(writer, row, *new_col, value, None, part)?;
        }
        match pending.next_if(|(c, _)| **c == col) {
            Some((_, value)) => {
                let style = attribute(&element, b"s", part)?;
                if !is_empty {
                    reader
                        .read_to_end_into(QName(b"c"), &mut skip_buf)
                        .map_err(xml_error(part))?;
                    skip_buf.clear();
                }
                write_cell(writer, row, col, value, style.as_deref(), part)?;
            }
            None if is_empty => write_event(writer, Event::Empty(element), part)?,
            None => write_event(writer, Event::Start(element), part)?,
        }
        buf.clear();
    }
}

fn row_number(element: &BytesStart<'_>, part: &str) -> Result<Option<u32>> {
    Ok(attribute(element, b"r", part)?.and_then(|r| r.parse().ok()))
}

fn cell_column(element: &BytesStart<'_>, part: &str) -> Result<Option<u16>> {
    Ok(attribute(element, b"r", part)?
        .and_then(|r| parse_cell_ref(&r))
        .map(|(col, _)| col))
}

/// Copy of a `<row>` start tag without its `spans` hint, which no longer
/// holds once cells are added.
fn row_start<'e>(element: &'e BytesStart<'_>, part: &str) -> Result<BytesStart<'e>> {
    let mut start = BytesStart::new("row");
    for attr in element.attributes() {
        let attr = attr.map_err(|e| xml_error(part)(e.into()))?;
        if attr.key.as_ref() != b"spans" {
            start.push_attribute(attr);
        }
    }
    Ok(start)
}

fn write_new_row(
    writer: &mut Writer<Vec<u8>>,
    row: u32,
    cells: &BTreeMap<u16, CellValue>,
    part: &str,
) -> Result<()> {
    let mut start = BytesStart::new("row");
    start.push_attribute(("r", row.to_string().as_str()));
    write_event(writer, Event::Start(start), part)?;
    for (col, value) in cells {
        write_cell(writer, row, *col, value, None, part)?;
    }
    write_event(writer, Event::End(BytesEnd::new("row")), part)
}

fn write_cell(
    writer: &mut Writer<Vec<u8>>,
    row: u32,
    column: u16,
    value: &CellValue,
    style: Option<&str>,
    part: &str,
) -> Result<()> {
    let reference = cell_ref(row, column);
    let mut start = BytesStart::new("c");
    start.push_attribute(("r", reference.as_str()));
    if let Some(style) = style {
        start.push_attribute(("s", style));
    }

    match value {
        CellValue::Text(text) => {
            start.push_attribute(("t", "inlineStr"));
            write_event(writer, Event::Start(start), part)?;
            write_event(writer, Event::Start(BytesStart::new("is")), part)?;
            let mut t = BytesStart::new("t");
            if text.trim() != text {
                t.push_attribute(("xml:space", "preserve"));
            }
            write_event(writer, Event::Start(t), part)?;
            write_event(writer, Event::Text(BytesText::new(text)), part)?;
            write_event(writer, Event::End(BytesEnd::new("t")), part)?;
            write_event(writer, Event::End(BytesEnd::new("is")), part)?;
        }
        CellValue::Number(number) => write_number(writer, start, *number, part)?,
        CellValue::Date(date) => write_number(writer, start, excel_serial(*date), part)?,
    }

    write_event(writer, Event::End(BytesEnd::new("c")), part)
}

fn write_number(
    writer: &mut Writer<Vec<u8>>,
    start: BytesStart<'_>,
    number: f64,
    part: &str,
) -> Result<()> {
    write_event(writer, Event::Start(start), part)?;
    write_event(writer, Event::Start(BytesStart::new("v")), part)?;
    let text = number.to_string();
    write_event(writer, Event::Text(BytesText::new(&text)), part)?;
    write_event(writer, Event::End(BytesEnd::new("v")), part)
}

fn write_event(writer: &mut Writer<Vec<u8>>, event: Event<'_>, part: &str) -> Result<()> {
    writer.write_event(event).map_err(write_error(part))
}
