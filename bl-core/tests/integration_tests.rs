//! Integration tests for delivery-note to WMS document generation.
//!
//! Generated workbooks are read back with calamine and checked cell by cell
//! at the positions the WMS importer reads. Templates are built in-test with
//! rust_xlsxwriter so no binary fixtures live in the repository.

use bl_core::{
    generate_bootstrap, generate_reception, parse_extraction, Batch, ConvertError, DocumentKind,
    ExtractionResult, FixedValues, Layout, LineStatus, MappingTables,
};
use calamine::{Data, Range, Reader, Xlsx};
use pretty_assertions::assert_eq;
use rust_xlsxwriter::{Format, Workbook};
use std::io::Cursor;
use std::path::Path;

/// Fixture directory for integration tests
const FIXTURE_DIR: &str = "tests/fixtures";

const BOOTSTRAP: &str = "Articles à intégrer";
const RECEPTION_HEADER: &str = "Entête Réception";
const RECEPTION_LINES: &str = "Lignes de Commandes";

/// 2025-12-13 as an Excel serial day number.
const DELIVERY_SERIAL: f64 = 46004.0;

const EXTRACTION: &str = r#"```json
{
  "infoBL": {
    "refCommande": "IMB-2025-118",
    "dateLivraison": "2025-12-13",
    "fournisseur": "IMBRETEX",
    "transporteur": "DHL",
    "nbColis": 3,
    "poidsTotal": 12.5
  },
  "lignes": [
    { "ref": "JH001PHXS", "designation": "SWEAT CAPUCHE", "couleur": "DEEP BLACK", "taille": "S", "qte": 12 },
    { "ref": "JH101", "designation": "SWEAT GROS CORDON", "couleur": "UNKNOWN HUE", "taille": "M", "qte": 5 },
    { "ref": "ZZ999", "designation": "INCONNU", "couleur": "DEEP BLACK", "taille": "S", "qte": 1 }
  ]
}
```"#;

// ==================== Helpers ====================

fn extraction() -> ExtractionResult {
    parse_extraction(EXTRACTION).expect("fixture should parse")
}

fn batch() -> (ExtractionResult, Batch) {
    let extraction = extraction();
    let batch = Batch::from_extraction(MappingTables::builtin(), &extraction);
    (extraction, batch)
}

fn open(bytes: &[u8]) -> Xlsx<Cursor<Vec<u8>>> {
    Xlsx::new(Cursor::new(bytes.to_vec())).expect("generated document should be a valid xlsx")
}

fn range(bytes: &[u8], sheet: &str) -> Range<Data> {
    open(bytes)
        .worksheet_range(sheet)
        .unwrap_or_else(|e| panic!("sheet '{}' should be readable: {}", sheet, e))
}

/// Cell at 1-based row and column.
fn cell(range: &Range<Data>, row: u32, column: u32) -> Data {
    range
        .get_value((row - 1, column - 1))
        .cloned()
        .unwrap_or(Data::Empty)
}

fn text(range: &Range<Data>, row: u32, column: u32) -> String {
    match cell(range, row, column) {
        Data::String(s) => s,
        other => panic!("expected text at ({}, {}), got {:?}", row, column, other),
    }
}

fn number(range: &Range<Data>, row: u32, column: u32) -> f64 {
    match cell(range, row, column) {
        Data::Float(f) => f,
        Data::Int(i) => i as f64,
        Data::DateTime(dt) => dt.as_f64(),
        other => panic!("expected number at ({}, {}), got {:?}", row, column, other),
    }
}

fn bootstrap_template() -> Vec<u8> {
    let mut workbook = Workbook::new();

    let sheet = workbook.add_worksheet();
    sheet.set_name(BOOTSTRAP).unwrap();
    sheet.write_string(0, 0, "Import Articles").unwrap();
    sheet.write_string(14, 3, "Type opération").unwrap();
    sheet.write_string(14, 5, "Code Article").unwrap();

    let notice = workbook.add_worksheet();
    notice.set_name("Notice").unwrap();
    notice.write_string(0, 0, "Ne pas modifier").unwrap();

    workbook.save_to_buffer().unwrap()
}

fn reception_template() -> Vec<u8> {
    let date_format = Format::new().set_num_format("dd/mm/yyyy");
    let mut workbook = Workbook::new();

    let header = workbook.add_worksheet();
    header.set_name(RECEPTION_HEADER).unwrap();
    header.write_string(0, 0, "Réception attendue").unwrap();
    header.write_string(6, 5, "N° Commande").unwrap();
    // Preformatted date cell the fill must keep
    header.write_blank(7, 24, &date_format).unwrap();

    let lines = workbook.add_worksheet();
    lines.set_name(RECEPTION_LINES).unwrap();
    lines.write_string(12, 3, "N° Commande").unwrap();
    lines.write_string(12, 14, "Quantité").unwrap();

    workbook.save_to_buffer().unwrap()
}

// ==================== End-to-end Transformation ====================

#[test]
fn test_batch_from_extraction() {
    let (extraction, batch) = batch();

    assert_eq!(extraction.supplier(), "IMBRETEX");
    assert_eq!(batch.lines.len(), 3);
    assert!(!batch.is_clean());
    assert_eq!(batch.summary.ok, 1);
    assert_eq!(batch.summary.errors, 2);

    let ok = &batch.lines[0];
    assert_eq!(ok.internal_article_code, "YP001-0001-0002-01");
    assert_eq!(ok.label, "SWEAT A CAPUCHE PETIT CORDON");
    assert_eq!(ok.resolved_color, "NOIR");
    assert_eq!(ok.resolved_size, "S");
    assert_eq!(ok.status, LineStatus::Ok);

    let bad_color = &batch.lines[1];
    assert_eq!(bad_color.internal_article_code, "YP002-XXXX-0003-01");
    assert_eq!(bad_color.status, LineStatus::Error);
    assert_eq!(bad_color.error_detail.as_deref(), Some("unknown color: UNKNOWN HUE"));

    let unknown = &batch.lines[2];
    assert_eq!(unknown.internal_article_code, "ERREUR");
    assert_eq!(unknown.resolved_color, "");
    assert!(unknown.error_detail.as_deref().unwrap().contains("ZZ999"));

    assert_eq!(
        batch.validation.errors,
        vec![
            "Line 2 (JH101): unknown color: UNKNOWN HUE".to_string(),
            "Line 3 (ZZ999): unknown supplier reference: ZZ999".to_string(),
        ]
    );
}

#[test]
fn test_preview_json_shape() {
    let (_, batch) = batch();
    let json = serde_json::to_value(&batch.lines[0]).unwrap();

    assert_eq!(json["internalArticleCode"], "YP001-0001-0002-01");
    assert_eq!(json["externalReference"], "JH001PHXS");
    assert_eq!(json["status"], "ok");
    assert!(json.get("errorDetail").is_none());
}

#[test]
fn test_mapping_file_matches_builtin() {
    let path = Path::new(FIXTURE_DIR).join("mapping.toml");
    let tables = MappingTables::from_file(&path).unwrap();

    assert_eq!(&tables, MappingTables::builtin());
}

#[test]
fn test_mapping_file_missing() {
    let path = Path::new(FIXTURE_DIR).join("missing.toml");
    let err = MappingTables::from_file(&path).unwrap_err();

    assert!(matches!(err, ConvertError::ReadFile { .. }), "got {:?}", err);
}

// ==================== Fresh Documents ====================

#[test]
fn test_fresh_bootstrap() {
    let (extraction, batch) = batch();
    let order = &extraction.header().unwrap().order_reference;
    let doc = generate_bootstrap(&batch.lines, order, &FixedValues::default(), Layout::Fresh)
        .unwrap();

    assert_eq!(doc.kind, DocumentKind::Bootstrap);
    assert_eq!(doc.filename, "bootstrap_IMB-2025-118.xlsx");
    assert_eq!(open(&doc.bytes).sheet_names(), vec![BOOTSTRAP.to_string()]);

    let sheet = range(&doc.bytes, BOOTSTRAP);
    assert_eq!(sheet.height(), 1 + batch.lines.len());
    assert_eq!(sheet.width(), 15);
    assert_eq!(text(&sheet, 1, 1), "Type opération");
    assert_eq!(text(&sheet, 1, 3), "Code Article");
    assert_eq!(text(&sheet, 1, 15), "Coloris fournisseur");

    assert_eq!(text(&sheet, 2, 1), "C");
    assert_eq!(number(&sheet, 2, 2), 94.0);
    assert_eq!(text(&sheet, 2, 3), "YP001-0001-0002-01");
    assert_eq!(text(&sheet, 2, 4), "SWEAT A CAPUCHE PETIT CORDON");
    assert_eq!(text(&sheet, 2, 5), "JH001PHXS");
    assert_eq!(text(&sheet, 2, 6), "HSS");
    assert_eq!(number(&sheet, 2, 7), 1.0);
    assert_eq!(text(&sheet, 2, 8), "O");
    assert_eq!(text(&sheet, 2, 9), "Z0");
    assert_eq!(text(&sheet, 2, 10), "PS1");
    assert_eq!(text(&sheet, 2, 11), "XXX");
    assert_eq!(text(&sheet, 2, 12), "ENT");
    assert_eq!(text(&sheet, 2, 13), "S");
    assert_eq!(text(&sheet, 2, 14), "NOIR");
    assert_eq!(text(&sheet, 2, 15), "DEEP BLACK");

    // Error lines are written too
    assert_eq!(text(&sheet, 4, 3), "ERREUR");
    assert_eq!(text(&sheet, 4, 4), "unknown reference");
}

#[test]
fn test_fresh_reception() {
    let (extraction, batch) = batch();
    let header = extraction.header().unwrap();
    let doc = generate_reception(header, &batch.lines, &FixedValues::default(), Layout::Fresh)
        .unwrap();

    assert_eq!(doc.kind, DocumentKind::Reception);
    assert_eq!(doc.filename, "reception_IMB-2025-118.xlsx");
    assert_eq!(
        open(&doc.bytes).sheet_names(),
        vec![RECEPTION_HEADER.to_string(), RECEPTION_LINES.to_string()]
    );

    let head = range(&doc.bytes, RECEPTION_HEADER);
    assert_eq!(head.height(), 2);
    assert_eq!(text(&head, 1, 7), "Date réception");
    assert_eq!(number(&head, 2, 1), 94.0);
    assert_eq!(text(&head, 2, 2), "01");
    assert_eq!(text(&head, 2, 3), "IMB-2025-118");
    assert_eq!(text(&head, 2, 4), "ENT");
    assert_eq!(text(&head, 2, 5), "IMBRETEX");
    assert_eq!(text(&head, 2, 6), "DHL");
    assert!(matches!(cell(&head, 2, 7), Data::DateTime(_)));
    assert_eq!(number(&head, 2, 7), DELIVERY_SERIAL);
    assert_eq!(text(&head, 2, 8), "BL IMB-2025-118 - 3 colis - 12.5kg");

    let lines = range(&doc.bytes, RECEPTION_LINES);
    assert_eq!(lines.height(), 1 + batch.lines.len());
    assert_eq!(text(&lines, 1, 3), "Quantité UVC");
    for (idx, line) in batch.lines.iter().enumerate() {
        let row = idx as u32 + 2;
        assert_eq!(text(&lines, row, 1), "IMB-2025-118");
        assert_eq!(text(&lines, row, 2), line.internal_article_code);
        assert_eq!(number(&lines, row, 3), f64::from(line.quantity));
    }
}

#[test]
fn test_fresh_empty_batch() {
    let extraction = parse_extraction(
        r#"{"infoBL": {"refCommande": "R0", "dateLivraison": "2025-01-02"}, "lignes": []}"#,
    )
    .unwrap();
    let batch = Batch::from_extraction(MappingTables::builtin(), &extraction);
    assert!(batch.validation.passed);
    assert_eq!(batch.validation.warnings.len(), 1);

    let doc = generate_reception(
        extraction.header().unwrap(),
        &batch.lines,
        &FixedValues::default(),
        Layout::Fresh,
    )
    .unwrap();

    let lines = range(&doc.bytes, RECEPTION_LINES);
    assert_eq!(lines.height(), 1);
    let head = range(&doc.bytes, RECEPTION_HEADER);
    assert_eq!(text(&head, 2, 3), "R0");
}

// ==================== Template Documents ====================

#[test]
fn test_template_bootstrap() {
    let (_, batch) = batch();
    let template = bootstrap_template();
    let doc = generate_bootstrap(
        &batch.lines,
        "IMB-2025-118",
        &FixedValues::default(),
        Layout::Template(&template),
    )
    .unwrap();

    let sheet = range(&doc.bytes, BOOTSTRAP);

    // Template content above the data area is untouched
    assert_eq!(text(&sheet, 1, 1), "Import Articles");
    assert_eq!(text(&sheet, 15, 4), "Type opération");
    assert_eq!(text(&sheet, 15, 6), "Code Article");

    assert_eq!(text(&sheet, 16, 4), "C");
    assert_eq!(number(&sheet, 16, 5), 94.0);
    assert_eq!(text(&sheet, 16, 6), "YP001-0001-0002-01");
    assert_eq!(text(&sheet, 16, 7), "SWEAT A CAPUCHE PETIT CORDON");
    assert_eq!(text(&sheet, 16, 9), "JH001PHXS");
    assert_eq!(text(&sheet, 16, 10), "HSS");
    assert_eq!(number(&sheet, 16, 13), 1.0);
    assert_eq!(text(&sheet, 16, 16), "O");
    // BN, BO, CP, CW, DQ, DR, DS
    assert_eq!(text(&sheet, 16, 66), "Z0");
    assert_eq!(text(&sheet, 16, 67), "PS1");
    assert_eq!(text(&sheet, 16, 94), "XXX");
    assert_eq!(text(&sheet, 16, 101), "ENT");
    assert_eq!(text(&sheet, 16, 121), "S");
    assert_eq!(text(&sheet, 16, 122), "NOIR");
    assert_eq!(text(&sheet, 16, 123), "DEEP BLACK");

    assert_eq!(text(&sheet, 17, 6), "YP002-XXXX-0003-01");
    assert_eq!(text(&sheet, 18, 6), "ERREUR");
    assert_eq!(cell(&sheet, 19, 6), Data::Empty);

    // Columns outside the field table stay empty
    assert_eq!(cell(&sheet, 16, 8), Data::Empty);

    let notice = range(&doc.bytes, "Notice");
    assert_eq!(text(&notice, 1, 1), "Ne pas modifier");
}

#[test]
fn test_template_reception() {
    let (extraction, batch) = batch();
    let template = reception_template();
    let doc = generate_reception(
        extraction.header().unwrap(),
        &batch.lines,
        &FixedValues::default(),
        Layout::Template(&template),
    )
    .unwrap();

    let head = range(&doc.bytes, RECEPTION_HEADER);
    assert_eq!(text(&head, 1, 1), "Réception attendue");
    assert_eq!(text(&head, 7, 6), "N° Commande");
    assert_eq!(number(&head, 8, 4), 94.0);
    assert_eq!(text(&head, 8, 5), "01");
    assert_eq!(text(&head, 8, 6), "IMB-2025-118");
    assert_eq!(text(&head, 8, 7), "ENT");
    assert_eq!(text(&head, 8, 11), "IMBRETEX");
    assert_eq!(text(&head, 8, 15), "DHL");
    // Serial keeps the template's date style
    assert!(matches!(cell(&head, 8, 25), Data::DateTime(_)));
    assert_eq!(number(&head, 8, 25), DELIVERY_SERIAL);
    assert_eq!(text(&head, 8, 38), "BL IMB-2025-118 - 3 colis - 12.5kg");
    assert_eq!(cell(&head, 9, 6), Data::Empty);

    let lines = range(&doc.bytes, RECEPTION_LINES);
    assert_eq!(text(&lines, 13, 4), "N° Commande");
    for (idx, line) in batch.lines.iter().enumerate() {
        let row = idx as u32 + 14;
        assert_eq!(text(&lines, row, 4), "IMB-2025-118");
        assert_eq!(text(&lines, row, 6), line.internal_article_code);
        assert_eq!(number(&lines, row, 15), f64::from(line.quantity));
    }
    assert_eq!(cell(&lines, 17, 4), Data::Empty);
}

#[test]
fn test_template_is_reusable() {
    let (_, batch) = batch();
    let template = bootstrap_template();
    let constants = FixedValues::default();

    let first = generate_bootstrap(&batch.lines, "A", &constants, Layout::Template(&template)).unwrap();
    let second =
        generate_bootstrap(&batch.lines[..1], "B", &constants, Layout::Template(&template)).unwrap();

    assert_eq!(text(&range(&first.bytes, BOOTSTRAP), 18, 6), "ERREUR");
    assert_eq!(cell(&range(&second.bytes, BOOTSTRAP), 17, 6), Data::Empty);
}

#[test]
fn test_custom_constants() {
    let (_, batch) = batch();
    let constants = FixedValues {
        warehouse_id: 12,
        depot: "A1".to_string(),
        ..FixedValues::default()
    };
    let doc = generate_bootstrap(&batch.lines, "R", &constants, Layout::Fresh).unwrap();
    let sheet = range(&doc.bytes, BOOTSTRAP);

    assert_eq!(number(&sheet, 2, 2), 12.0);
    assert_eq!(text(&sheet, 2, 9), "A1");
}

// ==================== Template Errors ====================

#[test]
fn test_template_missing_sheet() {
    let mut workbook = Workbook::new();
    workbook.add_worksheet().set_name(RECEPTION_HEADER).unwrap();
    let template = workbook.save_to_buffer().unwrap();

    let (extraction, batch) = batch();
    let err = generate_reception(
        extraction.header().unwrap(),
        &batch.lines,
        &FixedValues::default(),
        Layout::Template(&template),
    )
    .unwrap_err();

    match err {
        ConvertError::MissingSheet { sheet } => assert_eq!(sheet, RECEPTION_LINES),
        other => panic!("expected MissingSheet, got {:?}", other),
    }
}

#[test]
fn test_bootstrap_template_wrong_sheet() {
    let template = reception_template();
    let (_, batch) = batch();
    let err = generate_bootstrap(
        &batch.lines,
        "R",
        &FixedValues::default(),
        Layout::Template(&template),
    )
    .unwrap_err();

    assert!(matches!(err, ConvertError::MissingSheet { ref sheet } if sheet == BOOTSTRAP));
}

#[test]
fn test_template_not_a_workbook() {
    let (_, batch) = batch();
    let err = generate_bootstrap(
        &batch.lines,
        "R",
        &FixedValues::default(),
        Layout::Template(b"not a zip archive"),
    )
    .unwrap_err();

    assert!(matches!(err, ConvertError::InvalidTemplate { .. }), "got {:?}", err);
}
