mod fixtures;

use docfill_batch::docx::DocxTemplate;
use docfill_batch::sheet::ReplacementSheet;
use docfill_batch::{BatchError, BatchOptions, TemplateSet, generate, unmatched_tokens};
use docfill_domain::config::ReplaceScope;
use fixtures::{docx, docx_with_parts, document_xml, header_xml, paragraph, table};

fn template(body: &str) -> TemplateSet {
    TemplateSet::new(DocxTemplate::from_bytes(&docx(body)).unwrap())
}

fn text_of(bytes: &[u8]) -> String {
    DocxTemplate::from_bytes(bytes).unwrap().text(ReplaceScope::All).unwrap()
}

#[test]
fn one_document_per_row_with_named_outputs() {
    let templates = template(&format!(
        "{}{}",
        paragraph("Dear {{NAME}},"),
        paragraph("Welcome to {{COMPANY}} on {{DATE}}.")
    ));
    let sheet = ReplacementSheet::from_csv(
        b"{{NAME}},{{COMPANY}},{{DATE}}\nAda,Acme,2024-05-01\nGrace,Globex,2024-06-01\n",
    )
    .unwrap();

    let report = generate(&templates, sheet, &BatchOptions::default()).unwrap();

    let names: Vec<_> = report.documents.iter().map(|d| d.file_name.as_str()).collect();
    assert_eq!(names, ["document - Ada - Acme.docx", "document - Grace - Globex.docx"]);
    assert_eq!(text_of(&report.documents[0].bytes), "Dear Ada,Welcome to Acme on 2024-05-01.");
    assert_eq!(text_of(&report.documents[1].bytes), "Dear Grace,Welcome to Globex on 2024-06-01.");
    assert_eq!(report.documents[1].index, 1);
    assert_eq!(report.skipped_rows, 0);
}

#[test]
fn empty_cells_leave_tokens_in_place() {
    let templates = template(&paragraph("{{A}} and {{B}}"));
    let sheet = ReplacementSheet::from_csv(b"{{A}},{{B}}\nx,\n").unwrap();

    let report = generate(&templates, sheet, &BatchOptions::default()).unwrap();

    assert_eq!(text_of(&report.documents[0].bytes), "x and {{B}}");
    assert_eq!(report.documents[0].replacements, vec![("{{A}}".to_owned(), "x".to_owned())]);
}

#[test]
fn table_cells_are_replaced() {
    let templates = template(&table(&["{{ROLE}}", "{{CITY}}"]));
    let sheet = ReplacementSheet::from_csv(b"{{ROLE}},{{CITY}}\nEngineer,Kyiv\n").unwrap();

    let report = generate(&templates, sheet, &BatchOptions::default()).unwrap();
    assert_eq!(text_of(&report.documents[0].bytes), "EngineerKyiv");
}

#[test]
fn nested_table_cells_are_replaced() {
    let inner = table(&["{{ROLE}}"]);
    let templates = template(&format!(
        "<w:tbl><w:tr><w:tc>{inner}{}</w:tc><w:tc>{}</w:tc></w:tr></w:tbl>",
        paragraph("in {{CITY}}"),
        paragraph("{{CITY}}")
    ));
    let sheet = ReplacementSheet::from_csv(b"{{ROLE}},{{CITY}}\nEngineer,Kyiv\n").unwrap();

    let report = generate(&templates, sheet, &BatchOptions::default()).unwrap();
    assert_eq!(text_of(&report.documents[0].bytes), "Engineerin KyivKyiv");
}

#[test]
fn rows_beyond_limit_are_skipped() {
    let templates = template(&paragraph("{{N}}"));
    let mut csv = String::from("{{N}}\n");
    for i in 0..30 {
        csv.push_str(&format!("{i}\n"));
    }
    let sheet = ReplacementSheet::from_csv(csv.as_bytes()).unwrap();

    let report = generate(&templates, sheet, &BatchOptions::default()).unwrap();
    assert_eq!(report.documents.len(), 25);
    assert_eq!(report.skipped_rows, 5);
    assert_eq!(report.documents[24].file_name, "document - 24.docx");
}

#[test]
fn zero_limit_is_rejected() {
    let templates = template(&paragraph("{{N}}"));
    let sheet = ReplacementSheet::from_csv(b"{{N}}\n1\n").unwrap();
    let options = BatchOptions { max_documents: 0, ..BatchOptions::default() };

    let err = generate(&templates, sheet, &options).unwrap_err();
    assert!(matches!(err, BatchError::InvalidOptions { .. }));
}

#[test]
fn duplicate_names_are_numbered() {
    let templates = template(&paragraph("{{N}}"));
    let sheet = ReplacementSheet::from_csv(b"{{N}},Reason\nsame,a\nsame,b\n").unwrap();

    let report = generate(&templates, sheet, &BatchOptions::default()).unwrap();
    let names: Vec<_> = report.documents.iter().map(|d| d.file_name.as_str()).collect();
    assert_eq!(names, ["document - same.docx", "document - same (2).docx"]);
}

#[test]
fn rows_pick_their_category_template() {
    let templates = template(&paragraph("General {{NAME}}"))
        .with_category("Tech", DocxTemplate::from_bytes(&docx(&paragraph("Tech {{NAME}}"))).unwrap());
    let sheet =
        ReplacementSheet::from_csv(b"{{NAME}},__CATEGORY__\nAda,tech\nGrace,\n").unwrap();

    let report = generate(&templates, sheet, &BatchOptions::default()).unwrap();
    assert_eq!(text_of(&report.documents[0].bytes), "Tech Ada");
    assert_eq!(text_of(&report.documents[1].bytes), "General Grace");
    assert_eq!(report.documents[0].file_name, "document - Ada.docx");
}

#[test]
fn tokens_found_only_in_a_category_template_are_matched() {
    let templates = template(&paragraph("General {{NAME}}"))
        .with_category("tech", DocxTemplate::from_bytes(&docx(&paragraph("{{NAME}} on {{STACK}}"))).unwrap());
    let sheet = ReplacementSheet::from_csv(
        b"{{NAME}},{{STACK}},{{MISSING}},__CATEGORY__\nAda,Rust,x,tech\nGrace,,,\n",
    )
    .unwrap();

    assert_eq!(unmatched_tokens(&templates, &sheet, ReplaceScope::Body).unwrap(), ["{{MISSING}}"]);
}

#[test]
fn unused_category_templates_do_not_match_tokens() {
    let templates = template(&paragraph("General {{NAME}}"))
        .with_category("tech", DocxTemplate::from_bytes(&docx(&paragraph("{{STACK}}"))).unwrap());
    let sheet = ReplacementSheet::from_csv(b"{{NAME}},{{STACK}}\nAda,Rust\n").unwrap();

    assert_eq!(unmatched_tokens(&templates, &sheet, ReplaceScope::Body).unwrap(), ["{{STACK}}"]);
}

#[test]
fn unknown_category_fails_the_batch() {
    let templates = template(&paragraph("{{NAME}}"));
    let sheet = ReplacementSheet::from_csv(b"{{NAME}},__category__\nAda,legal\n").unwrap();

    let err = generate(&templates, sheet, &BatchOptions::default()).unwrap_err();
    assert_eq!(err.kind(), "unknown_category");
    assert!(err.to_string().contains("legal"));
}

#[test]
fn headers_follow_scope() {
    let bytes = docx_with_parts(&[
        ("word/document.xml", &document_xml(&paragraph("Body {{NAME}}"))),
        ("word/header1.xml", &header_xml(&paragraph("Header {{NAME}}"))),
    ]);
    let templates = TemplateSet::new(DocxTemplate::from_bytes(&bytes).unwrap());

    let body_only = generate(
        &templates,
        ReplacementSheet::from_csv(b"{{NAME}}\nAda\n").unwrap(),
        &BatchOptions::default(),
    )
    .unwrap();
    assert_eq!(text_of(&body_only.documents[0].bytes), "Body AdaHeader {{NAME}}");

    let everywhere = generate(
        &templates,
        ReplacementSheet::from_csv(b"{{NAME}}\nAda\n").unwrap(),
        &BatchOptions { scope: ReplaceScope::All, ..BatchOptions::default() },
    )
    .unwrap();
    assert_eq!(text_of(&everywhere.documents[0].bytes), "Body AdaHeader Ada");
}
