use super::*;
use lopdf::content::{Content, Operation};
use lopdf::{Document, Object, Stream, dictionary};
use std::path::PathBuf;
use tempfile::TempDir;

/// Build a small PDF on disk with one text page per entry.
fn write_fixture_pdf(dir: &TempDir, name: &str, page_texts: &[&str]) -> PathBuf {
    let mut doc = Document::with_version("1.5");
    let pages_id = doc.new_object_id();

    let font_id = doc.add_object(dictionary! {
        "Type" => "Font",
        "Subtype" => "Type1",
        "BaseFont" => "Courier",
    });
    let resources_id = doc.add_object(dictionary! {
        "Font" => dictionary! { "F1" => font_id },
    });

    let mut kids = Vec::new();
    for text in page_texts {
        let content = Content {
            operations: vec![
                Operation::new("BT", vec![]),
                Operation::new("Tf", vec!["F1".into(), 24.into()]),
                Operation::new("Td", vec![72.into(), 720.into()]),
                Operation::new("Tj", vec![Object::string_literal(*text)]),
                Operation::new("ET", vec![]),
            ],
        };
        let content_id = doc.add_object(Stream::new(
            dictionary! {},
            content.encode().expect("should encode content"),
        ));
        let page_id = doc.add_object(dictionary! {
            "Type" => "Page",
            "Parent" => pages_id,
            "Contents" => content_id,
        });
        kids.push(page_id.into());
    }

    let kids_count = kids.len() as i64;
    doc.objects.insert(
        pages_id,
        Object::Dictionary(dictionary! {
            "Type" => "Pages",
            "Kids" => kids,
            "Count" => kids_count,
            "Resources" => resources_id,
            "MediaBox" => vec![0.into(), 0.into(), 612.into(), 792.into()],
        }),
    );

    let catalog_id = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
    });
    doc.trailer.set("Root", catalog_id);

    let path = dir.path().join(name);
    doc.save(&path).expect("should save fixture pdf");
    path
}

#[test]
fn extracts_text_per_page() {
    let temp_dir = TempDir::new().expect("should create temp dir");
    let path = write_fixture_pdf(
        &temp_dir,
        "two_pages.pdf",
        &["Text on the first page", "Text on the second page"],
    );

    let pages = extract_pages(&path).expect("should extract pages");

    assert_eq!(pages.len(), 2);
    assert_eq!(pages[0].0, 1);
    assert!(pages[0].1.contains("Text on the first page"));
    assert_eq!(pages[1].0, 2);
    assert!(pages[1].1.contains("Text on the second page"));
}

#[test]
fn missing_file_is_an_error() {
    let temp_dir = TempDir::new().expect("should create temp dir");
    let result = extract_pages(&temp_dir.path().join("nope.pdf"));
    assert!(result.is_err());
}

#[test]
fn operator_extraction_handles_tj_arrays() {
    let line = "[(Hel) -20 (lo)] TJ";
    assert_eq!(extract_text_from_operator(line), Some("Hello".to_string()));
}

#[test]
fn operator_extraction_handles_simple_tj() {
    assert_eq!(
        extract_text_from_operator("(Hello World) Tj"),
        Some("Hello World".to_string())
    );
    assert_eq!(extract_text_from_operator("100 600 Td"), None);
}

#[test]
fn decodes_string_escapes() {
    assert_eq!(decode_pdf_string("Hello\\nWorld"), "Hello\nWorld");
    assert_eq!(decode_pdf_string("Test\\(paren\\)"), "Test(paren)");
    assert_eq!(decode_pdf_string("back\\\\slash"), "back\\slash");
}

#[test]
fn clean_text_collapses_whitespace() {
    assert_eq!(clean_text("Hello   World\n\nTest"), "Hello World Test");
}
