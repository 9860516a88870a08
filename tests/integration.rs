//! Integration tests for the faiform rendering pipeline.
//!
//! These exercise the full path from records (or JSON) to PDF bytes:
//! - repeating sections render min(len, capacity) rows
//! - checkmarks follow the flags, and only in a populated render
//! - blank renders carry labels only
//! - output is byte-deterministic and renders are independent

use faiform::error::FormError;
use faiform::font::{FontContext, DINGBATS_FAMILY};
use faiform::layout::{DrawCommand, LayoutPage};
use faiform::model::*;
use faiform::*;

// ─── Helpers ────────────────────────────────────────────────────

fn form1() -> Form1Record {
    Form1Record {
        part_number: "482913".into(),
        part_name: "HOUSING".into(),
        serial_number: "SN-0042".into(),
        fai_report_number: "FAI-7781".into(),
        drawing_number: "D-482913".into(),
        organization_name: "Northgate Machining".into(),
        baseline_part_number: "482913-A".into(),
        detail_fai: true,
        full_fai: true,
        fai_complete: true,
        signature: "Dana Whitfield".into(),
        signature_date: "2021-6-14".into(),
        ..Default::default()
    }
}

fn form2() -> Form2Record {
    Form2Record {
        part_number: "482913".into(),
        part_name: "HOUSING".into(),
        comments: "No deviations.".into(),
        prepared_by: "Rowan Sato".into(),
        prepared_by_date: "2021-6-14".into(),
        ..Default::default()
    }
}

fn uncompressed() -> Renderer {
    Renderer::new().with_options(RenderOptions {
        compress: false,
        ..Default::default()
    })
}

fn texts(page: &LayoutPage) -> Vec<String> {
    page.texts()
}

fn check_count(page: &LayoutPage) -> usize {
    page.elements
        .iter()
        .filter(|el| matches!(el, DrawCommand::Text { style, .. } if style.font_family == DINGBATS_FAMILY))
        .count()
}

fn count_prefixed(page: &LayoutPage, prefix: &str) -> usize {
    texts(page).iter().filter(|t| t.starts_with(prefix)).count()
}

fn contains(bytes: &[u8], needle: &str) -> bool {
    bytes.windows(needle.len()).any(|w| w == needle.as_bytes())
}

/// Inflate every FlateDecode stream in the file.
fn inflated_streams(pdf: &[u8]) -> Vec<Vec<u8>> {
    let mut streams = Vec::new();
    let mut rest = pdf;
    while let Some(start) = find(rest, b"stream\n") {
        let body = &rest[start + 7..];
        let Some(end) = find(body, b"\nendstream") else {
            break;
        };
        if let Ok(data) = miniz_oxide::inflate::decompress_to_vec_zlib(&body[..end]) {
            streams.push(data);
        }
        rest = &body[end + 10..];
    }
    streams
}

fn find(haystack: &[u8], needle: &[u8]) -> Option<usize> {
    haystack.windows(needle.len()).position(|w| w == needle)
}

// ─── Repeating sections ─────────────────────────────────────────

#[test]
fn sub_assembly_rows_are_capped_at_fifteen() {
    for len in [0usize, 3, 15, 20] {
        let mut record = form1();
        record.sub_assemblies = (0..len)
            .map(|i| SubAssembly {
                part_number: format!("PN-{}", i),
                part_name: "BRACKET".into(),
                part_serial_number: format!("S-{}", i),
                fai_report_number: format!("R-{}", i),
            })
            .collect();
        let document = Renderer::new().compose_form1(false, Some(&record)).unwrap();
        assert_eq!(count_prefixed(&document.pages[0], "PN-"), len.min(15), "len {}", len);
    }
}

#[test]
fn form2_sections_are_capped_at_capacity() {
    let mut record = form2();
    record.material_or_processes = (0..30)
        .map(|i| MaterialOrProcess {
            material_or_process_name: format!("MAT-{}", i),
            ..Default::default()
        })
        .collect();
    record.functional_tests = (0..9)
        .map(|i| FunctionalTest {
            functional_test_procedure_number: format!("FTP-{}", i),
            acceptance_report_number: format!("AR-{}", i),
        })
        .collect();

    let document = Renderer::new().compose_form2(false, Some(&record)).unwrap();
    let page = &document.pages[0];
    assert_eq!(count_prefixed(page, "MAT-"), 24);
    assert_eq!(count_prefixed(page, "FTP-"), 7);
    assert_eq!(count_prefixed(page, "AR-"), 7);
    assert!(texts(page).contains(&"MAT-23".to_string()));
    assert!(!texts(page).contains(&"MAT-24".to_string()));
}

#[test]
fn reject_policy_fails_the_render() {
    let mut record = form1();
    record.sub_assemblies = vec![SubAssembly::default(); 16];
    let renderer = Renderer::new().with_options(RenderOptions {
        overflow: OverflowPolicy::Reject,
        ..Default::default()
    });
    let err = renderer.form1(false, Some(&record)).unwrap_err();
    assert!(matches!(
        err,
        FormError::CapacityExceeded {
            section: "subAssemblies",
            capacity: 15,
            len: 16
        }
    ));
    // A blank render has nothing to reject.
    assert!(renderer.form1(true, Some(&record)).is_ok());
}

// ─── Checkmarks ─────────────────────────────────────────────────

#[test]
fn detail_and_partial_scenario() {
    let record = Form1Record {
        detail_fai: true,
        full_fai: false,
        assembly_fai: false,
        partial_fai: true,
        fai_complete: true,
        ..Default::default()
    };
    let document = Renderer::new().compose_form1(false, Some(&record)).unwrap();
    let page = &document.pages[0];
    // Detail, Partial, FAI Complete.
    assert_eq!(check_count(page), 3);
    // Only the label row of the index carries text.
    for prefix in ["15. ", "16. ", "17. ", "18. "] {
        assert_eq!(count_prefixed(page, prefix), 1);
    }
}

#[test]
fn checkmarks_only_in_populated_renders() {
    let record = Form1Record {
        detail_fai: true,
        assembly_fai: true,
        full_fai: true,
        partial_fai: true,
        fai_complete: true,
        ..Default::default()
    };
    let renderer = Renderer::new();
    let populated = renderer.compose_form1(false, Some(&record)).unwrap();
    let blank = renderer.compose_form1(true, Some(&record)).unwrap();
    assert_eq!(check_count(&populated.pages[0]), 5);
    assert_eq!(check_count(&blank.pages[0]), 0);

    let none = Form1Record::default();
    let unflagged = renderer.compose_form1(false, Some(&none)).unwrap();
    // Only "FAI not Complete".
    assert_eq!(check_count(&unflagged.pages[0]), 1);
}

#[test]
fn exclusive_pairs_enforced_on_request() {
    let record = Form1Record {
        detail_fai: true,
        assembly_fai: true,
        full_fai: true,
        ..Default::default()
    };
    assert!(Renderer::new().form1(false, Some(&record)).is_ok());

    let strict = Renderer::new().with_options(RenderOptions {
        enforce_exclusive_pairs: true,
        ..Default::default()
    });
    let err = strict.form1(false, Some(&record)).unwrap_err();
    assert!(matches!(err, FormError::ExclusivePair { .. }));
}

// ─── Blank renders ──────────────────────────────────────────────

#[test]
fn blank_form1_shows_every_numbered_label() {
    let document = Renderer::new().compose_form1(true, None).unwrap();
    let page = &document.pages[0];
    for n in 1..=24 {
        let prefix = format!("{}.", n);
        assert!(count_prefixed(page, &prefix) >= 1, "label {} missing", n);
    }
}

#[test]
fn blank_form2_shows_every_numbered_label() {
    let document = Renderer::new().compose_form2(true, None).unwrap();
    let page = &document.pages[0];
    for n in 1..=15 {
        let prefix = format!("{}. ", n);
        assert!(count_prefixed(page, &prefix) >= 1, "label {} missing", n);
    }
}

#[test]
fn blank_render_carries_no_record_values() {
    let record = ReportRecord {
        form1: form1(),
        form2: form2(),
    };
    let pdf = uncompressed().report(true, Some(&record)).unwrap();
    let bytes = pdf.as_bytes();
    for value in ["482913", "HOUSING", "Dana Whitfield", "Rowan Sato", "No deviations."] {
        assert!(!contains(bytes, value), "{} leaked into blank render", value);
    }
    assert_eq!(pdf, uncompressed().report(false, None).unwrap());
}

// ─── Report and PDF output ──────────────────────────────────────

#[test]
fn report_is_form1_then_form2() {
    let record = ReportRecord {
        form1: form1(),
        form2: form2(),
    };
    let document = Renderer::new().compose_report(false, Some(&record)).unwrap();
    assert_eq!(document.page_count(), 2);
    assert!(texts(&document.pages[0]).contains(&"Form 1: Part Number Accountability".to_string()));
    assert!(texts(&document.pages[1])
        .iter()
        .any(|t| t.starts_with("Form 2: Product Accountability")));

    let pdf = Renderer::new().report(false, Some(&record)).unwrap();
    assert_eq!(pdf.page_count(), 2);
    assert!(contains(pdf.as_bytes(), "/Count 2"));
}

#[test]
fn values_reach_the_content_stream() {
    let pdf = render_form1(false, Some(&form1())).unwrap();
    let streams = inflated_streams(pdf.as_bytes());
    assert!(!streams.is_empty());
    let content: Vec<u8> = streams.concat();
    assert!(contains(&content, "(482913) Tj"));
    assert!(contains(&content, "(Dana Whitfield) Tj"));
    assert!(contains(&content, "(4) Tj"));
    assert!(contains(&content, " re\nS"));
}

#[test]
fn uncompressed_output_has_no_filter() {
    let pdf = uncompressed().form2(false, Some(&form2())).unwrap();
    assert!(!contains(pdf.as_bytes(), "/FlateDecode"));
    assert!(contains(pdf.as_bytes(), "(Rowan Sato) Tj"));
    assert!(contains(pdf.as_bytes(), "/BaseFont /Times-Italic"));
}

#[test]
fn output_is_byte_deterministic() {
    let record = ReportRecord {
        form1: form1(),
        form2: form2(),
    };
    let a = render_report(false, Some(&record)).unwrap();
    let b = render_report(false, Some(&record)).unwrap();
    assert_eq!(a.as_bytes(), b.as_bytes());
}

#[test]
fn concurrent_renders_match_sequential_ones() {
    let renderer = Renderer::new();
    let first = form1();
    let mut second = form1();
    second.part_number = "771204".into();
    second.detail_fai = false;

    let expected_first = renderer.form1(false, Some(&first)).unwrap();
    let expected_second = renderer.form1(false, Some(&second)).unwrap();

    std::thread::scope(|scope| {
        let a = scope.spawn(|| renderer.form1(false, Some(&first)).unwrap());
        let b = scope.spawn(|| renderer.form1(false, Some(&second)).unwrap());
        assert_eq!(a.join().unwrap(), expected_first);
        assert_eq!(b.join().unwrap(), expected_second);
    });
}

#[test]
fn metadata_is_written_without_timestamps() {
    let renderer = Renderer::new().with_options(RenderOptions {
        metadata: Metadata {
            title: Some("FAI 482913".into()),
            ..Default::default()
        },
        ..Default::default()
    });
    let pdf = renderer.form1(true, None).unwrap();
    assert!(contains(pdf.as_bytes(), "/Title (FAI 482913)"));
    assert!(!contains(pdf.as_bytes(), "CreationDate"));
}

#[test]
fn data_uri_wraps_the_pdf() {
    let pdf = render_form2(true, None).unwrap();
    let uri = pdf.to_data_uri();
    assert!(uri.starts_with("data:application/pdf;filename=generated.pdf;base64,"));
    assert!(uri.len() > pdf.as_bytes().len());
}

// ─── Fonts and JSON ─────────────────────────────────────────────

#[test]
fn unregistered_signature_face_fails_populated_only() {
    let renderer = Renderer::new().with_fonts(FontContext::standard_only());
    let err = renderer.form1(false, Some(&form1())).unwrap_err();
    assert!(matches!(err, FormError::MissingFont { ref family } if family == "Signature"));
    assert!(renderer.form1(true, None).is_ok());

    let err = renderer.form2(false, Some(&form2())).unwrap_err();
    assert!(matches!(err, FormError::MissingFont { .. }));
}

/// Load a system TrueType font for testing. Returns None if not available.
fn load_test_font() -> Option<Vec<u8>> {
    let paths = [
        "/usr/share/fonts/truetype/dejavu/DejaVuSans.ttf",
        "/usr/share/fonts/truetype/dejavu/DejaVuSerif.ttf",
        "/usr/share/fonts/truetype/liberation/LiberationSerif-Italic.ttf",
        "/usr/share/fonts/TTF/DejaVuSans.ttf",
        "/System/Library/Fonts/Supplemental/Arial.ttf",
    ];
    for path in &paths {
        if let Ok(data) = std::fs::read(path) {
            if FontContext::new().register_ttf("TestFont", data.clone()).is_ok() {
                return Some(data);
            }
        }
    }
    None
}

fn assert_embedded_signature(bytes: &[u8]) {
    for needle in ["/Subtype /CIDFontType2", "/Subtype /Type0", "/Encoding /Identity-H", "/FontFile2", "/ToUnicode", "/BaseFont /Signature"] {
        assert!(contains(bytes, needle), "missing {}", needle);
    }
    assert!(!contains(bytes, "(Dana Whitfield) Tj"));
    assert!(!contains(bytes, "/BaseFont /Times-Italic"));
}

#[test]
fn registered_signature_face_is_embedded() {
    let font_data = match load_test_font() {
        Some(data) => data,
        None => {
            eprintln!("Skipping: no test TTF font found");
            return;
        }
    };

    let mut fonts = FontContext::new();
    fonts.register_ttf("Signature", font_data).unwrap();
    let pdf = uncompressed().with_fonts(fonts).form1(false, Some(&form1())).unwrap();
    let bytes = pdf.as_bytes();
    assert_embedded_signature(bytes);

    // Glyph-id hex strings, one per signature line.
    let text = String::from_utf8_lossy(bytes);
    assert!(text.lines().any(|l| l.starts_with('<') && l.ends_with("> Tj")));
    // Every drawn glyph gets an explicit width.
    assert!(text.contains("/W [ "));
}

#[test]
fn font_entry_registers_signature_face() {
    use base64::Engine;

    let font_data = match load_test_font() {
        Some(data) => data,
        None => {
            eprintln!("Skipping: no test TTF font found");
            return;
        }
    };

    let src = format!(
        "data:font/ttf;base64,{}",
        base64::engine::general_purpose::STANDARD.encode(&font_data)
    );
    let renderer = Renderer::new().with_options(RenderOptions {
        compress: false,
        fonts: vec![FontEntry {
            family: "Signature".into(),
            src,
        }],
        ..Default::default()
    });
    let pdf = renderer.form2(false, Some(&form2())).unwrap();
    assert_embedded_signature(pdf.as_bytes());
    assert!(!contains(pdf.as_bytes(), "(Rowan Sato) Tj"));
}

#[test]
fn unparseable_font_entry_is_a_font_error() {
    let renderer = Renderer::new().with_options(RenderOptions {
        fonts: vec![FontEntry {
            family: "Signature".into(),
            src: "data:font/ttf;base64,bm90IGEgZm9udA==".into(),
        }],
        ..Default::default()
    });
    let err = renderer.form1(true, None).unwrap_err();
    assert!(matches!(err, FormError::Font(_)));
}

#[test]
fn report_from_json() {
    let json = r#"{
        "form1": {
            "partNumber": "482913",
            "detailFAI": true,
            "partialFAI": true,
            "subAssemblies": [{"partNumber": 1234567, "partName": "BRACKET"}]
        },
        "form2": {
            "partNumber": "482913",
            "materialOrProcesses": [{"materialOrProcessName": "ANODIZE"}]
        }
    }"#;
    let pdf = render_report_json(false, json).unwrap();
    assert_eq!(pdf.page_count(), 2);
    let content = inflated_streams(pdf.as_bytes()).concat();
    assert!(contains(&content, "(1234567) Tj"));
    assert!(contains(&content, "(ANODIZE) Tj"));
}

#[test]
fn malformed_json_is_a_parse_error() {
    let err = render_report_json(false, "{\"form1\": ").unwrap_err();
    assert!(matches!(err, FormError::Parse { .. }));
}
