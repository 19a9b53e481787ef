//! Integration tests for the Document API.
//!
//! These tests exercise the full pipeline:
//! PDF bytes → Document::open → page loading → stream processor → listeners.
//!
//! Test PDFs are created programmatically using lopdf.

use lopdf::{Object, Stream, dictionary};
use pdfpipe::{
    BBox, Document, Event, EventPipe, EventRecorder, ExtractOptions, ExtractWarningCode,
    ImageCollector, PdfError, SimpleTextExtractor, WarningCollector,
};

// --- Test PDF creation helpers ---

/// Build a PDF whose pages each get their own content stream. `extra`
/// lets a test add objects and returns the page resources.
fn pdf_with_pages<F>(contents: &[&str], extra: F) -> Vec<u8>
where
    F: FnOnce(&mut lopdf::Document) -> lopdf::Dictionary,
{
    let mut doc = lopdf::Document::with_version("1.5");
    let pages_id = doc.new_object_id();

    let font_id = doc.add_object(dictionary! {
        "Type" => "Font",
        "Subtype" => "Type1",
        "BaseFont" => "Helvetica",
    });
    let mut resources = extra(&mut doc);
    let fonts = match resources.get(b"Font") {
        Ok(Object::Dictionary(fonts)) => {
            let mut fonts = fonts.clone();
            fonts.set("F1", Object::Reference(font_id));
            fonts
        }
        _ => dictionary! { "F1" => Object::Reference(font_id) },
    };
    resources.set("Font", fonts);

    let mut kids = Vec::new();
    for content in contents {
        let content_id = doc.add_object(Stream::new(dictionary! {}, content.as_bytes().to_vec()));
        let page_id = doc.add_object(dictionary! {
            "Type" => "Page",
            "Parent" => Object::Reference(pages_id),
            "Contents" => Object::Reference(content_id),
        });
        kids.push(Object::Reference(page_id));
    }

    let media_box = vec![
        Object::Integer(0),
        Object::Integer(0),
        Object::Integer(612),
        Object::Integer(792),
    ];
    doc.objects.insert(
        pages_id,
        Object::Dictionary(dictionary! {
            "Type" => "Pages",
            "Count" => Object::Integer(kids.len() as i64),
            "Kids" => kids,
            "MediaBox" => media_box,
            "Resources" => resources,
        }),
    );

    let catalog_id = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => Object::Reference(pages_id),
    });
    doc.trailer.set("Root", Object::Reference(catalog_id));

    let mut buf = Vec::new();
    doc.save_to(&mut buf).unwrap();
    buf
}

fn pdf_with_content(content: &str) -> Vec<u8> {
    pdf_with_pages(&[content], |_| lopdf::Dictionary::new())
}

// --- Document ---

#[test]
fn open_and_count_pages() {
    let bytes = pdf_with_pages(&["", "", ""], |_| lopdf::Dictionary::new());
    let doc = Document::open(&bytes, None).unwrap();
    assert_eq!(doc.page_count(), 3);
    assert_eq!(doc.options(), &ExtractOptions::default());
}

#[test]
fn open_rejects_garbage() {
    let err = Document::open(b"not a pdf at all", None).unwrap_err();
    assert!(matches!(err, PdfError::ParseError(_)));
}

#[test]
fn page_out_of_range() {
    let doc = Document::open(&pdf_with_content(""), None).unwrap();
    let mut pipe = EventPipe::new();
    let err = doc.process_page(4, &mut pipe).unwrap_err();
    assert_eq!(err, PdfError::PageOutOfRange { index: 4, count: 1 });
}

#[test]
fn begin_page_carries_inherited_media_box() {
    let doc = Document::open(&pdf_with_content("0 0 m 1 1 l S"), None).unwrap();
    let mut recorder = EventRecorder::new();
    {
        let mut pipe = EventPipe::new().with(&mut recorder);
        doc.process_page(0, &mut pipe).unwrap();
    }
    let Event::BeginPage(info) = &recorder.events[0] else {
        panic!("expected BeginPage");
    };
    assert_eq!(info.index, 0);
    assert_eq!(info.media_box, Some(BBox::new(0.0, 0.0, 612.0, 792.0)));
    assert_eq!(recorder.of_kind("stroke").len(), 1);
}

// --- Text ---

#[test]
fn extract_hello_world() {
    let doc = Document::open(&pdf_with_content("BT /F1 12 Tf 72 720 Td (Hello World) Tj ET"), None).unwrap();
    assert_eq!(doc.extract_text(0).unwrap(), "Hello World");
}

#[test]
fn extract_lines_in_reading_order() {
    let content = "BT /F1 12 Tf 72 706 Td (second) Tj ET BT /F1 12 Tf 72 720 Td (first) Tj ET";
    let doc = Document::open(&pdf_with_content(content), None).unwrap();
    assert_eq!(doc.extract_text(0).unwrap(), "first\nsecond");
}

#[test]
fn process_all_pages_in_order() {
    let bytes = pdf_with_pages(
        &["BT /F1 10 Tf 10 10 Td (one) Tj ET", "BT /F1 10 Tf 10 10 Td (two) Tj ET"],
        |_| lopdf::Dictionary::new(),
    );
    let doc = Document::open(&bytes, None).unwrap();
    let mut text = SimpleTextExtractor::new();
    let warnings = {
        let mut pipe = EventPipe::new().with(&mut text);
        doc.process_all(&mut pipe).unwrap()
    };
    assert!(warnings.is_empty());
    assert_eq!(text.page_text(0), Some("one"));
    assert_eq!(text.page_text(1), Some("two"));
}

#[test]
fn find_reports_matches_with_boxes() {
    let doc = Document::open(&pdf_with_content("BT /F1 10 Tf 100 100 Td (invoice 2024-01) Tj ET"), None).unwrap();
    let matches = doc.find(0, r"\d{4}-\d{2}").unwrap();
    assert_eq!(matches.len(), 1);
    assert_eq!(matches[0].text, "2024-01");
    assert_eq!(matches[0].page, 0);
    assert!(matches[0].bbox.x0 > 100.0);

    assert!(matches!(doc.find(0, "("), Err(PdfError::Other(_))));
}

// --- Warnings ---

#[test]
fn missing_font_is_a_warning() {
    let doc = Document::open(&pdf_with_content("BT /F9 12 Tf 10 10 Td (x) Tj ET"), None).unwrap();
    let mut collector = WarningCollector::new();
    let warnings = {
        let mut pipe = EventPipe::new().with(&mut collector);
        doc.process_page(0, &mut pipe).unwrap()
    };
    assert_eq!(warnings.len(), 1);
    assert_eq!(warnings[0].code, ExtractWarningCode::MissingFont);
    assert_eq!(warnings[0].font_name.as_deref(), Some("F9"));
    assert_eq!(collector.warnings, warnings);
    assert_eq!(doc.extract_text(0).unwrap(), "x");
}

#[test]
fn strict_mode_turns_operand_errors_fatal() {
    let bytes = pdf_with_content("(oops) w");
    let lenient = Document::open(&bytes, None).unwrap();
    assert!(lenient.extract_text(0).is_ok());

    let strict = Document::open(
        &bytes,
        Some(ExtractOptions {
            strict_mode: true,
            ..ExtractOptions::default()
        }),
    )
    .unwrap();
    assert!(matches!(strict.extract_text(0), Err(PdfError::OperandError(_))));
}

#[test]
fn unterminated_string_fails_the_page() {
    let doc = Document::open(&pdf_with_content("BT /F1 12 Tf (never closed Tj ET"), None).unwrap();
    assert!(matches!(doc.extract_text(0), Err(PdfError::LexError(_))));
}

// --- Streams and XObjects ---

#[test]
fn compressed_content_is_decoded() {
    let content = b"0 0 m 100 100 l S ".repeat(40);
    let bytes = {
        let mut doc = lopdf::Document::with_version("1.5");
        let mut stream = Stream::new(dictionary! {}, content);
        stream.compress().unwrap();
        assert!(stream.dict.get(b"Filter").is_ok());
        let content_id = doc.add_object(stream);
        let pages_id = doc.new_object_id();
        let page_id = doc.add_object(dictionary! {
            "Type" => "Page",
            "Parent" => Object::Reference(pages_id),
            "Contents" => Object::Reference(content_id),
        });
        doc.objects.insert(
            pages_id,
            Object::Dictionary(dictionary! {
                "Type" => "Pages",
                "Count" => 1,
                "Kids" => vec![Object::Reference(page_id)],
            }),
        );
        let catalog_id = doc.add_object(dictionary! {
            "Type" => "Catalog",
            "Pages" => Object::Reference(pages_id),
        });
        doc.trailer.set("Root", Object::Reference(catalog_id));
        let mut buf = Vec::new();
        doc.save_to(&mut buf).unwrap();
        buf
    };
    let doc = Document::open(&bytes, None).unwrap();
    let mut recorder = EventRecorder::new();
    {
        let mut pipe = EventPipe::new().with(&mut recorder);
        doc.process_page(0, &mut pipe).unwrap();
    }
    assert_eq!(recorder.of_kind("stroke").len(), 40);
}

#[test]
fn image_xobject_is_placed_and_collected() {
    let bytes = pdf_with_pages(&["q 200 0 0 100 50 60 cm /Im0 Do Q"], |doc| {
        let image = Stream::new(
            dictionary! {
                "Type" => "XObject",
                "Subtype" => "Image",
                "Width" => 2,
                "Height" => 1,
                "BitsPerComponent" => 8,
                "ColorSpace" => "DeviceGray",
            },
            vec![0x00, 0xFF],
        );
        let image_id = doc.add_object(image);
        dictionary! { "XObject" => dictionary! { "Im0" => Object::Reference(image_id) } }
    });
    let doc = Document::open(&bytes, None).unwrap();
    let mut images = ImageCollector::new();
    {
        let mut pipe = EventPipe::new().with(&mut images);
        doc.process_page(0, &mut pipe).unwrap();
    }
    let placed = images.images_on(0);
    assert_eq!(placed.len(), 1);
    let image = &placed[0];
    assert_eq!((image.position.x, image.position.y), (50.0, 60.0));
    assert_eq!((image.width, image.height), (200.0, 100.0));
    assert_eq!(image.pixel_width, Some(2));
    assert_eq!(image.color_space.as_deref(), Some("DeviceGray"));
    assert_eq!(&image.data[..], &[0x00, 0xFF]);
}

#[test]
fn form_xobject_with_own_resources() {
    let bytes = pdf_with_pages(&["BT /F1 10 Tf 10 700 Td (page) Tj ET /Fm0 Do"], |doc| {
        let courier = doc.add_object(dictionary! {
            "Type" => "Font",
            "Subtype" => "Type1",
            "BaseFont" => "Courier",
        });
        let form = Stream::new(
            dictionary! {
                "Type" => "XObject",
                "Subtype" => "Form",
                "BBox" => vec![0.into(), 0.into(), 100.into(), 100.into()],
                "Matrix" => vec![1.into(), 0.into(), 0.into(), 1.into(), 10.into(), 500.into()],
                "Resources" => dictionary! {
                    "Font" => dictionary! { "F1" => Object::Reference(courier) },
                },
            },
            b"BT /F1 10 Tf (form) Tj ET".to_vec(),
        );
        let form_id = doc.add_object(form);
        dictionary! { "XObject" => dictionary! { "Fm0" => Object::Reference(form_id) } }
    });
    let doc = Document::open(&bytes, None).unwrap();
    let mut recorder = EventRecorder::new();
    {
        let mut pipe = EventPipe::new().with(&mut recorder);
        doc.process_page(0, &mut pipe).unwrap();
    }
    let texts = recorder.texts();
    assert_eq!(texts.len(), 2);
    assert_eq!(texts[0].font.name(), "Helvetica");
    assert_eq!(texts[1].font.name(), "Courier");
    assert_eq!((texts[1].origin.x, texts[1].origin.y), (10.0, 500.0));
}

#[test]
fn self_painting_form_is_bounded() {
    let bytes = pdf_with_pages(&["/Fm0 Do"], |doc| {
        let form_id = doc.new_object_id();
        let form = Stream::new(
            dictionary! {
                "Type" => "XObject",
                "Subtype" => "Form",
                "BBox" => vec![0.into(), 0.into(), 10.into(), 10.into()],
            },
            b"0 0 m 1 1 l S /Fm0 Do".to_vec(),
        );
        doc.objects.insert(form_id, Object::Stream(form));
        dictionary! { "XObject" => dictionary! { "Fm0" => Object::Reference(form_id) } }
    });
    let options = ExtractOptions {
        max_recursion_depth: 4,
        ..ExtractOptions::default()
    };
    let doc = Document::open(&bytes, Some(options)).unwrap();
    let mut recorder = EventRecorder::new();
    let warnings = {
        let mut pipe = EventPipe::new().with(&mut recorder);
        doc.process_page(0, &mut pipe).unwrap()
    };
    assert_eq!(recorder.of_kind("stroke").len(), 4);
    assert_eq!(warnings.len(), 1);
    assert_eq!(warnings[0].code, ExtractWarningCode::ResourceLimitReached);
}

#[cfg(feature = "parallel")]
#[test]
fn parallel_text_matches_sequential() {
    let contents: Vec<String> = (0..8)
        .map(|i| format!("BT /F1 10 Tf 10 10 Td (page {i}) Tj ET"))
        .collect();
    let refs: Vec<&str> = contents.iter().map(String::as_str).collect();
    let doc = Document::open(&pdf_with_pages(&refs, |_| lopdf::Dictionary::new()), None).unwrap();
    let parallel: Vec<String> = doc
        .extract_text_parallel()
        .into_iter()
        .collect::<Result<_, _>>()
        .unwrap();
    let sequential: Vec<String> = (0..doc.page_count())
        .map(|i| doc.extract_text(i).unwrap())
        .collect();
    assert_eq!(parallel, sequential);
    assert_eq!(parallel[5], "page 5");
}
