//! Source file to PDF conversion.
//!
//! Each input line becomes one text line of a Courier page; lines longer
//! than the printable width wrap onto the next line, and a new page starts
//! when the bottom margin is reached. No syntax highlighting.

use lopdf::content::{Content, Operation};
use lopdf::{dictionary, Document, Object, ObjectId, Stream};
use std::path::{Component, Path};

use crate::error::{AlbertError, Result};

pub const MIME_PDF: &str = "application/pdf";
const PY_SUFFIX: &str = ".py";
const PDF_SUFFIX: &str = ".pdf";

/// Courier glyphs are all 600/1000 em wide.
const COURIER_ADVANCE: f32 = 0.6;
const TAB_WIDTH: usize = 4;

/// Page geometry in PDF points.
#[derive(Debug, Clone, Copy)]
pub struct PageLayout {
    pub width: f32,
    pub height: f32,
    pub margin: f32,
    pub font_size: f32,
    pub line_height: f32,
}

impl PageLayout {
    /// A4 with 1cm margins.
    pub fn a4(font_size: f32) -> Self {
        Self {
            width: 595.28,
            height: 841.89,
            margin: 28.35,
            font_size,
            line_height: font_size * 1.4,
        }
    }

    pub fn chars_per_line(&self) -> usize {
        let printable = self.width - 2.0 * self.margin;
        ((printable / (self.font_size * COURIER_ADVANCE)).floor() as usize).max(1)
    }

    pub fn lines_per_page(&self) -> usize {
        let printable = self.height - 2.0 * self.margin;
        ((printable / self.line_height).floor() as usize).max(1)
    }
}

/// Name a source file takes in the collection: the path relative to the scan
/// root with separators flattened to `_` and every `.py` turned into `.pdf`.
///
/// `app/helpers/_search.py` becomes `app_helpers__search.pdf`. The `.py`
/// substitution is textual, so `pkg.py_utils/x.py` becomes
/// `pkg.pdf_utils_x.pdf`; collections filled by the earlier Python uploader
/// use the same names. Files without `.py` in their path get the final
/// extension replaced instead.
pub fn document_name(relative: &Path) -> String {
    let flat = relative
        .components()
        .filter_map(|c| match c {
            Component::Normal(part) => Some(part.to_string_lossy().into_owned()),
            _ => None,
        })
        .collect::<Vec<_>>()
        .join("_");

    if flat.contains(PY_SUFFIX) {
        flat.replace(PY_SUFFIX, PDF_SUFFIX)
    } else {
        Path::new(&flat)
            .with_extension("pdf")
            .to_string_lossy()
            .into_owned()
    }
}

/// Read `path` as UTF-8 and render it to PDF bytes.
pub fn convert_file(path: &Path, layout: &PageLayout) -> Result<Vec<u8>> {
    let text = std::fs::read_to_string(path).map_err(|e| AlbertError::conversion(path, e))?;
    render_text(&text, layout).map_err(|e| AlbertError::conversion(path, e))
}

/// Render plain text to a PDF document.
pub fn render_text(text: &str, layout: &PageLayout) -> lopdf::Result<Vec<u8>> {
    let lines = layout_lines(text, layout.chars_per_line());
    let per_page = layout.lines_per_page();
    let pages: Vec<&[String]> = if lines.is_empty() {
        vec![&[]]
    } else {
        lines.chunks(per_page).collect()
    };

    let mut doc = Document::with_version("1.5");
    let pages_id = doc.new_object_id();
    let font_id = doc.add_object(dictionary! {
        "Type" => "Font",
        "Subtype" => "Type1",
        "BaseFont" => "Courier",
        "Encoding" => "WinAnsiEncoding",
    });
    let resources_id = doc.add_object(dictionary! {
        "Font" => dictionary! {
            "F1" => font_id,
        },
    });

    let mut kids = Vec::with_capacity(pages.len());
    for page_lines in &pages {
        let content = page_content(page_lines, layout);
        let content_id = doc.add_object(Stream::new(dictionary! {}, content.encode()?));
        let page_id = doc.add_object(dictionary! {
            "Type" => "Page",
            "Parent" => pages_id,
            "Contents" => content_id,
        });
        kids.push(Object::Reference(page_id));
    }

    let page_count = kids.len() as i64;
    let pages_dict = dictionary! {
        "Type" => "Pages",
        "Kids" => Object::Array(kids),
        "Count" => Object::Integer(page_count),
        "Resources" => resources_id,
        "MediaBox" => Object::Array(vec![
            Object::Integer(0),
            Object::Integer(0),
            Object::Real(layout.width),
            Object::Real(layout.height),
        ]),
    };
    doc.objects.insert(pages_id, Object::Dictionary(pages_dict));

    let catalog_id: ObjectId = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
    });
    doc.trailer.set("Root", catalog_id);
    doc.compress();

    let mut out = Vec::new();
    doc.save_to(&mut out)?;
    Ok(out)
}

fn page_content(lines: &[String], layout: &PageLayout) -> Content {
    let top = layout.height - layout.margin - layout.font_size;
    let mut operations = vec![
        Operation::new("BT", vec![]),
        Operation::new(
            "Tf",
            vec![Object::Name(b"F1".to_vec()), Object::Real(layout.font_size)],
        ),
        Operation::new("TL", vec![Object::Real(layout.line_height)]),
        Operation::new("Td", vec![Object::Real(layout.margin), Object::Real(top)]),
    ];
    for (i, line) in lines.iter().enumerate() {
        if i > 0 {
            operations.push(Operation::new("T*", vec![]));
        }
        if !line.is_empty() {
            operations.push(Operation::new(
                "Tj",
                vec![Object::string_literal(encode_win_ansi(line))],
            ));
        }
    }
    operations.push(Operation::new("ET", vec![]));
    Content { operations }
}

/// Split text into display lines: one per input line, wrapped at `width`
/// characters. Blank input lines are kept.
fn layout_lines(text: &str, width: usize) -> Vec<String> {
    let mut out = Vec::new();
    for raw in text.lines() {
        let line = raw.replace('\t', &" ".repeat(TAB_WIDTH));
        let chars: Vec<char> = line.trim_end().chars().collect();
        if chars.is_empty() {
            out.push(String::new());
            continue;
        }
        for piece in chars.chunks(width) {
            out.push(piece.iter().collect());
        }
    }
    out
}

/// WinAnsi covers Latin-1 for our purposes; anything else becomes `?`.
fn encode_win_ansi(line: &str) -> Vec<u8> {
    line.chars()
        .map(|c| match u32::from(c) {
            0x20..=0x7e | 0xa0..=0xff => c as u32 as u8,
            _ => b'?',
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn page_strings(bytes: &[u8]) -> Vec<Vec<String>> {
        let doc = Document::load_mem(bytes).unwrap();
        doc.get_pages()
            .values()
            .map(|page_id| {
                let raw = doc.get_page_content(*page_id).unwrap();
                Content::decode(&raw)
                    .unwrap()
                    .operations
                    .into_iter()
                    .filter(|op| op.operator == "Tj")
                    .map(|op| match &op.operands[0] {
                        Object::String(bytes, _) => String::from_utf8_lossy(bytes).into_owned(),
                        other => panic!("unexpected operand {:?}", other),
                    })
                    .collect()
            })
            .collect()
    }

    #[test]
    fn name_flattens_separators_and_swaps_extension() {
        assert_eq!(
            document_name(&PathBuf::from("app/helpers/_search.py")),
            "app_helpers__search.pdf"
        );
        assert_eq!(document_name(&PathBuf::from("main.py")), "main.pdf");
    }

    #[test]
    fn name_replaces_every_py_occurrence() {
        assert_eq!(
            document_name(&PathBuf::from("pkg.py_utils/x.py")),
            "pkg.pdf_utils_x.pdf"
        );
        assert_eq!(document_name(&PathBuf::from("test.py.py")), "test.pdf.pdf");
    }

    #[test]
    fn name_without_py_swaps_extension() {
        assert_eq!(document_name(&PathBuf::from("docs/guide.md")), "docs_guide.pdf");
        assert_eq!(document_name(&PathBuf::from("Makefile")), "Makefile.pdf");
    }

    #[test]
    fn one_text_line_per_input_line() {
        let layout = PageLayout::a4(10.0);
        let pdf = render_text("import os\n\nprint(os.getcwd())\n", &layout).unwrap();
        assert!(pdf.starts_with(b"%PDF-1.5"));
        let pages = page_strings(&pdf);
        assert_eq!(pages.len(), 1);
        assert_eq!(pages[0], vec!["import os", "print(os.getcwd())"]);
    }

    #[test]
    fn long_lines_wrap_at_fixed_width() {
        let layout = PageLayout::a4(10.0);
        let width = layout.chars_per_line();
        let line = "x".repeat(width * 2 + 3);
        let wrapped = layout_lines(&line, width);
        assert_eq!(wrapped.len(), 3);
        assert_eq!(wrapped[0].len(), width);
        assert_eq!(wrapped[2], "xxx");
    }

    #[test]
    fn overflow_starts_new_page() {
        let layout = PageLayout::a4(10.0);
        let per_page = layout.lines_per_page();
        let text = (0..per_page + 5)
            .map(|i| format!("line {}", i))
            .collect::<Vec<_>>()
            .join("\n");
        let pages = page_strings(&render_text(&text, &layout).unwrap());
        assert_eq!(pages.len(), 2);
        assert_eq!(pages[0].len(), per_page);
        assert_eq!(pages[1].last().unwrap(), &format!("line {}", per_page + 4));
    }

    #[test]
    fn empty_text_still_has_a_page() {
        let pages = page_strings(&render_text("", &PageLayout::a4(10.0)).unwrap());
        assert_eq!(pages.len(), 1);
        assert!(pages[0].is_empty());
    }

    #[test]
    fn tabs_expand_and_non_latin_is_replaced() {
        let lines = layout_lines("\tdef f():", 80);
        assert_eq!(lines, vec!["    def f():"]);
        assert_eq!(encode_win_ansi("é→x"), vec![0xe9, b'?', b'x']);
    }

    #[test]
    fn unreadable_file_is_conversion_error() {
        let tmp = tempfile::TempDir::new().unwrap();
        let path = tmp.path().join("bad.py");
        std::fs::write(&path, [0xff, 0xfe, 0x00]).unwrap();
        let err = convert_file(&path, &PageLayout::a4(10.0)).unwrap_err();
        assert!(matches!(err, AlbertError::Conversion { .. }));
    }
}
