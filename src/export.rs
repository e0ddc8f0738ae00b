//! Summary download: render the summary text as a paginated PDF.
//!
//! The export is deliberately plain: an A4 page with a bold centered
//! title, then the summary text in Helvetica, wrapped to a fixed column
//! width and spilled onto further pages as needed. Only the summary text
//! is exported; the diagram stays on screen.

use std::path::Path;

use lopdf::content::{Content, Operation};
use lopdf::{dictionary, Document, Object, Stream};
use tracing::{debug, info};

use crate::error::ViewError;

/// A4 portrait, in PDF points.
const PAGE_WIDTH: f32 = 595.28;
const PAGE_HEIGHT: f32 = 841.89;
/// 15 mm on every side.
const MARGIN: f32 = 42.52;
const TITLE_SIZE: f32 = 16.0;
const BODY_SIZE: f32 = 12.0;
/// Vertical advance per body line, 7 mm.
const LINE_STEP: f32 = 19.84;
/// First body line sits two line-steps below the title.
const BODY_START: f32 = MARGIN + 42.52;
/// Column budget for the greedy wrapper, sized for 12 pt Helvetica
/// between the margins.
const WRAP_COLUMNS: usize = 85;

/// Heading drawn at the top of the first page.
pub const EXPORT_TITLE: &str = "Generated Summary";
/// File name offered when the caller does not pick one.
pub const DEFAULT_EXPORT_FILENAME: &str = "summary.pdf";

fn export_failure(e: impl std::fmt::Display) -> ViewError {
    ViewError::ExportFailure {
        detail: e.to_string(),
    }
}

/// Render `summary` under `title` and return the finished PDF bytes.
pub fn render_summary_pdf(summary: &str, title: &str) -> Result<Vec<u8>, ViewError> {
    let mut doc = Document::with_version("1.5");
    let pages_id = doc.new_object_id();

    let body_font_id = doc.add_object(dictionary! {
        "Type" => "Font",
        "Subtype" => "Type1",
        "BaseFont" => "Helvetica",
    });
    let title_font_id = doc.add_object(dictionary! {
        "Type" => "Font",
        "Subtype" => "Type1",
        "BaseFont" => "Helvetica-Bold",
    });
    let resources_id = doc.add_object(dictionary! {
        "Font" => dictionary! {
            "F1" => body_font_id,
            "F2" => title_font_id,
        },
    });

    let pages = page_operations(summary, title);
    let page_count = pages.len();
    let mut kids: Vec<Object> = Vec::with_capacity(page_count);
    for operations in pages {
        let content = Content { operations };
        let encoded = content.encode().map_err(export_failure)?;
        let content_id = doc.add_object(Stream::new(dictionary! {}, encoded));
        let page_id = doc.add_object(dictionary! {
            "Type" => "Page",
            "Parent" => pages_id,
            "Contents" => content_id,
        });
        kids.push(Object::Reference(page_id));
    }

    doc.objects.insert(
        pages_id,
        Object::Dictionary(dictionary! {
            "Type" => "Pages",
            "Kids" => kids,
            "Count" => page_count as i64,
            "Resources" => resources_id,
            "MediaBox" => vec![0.into(), 0.into(), PAGE_WIDTH.into(), PAGE_HEIGHT.into()],
        }),
    );
    let catalog_id = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
    });
    doc.trailer.set("Root", Object::Reference(catalog_id));

    let mut bytes = Vec::new();
    doc.save_to(&mut bytes).map_err(export_failure)?;
    debug!(pages = page_count, bytes = bytes.len(), "rendered summary export");
    Ok(bytes)
}

/// Render and write straight to `path`.
pub fn export_to_file(summary: &str, title: &str, path: &Path) -> Result<(), ViewError> {
    let bytes = render_summary_pdf(summary, title)?;
    std::fs::write(path, &bytes)
        .map_err(|e| export_failure(format!("write {}: {e}", path.display())))?;
    info!(path = %path.display(), bytes = bytes.len(), "summary exported");
    Ok(())
}

/// Split the summary into pages of drawing operations.
///
/// The cursor walks down from the top of the page; a line that would land
/// below the bottom margin starts a new page instead. Blank lines advance
/// the cursor without drawing.
fn page_operations(summary: &str, title: &str) -> Vec<Vec<Operation>> {
    let mut pages = Vec::new();
    let mut current = title_operations(title);
    let mut y_from_top = BODY_START;
    for line in wrap_lines(summary, WRAP_COLUMNS) {
        if y_from_top > PAGE_HEIGHT - MARGIN {
            pages.push(std::mem::take(&mut current));
            y_from_top = MARGIN;
        }
        if !line.is_empty() {
            current.extend(text_operations(&line, y_from_top));
        }
        y_from_top += LINE_STEP;
    }
    pages.push(current);
    pages
}

fn title_operations(title: &str) -> Vec<Operation> {
    // Helvetica averages about half an em per glyph, close enough to
    // center a heading.
    let width = title.chars().count() as f32 * TITLE_SIZE * 0.5;
    let x = ((PAGE_WIDTH - width) / 2.0).max(MARGIN);
    let y = PAGE_HEIGHT - MARGIN - TITLE_SIZE;
    vec![
        Operation::new("BT", vec![]),
        Operation::new("Tf", vec!["F2".into(), TITLE_SIZE.into()]),
        Operation::new("Td", vec![x.into(), y.into()]),
        Operation::new("Tj", vec![Object::string_literal(title)]),
        Operation::new("ET", vec![]),
    ]
}

fn text_operations(line: &str, y_from_top: f32) -> Vec<Operation> {
    let y = PAGE_HEIGHT - y_from_top - BODY_SIZE;
    vec![
        Operation::new("BT", vec![]),
        Operation::new("Tf", vec!["F1".into(), BODY_SIZE.into()]),
        Operation::new("Td", vec![MARGIN.into(), y.into()]),
        Operation::new("Tj", vec![Object::string_literal(line)]),
        Operation::new("ET", vec![]),
    ]
}

/// Greedy word wrap. Existing line breaks are kept, blank lines survive
/// as empty entries, and a word longer than the column budget is split
/// mid-word rather than overflowing the margin.
fn wrap_lines(text: &str, columns: usize) -> Vec<String> {
    let columns = columns.max(1);
    let mut lines = Vec::new();
    for raw in text.lines() {
        let raw = raw.trim_end();
        if raw.is_empty() {
            lines.push(String::new());
            continue;
        }
        let mut current = String::new();
        for word in raw.split_whitespace() {
            let word_len = word.chars().count();
            let current_len = current.chars().count();
            if current.is_empty() {
                current = hard_split(word, word_len, columns, &mut lines);
            } else if current_len + 1 + word_len <= columns {
                current.push(' ');
                current.push_str(word);
            } else {
                lines.push(std::mem::take(&mut current));
                current = hard_split(word, word_len, columns, &mut lines);
            }
        }
        lines.push(current);
    }
    lines
}

/// Push all but the last `columns`-sized chunk of an overlong word and
/// return the remainder as the new current line.
fn hard_split(word: &str, word_len: usize, columns: usize, lines: &mut Vec<String>) -> String {
    if word_len <= columns {
        return word.to_string();
    }
    let chars: Vec<char> = word.chars().collect();
    let mut start = 0;
    while chars.len() - start > columns {
        lines.push(chars[start..start + columns].iter().collect());
        start += columns;
    }
    chars[start..].iter().collect()
}
