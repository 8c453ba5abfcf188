//! Fax document renderer: a message plus its TO/FROM/DATE labels in, a
//! single-page US-letter PDF out. Pure function of its inputs, no state.
//!
//! The body is wrapped to the content box width; content taller than the
//! box is NOT reflowed onto further pages. That limitation is deliberate
//! and matches the fixed transmittal layout.

use anyhow::{Result, anyhow};
use chrono::{DateTime, Utc};
use printpdf::{BuiltinFont, Line, Mm, PdfDocument, Point, Pt};

// US letter, in points.
const PAGE_WIDTH: f64 = 612.0;
const PAGE_HEIGHT: f64 = 792.0;

const TEXT_X: f64 = 50.0;
const RULE_MARGIN: f64 = 40.0;

// Content box: x 40..width-40, y 100..height-260.
const BOX_LEFT: f64 = 40.0;
const BOX_BOTTOM: f64 = 100.0;
const BOX_TOP: f64 = PAGE_HEIGHT - 260.0;

const BODY_SIZE: f64 = 11.0;
const BODY_LEADING: f64 = BODY_SIZE * 1.2;
// Courier advance width is 600/1000 em for every glyph.
const COURIER_ADVANCE: f64 = 0.6;

fn pt(v: f64) -> Mm {
    Mm::from(Pt(v))
}

/// Renders the transmittal page and returns the PDF bytes.
pub fn render_fax(
    sender: &str,
    recipient: &str,
    sent_at: DateTime<Utc>,
    body: &str,
) -> Result<Vec<u8>> {
    let (doc, page, layer) = PdfDocument::new(
        "Facsimile Transmittal",
        pt(PAGE_WIDTH),
        pt(PAGE_HEIGHT),
        "fax",
    );
    let layer = doc.get_page(page).get_layer(layer);

    let courier = doc
        .add_builtin_font(BuiltinFont::Courier)
        .map_err(|e| anyhow!("builtin font: {e}"))?;
    let courier_bold = doc
        .add_builtin_font(BuiltinFont::CourierBold)
        .map_err(|e| anyhow!("builtin font: {e}"))?;
    let helvetica = doc
        .add_builtin_font(BuiltinFont::Helvetica)
        .map_err(|e| anyhow!("builtin font: {e}"))?;
    let helvetica_bold = doc
        .add_builtin_font(BuiltinFont::HelveticaBold)
        .map_err(|e| anyhow!("builtin font: {e}"))?;

    // Header rule and title.
    layer.set_outline_thickness(3.0);
    layer.add_shape(stroke_line(vec![
        (RULE_MARGIN, PAGE_HEIGHT - 40.0),
        (PAGE_WIDTH - RULE_MARGIN, PAGE_HEIGHT - 40.0),
    ]));
    layer.use_text(
        "FACSIMILE TRANSMITTAL",
        28.0,
        pt(TEXT_X),
        pt(PAGE_HEIGHT - 80.0),
        &courier_bold,
    );
    layer.use_text(
        "Secure Virtual Fax System",
        10.0,
        pt(TEXT_X),
        pt(PAGE_HEIGHT - 95.0),
        &helvetica,
    );

    // Routing fields.
    let date = sent_at.format("%Y-%m-%d").to_string();
    for (offset, label) in [
        (150.0, format!("TO: {recipient}")),
        (175.0, format!("FROM: {sender}")),
        (200.0, format!("DATE: {date}")),
    ] {
        layer.use_text(label, 12.0, pt(TEXT_X), pt(PAGE_HEIGHT - offset), &helvetica_bold);
    }

    // Content box.
    layer.use_text(
        "MESSAGE:",
        12.0,
        pt(TEXT_X),
        pt(PAGE_HEIGHT - 250.0),
        &helvetica_bold,
    );
    layer.set_outline_thickness(1.0);
    layer.add_shape(closed_box(
        BOX_LEFT,
        BOX_BOTTOM,
        PAGE_WIDTH - BOX_LEFT,
        BOX_TOP,
    ));

    // Body, wrapped to the box width at the Courier monospace measure.
    let content_width = PAGE_WIDTH - 2.0 * TEXT_X;
    let max_chars = (content_width / (BODY_SIZE * COURIER_ADVANCE)) as usize;
    let mut y = PAGE_HEIGHT - 280.0;
    for line in wrap_monospace(body, max_chars) {
        layer.use_text(line, BODY_SIZE, pt(TEXT_X), pt(y), &courier);
        y -= BODY_LEADING;
    }

    doc.save_to_bytes()
        .map_err(|e| anyhow!("failed to serialize PDF: {e}"))
}

fn stroke_line(points: Vec<(f64, f64)>) -> Line {
    Line {
        points: points
            .into_iter()
            .map(|(x, y)| (Point::new(pt(x), pt(y)), false))
            .collect(),
        is_closed: false,
        has_fill: false,
        has_stroke: true,
        is_clipping_path: false,
    }
}

fn closed_box(left: f64, bottom: f64, right: f64, top: f64) -> Line {
    Line {
        points: vec![
            (Point::new(pt(left), pt(bottom)), false),
            (Point::new(pt(right), pt(bottom)), false),
            (Point::new(pt(right), pt(top)), false),
            (Point::new(pt(left), pt(top)), false),
        ],
        is_closed: true,
        has_fill: false,
        has_stroke: true,
        is_clipping_path: false,
    }
}

/// Word wrap for a monospace face: every glyph is one column wide.
/// Words longer than the measure are hard-broken.
fn wrap_monospace(text: &str, max_chars: usize) -> Vec<String> {
    let max_chars = max_chars.max(1);
    let mut lines = Vec::new();

    for raw in text.lines() {
        let mut current = String::new();
        let mut current_len = 0usize;

        for word in raw.split_whitespace() {
            let word_len = word.chars().count();

            if current_len > 0 && current_len + 1 + word_len <= max_chars {
                current.push(' ');
                current.push_str(word);
                current_len += 1 + word_len;
                continue;
            }
            if current_len == 0 && word_len <= max_chars {
                current.push_str(word);
                current_len = word_len;
                continue;
            }

            if current_len > 0 {
                lines.push(std::mem::take(&mut current));
                current_len = 0;
            }

            if word_len <= max_chars {
                current.push_str(word);
                current_len = word_len;
            } else {
                // Hard-break an overlong word into full columns.
                let chars: Vec<char> = word.chars().collect();
                for chunk in chars.chunks(max_chars) {
                    let piece: String = chunk.iter().collect();
                    if piece.chars().count() == max_chars {
                        lines.push(piece);
                    } else {
                        current_len = piece.chars().count();
                        current = piece;
                    }
                }
            }
        }

        if current_len > 0 || raw.split_whitespace().next().is_none() {
            lines.push(current);
        }
    }

    lines
}
