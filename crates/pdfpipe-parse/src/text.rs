//! Text showing: `Tj` and the `TJ` array walk.
//!
//! A shown string is decoded into glyphs, measured in text space and placed
//! through `Tm · CTM`. The text matrix then advances by the measured width
//! in text space; the line matrix is untouched.

use std::sync::Arc;

use pdfpipe_core::{Font, MarkedContent, TextEvent, text_span_geometry};

use crate::font::default_font;
use crate::graphics_state::GraphicsState;
use crate::object::Object;

/// Show one string and advance the text matrix. Returns the text event.
pub fn show_string(gs: &mut GraphicsState, bytes: &[u8], marked_content: Option<&MarkedContent>) -> TextEvent {
    let font: Arc<dyn Font> = gs.text.font.clone().unwrap_or_else(default_font);
    let ts = &gs.text;
    let font_size = ts.font_size;
    let scaling = ts.scaling_factor();

    let glyphs = font.decode(bytes);
    let width: f64 = glyphs
        .iter()
        .map(|g| TextEvent::glyph_advance(g, font_size, ts.char_spacing, ts.word_spacing, scaling))
        .sum();

    let matrix = ts.rendering_matrix(&gs.ctm);
    let (origin, baseline_end, bbox) = text_span_geometry(&matrix, 0.0, width, ts.rise, font_size);

    let event = TextEvent {
        text: glyphs.iter().map(|g| g.ch).collect(),
        glyphs,
        font,
        font_size,
        font_color: gs.stroke_color,
        fill_color: gs.fill_color,
        render_mode: ts.render_mode,
        origin,
        baseline_end,
        bbox,
        matrix,
        width,
        char_spacing: ts.char_spacing,
        word_spacing: ts.word_spacing,
        horizontal_scaling: scaling,
        rise: ts.rise,
        marked_content: marked_content.cloned(),
    };
    gs.text.advance(width);
    event
}

/// Apply a `TJ` position adjustment, in thousandths of text space units.
pub fn adjust_position(gs: &mut GraphicsState, adjustment: f64) {
    let ts = &gs.text;
    let tx = -adjustment * 1e-3 * ts.font_size * ts.scaling_factor();
    gs.text.advance(tx);
}

/// Walk a `TJ` array: strings are shown, numbers move the text position.
/// Other elements are skipped.
pub fn show_array(
    gs: &mut GraphicsState,
    items: &[Object],
    marked_content: Option<&MarkedContent>,
) -> Vec<TextEvent> {
    let mut events = Vec::new();
    for item in items {
        match item {
            Object::Integer(_) | Object::Real(_) => {
                if let Ok(n) = item.as_f64() {
                    adjust_position(gs, n);
                }
            }
            Object::LiteralString(_) | Object::HexString(_) => {
                if let Ok(bytes) = item.string_bytes() {
                    events.push(show_string(gs, &bytes, marked_content));
                }
            }
            _ => {}
        }
    }
    events
}
