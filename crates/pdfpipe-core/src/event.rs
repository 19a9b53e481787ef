//! Events published by the interpreter, in content-stream order.

use std::sync::Arc;

use crate::color::Color;
use crate::font::{Font, Glyph};
use crate::geometry::{BBox, Matrix, Point};
use crate::path::Path;

/// Text rendering mode set by `Tr`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum TextRenderMode {
    #[default]
    Fill = 0,
    Stroke = 1,
    FillStroke = 2,
    Invisible = 3,
    FillClip = 4,
    StrokeClip = 5,
    FillStrokeClip = 6,
    Clip = 7,
}

impl TextRenderMode {
    /// Mode for a `Tr` operand. Returns `None` outside `0..=7`.
    pub fn from_i64(value: i64) -> Option<Self> {
        let mode = match value {
            0 => Self::Fill,
            1 => Self::Stroke,
            2 => Self::FillStroke,
            3 => Self::Invisible,
            4 => Self::FillClip,
            5 => Self::StrokeClip,
            6 => Self::FillStrokeClip,
            7 => Self::Clip,
            _ => return None,
        };
        Some(mode)
    }
}

/// Innermost marked-content sequence enclosing an event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MarkedContent {
    /// Tag operand of `BMC`/`BDC` (e.g. `P`, `Span`, `Artifact`).
    pub tag: String,
    /// Marked content identifier from the property list, if any.
    pub mcid: Option<u32>,
}

/// A string shown by `Tj`, `TJ`, `'` or `"`.
#[derive(Debug, Clone)]
pub struct TextEvent {
    /// Decoded Unicode text.
    pub text: String,
    /// Glyphs in string order.
    pub glyphs: Vec<Glyph>,
    pub font: Arc<dyn Font>,
    pub font_size: f64,
    /// Stroke color at show time.
    pub font_color: Color,
    /// Non-stroke color at show time.
    pub fill_color: Color,
    pub render_mode: TextRenderMode,
    /// Start of the baseline in user space.
    pub origin: Point,
    /// End of the baseline in user space.
    pub baseline_end: Point,
    /// Axis-aligned box spanning baseline to `font_size` above it.
    pub bbox: BBox,
    /// `text_matrix · ctm` before the string was shown.
    pub matrix: Matrix,
    /// Total advance in text space units.
    pub width: f64,
    pub char_spacing: f64,
    pub word_spacing: f64,
    /// Horizontal scaling as a fraction (`Tz 100` is 1.0).
    pub horizontal_scaling: f64,
    pub rise: f64,
    pub marked_content: Option<MarkedContent>,
}

/// Position of one glyph of a [`TextEvent`].
#[derive(Debug, Clone, PartialEq)]
pub struct GlyphBox {
    pub ch: char,
    pub code: u32,
    pub origin: Point,
    pub bbox: BBox,
    /// Advance in text space units, spacing included.
    pub advance: f64,
}

impl TextEvent {
    /// Advance of one glyph in text space, spacing included.
    pub fn glyph_advance(glyph: &Glyph, font_size: f64, char_spacing: f64, word_spacing: f64, horizontal_scaling: f64) -> f64 {
        let spacing = if glyph.is_space() {
            char_spacing + word_spacing
        } else {
            char_spacing
        };
        (glyph.width * 1e-3 * font_size + spacing) * horizontal_scaling
    }

    /// Split the event into per-glyph boxes using the same geometry as the
    /// whole-string box.
    pub fn glyph_boxes(&self) -> Vec<GlyphBox> {
        let mut x = 0.0;
        self.glyphs
            .iter()
            .map(|glyph| {
                let advance = Self::glyph_advance(
                    glyph,
                    self.font_size,
                    self.char_spacing,
                    self.word_spacing,
                    self.horizontal_scaling,
                );
                let (origin, _, bbox) = text_span_geometry(&self.matrix, x, x + advance, self.rise, self.font_size);
                x += advance;
                GlyphBox {
                    ch: glyph.ch,
                    code: glyph.code,
                    origin,
                    bbox,
                    advance,
                }
            })
            .collect()
    }

    /// Height of the box along the user-space y axis.
    pub fn height(&self) -> f64 {
        self.bbox.height()
    }
}

/// Baseline start, baseline end and bounding box of a text span running
/// from `x0` to `x1` in text space. The box is at least one unit on each
/// side, so a degenerate matrix or a zero font size still yields an area.
pub fn text_span_geometry(matrix: &Matrix, x0: f64, x1: f64, rise: f64, font_size: f64) -> (Point, Point, BBox) {
    let p0 = matrix.transform_point(Point::new(x0, rise));
    let p1 = matrix.transform_point(Point::new(x1, rise));
    let top0 = matrix.transform_point(Point::new(x0, rise + font_size));
    let top1 = matrix.transform_point(Point::new(x1, rise + font_size));
    let bbox = BBox::from_points([p0, p1, top0, top1])
        .unwrap_or_default()
        .at_least(1.0);
    (p0, p1, bbox)
}

/// An image painted by `Do` or an inline `BI … EI` sequence.
#[derive(Debug, Clone, PartialEq)]
pub struct ImageEvent {
    /// Image of the unit square's origin through the CTM.
    pub position: Point,
    /// Display width in user space, at least 1.
    pub width: f64,
    /// Display height in user space, at least 1.
    pub height: f64,
    /// Raw, undecoded image payload.
    pub data: Arc<[u8]>,
    /// XObject resource name; `None` for inline images.
    pub name: Option<String>,
    pub pixel_width: Option<u32>,
    pub pixel_height: Option<u32>,
    pub bits_per_component: Option<u8>,
    pub color_space: Option<String>,
    /// Filter names in application order.
    pub filters: Vec<String>,
    pub ctm: Matrix,
}

/// A path painted by a stroking operator.
#[derive(Debug, Clone, PartialEq)]
pub struct StrokeEvent {
    pub path: Path,
    pub line_width: f64,
    pub stroke_color: Color,
    pub dash_array: Vec<f64>,
    pub dash_phase: f64,
}

/// A path painted by a filling operator.
#[derive(Debug, Clone, PartialEq)]
pub struct FillEvent {
    pub path: Path,
    pub fill_color: Color,
    pub use_even_odd_rule: bool,
}

/// Page boundary information carried by [`Event::BeginPage`].
#[derive(Debug, Clone, PartialEq)]
pub struct PageInfo {
    /// Page index (0-based).
    pub index: usize,
    pub media_box: Option<BBox>,
}

/// Everything the interpreter publishes to listeners.
#[derive(Debug, Clone)]
pub enum Event {
    BeginPage(PageInfo),
    EndPage { index: usize },
    Text(TextEvent),
    Image(ImageEvent),
    ShapeStroke(StrokeEvent),
    ShapeFill(FillEvent),
}

impl Event {
    /// Short name of the event kind, for logs and tests.
    pub fn kind(&self) -> &'static str {
        match self {
            Event::BeginPage(_) => "begin_page",
            Event::EndPage { .. } => "end_page",
            Event::Text(_) => "text",
            Event::Image(_) => "image",
            Event::ShapeStroke(_) => "stroke",
            Event::ShapeFill(_) => "fill",
        }
    }

    /// Bounding box of the painted content, if the event paints anything.
    pub fn bbox(&self) -> Option<BBox> {
        match self {
            Event::Text(t) => Some(t.bbox),
            Event::Image(i) => Some(
                BBox::new(
                    i.position.x,
                    i.position.y,
                    i.position.x + i.width,
                    i.position.y + i.height,
                )
                .at_least(1.0),
            ),
            Event::ShapeStroke(s) => s.path.bbox(),
            Event::ShapeFill(f) => f.path.bbox(),
            Event::BeginPage(_) | Event::EndPage { .. } => None,
        }
    }
}
