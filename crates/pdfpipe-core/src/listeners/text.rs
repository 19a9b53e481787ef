//! Plain-text reconstruction from text events.

use crate::event::{Event, TextEvent};
use crate::geometry::BBox;
use crate::pipe::{Flow, Listener};

/// Options for reassembling page text.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TextExtractorOptions {
    /// Height of the baseline buckets that form a row (default: 5.0).
    pub row_tolerance: f64,
    /// Fraction of the space width above which a horizontal gap becomes a
    /// space (default: 0.9).
    pub space_ratio: f64,
    /// Row distance, relative to the previous row's height, above which an
    /// empty line is inserted (default: 1.5).
    pub line_gap_ratio: f64,
}

impl Default for TextExtractorOptions {
    fn default() -> Self {
        Self {
            row_tolerance: 5.0,
            space_ratio: 0.9,
            line_gap_ratio: 1.5,
        }
    }
}

/// Page text together with the origin of every byte.
#[derive(Debug, Clone, Default)]
pub struct PageText {
    pub text: String,
    /// For each byte of `text`: index of the source event and of the glyph
    /// within it, or `None` for inserted whitespace.
    pub byte_sources: Vec<Option<(usize, usize)>>,
}

impl PageText {
    /// Lay out the events of one page: rows top to bottom, left to right
    /// within a row.
    pub fn layout(events: &[TextEvent], options: &TextExtractorOptions) -> Self {
        let mut order: Vec<usize> = (0..events.len())
            .filter(|&i| !events[i].glyphs.is_empty())
            .collect();
        let bucket = |e: &TextEvent| (e.origin.y / options.row_tolerance).floor() as i64;
        order.sort_by(|&a, &b| {
            let (ea, eb) = (&events[a], &events[b]);
            bucket(eb)
                .cmp(&bucket(ea))
                .then(ea.origin.x.total_cmp(&eb.origin.x))
        });

        let mut page = PageText::default();
        let mut prev: Option<&TextEvent> = None;
        for index in order {
            let event = &events[index];
            if let Some(p) = prev {
                if bucket(p) != bucket(event) {
                    page.push_inserted('\n');
                    let row_height = p.bbox.height().max(1.0);
                    if p.origin.y - event.origin.y > options.line_gap_ratio * row_height {
                        page.push_inserted('\n');
                    }
                } else {
                    let gap = event.origin.x - p.baseline_end.x;
                    let threshold = options.space_ratio * space_width(p);
                    let touches_space = page.text.ends_with(char::is_whitespace)
                        || event.text.starts_with(char::is_whitespace);
                    if gap > threshold && !touches_space {
                        page.push_inserted(' ');
                    }
                }
            }
            for (glyph_index, glyph) in event.glyphs.iter().enumerate() {
                let start = page.text.len();
                page.text.push(glyph.ch);
                let added = page.text.len() - start;
                page.byte_sources
                    .extend(std::iter::repeat_n(Some((index, glyph_index)), added));
            }
            prev = Some(event);
        }
        page
    }

    fn push_inserted(&mut self, ch: char) {
        self.text.push(ch);
        self.byte_sources.push(None);
    }
}

/// Width of the event font's space glyph in user space.
fn space_width(event: &TextEvent) -> f64 {
    let text_space = event.font.space_width() * 1e-3 * event.font_size * event.horizontal_scaling;
    let v = event.matrix.transform_vector(text_space, 0.0);
    v.x.hypot(v.y)
}

/// Accumulates text events per page and rebuilds reading-order text when
/// the page ends.
#[derive(Debug, Default)]
pub struct SimpleTextExtractor {
    options: TextExtractorOptions,
    pending: Vec<TextEvent>,
    pages: Vec<(usize, String)>,
}

impl SimpleTextExtractor {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_options(options: TextExtractorOptions) -> Self {
        Self {
            options,
            ..Self::default()
        }
    }

    /// Text of every finished page as `(page index, text)`.
    pub fn pages(&self) -> &[(usize, String)] {
        &self.pages
    }

    /// Text of a finished page.
    pub fn page_text(&self, index: usize) -> Option<&str> {
        self.pages
            .iter()
            .find(|(i, _)| *i == index)
            .map(|(_, t)| t.as_str())
    }

    /// All finished pages joined with form feeds.
    pub fn text(&self) -> String {
        self.pages
            .iter()
            .map(|(_, t)| t.as_str())
            .collect::<Vec<_>>()
            .join("\n\x0c")
    }

    /// Bounding box of all text of the current (unfinished) page.
    pub fn pending_bbox(&self) -> Option<BBox> {
        self.pending
            .iter()
            .map(|e| e.bbox)
            .reduce(|a, b| a.union(&b))
    }
}

impl Listener for SimpleTextExtractor {
    fn process(&mut self, event: &Event) -> Flow {
        match event {
            Event::BeginPage(_) => self.pending.clear(),
            Event::Text(text) => self.pending.push(text.clone()),
            Event::EndPage { index } => {
                let page = PageText::layout(&self.pending, &self.options);
                self.pages.push((*index, page.text));
                self.pending.clear();
            }
            _ => {}
        }
        Flow::Forward
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::color::Color;
    use crate::event::{PageInfo, TextRenderMode, text_span_geometry};
    use crate::font::Font;
    use crate::font::tests::AsciiFont;
    use crate::geometry::Matrix;

    /// Text event shown with a 500-unit ASCII font at size 10 from `(x, y)`.
    pub(crate) fn text_at(text: &str, x: f64, y: f64) -> TextEvent {
        let font: Arc<dyn Font> = Arc::new(AsciiFont { width: 500.0 });
        let glyphs = font.decode(text.as_bytes());
        let width: f64 = glyphs
            .iter()
            .map(|g| TextEvent::glyph_advance(g, 10.0, 0.0, 0.0, 1.0))
            .sum();
        let matrix = Matrix::translation(x, y);
        let (origin, baseline_end, bbox) = text_span_geometry(&matrix, 0.0, width, 0.0, 10.0);
        TextEvent {
            text: text.to_string(),
            glyphs,
            font,
            font_size: 10.0,
            font_color: Color::black(),
            fill_color: Color::black(),
            render_mode: TextRenderMode::Fill,
            origin,
            baseline_end,
            bbox,
            matrix,
            width,
            char_spacing: 0.0,
            word_spacing: 0.0,
            horizontal_scaling: 1.0,
            rise: 0.0,
            marked_content: None,
        }
    }

    fn run(events: Vec<TextEvent>) -> String {
        let mut extractor = SimpleTextExtractor::new();
        extractor.process(&Event::BeginPage(PageInfo {
            index: 0,
            media_box: None,
        }));
        for e in events {
            extractor.process(&Event::Text(e));
        }
        extractor.process(&Event::EndPage { index: 0 });
        extractor.page_text(0).unwrap_or_default().to_string()
    }

    #[test]
    fn adjacent_events_join_without_space() {
        // "Hel" is 15 units wide
        assert_eq!(run(vec![text_at("Hel", 0.0, 100.0), text_at("lo", 15.0, 100.0)]), "Hello");
    }

    #[test]
    fn wide_gap_inserts_space() {
        // space width is 5, threshold 4.5
        assert_eq!(
            run(vec![text_at("Hello", 0.0, 100.0), text_at("World", 30.0, 100.0)]),
            "Hello World"
        );
    }

    #[test]
    fn gap_below_threshold_is_ignored() {
        assert_eq!(run(vec![text_at("ab", 0.0, 0.0), text_at("cd", 14.0, 0.0)]), "abcd");
    }

    #[test]
    fn rows_sorted_top_to_bottom_then_left_to_right() {
        let text = run(vec![
            text_at("second", 0.0, 88.0),
            text_at("B", 20.0, 101.0),
            text_at("A", 0.0, 100.0),
        ]);
        assert_eq!(text, "A B\nsecond");
    }

    #[test]
    fn large_vertical_gap_inserts_empty_line() {
        let text = run(vec![text_at("top", 0.0, 200.0), text_at("bottom", 0.0, 100.0)]);
        assert_eq!(text, "top\n\nbottom");
    }

    #[test]
    fn empty_page_yields_empty_text() {
        assert_eq!(run(Vec::new()), "");
    }

    #[test]
    fn byte_sources_track_glyphs() {
        let events = vec![text_at("ab", 0.0, 0.0), text_at("c", 40.0, 0.0)];
        let page = PageText::layout(&events, &TextExtractorOptions::default());
        assert_eq!(page.text, "ab c");
        assert_eq!(page.byte_sources[1], Some((0, 1)));
        assert_eq!(page.byte_sources[2], None);
        assert_eq!(page.byte_sources[3], Some((1, 0)));
    }

    #[test]
    fn pages_are_joined_with_form_feed() {
        let mut extractor = SimpleTextExtractor::new();
        for index in 0..2 {
            extractor.process(&Event::BeginPage(PageInfo {
                index,
                media_box: None,
            }));
            extractor.process(&Event::Text(text_at("p", 0.0, 0.0)));
            extractor.process(&Event::EndPage { index });
        }
        assert_eq!(extractor.text(), "p\n\x0cp");
        assert_eq!(extractor.pages().len(), 2);
    }
}
