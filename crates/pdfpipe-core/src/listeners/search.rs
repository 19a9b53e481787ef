//! Regular-expression search over reconstructed page text.

use regex::{Regex, RegexBuilder};

use crate::event::{Event, GlyphBox, TextEvent};
use crate::geometry::BBox;
use crate::listeners::text::{PageText, TextExtractorOptions};
use crate::pipe::{Flow, Listener};

/// A match found by [`RegexExtractor`].
#[derive(Debug, Clone)]
pub struct TextMatch {
    /// Page index (0-based).
    pub page: usize,
    /// The matched text, including any whitespace inserted by the layout.
    pub text: String,
    /// Union of the matched glyph boxes.
    pub bbox: BBox,
    /// Text events contributing glyphs to the match, in layout order.
    pub events: Vec<TextEvent>,
}

/// Rebuilds page text like [`SimpleTextExtractor`](super::SimpleTextExtractor)
/// and runs a regular expression over it when the page ends.
#[derive(Debug)]
pub struct RegexExtractor {
    regex: Regex,
    options: TextExtractorOptions,
    pending: Vec<TextEvent>,
    matches: Vec<TextMatch>,
}

impl RegexExtractor {
    /// Compile a case-sensitive pattern.
    pub fn new(pattern: &str) -> Result<Self, regex::Error> {
        Self::with_case(pattern, true)
    }

    /// Compile a pattern with explicit case sensitivity.
    pub fn with_case(pattern: &str, case_sensitive: bool) -> Result<Self, regex::Error> {
        let regex = RegexBuilder::new(pattern)
            .case_insensitive(!case_sensitive)
            .build()?;
        Ok(Self::from_regex(regex))
    }

    /// Search for a literal string.
    pub fn literal(needle: &str, case_sensitive: bool) -> Result<Self, regex::Error> {
        Self::with_case(&regex::escape(needle), case_sensitive)
    }

    pub fn from_regex(regex: Regex) -> Self {
        Self {
            regex,
            options: TextExtractorOptions::default(),
            pending: Vec::new(),
            matches: Vec::new(),
        }
    }

    pub fn with_options(mut self, options: TextExtractorOptions) -> Self {
        self.options = options;
        self
    }

    /// Matches of every finished page.
    pub fn matches(&self) -> &[TextMatch] {
        &self.matches
    }

    fn search_page(&mut self, page: usize) {
        let layout = PageText::layout(&self.pending, &self.options);
        let mut boxes: Option<Vec<Vec<GlyphBox>>> = None;
        for m in self.regex.find_iter(&layout.text) {
            let mut event_indices: Vec<usize> = Vec::new();
            let mut glyphs: Vec<(usize, usize)> = Vec::new();
            for source in layout.byte_sources[m.start()..m.end()].iter().flatten() {
                if glyphs.last() != Some(source) {
                    glyphs.push(*source);
                }
                if event_indices.last() != Some(&source.0) {
                    event_indices.push(source.0);
                }
            }
            let boxes = boxes.get_or_insert_with(|| self.pending.iter().map(TextEvent::glyph_boxes).collect());
            let bbox = glyphs
                .iter()
                .filter_map(|&(event, glyph)| boxes[event].get(glyph).map(|g| g.bbox))
                .reduce(|a, b| a.union(&b));
            let Some(bbox) = bbox else {
                continue;
            };
            self.matches.push(TextMatch {
                page,
                text: m.as_str().to_string(),
                bbox,
                events: event_indices
                    .iter()
                    .map(|&i| self.pending[i].clone())
                    .collect(),
            });
        }
    }
}

impl Listener for RegexExtractor {
    fn process(&mut self, event: &Event) -> Flow {
        match event {
            Event::BeginPage(_) => self.pending.clear(),
            Event::Text(text) => self.pending.push(text.clone()),
            Event::EndPage { index } => {
                self.search_page(*index);
                self.pending.clear();
            }
            _ => {}
        }
        Flow::Forward
    }
}
