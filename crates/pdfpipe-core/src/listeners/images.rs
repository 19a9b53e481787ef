//! Image collection by page.

use std::collections::BTreeMap;

use crate::event::{Event, ImageEvent};
use crate::pipe::{Flow, Listener};

/// Keeps every image event, grouped by page index.
#[derive(Debug, Default)]
pub struct ImageCollector {
    current_page: usize,
    images: BTreeMap<usize, Vec<ImageEvent>>,
}

impl ImageCollector {
    pub fn new() -> Self {
        Self::default()
    }

    /// Images painted on a page, in paint order.
    pub fn images_on(&self, page: usize) -> &[ImageEvent] {
        self.images.get(&page).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Every collected image with its page index, in page order.
    pub fn all(&self) -> impl Iterator<Item = (usize, &ImageEvent)> {
        self.images
            .iter()
            .flat_map(|(page, images)| images.iter().map(move |i| (*page, i)))
    }

    pub fn len(&self) -> usize {
        self.images.values().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Listener for ImageCollector {
    fn process(&mut self, event: &Event) -> Flow {
        match event {
            Event::BeginPage(info) => self.current_page = info.index,
            Event::Image(image) => self
                .images
                .entry(self.current_page)
                .or_default()
                .push(image.clone()),
            _ => {}
        }
        Flow::Forward
    }
}
