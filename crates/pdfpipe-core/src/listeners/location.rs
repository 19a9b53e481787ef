//! Rectangular event filter.

use crate::event::Event;
use crate::geometry::{BBox, Point};
use crate::pipe::{Flow, Listener};

/// Forwards text and image events whose lower-left corner lies inside a
/// rectangle; every other event passes unconditionally.
#[derive(Debug, Clone)]
pub struct LocationFilter {
    area: BBox,
    suppressed: usize,
}

impl LocationFilter {
    pub fn new(area: BBox) -> Self {
        Self {
            area,
            suppressed: 0,
        }
    }

    pub fn area(&self) -> BBox {
        self.area
    }

    /// Number of events stopped so far.
    pub fn suppressed(&self) -> usize {
        self.suppressed
    }

    fn accepts(&self, corner: Point) -> bool {
        self.area.contains(corner)
    }
}

impl Listener for LocationFilter {
    fn process(&mut self, event: &Event) -> Flow {
        let corner = match event {
            Event::Text(text) => text.bbox.lower_left(),
            Event::Image(image) => image.position,
            _ => return Flow::Forward,
        };
        if self.accepts(corner) {
            Flow::Forward
        } else {
            self.suppressed += 1;
            Flow::Suppress
        }
    }
}
