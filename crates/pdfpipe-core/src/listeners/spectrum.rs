//! Area-weighted color histogram.

use std::collections::HashMap;

use crate::color::Color;
use crate::event::{Event, TextRenderMode};
use crate::pipe::{Flow, Listener};

/// One quantized RGB bucket of a [`ColorSpectrum`].
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SpectrumBucket {
    /// Bucket center as RGB bytes.
    pub rgb: [u8; 3],
    /// Accumulated painted area in square user-space units.
    pub area: f64,
    /// Fraction of the total area.
    pub share: f64,
}

/// Accumulates painted area per quantized RGB color.
///
/// Text contributes its bounding-box area, fills their enclosed area (or
/// their bounding-box area for open shapes) and strokes their length times
/// the line width. Images are not decoded and do not contribute.
#[derive(Debug, Clone)]
pub struct ColorSpectrum {
    levels: u8,
    areas: HashMap<[u8; 3], f64>,
}

impl Default for ColorSpectrum {
    fn default() -> Self {
        Self::new(8)
    }
}

impl ColorSpectrum {
    /// Create a spectrum with `levels` buckets per channel (at least 1).
    pub fn new(levels: u8) -> Self {
        Self {
            levels: levels.max(1),
            areas: HashMap::new(),
        }
    }

    pub fn add(&mut self, color: &Color, area: f64) {
        if !(area > 0.0) {
            return;
        }
        let (r, g, b) = color.to_rgb();
        let key = [self.quantize(r), self.quantize(g), self.quantize(b)];
        *self.areas.entry(key).or_insert(0.0) += area;
    }

    fn quantize(&self, v: f64) -> u8 {
        let levels = self.levels as f64;
        (v * levels).floor().clamp(0.0, levels - 1.0) as u8
    }

    fn center(&self, q: u8) -> u8 {
        ((q as f64 + 0.5) / self.levels as f64 * 255.0).round() as u8
    }

    pub fn total_area(&self) -> f64 {
        self.areas.values().sum()
    }

    /// Buckets sorted by decreasing area.
    pub fn buckets(&self) -> Vec<SpectrumBucket> {
        let total = self.total_area();
        let mut buckets: Vec<SpectrumBucket> = self
            .areas
            .iter()
            .map(|(key, &area)| SpectrumBucket {
                rgb: [self.center(key[0]), self.center(key[1]), self.center(key[2])],
                area,
                share: if total > 0.0 { area / total } else { 0.0 },
            })
            .collect();
        buckets.sort_by(|a, b| b.area.total_cmp(&a.area).then(a.rgb.cmp(&b.rgb)));
        buckets
    }

    /// Bucket covering the largest area.
    pub fn dominant(&self) -> Option<SpectrumBucket> {
        self.buckets().into_iter().next()
    }
}

impl Listener for ColorSpectrum {
    fn process(&mut self, event: &Event) -> Flow {
        match event {
            Event::Text(text) => {
                let color = match text.render_mode {
                    TextRenderMode::Invisible | TextRenderMode::Clip => None,
                    TextRenderMode::Stroke | TextRenderMode::StrokeClip => Some(text.font_color),
                    _ => Some(text.fill_color),
                };
                if let Some(color) = color {
                    self.add(&color, text.bbox.area());
                }
            }
            Event::ShapeFill(fill) => {
                let enclosed = fill.path.enclosed_area();
                let area = if enclosed > 0.0 {
                    enclosed
                } else {
                    fill.path.bbox().map_or(0.0, |b| b.area())
                };
                self.add(&fill.fill_color, area);
            }
            Event::ShapeStroke(stroke) => {
                let length: f64 = stroke.path.segments().map(|s| s.length()).sum();
                self.add(&stroke.stroke_color, length * stroke.line_width.max(1.0));
            }
            _ => {}
        }
        Flow::Forward
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event::{FillEvent, StrokeEvent};
    use crate::geometry::Matrix;
    use crate::listeners::text::tests::text_at;
    use crate::path::PathBuffer;

    fn rect_fill(w: f64, h: f64, color: Color) -> Event {
        let mut buf = PathBuffer::new();
        buf.rectangle(&Matrix::identity(), 0.0, 0.0, w, h);
        Event::ShapeFill(FillEvent {
            path: buf.take_closed(),
            fill_color: color,
            use_even_odd_rule: false,
        })
    }

    #[test]
    fn fill_area_is_accumulated_per_bucket() {
        let mut spectrum = ColorSpectrum::new(4);
        spectrum.process(&rect_fill(10.0, 10.0, Color::Rgb(1.0, 0.0, 0.0)));
        spectrum.process(&rect_fill(5.0, 2.0, Color::Rgb(0.95, 0.1, 0.0)));
        spectrum.process(&rect_fill(3.0, 3.0, Color::Gray(1.0)));
        let buckets = spectrum.buckets();
        assert_eq!(buckets.len(), 2);
        assert!((buckets[0].area - 110.0).abs() < 1e-9);
        assert_eq!(buckets[0].rgb, [223, 32, 32]);
        assert!((spectrum.total_area() - 119.0).abs() < 1e-9);
        assert!((buckets[1].share - 9.0 / 119.0).abs() < 1e-9);
    }

    #[test]
    fn stroke_weight_is_length_times_width() {
        let mut buf = PathBuffer::new();
        buf.move_to(&Matrix::identity(), 0.0, 0.0);
        buf.line_to(&Matrix::identity(), 10.0, 0.0);
        let mut spectrum = ColorSpectrum::default();
        spectrum.process(&Event::ShapeStroke(StrokeEvent {
            path: buf.take(),
            line_width: 2.0,
            stroke_color: Color::black(),
            dash_array: Vec::new(),
            dash_phase: 0.0,
        }));
        let dominant = spectrum.dominant().unwrap();
        assert!((dominant.area - 20.0).abs() < 1e-9);
        assert_eq!(dominant.rgb, [16, 16, 16]);
    }

    #[test]
    fn text_uses_bbox_area_and_fill_color() {
        let mut spectrum = ColorSpectrum::new(2);
        let mut text = text_at("ab", 0.0, 0.0);
        text.fill_color = Color::Rgb(0.0, 0.0, 1.0);
        spectrum.process(&Event::Text(text));
        let dominant = spectrum.dominant().unwrap();
        assert_eq!(dominant.rgb, [64, 64, 191]);
        assert!((dominant.area - 100.0).abs() < 1e-9);
    }

    #[test]
    fn invisible_text_is_ignored() {
        let mut spectrum = ColorSpectrum::new(2);
        let mut text = text_at("ab", 0.0, 0.0);
        text.render_mode = TextRenderMode::Invisible;
        spectrum.process(&Event::Text(text));
        assert!(spectrum.buckets().is_empty());
    }
}
