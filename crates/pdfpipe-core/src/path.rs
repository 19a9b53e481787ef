//! Subpaths, paths and the path buffer fed by path-construction operators.
//!
//! Points are transformed through the CTM when they are appended, so a
//! painted [`Path`] is already in user space. Curves are flattened into
//! straight segments at construction time.

use crate::geometry::{LineSegment, Matrix, Point};

/// Number of line segments a cubic Bézier curve is flattened into.
pub const CURVE_SEGMENTS: usize = 10;

/// Squared distance under which `h` treats the subpath as already closed.
const CLOSE_EPSILON_SQ: f64 = 1e-5;

/// A connected run of line segments. The end of each segment is the start
/// of the next one.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Subpath {
    pub segments: Vec<LineSegment>,
    /// Whether the subpath was closed by `h`, `re` or an implicit fill close.
    pub closed: bool,
}

impl Subpath {
    /// First point of the subpath.
    pub fn start(&self) -> Option<Point> {
        self.segments.first().map(|s| s.start)
    }

    /// Last point of the subpath.
    pub fn end(&self) -> Option<Point> {
        self.segments.last().map(|s| s.end)
    }

    /// Every vertex in order, starting with the first segment's start point.
    pub fn points(&self) -> impl Iterator<Item = Point> + '_ {
        self.start()
            .into_iter()
            .chain(self.segments.iter().map(|s| s.end))
    }
}

/// An ordered collection of subpaths, as handed to paint events.
#[derive(Debug, Clone, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Path {
    pub subpaths: Vec<Subpath>,
}

impl Path {
    pub fn is_empty(&self) -> bool {
        self.subpaths.is_empty()
    }

    /// All segments of all subpaths, in order.
    pub fn segments(&self) -> impl Iterator<Item = &LineSegment> {
        self.subpaths.iter().flat_map(|s| s.segments.iter())
    }

    /// Bounding box of every vertex, or `None` for an empty path.
    pub fn bbox(&self) -> Option<crate::BBox> {
        crate::BBox::from_points(self.subpaths.iter().flat_map(|s| s.points()))
    }

    /// Area enclosed by the path's closed subpaths (shoelace formula, absolute
    /// value per subpath). Open subpaths contribute nothing.
    pub fn enclosed_area(&self) -> f64 {
        self.subpaths
            .iter()
            .filter(|s| s.closed)
            .map(|s| {
                s.segments
                    .iter()
                    .map(|seg| seg.start.x * seg.end.y - seg.end.x * seg.start.y)
                    .sum::<f64>()
                    .abs()
                    / 2.0
            })
            .sum()
    }
}

/// Accumulates subpaths between path-construction and path-painting operators.
#[derive(Debug, Clone, Default)]
pub struct PathBuffer {
    finished: Vec<Subpath>,
    current: Vec<LineSegment>,
    subpath_start: Option<Point>,
    current_point: Option<Point>,
}

impl PathBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether no segment has been appended since the last paint or discard.
    pub fn is_empty(&self) -> bool {
        self.finished.is_empty() && self.current.is_empty()
    }

    /// Current point in user space.
    pub fn current_point(&self) -> Option<Point> {
        self.current_point
    }

    // --- m ---

    /// Begin a new subpath at `(x, y)`.
    pub fn move_to(&mut self, ctm: &Matrix, x: f64, y: f64) {
        self.finish_subpath(false);
        let p = ctm.transform_point(Point::new(x, y));
        self.subpath_start = Some(p);
        self.current_point = Some(p);
    }

    // --- l ---

    /// Append a straight segment to `(x, y)`. Without a current point this
    /// behaves like a move.
    pub fn line_to(&mut self, ctm: &Matrix, x: f64, y: f64) {
        let p = ctm.transform_point(Point::new(x, y));
        self.push_to(p);
    }

    // --- c, v, y ---

    /// Append a cubic Bézier curve flattened into [`CURVE_SEGMENTS`] segments.
    #[allow(clippy::too_many_arguments)]
    pub fn curve_to(&mut self, ctm: &Matrix, x1: f64, y1: f64, x2: f64, y2: f64, x3: f64, y3: f64) {
        let cp1 = ctm.transform_point(Point::new(x1, y1));
        let cp2 = ctm.transform_point(Point::new(x2, y2));
        let end = ctm.transform_point(Point::new(x3, y3));
        self.flatten(cp1, cp2, end);
    }

    /// `v`: the first control point is the current point.
    pub fn curve_to_v(&mut self, ctm: &Matrix, x2: f64, y2: f64, x3: f64, y3: f64) {
        let cp2 = ctm.transform_point(Point::new(x2, y2));
        let end = ctm.transform_point(Point::new(x3, y3));
        let cp1 = self.current_point.unwrap_or(cp2);
        self.flatten(cp1, cp2, end);
    }

    /// `y`: the second control point is the end point.
    pub fn curve_to_y(&mut self, ctm: &Matrix, x1: f64, y1: f64, x3: f64, y3: f64) {
        let cp1 = ctm.transform_point(Point::new(x1, y1));
        let end = ctm.transform_point(Point::new(x3, y3));
        self.flatten(cp1, end, end);
    }

    fn flatten(&mut self, cp1: Point, cp2: Point, end: Point) {
        let Some(p0) = self.current_point else {
            // no current point: the curve starts at its first control point
            self.subpath_start = Some(cp1);
            self.current_point = Some(cp1);
            return self.flatten(cp1, cp2, end);
        };
        for i in 1..=CURVE_SEGMENTS {
            let t = i as f64 / CURVE_SEGMENTS as f64;
            let p = if i == CURVE_SEGMENTS {
                end
            } else {
                bezier_point(p0, cp1, cp2, end, t)
            };
            self.push_to(p);
        }
    }

    // --- h ---

    /// Close the current subpath with a segment back to its start point,
    /// unless the last point already coincides with it.
    pub fn close_path(&mut self) {
        self.finish_subpath(true);
        self.current_point = self.subpath_start;
    }

    // --- re ---

    /// Append a closed rectangle: four segments counter-clockwise from `(x, y)`.
    pub fn rectangle(&mut self, ctm: &Matrix, x: f64, y: f64, width: f64, height: f64) {
        self.move_to(ctm, x, y);
        self.line_to(ctm, x + width, y);
        self.line_to(ctm, x + width, y + height);
        self.line_to(ctm, x, y + height);
        self.close_path();
    }

    /// Take the accumulated path as-is and clear the buffer (stroke operators).
    pub fn take(&mut self) -> Path {
        self.finish_subpath(false);
        self.reset()
    }

    /// Close every open subpath, then take the path and clear the buffer
    /// (fill operators).
    pub fn take_closed(&mut self) -> Path {
        self.finish_subpath(true);
        for subpath in &mut self.finished {
            close_subpath(subpath);
        }
        self.reset()
    }

    /// Discard the path (`n`).
    pub fn clear(&mut self) {
        self.reset();
    }

    fn reset(&mut self) -> Path {
        self.current.clear();
        self.subpath_start = None;
        self.current_point = None;
        Path {
            subpaths: std::mem::take(&mut self.finished),
        }
    }

    fn push_to(&mut self, p: Point) {
        match self.current_point {
            Some(from) => {
                if self.current.is_empty() && self.subpath_start != Some(from) {
                    self.subpath_start = Some(from);
                }
                self.current.push(LineSegment::new(from, p));
            }
            None => self.subpath_start = Some(p),
        }
        self.current_point = Some(p);
    }

    fn finish_subpath(&mut self, close: bool) {
        if self.current.is_empty() {
            return;
        }
        let mut subpath = Subpath {
            segments: std::mem::take(&mut self.current),
            closed: false,
        };
        if close {
            close_subpath(&mut subpath);
        }
        self.finished.push(subpath);
    }
}

fn close_subpath(subpath: &mut Subpath) {
    if subpath.closed {
        return;
    }
    if let (Some(start), Some(end)) = (subpath.start(), subpath.end()) {
        let dx = start.x - end.x;
        let dy = start.y - end.y;
        if dx * dx + dy * dy > CLOSE_EPSILON_SQ {
            subpath.segments.push(LineSegment::new(end, start));
        }
    }
    subpath.closed = true;
}

/// Evaluate a cubic Bézier curve at parameter `t`.
pub fn bezier_point(p0: Point, p1: Point, p2: Point, p3: Point, t: f64) -> Point {
    let mt = 1.0 - t;
    let a = mt * mt * mt;
    let b = 3.0 * mt * mt * t;
    let c = 3.0 * mt * t * t;
    let d = t * t * t;
    Point::new(
        a * p0.x + b * p1.x + c * p2.x + d * p3.x,
        a * p0.y + b * p1.y + c * p2.y + d * p3.y,
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_point_approx(p: Point, x: f64, y: f64) {
        assert!((p.x - x).abs() < 1e-6, "x: expected {x}, got {}", p.x);
        assert!((p.y - y).abs() < 1e-6, "y: expected {y}, got {}", p.y);
    }

    fn id() -> Matrix {
        Matrix::identity()
    }

    #[test]
    fn new_buffer_is_empty() {
        let buf = PathBuffer::new();
        assert!(buf.is_empty());
        assert!(buf.current_point().is_none());
    }

    #[test]
    fn move_only_subpath_is_dropped() {
        let mut buf = PathBuffer::new();
        buf.move_to(&id(), 10.0, 20.0);
        assert!(buf.take().is_empty());
    }

    #[test]
    fn line_to_appends_segment() {
        let mut buf = PathBuffer::new();
        buf.move_to(&id(), 0.0, 0.0);
        buf.line_to(&id(), 100.0, 50.0);
        let path = buf.take();
        assert_eq!(path.subpaths.len(), 1);
        assert_eq!(
            path.subpaths[0].segments,
            vec![LineSegment::new(Point::new(0.0, 0.0), Point::new(100.0, 50.0))]
        );
        assert!(!path.subpaths[0].closed);
        assert!(buf.is_empty());
    }

    #[test]
    fn points_are_transformed_by_ctm() {
        let ctm = Matrix::scale(2.0, 2.0);
        let mut buf = PathBuffer::new();
        buf.move_to(&ctm, 10.0, 20.0);
        buf.line_to(&ctm, 30.0, 40.0);
        let seg = buf.take().subpaths[0].segments[0];
        assert_point_approx(seg.start, 20.0, 40.0);
        assert_point_approx(seg.end, 60.0, 80.0);
    }

    #[test]
    fn move_starts_new_subpath() {
        let mut buf = PathBuffer::new();
        buf.move_to(&id(), 0.0, 0.0);
        buf.line_to(&id(), 1.0, 0.0);
        buf.move_to(&id(), 5.0, 5.0);
        buf.line_to(&id(), 6.0, 5.0);
        assert_eq!(buf.take().subpaths.len(), 2);
    }

    #[test]
    fn curve_is_flattened_into_ten_segments() {
        let mut buf = PathBuffer::new();
        buf.move_to(&id(), 0.0, 0.0);
        buf.curve_to(&id(), 10.0, 20.0, 30.0, 40.0, 50.0, 60.0);
        let path = buf.take();
        let segs = &path.subpaths[0].segments;
        assert_eq!(segs.len(), CURVE_SEGMENTS);
        assert_point_approx(segs[0].start, 0.0, 0.0);
        assert_point_approx(segs[9].end, 50.0, 60.0);
        for pair in segs.windows(2) {
            assert_eq!(pair[0].end, pair[1].start);
        }
    }

    #[test]
    fn curve_samples_follow_bezier_formula() {
        let mut buf = PathBuffer::new();
        buf.move_to(&id(), 0.0, 0.0);
        buf.curve_to(&id(), 0.0, 10.0, 10.0, 10.0, 10.0, 0.0);
        let segs = buf.take().subpaths[0].segments.clone();
        // t = 0.5 is the end of the fifth segment
        assert_point_approx(segs[4].end, 5.0, 7.5);
    }

    #[test]
    fn curve_v_uses_current_point_as_first_control() {
        let mut a = PathBuffer::new();
        a.move_to(&id(), 5.0, 10.0);
        a.curve_to_v(&id(), 30.0, 40.0, 50.0, 60.0);
        let mut b = PathBuffer::new();
        b.move_to(&id(), 5.0, 10.0);
        b.curve_to(&id(), 5.0, 10.0, 30.0, 40.0, 50.0, 60.0);
        assert_eq!(a.take(), b.take());
    }

    #[test]
    fn curve_y_uses_end_point_as_second_control() {
        let mut a = PathBuffer::new();
        a.move_to(&id(), 0.0, 0.0);
        a.curve_to_y(&id(), 10.0, 20.0, 50.0, 60.0);
        let mut b = PathBuffer::new();
        b.move_to(&id(), 0.0, 0.0);
        b.curve_to(&id(), 10.0, 20.0, 50.0, 60.0, 50.0, 60.0);
        let (a, b) = (a.take(), b.take());
        assert_eq!(a, b);
        assert_point_approx(a.subpaths[0].end().unwrap(), 50.0, 60.0);
    }

    #[test]
    fn close_appends_segment_back_to_start() {
        let mut buf = PathBuffer::new();
        buf.move_to(&id(), 10.0, 20.0);
        buf.line_to(&id(), 30.0, 40.0);
        buf.line_to(&id(), 50.0, 20.0);
        buf.close_path();
        assert_point_approx(buf.current_point().unwrap(), 10.0, 20.0);
        let path = buf.take();
        let sub = &path.subpaths[0];
        assert!(sub.closed);
        assert_eq!(sub.segments.len(), 3);
        assert_point_approx(sub.end().unwrap(), 10.0, 20.0);
    }

    #[test]
    fn close_skips_segment_when_already_at_start() {
        let mut buf = PathBuffer::new();
        buf.move_to(&id(), 0.0, 0.0);
        buf.line_to(&id(), 10.0, 0.0);
        buf.line_to(&id(), 0.001, 0.001);
        buf.close_path();
        assert_eq!(buf.take().subpaths[0].segments.len(), 2);
    }

    #[test]
    fn rectangle_has_four_corner_segments() {
        let mut buf = PathBuffer::new();
        buf.rectangle(&id(), 10.0, 10.0, 100.0, 50.0);
        let path = buf.take();
        assert_eq!(path.subpaths.len(), 1);
        let sub = &path.subpaths[0];
        assert!(sub.closed);
        let corners: Vec<Point> = sub.points().collect();
        assert_eq!(
            corners,
            vec![
                Point::new(10.0, 10.0),
                Point::new(110.0, 10.0),
                Point::new(110.0, 60.0),
                Point::new(10.0, 60.0),
                Point::new(10.0, 10.0),
            ]
        );
    }

    #[test]
    fn take_closed_closes_open_subpaths() {
        let mut buf = PathBuffer::new();
        buf.move_to(&id(), 0.0, 0.0);
        buf.line_to(&id(), 10.0, 0.0);
        buf.line_to(&id(), 10.0, 10.0);
        let path = buf.take_closed();
        let sub = &path.subpaths[0];
        assert!(sub.closed);
        assert_eq!(sub.segments.len(), 3);
        assert_point_approx(sub.end().unwrap(), 0.0, 0.0);
    }

    #[test]
    fn line_after_close_starts_at_subpath_start() {
        let mut buf = PathBuffer::new();
        buf.move_to(&id(), 0.0, 0.0);
        buf.line_to(&id(), 10.0, 0.0);
        buf.line_to(&id(), 10.0, 10.0);
        buf.close_path();
        buf.line_to(&id(), -5.0, -5.0);
        let path = buf.take();
        assert_eq!(path.subpaths.len(), 2);
        assert_point_approx(path.subpaths[1].start().unwrap(), 0.0, 0.0);
    }

    #[test]
    fn clear_discards_everything() {
        let mut buf = PathBuffer::new();
        buf.rectangle(&id(), 0.0, 0.0, 1.0, 1.0);
        buf.clear();
        assert!(buf.is_empty());
        assert!(buf.take().is_empty());
    }

    #[test]
    fn enclosed_area_of_rectangle() {
        let mut buf = PathBuffer::new();
        buf.rectangle(&id(), 0.0, 0.0, 10.0, 5.0);
        let path = buf.take();
        assert!((path.enclosed_area() - 50.0).abs() < 1e-10);
        let bbox = path.bbox().unwrap();
        assert_eq!((bbox.width(), bbox.height()), (10.0, 5.0));
    }
}
