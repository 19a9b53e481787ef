//! Points, affine matrices and axis-aligned boxes in PDF user space.
//!
//! All coordinates use the PDF convention: origin at the lower-left corner,
//! y growing upwards.

/// A point in user space.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Euclidean distance to another point.
    pub fn distance(&self, other: &Point) -> f64 {
        (self.x - other.x).hypot(self.y - other.y)
    }

    /// Whether the two points are within `tolerance` of each other.
    pub fn approx_eq(&self, other: &Point, tolerance: f64) -> bool {
        self.distance(other) <= tolerance
    }
}

/// 3×3 affine matrix stored row-major as nine reals.
///
/// The third column is always `(0, 0, 1)ᵀ`. A point `(x, y)` is transformed
/// as the row vector `(x, y, 1)` multiplied by the matrix, so the PDF operand
/// sequence `a b c d e f` maps to:
///
/// ```text
/// | a b 0 |
/// | c d 0 |
/// | e f 1 |
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Matrix {
    pub m: [[f64; 3]; 3],
}

impl Default for Matrix {
    fn default() -> Self {
        Self::identity()
    }
}

impl Matrix {
    /// Build a matrix from the six PDF operands `a b c d e f`.
    pub fn new(a: f64, b: f64, c: f64, d: f64, e: f64, f: f64) -> Self {
        Self {
            m: [[a, b, 0.0], [c, d, 0.0], [e, f, 1.0]],
        }
    }

    pub fn identity() -> Self {
        Self::new(1.0, 0.0, 0.0, 1.0, 0.0, 0.0)
    }

    pub fn translation(tx: f64, ty: f64) -> Self {
        Self::new(1.0, 0.0, 0.0, 1.0, tx, ty)
    }

    pub fn scale(sx: f64, sy: f64) -> Self {
        Self::new(sx, 0.0, 0.0, sy, 0.0, 0.0)
    }

    pub fn a(&self) -> f64 {
        self.m[0][0]
    }

    pub fn b(&self) -> f64 {
        self.m[0][1]
    }

    pub fn c(&self) -> f64 {
        self.m[1][0]
    }

    pub fn d(&self) -> f64 {
        self.m[1][1]
    }

    pub fn e(&self) -> f64 {
        self.m[2][0]
    }

    pub fn f(&self) -> f64 {
        self.m[2][1]
    }

    /// The six PDF operands `[a, b, c, d, e, f]`.
    pub fn to_array(&self) -> [f64; 6] {
        [self.a(), self.b(), self.c(), self.d(), self.e(), self.f()]
    }

    /// Matrix product `self · other`.
    ///
    /// With row-vector points, `p · (self · other)` applies `self` first.
    pub fn multiply(&self, other: &Matrix) -> Matrix {
        let mut m = [[0.0; 3]; 3];
        for (row, out) in m.iter_mut().enumerate() {
            for (col, cell) in out.iter_mut().enumerate() {
                *cell = (0..3).map(|k| self.m[row][k] * other.m[k][col]).sum();
            }
        }
        Matrix { m }
    }

    /// Transform a point, including translation.
    pub fn transform_point(&self, p: Point) -> Point {
        Point {
            x: p.x * self.a() + p.y * self.c() + self.e(),
            y: p.x * self.b() + p.y * self.d() + self.f(),
        }
    }

    /// Transform a vector, ignoring translation (homogeneous `(x, y, 0)`).
    pub fn transform_vector(&self, x: f64, y: f64) -> Point {
        Point {
            x: x * self.a() + y * self.c(),
            y: x * self.b() + y * self.d(),
        }
    }

    /// Copy of this matrix with the leading 2×2 block scaled by `s`.
    pub fn scale_linear(&self, s: f64) -> Matrix {
        let mut m = self.m;
        for row in m.iter_mut().take(2) {
            row[0] *= s;
            row[1] *= s;
        }
        Matrix { m }
    }

    /// Determinant of the linear part. Zero for degenerate matrices.
    pub fn determinant(&self) -> f64 {
        self.a() * self.d() - self.b() * self.c()
    }
}

/// Axis-aligned bounding box in user space (`x0 <= x1`, `y0 <= y1`).
#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct BBox {
    pub x0: f64,
    pub y0: f64,
    pub x1: f64,
    pub y1: f64,
}

impl BBox {
    /// Build a box from two corners, normalizing the ordering.
    pub fn new(x0: f64, y0: f64, x1: f64, y1: f64) -> Self {
        Self {
            x0: x0.min(x1),
            y0: y0.min(y1),
            x1: x0.max(x1),
            y1: y0.max(y1),
        }
    }

    /// Smallest box containing all `points`. Returns `None` for an empty iterator.
    pub fn from_points<I: IntoIterator<Item = Point>>(points: I) -> Option<Self> {
        let mut iter = points.into_iter();
        let first = iter.next()?;
        let mut bbox = BBox {
            x0: first.x,
            y0: first.y,
            x1: first.x,
            y1: first.y,
        };
        for p in iter {
            bbox.x0 = bbox.x0.min(p.x);
            bbox.y0 = bbox.y0.min(p.y);
            bbox.x1 = bbox.x1.max(p.x);
            bbox.y1 = bbox.y1.max(p.y);
        }
        Some(bbox)
    }

    pub fn width(&self) -> f64 {
        self.x1 - self.x0
    }

    pub fn height(&self) -> f64 {
        self.y1 - self.y0
    }

    pub fn area(&self) -> f64 {
        self.width() * self.height()
    }

    /// Lower-left corner.
    pub fn lower_left(&self) -> Point {
        Point::new(self.x0, self.y0)
    }

    /// Whether `p` lies inside the box (edges inclusive).
    pub fn contains(&self, p: Point) -> bool {
        p.x >= self.x0 && p.x <= self.x1 && p.y >= self.y0 && p.y <= self.y1
    }

    /// Widen any side shorter than `min` to `min`, keeping its centre.
    pub fn at_least(&self, min: f64) -> BBox {
        let widen = |lo: f64, hi: f64| {
            if hi - lo >= min {
                (lo, hi)
            } else {
                let mid = (lo + hi) / 2.0;
                (mid - min / 2.0, mid + min / 2.0)
            }
        };
        let (x0, x1) = widen(self.x0, self.x1);
        let (y0, y1) = widen(self.y0, self.y1);
        BBox { x0, y0, x1, y1 }
    }

    /// Compute the union of two bounding boxes.
    pub fn union(&self, other: &BBox) -> BBox {
        BBox {
            x0: self.x0.min(other.x0),
            y0: self.y0.min(other.y0),
            x1: self.x1.max(other.x1),
            y1: self.y1.max(other.y1),
        }
    }
}

/// A straight segment between two points.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct LineSegment {
    pub start: Point,
    pub end: Point,
}

impl LineSegment {
    pub fn new(start: Point, end: Point) -> Self {
        Self { start, end }
    }

    pub fn length(&self) -> f64 {
        self.start.distance(&self.end)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_point_approx(p: Point, x: f64, y: f64) {
        assert!((p.x - x).abs() < 1e-10, "x: expected {x}, got {}", p.x);
        assert!((p.y - y).abs() < 1e-10, "y: expected {y}, got {}", p.y);
    }

    #[test]
    fn at_least_widens_degenerate_sides_around_centre() {
        let b = BBox::new(50.0, 60.0, 50.0, 60.0).at_least(1.0);
        assert_eq!(b, BBox::new(49.5, 59.5, 50.5, 60.5));
        let tall = BBox::new(0.0, 0.0, 0.2, 30.0).at_least(1.0);
        assert_eq!(tall, BBox::new(-0.4, 0.0, 0.6, 30.0));
        let fine = BBox::new(0.0, 0.0, 5.0, 5.0);
        assert_eq!(fine.at_least(1.0), fine);
    }

    #[test]
    fn identity_is_neutral() {
        let m = Matrix::new(2.0, 0.5, -1.0, 3.0, 10.0, 20.0);
        assert_eq!(m.multiply(&Matrix::identity()), m);
        assert_eq!(Matrix::identity().multiply(&m), m);
    }

    #[test]
    fn transform_point_applies_translation() {
        let m = Matrix::new(2.0, 0.0, 0.0, 3.0, 10.0, 20.0);
        assert_point_approx(m.transform_point(Point::new(1.0, 1.0)), 12.0, 23.0);
    }

    #[test]
    fn transform_vector_ignores_translation() {
        let m = Matrix::new(2.0, 0.0, 0.0, 3.0, 10.0, 20.0);
        assert_point_approx(m.transform_vector(1.0, 1.0), 2.0, 3.0);
    }

    #[test]
    fn multiply_applies_left_operand_first() {
        // scale then translate
        let m = Matrix::scale(2.0, 2.0).multiply(&Matrix::translation(5.0, 7.0));
        assert_point_approx(m.transform_point(Point::new(1.0, 1.0)), 7.0, 9.0);
        // translate then scale
        let m = Matrix::translation(5.0, 7.0).multiply(&Matrix::scale(2.0, 2.0));
        assert_point_approx(m.transform_point(Point::new(1.0, 1.0)), 12.0, 16.0);
    }

    #[test]
    fn multiply_rotation() {
        let rot = Matrix::new(0.0, 1.0, -1.0, 0.0, 0.0, 0.0);
        let twice = rot.multiply(&rot);
        assert_point_approx(twice.transform_point(Point::new(1.0, 0.0)), -1.0, 0.0);
    }

    #[test]
    fn accessors_match_operands() {
        let m = Matrix::new(1.0, 2.0, 3.0, 4.0, 5.0, 6.0);
        assert_eq!(m.to_array(), [1.0, 2.0, 3.0, 4.0, 5.0, 6.0]);
        assert_eq!(m.m[0][2], 0.0);
        assert_eq!(m.m[2][2], 1.0);
    }

    #[test]
    fn scale_linear_keeps_translation() {
        let m = Matrix::new(1.0, 0.0, 0.0, 1.0, 5.0, 6.0).scale_linear(12.0);
        assert_eq!(m.to_array(), [12.0, 0.0, 0.0, 12.0, 5.0, 6.0]);
    }

    #[test]
    fn determinant_of_degenerate_matrix_is_zero() {
        assert_eq!(Matrix::new(1.0, 2.0, 2.0, 4.0, 0.0, 0.0).determinant(), 0.0);
    }

    #[test]
    fn bbox_new_normalizes_corners() {
        let b = BBox::new(30.0, 40.0, 10.0, 20.0);
        assert_eq!(b, BBox { x0: 10.0, y0: 20.0, x1: 30.0, y1: 40.0 });
        assert_eq!(b.width(), 20.0);
        assert_eq!(b.height(), 20.0);
        assert_eq!(b.area(), 400.0);
    }

    #[test]
    fn bbox_from_points() {
        let b = BBox::from_points([
            Point::new(5.0, 1.0),
            Point::new(-2.0, 8.0),
            Point::new(3.0, 3.0),
        ])
        .unwrap();
        assert_eq!(b, BBox::new(-2.0, 1.0, 5.0, 8.0));
        assert!(BBox::from_points(std::iter::empty()).is_none());
    }

    #[test]
    fn bbox_contains_edges() {
        let b = BBox::new(0.0, 0.0, 10.0, 10.0);
        assert!(b.contains(Point::new(0.0, 10.0)));
        assert!(!b.contains(Point::new(10.1, 5.0)));
    }

    #[test]
    fn bbox_union() {
        let u = BBox::new(10.0, 20.0, 30.0, 40.0).union(&BBox::new(5.0, 25.0, 35.0, 45.0));
        assert_eq!(u, BBox::new(5.0, 20.0, 35.0, 45.0));
    }

    #[test]
    fn segment_length() {
        let s = LineSegment::new(Point::new(0.0, 0.0), Point::new(3.0, 4.0));
        assert_eq!(s.length(), 5.0);
    }
}
