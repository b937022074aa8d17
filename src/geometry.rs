use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;
use std::ops::{Add, Mul, Sub};

/// A point (or vector) on the board plane.
///
/// Everything outside the normalizer works in normalized coordinates, where
/// the board fits inside the unit square.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub const fn new(x: f64, y: f64) -> Self {
        Point { x, y }
    }

    pub fn dot(self, other: Point) -> f64 {
        self.x * other.x + self.y * other.y
    }

    /// z component of the 3D cross product
    pub fn cross(self, other: Point) -> f64 {
        self.x * other.y - self.y * other.x
    }

    pub fn length(self) -> f64 {
        self.dot(self).sqrt()
    }

    pub fn distance(self, other: Point) -> f64 {
        (other - self).length()
    }

    pub fn distance_squared(self, other: Point) -> f64 {
        let d = other - self;
        d.dot(d)
    }

    /// Point at parameter `t` along `self -> other`.
    pub fn lerp(self, other: Point, t: f64) -> Point {
        self + (other - self) * t
    }

    fn lexicographic(self, other: Point) -> Ordering {
        self.x
            .total_cmp(&other.x)
            .then_with(|| self.y.total_cmp(&other.y))
    }
}

impl Add for Point {
    type Output = Point;

    fn add(self, rhs: Point) -> Point {
        Point::new(self.x + rhs.x, self.y + rhs.y)
    }
}

impl Sub for Point {
    type Output = Point;

    fn sub(self, rhs: Point) -> Point {
        Point::new(self.x - rhs.x, self.y - rhs.y)
    }
}

impl Mul<f64> for Point {
    type Output = Point;

    fn mul(self, rhs: f64) -> Point {
        Point::new(self.x * rhs, self.y * rhs)
    }
}

impl fmt::Display for Point {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({:.4}, {:.4})", self.x, self.y)
    }
}

/// Orders a segment's endpoints so every predicate evaluates the same
/// floating-point expression for `(a, b)` and `(b, a)`.
fn canonical(a: Point, b: Point) -> (Point, Point) {
    if a.lexicographic(b) == Ordering::Greater {
        (b, a)
    } else {
        (a, b)
    }
}

/// True iff `c` lies within `eps` of the infinite line through `a` and `b`.
///
/// The cross product is compared against `eps * |ab|`, so the test measures
/// perpendicular distance and does not depend on how long the segment is.
/// A degenerate line (`a == b`) only contains points within `eps` of `a`.
pub fn collinear(a: Point, b: Point, c: Point, eps: f64) -> bool {
    let (a, b) = canonical(a, b);
    let ab = b - a;
    let len = ab.length();
    if len <= f64::EPSILON {
        return a.distance(c) < eps;
    }
    ab.cross(c - a).abs() < eps * len
}

/// Projection parameter of `c` onto `a -> b` (0 at `a`, 1 at `b`).
///
/// `None` for a degenerate segment.
pub fn projection_parameter(a: Point, b: Point, c: Point) -> Option<f64> {
    let ab = b - a;
    let len_sq = ab.dot(ab);
    if len_sq <= f64::EPSILON * f64::EPSILON {
        return None;
    }
    Some((c - a).dot(ab) / len_sq)
}

/// True iff `c` is collinear with `a`, `b` and strictly between them.
///
/// Points within `eps` of either endpoint (measured along the segment) are
/// not considered interior.
pub fn on_open_segment(a: Point, b: Point, c: Point, eps: f64) -> bool {
    let (a, b) = canonical(a, b);
    if !collinear(a, b, c, eps) {
        return false;
    }
    let Some(t) = projection_parameter(a, b, c) else {
        return false;
    };
    let margin = eps / a.distance(b);
    t > margin && t < 1.0 - margin
}

/// True iff none of `obstacles` lies on the open segment `a`-`b`.
///
/// Callers pass every uncaptured piece other than the endpoints plus every
/// placed token.
pub fn unobstructed<I>(a: Point, b: Point, obstacles: I, eps: f64) -> bool
where
    I: IntoIterator<Item = Point>,
{
    obstacles
        .into_iter()
        .all(|obstacle| !on_open_segment(a, b, obstacle, eps))
}
