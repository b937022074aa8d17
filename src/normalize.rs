use crate::geometry::Point;
use serde::{Deserialize, Serialize};

/// Tolerance within which `unnormalize(normalize(p)) == p` holds for
/// points inside the configured bounds.
pub const ROUND_TRIP_EPSILON: f64 = 1e-9;

/// Physical (display) rectangle that maps onto the unit square.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Bounds {
    pub min_x: f64,
    pub min_y: f64,
    pub width: f64,
    pub height: f64,
}

impl Bounds {
    pub const fn new(min_x: f64, min_y: f64, width: f64, height: f64) -> Self {
        Bounds {
            min_x,
            min_y,
            width,
            height,
        }
    }

    pub fn center(&self) -> Point {
        Point::new(
            self.min_x + self.width / 2.0,
            self.min_y + self.height / 2.0,
        )
    }

    pub fn contains(&self, p: Point) -> bool {
        p.x >= self.min_x
            && p.x <= self.min_x + self.width
            && p.y >= self.min_y
            && p.y <= self.min_y + self.height
    }
}

impl Default for Bounds {
    /// A 900x900 board centred in a 1700x1000 window.
    fn default() -> Self {
        Bounds::new(400.0, 50.0, 900.0, 900.0)
    }
}

/// Maps between the physical frame and the normalized unit frame.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Normalizer {
    bounds: Bounds,
}

impl Normalizer {
    /// `bounds` must have a positive width and height; `GameConfig::validate`
    /// enforces this for configured games.
    pub fn new(bounds: Bounds) -> Self {
        Normalizer { bounds }
    }

    pub fn bounds(&self) -> Bounds {
        self.bounds
    }

    pub fn normalize(&self, physical: Point) -> Point {
        Point::new(
            (physical.x - self.bounds.min_x) / self.bounds.width,
            (physical.y - self.bounds.min_y) / self.bounds.height,
        )
    }

    pub fn unnormalize(&self, normalized: Point) -> Point {
        Point::new(
            normalized.x * self.bounds.width + self.bounds.min_x,
            normalized.y * self.bounds.height + self.bounds.min_y,
        )
    }
}

impl Default for Normalizer {
    fn default() -> Self {
        Normalizer::new(Bounds::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_corners_map_to_unit_square() {
        let n = Normalizer::default();
        assert_eq!(n.normalize(Point::new(400.0, 50.0)), Point::new(0.0, 0.0));
        assert_eq!(n.normalize(Point::new(1300.0, 950.0)), Point::new(1.0, 1.0));
        assert_eq!(n.normalize(Point::new(850.0, 500.0)), Point::new(0.5, 0.5));
    }

    #[test]
    fn test_round_trip() {
        let n = Normalizer::new(Bounds::new(-3.5, 12.25, 640.0, 480.0));
        for &(x, y) in &[(-3.5, 12.25), (100.0, 200.0), (636.5, 492.25), (317.123, 45.9)] {
            let p = Point::new(x, y);
            let back = n.unnormalize(n.normalize(p));
            assert!(p.distance(back) < ROUND_TRIP_EPSILON);
        }
    }

    #[test]
    fn test_bounds_center_and_contains() {
        let b = Bounds::default();
        assert_eq!(b.center(), Point::new(850.0, 500.0));
        assert!(b.contains(b.center()));
        assert!(!b.contains(Point::new(0.0, 0.0)));
    }
}
