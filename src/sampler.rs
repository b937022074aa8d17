//! Discretizes a segment into candidate token placements.
//!
//! The sampler keeps no state: each call recomputes its points, so bots and
//! the turn controller can call it as often as they like.

use crate::geometry::{Point, on_open_segment};

/// `resolution` points strictly inside `a`-`b`, at `t = i / (resolution + 1)`
/// for `i = 1..=resolution`, in increasing order of `t`.
pub fn sample_placements(a: Point, b: Point, resolution: usize) -> Vec<Point> {
    let step = 1.0 / (resolution as f64 + 1.0);
    (1..=resolution)
        .map(|i| a.lerp(b, i as f64 * step))
        .collect()
}

/// True iff `point` is within `eps` of one of the sampled placements.
pub fn matches_sample(a: Point, b: Point, resolution: usize, point: Point, eps: f64) -> bool {
    sample_placements(a, b, resolution)
        .into_iter()
        .any(|sample| sample.distance(point) < eps)
}

/// True iff no occupant is closer than `radius` to `point`.
pub fn is_clear<I>(point: Point, occupants: I, radius: f64) -> bool
where
    I: IntoIterator<Item = Point>,
{
    let radius_sq = radius * radius;
    occupants
        .into_iter()
        .all(|occupant| occupant.distance_squared(point) >= radius_sq)
}

/// The sampled points of `a`-`b` where a token could legally go: interior to
/// the segment and clear of every occupant by `radius`.
///
/// Line-of-sight is not checked here; callers only ask for pairs they have
/// already found unobstructed.
pub fn valid_placements<I>(
    a: Point,
    b: Point,
    resolution: usize,
    eps: f64,
    radius: f64,
    occupants: I,
) -> Vec<Point>
where
    I: IntoIterator<Item = Point>,
{
    let occupants: Vec<Point> = occupants.into_iter().collect();
    sample_placements(a, b, resolution)
        .into_iter()
        .filter(|&p| on_open_segment(a, b, p, eps))
        .filter(|&p| is_clear(p, occupants.iter().copied(), radius))
        .collect()
}

/// Some interior point of `a`-`b` clear of every occupant by `radius`, if
/// one exists anywhere on the segment.
///
/// Each occupant closer than `radius` to the line cuts an open interval out
/// of `(eps/len, 1 - eps/len)`; the answer is the middle of the widest
/// stretch left over.
pub fn free_placement<I>(
    a: Point,
    b: Point,
    eps: f64,
    radius: f64,
    occupants: I,
) -> Option<Point>
where
    I: IntoIterator<Item = Point>,
{
    let len = a.distance(b);
    if len <= f64::EPSILON {
        return None;
    }
    let margin = eps / len;
    let (lo, hi) = (margin, 1.0 - margin);
    if lo >= hi {
        return None;
    }

    let occupants: Vec<Point> = occupants.into_iter().collect();
    let dir = (b - a) * (1.0 / len);
    let radius_sq = radius * radius;
    let mut blocked: Vec<(f64, f64)> = occupants
        .iter()
        .filter_map(|&occupant| {
            let d = occupant - a;
            let along = d.dot(dir);
            let off_sq = d.dot(d) - along * along;
            if off_sq >= radius_sq {
                return None;
            }
            let half = (radius_sq - off_sq).sqrt();
            Some(((along - half) / len, (along + half) / len))
        })
        .collect();
    blocked.sort_by(|x, y| x.0.total_cmp(&y.0));

    let mut best: Option<(f64, f64)> = None;
    let mut cursor = lo;
    for &(start, end) in &blocked {
        let gap_end = start.min(hi);
        if gap_end > cursor && best.is_none_or(|(x, y)| gap_end - cursor > y - x) {
            best = Some((cursor, gap_end));
        }
        cursor = cursor.max(end);
        if cursor >= hi {
            break;
        }
    }
    if hi > cursor && best.is_none_or(|(x, y)| hi - cursor > y - x) {
        best = Some((cursor, hi));
    }

    let (from, to) = best?;
    let point = a.lerp(b, (from + to) / 2.0);
    // a sliver of a gap can vanish in rounding
    (on_open_segment(a, b, point, eps) && is_clear(point, occupants, radius)).then_some(point)
}
