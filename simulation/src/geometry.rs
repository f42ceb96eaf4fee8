//! Elementary 2D geometry: interpolation, segment intersection and polygon overlap.

use itertools::Itertools;
use serde::{Deserialize, Serialize};

/// A point in world space. `y` grows downwards.
#[derive(PartialEq, Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct Point {
    pub x: f32,
    pub y: f32,
}

impl Point {
    pub const fn new(x: f32, y: f32) -> Self {
        Point { x, y }
    }
}

/// The place where a segment got hit.
#[derive(PartialEq, Debug, Clone, Copy)]
pub struct Touch {
    /// The intersection point.
    pub point: Point,
    /// The fraction along the first segment where the hit occurred, in 0..=1.
    pub offset: f32,
}

/// Linear interpolation between `a` and `b`.
pub fn lerp(a: f32, b: f32, t: f32) -> f32 {
    a + (b - a) * t
}

/// Intersects the segment `a`-`b` with the segment `c`-`d`.
///
/// Parallel segments never touch, even when they overlap. End points count as part of
/// the segment.
pub fn segment_intersection(a: Point, b: Point, c: Point, d: Point) -> Option<Touch> {
    let t_top = (d.x - c.x) * (a.y - c.y) - (d.y - c.y) * (a.x - c.x);
    let u_top = (c.y - a.y) * (a.x - b.x) - (c.x - a.x) * (a.y - b.y);
    let bottom = (d.y - c.y) * (b.x - a.x) - (d.x - c.x) * (b.y - a.y);

    if bottom == 0.0 {
        return None;
    }

    let t = t_top / bottom;
    let u = u_top / bottom;
    if !(0.0..=1.0).contains(&t) || !(0.0..=1.0).contains(&u) {
        return None;
    }

    Some(Touch {
        point: Point {
            x: lerp(a.x, b.x, t),
            y: lerp(a.y, b.y, t),
        },
        offset: t,
    })
}

/// Iterates over the closed edges of a polygon, the last vertex connects back to the first.
pub fn polygon_edges(polygon: &[Point]) -> impl Iterator<Item = (Point, Point)> + '_ {
    polygon.iter().copied().circular_tuple_windows::<(_, _)>()
}

/// Checks if any edge of `first` crosses any edge of `second`.
///
/// A polygon fully inside the other one does not count as intersecting.
pub fn polygons_intersect(first: &[Point], second: &[Point]) -> bool {
    polygon_edges(first)
        .cartesian_product(polygon_edges(second).collect::<Vec<_>>())
        .any(|((a, b), (c, d))| segment_intersection(a, b, c, d).is_some())
}
