//! Orientation predicate, backed by the adaptive-precision `robust` kernel.

use crate::float_types::Real;
use geo_types::Coord;

pub const CLOCKWISE: i32 = -1;
pub const COLLINEAR: i32 = 0;
pub const COUNTERCLOCKWISE: i32 = 1;

/// Alias so call sites can say `Orientation` instead of bare `i32`.
pub type Orientation = i32;

/// Orientation of the turn `p0 -> p1 -> p2`.
///
/// Returns [`COUNTERCLOCKWISE`] if `p2` lies to the left of the directed line
/// `p0 -> p1`, [`CLOCKWISE`] if to the right, [`COLLINEAR`] otherwise.
/// Exact for all double inputs.
pub fn index(p0: Coord<Real>, p1: Coord<Real>, p2: Coord<Real>) -> Orientation {
    let det = robust::orient2d(
        robust::Coord { x: p0.x, y: p0.y },
        robust::Coord { x: p1.x, y: p1.y },
        robust::Coord { x: p2.x, y: p2.y },
    );
    if det > 0.0 {
        COUNTERCLOCKWISE
    } else if det < 0.0 {
        CLOCKWISE
    } else {
        COLLINEAR
    }
}

/// Is the (closed) ring counter-clockwise, by signed area?
///
/// The ring may or may not repeat its start point at the end.
pub fn is_ccw(ring: &[Coord<Real>]) -> bool {
    signed_area(ring) > 0.0
}

/// Twice-signed-area free shoelace sum; positive for CCW rings.
pub fn signed_area(ring: &[Coord<Real>]) -> Real {
    let n = ring.len();
    if n < 3 {
        return 0.0;
    }
    // treat the ring as implicitly closed
    let mut sum = 0.0;
    for i in 0..n {
        let p0 = ring[i];
        let p1 = ring[(i + 1) % n];
        sum += p0.x * p1.y - p1.x * p0.y;
    }
    sum / 2.0
}
