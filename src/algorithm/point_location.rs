//! Point-in-ring location by ray crossing counting.

use crate::algorithm::orientation::{self, COLLINEAR, COUNTERCLOCKWISE};
use crate::float_types::Real;
use crate::geomgraph::Location;
use geo_types::Coord;

/// Where is `p` relative to the (closed) ring?
///
/// Counts crossings of the horizontal ray running rightwards from `p`.
/// Shared vertices are not double-counted: an upward edge includes its start
/// and excludes its end, a downward edge the reverse.
pub fn locate_point_in_ring(p: Coord<Real>, ring: &[Coord<Real>]) -> Location {
    let mut crossing_count = 0u32;
    for i in 1..ring.len() {
        let p1 = ring[i];
        let p2 = ring[i - 1];

        // segment strictly to the left of the test point
        if p1.x < p.x && p2.x < p.x {
            continue;
        }
        if p == p2 {
            return Location::Boundary;
        }
        // horizontal segments are only interesting if the point lies on one
        if p1.y == p.y && p2.y == p.y {
            let minx = p1.x.min(p2.x);
            let maxx = p1.x.max(p2.x);
            if p.x >= minx && p.x <= maxx {
                return Location::Boundary;
            }
            continue;
        }
        if (p1.y > p.y && p2.y <= p.y) || (p2.y > p.y && p1.y <= p.y) {
            let mut orient = orientation::index(p1, p2, p);
            if orient == COLLINEAR {
                return Location::Boundary;
            }
            // re-orient so the effective segment direction is upwards
            if p2.y < p1.y {
                orient = -orient;
            }
            if orient == COUNTERCLOCKWISE {
                crossing_count += 1;
            }
        }
    }
    if crossing_count % 2 == 1 {
        Location::Interior
    } else {
        Location::Exterior
    }
}

/// Convenience wrapper: is `p` inside or on the ring?
pub fn is_in_ring(p: Coord<Real>, ring: &[Coord<Real>]) -> bool {
    locate_point_in_ring(p, ring) != Location::Exterior
}

#[cfg(test)]
mod tests {
    use super::*;
    use geo_types::coord;

    fn unit_square() -> Vec<Coord<Real>> {
        vec![
            coord! { x: 0.0, y: 0.0 },
            coord! { x: 10.0, y: 0.0 },
            coord! { x: 10.0, y: 10.0 },
            coord! { x: 0.0, y: 10.0 },
            coord! { x: 0.0, y: 0.0 },
        ]
    }

    #[test]
    fn locates_interior_exterior_boundary() {
        let ring = unit_square();
        assert_eq!(
            locate_point_in_ring(coord! { x: 5.0, y: 5.0 }, &ring),
            Location::Interior
        );
        assert_eq!(
            locate_point_in_ring(coord! { x: 15.0, y: 5.0 }, &ring),
            Location::Exterior
        );
        assert_eq!(
            locate_point_in_ring(coord! { x: 10.0, y: 5.0 }, &ring),
            Location::Boundary
        );
    }
}
