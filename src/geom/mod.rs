//! Planar geometry support types shared across the pipeline.

pub mod envelope;
pub mod line_segment;
pub mod precision;

pub use envelope::Envelope;
pub use line_segment::LineSegment;
pub use precision::PrecisionModel;

use crate::float_types::Real;
use geo_types::Coord;

/// Euclidean distance between two coordinates in the x/y plane.
#[inline]
pub fn distance(a: Coord<Real>, b: Coord<Real>) -> Real {
    (a.x - b.x).hypot(a.y - b.y)
}

/// Remove repeated consecutive points from a coordinate sequence.
pub fn remove_repeated_points(pts: &[Coord<Real>]) -> Vec<Coord<Real>> {
    let mut out: Vec<Coord<Real>> = Vec::with_capacity(pts.len());
    for &p in pts {
        if out.last() != Some(&p) {
            out.push(p);
        }
    }
    out
}
