//! Segment/segment intersection with robust orientation tests.

use crate::algorithm::orientation;
use crate::float_types::Real;
use crate::geom::line_segment::point_to_segment;
use crate::geom::{Envelope, PrecisionModel};
use geo_types::Coord;

/// Outcome of intersecting two segments.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum IntersectionKind {
    None,
    /// The segments meet in a single point.
    Point,
    /// The segments overlap along a collinear sub-segment.
    Collinear,
}

/// Computes the intersection of two line segments, robustly.
///
/// Orientation decisions use the exact predicate; the intersection point
/// itself is computed with translation-conditioned floating point arithmetic
/// and clamped back to the nearest endpoint if rounding pushes it outside
/// both segment envelopes. The result is snapped to the active precision
/// model.
#[derive(Clone, Debug)]
pub struct RobustLineIntersector {
    precision_model: PrecisionModel,
    result: IntersectionKind,
    int_pt: [Coord<Real>; 2],
    input: [[Coord<Real>; 2]; 2],
    is_proper: bool,
}

impl Default for RobustLineIntersector {
    fn default() -> Self {
        Self::new(PrecisionModel::Floating)
    }
}

impl RobustLineIntersector {
    pub fn new(precision_model: PrecisionModel) -> Self {
        Self {
            precision_model,
            result: IntersectionKind::None,
            int_pt: [Coord::zero(); 2],
            input: [[Coord::zero(); 2]; 2],
            is_proper: false,
        }
    }

    pub fn set_precision_model(&mut self, precision_model: PrecisionModel) {
        self.precision_model = precision_model;
    }

    pub fn compute_intersection(
        &mut self,
        p1: Coord<Real>,
        p2: Coord<Real>,
        q1: Coord<Real>,
        q2: Coord<Real>,
    ) {
        self.input = [[p1, p2], [q1, q2]];
        self.is_proper = false;
        self.result = self.compute_intersect(p1, p2, q1, q2);
    }

    pub fn has_intersection(&self) -> bool {
        self.result != IntersectionKind::None
    }

    pub fn intersection_num(&self) -> usize {
        match self.result {
            IntersectionKind::None => 0,
            IntersectionKind::Point => 1,
            IntersectionKind::Collinear => 2,
        }
    }

    pub fn intersection(&self, index: usize) -> Coord<Real> {
        self.int_pt[index]
    }

    /// A proper intersection lies in the interior of both segments.
    pub fn is_proper(&self) -> bool {
        self.has_intersection() && self.is_proper
    }

    /// Does some intersection point lie in the interior of one of the input
    /// segments?
    pub fn is_interior_intersection(&self) -> bool {
        self.is_interior_intersection_of(0) || self.is_interior_intersection_of(1)
    }

    fn is_interior_intersection_of(&self, input_index: usize) -> bool {
        for i in 0..self.intersection_num() {
            let pt = self.int_pt[i];
            if pt != self.input[input_index][0] && pt != self.input[input_index][1] {
                return true;
            }
        }
        false
    }

    fn compute_intersect(
        &mut self,
        p1: Coord<Real>,
        p2: Coord<Real>,
        q1: Coord<Real>,
        q2: Coord<Real>,
    ) -> IntersectionKind {
        if !Envelope::segments_intersect(p1, p2, q1, q2) {
            return IntersectionKind::None;
        }

        let pq1 = orientation::index(p1, p2, q1);
        let pq2 = orientation::index(p1, p2, q2);
        if (pq1 > 0 && pq2 > 0) || (pq1 < 0 && pq2 < 0) {
            return IntersectionKind::None;
        }
        let qp1 = orientation::index(q1, q2, p1);
        let qp2 = orientation::index(q1, q2, p2);
        if (qp1 > 0 && qp2 > 0) || (qp1 < 0 && qp2 < 0) {
            return IntersectionKind::None;
        }

        let collinear = pq1 == 0 && pq2 == 0 && qp1 == 0 && qp2 == 0;
        if collinear {
            return self.compute_collinear_intersection(p1, p2, q1, q2);
        }

        // a single intersection point; endpoint cases first so the result is
        // exact when segments merely touch
        if pq1 == 0 || pq2 == 0 || qp1 == 0 || qp2 == 0 {
            self.is_proper = false;
            if p1 == q1 || p1 == q2 {
                self.int_pt[0] = p1;
            } else if p2 == q1 || p2 == q2 {
                self.int_pt[0] = p2;
            } else if pq1 == 0 {
                self.int_pt[0] = q1;
            } else if pq2 == 0 {
                self.int_pt[0] = q2;
            } else if qp1 == 0 {
                self.int_pt[0] = p1;
            } else {
                self.int_pt[0] = p2;
            }
        } else {
            self.is_proper = true;
            self.int_pt[0] = self.proper_intersection(p1, p2, q1, q2);
        }
        IntersectionKind::Point
    }

    fn compute_collinear_intersection(
        &mut self,
        p1: Coord<Real>,
        p2: Coord<Real>,
        q1: Coord<Real>,
        q2: Coord<Real>,
    ) -> IntersectionKind {
        let q1_in_p = coord_in_segment_envelope(q1, p1, p2);
        let q2_in_p = coord_in_segment_envelope(q2, p1, p2);
        let p1_in_q = coord_in_segment_envelope(p1, q1, q2);
        let p2_in_q = coord_in_segment_envelope(p2, q1, q2);

        if q1_in_p && q2_in_p {
            self.int_pt = [q1, q2];
            return IntersectionKind::Collinear;
        }
        if p1_in_q && p2_in_q {
            self.int_pt = [p1, p2];
            return IntersectionKind::Collinear;
        }
        if q1_in_p && p1_in_q {
            self.int_pt = [q1, p1];
            return if q1 == p1 && !q2_in_p && !p2_in_q {
                IntersectionKind::Point
            } else {
                IntersectionKind::Collinear
            };
        }
        if q1_in_p && p2_in_q {
            self.int_pt = [q1, p2];
            return if q1 == p2 && !q2_in_p && !p1_in_q {
                IntersectionKind::Point
            } else {
                IntersectionKind::Collinear
            };
        }
        if q2_in_p && p1_in_q {
            self.int_pt = [q2, p1];
            return if q2 == p1 && !q1_in_p && !p2_in_q {
                IntersectionKind::Point
            } else {
                IntersectionKind::Collinear
            };
        }
        if q2_in_p && p2_in_q {
            self.int_pt = [q2, p2];
            return if q2 == p2 && !q1_in_p && !p1_in_q {
                IntersectionKind::Point
            } else {
                IntersectionKind::Collinear
            };
        }
        IntersectionKind::None
    }

    fn proper_intersection(
        &self,
        p1: Coord<Real>,
        p2: Coord<Real>,
        q1: Coord<Real>,
        q2: Coord<Real>,
    ) -> Coord<Real> {
        let mut int_pt = match line_intersection(p1, p2, q1, q2) {
            Some(pt) => pt,
            // parallel within floating precision; fall back to the endpoint
            // nearest the other segment
            None => nearest_endpoint(p1, p2, q1, q2),
        };
        if !(coord_in_segment_envelope(int_pt, p1, p2) || coord_in_segment_envelope(int_pt, q1, q2))
        {
            int_pt = nearest_endpoint(p1, p2, q1, q2);
        }
        self.precision_model.make_precise(int_pt)
    }
}

/// Intersection point of the infinite lines through (p1,p2) and (q1,q2), or
/// `None` when they are parallel.
///
/// Ordinates are conditioned by subtracting the midpoint of the envelope
/// overlap before solving, which keeps the computation well-scaled for
/// nearly-coincident segments.
pub fn line_intersection(
    p1: Coord<Real>,
    p2: Coord<Real>,
    q1: Coord<Real>,
    q2: Coord<Real>,
) -> Option<Coord<Real>> {
    let int_min_x = p1.x.min(p2.x).max(q1.x.min(q2.x));
    let int_max_x = p1.x.max(p2.x).min(q1.x.max(q2.x));
    let int_min_y = p1.y.min(p2.y).max(q1.y.min(q2.y));
    let int_max_y = p1.y.max(p2.y).min(q1.y.max(q2.y));
    let mid_x = (int_min_x + int_max_x) / 2.0;
    let mid_y = (int_min_y + int_max_y) / 2.0;

    let p1x = p1.x - mid_x;
    let p1y = p1.y - mid_y;
    let p2x = p2.x - mid_x;
    let p2y = p2.y - mid_y;
    let q1x = q1.x - mid_x;
    let q1y = q1.y - mid_y;
    let q2x = q2.x - mid_x;
    let q2y = q2.y - mid_y;

    // homogeneous-coordinate line intersection
    let px = p1y - p2y;
    let py = p2x - p1x;
    let pw = p1x * p2y - p2x * p1y;
    let qx = q1y - q2y;
    let qy = q2x - q1x;
    let qw = q1x * q2y - q2x * q1y;

    let x = py * qw - qy * pw;
    let y = qx * pw - px * qw;
    let w = px * qy - qx * py;

    let x_int = x / w;
    let y_int = y / w;
    if !x_int.is_finite() || !y_int.is_finite() {
        return None;
    }
    Some(Coord {
        x: x_int + mid_x,
        y: y_int + mid_y,
    })
}

fn coord_in_segment_envelope(p: Coord<Real>, a: Coord<Real>, b: Coord<Real>) -> bool {
    p.x >= a.x.min(b.x) && p.x <= a.x.max(b.x) && p.y >= a.y.min(b.y) && p.y <= a.y.max(b.y)
}

fn nearest_endpoint(
    p1: Coord<Real>,
    p2: Coord<Real>,
    q1: Coord<Real>,
    q2: Coord<Real>,
) -> Coord<Real> {
    let mut nearest = p1;
    let mut min_dist = point_to_segment(p1, q1, q2);

    let dist = point_to_segment(p2, q1, q2);
    if dist < min_dist {
        min_dist = dist;
        nearest = p2;
    }
    let dist = point_to_segment(q1, p1, p2);
    if dist < min_dist {
        min_dist = dist;
        nearest = q1;
    }
    let dist = point_to_segment(q2, p1, p2);
    if dist < min_dist {
        nearest = q2;
    }
    nearest
}

#[cfg(test)]
mod tests {
    use super::*;
    use geo_types::coord;

    #[test]
    fn crossing_segments_intersect_properly() {
        let mut li = RobustLineIntersector::default();
        li.compute_intersection(
            coord! { x: 0.0, y: 0.0 },
            coord! { x: 10.0, y: 10.0 },
            coord! { x: 0.0, y: 10.0 },
            coord! { x: 10.0, y: 0.0 },
        );
        assert!(li.has_intersection());
        assert!(li.is_proper());
        assert_eq!(li.intersection(0), coord! { x: 5.0, y: 5.0 });
    }

    #[test]
    fn touching_endpoint_is_not_proper() {
        let mut li = RobustLineIntersector::default();
        li.compute_intersection(
            coord! { x: 0.0, y: 0.0 },
            coord! { x: 10.0, y: 0.0 },
            coord! { x: 10.0, y: 0.0 },
            coord! { x: 20.0, y: 5.0 },
        );
        assert!(li.has_intersection());
        assert!(!li.is_proper());
        assert_eq!(li.intersection_num(), 1);
        assert_eq!(li.intersection(0), coord! { x: 10.0, y: 0.0 });
    }

    #[test]
    fn collinear_overlap_reports_two_points() {
        let mut li = RobustLineIntersector::default();
        li.compute_intersection(
            coord! { x: 0.0, y: 0.0 },
            coord! { x: 10.0, y: 0.0 },
            coord! { x: 5.0, y: 0.0 },
            coord! { x: 15.0, y: 0.0 },
        );
        assert_eq!(li.intersection_num(), 2);
    }

    #[test]
    fn disjoint_segments_do_not_intersect() {
        let mut li = RobustLineIntersector::default();
        li.compute_intersection(
            coord! { x: 0.0, y: 0.0 },
            coord! { x: 1.0, y: 0.0 },
            coord! { x: 0.0, y: 1.0 },
            coord! { x: 1.0, y: 1.0 },
        );
        assert!(!li.has_intersection());
    }

    #[test]
    fn fixed_model_snaps_intersection() {
        let mut li = RobustLineIntersector::new(PrecisionModel::fixed(1.0));
        li.compute_intersection(
            coord! { x: 0.0, y: 0.0 },
            coord! { x: 10.0, y: 1.0 },
            coord! { x: 0.0, y: 1.0 },
            coord! { x: 10.0, y: 0.0 },
        );
        assert!(li.has_intersection());
        let pt = li.intersection(0);
        assert_eq!(pt.x, pt.x.round());
        assert_eq!(pt.y, pt.y.round());
    }
}
