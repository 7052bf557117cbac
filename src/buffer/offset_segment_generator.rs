//! Generates one raw offset curve, segment by segment.
//!
//! The generator walks the (simplified) input line keeping a window of two
//! segments, emits their parallel offsets, and fills the gap at each vertex
//! with the join the parameters call for. End caps and the point curves
//! (circle/square) live here too.

use crate::algorithm::line_intersector::line_intersection;
use crate::algorithm::orientation::{self, CLOCKWISE, COLLINEAR, COUNTERCLOCKWISE};
use crate::algorithm::{angle, RobustLineIntersector};
use crate::buffer::params::{BufferParams, EndCapStyle, JoinStyle};
use crate::float_types::{Real, FRAC_PI_2, PI};
use crate::geom::{self, LineSegment, PrecisionModel};
use crate::geomgraph::Position;
use geo_types::Coord;

/// Factor controlling how close offset segments can be before their join is
/// collapsed to a single vertex.
const OFFSET_SEGMENT_SEPARATION_FACTOR: Real = 1.0e-3;

/// Factor controlling how close curve vertices on an inside turn can be
/// before they are snapped together.
const INSIDE_TURN_VERTEX_SNAP_DISTANCE_FACTOR: Real = 1.0e-3;

/// Factor controlling how close curve vertices can be in general.
const CURVE_VERTEX_SNAP_DISTANCE_FACTOR: Real = 1.0e-6;

/// Factor determining how long "closing segments" are. The trade-off is
/// curve smoothness against the number of extra vertices on narrow concave
/// angles.
const MAX_CLOSING_SEG_LEN_FACTOR: i32 = 80;

/// The curve under construction: precision-rounded, with near-duplicate
/// vertices filtered out.
#[derive(Debug, Default)]
struct OffsetSegmentString {
    pts: Vec<Coord<Real>>,
    precision_model: PrecisionModel,
    minimum_vertex_distance: Real,
}

impl OffsetSegmentString {
    fn add_pt(&mut self, pt: Coord<Real>) {
        let buf_pt = self.precision_model.make_precise(pt);
        if self.is_redundant(buf_pt) {
            return;
        }
        self.pts.push(buf_pt);
    }

    fn add_pts(&mut self, pts: &[Coord<Real>], is_forward: bool) {
        if is_forward {
            for &pt in pts {
                self.add_pt(pt);
            }
        } else {
            for &pt in pts.iter().rev() {
                self.add_pt(pt);
            }
        }
    }

    fn is_redundant(&self, pt: Coord<Real>) -> bool {
        match self.pts.last() {
            Some(&last) => pt == last || geom::distance(pt, last) < self.minimum_vertex_distance,
            None => false,
        }
    }

    fn close_ring(&mut self) {
        if self.pts.is_empty() {
            return;
        }
        let start = self.pts[0];
        if self.pts.last() != Some(&start) {
            self.pts.push(start);
        }
    }
}

#[derive(Debug)]
pub struct OffsetSegmentGenerator {
    buf_params: BufferParams,
    /// Intersections are computed in full precision here; curve points are
    /// rounded as they are inserted.
    li: RobustLineIntersector,
    seg_list: OffsetSegmentString,
    distance: Real,
    fillet_angle_quantum: Real,
    closing_seg_length_factor: i32,
    s0: Coord<Real>,
    s1: Coord<Real>,
    s2: Coord<Real>,
    seg0: LineSegment,
    seg1: LineSegment,
    offset0: LineSegment,
    offset1: LineSegment,
    side: Position,
    has_narrow_concave_angle: bool,
}

impl OffsetSegmentGenerator {
    pub fn new(precision_model: PrecisionModel, buf_params: BufferParams, distance: Real) -> Self {
        let fillet_angle_quantum = FRAC_PI_2 / buf_params.quadrant_segments.max(1) as Real;
        // Non-round joins cause issues with short closing segments, so
        // don't use closing segments with them
        let closing_seg_length_factor = if buf_params.quadrant_segments >= 8
            && buf_params.join_style == JoinStyle::Round
        {
            MAX_CLOSING_SEG_LEN_FACTOR
        } else {
            1
        };
        Self {
            buf_params,
            li: RobustLineIntersector::default(),
            seg_list: OffsetSegmentString {
                pts: Vec::new(),
                precision_model,
                minimum_vertex_distance: distance * CURVE_VERTEX_SNAP_DISTANCE_FACTOR,
            },
            distance,
            fillet_angle_quantum,
            closing_seg_length_factor,
            s0: Coord::zero(),
            s1: Coord::zero(),
            s2: Coord::zero(),
            seg0: LineSegment::default(),
            seg1: LineSegment::default(),
            offset0: LineSegment::default(),
            offset1: LineSegment::default(),
            side: Position::Left,
            has_narrow_concave_angle: false,
        }
    }

    /// Did some inside turn fail to intersect (a very narrow concave angle)?
    pub fn has_narrow_concave_angle(&self) -> bool {
        self.has_narrow_concave_angle
    }

    pub fn coordinates(self) -> Vec<Coord<Real>> {
        self.seg_list.pts
    }

    pub fn init_side_segments(&mut self, s1: Coord<Real>, s2: Coord<Real>, side: Position) {
        self.s1 = s1;
        self.s2 = s2;
        self.side = side;
        self.seg1.set_coordinates(s1, s2);
        self.offset1 = compute_offset_segment(&self.seg1, side, self.distance);
    }

    pub fn add_segments(&mut self, pts: &[Coord<Real>], is_forward: bool) {
        self.seg_list.add_pts(pts, is_forward);
    }

    pub fn add_first_segment(&mut self) {
        self.seg_list.add_pt(self.offset1.p0);
    }

    /// Add the last offset point of the current segment.
    pub fn add_last_segment(&mut self) {
        self.seg_list.add_pt(self.offset1.p1);
    }

    pub fn close_ring(&mut self) {
        self.seg_list.close_ring();
    }

    pub fn add_next_segment(&mut self, p: Coord<Real>, add_start_point: bool) {
        // shift the segment window forward
        self.s0 = self.s1;
        self.s1 = self.s2;
        self.s2 = p;
        self.seg0.set_coordinates(self.s0, self.s1);
        self.offset0 = compute_offset_segment(&self.seg0, self.side, self.distance);
        self.seg1.set_coordinates(self.s1, self.s2);
        self.offset1 = compute_offset_segment(&self.seg1, self.side, self.distance);

        if self.s1 == self.s2 {
            return;
        }

        let orientation = orientation::index(self.s0, self.s1, self.s2);
        let outside_turn = (orientation == CLOCKWISE && self.side == Position::Left)
            || (orientation == COUNTERCLOCKWISE && self.side == Position::Right);

        if orientation == COLLINEAR {
            self.add_collinear(add_start_point);
        } else if outside_turn {
            self.add_outside_turn(orientation, add_start_point);
        } else {
            self.add_inside_turn();
        }
    }

    fn add_collinear(&mut self, add_start_point: bool) {
        self.li
            .compute_intersection(self.s0, self.s1, self.s1, self.s2);
        // if the lines are collinear (not just parallel) and head back on
        // themselves, a join is needed to cover the reversal
        if self.li.intersection_num() >= 2 {
            if self.buf_params.join_style == JoinStyle::Bevel
                || self.buf_params.join_style == JoinStyle::Mitre
            {
                if add_start_point {
                    self.seg_list.add_pt(self.offset0.p1);
                }
                self.seg_list.add_pt(self.offset1.p0);
            } else {
                self.add_corner_fillet(self.s1, self.offset0.p1, self.offset1.p0, CLOCKWISE);
            }
        }
    }

    fn add_outside_turn(&mut self, orientation: i32, add_start_point: bool) {
        // if the offset endpoints nearly coincide, a single vertex will do
        if geom::distance(self.offset0.p1, self.offset1.p0)
            < self.distance * OFFSET_SEGMENT_SEPARATION_FACTOR
        {
            self.seg_list.add_pt(self.offset0.p1);
            return;
        }
        match self.buf_params.join_style {
            JoinStyle::Mitre => self.add_mitre_join(self.s1),
            JoinStyle::Bevel => self.add_bevel_join(),
            JoinStyle::Round => {
                if add_start_point {
                    self.seg_list.add_pt(self.offset0.p1);
                }
                self.add_corner_fillet(self.s1, self.offset0.p1, self.offset1.p0, orientation);
                self.seg_list.add_pt(self.offset1.p0);
            }
        }
    }

    fn add_inside_turn(&mut self) {
        self.li.compute_intersection(
            self.offset0.p0,
            self.offset0.p1,
            self.offset1.p0,
            self.offset1.p1,
        );
        if self.li.has_intersection() {
            self.seg_list.add_pt(self.li.intersection(0));
            return;
        }
        // The angle is so sharp (and/or the offset so large) that the offset
        // segments miss each other. The curve must still be continuous, so
        // connect them with closing segments pulled towards the corner.
        self.has_narrow_concave_angle = true;
        if geom::distance(self.offset0.p1, self.offset1.p0)
            < self.distance * INSIDE_TURN_VERTEX_SNAP_DISTANCE_FACTOR
        {
            self.seg_list.add_pt(self.offset0.p1);
            return;
        }
        self.seg_list.add_pt(self.offset0.p1);
        if self.closing_seg_length_factor > 0 {
            let f = self.closing_seg_length_factor as Real;
            let mid0 = Coord {
                x: (f * self.offset0.p1.x + self.s1.x) / (f + 1.0),
                y: (f * self.offset0.p1.y + self.s1.y) / (f + 1.0),
            };
            self.seg_list.add_pt(mid0);
            let mid1 = Coord {
                x: (f * self.offset1.p0.x + self.s1.x) / (f + 1.0),
                y: (f * self.offset1.p0.y + self.s1.y) / (f + 1.0),
            };
            self.seg_list.add_pt(mid1);
        } else {
            self.seg_list.add_pt(self.s1);
        }
        self.seg_list.add_pt(self.offset1.p0);
    }

    /// Cap off the end of the line ending with segment `p0 -> p1`.
    pub fn add_line_end_cap(&mut self, p0: Coord<Real>, p1: Coord<Real>) {
        let seg = LineSegment::new(p0, p1);
        let offset_l = compute_offset_segment(&seg, Position::Left, self.distance);
        let offset_r = compute_offset_segment(&seg, Position::Right, self.distance);

        let dx = p1.x - p0.x;
        let dy = p1.y - p0.y;
        let angle = dy.atan2(dx);

        match self.buf_params.end_cap_style {
            EndCapStyle::Round => {
                self.seg_list.add_pt(offset_l.p1);
                self.add_directed_fillet(
                    p1,
                    angle + FRAC_PI_2,
                    angle - FRAC_PI_2,
                    CLOCKWISE,
                    self.distance,
                );
                self.seg_list.add_pt(offset_r.p1);
            }
            EndCapStyle::Flat => {
                self.seg_list.add_pt(offset_l.p1);
                self.seg_list.add_pt(offset_r.p1);
            }
            EndCapStyle::Square => {
                let side_offset = Coord {
                    x: self.distance.abs() * angle.cos(),
                    y: self.distance.abs() * angle.sin(),
                };
                self.seg_list.add_pt(Coord {
                    x: offset_l.p1.x + side_offset.x,
                    y: offset_l.p1.y + side_offset.y,
                });
                self.seg_list.add_pt(Coord {
                    x: offset_r.p1.x + side_offset.x,
                    y: offset_r.p1.y + side_offset.y,
                });
            }
        }
    }

    fn add_mitre_join(&mut self, corner_pt: Coord<Real>) {
        // This computation is unstable if the offset segments are nearly
        // collinear, but that case was already filtered by the coincident
        // endpoint check in the outside-turn handler.
        if let Some(int_pt) = line_intersection(
            self.offset0.p0,
            self.offset0.p1,
            self.offset1.p0,
            self.offset1.p1,
        ) {
            let mitre_ratio = if self.distance <= 0.0 {
                1.0
            } else {
                geom::distance(int_pt, corner_pt) / self.distance.abs()
            };
            if mitre_ratio <= self.buf_params.mitre_limit {
                self.seg_list.add_pt(int_pt);
                return;
            }
        }
        // mitre limit exceeded (or the intersection failed)
        self.add_limited_mitre_join(self.buf_params.mitre_limit);
    }

    /// Bevel the join at the mitre-limit distance from the corner.
    fn add_limited_mitre_join(&mut self, mitre_limit: Real) {
        let base_pt = self.seg0.p1;
        let ang0 = angle::angle(base_pt, self.seg0.p0);
        // oriented angle between the two segments
        let ang_diff = angle::angle_between_oriented(self.seg0.p0, base_pt, self.seg1.p1);
        let ang_diff_half = ang_diff / 2.0;
        // bisector of the interior angle
        let mid_ang = angle::normalize(ang0 + ang_diff_half);
        // bisector of the reflex angle, where the mitre tip would lie
        let mitre_mid_ang = angle::normalize(mid_ang + PI);
        let mitre_dist = mitre_limit * self.distance;
        let bevel_delta = mitre_dist * ang_diff_half.sin().abs();
        let bevel_half_len = self.distance - bevel_delta;

        let bevel_mid = Coord {
            x: base_pt.x + mitre_dist * mitre_mid_ang.cos(),
            y: base_pt.y + mitre_dist * mitre_mid_ang.sin(),
        };
        let mitre_mid_line = LineSegment::new(base_pt, bevel_mid);
        let bevel_end_left = mitre_mid_line.point_along_offset(1.0, bevel_half_len);
        let bevel_end_right = mitre_mid_line.point_along_offset(1.0, -bevel_half_len);

        if self.side == Position::Left {
            self.seg_list.add_pt(bevel_end_left);
            self.seg_list.add_pt(bevel_end_right);
        } else {
            self.seg_list.add_pt(bevel_end_right);
            self.seg_list.add_pt(bevel_end_left);
        }
    }

    fn add_bevel_join(&mut self) {
        self.seg_list.add_pt(self.offset0.p1);
        self.seg_list.add_pt(self.offset1.p0);
    }

    /// Circular fillet around `p` from `p0` to `p1`.
    fn add_corner_fillet(&mut self, p: Coord<Real>, p0: Coord<Real>, p1: Coord<Real>, direction: i32) {
        let dx0 = p0.x - p.x;
        let dy0 = p0.y - p.y;
        let mut start_angle = dy0.atan2(dx0);
        let dx1 = p1.x - p.x;
        let dy1 = p1.y - p.y;
        let end_angle = dy1.atan2(dx1);

        if direction == CLOCKWISE {
            if start_angle <= end_angle {
                start_angle += 2.0 * PI;
            }
        } else if start_angle >= end_angle {
            start_angle -= 2.0 * PI;
        }
        self.seg_list.add_pt(p0);
        self.add_directed_fillet(p, start_angle, end_angle, direction, self.distance);
        self.seg_list.add_pt(p1);
    }

    /// Fillet points between two angles, quantized by the configured
    /// quadrant segments. The end points are not emitted.
    fn add_directed_fillet(
        &mut self,
        p: Coord<Real>,
        start_angle: Real,
        end_angle: Real,
        direction: i32,
        radius: Real,
    ) {
        let direction_factor = if direction == CLOCKWISE { -1.0 } else { 1.0 };
        let total_angle = (start_angle - end_angle).abs();
        let n_segs = (total_angle / self.fillet_angle_quantum + 0.5) as i64;
        if n_segs < 1 {
            // no segments because the angle is less than the increment
            return;
        }
        let angle_inc = total_angle / n_segs as Real;
        for i in 0..n_segs {
            let angle = start_angle + direction_factor * i as Real * angle_inc;
            self.seg_list.add_pt(Coord {
                x: p.x + radius * angle.cos(),
                y: p.y + radius * angle.sin(),
            });
        }
    }

    /// Full circle around `p` (the round cap of a point buffer).
    pub fn create_circle(&mut self, p: Coord<Real>) {
        // start at the rightmost point and trace clockwise
        self.seg_list.add_pt(Coord {
            x: p.x + self.distance,
            y: p.y,
        });
        self.add_directed_fillet(p, 0.0, 2.0 * PI, CLOCKWISE, self.distance);
        self.seg_list.close_ring();
    }

    /// Axis-aligned square around `p` (the square cap of a point buffer).
    pub fn create_square(&mut self, p: Coord<Real>) {
        self.seg_list.add_pt(Coord {
            x: p.x + self.distance,
            y: p.y + self.distance,
        });
        self.seg_list.add_pt(Coord {
            x: p.x + self.distance,
            y: p.y - self.distance,
        });
        self.seg_list.add_pt(Coord {
            x: p.x - self.distance,
            y: p.y - self.distance,
        });
        self.seg_list.add_pt(Coord {
            x: p.x - self.distance,
            y: p.y + self.distance,
        });
        self.seg_list.close_ring();
    }
}

/// The segment parallel to `seg` at `distance` on the given side.
fn compute_offset_segment(seg: &LineSegment, side: Position, distance: Real) -> LineSegment {
    let side_sign = if side == Position::Left { 1.0 } else { -1.0 };
    let dx = seg.p1.x - seg.p0.x;
    let dy = seg.p1.y - seg.p0.y;
    let len = dx.hypot(dy);
    // u is the vector rotated 90 degrees left, scaled to the offset distance
    let ux = side_sign * distance * dx / len;
    let uy = side_sign * distance * dy / len;
    LineSegment::new(
        Coord {
            x: seg.p0.x - uy,
            y: seg.p0.y + ux,
        },
        Coord {
            x: seg.p1.x - uy,
            y: seg.p1.y + ux,
        },
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use geo_types::coord;

    #[test]
    fn offset_segment_sides() {
        let seg = LineSegment::new(coord! { x: 0.0, y: 0.0 }, coord! { x: 10.0, y: 0.0 });
        let left = compute_offset_segment(&seg, Position::Left, 2.0);
        assert_eq!(left.p0, coord! { x: 0.0, y: 2.0 });
        assert_eq!(left.p1, coord! { x: 10.0, y: 2.0 });
        let right = compute_offset_segment(&seg, Position::Right, 2.0);
        assert_eq!(right.p0, coord! { x: 0.0, y: -2.0 });
        assert_eq!(right.p1, coord! { x: 10.0, y: -2.0 });
    }

    #[test]
    fn circle_vertex_count_follows_quadrant_segments() {
        let params = BufferParams::default().with_quadrant_segments(8);
        let mut gen = OffsetSegmentGenerator::new(PrecisionModel::Floating, params, 1.0);
        gen.create_circle(coord! { x: 0.0, y: 0.0 });
        let pts = gen.coordinates();
        // 4 * qsegs distinct vertices plus the closing point
        assert_eq!(pts.len(), 33);
        assert_eq!(pts.first(), pts.last());
        for pt in &pts {
            let r = (pt.x * pt.x + pt.y * pt.y).sqrt();
            assert!((r - 1.0).abs() < 1e-9);
        }
    }

    #[test]
    fn circle_is_clockwise() {
        let params = BufferParams::default();
        let mut gen = OffsetSegmentGenerator::new(PrecisionModel::Floating, params, 1.0);
        gen.create_circle(coord! { x: 0.0, y: 0.0 });
        let pts = gen.coordinates();
        assert!(!orientation::is_ccw(&pts));
    }
}
