//! Computes the raw offset curve for a geometry component at a given
//! distance. Raw curves are not noded and may well self-intersect; the
//! downstream pipeline resolves that.

use crate::buffer::input_line_simplifier;
use crate::buffer::offset_segment_generator::OffsetSegmentGenerator;
use crate::buffer::params::{BufferParams, EndCapStyle};
use crate::float_types::Real;
use crate::geom::PrecisionModel;
use crate::geomgraph::Position;
use geo_types::Coord;

#[derive(Clone, Debug)]
pub struct OffsetCurveBuilder {
    precision_model: PrecisionModel,
    buf_params: BufferParams,
    distance: Real,
}

impl OffsetCurveBuilder {
    pub fn new(precision_model: PrecisionModel, buf_params: BufferParams) -> Self {
        Self {
            precision_model,
            buf_params,
            distance: 0.0,
        }
    }

    pub fn buffer_parameters(&self) -> &BufferParams {
        &self.buf_params
    }

    /// A zero or (non-single-sided) negative width calls for no line curve
    /// at all.
    pub fn is_line_offset_empty(&self, distance: Real) -> bool {
        if distance == 0.0 {
            return true;
        }
        if distance < 0.0 && !self.buf_params.single_sided {
            return true;
        }
        false
    }

    /// The (closed) offset curve for a line, or `None` when the offset is
    /// empty. For single-sided parameters the distance sign selects the
    /// side: positive = left, negative = right.
    pub fn line_curve(&mut self, input_pts: &[Coord<Real>], distance: Real) -> Option<Vec<Coord<Real>>> {
        self.distance = distance;
        if input_pts.is_empty() || self.is_line_offset_empty(distance) {
            return None;
        }
        let pos_distance = distance.abs();
        let mut seg_gen = self.seg_gen(pos_distance);
        if input_pts.len() <= 1 {
            self.compute_point_curve(input_pts[0], &mut seg_gen);
        } else if self.buf_params.single_sided {
            let is_right_side = distance < 0.0;
            self.compute_single_sided_buffer_curve(input_pts, is_right_side, &mut seg_gen);
        } else {
            self.compute_line_buffer_curve(input_pts, &mut seg_gen);
        }
        let pts = seg_gen.coordinates();
        (!pts.is_empty()).then_some(pts)
    }

    /// The offset curve for one side of a ring.
    pub fn ring_curve(
        &mut self,
        input_pts: &[Coord<Real>],
        side: Position,
        distance: Real,
    ) -> Option<Vec<Coord<Real>>> {
        self.distance = distance;
        if input_pts.len() <= 2 {
            return self.line_curve(input_pts, distance);
        }
        // a zero width offset of a ring is the ring itself
        if distance == 0.0 {
            return Some(input_pts.to_vec());
        }
        let mut seg_gen = self.seg_gen(distance);
        self.compute_ring_buffer_curve(input_pts, side, &mut seg_gen);
        let pts = seg_gen.coordinates();
        (!pts.is_empty()).then_some(pts)
    }

    /// The raw one-sided offset curve(s), with no end caps. Used by
    /// single-sided buffer refinement.
    pub fn single_sided_line_curve(
        &mut self,
        input_pts: &[Coord<Real>],
        distance: Real,
        left_side: bool,
        right_side: bool,
    ) -> Vec<Vec<Coord<Real>>> {
        self.distance = distance;
        if distance == 0.0 || input_pts.len() < 2 {
            return Vec::new();
        }
        let dist_tol = self.simplify_tolerance(distance);
        let mut seg_gen = self.seg_gen(distance);

        if left_side {
            let simp1 = input_line_simplifier::simplify(input_pts, dist_tol);
            seg_gen.init_side_segments(simp1[0], simp1[1], Position::Left);
            seg_gen.add_first_segment();
            for pt in simp1.iter().skip(2) {
                seg_gen.add_next_segment(*pt, true);
            }
            seg_gen.add_last_segment();
        }
        if right_side {
            let simp2 = input_line_simplifier::simplify(input_pts, -dist_tol);
            let n2 = simp2.len() - 1;
            seg_gen.init_side_segments(simp2[n2], simp2[n2 - 1], Position::Left);
            seg_gen.add_first_segment();
            if n2 >= 2 {
                for i in (0..=n2 - 2).rev() {
                    seg_gen.add_next_segment(simp2[i], true);
                }
            }
            seg_gen.add_last_segment();
        }
        let pts = seg_gen.coordinates();
        if pts.len() < 2 {
            Vec::new()
        } else {
            vec![pts]
        }
    }

    fn compute_point_curve(&self, pt: Coord<Real>, seg_gen: &mut OffsetSegmentGenerator) {
        match self.buf_params.end_cap_style {
            EndCapStyle::Round => seg_gen.create_circle(pt),
            EndCapStyle::Square => seg_gen.create_square(pt),
            // a flat cap makes the point curve empty
            EndCapStyle::Flat => {}
        }
    }

    fn compute_line_buffer_curve(&self, input_pts: &[Coord<Real>], seg_gen: &mut OffsetSegmentGenerator) {
        let dist_tol = self.simplify_tolerance(self.distance.abs());

        //-------- compute points for left side of line
        let simp1 = input_line_simplifier::simplify(input_pts, dist_tol);
        let n1 = simp1.len() - 1;
        seg_gen.init_side_segments(simp1[0], simp1[1], Position::Left);
        for pt in simp1.iter().skip(2) {
            seg_gen.add_next_segment(*pt, true);
        }
        seg_gen.add_last_segment();
        seg_gen.add_line_end_cap(simp1[n1 - 1], simp1[n1]);

        //-------- compute points for right side of line
        let simp2 = input_line_simplifier::simplify(input_pts, -dist_tol);
        let n2 = simp2.len() - 1;
        seg_gen.init_side_segments(simp2[n2], simp2[n2 - 1], Position::Left);
        if n2 >= 2 {
            for i in (0..=n2 - 2).rev() {
                seg_gen.add_next_segment(simp2[i], true);
            }
        }
        seg_gen.add_last_segment();
        seg_gen.add_line_end_cap(simp2[1], simp2[0]);

        seg_gen.close_ring();
    }

    fn compute_single_sided_buffer_curve(
        &self,
        input_pts: &[Coord<Real>],
        is_right_side: bool,
        seg_gen: &mut OffsetSegmentGenerator,
    ) {
        let dist_tol = self.simplify_tolerance(self.distance.abs());

        if is_right_side {
            // add the original line along the opposite side
            seg_gen.add_segments(input_pts, true);
            let simp2 = input_line_simplifier::simplify(input_pts, -dist_tol);
            let n2 = simp2.len() - 1;
            seg_gen.init_side_segments(simp2[n2], simp2[n2 - 1], Position::Left);
            seg_gen.add_first_segment();
            if n2 >= 2 {
                for i in (0..=n2 - 2).rev() {
                    seg_gen.add_next_segment(simp2[i], true);
                }
            }
        } else {
            seg_gen.add_segments(input_pts, false);
            let simp1 = input_line_simplifier::simplify(input_pts, dist_tol);
            seg_gen.init_side_segments(simp1[0], simp1[1], Position::Left);
            seg_gen.add_first_segment();
            for pt in simp1.iter().skip(2) {
                seg_gen.add_next_segment(*pt, true);
            }
        }
        seg_gen.add_last_segment();
        seg_gen.close_ring();
    }

    fn compute_ring_buffer_curve(
        &self,
        input_pts: &[Coord<Real>],
        side: Position,
        seg_gen: &mut OffsetSegmentGenerator,
    ) {
        let mut dist_tol = self.simplify_tolerance(self.distance);
        if side == Position::Right {
            dist_tol = -dist_tol;
        }
        let simp = input_line_simplifier::simplify(input_pts, dist_tol);
        let n = simp.len() - 1;

        // the ring wraps, so initialize with the last segment
        seg_gen.init_side_segments(simp[n - 1], simp[0], side);
        for (i, pt) in simp.iter().enumerate().take(n + 1).skip(1) {
            let add_start_point = i != 1;
            seg_gen.add_next_segment(*pt, add_start_point);
        }
        seg_gen.close_ring();
    }

    fn simplify_tolerance(&self, buf_distance: Real) -> Real {
        buf_distance.abs() * self.buf_params.simplify_factor
    }

    fn seg_gen(&self, distance: Real) -> OffsetSegmentGenerator {
        OffsetSegmentGenerator::new(self.precision_model, self.buf_params, distance)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::algorithm::orientation;
    use geo_types::coord;

    fn line() -> Vec<Coord<Real>> {
        vec![coord! { x: 0.0, y: 0.0 }, coord! { x: 10.0, y: 0.0 }]
    }

    #[test]
    fn zero_distance_line_curve_is_empty() {
        let mut builder =
            OffsetCurveBuilder::new(PrecisionModel::Floating, BufferParams::default());
        assert!(builder.line_curve(&line(), 0.0).is_none());
    }

    #[test]
    fn negative_distance_line_curve_is_empty() {
        let mut builder =
            OffsetCurveBuilder::new(PrecisionModel::Floating, BufferParams::default());
        assert!(builder.line_curve(&line(), -1.0).is_none());
    }

    #[test]
    fn flat_cap_curve_is_a_rectangle_ring() {
        let params = BufferParams::default().with_end_cap_style(EndCapStyle::Flat);
        let mut builder = OffsetCurveBuilder::new(PrecisionModel::Floating, params);
        let curve = builder.line_curve(&line(), 1.0).unwrap();
        assert_eq!(curve.first(), curve.last());
        // the enclosed area of the raw curve is the stadium rectangle
        let area = orientation::signed_area(&curve).abs();
        assert!((area - 20.0).abs() < 1e-9, "area = {area}");
    }

    #[test]
    fn round_cap_curve_area_includes_the_caps() {
        let mut builder =
            OffsetCurveBuilder::new(PrecisionModel::Floating, BufferParams::default());
        let curve = builder.line_curve(&line(), 1.0).unwrap();
        let area = orientation::signed_area(&curve).abs();
        // stadium: 20 + pi, slightly less because the arcs are inscribed
        assert!(area > 20.0 + 2.8 && area < 20.0 + crate::float_types::PI + 1e-6);
    }

    #[test]
    fn single_sided_raw_curve_is_offset_to_the_left() {
        let mut builder =
            OffsetCurveBuilder::new(PrecisionModel::Floating, BufferParams::default());
        let curves = builder.single_sided_line_curve(&line(), 1.0, true, false);
        assert_eq!(curves.len(), 1);
        for pt in &curves[0] {
            assert!((pt.y - 1.0).abs() < 1e-9);
        }
    }
}
