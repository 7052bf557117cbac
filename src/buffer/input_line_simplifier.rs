//! Pre-offset input simplification.
//!
//! Vertices of concave detail smaller than the simplification tolerance are
//! dropped before offsetting: the offset curve cannot resolve them anyway,
//! and removing them avoids pathological join geometry. Which side counts as
//! concave is selected by the sign of the tolerance, so the left and right
//! offset passes each simplify their own side.

use crate::algorithm::orientation::{self, CLOCKWISE, COUNTERCLOCKWISE};
use crate::float_types::Real;
use crate::geom::line_segment::point_to_segment;
use geo_types::Coord;

const NUM_PTS_TO_CHECK: usize = 10;

pub fn simplify(input_line: &[Coord<Real>], distance_tol: Real) -> Vec<Coord<Real>> {
    InputLineSimplifier::new(input_line).simplify(distance_tol)
}

struct InputLineSimplifier<'a> {
    input_line: &'a [Coord<Real>],
    is_deleted: Vec<bool>,
    angle_orientation: i32,
    distance_tol: Real,
}

impl<'a> InputLineSimplifier<'a> {
    fn new(input_line: &'a [Coord<Real>]) -> Self {
        Self {
            input_line,
            is_deleted: vec![false; input_line.len()],
            angle_orientation: COUNTERCLOCKWISE,
            distance_tol: 0.0,
        }
    }

    fn simplify(mut self, distance_tol: Real) -> Vec<Coord<Real>> {
        self.distance_tol = distance_tol.abs();
        self.angle_orientation = if distance_tol < 0.0 {
            CLOCKWISE
        } else {
            COUNTERCLOCKWISE
        };

        while self.delete_shallow_concavities() {}

        self.input_line
            .iter()
            .zip(self.is_deleted.iter())
            .filter(|(_, &deleted)| !deleted)
            .map(|(&p, _)| p)
            .collect()
    }

    /// One deletion sweep; returns whether anything was removed.
    fn delete_shallow_concavities(&mut self) -> bool {
        let mut index = 1;
        let mut mid_index = self.find_next_non_deleted_index(index);
        let mut last_index = self.find_next_non_deleted_index(mid_index);

        let mut is_changed = false;
        while last_index < self.input_line.len() {
            let mut is_middle_vertex_deleted = false;
            if self.is_deletable(index, mid_index, last_index) {
                self.is_deleted[mid_index] = true;
                is_middle_vertex_deleted = true;
                is_changed = true;
            }
            index = if is_middle_vertex_deleted {
                last_index
            } else {
                mid_index
            };
            mid_index = self.find_next_non_deleted_index(index);
            last_index = self.find_next_non_deleted_index(mid_index);
        }
        is_changed
    }

    fn find_next_non_deleted_index(&self, index: usize) -> usize {
        let mut next = index + 1;
        while next < self.input_line.len() && self.is_deleted[next] {
            next += 1;
        }
        next
    }

    fn is_deletable(&self, i0: usize, i1: usize, i2: usize) -> bool {
        let p0 = self.input_line[i0];
        let p1 = self.input_line[i1];
        let p2 = self.input_line[i2];
        if !self.is_concave(p0, p1, p2) {
            return false;
        }
        if !self.is_shallow(p0, p1, p2) {
            return false;
        }
        self.is_shallow_sampled(p0, p2, i0, i2)
    }

    fn is_concave(&self, p0: Coord<Real>, p1: Coord<Real>, p2: Coord<Real>) -> bool {
        orientation::index(p0, p1, p2) == self.angle_orientation
    }

    fn is_shallow(&self, p0: Coord<Real>, p1: Coord<Real>, p2: Coord<Real>) -> bool {
        point_to_segment(p1, p0, p2) < self.distance_tol
    }

    /// For long stretches, spot-check interior points so a deep excursion
    /// between the endpoints is not flattened away.
    fn is_shallow_sampled(&self, p0: Coord<Real>, p2: Coord<Real>, i0: usize, i2: usize) -> bool {
        let mut inc = (i2 - i0) / NUM_PTS_TO_CHECK;
        if inc == 0 {
            inc = 1;
        }
        let mut i = i0;
        while i < i2 {
            if !self.is_shallow(p0, self.input_line[i], p2) {
                return false;
            }
            i += inc;
        }
        true
    }
}
