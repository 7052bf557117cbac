//! Turns an input geometry into the set of labeled raw offset curves that
//! seed the buffer pipeline.

use crate::buffer::offset_curve_builder::OffsetCurveBuilder;
use crate::buffer::params::BufferParams;
use crate::float_types::Real;
use crate::geom::line_segment::point_to_segment;
use crate::geom::{self, Envelope, PrecisionModel};
use crate::geomgraph::{Label, Location, Position};
use crate::noding::NodedSegmentString;
use crate::algorithm::orientation;
use geo_types::{Coord, Geometry, LineString, Polygon};

/// A ring needs at least this many points (first == last) to have interior.
const MINIMUM_VALID_RING_SIZE: usize = 4;

/// Heuristic bounds for detecting a ring curve that has inverted completely
/// under a negative offset.
const MAX_INVERTED_RING_SIZE: usize = 9;
const INVERTED_CURVE_VERTEX_FACTOR: usize = 4;
const NEARNESS_FACTOR: Real = 0.99;

pub struct CurveSetBuilder<'a> {
    input: &'a Geometry<Real>,
    distance: Real,
    curve_builder: OffsetCurveBuilder,
    curves: Vec<NodedSegmentString>,
    invert_orientation: bool,
}

impl<'a> CurveSetBuilder<'a> {
    pub fn new(
        input: &'a Geometry<Real>,
        distance: Real,
        precision_model: PrecisionModel,
        params: BufferParams,
    ) -> Self {
        Self {
            input,
            distance,
            curve_builder: OffsetCurveBuilder::new(precision_model, params),
            curves: Vec::new(),
            invert_orientation: false,
        }
    }

    /// Inverted-orientation inputs (e.g. shells fed in CW-as-CCW) flip the
    /// ring orientation test.
    pub fn set_invert_orientation(&mut self, invert_orientation: bool) {
        self.invert_orientation = invert_orientation;
    }

    /// Compute the labeled raw curves for the whole input.
    pub fn curves(mut self) -> Vec<NodedSegmentString> {
        let input = self.input;
        self.add_geometry(input);
        self.curves
    }

    fn add_geometry(&mut self, g: &Geometry<Real>) {
        match g {
            Geometry::Point(p) => self.add_point(p.0),
            Geometry::MultiPoint(mp) => {
                for p in &mp.0 {
                    self.add_point(p.0);
                }
            }
            Geometry::Line(l) => {
                self.add_line_string(&LineString::from(vec![l.start, l.end]));
            }
            Geometry::LineString(line) => self.add_line_string(line),
            Geometry::MultiLineString(mls) => {
                for line in &mls.0 {
                    self.add_line_string(line);
                }
            }
            Geometry::Polygon(poly) => self.add_polygon(poly),
            Geometry::MultiPolygon(mp) => {
                for poly in &mp.0 {
                    self.add_polygon(poly);
                }
            }
            Geometry::Rect(rect) => self.add_polygon(&rect.to_polygon()),
            Geometry::Triangle(tri) => self.add_polygon(&tri.to_polygon()),
            Geometry::GeometryCollection(gc) => {
                for sub in &gc.0 {
                    self.add_geometry(sub);
                }
            }
        }
    }

    fn add_point(&mut self, pt: Coord<Real>) {
        // a zero or negative width buffer of a point is empty
        if self.distance <= 0.0 {
            return;
        }
        let curve = self.curve_builder.line_curve(&[pt], self.distance);
        self.add_curve(curve, Location::Exterior, Location::Interior);
    }

    fn add_line_string(&mut self, line: &LineString<Real>) {
        if self.curve_builder.is_line_offset_empty(self.distance) {
            return;
        }
        let coord = geom::remove_repeated_points(&line.0);
        if coord.is_empty() {
            return;
        }
        // Closed lines are offset as rings, side by side, which produces
        // better linework than wrapping end arcs around almost-parallel end
        // segments. Single-sided buffers treat rings as ordinary lines.
        if is_ring(&coord) && !self.curve_builder.buffer_parameters().single_sided {
            self.add_ring_both_sides(&coord, self.distance);
        } else {
            let curve = self.curve_builder.line_curve(&coord, self.distance);
            self.add_curve(curve, Location::Exterior, Location::Interior);
        }
    }

    fn add_polygon(&mut self, p: &Polygon<Real>) {
        let mut offset_distance = self.distance;
        let mut offset_side = Position::Left;
        if self.distance < 0.0 {
            offset_distance = -self.distance;
            offset_side = Position::Right;
        }

        let shell_coord = geom::remove_repeated_points(&p.exterior().0);
        if shell_coord.is_empty() {
            return;
        }
        // optimization: a polygon completely eroded by a negative buffer
        // contributes nothing
        if self.distance < 0.0 && is_eroded_completely(&shell_coord, self.distance) {
            return;
        }
        // don't attempt to buffer a polygon with too few distinct vertices
        if self.distance <= 0.0 && shell_coord.len() < 3 {
            return;
        }
        self.add_polygon_ring(
            &shell_coord,
            offset_distance,
            offset_side,
            Location::Exterior,
            Location::Interior,
        );

        for hole in p.interiors() {
            let hole_coord = geom::remove_repeated_points(&hole.0);
            // a hole completely covered by a positive buffer contributes
            // nothing
            if self.distance > 0.0 && is_eroded_completely(&hole_coord, -self.distance) {
                continue;
            }
            // Holes are labeled opposite to the shell, since the polygon
            // interior lies on their opposite side.
            self.add_polygon_ring(
                &hole_coord,
                offset_distance,
                offset_side.opposite(),
                Location::Interior,
                Location::Exterior,
            );
        }
    }

    fn add_ring_both_sides(&mut self, coord: &[Coord<Real>], distance: Real) {
        self.add_polygon_ring(
            coord,
            distance,
            Position::Left,
            Location::Exterior,
            Location::Interior,
        );
        self.add_polygon_ring(
            coord,
            distance,
            Position::Right,
            Location::Interior,
            Location::Exterior,
        );
    }

    /// Offset one side of a ring, normalizing orientation: the `cw_*`
    /// locations describe the sides for a clockwise ring, and are swapped
    /// for a counter-clockwise one.
    fn add_polygon_ring(
        &mut self,
        coord: &[Coord<Real>],
        offset_distance: Real,
        side: Position,
        cw_left_loc: Location,
        cw_right_loc: Location,
    ) {
        // a "flat" ring will disappear in the output anyway
        if offset_distance == 0.0 && coord.len() < MINIMUM_VALID_RING_SIZE {
            return;
        }
        let mut left_loc = cw_left_loc;
        let mut right_loc = cw_right_loc;
        let mut side = side;
        if coord.len() >= MINIMUM_VALID_RING_SIZE && self.is_ring_ccw(coord) {
            left_loc = cw_right_loc;
            right_loc = cw_left_loc;
            side = side.opposite();
        }
        let curve = self.curve_builder.ring_curve(coord, side, offset_distance);
        if let Some(curve_pts) = &curve {
            // a completely inverted curve would leave an artifact ring
            if is_ring_curve_inverted(coord, offset_distance, curve_pts) {
                return;
            }
        }
        self.add_curve(curve, left_loc, right_loc);
    }

    fn is_ring_ccw(&self, coord: &[Coord<Real>]) -> bool {
        let is_ccw = orientation::is_ccw(coord);
        if self.invert_orientation {
            !is_ccw
        } else {
            is_ccw
        }
    }

    fn add_curve(&mut self, coord: Option<Vec<Coord<Real>>>, left_loc: Location, right_loc: Location) {
        let Some(coord) = coord else { return };
        if coord.len() < 2 {
            return;
        }
        let label = Label::new(0, Location::Boundary, left_loc, right_loc);
        self.curves.push(NodedSegmentString::new(coord, Some(label)));
    }
}

fn is_ring(coord: &[Coord<Real>]) -> bool {
    coord.len() >= MINIMUM_VALID_RING_SIZE && coord.first() == coord.last()
}

/// Does a negative offset of `buffer_distance` erode the ring to nothing?
fn is_eroded_completely(ring_coord: &[Coord<Real>], buffer_distance: Real) -> bool {
    // degenerate ring has no area
    if ring_coord.len() < 4 {
        return buffer_distance < 0.0;
    }
    // triangles get an exact test, which also eliminates inverted triangles
    if ring_coord.len() == 4 {
        return is_triangle_eroded_completely(ring_coord, buffer_distance);
    }
    // if the envelope is narrower than twice the buffer distance the ring
    // must be eroded
    let env = Envelope::of_coords(ring_coord);
    let env_min_dimension = env.height().min(env.width());
    buffer_distance < 0.0 && 2.0 * buffer_distance.abs() > env_min_dimension
}

fn is_triangle_eroded_completely(triangle_coord: &[Coord<Real>], buffer_distance: Real) -> bool {
    let (p0, p1, p2) = (triangle_coord[0], triangle_coord[1], triangle_coord[2]);
    let in_centre = triangle_in_centre(p0, p1, p2);
    let dist_to_centre = point_to_segment(in_centre, p0, p1);
    dist_to_centre < buffer_distance.abs()
}

/// The incentre: intersection of the angle bisectors, weighted by opposite
/// side lengths.
fn triangle_in_centre(p0: Coord<Real>, p1: Coord<Real>, p2: Coord<Real>) -> Coord<Real> {
    let len0 = geom::distance(p1, p2);
    let len1 = geom::distance(p0, p2);
    let len2 = geom::distance(p0, p1);
    let circum = len0 + len1 + len2;
    Coord {
        x: (len0 * p0.x + len1 * p1.x + len2 * p2.x) / circum,
        y: (len0 * p0.y + len1 * p1.y + len2 * p2.y) / circum,
    }
}

/// A small ring offset by nearly its own size can invert entirely; the
/// tell-tale is a curve no farther from the input than the offset distance.
fn is_ring_curve_inverted(
    input_pts: &[Coord<Real>],
    distance: Real,
    curve_pts: &[Coord<Real>],
) -> bool {
    if distance == 0.0 {
        return false;
    }
    // only proper rings can invert
    if input_pts.len() <= 3 {
        return false;
    }
    // heuristic: an inverted curve has no more points than the input
    if input_pts.len() >= MAX_INVERTED_RING_SIZE {
        return false;
    }
    if curve_pts.len() > INVERTED_CURVE_VERTEX_FACTOR * input_pts.len() {
        return false;
    }
    let dist_max = max_distance(curve_pts, input_pts);
    dist_max < NEARNESS_FACTOR * distance.abs()
}

/// Maximum over `pts1` of the distance to the segment string `pts2`.
fn max_distance(pts1: &[Coord<Real>], pts2: &[Coord<Real>]) -> Real {
    let mut max_distance: Real = 0.0;
    for &p in pts1 {
        let mut min_dist = Real::INFINITY;
        for seg in pts2.windows(2) {
            min_dist = min_dist.min(point_to_segment(p, seg[0], seg[1]));
        }
        if min_dist > max_distance {
            max_distance = min_dist;
        }
    }
    max_distance
}

#[cfg(test)]
mod tests {
    use super::*;
    use geo_types::{coord, polygon, Point};

    fn params() -> BufferParams {
        BufferParams::default()
    }

    #[test]
    fn point_curve_is_labeled_boundary() {
        let g = Geometry::Point(Point::new(0.0, 0.0));
        let builder = CurveSetBuilder::new(&g, 1.0, PrecisionModel::Floating, params());
        let curves = builder.curves();
        assert_eq!(curves.len(), 1);
        let label = curves[0].label().unwrap();
        assert_eq!(label.location(0, Position::On), Location::Boundary);
        assert_eq!(label.location(0, Position::Left), Location::Exterior);
        assert_eq!(label.location(0, Position::Right), Location::Interior);
    }

    #[test]
    fn negative_point_buffer_has_no_curves() {
        let g = Geometry::Point(Point::new(0.0, 0.0));
        let builder = CurveSetBuilder::new(&g, -1.0, PrecisionModel::Floating, params());
        assert!(builder.curves().is_empty());
    }

    #[test]
    fn fully_eroded_polygon_has_no_curves() {
        let g = Geometry::Polygon(polygon![
            (x: 0.0, y: 0.0),
            (x: 4.0, y: 0.0),
            (x: 4.0, y: 4.0),
            (x: 0.0, y: 4.0),
        ]);
        let builder = CurveSetBuilder::new(&g, -3.0, PrecisionModel::Floating, params());
        assert!(builder.curves().is_empty());
    }

    #[test]
    fn polygon_with_hole_yields_two_ring_curves() {
        let g = Geometry::Polygon(Polygon::new(
            LineString::from(vec![
                coord! { x: 0.0, y: 0.0 },
                coord! { x: 10.0, y: 0.0 },
                coord! { x: 10.0, y: 10.0 },
                coord! { x: 0.0, y: 10.0 },
                coord! { x: 0.0, y: 0.0 },
            ]),
            vec![LineString::from(vec![
                coord! { x: 4.0, y: 4.0 },
                coord! { x: 6.0, y: 4.0 },
                coord! { x: 6.0, y: 6.0 },
                coord! { x: 4.0, y: 6.0 },
                coord! { x: 4.0, y: 4.0 },
            ])],
        ));
        let builder = CurveSetBuilder::new(&g, 0.5, PrecisionModel::Floating, params());
        let curves = builder.curves();
        assert_eq!(curves.len(), 2);
    }
}
