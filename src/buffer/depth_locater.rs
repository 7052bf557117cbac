//! Depth location: what is the buffer depth of a point, given the subgraphs
//! already processed?

use crate::buffer::subgraph::BufferSubgraph;
use crate::float_types::Real;
use crate::geom::LineSegment;
use crate::geomgraph::{PlanarGraph, Position};
use geo_types::Coord;

/// Locates the depth of a point relative to a set of processed subgraphs by
/// stabbing: collect every upward segment crossed by a horizontal ray from
/// the point, and read the depth off the nearest one.
pub struct SubgraphDepthLocater<'a> {
    subgraphs: &'a [BufferSubgraph],
    graph: &'a PlanarGraph,
}

/// An upward-oriented segment with the depth of the region to its left.
#[derive(Clone, Debug)]
struct DepthSegment {
    upward_seg: LineSegment,
    left_depth: i32,
}

impl<'a> SubgraphDepthLocater<'a> {
    pub fn new(subgraphs: &'a [BufferSubgraph], graph: &'a PlanarGraph) -> Self {
        Self { subgraphs, graph }
    }

    pub fn depth(&self, p: Coord<Real>) -> i32 {
        let stabbed = self.find_stabbed_segments(p);
        if stabbed.is_empty() {
            return 0;
        }
        stabbed
            .iter()
            .min_by(|a, b| compare_depth_segments(a, b))
            .map(|ds| ds.left_depth)
            .unwrap_or(0)
    }

    /// All segments of the processed subgraphs stabbed by the leftward
    /// horizontal ray from `p`.
    fn find_stabbed_segments(&self, stabbing_ray_left_pt: Coord<Real>) -> Vec<DepthSegment> {
        let mut stabbed = Vec::new();
        for sg in self.subgraphs {
            // short-circuit subgraphs the ray cannot touch
            let env = sg.envelope();
            if stabbing_ray_left_pt.y < env.min_y() || stabbing_ray_left_pt.y > env.max_y() {
                continue;
            }
            for &de in sg.dir_edges() {
                if !self.graph.dir_edge(de).is_forward {
                    continue;
                }
                self.find_stabbed_segments_of_edge(stabbing_ray_left_pt, de, &mut stabbed);
            }
        }
        stabbed
    }

    fn find_stabbed_segments_of_edge(
        &self,
        stabbing_ray_left_pt: Coord<Real>,
        de: crate::geomgraph::DirectedEdgeId,
        stabbed: &mut Vec<DepthSegment>,
    ) {
        let pts = self.graph.edge_of(de).coords();
        for i in 0..pts.len() - 1 {
            let mut seg = LineSegment::new(pts[i], pts[i + 1]);
            // ensure segment always points upwards
            if seg.p0.y > seg.p1.y {
                seg.reverse();
            }
            // skip segment if it is left of the stabbing line
            let maxx = seg.p0.x.max(seg.p1.x);
            if maxx < stabbing_ray_left_pt.x {
                continue;
            }
            // skip horizontal segments (there will be a non-horizontal one
            // carrying the same depth)
            if seg.is_horizontal() {
                continue;
            }
            // skip if segment is above or below the stabbing line
            if stabbing_ray_left_pt.y < seg.p0.y || stabbing_ray_left_pt.y > seg.p1.y {
                continue;
            }
            // skip if stabbing ray is right of the segment
            if seg.orientation_index_of(stabbing_ray_left_pt)
                == crate::algorithm::orientation::CLOCKWISE
            {
                continue;
            }
            // the left depth is the side depth of the edge in upward
            // orientation
            let mut depth = self.graph.depth(de, Position::Left).unwrap_or(0);
            if seg.p0 != pts[i] {
                depth = self.graph.depth(de, Position::Right).unwrap_or(0);
            }
            stabbed.push(DepthSegment {
                upward_seg: seg,
                left_depth: depth,
            });
        }
    }
}

/// Which upward segment lies further to the left (i.e. is stabbed first)?
///
/// The segments are known to share a stabbing y, so orientation tests give a
/// total order except when they touch, where lexicographic ordering breaks
/// the tie.
fn compare_depth_segments(a: &DepthSegment, b: &DepthSegment) -> std::cmp::Ordering {
    use std::cmp::Ordering;
    // fast check for segments trivially ordered along x
    if a.upward_seg.min_x() >= b.upward_seg.max_x() {
        return Ordering::Greater;
    }
    if a.upward_seg.max_x() <= b.upward_seg.min_x() {
        return Ordering::Less;
    }
    let orient_index = a.upward_seg.orientation_index(&b.upward_seg);
    if orient_index != 0 {
        return if orient_index > 0 {
            Ordering::Greater
        } else {
            Ordering::Less
        };
    }
    let orient_index = -b.upward_seg.orientation_index(&a.upward_seg);
    if orient_index != 0 {
        return if orient_index > 0 {
            Ordering::Greater
        } else {
            Ordering::Less
        };
    }
    a.upward_seg.compare(&b.upward_seg)
}
