use crate::float_types::Real;
use crate::geom;
use crate::geomgraph::Label;
use geo_types::Coord;

/// An intersection point registered on a segment string: the point itself
/// and the index of the segment it falls on (a point exactly on a vertex is
/// normalized to that vertex's index).
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SegmentNode {
    pub coord: Coord<Real>,
    pub segment_index: usize,
}

/// A polyline that accumulates intersection nodes and can split itself into
/// interaction-free substrings.
///
/// Owns its coordinates. The topology label rides along in a typed slot and
/// is inherited by every substring.
#[derive(Clone, Debug)]
pub struct NodedSegmentString {
    coords: Vec<Coord<Real>>,
    label: Option<Label>,
    nodes: Vec<SegmentNode>,
}

impl NodedSegmentString {
    pub fn new(coords: Vec<Coord<Real>>, label: Option<Label>) -> Self {
        Self {
            coords,
            label,
            nodes: Vec::new(),
        }
    }

    pub fn coords(&self) -> &[Coord<Real>] {
        &self.coords
    }

    pub fn into_coords(self) -> Vec<Coord<Real>> {
        self.coords
    }

    pub fn label(&self) -> Option<&Label> {
        self.label.as_ref()
    }

    pub fn size(&self) -> usize {
        self.coords.len()
    }

    pub fn is_closed(&self) -> bool {
        self.coords.first() == self.coords.last()
    }

    /// Register an intersection point lying on segment `segment_index`.
    /// A point equal to the segment's end vertex is normalized onto the next
    /// segment index so vertex nodes are canonical.
    pub fn add_intersection(&mut self, int_pt: Coord<Real>, segment_index: usize) {
        let mut normalized_index = segment_index;
        if let Some(&next_pt) = self.coords.get(segment_index + 1) {
            if int_pt == next_pt {
                normalized_index = segment_index + 1;
            }
        }
        self.nodes.push(SegmentNode {
            coord: int_pt,
            segment_index: normalized_index,
        });
    }

    /// Split every string at its registered nodes and collect the substrings.
    pub fn noded_substrings(strings: Vec<NodedSegmentString>) -> Vec<NodedSegmentString> {
        let mut out = Vec::new();
        for ss in strings {
            ss.add_split_edges(&mut out);
        }
        out
    }

    fn add_split_edges(mut self, out: &mut Vec<NodedSegmentString>) {
        if self.coords.len() < 2 {
            return;
        }
        let max_index = self.coords.len() - 1;
        // the endpoints are always nodes
        self.nodes.push(SegmentNode {
            coord: self.coords[0],
            segment_index: 0,
        });
        self.nodes.push(SegmentNode {
            coord: self.coords[max_index],
            segment_index: max_index,
        });

        let coords = &self.coords;
        self.nodes.sort_by(|a, b| {
            a.segment_index.cmp(&b.segment_index).then_with(|| {
                let da = geom::distance(a.coord, coords[a.segment_index]);
                let db = geom::distance(b.coord, coords[b.segment_index]);
                da.total_cmp(&db)
            })
        });
        self.nodes
            .dedup_by(|a, b| a.segment_index == b.segment_index && a.coord == b.coord);

        for window in self.nodes.windows(2) {
            let (ei0, ei1) = (window[0], window[1]);
            let pts = self.split_edge_coords(ei0, ei1);
            if pts.len() >= 2 {
                out.push(NodedSegmentString::new(pts, self.label));
            }
        }
    }

    fn split_edge_coords(&self, ei0: SegmentNode, ei1: SegmentNode) -> Vec<Coord<Real>> {
        // the end node is only emitted when it is not the start vertex of its
        // own segment (i.e. it is an interior point)
        let last_seg_start = self.coords[ei1.segment_index];
        let use_int_pt1 = ei1.coord != last_seg_start;

        let mut pts = Vec::with_capacity(ei1.segment_index - ei0.segment_index + 2);
        pts.push(ei0.coord);
        pts.extend_from_slice(&self.coords[ei0.segment_index + 1..=ei1.segment_index]);
        if use_int_pt1 {
            pts.push(ei1.coord);
        }
        pts
    }
}
