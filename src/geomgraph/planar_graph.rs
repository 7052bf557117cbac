use crate::errors::BufferError;
use crate::float_types::Real;
use crate::geomgraph::{quadrant, Edge, Label, Location, Position};
use crate::algorithm::orientation;
use geo_types::Coord;
use hashbrown::HashMap;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct NodeId(pub usize);

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct EdgeId(pub usize);

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct DirectedEdgeId(pub usize);

/// A vertex of the arrangement, owning the (CCW-sorted) star of directed
/// edges that leave it.
#[derive(Debug)]
pub struct Node {
    pub coord: Coord<Real>,
    star: Vec<DirectedEdgeId>,
    pub visited: bool,
}

/// One direction of an [`Edge`]. Carries the state the buffer pipeline
/// computes: side depths, result membership, and the ring-linking pointers.
#[derive(Debug)]
pub struct DirectedEdge {
    pub edge: EdgeId,
    pub is_forward: bool,
    origin: NodeId,
    pub sym: DirectedEdgeId,
    /// First two points in edge direction; define the departure angle.
    p0: Coord<Real>,
    p1: Coord<Real>,
    quadrant: i32,
    pub visited: bool,
    pub in_result: bool,
    depth: [Option<i32>; 2],
    /// Next in-result edge around the maximal ring.
    pub next: Option<DirectedEdgeId>,
    /// Next edge around the minimal ring.
    pub next_min: Option<DirectedEdgeId>,
    pub edge_ring: Option<usize>,
    pub min_edge_ring: Option<usize>,
}

/// The planar arrangement: nodes interned by coordinate, directed-edge pairs
/// per edge, stars ordered counter-clockwise by departure angle.
#[derive(Debug, Default)]
pub struct PlanarGraph {
    edges: Vec<Edge>,
    nodes: Vec<Node>,
    dir_edges: Vec<DirectedEdge>,
    node_map: HashMap<(u64, u64), NodeId>,
}

impl PlanarGraph {
    /// Build the graph from the merged edge list, creating a directed-edge
    /// pair per edge and sorting every node star.
    pub fn new(edges: Vec<Edge>) -> Self {
        let mut graph = PlanarGraph::default();
        for edge in edges {
            graph.add_edge(edge);
        }
        graph.sort_stars();
        graph
    }

    fn add_edge(&mut self, edge: Edge) {
        let pts = edge.coords();
        let n = pts.len();
        debug_assert!(n >= 2);
        let start = self.intern_node(pts[0]);
        let end = self.intern_node(pts[n - 1]);
        let (fwd_p0, fwd_p1) = (pts[0], pts[1]);
        let (bwd_p0, bwd_p1) = (pts[n - 1], pts[n - 2]);

        let edge_id = EdgeId(self.edges.len());
        self.edges.push(edge);

        let fwd_id = DirectedEdgeId(self.dir_edges.len());
        let bwd_id = DirectedEdgeId(self.dir_edges.len() + 1);
        self.dir_edges.push(DirectedEdge {
            edge: edge_id,
            is_forward: true,
            origin: start,
            sym: bwd_id,
            p0: fwd_p0,
            p1: fwd_p1,
            quadrant: quadrant::quadrant(fwd_p1.x - fwd_p0.x, fwd_p1.y - fwd_p0.y),
            visited: false,
            in_result: false,
            depth: [None; 2],
            next: None,
            next_min: None,
            edge_ring: None,
            min_edge_ring: None,
        });
        self.dir_edges.push(DirectedEdge {
            edge: edge_id,
            is_forward: false,
            origin: end,
            sym: fwd_id,
            p0: bwd_p0,
            p1: bwd_p1,
            quadrant: quadrant::quadrant(bwd_p1.x - bwd_p0.x, bwd_p1.y - bwd_p0.y),
            visited: false,
            in_result: false,
            depth: [None; 2],
            next: None,
            next_min: None,
            edge_ring: None,
            min_edge_ring: None,
        });
        self.nodes[start.0].star.push(fwd_id);
        self.nodes[end.0].star.push(bwd_id);
    }

    fn intern_node(&mut self, coord: Coord<Real>) -> NodeId {
        let key = (coord.x.to_bits(), coord.y.to_bits());
        if let Some(&id) = self.node_map.get(&key) {
            return id;
        }
        let id = NodeId(self.nodes.len());
        self.nodes.push(Node {
            coord,
            star: Vec::new(),
            visited: false,
        });
        self.node_map.insert(key, id);
        id
    }

    fn sort_stars(&mut self) {
        // sort each star CCW by (quadrant, robust orientation)
        let dir_edges = &self.dir_edges;
        for node in &mut self.nodes {
            node.star.sort_by(|&a, &b| {
                let ea = &dir_edges[a.0];
                let eb = &dir_edges[b.0];
                compare_direction(ea, eb)
            });
        }
    }

    pub fn num_nodes(&self) -> usize {
        self.nodes.len()
    }

    pub fn node_ids(&self) -> impl Iterator<Item = NodeId> {
        (0..self.nodes.len()).map(NodeId)
    }

    pub fn node(&self, id: NodeId) -> &Node {
        &self.nodes[id.0]
    }

    pub fn node_mut(&mut self, id: NodeId) -> &mut Node {
        &mut self.nodes[id.0]
    }

    pub fn coord(&self, id: NodeId) -> Coord<Real> {
        self.nodes[id.0].coord
    }

    /// Outgoing directed edges at `node`, in CCW order.
    pub fn star(&self, node: NodeId) -> &[DirectedEdgeId] {
        &self.nodes[node.0].star
    }

    pub fn num_dir_edges(&self) -> usize {
        self.dir_edges.len()
    }

    pub fn dir_edge_ids(&self) -> impl Iterator<Item = DirectedEdgeId> {
        (0..self.dir_edges.len()).map(DirectedEdgeId)
    }

    pub fn dir_edge(&self, id: DirectedEdgeId) -> &DirectedEdge {
        &self.dir_edges[id.0]
    }

    pub fn dir_edge_mut(&mut self, id: DirectedEdgeId) -> &mut DirectedEdge {
        &mut self.dir_edges[id.0]
    }

    pub fn origin(&self, de: DirectedEdgeId) -> NodeId {
        self.dir_edges[de.0].origin
    }

    pub fn origin_coord(&self, de: DirectedEdgeId) -> Coord<Real> {
        self.coord(self.dir_edges[de.0].origin)
    }

    pub fn sym(&self, de: DirectedEdgeId) -> DirectedEdgeId {
        self.dir_edges[de.0].sym
    }

    pub fn edge(&self, id: EdgeId) -> &Edge {
        &self.edges[id.0]
    }

    pub fn edge_of(&self, de: DirectedEdgeId) -> &Edge {
        &self.edges[self.dir_edges[de.0].edge.0]
    }

    pub fn label_of(&self, de: DirectedEdgeId) -> &Label {
        self.edge_of(de).label()
    }

    /// Coordinates of the directed edge, in traversal order.
    pub fn dir_edge_coords(&self, de: DirectedEdgeId) -> Vec<Coord<Real>> {
        let d = &self.dir_edges[de.0];
        let pts = self.edges[d.edge.0].coords();
        if d.is_forward {
            pts.to_vec()
        } else {
            pts.iter().rev().copied().collect()
        }
    }

    pub fn depth(&self, de: DirectedEdgeId, pos: Position) -> Option<i32> {
        self.dir_edges[de.0].depth[pos.side_index()]
    }

    /// Assign a side depth. A second assignment with a different value means
    /// the arrangement is inconsistent.
    pub fn set_depth(
        &mut self,
        de: DirectedEdgeId,
        pos: Position,
        depth: i32,
    ) -> Result<(), BufferError> {
        let origin = self.origin_coord(de);
        let slot = &mut self.dir_edges[de.0].depth[pos.side_index()];
        match *slot {
            Some(existing) if existing != depth => Err(BufferError::topology_at(
                "assigned depths do not match",
                origin,
            )),
            _ => {
                *slot = Some(depth);
                Ok(())
            }
        }
    }

    /// Set the depth on one side and derive the other side from the edge's
    /// depth delta (negated for the backward direction).
    pub fn set_edge_depths(
        &mut self,
        de: DirectedEdgeId,
        pos: Position,
        depth: i32,
    ) -> Result<(), BufferError> {
        let d = &self.dir_edges[de.0];
        let mut depth_delta = self.edges[d.edge.0].depth_delta();
        if !d.is_forward {
            depth_delta = -depth_delta;
        }
        let direction_factor = if pos == Position::Left { -1 } else { 1 };
        let opposite = pos.opposite();
        let opposite_depth = depth + depth_delta * direction_factor;
        self.set_depth(de, pos, depth)?;
        self.set_depth(de, opposite, opposite_depth)
    }

    /// Mirror the depths of `de` onto its sym (left <-> right).
    pub fn copy_sym_depths(&mut self, de: DirectedEdgeId) -> Result<(), BufferError> {
        let sym = self.sym(de);
        let left = self.depth(de, Position::Left);
        let right = self.depth(de, Position::Right);
        if let Some(right) = right {
            self.set_depth(sym, Position::Left, right)?;
        }
        if let Some(left) = left {
            self.set_depth(sym, Position::Right, left)?;
        }
        Ok(())
    }

    /// Propagate depths around the star of `de`'s origin node, starting from
    /// `de`'s known depths. Consistency is checked when the propagation wraps
    /// around to the start.
    pub fn compute_depths_around_node(&mut self, de: DirectedEdgeId) -> Result<(), BufferError> {
        let node = self.origin(de);
        let star: Vec<DirectedEdgeId> = self.nodes[node.0].star.clone();
        let edge_index = star
            .iter()
            .position(|&d| d == de)
            .expect("directed edge missing from its origin star");

        let origin = self.origin_coord(de);
        let start_depth = self.depth(de, Position::Left).ok_or_else(|| {
            BufferError::topology_at("starting edge has no assigned depth", origin)
        })?;
        let target_last_depth = self.depth(de, Position::Right).ok_or_else(|| {
            BufferError::topology_at("starting edge has no assigned depth", origin)
        })?;

        let next_depth = self.compute_depths_range(&star, edge_index + 1, star.len(), start_depth)?;
        let last_depth = self.compute_depths_range(&star, 0, edge_index, next_depth)?;
        if last_depth != target_last_depth {
            return Err(BufferError::topology_at("depth mismatch", origin));
        }
        Ok(())
    }

    fn compute_depths_range(
        &mut self,
        star: &[DirectedEdgeId],
        start: usize,
        end: usize,
        start_depth: i32,
    ) -> Result<i32, BufferError> {
        let mut curr_depth = start_depth;
        for &next_de in &star[start..end] {
            self.set_edge_depths(next_de, Position::Right, curr_depth)?;
            curr_depth = self
                .depth(next_de, Position::Left)
                .expect("set_edge_depths assigns both sides");
        }
        Ok(curr_depth)
    }

    /// True when every parent geometry labels both sides of the edge as
    /// interior - such edges lie wholly inside the result area.
    pub fn is_interior_area_edge(&self, de: DirectedEdgeId) -> bool {
        let label = self.label_of(de);
        (0..2).all(|i| {
            label.is_area(i)
                && label.location(i, Position::Left) == Location::Interior
                && label.location(i, Position::Right) == Location::Interior
        })
    }

    /// The edge of the star whose departure direction is closest to straight
    /// down, i.e. the edge incident to the rightmost-bottommost excursion.
    /// Only meaningful at the node of a rightmost coordinate, where no edge
    /// can leave to the right of vertical.
    pub fn rightmost_edge_of_star(&self, node: NodeId) -> DirectedEdgeId {
        let star = &self.nodes[node.0].star;
        debug_assert!(!star.is_empty());
        let de0 = star[0];
        if star.len() == 1 {
            return de0;
        }
        let de_last = star[star.len() - 1];
        let quad0 = self.dir_edges[de0.0].quadrant;
        let quad1 = self.dir_edges[de_last.0].quadrant;
        if quadrant::is_northern(quad0) && quadrant::is_northern(quad1) {
            de0
        } else if !quadrant::is_northern(quad0) && !quadrant::is_northern(quad1) {
            de_last
        } else {
            // the edges are in different hemispheres; pick a non-horizontal one
            let dy0 = self.dir_edges[de0.0].p1.y - self.dir_edges[de0.0].p0.y;
            if dy0 != 0.0 {
                de0
            } else {
                de_last
            }
        }
    }

    /// Link the in-result directed edges around `node` into rings: each
    /// incoming result edge points to the next outgoing result edge in CCW
    /// order.
    pub fn link_result_directed_edges(&mut self, node: NodeId) -> Result<(), BufferError> {
        let star = self.result_area_star(node);

        let mut first_out: Option<DirectedEdgeId> = None;
        let mut incoming: Option<DirectedEdgeId> = None;
        let mut linking_to_outgoing = false;

        for &next_out in &star {
            let next_in = self.sym(next_out);
            if !self.label_of(next_out).is_any_area() {
                continue;
            }
            if first_out.is_none() && self.dir_edges[next_out.0].in_result {
                first_out = Some(next_out);
            }
            if !linking_to_outgoing {
                if !self.dir_edges[next_in.0].in_result {
                    continue;
                }
                incoming = Some(next_in);
                linking_to_outgoing = true;
            } else {
                if !self.dir_edges[next_out.0].in_result {
                    continue;
                }
                self.dir_edges[incoming.unwrap().0].next = Some(next_out);
                linking_to_outgoing = false;
            }
        }
        if linking_to_outgoing {
            let coord = self.coord(node);
            let first_out = first_out
                .ok_or_else(|| BufferError::topology_at("no outgoing dirEdge found", coord))?;
            debug_assert!(self.dir_edges[first_out.0].in_result);
            self.dir_edges[incoming.unwrap().0].next = Some(first_out);
        }
        Ok(())
    }

    /// Link edges of one maximal ring into minimal rings: same state machine
    /// as [`Self::link_result_directed_edges`], but walking the star
    /// clockwise and only considering edges of ring `er`.
    pub fn link_minimal_directed_edges(&mut self, node: NodeId, er: usize) -> Result<(), BufferError> {
        let star = self.result_area_star(node);

        let mut first_out: Option<DirectedEdgeId> = None;
        let mut incoming: Option<DirectedEdgeId> = None;
        let mut linking_to_outgoing = false;

        for &next_out in star.iter().rev() {
            let next_in = self.sym(next_out);
            if first_out.is_none() && self.dir_edges[next_out.0].edge_ring == Some(er) {
                first_out = Some(next_out);
            }
            if !linking_to_outgoing {
                if self.dir_edges[next_in.0].edge_ring != Some(er) {
                    continue;
                }
                incoming = Some(next_in);
                linking_to_outgoing = true;
            } else {
                if self.dir_edges[next_out.0].edge_ring != Some(er) {
                    continue;
                }
                self.dir_edges[incoming.unwrap().0].next_min = Some(next_out);
                linking_to_outgoing = false;
            }
        }
        if linking_to_outgoing {
            let coord = self.coord(node);
            let first_out = first_out.ok_or_else(|| {
                BufferError::topology_at("unable to link last incoming dirEdge", coord)
            })?;
            self.dir_edges[incoming.unwrap().0].next_min = Some(first_out);
        }
        Ok(())
    }

    /// The star filtered to edges taking part in the result area (either
    /// direction in-result), preserving CCW order.
    fn result_area_star(&self, node: NodeId) -> Vec<DirectedEdgeId> {
        self.nodes[node.0]
            .star
            .iter()
            .copied()
            .filter(|&de| {
                self.dir_edges[de.0].in_result || self.dir_edges[self.sym(de).0].in_result
            })
            .collect()
    }
}

/// CCW comparison of departure directions: quadrant first, then the robust
/// orientation of one direction point against the other edge.
fn compare_direction(a: &DirectedEdge, b: &DirectedEdge) -> std::cmp::Ordering {
    use std::cmp::Ordering;
    let dxa = a.p1.x - a.p0.x;
    let dya = a.p1.y - a.p0.y;
    let dxb = b.p1.x - b.p0.x;
    let dyb = b.p1.y - b.p0.y;
    if dxa == dxb && dya == dyb {
        return Ordering::Equal;
    }
    match a.quadrant.cmp(&b.quadrant) {
        Ordering::Equal => {
            // same quadrant: a is greater if it is CCW of b
            match orientation::index(b.p0, b.p1, a.p1) {
                orientation::COUNTERCLOCKWISE => Ordering::Greater,
                orientation::CLOCKWISE => Ordering::Less,
                _ => Ordering::Equal,
            }
        }
        other => other,
    }
}
