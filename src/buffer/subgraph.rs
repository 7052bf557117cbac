//! Connected subgraphs of the buffer arrangement, with depth computation.

use crate::errors::BufferError;
use crate::float_types::Real;
use crate::geom::Envelope;
use crate::algorithm::orientation::{self, COUNTERCLOCKWISE};
use crate::geomgraph::{DirectedEdgeId, NodeId, PlanarGraph, Position};
use geo_types::Coord;
use hashbrown::HashSet;
use std::collections::VecDeque;

/// A connected component of the buffer arrangement: its nodes, its directed
/// edges, its envelope, and the rightmost coordinate that anchors depth
/// location.
#[derive(Debug)]
pub struct BufferSubgraph {
    dir_edges: Vec<DirectedEdgeId>,
    nodes: Vec<NodeId>,
    rightmost: RightmostEdgeFinder,
    env: Envelope,
}

impl BufferSubgraph {
    /// Collect the component reachable from `start`, marking nodes visited
    /// in the graph, and locate its rightmost coordinate.
    pub fn create(graph: &mut PlanarGraph, start: NodeId) -> Self {
        let mut sg = BufferSubgraph {
            dir_edges: Vec::new(),
            nodes: Vec::new(),
            rightmost: RightmostEdgeFinder::default(),
            env: Envelope::new(),
        };
        sg.add_reachable(graph, start);
        sg.rightmost.find_edge(graph, &sg.dir_edges);
        for &de in &sg.dir_edges {
            for pt in graph.dir_edge_coords(de) {
                sg.env.expand_to_include(pt);
            }
        }
        sg
    }

    pub fn dir_edges(&self) -> &[DirectedEdgeId] {
        &self.dir_edges
    }

    pub fn nodes(&self) -> &[NodeId] {
        &self.nodes
    }

    pub fn envelope(&self) -> &Envelope {
        &self.env
    }

    pub fn rightmost_coordinate(&self) -> Coord<Real> {
        self.rightmost
            .coordinate()
            .expect("subgraph has no rightmost coordinate")
    }

    fn add_reachable(&mut self, graph: &mut PlanarGraph, start: NodeId) {
        let mut stack = vec![start];
        while let Some(node) = stack.pop() {
            if graph.node(node).visited {
                continue;
            }
            graph.node_mut(node).visited = true;
            self.nodes.push(node);
            let star = graph.star(node).to_vec();
            for &de in &star {
                self.dir_edges.push(de);
                let sym_node = graph.origin(graph.sym(de));
                if !graph.node(sym_node).visited {
                    stack.push(sym_node);
                }
            }
        }
    }

    /// Propagate depths through the subgraph, seeding the rightmost edge
    /// with `outside_depth` on its right side.
    pub fn compute_depth(
        &mut self,
        graph: &mut PlanarGraph,
        outside_depth: i32,
    ) -> Result<(), BufferError> {
        self.clear_visited_edges(graph);
        let de = self.rightmost.oriented_edge();
        graph.set_edge_depths(de, Position::Right, outside_depth)?;
        graph.copy_sym_depths(de)?;
        self.compute_depths(graph, de)
    }

    fn clear_visited_edges(&self, graph: &mut PlanarGraph) {
        for &de in &self.dir_edges {
            graph.dir_edge_mut(de).visited = false;
        }
    }

    /// Breadth-first depth propagation across the subgraph's nodes.
    fn compute_depths(
        &self,
        graph: &mut PlanarGraph,
        start_edge: DirectedEdgeId,
    ) -> Result<(), BufferError> {
        let mut nodes_visited: HashSet<NodeId> = HashSet::new();
        let mut node_queue: VecDeque<NodeId> = VecDeque::new();

        let start_node = graph.origin(start_edge);
        node_queue.push_back(start_node);
        nodes_visited.insert(start_node);
        graph.dir_edge_mut(start_edge).visited = true;

        while let Some(n) = node_queue.pop_front() {
            // this node has at least one visited edge with assigned depths
            self.compute_node_depth(graph, n)?;

            let star = graph.star(n).to_vec();
            for &de in &star {
                graph.dir_edge_mut(de).visited = true;
                let sym = graph.sym(de);
                let adj_node = graph.origin(sym);
                if !nodes_visited.contains(&adj_node) {
                    node_queue.push_back(adj_node);
                    nodes_visited.insert(adj_node);
                }
            }
        }
        Ok(())
    }

    fn compute_node_depth(&self, graph: &mut PlanarGraph, n: NodeId) -> Result<(), BufferError> {
        // find a visited dirEdge to start at
        let mut start_edge = None;
        for &de in graph.star(n) {
            if graph.dir_edge(de).visited || graph.dir_edge(graph.sym(de)).visited {
                start_edge = Some(de);
                break;
            }
        }
        let start_edge = start_edge.ok_or_else(|| {
            BufferError::topology_at("unable to find edge to compute depths at", graph.coord(n))
        })?;

        graph.compute_depths_around_node(start_edge)?;

        let star = graph.star(n).to_vec();
        for &de in &star {
            graph.dir_edge_mut(de).visited = true;
            graph.copy_sym_depths(de)?;
        }
        Ok(())
    }

    /// Flag the directed edges bounding the buffer region: interior depth on
    /// the right, exterior (or unassigned) on the left.
    ///
    /// Rounding oddities can produce negative depths; those count as
    /// outside.
    pub fn find_result_edges(&self, graph: &mut PlanarGraph) {
        for &de in &self.dir_edges {
            let right = graph.depth(de, Position::Right);
            let left = graph.depth(de, Position::Left);
            let in_result = matches!(right, Some(r) if r >= 1)
                && left.is_none_or(|l| l <= 0)
                && !graph.is_interior_area_edge(de);
            if in_result {
                graph.dir_edge_mut(de).in_result = true;
            }
        }
    }
}

/// Finds the rightmost coordinate of a set of directed edges, and a directed
/// edge through it oriented so the subgraph's outside lies on its right.
#[derive(Debug, Default)]
struct RightmostEdgeFinder {
    min_index: Option<usize>,
    min_coord: Option<Coord<Real>>,
    min_de: Option<DirectedEdgeId>,
    oriented_de: Option<DirectedEdgeId>,
}

impl RightmostEdgeFinder {
    fn coordinate(&self) -> Option<Coord<Real>> {
        self.min_coord
    }

    fn oriented_edge(&self) -> DirectedEdgeId {
        self.oriented_de.expect("rightmost edge not found")
    }

    fn find_edge(&mut self, graph: &PlanarGraph, dir_edges: &[DirectedEdgeId]) {
        // Check all forward directed edges only; this is still general,
        // since each edge has a forward directed edge.
        for &de in dir_edges {
            if !graph.dir_edge(de).is_forward {
                continue;
            }
            self.check_for_rightmost_coordinate(graph, de);
        }
        let (Some(min_de), Some(min_index)) = (self.min_de, self.min_index) else {
            return;
        };

        // the rightmost point is either an interior vertex or the start of
        // an edge
        if min_index == 0 {
            self.find_rightmost_edge_at_node(graph);
        } else {
            self.find_rightmost_edge_at_vertex(graph);
        }

        let min_de = self.min_de.unwrap_or(min_de);
        self.oriented_de = Some(min_de);
        let rightmost_side = self.rightmost_side(graph, min_de, self.min_index.unwrap_or(min_index));
        if rightmost_side == Some(Position::Left) {
            self.oriented_de = Some(graph.sym(min_de));
        }
    }

    fn check_for_rightmost_coordinate(&mut self, graph: &PlanarGraph, de: DirectedEdgeId) {
        let coords = graph.edge_of(de).coords();
        // only check vertices which are the start point of a segment
        for (i, &pt) in coords.iter().enumerate().take(coords.len() - 1) {
            if self.min_coord.is_none() || pt.x > self.min_coord.unwrap().x {
                self.min_de = Some(de);
                self.min_index = Some(i);
                self.min_coord = Some(pt);
            }
        }
    }

    fn find_rightmost_edge_at_node(&mut self, graph: &PlanarGraph) {
        let min_de = self.min_de.unwrap();
        let node = graph.origin(min_de);
        let star_min = graph.rightmost_edge_of_star(node);
        // the star edge may be a backward direction; normalize to forward so
        // vertex indices keep referring to the underlying edge coordinates
        if graph.dir_edge(star_min).is_forward {
            self.min_de = Some(star_min);
            self.min_index = Some(0);
        } else {
            let fwd = graph.sym(star_min);
            self.min_de = Some(fwd);
            self.min_index = Some(graph.edge_of(fwd).num_points() - 1);
        }
    }

    fn find_rightmost_edge_at_vertex(&mut self, graph: &PlanarGraph) {
        // The rightmost point is an interior vertex, so it has segments on
        // either side. If these segments are both above or below the
        // rightmost point, we need to determine their relative orientation
        // to decide which is rightmost.
        let min_de = self.min_de.unwrap();
        let min_index = self.min_index.unwrap();
        let pts = graph.edge_of(min_de).coords();
        debug_assert!(min_index > 0 && min_index < pts.len() - 1);
        let min_coord = self.min_coord.unwrap();
        let p_prev = pts[min_index - 1];
        let p_next = pts[min_index + 1];
        let orientation = orientation::index(min_coord, p_next, p_prev);
        let mut use_prev = false;
        if p_prev.y < min_coord.y && p_next.y < min_coord.y && orientation == COUNTERCLOCKWISE {
            use_prev = true;
        }
        if use_prev {
            self.min_index = Some(min_index - 1);
        }
    }

    fn rightmost_side(
        &mut self,
        graph: &PlanarGraph,
        de: DirectedEdgeId,
        index: usize,
    ) -> Option<Position> {
        let side = rightmost_side_of_segment(graph, de, index as i64)
            .or_else(|| rightmost_side_of_segment(graph, de, index as i64 - 1));
        if side.is_none() {
            // the segment is horizontal; reset to the edge's own rightmost
            self.min_coord = None;
            self.check_for_rightmost_coordinate(graph, de);
        }
        side
    }
}

fn rightmost_side_of_segment(
    graph: &PlanarGraph,
    de: DirectedEdgeId,
    i: i64,
) -> Option<Position> {
    let coords = graph.edge_of(de).coords();
    if i < 0 || (i + 1) as usize >= coords.len() {
        return None;
    }
    let i = i as usize;
    if coords[i].y == coords[i + 1].y {
        // horizontal segment: neither side is rightmost
        return None;
    }
    if coords[i].y < coords[i + 1].y {
        Some(Position::Right)
    } else {
        Some(Position::Left)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geomgraph::{Edge, Label, Location};
    use geo_types::coord;

    fn cw_square_edge() -> Edge {
        // a clockwise square ring (buffer curves are traced CW, interior on
        // the right)
        let pts = vec![
            coord! { x: 0.0, y: 0.0 },
            coord! { x: 0.0, y: 10.0 },
            coord! { x: 10.0, y: 10.0 },
            coord! { x: 10.0, y: 0.0 },
            coord! { x: 0.0, y: 0.0 },
        ];
        let mut e = Edge::new(
            pts,
            Label::new(0, Location::Boundary, Location::Exterior, Location::Interior),
        );
        e.set_depth_delta(-1);
        e
    }

    #[test]
    fn rightmost_coordinate_has_max_x() {
        let mut graph = PlanarGraph::new(vec![cw_square_edge()]);
        let start = graph.node_ids().next().unwrap();
        let sg = BufferSubgraph::create(&mut graph, start);
        assert_eq!(sg.rightmost_coordinate().x, 10.0);
    }

    #[test]
    fn depths_and_result_edges_for_simple_ring() {
        let mut graph = PlanarGraph::new(vec![cw_square_edge()]);
        let start = graph.node_ids().next().unwrap();
        let mut sg = BufferSubgraph::create(&mut graph, start);
        sg.compute_depth(&mut graph, 0).unwrap();
        sg.find_result_edges(&mut graph);

        let in_result: Vec<_> = sg
            .dir_edges()
            .iter()
            .copied()
            .filter(|&de| graph.dir_edge(de).in_result)
            .collect();
        assert_eq!(in_result.len(), 1);
        // the in-result direction bounds the interior on its right
        let de = in_result[0];
        assert_eq!(graph.depth(de, Position::Right), Some(1));
        assert_eq!(graph.depth(de, Position::Left), Some(0));
    }
}
