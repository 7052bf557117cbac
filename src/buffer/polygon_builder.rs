//! Assembles the in-result directed edges into polygons with correctly
//! nested shells and holes.
//!
//! Edges are first linked into *maximal* rings (following the CCW result
//! linking at each node). A maximal ring that touches itself at a node is
//! relinked into *minimal* rings, one of which may be the shell of the
//! touching holes. Remaining holes are matched to the smallest enclosing
//! shell.

use crate::algorithm::{orientation, point_location};
use crate::errors::BufferError;
use crate::float_types::Real;
use crate::geom::Envelope;
use crate::geomgraph::{DirectedEdgeId, NodeId, PlanarGraph};
use geo_types::{Coord, LineString, Polygon};

#[derive(Debug)]
struct EdgeRing {
    pts: Vec<Coord<Real>>,
    is_hole: bool,
    shell: Option<usize>,
    holes: Vec<usize>,
    env: Envelope,
}

impl EdgeRing {
    fn new(pts: Vec<Coord<Real>>) -> Self {
        let is_hole = orientation::is_ccw(&pts);
        let env = Envelope::of_coords(&pts);
        Self {
            pts,
            is_hole,
            shell: None,
            holes: Vec::new(),
            env,
        }
    }
}

/// Consumes in-result directed edges subgraph by subgraph and emits the
/// result polygons at the end.
#[derive(Debug, Default)]
pub struct PolygonBuilder {
    rings: Vec<EdgeRing>,
    shells: Vec<usize>,
    next_max_ring_id: usize,
    next_min_ring_id: usize,
}

impl PolygonBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add the result edges of one subgraph. Subgraphs must arrive in
    /// rightmost-descending order so shells are registered before the holes
    /// they contain.
    pub fn add(
        &mut self,
        graph: &mut PlanarGraph,
        dir_edges: &[DirectedEdgeId],
        nodes: &[NodeId],
    ) -> Result<(), BufferError> {
        for &node in nodes {
            graph.link_result_directed_edges(node)?;
        }

        // trace the maximal rings
        let mut max_rings: Vec<(usize, Vec<DirectedEdgeId>)> = Vec::new();
        for &de in dir_edges {
            let d = graph.dir_edge(de);
            if !d.in_result || d.edge_ring.is_some() || !graph.label_of(de).is_any_area() {
                continue;
            }
            let ring_id = self.next_max_ring_id;
            self.next_max_ring_id += 1;
            let edges = trace_maximal_ring(graph, de, ring_id)?;
            max_rings.push((ring_id, edges));
        }

        let mut free_holes: Vec<usize> = Vec::new();
        for (ring_id, edges) in max_rings {
            if max_node_degree(graph, &edges, ring_id) > 2 {
                // the ring touches itself; relink into minimal rings
                for &de in &edges {
                    graph.link_minimal_directed_edges(graph.origin(de), ring_id)?;
                }
                let min_rings = self.build_minimal_rings(graph, &edges)?;
                self.sort_touching_rings(min_rings, &mut free_holes)?;
            } else {
                let ring = self.push_ring(EdgeRing::new(ring_coords(graph, &edges)));
                if self.rings[ring].is_hole {
                    free_holes.push(ring);
                } else {
                    self.shells.push(ring);
                }
            }
        }
        self.place_free_holes(free_holes)?;
        Ok(())
    }

    /// The assembled polygons; consumes the builder.
    pub fn polygons(self) -> Vec<Polygon<Real>> {
        let mut polys = Vec::with_capacity(self.shells.len());
        for &shell in &self.shells {
            let shell_ring = &self.rings[shell];
            let exterior = LineString::from(shell_ring.pts.clone());
            let interiors = shell_ring
                .holes
                .iter()
                .map(|&h| LineString::from(self.rings[h].pts.clone()))
                .collect();
            polys.push(Polygon::new(exterior, interiors));
        }
        polys
    }

    fn push_ring(&mut self, ring: EdgeRing) -> usize {
        self.rings.push(ring);
        self.rings.len() - 1
    }

    fn build_minimal_rings(
        &mut self,
        graph: &mut PlanarGraph,
        max_ring_edges: &[DirectedEdgeId],
    ) -> Result<Vec<usize>, BufferError> {
        let mut min_rings = Vec::new();
        for &de in max_ring_edges {
            if graph.dir_edge(de).min_edge_ring.is_some() {
                continue;
            }
            let ring_id = self.next_min_ring_id;
            self.next_min_ring_id += 1;
            let edges = trace_minimal_ring(graph, de, ring_id)?;
            min_rings.push(self.push_ring(EdgeRing::new(ring_coords(graph, &edges))));
        }
        Ok(min_rings)
    }

    /// One of the minimal rings of a self-touching maximal ring may be the
    /// shell of the others; if none is, they are all free holes.
    fn sort_touching_rings(
        &mut self,
        min_rings: Vec<usize>,
        free_holes: &mut Vec<usize>,
    ) -> Result<(), BufferError> {
        let mut shell: Option<usize> = None;
        for &r in &min_rings {
            if !self.rings[r].is_hole {
                if shell.is_some() {
                    return Err(BufferError::topology(
                        "found two shells in minimal edge ring list",
                    ));
                }
                shell = Some(r);
            }
        }
        match shell {
            Some(shell) => {
                for &r in &min_rings {
                    if self.rings[r].is_hole {
                        self.rings[r].shell = Some(shell);
                        self.rings[shell].holes.push(r);
                    }
                }
                self.shells.push(shell);
            }
            None => free_holes.extend(min_rings),
        }
        Ok(())
    }

    fn place_free_holes(&mut self, free_holes: Vec<usize>) -> Result<(), BufferError> {
        for hole in free_holes {
            if self.rings[hole].shell.is_some() {
                continue;
            }
            let shell = self.find_ring_containing(hole).ok_or_else(|| {
                let pt = self.rings[hole].pts.first().copied().unwrap_or(Coord::zero());
                BufferError::topology_at("unable to assign hole to a shell", pt)
            })?;
            self.rings[hole].shell = Some(shell);
            self.rings[shell].holes.push(hole);
        }
        Ok(())
    }

    /// The smallest shell (by envelope nesting) properly containing the
    /// test ring.
    fn find_ring_containing(&self, test: usize) -> Option<usize> {
        let test_ring = &self.rings[test];
        let mut min_shell: Option<usize> = None;
        for &try_shell in &self.shells {
            let shell_ring = &self.rings[try_shell];
            // a hole's envelope cannot equal that of its shell
            if shell_ring.env == test_ring.env {
                continue;
            }
            if !shell_ring.env.contains_envelope(&test_ring.env) {
                continue;
            }
            let test_pt = pt_not_in_list(&test_ring.pts, &shell_ring.pts);
            if point_location::is_in_ring(test_pt, &shell_ring.pts) {
                let smaller = match min_shell {
                    None => true,
                    Some(current) => self.rings[current]
                        .env
                        .contains_envelope(&self.rings[try_shell].env),
                };
                if smaller {
                    min_shell = Some(try_shell);
                }
            }
        }
        min_shell
    }
}

/// A test point for containment: some vertex of `test_pts` not shared with
/// the candidate shell, so a touching vertex does not confuse the test.
fn pt_not_in_list(test_pts: &[Coord<Real>], shell_pts: &[Coord<Real>]) -> Coord<Real> {
    test_pts
        .iter()
        .copied()
        .find(|pt| !shell_pts.contains(pt))
        .unwrap_or(test_pts[0])
}

fn trace_maximal_ring(
    graph: &mut PlanarGraph,
    start: DirectedEdgeId,
    ring_id: usize,
) -> Result<Vec<DirectedEdgeId>, BufferError> {
    let mut edges = Vec::new();
    let mut de = start;
    loop {
        if graph.dir_edge(de).edge_ring == Some(ring_id) {
            return Err(BufferError::topology_at(
                "directed edge visited twice during ring building",
                graph.origin_coord(de),
            ));
        }
        edges.push(de);
        graph.dir_edge_mut(de).edge_ring = Some(ring_id);
        let next = graph.dir_edge(de).next.ok_or_else(|| {
            BufferError::topology_at("found null directed edge", graph.origin_coord(de))
        })?;
        if next == start {
            return Ok(edges);
        }
        de = next;
    }
}

fn trace_minimal_ring(
    graph: &mut PlanarGraph,
    start: DirectedEdgeId,
    ring_id: usize,
) -> Result<Vec<DirectedEdgeId>, BufferError> {
    let mut edges = Vec::new();
    let mut de = start;
    loop {
        if graph.dir_edge(de).min_edge_ring == Some(ring_id) {
            return Err(BufferError::topology_at(
                "directed edge visited twice during minimal ring building",
                graph.origin_coord(de),
            ));
        }
        edges.push(de);
        graph.dir_edge_mut(de).min_edge_ring = Some(ring_id);
        let next = graph.dir_edge(de).next_min.ok_or_else(|| {
            BufferError::topology_at("found null minimal directed edge", graph.origin_coord(de))
        })?;
        if next == start {
            return Ok(edges);
        }
        de = next;
    }
}

/// Concatenated coordinates of a traced ring (closed: the last point equals
/// the first).
fn ring_coords(graph: &PlanarGraph, edges: &[DirectedEdgeId]) -> Vec<Coord<Real>> {
    let mut pts = Vec::new();
    for (i, &de) in edges.iter().enumerate() {
        let de_pts = graph.dir_edge_coords(de);
        if i == 0 {
            pts.extend(de_pts);
        } else {
            pts.extend(de_pts.into_iter().skip(1));
        }
    }
    pts
}

/// Twice the maximum number of times the ring passes through one node.
fn max_node_degree(graph: &PlanarGraph, edges: &[DirectedEdgeId], ring_id: usize) -> usize {
    let mut max_degree = 0;
    for &de in edges {
        let node = graph.origin(de);
        let degree = graph
            .star(node)
            .iter()
            .filter(|&&d| graph.dir_edge(d).edge_ring == Some(ring_id))
            .count();
        max_degree = max_degree.max(degree);
    }
    max_degree * 2
}
