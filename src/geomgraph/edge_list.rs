use crate::float_types::Real;
use crate::geomgraph::Edge;
use geo_types::Coord;
use hashbrown::HashMap;

/// Append-only collection of edges with fast lookup of a geometrically equal
/// edge (same vertex chain, either direction).
///
/// Lookup is by a canonically-oriented bit-pattern key, so two edges that
/// trace the same points in opposite directions hash identically.
#[derive(Debug, Default)]
pub struct EdgeList {
    edges: Vec<Edge>,
    index: HashMap<Vec<(u64, u64)>, usize>,
}

impl EdgeList {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, edge: Edge) -> usize {
        let key = oriented_key(edge.coords());
        let id = self.edges.len();
        self.index.entry(key).or_insert(id);
        self.edges.push(edge);
        id
    }

    /// Index of an existing edge with the same vertex chain (any direction).
    pub fn find_equal_edge(&self, edge: &Edge) -> Option<usize> {
        self.index.get(&oriented_key(edge.coords())).copied()
    }

    pub fn get(&self, id: usize) -> &Edge {
        &self.edges[id]
    }

    pub fn get_mut(&mut self, id: usize) -> &mut Edge {
        &mut self.edges[id]
    }

    pub fn len(&self) -> usize {
        self.edges.len()
    }

    pub fn is_empty(&self) -> bool {
        self.edges.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Edge> {
        self.edges.iter()
    }

    /// Hand the edges over to the graph builder.
    pub fn into_edges(self) -> Vec<Edge> {
        self.edges
    }
}

/// Bit-pattern key of the chain in its canonical direction (the
/// lexicographically smaller of forward and reversed).
fn oriented_key(coords: &[Coord<Real>]) -> Vec<(u64, u64)> {
    let forward: Vec<(u64, u64)> = coords
        .iter()
        .map(|c| (c.x.to_bits(), c.y.to_bits()))
        .collect();
    let mut reversed = forward.clone();
    reversed.reverse();
    if reversed < forward {
        reversed
    } else {
        forward
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geomgraph::Label;
    use geo_types::coord;

    fn edge(pts: &[(f64, f64)]) -> Edge {
        Edge::new(
            pts.iter().map(|&(x, y)| coord! { x: x, y: y }).collect(),
            Label::default(),
        )
    }

    #[test]
    fn finds_equal_edge_in_both_directions() {
        let mut list = EdgeList::new();
        let forward = edge(&[(0.0, 0.0), (1.0, 1.0), (2.0, 0.0)]);
        let id = list.add(forward);

        let same = edge(&[(0.0, 0.0), (1.0, 1.0), (2.0, 0.0)]);
        let reversed = edge(&[(2.0, 0.0), (1.0, 1.0), (0.0, 0.0)]);
        let other = edge(&[(0.0, 0.0), (2.0, 0.0)]);

        assert_eq!(list.find_equal_edge(&same), Some(id));
        assert_eq!(list.find_equal_edge(&reversed), Some(id));
        assert_eq!(list.find_equal_edge(&other), None);

        assert!(list.get(id).is_pointwise_equal(&same));
        assert!(!list.get(id).is_pointwise_equal(&reversed));
    }
}
