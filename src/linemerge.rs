//! Merges a collection of fully-noded linestrings into maximal linestrings:
//! chains are followed through nodes where exactly two line ends meet.

use crate::float_types::Real;
use geo_types::{Coord, Geometry, LineString};
use hashbrown::HashMap;

type NodeKey = (u64, u64);

fn key(c: Coord<Real>) -> NodeKey {
    (c.x.to_bits(), c.y.to_bits())
}

#[derive(Debug, Default)]
pub struct LineMerger {
    lines: Vec<Vec<Coord<Real>>>,
}

impl LineMerger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add the linework of a geometry. Non-linear components are ignored.
    pub fn add(&mut self, g: &Geometry<Real>) {
        match g {
            Geometry::LineString(ls) => self.add_line(ls),
            Geometry::MultiLineString(mls) => {
                for ls in &mls.0 {
                    self.add_line(ls);
                }
            }
            Geometry::GeometryCollection(gc) => {
                for sub in &gc.0 {
                    self.add(sub);
                }
            }
            Geometry::Line(l) => self.lines.push(vec![l.start, l.end]),
            _ => {}
        }
    }

    pub fn add_line(&mut self, line: &LineString<Real>) {
        if line.0.len() >= 2 {
            self.lines.push(line.0.clone());
        }
    }

    /// The merged maximal linestrings.
    pub fn merged_line_strings(self) -> Vec<LineString<Real>> {
        // index line ends by endpoint
        let mut ends_at: HashMap<NodeKey, Vec<(usize, bool)>> = HashMap::new();
        for (i, line) in self.lines.iter().enumerate() {
            let start = *line.first().unwrap();
            let end = *line.last().unwrap();
            ends_at.entry(key(start)).or_default().push((i, true));
            ends_at.entry(key(end)).or_default().push((i, false));
        }

        let mut used = vec![false; self.lines.len()];
        let mut merged: Vec<LineString<Real>> = Vec::new();

        // start chains at nodes that are not simple pass-throughs
        for line_ends in ends_at.values() {
            if line_ends.len() == 2 {
                continue;
            }
            for &(i, from_start) in line_ends {
                if used[i] {
                    continue;
                }
                merged.push(LineString::from(self.walk_chain(
                    &ends_at, &mut used, i, from_start,
                )));
            }
        }
        // whatever is left forms closed chains; pick arbitrary starts
        for i in 0..self.lines.len() {
            if used[i] {
                continue;
            }
            merged.push(LineString::from(self.walk_chain(&ends_at, &mut used, i, true)));
        }
        merged
    }

    /// Follow a chain starting with line `i` (entered at its start or end),
    /// extending through every degree-2 node encountered.
    fn walk_chain(
        &self,
        ends_at: &HashMap<NodeKey, Vec<(usize, bool)>>,
        used: &mut Vec<bool>,
        i: usize,
        from_start: bool,
    ) -> Vec<Coord<Real>> {
        let mut pts: Vec<Coord<Real>> = Vec::new();
        let mut current = Some((i, from_start));
        while let Some((line_index, forward)) = current {
            used[line_index] = true;
            let line = &self.lines[line_index];
            let segment: Vec<Coord<Real>> = if forward {
                line.clone()
            } else {
                line.iter().rev().copied().collect()
            };
            let skip = usize::from(!pts.is_empty());
            pts.extend(segment.into_iter().skip(skip));

            let far = key(*pts.last().unwrap());
            current = None;
            if let Some(ends) = ends_at.get(&far) {
                if ends.len() == 2 {
                    for &(j, j_from_start) in ends {
                        if !used[j] {
                            current = Some((j, j_from_start));
                        }
                    }
                }
            }
        }
        pts
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use geo_types::coord;

    fn ls(pts: &[(f64, f64)]) -> LineString<Real> {
        LineString::from(
            pts.iter()
                .map(|&(x, y)| coord! { x: x, y: y })
                .collect::<Vec<_>>(),
        )
    }

    #[test]
    fn chains_through_degree_two_nodes() {
        let mut merger = LineMerger::new();
        merger.add_line(&ls(&[(0.0, 0.0), (5.0, 0.0)]));
        merger.add_line(&ls(&[(5.0, 0.0), (10.0, 0.0)]));
        let merged = merger.merged_line_strings();
        assert_eq!(merged.len(), 1);
        assert_eq!(merged[0].0.len(), 3);
    }

    #[test]
    fn reversed_segment_is_still_chained() {
        let mut merger = LineMerger::new();
        merger.add_line(&ls(&[(0.0, 0.0), (5.0, 0.0)]));
        merger.add_line(&ls(&[(10.0, 0.0), (5.0, 0.0)]));
        let merged = merger.merged_line_strings();
        assert_eq!(merged.len(), 1);
        assert_eq!(merged[0].0.len(), 3);
        assert_eq!(merged[0].0.first(), Some(&coord! { x: 0.0, y: 0.0 }));
        assert_eq!(merged[0].0.last(), Some(&coord! { x: 10.0, y: 0.0 }));
    }

    #[test]
    fn branching_node_stops_the_chain() {
        let mut merger = LineMerger::new();
        merger.add_line(&ls(&[(0.0, 0.0), (5.0, 0.0)]));
        merger.add_line(&ls(&[(5.0, 0.0), (10.0, 0.0)]));
        merger.add_line(&ls(&[(5.0, 0.0), (5.0, 5.0)]));
        let merged = merger.merged_line_strings();
        assert_eq!(merged.len(), 3);
    }

    #[test]
    fn closed_loop_is_merged() {
        let mut merger = LineMerger::new();
        merger.add_line(&ls(&[(0.0, 0.0), (1.0, 0.0)]));
        merger.add_line(&ls(&[(1.0, 0.0), (1.0, 1.0)]));
        merger.add_line(&ls(&[(1.0, 1.0), (0.0, 0.0)]));
        let merged = merger.merged_line_strings();
        assert_eq!(merged.len(), 1);
        let ring = &merged[0].0;
        assert_eq!(ring.first(), ring.last());
    }
}
