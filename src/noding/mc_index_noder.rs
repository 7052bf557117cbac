use crate::algorithm::RobustLineIntersector;
use crate::errors::BufferError;
use crate::geom::PrecisionModel;
use crate::noding::{IntersectionAdder, MonotoneChain, NodedSegmentString, Noder};
use rstar::{RTree, RTreeObject, AABB};

/// Fast (but non-robust, in the snap-rounding sense) noder: monotone chains
/// of all input strings are indexed in an R-tree, and only chains with
/// overlapping envelopes are intersected pairwise.
#[derive(Debug)]
pub struct McIndexNoder {
    adder: IntersectionAdder,
    noded: Vec<NodedSegmentString>,
}

struct ChainEntry {
    chain_index: usize,
    env: AABB<[f64; 2]>,
}

impl RTreeObject for ChainEntry {
    type Envelope = AABB<[f64; 2]>;

    fn envelope(&self) -> AABB<[f64; 2]> {
        self.env
    }
}

impl McIndexNoder {
    pub fn new(precision_model: PrecisionModel) -> Self {
        Self {
            adder: IntersectionAdder::new(RobustLineIntersector::new(precision_model)),
            noded: Vec::new(),
        }
    }

    /// Re-target a cached noder at another precision model.
    pub fn set_precision_model(&mut self, precision_model: PrecisionModel) {
        self.adder.li.set_precision_model(precision_model);
    }
}

impl Noder for McIndexNoder {
    fn compute_nodes(&mut self, seg_strings: Vec<NodedSegmentString>) -> Result<(), BufferError> {
        let mut strings = seg_strings;

        let mut chains: Vec<MonotoneChain> = Vec::new();
        for (i, ss) in strings.iter().enumerate() {
            chains.extend(MonotoneChain::chains_of(ss, i));
        }

        let entries: Vec<ChainEntry> = chains
            .iter()
            .enumerate()
            .filter(|(_, c)| !c.env.is_empty())
            .map(|(chain_index, c)| ChainEntry {
                chain_index,
                env: AABB::from_corners(
                    [c.env.min_x(), c.env.min_y()],
                    [c.env.max_x(), c.env.max_y()],
                ),
            })
            .collect();
        let tree = RTree::bulk_load(entries);

        let mut seg_pairs: Vec<(usize, usize)> = Vec::new();
        for (i, chain) in chains.iter().enumerate() {
            let query = AABB::from_corners(
                [chain.env.min_x(), chain.env.min_y()],
                [chain.env.max_x(), chain.env.max_y()],
            );
            for entry in tree.locate_in_envelope_intersecting(&query) {
                // process each chain pair once
                if entry.chain_index <= i {
                    continue;
                }
                let other = &chains[entry.chain_index];
                seg_pairs.clear();
                chain.compute_overlaps(
                    strings[chain.ss_index].coords(),
                    other,
                    strings[other.ss_index].coords(),
                    &mut seg_pairs,
                );
                for &(seg0, seg1) in &seg_pairs {
                    self.adder.process_intersections(
                        &mut strings,
                        chain.ss_index,
                        seg0,
                        other.ss_index,
                        seg1,
                    );
                }
            }
        }

        self.noded = NodedSegmentString::noded_substrings(strings);
        Ok(())
    }

    fn noded_substrings(&mut self) -> Vec<NodedSegmentString> {
        std::mem::take(&mut self.noded)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use geo_types::coord;

    #[test]
    fn crossing_strings_are_split() {
        let strings = vec![
            NodedSegmentString::new(
                vec![coord! { x: 0.0, y: 0.0 }, coord! { x: 10.0, y: 10.0 }],
                None,
            ),
            NodedSegmentString::new(
                vec![coord! { x: 0.0, y: 10.0 }, coord! { x: 10.0, y: 0.0 }],
                None,
            ),
        ];
        let mut noder = McIndexNoder::new(PrecisionModel::Floating);
        noder.compute_nodes(strings).unwrap();
        let noded = noder.noded_substrings();
        assert_eq!(noded.len(), 4);
        let crossing = coord! { x: 5.0, y: 5.0 };
        assert!(noded
            .iter()
            .all(|ss| ss.coords().contains(&crossing)));
    }

    #[test]
    fn self_intersecting_string_is_split() {
        // a bowtie: one string crossing itself at (5, 5)
        let strings = vec![NodedSegmentString::new(
            vec![
                coord! { x: 0.0, y: 0.0 },
                coord! { x: 10.0, y: 10.0 },
                coord! { x: 10.0, y: 0.0 },
                coord! { x: 0.0, y: 10.0 },
            ],
            None,
        )];
        let mut noder = McIndexNoder::new(PrecisionModel::Floating);
        noder.compute_nodes(strings).unwrap();
        let noded = noder.noded_substrings();
        // tail, closed central loop, head
        assert_eq!(noded.len(), 3);
        assert!(noded.iter().any(|ss| ss.is_closed()));
    }
}
