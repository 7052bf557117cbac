use crate::float_types::Real;
use crate::geom::Envelope;
use crate::geomgraph::quadrant;
use crate::noding::NodedSegmentString;
use geo_types::Coord;

/// A run of segments of one segment string that is monotone in both x and y.
///
/// Monotone chains never self-intersect, and their envelope is spanned by
/// their end points alone, which makes envelope tests during the overlap
/// recursion cheap.
#[derive(Clone, Debug)]
pub struct MonotoneChain {
    /// Which segment string the chain belongs to.
    pub ss_index: usize,
    /// First vertex index of the chain.
    pub start: usize,
    /// Last vertex index of the chain.
    pub end: usize,
    pub env: Envelope,
}

impl MonotoneChain {
    /// Decompose a segment string into monotone chains. A chain ends where
    /// the segment direction leaves its quadrant.
    pub fn chains_of(ss: &NodedSegmentString, ss_index: usize) -> Vec<MonotoneChain> {
        let coords = ss.coords();
        let mut chains = Vec::new();
        if coords.len() < 2 {
            return chains;
        }
        let mut start = 0;
        while start < coords.len() - 1 {
            let end = find_chain_end(coords, start);
            chains.push(MonotoneChain {
                ss_index,
                start,
                end,
                env: Envelope::of_coords(&coords[start..=end]),
            });
            start = end;
        }
        chains
    }

    /// Visit every segment pair of two chains whose envelopes overlap.
    /// Classic divide-and-conquer on the chain halves.
    pub fn compute_overlaps(
        &self,
        coords0: &[Coord<Real>],
        other: &MonotoneChain,
        coords1: &[Coord<Real>],
        pairs: &mut Vec<(usize, usize)>,
    ) {
        overlap_recurse(
            coords0, self.start, self.end, coords1, other.start, other.end, pairs,
        );
    }
}

fn find_chain_end(coords: &[Coord<Real>], start: usize) -> usize {
    let mut safe_start = start;
    // zero-length segments cannot establish a quadrant
    while safe_start < coords.len() - 1 && coords[safe_start] == coords[safe_start + 1] {
        safe_start += 1;
    }
    if safe_start >= coords.len() - 1 {
        return coords.len() - 1;
    }
    let chain_quad = quadrant::quadrant(
        coords[safe_start + 1].x - coords[safe_start].x,
        coords[safe_start + 1].y - coords[safe_start].y,
    );
    let mut last = start + 1;
    while last < coords.len() {
        if coords[last - 1] != coords[last] {
            let quad = quadrant::quadrant(
                coords[last].x - coords[last - 1].x,
                coords[last].y - coords[last - 1].y,
            );
            if quad != chain_quad {
                break;
            }
        }
        last += 1;
    }
    last - 1
}

#[allow(clippy::too_many_arguments)]
fn overlap_recurse(
    coords0: &[Coord<Real>],
    start0: usize,
    end0: usize,
    coords1: &[Coord<Real>],
    start1: usize,
    end1: usize,
    pairs: &mut Vec<(usize, usize)>,
) {
    // a single segment pair is the recursion floor
    if end0 - start0 == 1 && end1 - start1 == 1 {
        pairs.push((start0, start1));
        return;
    }
    if !Envelope::segments_intersect(coords0[start0], coords0[end0], coords1[start1], coords1[end1])
    {
        return;
    }
    let mid0 = (start0 + end0) / 2;
    let mid1 = (start1 + end1) / 2;
    if start0 < mid0 {
        if start1 < mid1 {
            overlap_recurse(coords0, start0, mid0, coords1, start1, mid1, pairs);
        }
        if mid1 < end1 {
            overlap_recurse(coords0, start0, mid0, coords1, mid1, end1, pairs);
        }
    }
    if mid0 < end0 {
        if start1 < mid1 {
            overlap_recurse(coords0, mid0, end0, coords1, start1, mid1, pairs);
        }
        if mid1 < end1 {
            overlap_recurse(coords0, mid0, end0, coords1, mid1, end1, pairs);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use geo_types::coord;

    #[test]
    fn zigzag_splits_into_chains() {
        let ss = NodedSegmentString::new(
            vec![
                coord! { x: 0.0, y: 0.0 },
                coord! { x: 1.0, y: 1.0 },
                coord! { x: 2.0, y: 0.0 },
                coord! { x: 3.0, y: 1.0 },
            ],
            None,
        );
        let chains = MonotoneChain::chains_of(&ss, 0);
        assert_eq!(chains.len(), 3);
        assert_eq!(chains[0].start, 0);
        assert_eq!(chains[0].end, 1);
        assert_eq!(chains[2].end, 3);
    }

    #[test]
    fn monotone_run_is_one_chain() {
        let ss = NodedSegmentString::new(
            vec![
                coord! { x: 0.0, y: 0.0 },
                coord! { x: 1.0, y: 1.0 },
                coord! { x: 2.0, y: 3.0 },
                coord! { x: 3.0, y: 7.0 },
            ],
            None,
        );
        let chains = MonotoneChain::chains_of(&ss, 0);
        assert_eq!(chains.len(), 1);
    }
}
