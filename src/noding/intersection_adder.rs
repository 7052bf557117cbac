use crate::algorithm::RobustLineIntersector;
use crate::noding::NodedSegmentString;

/// Segment-pair visitor that computes intersections and registers the
/// resulting nodes on both segment strings.
#[derive(Debug)]
pub struct IntersectionAdder {
    pub li: RobustLineIntersector,
    num_intersections: usize,
    num_interior_intersections: usize,
    num_proper_intersections: usize,
}

impl IntersectionAdder {
    pub fn new(li: RobustLineIntersector) -> Self {
        Self {
            li,
            num_intersections: 0,
            num_interior_intersections: 0,
            num_proper_intersections: 0,
        }
    }

    pub fn num_intersections(&self) -> usize {
        self.num_intersections
    }

    /// Intersect segment `seg0` of `strings[e0]` with segment `seg1` of
    /// `strings[e1]` and add nodes for any intersection found.
    pub fn process_intersections(
        &mut self,
        strings: &mut [NodedSegmentString],
        e0: usize,
        seg0: usize,
        e1: usize,
        seg1: usize,
    ) {
        // never intersect a segment with itself
        if e0 == e1 && seg0 == seg1 {
            return;
        }
        let p00 = strings[e0].coords()[seg0];
        let p01 = strings[e0].coords()[seg0 + 1];
        let p10 = strings[e1].coords()[seg1];
        let p11 = strings[e1].coords()[seg1 + 1];

        self.li.compute_intersection(p00, p01, p10, p11);
        if !self.li.has_intersection() {
            return;
        }
        self.num_intersections += 1;
        if self.li.is_interior_intersection() {
            self.num_interior_intersections += 1;
        }
        // adjacent segments of one string always share their endpoint; don't
        // bother recording it when that is the only intersection
        if self.is_trivial_intersection(&strings[e0], e0, seg0, e1, seg1) {
            return;
        }
        for i in 0..self.li.intersection_num() {
            let pt = self.li.intersection(i);
            strings[e0].add_intersection(pt, seg0);
            strings[e1].add_intersection(pt, seg1);
        }
        if self.li.is_proper() {
            self.num_proper_intersections += 1;
        }
    }

    fn is_trivial_intersection(
        &self,
        ss0: &NodedSegmentString,
        e0: usize,
        seg0: usize,
        e1: usize,
        seg1: usize,
    ) -> bool {
        if e0 != e1 || self.li.intersection_num() != 1 {
            return false;
        }
        if is_adjacent(seg0, seg1) {
            return true;
        }
        if ss0.is_closed() {
            let max_seg_index = ss0.size() - 1;
            if (seg0 == 0 && seg1 == max_seg_index - 1)
                || (seg1 == 0 && seg0 == max_seg_index - 1)
            {
                return true;
            }
        }
        false
    }
}

fn is_adjacent(seg0: usize, seg1: usize) -> bool {
    seg0.abs_diff(seg1) == 1
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::noding::segment_string::NodedSegmentString;
    use geo_types::coord;

    #[test]
    fn crossing_strings_get_nodes_on_both() {
        let mut strings = vec![
            NodedSegmentString::new(
                vec![coord! { x: 0.0, y: 0.0 }, coord! { x: 10.0, y: 0.0 }],
                None,
            ),
            NodedSegmentString::new(
                vec![coord! { x: 5.0, y: -5.0 }, coord! { x: 5.0, y: 5.0 }],
                None,
            ),
        ];
        let mut adder = IntersectionAdder::new(RobustLineIntersector::default());
        adder.process_intersections(&mut strings, 0, 0, 1, 0);
        assert_eq!(adder.num_intersections(), 1);

        let subs = NodedSegmentString::noded_substrings(strings);
        assert_eq!(subs.len(), 4);
    }
}
