//! Noding: splitting curve collections at every mutual intersection so that
//! segment interiors are interaction-free.

pub mod intersection_adder;
pub mod mc_index_noder;
pub mod monotone_chain;
pub mod segment_string;

pub use intersection_adder::IntersectionAdder;
pub use mc_index_noder::McIndexNoder;
pub use monotone_chain::MonotoneChain;
pub use segment_string::{NodedSegmentString, SegmentNode};

use crate::errors::BufferError;

/// A noder computes all intersections within a set of segment strings and
/// can then hand back the split substrings.
pub trait Noder {
    fn compute_nodes(&mut self, seg_strings: Vec<NodedSegmentString>) -> Result<(), BufferError>;

    /// The curves split at every node found by the last
    /// [`compute_nodes`](Self::compute_nodes) call. Drains the noder.
    fn noded_substrings(&mut self) -> Vec<NodedSegmentString>;
}
