#![forbid(unsafe_code)]

//! Buffer and offset-curve construction for planar geometry.
//!
//! Given a [`geo_types::Geometry`] and a signed distance, [`buffer`]
//! produces the geometry containing all points within that distance of the
//! input (or the erosion, for negative distances on areal inputs). The
//! pipeline is the classic one: raw offset curves, robust noding, a planar
//! topology graph with depth labeling, and shell/hole polygon assembly.
//! [`BufferBuilder::buffer_line_single_sided`] offsets a line on one side
//! only, returning linework instead of area.

pub mod algorithm;
pub mod buffer;
pub mod errors;
pub mod float_types;
pub mod geom;
pub mod geomgraph;
pub mod interrupt;
pub mod linemerge;
pub mod noding;
pub mod overlay;

pub use buffer::{
    buffer, buffer_with_params, depth_delta, BufferBuilder, BufferParams, EndCapStyle, JoinStyle,
};
pub use errors::BufferError;
pub use float_types::Real;
pub use geom::PrecisionModel;
pub use interrupt::InterruptFlag;
