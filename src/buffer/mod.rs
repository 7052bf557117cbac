//! Buffer construction: the set of all points within a signed distance of
//! an input geometry, as a valid polygonal geometry (or, single-sided, as
//! an offset line).

pub mod builder;
pub mod curve_set_builder;
pub mod depth_locater;
pub mod input_line_simplifier;
pub mod offset_curve_builder;
pub mod offset_segment_generator;
pub mod params;
pub mod polygon_builder;
pub mod subgraph;

pub use builder::{depth_delta, BufferBuilder};
pub use params::{BufferParams, EndCapStyle, JoinStyle};

use crate::errors::BufferError;
use crate::float_types::Real;
use geo_types::Geometry;

/// Buffer `g` by `distance` with default parameters.
pub fn buffer(g: &Geometry<Real>, distance: Real) -> Result<Geometry<Real>, BufferError> {
    buffer_with_params(g, distance, BufferParams::default())
}

/// Buffer `g` by `distance` with the given parameters.
pub fn buffer_with_params(
    g: &Geometry<Real>,
    distance: Real,
    params: BufferParams,
) -> Result<Geometry<Real>, BufferError> {
    BufferBuilder::new(params).buffer(g, distance)
}
