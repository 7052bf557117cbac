use crate::float_types::Real;
use geo_types::Coord;

/// All the failure modes a buffer pipeline run can hit.
///
/// Every error is fatal to the current call. The builder itself stays usable
/// for subsequent calls; partially-built graphs and curves are dropped on the
/// way out.
#[derive(Clone, Debug, thiserror::Error, PartialEq)]
pub enum BufferError {
    /// An operation was handed a geometry type it does not accept
    #[error("{operation} only accepts {expected}")]
    IllegalArgument {
        operation: &'static str,
        expected: &'static str,
    },
    /// Noding produced an arrangement the topology code could not resolve
    #[error("topology error: {message}{}", fmt_coord(.coordinate))]
    Topology {
        message: String,
        coordinate: Option<Coord<Real>>,
    },
    /// The cooperative interrupt flag fired mid-pipeline
    #[error("buffer computation interrupted")]
    Interrupted,
}

impl BufferError {
    /// Topology error pinned to the coordinate where the inconsistency was found.
    pub fn topology_at(message: impl Into<String>, coordinate: Coord<Real>) -> Self {
        BufferError::Topology {
            message: message.into(),
            coordinate: Some(coordinate),
        }
    }

    /// Topology error with no useful location.
    pub fn topology(message: impl Into<String>) -> Self {
        BufferError::Topology {
            message: message.into(),
            coordinate: None,
        }
    }
}

fn fmt_coord(coordinate: &Option<Coord<Real>>) -> String {
    match coordinate {
        Some(c) => format!(" at ({}, {})", c.x, c.y),
        None => String::new(),
    }
}
