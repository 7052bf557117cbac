use crate::float_types::Real;
use geo_types::Coord;

/// Coordinate rounding policy.
///
/// `Floating` keeps full IEEE-754 doubles; `Fixed` snaps coordinates to a
/// grid of spacing `1 / scale`. Every node the noder emits conforms to the
/// active model.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum PrecisionModel {
    Floating,
    Fixed { scale: Real },
}

impl Default for PrecisionModel {
    fn default() -> Self {
        PrecisionModel::Floating
    }
}

impl PrecisionModel {
    /// A fixed model snapping to a grid of spacing `1 / scale`.
    pub fn fixed(scale: Real) -> Self {
        PrecisionModel::Fixed { scale }
    }

    #[inline]
    pub fn make_precise_value(&self, v: Real) -> Real {
        match self {
            PrecisionModel::Floating => v,
            PrecisionModel::Fixed { scale } => (v * scale).round() / scale,
        }
    }

    #[inline]
    pub fn make_precise(&self, c: Coord<Real>) -> Coord<Real> {
        match self {
            PrecisionModel::Floating => c,
            PrecisionModel::Fixed { .. } => Coord {
                x: self.make_precise_value(c.x),
                y: self.make_precise_value(c.y),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use geo_types::coord;

    #[test]
    fn fixed_model_snaps_to_grid() {
        let pm = PrecisionModel::fixed(10.0);
        let p = pm.make_precise(coord! { x: 1.26, y: -0.34 });
        assert_eq!(p, coord! { x: 1.3, y: -0.3 });
    }

    #[test]
    fn floating_model_is_identity() {
        let pm = PrecisionModel::Floating;
        let c = coord! { x: 1.2345678901234567, y: 2.0 };
        assert_eq!(pm.make_precise(c), c);
    }
}
