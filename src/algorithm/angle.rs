//! Angle arithmetic for join construction.

use crate::float_types::{Real, PI};
use geo_types::Coord;

/// Angle of the vector `p0 -> p1` with the positive x-axis, in (-π, π].
pub fn angle(p0: Coord<Real>, p1: Coord<Real>) -> Real {
    (p1.y - p0.y).atan2(p1.x - p0.x)
}

/// Oriented angle from `tail -> tip1` to `tail -> tip2`, in (-π, π].
/// Positive is counter-clockwise.
pub fn angle_between_oriented(tip1: Coord<Real>, tail: Coord<Real>, tip2: Coord<Real>) -> Real {
    let a1 = angle(tail, tip1);
    let a2 = angle(tail, tip2);
    normalize(a2 - a1)
}

/// Normalize an angle into (-π, π].
pub fn normalize(mut angle: Real) -> Real {
    while angle > PI {
        angle -= 2.0 * PI;
    }
    while angle <= -PI {
        angle += 2.0 * PI;
    }
    angle
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::float_types::FRAC_PI_2;
    use geo_types::coord;

    #[test]
    fn oriented_angle_sign() {
        let tail = coord! { x: 0.0, y: 0.0 };
        let tip1 = coord! { x: 1.0, y: 0.0 };
        let tip2 = coord! { x: 0.0, y: 1.0 };
        assert!((angle_between_oriented(tip1, tail, tip2) - FRAC_PI_2).abs() < 1e-12);
        assert!((angle_between_oriented(tip2, tail, tip1) + FRAC_PI_2).abs() < 1e-12);
    }
}
