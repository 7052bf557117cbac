use crate::float_types::Real;
use geo_types::Coord;

/// Axis-aligned bounding rectangle with an explicit empty state.
///
/// `geo_types::Rect` insists on valid corners, which makes incremental
/// accumulation awkward; this mirrors the classic envelope with a null state
/// instead.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Envelope {
    min_x: Real,
    max_x: Real,
    min_y: Real,
    max_y: Real,
}

impl Default for Envelope {
    fn default() -> Self {
        Self::new()
    }
}

impl Envelope {
    /// An empty envelope containing nothing.
    pub const fn new() -> Self {
        Self {
            min_x: 0.0,
            max_x: -1.0,
            min_y: 0.0,
            max_y: -1.0,
        }
    }

    pub fn of_coords(pts: &[Coord<Real>]) -> Self {
        let mut env = Self::new();
        for &p in pts {
            env.expand_to_include(p);
        }
        env
    }

    /// Envelope of a single segment.
    pub fn of_segment(p0: Coord<Real>, p1: Coord<Real>) -> Self {
        Self {
            min_x: p0.x.min(p1.x),
            max_x: p0.x.max(p1.x),
            min_y: p0.y.min(p1.y),
            max_y: p0.y.max(p1.y),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.max_x < self.min_x
    }

    pub fn expand_to_include(&mut self, p: Coord<Real>) {
        if self.is_empty() {
            self.min_x = p.x;
            self.max_x = p.x;
            self.min_y = p.y;
            self.max_y = p.y;
        } else {
            self.min_x = self.min_x.min(p.x);
            self.max_x = self.max_x.max(p.x);
            self.min_y = self.min_y.min(p.y);
            self.max_y = self.max_y.max(p.y);
        }
    }

    pub fn expand_to_include_envelope(&mut self, other: &Envelope) {
        if other.is_empty() {
            return;
        }
        self.expand_to_include(Coord {
            x: other.min_x,
            y: other.min_y,
        });
        self.expand_to_include(Coord {
            x: other.max_x,
            y: other.max_y,
        });
    }

    pub fn intersects(&self, other: &Envelope) -> bool {
        if self.is_empty() || other.is_empty() {
            return false;
        }
        self.max_x >= other.min_x
            && self.min_x <= other.max_x
            && self.max_y >= other.min_y
            && self.min_y <= other.max_y
    }

    /// Does the envelope of segment (p1,p2) intersect that of (q1,q2)?
    pub fn segments_intersect(
        p1: Coord<Real>,
        p2: Coord<Real>,
        q1: Coord<Real>,
        q2: Coord<Real>,
    ) -> bool {
        p1.x.min(p2.x) <= q1.x.max(q2.x)
            && p1.x.max(p2.x) >= q1.x.min(q2.x)
            && p1.y.min(p2.y) <= q1.y.max(q2.y)
            && p1.y.max(p2.y) >= q1.y.min(q2.y)
    }

    pub fn contains_coord(&self, p: Coord<Real>) -> bool {
        !self.is_empty()
            && p.x >= self.min_x
            && p.x <= self.max_x
            && p.y >= self.min_y
            && p.y <= self.max_y
    }

    pub fn contains_envelope(&self, other: &Envelope) -> bool {
        if self.is_empty() || other.is_empty() {
            return false;
        }
        other.min_x >= self.min_x
            && other.max_x <= self.max_x
            && other.min_y >= self.min_y
            && other.max_y <= self.max_y
    }

    pub fn min_x(&self) -> Real {
        self.min_x
    }

    pub fn max_x(&self) -> Real {
        self.max_x
    }

    pub fn min_y(&self) -> Real {
        self.min_y
    }

    pub fn max_y(&self) -> Real {
        self.max_y
    }

    pub fn width(&self) -> Real {
        if self.is_empty() {
            0.0
        } else {
            self.max_x - self.min_x
        }
    }

    pub fn height(&self) -> Real {
        if self.is_empty() {
            0.0
        } else {
            self.max_y - self.min_y
        }
    }

    /// Length of the envelope diagonal; 0 for an empty envelope.
    pub fn diameter(&self) -> Real {
        self.width().hypot(self.height())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use geo_types::coord;

    #[test]
    fn empty_envelope_intersects_nothing() {
        let empty = Envelope::new();
        let unit = Envelope::of_segment(coord! { x: 0.0, y: 0.0 }, coord! { x: 1.0, y: 1.0 });
        assert!(empty.is_empty());
        assert!(!empty.intersects(&unit));
        assert!(unit.intersects(&unit));
    }

    #[test]
    fn expansion_accumulates() {
        let mut env = Envelope::new();
        env.expand_to_include(coord! { x: 2.0, y: -1.0 });
        env.expand_to_include(coord! { x: -3.0, y: 4.0 });
        assert_eq!(env.min_x(), -3.0);
        assert_eq!(env.max_x(), 2.0);
        assert_eq!(env.min_y(), -1.0);
        assert_eq!(env.max_y(), 4.0);
    }
}
