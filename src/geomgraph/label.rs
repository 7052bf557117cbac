use crate::geomgraph::{Location, Position};

/// The topological locations of one parent geometry around an edge:
/// on the edge itself and on each side of it.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct TopologyLocation {
    pub on: Location,
    pub left: Location,
    pub right: Location,
}

impl TopologyLocation {
    pub fn new(on: Location, left: Location, right: Location) -> Self {
        Self { on, left, right }
    }

    pub fn get(&self, pos: Position) -> Location {
        match pos {
            Position::On => self.on,
            Position::Left => self.left,
            Position::Right => self.right,
        }
    }

    pub fn set(&mut self, pos: Position, loc: Location) {
        match pos {
            Position::On => self.on = loc,
            Position::Left => self.left = loc,
            Position::Right => self.right = loc,
        }
    }

    /// An area location has side values; a pure line location only an ON value.
    pub fn is_area(&self) -> bool {
        !self.left.is_none() || !self.right.is_none()
    }

    pub fn is_null(&self) -> bool {
        self.on.is_none() && self.left.is_none() && self.right.is_none()
    }

    fn flip(&mut self) {
        std::mem::swap(&mut self.left, &mut self.right);
    }

    /// Take locations from `other` wherever this one has none.
    fn merge(&mut self, other: &TopologyLocation) {
        if self.on.is_none() {
            self.on = other.on;
        }
        if self.left.is_none() {
            self.left = other.left;
        }
        if self.right.is_none() {
            self.right = other.right;
        }
    }
}

/// Topological annotation of an edge: the [`TopologyLocation`] of each of up
/// to two parent geometries.
///
/// The buffer pipeline only populates parent 0 (the buffer curve geometry),
/// but merged labels keep both slots so the graph machinery stays generic.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Label {
    elt: [TopologyLocation; 2],
}

impl Label {
    /// Label for a single parent geometry, with the given on/left/right
    /// locations.
    pub fn new(geom_index: usize, on: Location, left: Location, right: Location) -> Self {
        let mut label = Label::default();
        label.elt[geom_index] = TopologyLocation::new(on, left, right);
        label
    }

    pub fn location(&self, geom_index: usize, pos: Position) -> Location {
        self.elt[geom_index].get(pos)
    }

    pub fn set_location(&mut self, geom_index: usize, pos: Position, loc: Location) {
        self.elt[geom_index].set(pos, loc);
    }

    pub fn is_area(&self, geom_index: usize) -> bool {
        self.elt[geom_index].is_area()
    }

    /// Does any parent geometry carry side locations?
    pub fn is_any_area(&self) -> bool {
        self.elt.iter().any(TopologyLocation::is_area)
    }

    /// Swap the LEFT and RIGHT locations of every parent.
    pub fn flip(&mut self) {
        for loc in &mut self.elt {
            loc.flip();
        }
    }

    /// Combine another label for the same edge into this one: locations are
    /// taken from `other` wherever this label has none.
    pub fn merge(&mut self, other: &Label) {
        for (dst, src) in self.elt.iter_mut().zip(other.elt.iter()) {
            dst.merge(src);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn flip_swaps_sides() {
        let mut label = Label::new(0, Location::Boundary, Location::Exterior, Location::Interior);
        label.flip();
        assert_eq!(label.location(0, Position::Left), Location::Interior);
        assert_eq!(label.location(0, Position::Right), Location::Exterior);
        assert_eq!(label.location(0, Position::On), Location::Boundary);
    }

    #[test]
    fn merge_fills_missing_locations() {
        let mut label = Label::new(0, Location::Boundary, Location::None, Location::Interior);
        let other = Label::new(0, Location::Boundary, Location::Exterior, Location::Exterior);
        label.merge(&other);
        assert_eq!(label.location(0, Position::Left), Location::Exterior);
        // existing location is not overwritten
        assert_eq!(label.location(0, Position::Right), Location::Interior);
    }
}
