/// A side of an edge: on it, to its left, or to its right (relative to the
/// edge direction).
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Position {
    On,
    Left,
    Right,
}

impl Position {
    /// Left <-> Right; On maps to itself.
    pub fn opposite(self) -> Position {
        match self {
            Position::Left => Position::Right,
            Position::Right => Position::Left,
            Position::On => Position::On,
        }
    }

    /// Index into per-side arrays: Left = 0, Right = 1.
    /// Only valid for the two side positions.
    pub(crate) fn side_index(self) -> usize {
        match self {
            Position::Left => 0,
            Position::Right => 1,
            Position::On => panic!("Position::On has no side index"),
        }
    }
}
