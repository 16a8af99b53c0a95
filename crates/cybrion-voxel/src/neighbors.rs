//! Face directions and the six neighbor slots a chunk carries.

use glam::IVec3;

/// One of the six axis-aligned faces of a chunk.
///
/// Opposite faces are three positions apart in [`Direction::ALL`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Direction {
    /// +X
    East,
    /// +Y
    Top,
    /// +Z
    South,
    /// -X
    West,
    /// -Y
    Bottom,
    /// -Z
    North,
}

impl Direction {
    /// All directions in slot order.
    pub const ALL: [Direction; 6] = [
        Direction::East,
        Direction::Top,
        Direction::South,
        Direction::West,
        Direction::Bottom,
        Direction::North,
    ];

    /// Slot index of this direction in [`Direction::ALL`].
    pub fn index(self) -> usize {
        self as usize
    }

    /// The facing direction on the other side.
    pub fn opposite(self) -> Self {
        Self::ALL[(self.index() + 3) % 6]
    }

    /// Unit chunk-grid offset towards this face.
    pub fn offset(self) -> IVec3 {
        match self {
            Direction::East => IVec3::X,
            Direction::Top => IVec3::Y,
            Direction::South => IVec3::Z,
            Direction::West => IVec3::NEG_X,
            Direction::Bottom => IVec3::NEG_Y,
            Direction::North => IVec3::NEG_Z,
        }
    }
}

/// Six optional, non-owning handles to adjacent chunks.
///
/// `H` is whatever handle the owning chunk manager hands out. The slots are
/// plain data: nothing here resolves, validates or frees a handle.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Neighbors<H> {
    slots: [Option<H>; 6],
}

impl<H: Copy> Neighbors<H> {
    /// All six slots unset.
    pub fn new() -> Self {
        Self { slots: [None; 6] }
    }

    /// Handle stored for `direction`, if any.
    pub fn get(&self, direction: Direction) -> Option<H> {
        self.slots[direction.index()]
    }

    /// Stores (or with `None`, clears) the handle for `direction`.
    pub fn set(&mut self, direction: Direction, handle: Option<H>) {
        self.slots[direction.index()] = handle;
    }

    /// Clears every slot.
    pub fn clear(&mut self) {
        self.slots = [None; 6];
    }

    /// Number of slots currently set.
    pub fn linked(&self) -> usize {
        self.slots.iter().filter(|slot| slot.is_some()).count()
    }

    /// Iterates over `(direction, handle)` for every set slot.
    pub fn iter(&self) -> impl Iterator<Item = (Direction, H)> + '_ {
        Direction::ALL
            .into_iter()
            .filter_map(|direction| self.get(direction).map(|handle| (direction, handle)))
    }
}

impl<H: Copy> Default for Neighbors<H> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_opposites_pair_up() {
        for direction in Direction::ALL {
            assert_ne!(direction, direction.opposite());
            assert_eq!(direction.opposite().opposite(), direction);
            assert_eq!(direction.offset() + direction.opposite().offset(), IVec3::ZERO);
        }
        assert_eq!(Direction::East.opposite(), Direction::West);
        assert_eq!(Direction::Top.opposite(), Direction::Bottom);
        assert_eq!(Direction::South.opposite(), Direction::North);
    }

    #[test]
    fn test_slots_set_and_clear() {
        let mut neighbors: Neighbors<u32> = Neighbors::new();
        assert_eq!(neighbors.linked(), 0);

        neighbors.set(Direction::Top, Some(7));
        neighbors.set(Direction::North, Some(9));
        assert_eq!(neighbors.get(Direction::Top), Some(7));
        assert_eq!(neighbors.get(Direction::Bottom), None);
        assert_eq!(
            neighbors.iter().collect::<Vec<_>>(),
            vec![(Direction::Top, 7), (Direction::North, 9)]
        );

        neighbors.set(Direction::Top, None);
        assert_eq!(neighbors.linked(), 1);
        neighbors.clear();
        assert_eq!(neighbors.linked(), 0);
    }
}
