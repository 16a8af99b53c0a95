//! Per-chunk bijection between external [`BlockStateId`]s and compact local
//! palette indices.
//!
//! The table is append-only: an id keeps the index it was first given for as
//! long as the table lives, so packed indices written earlier stay valid.

use rustc_hash::FxHashMap;
use thiserror::Error;

use crate::registry::BlockStateId;

/// Errors raised when a palette is asked to hold an id it cannot represent.
#[derive(Clone, Copy, Debug, Error, PartialEq, Eq)]
pub enum PaletteError {
    /// The id is outside the registry's dense range.
    #[error("block state id {id} is outside the registry range 0..{state_count}")]
    InvalidStateId {
        /// The rejected id.
        id: BlockStateId,
        /// Number of states known when the palette was created.
        state_count: u32,
    },
}

/// Ordered list of distinct block states plus a reverse lookup.
#[derive(Clone, Debug)]
pub struct PaletteTable {
    /// `entries[i]` is the state stored under local index `i`.
    entries: Vec<BlockStateId>,
    /// Reverse lookup: state → local index.
    reverse: FxHashMap<BlockStateId, u32>,
    /// Exclusive upper bound on accepted ids.
    state_count: u32,
}

impl PaletteTable {
    /// Creates an empty table accepting ids in `0..state_count`.
    pub fn new(state_count: u32) -> Self {
        Self {
            entries: Vec::new(),
            reverse: FxHashMap::default(),
            state_count,
        }
    }

    /// Returns the local index of `id`, appending it if it is not present yet.
    ///
    /// # Errors
    ///
    /// Returns [`PaletteError::InvalidStateId`] without touching the table if
    /// `id >= state_count`.
    pub fn index_of(&mut self, id: BlockStateId) -> Result<u32, PaletteError> {
        self.validate(id)?;
        Ok(self.insert(id))
    }

    /// Checks that `id` lies in the accepted range.
    pub fn validate(&self, id: BlockStateId) -> Result<(), PaletteError> {
        if id.0 >= self.state_count {
            return Err(PaletteError::InvalidStateId {
                id,
                state_count: self.state_count,
            });
        }
        Ok(())
    }

    /// Lookup-or-insert for ids already known to be in range.
    pub(crate) fn insert(&mut self, id: BlockStateId) -> u32 {
        if let Some(&index) = self.reverse.get(&id) {
            return index;
        }
        let index = self.entries.len() as u32;
        self.entries.push(id);
        self.reverse.insert(id, index);
        tracing::trace!(%id, index, "palette entry added");
        index
    }

    /// Returns the local index of `id` without inserting it.
    pub fn find(&self, id: BlockStateId) -> Option<u32> {
        self.reverse.get(&id).copied()
    }

    /// Returns the state stored under `index`.
    ///
    /// # Panics
    ///
    /// Panics if `index >= len()`.
    pub fn state_at(&self, index: u32) -> BlockStateId {
        self.entries[index as usize]
    }

    /// Returns the state stored under `index`, or `None` past the end.
    pub fn get(&self, index: u32) -> Option<BlockStateId> {
        self.entries.get(index as usize).copied()
    }

    /// Number of distinct states in the table.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns `true` if no state has been inserted yet.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Entries in local-index order.
    pub fn entries(&self) -> &[BlockStateId] {
        &self.entries
    }

    /// Exclusive upper bound on accepted ids.
    pub fn state_count(&self) -> u32 {
        self.state_count
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_index_of_appends_in_first_seen_order() {
        let mut table = PaletteTable::new(100);
        assert_eq!(table.index_of(BlockStateId(40)), Ok(0));
        assert_eq!(table.index_of(BlockStateId(7)), Ok(1));
        assert_eq!(table.index_of(BlockStateId(99)), Ok(2));
        assert_eq!(table.entries(), &[BlockStateId(40), BlockStateId(7), BlockStateId(99)]);
    }

    #[test]
    fn test_index_of_existing_is_stable() {
        let mut table = PaletteTable::new(10);
        table.index_of(BlockStateId(3)).unwrap();
        table.index_of(BlockStateId(5)).unwrap();
        assert_eq!(table.index_of(BlockStateId(3)), Ok(0));
        assert_eq!(table.index_of(BlockStateId(5)), Ok(1));
        assert_eq!(table.len(), 2);
    }

    #[test]
    fn test_state_at_reverses_index_of() {
        let mut table = PaletteTable::new(1000);
        for raw in (0..1000).step_by(37) {
            let index = table.index_of(BlockStateId(raw)).unwrap();
            assert_eq!(table.state_at(index), BlockStateId(raw));
            assert_eq!(table.find(BlockStateId(raw)), Some(index));
        }
        assert_eq!(table.get(table.len() as u32), None);
    }

    #[test]
    fn test_out_of_range_id_rejected_without_growth() {
        let mut table = PaletteTable::new(4);
        table.index_of(BlockStateId(0)).unwrap();
        let result = table.index_of(BlockStateId(4));
        assert_eq!(
            result,
            Err(PaletteError::InvalidStateId {
                id: BlockStateId(4),
                state_count: 4
            })
        );
        assert_eq!(table.len(), 1);
        assert_eq!(table.find(BlockStateId(4)), None);
    }

    #[test]
    fn test_palette_never_exceeds_state_count() {
        let mut table = PaletteTable::new(8);
        for raw in 0..20 {
            let _ = table.index_of(BlockStateId(raw % 12));
        }
        assert_eq!(table.len(), 8);
    }
}
