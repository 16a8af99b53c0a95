//! Palette-compressed slot storage.
//!
//! [`LinearPalette`] pairs a [`PaletteTable`] with a [`BitPackedArray`] so that
//! callers read and write [`BlockStateId`]s per slot while the container keeps
//! only `ceil(log2(palette size))` bits per slot. The packed width grows on the
//! write that first needs it and never shrinks; [`LinearPalette::compacted`]
//! builds a fresh container when stale entries should be dropped.

use crate::bit_packed::{BitPackedArray, width_for};
use crate::palette_table::{PaletteError, PaletteTable};
use crate::registry::BlockStateId;

/// Fixed-length sequence of block states, stored as packed palette indices.
#[derive(Clone, Debug)]
pub struct LinearPalette {
    /// Local index ↔ state mapping.
    table: PaletteTable,
    /// One packed palette index per slot.
    indices: BitPackedArray,
}

impl LinearPalette {
    /// Creates a container of `slot_count` slots, all holding `fill`.
    ///
    /// `state_count` is the registry's dense id range; ids at or above it are
    /// rejected by every write.
    ///
    /// # Errors
    ///
    /// Returns [`PaletteError::InvalidStateId`] if `fill >= state_count`.
    pub fn new(
        slot_count: usize,
        state_count: u32,
        fill: BlockStateId,
    ) -> Result<Self, PaletteError> {
        let mut table = PaletteTable::new(state_count);
        table.index_of(fill)?;
        Ok(Self {
            table,
            indices: BitPackedArray::new(0, slot_count),
        })
    }

    /// Creates a container holding `fill` in every slot, for a `fill` the
    /// caller has already checked against `state_count`.
    pub(crate) fn uniform(slot_count: usize, state_count: u32, fill: BlockStateId) -> Self {
        let mut table = PaletteTable::new(state_count);
        table.insert(fill);
        Self {
            table,
            indices: BitPackedArray::new(0, slot_count),
        }
    }

    /// Returns the state stored in `slot`.
    ///
    /// # Panics
    ///
    /// Panics if `slot >= len()` in debug builds.
    pub fn get(&self, slot: usize) -> BlockStateId {
        self.table.state_at(self.indices.get(slot))
    }

    /// Stores `id` in `slot`, growing the palette and repacking if needed.
    ///
    /// # Errors
    ///
    /// Returns [`PaletteError::InvalidStateId`] if `id` is outside the
    /// registry range. Nothing is modified in that case.
    pub fn set(&mut self, slot: usize, id: BlockStateId) -> Result<(), PaletteError> {
        let index = match self.table.index_of(id) {
            Ok(index) => index,
            Err(err) => {
                tracing::warn!(%id, slot, "rejected block state outside registry range");
                return Err(err);
            }
        };

        if u64::from(index) >= self.indices.capacity() {
            let new_width = width_for(self.table.len());
            tracing::debug!(
                old_width = self.indices.width(),
                new_width,
                palette_len = self.table.len(),
                "repacking palette indices"
            );
            self.indices.resize_width(new_width);
        }

        self.indices.set(slot, index);
        Ok(())
    }

    /// Returns the number of slots.
    pub fn len(&self) -> usize {
        self.indices.len()
    }

    /// Returns `true` if the container has no slots.
    pub fn is_empty(&self) -> bool {
        self.indices.is_empty()
    }

    /// Returns the current bits per slot.
    pub fn width(&self) -> u8 {
        self.indices.width()
    }

    /// Returns the number of palette entries, including stale ones.
    pub fn palette_len(&self) -> usize {
        self.table.len()
    }

    /// Returns the palette entries in local-index order.
    pub fn palette(&self) -> &[BlockStateId] {
        self.table.entries()
    }

    /// Returns the palette table.
    pub fn table(&self) -> &PaletteTable {
        &self.table
    }

    /// Returns the packed index array.
    pub fn indices(&self) -> &BitPackedArray {
        &self.indices
    }

    /// Exclusive upper bound on accepted ids.
    pub fn state_count(&self) -> u32 {
        self.table.state_count()
    }

    /// Returns `true` if `id` has a palette entry (used or stale).
    pub fn contains(&self, id: BlockStateId) -> bool {
        self.table.find(id).is_some()
    }

    /// Bytes used by the packed indices (not counting the palette).
    pub fn storage_bytes(&self) -> usize {
        self.indices.storage_bytes()
    }

    /// Iterates over every slot's state in slot order.
    pub fn iter(&self) -> impl Iterator<Item = BlockStateId> + '_ {
        self.indices.iter().map(|index| self.table.state_at(index))
    }

    /// Counts palette entries that no slot references anymore.
    ///
    /// Scans every slot.
    pub fn stale_entries(&self) -> usize {
        if self.indices.width() == 0 {
            return 0;
        }
        let mut used = vec![false; self.table.len()];
        for index in self.indices.iter() {
            used[index as usize] = true;
        }
        used.iter().filter(|&&u| !u).count()
    }

    /// Builds a new container holding the same states with stale palette
    /// entries dropped and the minimal width for what remains.
    ///
    /// Surviving entries are numbered in order of first appearance by slot.
    /// `self` is left unchanged.
    pub fn compacted(&self) -> Self {
        if self.indices.width() == 0 {
            return self.clone();
        }

        let mut remap: Vec<Option<u32>> = vec![None; self.table.len()];
        let mut table = PaletteTable::new(self.table.state_count());
        for index in self.indices.iter() {
            let entry = &mut remap[index as usize];
            if entry.is_none() {
                *entry = Some(table.insert(self.table.state_at(index)));
            }
        }

        let mut indices = BitPackedArray::new(width_for(table.len()), self.indices.len());
        if indices.width() > 0 {
            for (slot, index) in self.indices.iter().enumerate() {
                indices.set(slot, remap[index as usize].unwrap_or_default());
            }
        }

        tracing::debug!(
            old_palette_len = self.table.len(),
            new_palette_len = table.len(),
            old_width = self.indices.width(),
            new_width = indices.width(),
            "compacted palette"
        );
        Self { table, indices }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use rand::{Rng, SeedableRng};
    use rand_xoshiro::Xoshiro256StarStar;

    use super::*;

    fn id(raw: u32) -> BlockStateId {
        BlockStateId(raw)
    }

    #[test]
    fn test_new_is_uniform_and_zero_width() {
        let palette = LinearPalette::new(4096, 10, id(3)).unwrap();
        assert_eq!(palette.palette_len(), 1);
        assert_eq!(palette.width(), 0);
        assert_eq!(palette.storage_bytes(), 0);
        assert!(palette.iter().all(|s| s == id(3)));
    }

    #[test]
    fn test_new_rejects_invalid_fill() {
        let result = LinearPalette::new(16, 4, id(4));
        assert!(matches!(result, Err(PaletteError::InvalidStateId { .. })));
    }

    #[test]
    fn test_set_same_state_on_uniform_stays_zero_width() {
        let mut palette = LinearPalette::new(4096, 10, id(0)).unwrap();
        for slot in 0..4096 {
            palette.set(slot, id(0)).unwrap();
        }
        assert_eq!(palette.palette_len(), 1);
        assert_eq!(palette.width(), 0);
    }

    #[test]
    fn test_width_grows_exactly_at_powers_of_two() {
        let mut palette = LinearPalette::new(1024, 1024, id(0)).unwrap();
        for raw in 1..600u32 {
            palette.set(raw as usize, id(raw)).unwrap();
            let expected = width_for(raw as usize + 1);
            assert_eq!(palette.width(), expected, "after inserting {raw}");
        }
        assert_eq!(palette.width(), 10);
    }

    #[test]
    fn test_invalid_state_leaves_palette_untouched() {
        let mut palette = LinearPalette::new(64, 8, id(0)).unwrap();
        palette.set(1, id(5)).unwrap();
        let before: Vec<_> = palette.iter().collect();

        let result = palette.set(2, id(8));
        assert_eq!(
            result,
            Err(PaletteError::InvalidStateId {
                id: id(8),
                state_count: 8
            })
        );
        assert_eq!(palette.palette_len(), 2);
        assert_eq!(palette.width(), 1);
        assert_eq!(palette.iter().collect::<Vec<_>>(), before);
    }

    #[test]
    fn test_randomized_roundtrip_against_reference() {
        let mut rng = Xoshiro256StarStar::seed_from_u64(0xC0FFEE);
        let slots = 2000;
        let mut palette = LinearPalette::new(slots, 300, id(0)).unwrap();
        let mut reference = vec![id(0); slots];
        let mut last_width = 0;

        for _ in 0..20_000 {
            let slot = rng.gen_range(0..slots);
            let state = id(rng.gen_range(0..300));
            palette.set(slot, state).unwrap();
            reference[slot] = state;

            assert_eq!(palette.get(slot), state);
            assert!(palette.width() >= last_width, "width shrank");
            assert_eq!(palette.width(), width_for(palette.palette_len()));
            last_width = palette.width();
        }

        for (slot, expected) in reference.iter().enumerate() {
            assert_eq!(palette.get(slot), *expected, "slot {slot}");
        }
        assert!(palette.palette_len() <= 300);
    }

    #[test]
    fn test_stale_entries_counted() {
        let mut palette = LinearPalette::new(64, 16, id(0)).unwrap();
        palette.set(0, id(1)).unwrap();
        palette.set(1, id(2)).unwrap();
        assert_eq!(palette.stale_entries(), 0);

        palette.set(0, id(0)).unwrap();
        assert_eq!(palette.stale_entries(), 1);
        palette.set(1, id(0)).unwrap();
        assert_eq!(palette.stale_entries(), 2);
    }

    #[test]
    fn test_compacted_drops_stale_entries_and_shrinks_width() {
        let mut palette = LinearPalette::new(256, 64, id(0)).unwrap();
        for raw in 1..20u32 {
            palette.set(raw as usize, id(raw)).unwrap();
        }
        assert_eq!(palette.width(), 5);

        for raw in 1..19usize {
            palette.set(raw, id(0)).unwrap();
        }

        let compacted = palette.compacted();
        assert_eq!(compacted.palette(), &[id(0), id(19)]);
        assert_eq!(compacted.width(), 1);
        assert_eq!(compacted.iter().collect::<Vec<_>>(), palette.iter().collect::<Vec<_>>());

        // The source keeps its width.
        assert_eq!(palette.width(), 5);
        assert_eq!(palette.palette_len(), 20);
    }

    #[test]
    fn test_compacted_to_single_state_is_zero_width() {
        let mut palette = LinearPalette::new(128, 8, id(0)).unwrap();
        palette.set(5, id(7)).unwrap();
        for slot in 0..128 {
            palette.set(slot, id(7)).unwrap();
        }
        let compacted = palette.compacted();
        assert_eq!(compacted.palette(), &[id(7)]);
        assert_eq!(compacted.width(), 0);
        assert_eq!(compacted.storage_bytes(), 0);
        assert!(compacted.iter().all(|s| s == id(7)));

        // Compacted containers keep accepting writes.
        let mut compacted = compacted;
        compacted.set(3, id(1)).unwrap();
        assert_eq!(compacted.get(3), id(1));
        assert_eq!(compacted.get(4), id(7));
    }
}
