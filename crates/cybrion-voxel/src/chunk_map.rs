//! Owner of all loaded chunks, keyed by chunk-grid position.
//!
//! The [`ChunkMap`] is the authority that hands out neighbor handles. A handle
//! is simply the neighbor's grid position: it never owns the neighbor and is
//! resolved back through the map, so unloading a chunk can never leave a
//! dangling reference behind, only an unset slot.

use glam::{IVec3, UVec3};
use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};

use crate::chunk::{CHUNK_SIZE, ChunkData};
use crate::neighbors::Direction;
use crate::palette_table::PaletteError;
use crate::registry::{Block, BlockRegistry, BlockStateId};

/// A chunk whose neighbor handles are grid positions.
pub type GridChunk = ChunkData<IVec3>;

/// When [`ChunkMap::maintain`] rebuilds a chunk's palette.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompactionPolicy {
    /// Whether maintenance compacts at all.
    pub enabled: bool,
    /// Minimum number of unused palette entries before a chunk is rebuilt.
    pub min_stale_entries: usize,
}

impl CompactionPolicy {
    /// Returns `true` if a chunk with `stale` unused entries should be rebuilt.
    pub fn should_compact(&self, stale: usize) -> bool {
        self.enabled && stale > 0 && stale >= self.min_stale_entries
    }
}

impl Default for CompactionPolicy {
    fn default() -> Self {
        Self {
            enabled: true,
            min_stale_entries: 4,
        }
    }
}

/// Splits a world voxel coordinate into `(chunk grid position, in-chunk position)`.
pub fn split_world_pos(world: IVec3) -> (IVec3, UVec3) {
    let size = IVec3::splat(CHUNK_SIZE as i32);
    (world.div_euclid(size), world.rem_euclid(size).as_uvec3())
}

/// Owns every loaded chunk and keeps their neighbor slots consistent.
#[derive(Debug, Default)]
pub struct ChunkMap {
    chunks: FxHashMap<IVec3, GridChunk>,
}

impl ChunkMap {
    /// Creates an empty map with no loaded chunks.
    pub fn new() -> Self {
        Self {
            chunks: FxHashMap::default(),
        }
    }

    /// Inserts a chunk at its own grid position and links it with every loaded
    /// neighbor, in both directions.
    ///
    /// Returns the chunk previously loaded at that position, if any, with its
    /// neighbor slots cleared as [`unload`](Self::unload) would leave them.
    pub fn load(&mut self, mut chunk: GridChunk) -> Option<GridChunk> {
        let pos = chunk.position();
        for direction in Direction::ALL {
            let neighbor_pos = pos + direction.offset();
            let handle = match self.chunks.get_mut(&neighbor_pos) {
                Some(neighbor) => {
                    neighbor.set_neighbor(direction.opposite(), Some(pos));
                    Some(neighbor_pos)
                }
                None => None,
            };
            chunk.set_neighbor(direction, handle);
        }
        tracing::debug!(%pos, linked = chunk.neighbors().linked(), "chunk loaded");
        self.chunks.insert(pos, chunk).map(|mut previous| {
            previous.neighbors_mut().clear();
            previous
        })
    }

    /// Removes and returns the chunk at `pos`, clearing the slots that pointed
    /// at it in its neighbors.
    pub fn unload(&mut self, pos: IVec3) -> Option<GridChunk> {
        let mut chunk = self.chunks.remove(&pos)?;
        for (direction, handle) in chunk.neighbors().iter() {
            if let Some(neighbor) = self.chunks.get_mut(&handle) {
                neighbor.set_neighbor(direction.opposite(), None);
            }
        }
        chunk.neighbors_mut().clear();
        tracing::debug!(%pos, "chunk unloaded");
        Some(chunk)
    }

    /// Immutable access to a loaded chunk.
    pub fn get(&self, pos: IVec3) -> Option<&GridChunk> {
        self.chunks.get(&pos)
    }

    /// Mutable access to a loaded chunk.
    pub fn get_mut(&mut self, pos: IVec3) -> Option<&mut GridChunk> {
        self.chunks.get_mut(&pos)
    }

    /// Resolves a neighbor handle. Same as [`get`](Self::get).
    pub fn resolve(&self, handle: IVec3) -> Option<&GridChunk> {
        self.get(handle)
    }

    /// Follows the neighbor slot of the chunk at `pos` towards `direction`.
    pub fn neighbor(&self, pos: IVec3, direction: Direction) -> Option<&GridChunk> {
        self.get(pos)?
            .neighbor(direction)
            .and_then(|handle| self.resolve(handle))
    }

    /// Returns the block state at a world voxel coordinate, or `None` if the
    /// owning chunk is not loaded.
    pub fn get_state_world(&self, world: IVec3) -> Option<BlockStateId> {
        let (chunk_pos, local) = split_world_pos(world);
        self.get(chunk_pos).map(|chunk| chunk.get_state(local))
    }

    /// Returns the block at a world voxel coordinate, or `None` if the owning
    /// chunk is not loaded.
    pub fn get_block_world<'r>(
        &self,
        world: IVec3,
        registry: &'r BlockRegistry,
    ) -> Option<&'r Block> {
        self.get_state_world(world).map(|id| registry.block(id))
    }

    /// Reads `local` relative to the chunk at `pos`, stepping into the
    /// adjacent chunk through its neighbor slot when `local` lies one chunk
    /// over on a single axis.
    pub fn get_state_relative(&self, pos: IVec3, local: IVec3) -> Option<BlockStateId> {
        let chunk = self.get(pos)?;
        if let Some(state) = chunk.try_get_state(local) {
            return Some(state);
        }
        let size = IVec3::splat(CHUNK_SIZE as i32);
        let step = local.div_euclid(size);
        let direction = Direction::ALL
            .into_iter()
            .find(|direction| direction.offset() == step)?;
        let neighbor = self.resolve(chunk.neighbor(direction)?)?;
        neighbor.try_get_state(local - step * size)
    }

    /// Writes a block state at a world voxel coordinate.
    ///
    /// Returns `Ok(false)` if the owning chunk is not loaded.
    ///
    /// # Errors
    ///
    /// Returns [`PaletteError::InvalidStateId`] if `id` is out of range.
    pub fn set_state_world(&mut self, world: IVec3, id: BlockStateId) -> Result<bool, PaletteError> {
        let (chunk_pos, local) = split_world_pos(world);
        match self.get_mut(chunk_pos) {
            Some(chunk) => chunk.set_state(local, id).map(|()| true),
            None => Ok(false),
        }
    }

    /// Compacts every chunk that `policy` selects and returns how many were
    /// rebuilt.
    pub fn maintain(&mut self, policy: &CompactionPolicy) -> usize {
        if !policy.enabled {
            return 0;
        }
        let mut rebuilt = 0;
        for (pos, chunk) in self.chunks.iter_mut() {
            let stale = chunk.blocks().stale_entries();
            if policy.should_compact(stale) {
                let dropped = chunk.compact();
                tracing::debug!(%pos, dropped, width = chunk.bit_width(), "chunk palette rebuilt");
                rebuilt += 1;
            }
        }
        rebuilt
    }

    /// Number of currently loaded chunks.
    pub fn len(&self) -> usize {
        self.chunks.len()
    }

    /// Returns `true` if no chunk is loaded.
    pub fn is_empty(&self) -> bool {
        self.chunks.is_empty()
    }

    /// Iterates over all loaded chunk positions.
    pub fn positions(&self) -> impl Iterator<Item = IVec3> + '_ {
        self.chunks.keys().copied()
    }

    /// Iterates over all loaded chunks.
    pub fn iter(&self) -> impl Iterator<Item = (&IVec3, &GridChunk)> {
        self.chunks.iter()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
