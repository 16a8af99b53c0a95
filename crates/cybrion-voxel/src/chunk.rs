//! Palette-compressed chunk storage for 32×32×32 voxel volumes.
//!
//! A [`ChunkData`] owns one [`LinearPalette`] covering every voxel of the chunk,
//! remembers where the chunk sits on the chunk grid, and carries six neighbor
//! handles that the owning chunk manager fills in. Coordinates are linearized
//! with x varying fastest so sweeps along the x-axis touch consecutive slots.

use glam::{IVec3, UVec3};

use crate::linear_palette::LinearPalette;
use crate::neighbors::{Direction, Neighbors};
use crate::palette_table::PaletteError;
use crate::registry::{Block, BlockRegistry, BlockStateId};

/// log2 of the chunk edge length.
pub const LOG_2_CHUNK_SIZE: u32 = 5;

/// Side length of a chunk in voxels.
pub const CHUNK_SIZE: usize = 1 << LOG_2_CHUNK_SIZE;

/// Total number of voxels in a chunk (32³).
pub const CHUNK_VOLUME: usize = CHUNK_SIZE * CHUNK_SIZE * CHUNK_SIZE;

static_assertions::const_assert!(CHUNK_SIZE.is_power_of_two());
static_assertions::const_assert_eq!(CHUNK_VOLUME, 32_768);

/// Largest grid coordinate magnitude whose world position fits in `i32`.
pub const MAX_GRID_COORD: i32 = i32::MAX / CHUNK_SIZE as i32;

/// Converts an in-chunk coordinate to its slot index (x fastest, then y, then z).
///
/// # Panics
///
/// Panics if any coordinate is outside `0..CHUNK_SIZE`, in every build. An
/// unchecked overflow would alias a different voxel.
pub fn pos_to_index(pos: UVec3) -> usize {
    assert!(
        pos.cmplt(UVec3::splat(CHUNK_SIZE as u32)).all(),
        "in-chunk position {pos} outside 0..{CHUNK_SIZE}"
    );
    pos.x as usize + pos.y as usize * CHUNK_SIZE + pos.z as usize * CHUNK_SIZE * CHUNK_SIZE
}

/// Returns `pos` as an in-chunk coordinate, or `None` if any component lies
/// outside `0..CHUNK_SIZE`.
pub fn local_pos(pos: IVec3) -> Option<UVec3> {
    let size = IVec3::splat(CHUNK_SIZE as i32);
    if pos.cmplt(IVec3::ZERO).any() || pos.cmpge(size).any() {
        return None;
    }
    Some(pos.as_uvec3())
}

/// Block storage, grid position and neighbor links of one chunk.
///
/// `H` is the neighbor handle type issued by the chunk manager.
#[derive(Clone, Debug)]
pub struct ChunkData<H> {
    /// One slot per voxel.
    blocks: LinearPalette,
    /// Position on the chunk grid.
    position: IVec3,
    /// Adjacent chunks, written by the chunk manager only.
    neighbors: Neighbors<H>,
}

impl<H: Copy> ChunkData<H> {
    /// Creates a chunk at grid `position` with every voxel set to `fill`.
    ///
    /// `state_count` is the block registry's dense id range.
    ///
    /// # Errors
    ///
    /// Returns [`PaletteError::InvalidStateId`] if `fill >= state_count`.
    pub fn new(position: IVec3, state_count: u32, fill: BlockStateId) -> Result<Self, PaletteError> {
        Ok(Self {
            blocks: LinearPalette::new(CHUNK_VOLUME, state_count, fill)?,
            position,
            neighbors: Neighbors::new(),
        })
    }

    /// Creates an all-air chunk sized for `registry`.
    pub fn new_air(position: IVec3, registry: &BlockRegistry) -> Self {
        Self {
            // Every registry holds air at id 0, so it is always in range.
            blocks: LinearPalette::uniform(CHUNK_VOLUME, registry.state_count(), BlockStateId::AIR),
            position,
            neighbors: Neighbors::new(),
        }
    }

    /// Converts an in-chunk coordinate to its slot index.
    pub fn pos_to_index(pos: UVec3) -> usize {
        pos_to_index(pos)
    }

    /// Returns the block state at `pos`.
    ///
    /// # Panics
    ///
    /// Panics if any coordinate of `pos` is outside `0..CHUNK_SIZE`.
    pub fn get_state(&self, pos: UVec3) -> BlockStateId {
        self.blocks.get(Self::pos_to_index(pos))
    }

    /// Returns the block state at `pos`, or `None` outside this chunk.
    pub fn try_get_state(&self, pos: IVec3) -> Option<BlockStateId> {
        local_pos(pos).map(|local| self.get_state(local))
    }

    /// Stores `id` at `pos`.
    ///
    /// # Panics
    ///
    /// Panics if any coordinate of `pos` is outside `0..CHUNK_SIZE`.
    ///
    /// # Errors
    ///
    /// Returns [`PaletteError::InvalidStateId`] if `id` is outside the
    /// registry range this chunk was created with.
    pub fn set_state(&mut self, pos: UVec3, id: BlockStateId) -> Result<(), PaletteError> {
        self.blocks.set(Self::pos_to_index(pos), id)
    }

    /// Returns the block at `pos`, resolved through `registry`.
    ///
    /// # Panics
    ///
    /// Panics if any coordinate of `pos` is outside `0..CHUNK_SIZE`.
    pub fn get_block<'r>(&self, pos: UVec3, registry: &'r BlockRegistry) -> &'r Block {
        registry.block(self.get_state(pos))
    }

    /// Returns the block at `pos`, or `None` if `pos` lies outside this chunk.
    ///
    /// Neighbor chunks are not consulted.
    pub fn try_get_block<'r>(&self, pos: IVec3, registry: &'r BlockRegistry) -> Option<&'r Block> {
        self.try_get_state(pos).map(|id| registry.block(id))
    }

    /// Stores `block` at `pos`.
    ///
    /// # Errors
    ///
    /// Returns [`PaletteError::InvalidStateId`] if the block's id is outside
    /// the registry range this chunk was created with.
    pub fn set_block(&mut self, pos: UVec3, block: &Block) -> Result<(), PaletteError> {
        self.set_state(pos, block.id)
    }

    /// Resets every voxel to `id` with a single-entry palette.
    ///
    /// # Errors
    ///
    /// Returns [`PaletteError::InvalidStateId`] if `id` is out of range; the
    /// chunk is left unchanged.
    pub fn fill(&mut self, id: BlockStateId) -> Result<(), PaletteError> {
        self.blocks = LinearPalette::new(CHUNK_VOLUME, self.blocks.state_count(), id)?;
        Ok(())
    }

    /// Replaces the block storage with a compacted copy and returns the number
    /// of palette entries dropped.
    pub fn compact(&mut self) -> usize {
        let before = self.blocks.palette_len();
        self.blocks = self.blocks.compacted();
        before - self.blocks.palette_len()
    }

    /// Position on the chunk grid.
    pub fn position(&self) -> IVec3 {
        self.position
    }

    /// World-space voxel coordinate of this chunk's `(0, 0, 0)` corner.
    ///
    /// Grid coordinates must lie within `-MAX_GRID_COORD..=MAX_GRID_COORD`
    /// for the result to fit in `i32`; outside that range the multiplication
    /// overflows (panicking in debug builds). Use
    /// [`checked_world_position`](Self::checked_world_position) for positions
    /// that may be out of range.
    pub fn world_position(&self) -> IVec3 {
        self.position * CHUNK_SIZE as i32
    }

    /// Like [`world_position`](Self::world_position), but returns `None`
    /// instead of overflowing.
    pub fn checked_world_position(&self) -> Option<IVec3> {
        let size = CHUNK_SIZE as i32;
        Some(IVec3::new(
            self.position.x.checked_mul(size)?,
            self.position.y.checked_mul(size)?,
            self.position.z.checked_mul(size)?,
        ))
    }

    /// Handle of the adjacent chunk towards `direction`, if linked.
    pub fn neighbor(&self, direction: Direction) -> Option<H> {
        self.neighbors.get(direction)
    }

    /// Stores or clears the neighbor handle towards `direction`.
    ///
    /// Called by the chunk manager when adjacency changes.
    pub fn set_neighbor(&mut self, direction: Direction, handle: Option<H>) {
        self.neighbors.set(direction, handle);
    }

    /// All six neighbor slots.
    pub fn neighbors(&self) -> &Neighbors<H> {
        &self.neighbors
    }

    /// Mutable access to the neighbor slots.
    pub fn neighbors_mut(&mut self) -> &mut Neighbors<H> {
        &mut self.neighbors
    }

    /// The underlying block storage.
    pub fn blocks(&self) -> &LinearPalette {
        &self.blocks
    }

    /// Returns the number of palette entries.
    pub fn palette_len(&self) -> usize {
        self.blocks.palette_len()
    }

    /// Returns the current bits per voxel.
    pub fn bit_width(&self) -> u8 {
        self.blocks.width()
    }

    /// Returns approximate memory used by voxel index storage (bytes).
    pub fn storage_bytes(&self) -> usize {
        self.blocks.storage_bytes()
    }
}

static_assertions::assert_impl_all!(ChunkData<IVec3>: Send, Sync);

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
