//! Palette-compressed voxel block storage.
//!
//! A chunk stores one block state per voxel as a packed index into a small
//! per-chunk palette, so chunks made of a handful of distinct blocks cost a
//! few bits per voxel instead of a full id. The layers, leaves first:
//!
//! - [`BitPackedArray`]: fixed-length array of `width`-bit integers.
//! - [`PaletteTable`]: append-only `BlockStateId` ↔ local index mapping.
//! - [`LinearPalette`]: the two combined into slot → `BlockStateId` storage.
//! - [`ChunkData`]: one `LinearPalette` per chunk plus grid position and
//!   neighbor handles.
//!
//! [`BlockRegistry`] and [`ChunkMap`] are the surrounding collaborators that
//! issue block state ids and own loaded chunks.
//!
//! Nothing here locks. Mutation takes `&mut self`, so a repack triggered by a
//! write can never interleave with another access to the same chunk.

pub mod bit_packed;
pub mod chunk;
pub mod chunk_map;
pub mod linear_palette;
pub mod neighbors;
pub mod palette_table;
pub mod registry;

pub use bit_packed::BitPackedArray;
pub use chunk::{
    CHUNK_SIZE, CHUNK_VOLUME, ChunkData, LOG_2_CHUNK_SIZE, MAX_GRID_COORD, local_pos, pos_to_index,
};
pub use chunk_map::{ChunkMap, CompactionPolicy, GridChunk, split_world_pos};
pub use linear_palette::LinearPalette;
pub use neighbors::{Direction, Neighbors};
pub use palette_table::{PaletteError, PaletteTable};
pub use registry::{
    Block, BlockProperties, BlockRegistry, BlockStateId, BlockStates, RegistryError, Transparency,
};
