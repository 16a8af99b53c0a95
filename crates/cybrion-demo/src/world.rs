//! Builds and edits the demo world.

use cybrion_config::DemoConfig;
use cybrion_voxel::{
    BlockProperties, BlockRegistry, BlockStateId, BlockStates, CHUNK_SIZE, ChunkMap, GridChunk,
    MAX_GRID_COORD, PaletteError, RegistryError, Transparency,
};
use glam::{IVec3, UVec3};
use rand::Rng;

/// Errors that abort the demo.
#[derive(Debug, thiserror::Error)]
pub enum DemoError {
    /// Building the block registry failed.
    #[error("registry setup failed: {0}")]
    Registry(#[from] RegistryError),

    /// A chunk rejected a block state.
    #[error("chunk edit failed: {0}")]
    Palette(#[from] PaletteError),

    /// The requested chunk radius does not fit the signed chunk grid.
    #[error("chunk radius {0} exceeds the grid limit of {max}", max = MAX_GRID_COORD)]
    RadiusTooLarge(u32),
}

/// Registers the demo block set and returns the registry together with the
/// placeable (non-air) states in id order.
pub fn build_registry() -> Result<(BlockRegistry, Vec<BlockStateId>), RegistryError> {
    let mut registry = BlockRegistry::new();
    let mut placeable = Vec::new();

    for (block_type, display_name) in [("stone", "Stone"), ("dirt", "Dirt"), ("grass", "Grass")] {
        let properties = BlockProperties {
            display_name: display_name.to_string(),
            ..Default::default()
        };
        placeable.push(registry.register(block_type, BlockStates::new(), properties)?);
    }

    for axis in ["x", "y", "z"] {
        let states = BlockStates::from([("axis".to_string(), axis.to_string())]);
        placeable.push(registry.register("log", states, BlockProperties::default())?);
    }
    registry.override_matching("log", &BlockStates::new(), |props| {
        props.display_name = "Log".to_string();
    });

    let glass = BlockProperties {
        display_name: "Glass".to_string(),
        transparency: Transparency::SemiTransparent,
        ..Default::default()
    };
    placeable.push(registry.register("glass", BlockStates::new(), glass)?);

    Ok((registry, placeable))
}

/// Loads an air-filled cube of `(2 * radius + 1)^3` chunks centered on the origin.
///
/// Returns the number of chunks loaded.
pub fn load_cube(
    map: &mut ChunkMap,
    registry: &BlockRegistry,
    radius: u32,
) -> Result<usize, DemoError> {
    let r = i32::try_from(radius)
        .ok()
        .filter(|&r| r <= MAX_GRID_COORD)
        .ok_or(DemoError::RadiusTooLarge(radius))?;
    let before = map.len();
    for z in -r..=r {
        for y in -r..=r {
            for x in -r..=r {
                map.load(GridChunk::new_air(IVec3::new(x, y, z), registry));
            }
        }
    }
    Ok(map.len() - before)
}

/// Applies `config.edits_per_chunk` random placements to every loaded chunk,
/// drawing from the first `config.distinct_blocks` placeable states.
///
/// Returns the number of writes performed.
pub fn scatter_edits(
    map: &mut ChunkMap,
    placeable: &[BlockStateId],
    config: &DemoConfig,
    rng: &mut impl Rng,
) -> Result<usize, DemoError> {
    let pool = &placeable[..placeable.len().min(config.distinct_blocks as usize)];
    if pool.is_empty() {
        return Ok(0);
    }

    let mut positions: Vec<IVec3> = map.positions().collect();
    positions.sort_by_key(|p| (p.z, p.y, p.x));

    let mut writes = 0;
    for pos in positions {
        let Some(chunk) = map.get_mut(pos) else {
            continue;
        };
        for _ in 0..config.edits_per_chunk {
            let local = UVec3::new(
                rng.gen_range(0..CHUNK_SIZE as u32),
                rng.gen_range(0..CHUNK_SIZE as u32),
                rng.gen_range(0..CHUNK_SIZE as u32),
            );
            let state = pool[rng.gen_range(0..pool.len())];
            chunk.set_state(local, state)?;
            writes += 1;
        }
    }
    Ok(writes)
}

/// Replaces every block of `state` with air in all loaded chunks, leaving
/// stale palette entries behind. Returns the number of replaced blocks.
pub fn excavate(map: &mut ChunkMap, state: BlockStateId) -> Result<usize, DemoError> {
    let mut positions: Vec<IVec3> = map.positions().collect();
    positions.sort_by_key(|p| (p.z, p.y, p.x));

    let mut removed = 0;
    for pos in positions {
        let Some(chunk) = map.get_mut(pos) else {
            continue;
        };
        if !chunk.blocks().contains(state) {
            continue;
        }
        for z in 0..CHUNK_SIZE as u32 {
            for y in 0..CHUNK_SIZE as u32 {
                for x in 0..CHUNK_SIZE as u32 {
                    let local = UVec3::new(x, y, z);
                    if chunk.get_state(local) == state {
                        chunk.set_state(local, BlockStateId::AIR)?;
                        removed += 1;
                    }
                }
            }
        }
    }
    Ok(removed)
}

/// Aggregate storage figures over all loaded chunks.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct WorldStats {
    pub chunks: usize,
    pub palette_entries: usize,
    pub stale_entries: usize,
    pub max_width: u8,
    pub storage_bytes: usize,
}

impl WorldStats {
    /// Collects statistics for every chunk in `map`.
    pub fn collect(map: &ChunkMap) -> Self {
        map.iter().fold(Self::default(), |mut stats, (_, chunk)| {
            stats.chunks += 1;
            stats.palette_entries += chunk.palette_len();
            stats.stale_entries += chunk.blocks().stale_entries();
            stats.max_width = stats.max_width.max(chunk.bit_width());
            stats.storage_bytes += chunk.storage_bytes();
            stats
        })
    }
}
