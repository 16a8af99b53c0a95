//! Demo binary that fills a small world with palette-compressed chunks.
//!
//! Configuration is loaded from `config.ron` and can be overridden via CLI flags.
//! Run with `cargo run -p cybrion-demo -- --chunk-radius 2 --edits 4096`.

mod world;

use std::path::PathBuf;

use clap::Parser;
use cybrion_config::{CliArgs, Config, StorageConfig, default_config_dir};
use cybrion_voxel::{CHUNK_VOLUME, ChunkMap, CompactionPolicy};
use rand::SeedableRng;
use rand_xoshiro::Xoshiro256StarStar;
use tracing::{error, info};

use crate::world::{DemoError, WorldStats};

fn compaction_policy(storage: &StorageConfig) -> CompactionPolicy {
    CompactionPolicy {
        enabled: storage.compaction_enabled,
        min_stale_entries: storage.compaction_min_stale,
    }
}

fn log_stats(label: &str, stats: &WorldStats) {
    // Baseline: one u32 per block without a palette.
    let unpacked = stats.chunks * CHUNK_VOLUME * std::mem::size_of::<u32>();
    info!(
        chunks = stats.chunks,
        palette_entries = stats.palette_entries,
        stale_entries = stats.stale_entries,
        max_width = stats.max_width,
        storage_bytes = stats.storage_bytes,
        unpacked_bytes = unpacked,
        "{label}"
    );
}

fn run(config: &Config) -> Result<(), DemoError> {
    let (registry, placeable) = world::build_registry()?;
    info!(states = registry.state_count(), "Block registry ready");
    for block in registry.iter() {
        tracing::debug!(id = %block.id, block_type = %block.block_type, states = ?block.states);
    }

    let mut map = ChunkMap::new();
    let loaded = world::load_cube(&mut map, &registry, config.demo.chunk_radius)?;
    info!(loaded, radius = config.demo.chunk_radius, "Loaded chunk cube");
    log_stats("Loaded air chunks", &WorldStats::collect(&map));

    let mut rng = Xoshiro256StarStar::seed_from_u64(config.demo.seed);
    let writes = world::scatter_edits(&mut map, &placeable, &config.demo, &mut rng)?;
    info!(writes, seed = config.demo.seed, "Applied random edits");
    log_stats("After edits", &WorldStats::collect(&map));

    // Dig out the first placeable block type everywhere.
    if let Some(&dug) = placeable.first() {
        let removed = world::excavate(&mut map, dug)?;
        info!(removed, block = %registry.block(dug).block_type, "Excavated");
    }
    log_stats("After excavation", &WorldStats::collect(&map));

    let rebuilt = map.maintain(&compaction_policy(&config.storage));
    info!(rebuilt, "Maintenance finished");
    log_stats("After maintenance", &WorldStats::collect(&map));
    Ok(())
}

fn main() {
    let args = CliArgs::parse();

    let config_dir = args
        .config
        .clone()
        .or_else(default_config_dir)
        .unwrap_or_else(|| PathBuf::from(".cybrion"));

    let mut config = Config::load_or_create(&config_dir).unwrap_or_else(|e| {
        eprintln!("Failed to load config: {e}, using defaults");
        Config::default()
    });
    config.apply_cli_overrides(&args);

    let log_dir = config_dir.join("logs");
    cybrion_log::init_logging(Some(&log_dir), cfg!(debug_assertions), Some(&config));

    if let Err(e) = run(&config) {
        error!("Demo failed: {e}");
        std::process::exit(1);
    }
}
