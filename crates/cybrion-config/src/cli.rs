//! Command-line argument parsing.

use std::path::PathBuf;

use clap::Parser;

use crate::Config;

/// Cybrion command-line arguments.
///
/// CLI values override settings loaded from `config.ron`.
#[derive(Parser, Debug, Default)]
#[command(name = "cybrion", about = "Cybrion voxel storage demo")]
pub struct CliArgs {
    /// Chunks loaded in each direction from the origin.
    #[arg(long)]
    pub chunk_radius: Option<u32>,

    /// Random edits applied to every chunk.
    #[arg(long)]
    pub edits: Option<u32>,

    /// Distinct block states used by the edits.
    #[arg(long)]
    pub distinct_blocks: Option<u32>,

    /// RNG seed.
    #[arg(long)]
    pub seed: Option<u64>,

    /// Enable or disable palette compaction.
    #[arg(long)]
    pub compaction: Option<bool>,

    /// Log level (error, warn, info, debug, trace).
    #[arg(long)]
    pub log_level: Option<String>,

    /// Path to config directory (overrides default location).
    #[arg(long)]
    pub config: Option<PathBuf>,
}

impl Config {
    /// Apply CLI overrides to a loaded config.
    pub fn apply_cli_overrides(&mut self, args: &CliArgs) {
        if let Some(radius) = args.chunk_radius {
            self.demo.chunk_radius = radius;
        }
        if let Some(edits) = args.edits {
            self.demo.edits_per_chunk = edits;
        }
        if let Some(distinct) = args.distinct_blocks {
            self.demo.distinct_blocks = distinct;
        }
        if let Some(seed) = args.seed {
            self.demo.seed = seed;
        }
        if let Some(enabled) = args.compaction {
            self.storage.compaction_enabled = enabled;
        }
        if let Some(ref level) = args.log_level {
            self.debug.log_level = level.clone();
        }
    }
}
