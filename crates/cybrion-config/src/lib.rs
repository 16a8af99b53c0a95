//! Configuration for the Cybrion voxel tools.
//!
//! Settings persist to disk as a RON file and can be overridden from the
//! command line. Unknown or missing fields fall back to defaults so old
//! config files keep loading.

mod cli;
mod config;
mod error;

pub use cli::CliArgs;
pub use config::{Config, DebugConfig, DemoConfig, StorageConfig, default_config_dir};
pub use error::ConfigError;
