//! Errors raised while persisting or loading `config.ron`.

use std::path::PathBuf;

/// Failure to load, save, or parse the configuration file.
///
/// I/O and parse failures carry the path involved so the message points at
/// the file the user has to fix.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// The config file exists but could not be read.
    #[error("failed to read config {}: {source}", path.display())]
    ReadError {
        /// File that was being read.
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The config directory or file could not be written.
    #[error("failed to write config {}: {source}", path.display())]
    WriteError {
        /// Directory or file that was being written.
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The file is not valid RON for [`Config`](crate::Config).
    #[error("failed to parse config {}: {source}", path.display())]
    ParseError {
        /// File that was being parsed.
        path: PathBuf,
        #[source]
        source: ron::error::SpannedError,
    },

    /// The in-memory config could not be encoded as RON.
    #[error("failed to serialize config: {0}")]
    SerializeError(#[source] ron::Error),
}
