// SPDX-License-Identifier: MIT OR Apache-2.0
//! Command line errors.

use crate::args::USAGE;
use ordoplay_shader_compiler::{CompileError, SettingsError, UnknownBackend};
use ordoplay_shader_graph::GraphIoError;
use std::path::PathBuf;

/// Error type of the command line front end
#[derive(Debug, thiserror::Error)]
pub enum CliError {
    /// Bad command line
    #[error("{0}\n\n{USAGE}")]
    Usage(String),

    /// Backend name not recognized
    #[error(transparent)]
    Backend(#[from] UnknownBackend),

    /// Input file could not be read
    #[error("Failed to read {}: {source}", path.display())]
    Read {
        /// File being read
        path: PathBuf,
        /// Underlying error
        source: std::io::Error,
    },

    /// Output file could not be written
    #[error("Failed to write {}: {source}", path.display())]
    Write {
        /// File being written
        path: PathBuf,
        /// Underlying error
        source: std::io::Error,
    },

    /// Graph could not be decoded
    #[error(transparent)]
    Graph(#[from] GraphIoError),

    /// Settings could not be loaded
    #[error(transparent)]
    Settings(#[from] SettingsError),

    /// Compile failed
    #[error(transparent)]
    Compile(#[from] CompileError),

    /// RON encoding of the artifact failed
    #[error("Failed to encode artifact: {0}")]
    Ron(#[from] ron::Error),

    /// JSON encoding of the artifact failed
    #[error("Failed to encode artifact: {0}")]
    Json(#[from] serde_json::Error),

    /// Binary encoding of the artifact failed
    #[error("Failed to encode artifact: {0}")]
    Bincode(#[from] bincode::Error),
}
