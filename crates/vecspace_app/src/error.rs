// SPDX-License-Identifier: MIT OR Apache-2.0
//! Errors surfaced by the command-line front end.

use thiserror::Error;
use vecspace_graph::GraphError;

/// Errors from settings, commands and snapshot files
#[derive(Debug, Error)]
pub enum AppError {
    /// File system error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Graph engine error
    #[error(transparent)]
    Graph(#[from] GraphError),

    /// Settings file could not be parsed
    #[error("Invalid settings file: {0}")]
    SettingsDecode(#[from] ron::error::SpannedError),

    /// Text encoding failed
    #[error("RON encoding error: {0}")]
    RonEncode(#[from] ron::Error),

    /// JSON encoding failed
    #[error("JSON encoding error: {0}")]
    Json(#[from] serde_json::Error),

    /// Settings written by a newer build
    #[error("Settings version {found} is newer than supported version {supported}")]
    SettingsVersion {
        /// Version in the file
        found: u32,
        /// Highest version this build reads
        supported: u32,
    },
}

/// Result type for app operations
pub type Result<T> = std::result::Result<T, AppError>;
