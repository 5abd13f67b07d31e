// SPDX-License-Identifier: MIT OR Apache-2.0
//! Persistent front-end settings.
//!
//! Settings live in a RON file next to where the tool runs. A missing file
//! means defaults; a file written by a newer build is refused.

use crate::error::{AppError, Result};
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;
use std::path::{Path, PathBuf};

/// Current settings format version
pub const SETTINGS_VERSION: u32 = 1;

/// Settings file name
pub const SETTINGS_FILE_NAME: &str = "vecspace.ron";

/// Maximum number of recent files to track
const MAX_RECENT_FILES: usize = 10;

/// Text encoding used for snapshots
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum SnapshotFormat {
    /// Rusty Object Notation
    #[default]
    Ron,
    /// JSON
    Json,
}

impl SnapshotFormat {
    /// Format implied by a file extension
    pub fn from_path(path: &Path) -> Option<Self> {
        let extension = path.extension()?.to_str()?;
        match extension.to_ascii_lowercase().as_str() {
            "ron" => Some(Self::Ron),
            "json" => Some(Self::Json),
            _ => None,
        }
    }

    /// Conventional file extension
    pub fn extension(self) -> &'static str {
        match self {
            Self::Ron => "ron",
            Self::Json => "json",
        }
    }
}

/// Front-end settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppSettings {
    /// Settings format version
    pub version: u32,
    /// Default tracing filter; `RUST_LOG` takes precedence
    pub log_filter: String,
    /// Encoding for snapshot files whose extension says nothing
    pub snapshot_format: SnapshotFormat,
    /// Pretty-print written snapshots
    pub pretty: bool,
    /// Recently written snapshots, newest first
    pub recent_files: VecDeque<PathBuf>,
}

impl Default for AppSettings {
    fn default() -> Self {
        Self {
            version: SETTINGS_VERSION,
            log_filter: "vecspace_app=info,vecspace_graph=warn".to_string(),
            snapshot_format: SnapshotFormat::default(),
            pretty: true,
            recent_files: VecDeque::new(),
        }
    }
}

impl AppSettings {
    /// Load settings, falling back to defaults when the file does not exist
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let content = std::fs::read_to_string(path)?;
        let settings: AppSettings = ron::from_str(&content)?;

        // Version check
        if settings.version > SETTINGS_VERSION {
            return Err(AppError::SettingsVersion {
                found: settings.version,
                supported: SETTINGS_VERSION,
            });
        }

        Ok(settings)
    }

    /// Save settings to a file
    pub fn save(&self, path: &Path) -> Result<()> {
        let config = ron::ser::PrettyConfig::default()
            .struct_names(true)
            .enumerate_arrays(false);
        let content = ron::ser::to_string_pretty(self, config)?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Record a written file at the front of the recent list
    pub fn add_recent_file(&mut self, path: PathBuf) {
        self.recent_files.retain(|p| p != &path);
        self.recent_files.push_front(path);
        self.recent_files.truncate(MAX_RECENT_FILES);
    }

    /// Format for a path: its extension, else the configured default
    pub fn format_for(&self, path: &Path) -> SnapshotFormat {
        SnapshotFormat::from_path(path).unwrap_or(self.snapshot_format)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_default_settings() {
        let settings = AppSettings::default();
        assert_eq!(settings.version, SETTINGS_VERSION);
        assert_eq!(settings.snapshot_format, SnapshotFormat::Ron);
        assert!(settings.pretty);
        assert!(settings.recent_files.is_empty());
    }

    #[test]
    fn test_missing_file_gives_defaults() {
        let dir = tempdir().unwrap();
        let settings = AppSettings::load(&dir.path().join(SETTINGS_FILE_NAME)).unwrap();
        assert_eq!(settings, AppSettings::default());
    }

    #[test]
    fn test_save_and_load() {
        let dir = tempdir().unwrap();
        let path = dir.path().join(SETTINGS_FILE_NAME);
        let mut settings = AppSettings {
            log_filter: "debug".to_string(),
            snapshot_format: SnapshotFormat::Json,
            pretty: false,
            ..AppSettings::default()
        };
        settings.add_recent_file(PathBuf::from("graph.ron"));
        settings.save(&path).unwrap();

        assert_eq!(AppSettings::load(&path).unwrap(), settings);
    }

    #[test]
    fn test_partial_file_fills_defaults() {
        let dir = tempdir().unwrap();
        let path = dir.path().join(SETTINGS_FILE_NAME);
        std::fs::write(&path, "(pretty: false)").unwrap();

        let settings = AppSettings::load(&path).unwrap();
        assert!(!settings.pretty);
        assert_eq!(settings.log_filter, AppSettings::default().log_filter);
    }

    #[test]
    fn test_newer_version_is_refused() {
        let dir = tempdir().unwrap();
        let path = dir.path().join(SETTINGS_FILE_NAME);
        std::fs::write(&path, "(version: 99)").unwrap();

        assert!(matches!(
            AppSettings::load(&path),
            Err(AppError::SettingsVersion { found: 99, .. })
        ));
    }

    #[test]
    fn test_recent_files() {
        let mut settings = AppSettings::default();
        for i in 0..15 {
            settings.add_recent_file(PathBuf::from(format!("graph{i}.ron")));
        }
        assert_eq!(settings.recent_files.len(), MAX_RECENT_FILES);
        assert_eq!(settings.recent_files[0], PathBuf::from("graph14.ron"));

        // Re-adding moves to the front without duplicating
        settings.add_recent_file(PathBuf::from("graph10.ron"));
        assert_eq!(settings.recent_files.len(), MAX_RECENT_FILES);
        assert_eq!(settings.recent_files[0], PathBuf::from("graph10.ron"));
    }

    #[test]
    fn test_format_for_path() {
        let settings = AppSettings {
            snapshot_format: SnapshotFormat::Json,
            ..AppSettings::default()
        };
        assert_eq!(settings.format_for(Path::new("a.RON")), SnapshotFormat::Ron);
        assert_eq!(settings.format_for(Path::new("a.json")), SnapshotFormat::Json);
        assert_eq!(settings.format_for(Path::new("graph")), SnapshotFormat::Json);
        assert_eq!(SnapshotFormat::Json.extension(), "json");
    }
}
