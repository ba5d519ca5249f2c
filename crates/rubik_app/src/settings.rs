// SPDX-License-Identifier: MIT OR Apache-2.0
//! Player settings.
//!
//! Stored as RON next to the working directory in [`SETTINGS_FILE_NAME`].

use rubik_sequencer::{Puzzle, DEFAULT_STEP_DURATION};
use rubik_solver::{SolverBuild, SolverConfig};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;
use thiserror::Error;

/// Current settings format version
pub const SETTINGS_FORMAT_VERSION: u32 = 1;

/// Settings file name
pub const SETTINGS_FILE_NAME: &str = "rubik.ron";

/// Errors loading or saving settings
#[derive(Debug, Error)]
pub enum SettingsError {
    /// Reading or writing the file failed
    #[error("Settings I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The file is not valid RON for [`Settings`]
    #[error("Invalid settings file: {0}")]
    Decode(#[from] ron::error::SpannedError),

    /// Serializing failed
    #[error("Failed to encode settings: {0}")]
    Encode(#[from] ron::Error),

    /// Written by a newer version
    #[error("Settings version {found} is newer than supported version {supported}")]
    UnsupportedVersion {
        /// Version in the file
        found: u32,
        /// Newest version this build reads
        supported: u32,
    },
}

/// Player settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Format version
    pub version: u32,
    /// Rotation animation length in milliseconds
    pub animation_ms: u64,
    /// Puzzle variant
    pub puzzle: Puzzle,
    /// Moves in the scramble played at startup
    pub initial_scramble: usize,
    /// Frame tick in milliseconds
    pub tick_ms: u64,
    /// Fixed scramble seed for reproducible runs
    #[serde(skip_serializing_if = "Option::is_none")]
    pub seed: Option<u64>,
    /// Solver process, if one is available
    #[serde(skip_serializing_if = "Option::is_none")]
    pub solver: Option<SolverConfig>,
    /// How to build the solver before starting it
    #[serde(skip_serializing_if = "Option::is_none")]
    pub solver_build: Option<SolverBuild>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            version: SETTINGS_FORMAT_VERSION,
            animation_ms: u64::try_from(DEFAULT_STEP_DURATION.as_millis()).unwrap_or(u64::MAX),
            puzzle: Puzzle::Standard,
            initial_scramble: 10,
            tick_ms: 16,
            seed: None,
            solver: None,
            solver_build: None,
        }
    }
}

impl Settings {
    /// Load settings, falling back to defaults when the file is missing
    pub fn load(path: &Path) -> Result<Self, SettingsError> {
        let content = match std::fs::read_to_string(path) {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::debug!("No settings at {path:?}, using defaults");
                return Ok(Self::default());
            }
            Err(e) => return Err(e.into()),
        };

        let settings: Settings = ron::from_str(&content)?;
        if settings.version > SETTINGS_FORMAT_VERSION {
            return Err(SettingsError::UnsupportedVersion {
                found: settings.version,
                supported: SETTINGS_FORMAT_VERSION,
            });
        }

        tracing::info!("Loaded settings from {path:?}");
        Ok(settings)
    }

    /// Save settings as pretty RON
    pub fn save(&self, path: &Path) -> Result<(), SettingsError> {
        let config = ron::ser::PrettyConfig::default()
            .struct_names(true)
            .enumerate_arrays(false);
        let content = ron::ser::to_string_pretty(self, config)?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Rotation animation length
    pub fn step_duration(&self) -> Duration {
        Duration::from_millis(self.animation_ms)
    }

    /// Frame tick
    pub fn tick(&self) -> Duration {
        Duration::from_millis(self.tick_ms.max(1))
    }
}
