//! Named parameter presets stored as a JSON array.
//!
//! The core treats each preset as an opaque parameter bag. Presets saved by
//! older builds may lack newer fields; those take their defaults on load.

use crate::error::ConfigError;
use crate::params::SimulationParameters;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

pub const DEFAULT_PRESET_PATH: &str = "presets.json";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Preset {
    pub name: String,
    #[serde(default)]
    pub params: SimulationParameters,
}

/// Preset collection bound to a file.
#[derive(Debug)]
pub struct PresetLibrary {
    path: PathBuf,
    presets: Vec<Preset>,
}

impl PresetLibrary {
    /// Load from `path`. A missing file is an empty library; a corrupt one is
    /// backed up and replaced by an empty library.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref().to_path_buf();
        if !path.exists() {
            return Ok(Self { path, presets: Vec::new() });
        }

        let contents = fs::read_to_string(&path).map_err(|error| ConfigError::FileSystem {
            operation: "read presets".to_string(),
            path: path.display().to_string(),
            error,
        })?;

        let presets = if contents.trim().is_empty() {
            Vec::new()
        } else {
            match serde_json::from_str(&contents) {
                Ok(presets) => presets,
                Err(e) => {
                    warn!("Failed to parse presets in {}, starting fresh: {}", path.display(), e);
                    backup_corrupt(&path, &contents);
                    Vec::new()
                }
            }
        };
        Ok(Self { path, presets })
    }

    pub fn presets(&self) -> &[Preset] {
        &self.presets
    }

    pub fn find(&self, name: &str) -> Option<&Preset> {
        self.presets.iter().find(|p| p.name == name)
    }

    /// Add a preset, replacing any preset with the same name, and persist.
    pub fn save(&mut self, name: &str, params: SimulationParameters) -> Result<(), ConfigError> {
        let preset = Preset { name: name.to_string(), params };
        match self.presets.iter_mut().find(|p| p.name == name) {
            Some(existing) => *existing = preset,
            None => self.presets.push(preset),
        }
        self.persist()?;
        info!("Saved preset '{name}'");
        Ok(())
    }

    /// Remove a preset by name and persist.
    pub fn delete(&mut self, name: &str) -> Result<(), ConfigError> {
        let before = self.presets.len();
        self.presets.retain(|p| p.name != name);
        if self.presets.len() == before {
            return Err(ConfigError::PresetNotFound(name.to_string()));
        }
        self.persist()?;
        info!("Deleted preset '{name}'");
        Ok(())
    }

    fn persist(&self) -> Result<(), ConfigError> {
        let path = self.path.display().to_string();
        let json = serde_json::to_string_pretty(&self.presets)
            .map_err(|error| ConfigError::Json { path: path.clone(), error })?;
        fs::write(&self.path, json).map_err(|error| ConfigError::FileSystem {
            operation: "write presets".to_string(),
            path,
            error,
        })
    }
}

fn backup_corrupt(path: &Path, contents: &str) {
    let backup = format!("{}.corrupt.{}", path.display(), chrono::Utc::now().timestamp());
    match fs::write(&backup, contents) {
        Ok(_) => warn!("Corrupt presets backed up to {}", backup),
        Err(e) => warn!("Could not back up corrupt presets: {}", e),
    }
}
