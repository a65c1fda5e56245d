//! Persisted application settings.

use std::fs::{self, File};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use log::{debug, warn};
use serde::{Deserialize, Serialize};

use crate::core::OctaveScheme;

const APP_DIR: &str = "photism";
const SETTINGS_FILE: &str = "settings.json";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct AppSettings {
    /// Directory the image dialog opens in.
    pub last_image_dir: Option<PathBuf>,
    /// Output device name; the system default when unset.
    pub output_device: Option<String>,
    pub octave_scheme: OctaveScheme,
}

impl AppSettings {
    pub fn settings_dir() -> Result<PathBuf> {
        let mut path = dirs::config_dir()
            .ok_or_else(|| anyhow::anyhow!("Could not find config directory"))?;
        path.push(APP_DIR);
        Ok(path)
    }

    pub fn settings_path() -> Result<PathBuf> {
        Ok(Self::settings_dir()?.join(SETTINGS_FILE))
    }

    /// Load from the config directory, falling back to defaults.
    pub fn load() -> Self {
        match Self::settings_path().and_then(|path| Self::load_from(&path)) {
            Ok(settings) => settings,
            Err(e) => {
                warn!("Using default settings: {:#}", e);
                Self::default()
            }
        }
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            debug!("No settings at {}", path.display());
            return Ok(Self::default());
        }
        let file = File::open(path)
            .with_context(|| format!("Failed to open {}", path.display()))?;
        serde_json::from_reader(file)
            .with_context(|| format!("Failed to parse {}", path.display()))
    }

    pub fn save(&self) -> Result<()> {
        self.save_to(&Self::settings_path()?)
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(dir) = path.parent() {
            fs::create_dir_all(dir)
                .with_context(|| format!("Failed to create {}", dir.display()))?;
        }
        let file = File::create(path)
            .with_context(|| format!("Failed to create {}", path.display()))?;
        serde_json::to_writer_pretty(file, self).context("Failed to write settings")?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn missing_file_gives_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let settings = AppSettings::load_from(&dir.path().join("nope.json")).unwrap();
        assert_eq!(settings, AppSettings::default());
        assert_eq!(settings.octave_scheme, OctaveScheme::TwoOctave);
    }

    #[test]
    fn save_then_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join(SETTINGS_FILE);
        let settings = AppSettings {
            last_image_dir: Some(PathBuf::from("/tmp/pictures")),
            output_device: Some("Speakers".to_string()),
            octave_scheme: OctaveScheme::Cycling,
        };

        settings.save_to(&path).unwrap();
        assert_eq!(AppSettings::load_from(&path).unwrap(), settings);
    }

    #[test]
    fn partial_files_fill_in_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(SETTINGS_FILE);
        fs::write(&path, r#"{ "octave_scheme": "Cycling" }"#).unwrap();

        let settings = AppSettings::load_from(&path).unwrap();
        assert_eq!(settings.octave_scheme, OctaveScheme::Cycling);
        assert_eq!(settings.output_device, None);
    }

    #[test]
    fn corrupt_files_are_errors() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(SETTINGS_FILE);
        fs::write(&path, "not json").unwrap();
        assert!(AppSettings::load_from(&path).is_err());
    }
}
