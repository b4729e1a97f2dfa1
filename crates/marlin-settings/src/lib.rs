//! Persisted settings: the light color the user last confirmed.
//!
//! Three named integers (`hue`, `saturation`, `brightness`) in a TOML
//! file, each falling back to its default when absent. `Settings` is a
//! plain value: the application loads it once at startup, owns it, and
//! calls [`Settings::save`] at the points where the user confirms a
//! change. There is no global state and no implicit I/O.
//!
//! Loading is deliberately lenient. A missing, unreadable, or corrupt
//! settings file yields the defaults with a logged warning; a light
//! that refuses to turn on over a bad three-line config would be worse
//! than forgetting the color. Saving is strict and returns a typed
//! error.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use marlin_palette::Hsb;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// File name under the application's config directory.
const SETTINGS_FILE: &str = "settings.toml";

/// Directory name under the platform config root.
const APP_DIR: &str = "marlin-light";

// ─── Errors ─────────────────────────────────────────────────────────────────

/// Failure to persist settings.
#[derive(Debug, Error)]
pub enum SettingsError {
    /// Creating the parent directory or writing the file failed.
    #[error("failed to write settings to {}", path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// The settings value could not be serialized.
    #[error("failed to serialize settings")]
    Serialize(#[from] toml::ser::Error),
}

// ─── Settings ───────────────────────────────────────────────────────────────

/// The user's chosen light color, as persisted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Settings {
    /// Hue in degrees, `0..360`.
    #[serde(default = "default_hue")]
    pub hue: u16,

    /// Saturation in percent, `0..=100`.
    #[serde(default = "default_saturation")]
    pub saturation: u8,

    /// Brightness in percent, `0..=100`.
    #[serde(default = "default_brightness")]
    pub brightness: u8,
}

fn default_hue() -> u16 {
    Hsb::DEFAULT.hue
}

fn default_saturation() -> u8 {
    Hsb::DEFAULT.saturation
}

fn default_brightness() -> u8 {
    Hsb::DEFAULT.brightness
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            hue: default_hue(),
            saturation: default_saturation(),
            brightness: default_brightness(),
        }
    }
}

impl Settings {
    /// Load settings from `path`, falling back to defaults.
    ///
    /// Missing file: defaults, silently (first run). Unreadable or
    /// unparsable file: defaults, with a warning. Values outside their
    /// documented ranges are folded back in.
    #[must_use]
    pub fn load(path: &Path) -> Self {
        let text = match fs::read_to_string(path) {
            Ok(text) => text,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                tracing::debug!(path = %path.display(), "no settings file, using defaults");
                return Self::default();
            }
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "settings unreadable, using defaults");
                return Self::default();
            }
        };

        match toml::from_str::<Self>(&text) {
            Ok(settings) => {
                let settings = settings.sanitized();
                tracing::debug!(?settings, "settings loaded");
                settings
            }
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "settings corrupt, using defaults");
                Self::default()
            }
        }
    }

    /// Save settings to `path`, creating parent directories as needed.
    ///
    /// # Errors
    ///
    /// Returns [`SettingsError`] if serialization or any filesystem
    /// operation fails.
    pub fn save(&self, path: &Path) -> Result<(), SettingsError> {
        let text = toml::to_string(self)?;

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|source| SettingsError::Write {
                path: path.to_path_buf(),
                source,
            })?;
        }

        fs::write(path, text).map_err(|source| SettingsError::Write {
            path: path.to_path_buf(),
            source,
        })?;

        tracing::debug!(path = %path.display(), settings = ?self, "settings saved");
        Ok(())
    }

    /// The color these settings describe.
    #[must_use]
    pub fn color(&self) -> Hsb {
        Hsb::new(self.hue, self.saturation, self.brightness)
    }

    /// Fold out-of-range values from a hand-edited file back into range.
    fn sanitized(self) -> Self {
        Self {
            hue: self.hue % Hsb::MAX_HUE,
            saturation: self.saturation.min(Hsb::MAX_SATURATION),
            brightness: self.brightness.min(Hsb::MAX_BRIGHTNESS),
        }
    }

    /// The default settings file location:
    /// `<platform config dir>/marlin-light/settings.toml`.
    ///
    /// Falls back to the current directory when the platform has no
    /// config directory (containers, stripped-down environments).
    #[must_use]
    pub fn default_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(APP_DIR)
            .join(SETTINGS_FILE)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn temp_path(dir: &tempfile::TempDir) -> PathBuf {
        dir.path().join(SETTINGS_FILE)
    }

    // ── Defaults ──────────────────────────────────────────────────────

    #[test]
    fn defaults_are_the_documented_triple() {
        let s = Settings::default();
        assert_eq!(s.hue, 192);
        assert_eq!(s.saturation, 60);
        assert_eq!(s.brightness, 85);
    }

    #[test]
    fn missing_file_yields_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let s = Settings::load(&temp_path(&dir));
        assert_eq!(s, Settings::default());
    }

    #[test]
    fn empty_file_yields_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = temp_path(&dir);
        fs::write(&path, "").unwrap();
        assert_eq!(Settings::load(&path), Settings::default());
    }

    #[test]
    fn partial_file_fills_missing_keys_with_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = temp_path(&dir);
        fs::write(&path, "hue = 24\n").unwrap();

        let s = Settings::load(&path);
        assert_eq!(s.hue, 24);
        assert_eq!(s.saturation, 60);
        assert_eq!(s.brightness, 85);
    }

    #[test]
    fn corrupt_file_yields_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = temp_path(&dir);
        fs::write(&path, "hue = \"not a number\"").unwrap();
        assert_eq!(Settings::load(&path), Settings::default());
    }

    // ── Round trip ────────────────────────────────────────────────────

    #[test]
    fn save_then_load_round_trips() {
        let dir = tempfile::tempdir().unwrap();
        let path = temp_path(&dir);

        let saved = Settings {
            hue: 336,
            saturation: 60,
            brightness: 72,
        };
        saved.save(&path).unwrap();

        assert_eq!(Settings::load(&path), saved);
    }

    #[test]
    fn save_creates_parent_directories() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("deeper").join(SETTINGS_FILE);

        Settings::default().save(&path).unwrap();
        assert!(path.exists());
    }

    #[test]
    fn saved_file_names_all_three_keys() {
        let dir = tempfile::tempdir().unwrap();
        let path = temp_path(&dir);
        Settings::default().save(&path).unwrap();

        let text = fs::read_to_string(&path).unwrap();
        assert!(text.contains("hue"));
        assert!(text.contains("saturation"));
        assert!(text.contains("brightness"));
    }

    // ── Sanitizing ────────────────────────────────────────────────────

    #[test]
    fn out_of_range_hue_wraps() {
        let dir = tempfile::tempdir().unwrap();
        let path = temp_path(&dir);
        fs::write(&path, "hue = 400\n").unwrap();
        assert_eq!(Settings::load(&path).hue, 40);
    }

    #[test]
    fn out_of_range_percentages_clamp() {
        let dir = tempfile::tempdir().unwrap();
        let path = temp_path(&dir);
        fs::write(&path, "saturation = 250\nbrightness = 101\n").unwrap();

        let s = Settings::load(&path);
        assert_eq!(s.saturation, 100);
        assert_eq!(s.brightness, 100);
    }

    // ── Color composition ─────────────────────────────────────────────

    #[test]
    fn color_composes_the_stored_triple() {
        let s = Settings {
            hue: 120,
            saturation: 50,
            brightness: 90,
        };
        assert_eq!(s.color(), Hsb::new(120, 50, 90));
    }

    #[test]
    fn default_path_ends_with_app_file() {
        let path = Settings::default_path();
        assert!(path.ends_with(Path::new(APP_DIR).join(SETTINGS_FILE)));
    }
}
