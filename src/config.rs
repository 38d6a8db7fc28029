//! Application settings, loaded through Figment.
//!
//! Settings are layered from (in order of precedence):
//! 1. Environment variables prefixed with `LEDCUBE_` (nested keys use a
//!    double underscore: `LEDCUBE_WINDOW__FULLSCREEN=true`)
//! 2. A TOML settings file (default: `config/ledcube.toml`, falling back to
//!    `ledcube/ledcube.toml` under the platform config directory)
//! 3. Built-in defaults
//!
//! Every field has a default, so the binary runs with no settings file at
//! all. After extraction the settings are validated once; semantically
//! invalid values (an unknown log level, a zero-sized window) fail fast
//! with a descriptive error instead of misbehaving later.
//!
//! # Example
//!
//! ```no_run
//! use ledcube_touch::config::Settings;
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let settings = Settings::load()?;
//!     println!("Catalogue: {}", settings.catalog_path.display());
//!     println!("Log level: {}", settings.log_level);
//!     Ok(())
//! }
//! ```

use std::path::{Path, PathBuf};

use figment::{
    providers::{Env, Format, Toml},
    Figment,
};
use log::LevelFilter;
use serde::{Deserialize, Serialize};

use crate::error::{AppError, AppResult};
use crate::selection::SubmitPolicy;

/// Settings file looked up relative to the working directory.
pub const DEFAULT_CONFIG_FILE: &str = "config/ledcube.toml";

/// Top-level application settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Logging level (trace, debug, info, warn, error).
    pub log_level: String,
    /// Path to the selection catalogue JSON file.
    pub catalog_path: PathBuf,
    /// Submission policy for the events form.
    pub submit_policy: SubmitPolicy,
    /// Window geometry.
    pub window: WindowSettings,
    /// Optional asset locations.
    pub assets: AssetSettings,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            catalog_path: PathBuf::from("config/select.json"),
            submit_policy: SubmitPolicy::default(),
            window: WindowSettings::default(),
            assets: AssetSettings::default(),
        }
    }
}

/// Window geometry and mode.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct WindowSettings {
    /// Initial window width in logical points.
    pub width: f32,
    /// Initial window height in logical points.
    pub height: f32,
    /// Start fullscreen (the usual mode on the touchscreen itself).
    pub fullscreen: bool,
}

impl Default for WindowSettings {
    fn default() -> Self {
        // Matches the 800x480 panel the kiosk runs on.
        Self {
            width: 800.0,
            height: 480.0,
            fullscreen: false,
        }
    }
}

/// Locations of optional display assets.
///
/// Both assets degrade gracefully: a missing logo renders as a text title,
/// a missing font leaves the built-in egui fonts in place (losing some
/// Greek glyph coverage) with a warning in the log.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AssetSettings {
    /// Logo image shown on the menu screen.
    pub logo: Option<PathBuf>,
    /// TTF font with Greek glyph coverage for the flavour symbols.
    pub font: Option<PathBuf>,
}

impl Default for AssetSettings {
    fn default() -> Self {
        Self {
            logo: Some(PathBuf::from("assets/logo.png")),
            font: Some(PathBuf::from("assets/fonts/DejaVuSans.ttf")),
        }
    }
}

impl Settings {
    /// Load settings from the default location.
    ///
    /// Prefers `config/ledcube.toml` in the working directory, then
    /// `ledcube/ledcube.toml` under the platform config directory. A
    /// missing file is not an error — defaults apply.
    pub fn load() -> AppResult<Self> {
        let path = if Path::new(DEFAULT_CONFIG_FILE).exists() {
            PathBuf::from(DEFAULT_CONFIG_FILE)
        } else {
            dirs::config_dir()
                .map(|dir| dir.join("ledcube").join("ledcube.toml"))
                .filter(|p| p.exists())
                .unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_FILE))
        };
        Self::load_from(path)
    }

    /// Load settings from a specific file path, merged with environment
    /// overrides.
    pub fn load_from<P: AsRef<Path>>(path: P) -> AppResult<Self> {
        let settings: Self = Figment::new()
            .merge(Toml::file(path.as_ref()))
            .merge(Env::prefixed("LEDCUBE_").split("__"))
            .extract()
            .map_err(AppError::from)?;

        settings.validate()?;
        Ok(settings)
    }

    /// Validate settings after loading.
    ///
    /// Checks:
    /// - the log level is one of trace, debug, info, warn, error
    /// - the window geometry is positive
    /// - the catalogue path is non-empty
    pub fn validate(&self) -> AppResult<()> {
        let valid_levels = ["trace", "debug", "info", "warn", "error"];
        if !valid_levels.contains(&self.log_level.as_str()) {
            return Err(AppError::Configuration(format!(
                "Invalid log_level '{}'. Must be one of: {}",
                self.log_level,
                valid_levels.join(", ")
            )));
        }

        if self.window.width <= 0.0 || self.window.height <= 0.0 {
            return Err(AppError::Configuration(format!(
                "Invalid window size {}x{}. Both dimensions must be positive",
                self.window.width, self.window.height
            )));
        }

        if self.catalog_path.as_os_str().is_empty() {
            return Err(AppError::Configuration(
                "catalog_path must not be empty".to_string(),
            ));
        }

        Ok(())
    }

    /// The validated log level as a `log` filter.
    pub fn level_filter(&self) -> LevelFilter {
        self.log_level.parse().unwrap_or(LevelFilter::Info)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;
    use std::io::Write;

    #[test]
    #[serial]
    fn test_defaults_without_file() {
        let settings = Settings::load_from("/nonexistent/ledcube.toml").unwrap();
        assert_eq!(settings.log_level, "info");
        assert_eq!(settings.window.width, 800.0);
        assert_eq!(settings.submit_policy, SubmitPolicy::AnyValid);
        assert_eq!(settings.catalog_path, PathBuf::from("config/select.json"));
    }

    #[test]
    #[serial]
    fn test_load_from_toml() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(
            br#"
            log_level = "debug"
            catalog_path = "data/select.json"
            submit_policy = "all_valid"

            [window]
            width = 1024.0
            height = 600.0
            fullscreen = true
            "#,
        )
        .unwrap();

        let settings = Settings::load_from(file.path()).unwrap();
        assert_eq!(settings.log_level, "debug");
        assert_eq!(settings.submit_policy, SubmitPolicy::AllValid);
        assert!(settings.window.fullscreen);
        assert_eq!(settings.catalog_path, PathBuf::from("data/select.json"));
    }

    #[test]
    #[serial]
    fn test_env_overrides_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(b"log_level = \"warn\"\n").unwrap();

        std::env::set_var("LEDCUBE_LOG_LEVEL", "trace");
        let result = Settings::load_from(file.path());
        std::env::remove_var("LEDCUBE_LOG_LEVEL");

        assert_eq!(result.unwrap().log_level, "trace");
    }

    #[test]
    #[serial]
    fn test_nested_env_override() {
        std::env::set_var("LEDCUBE_WINDOW__FULLSCREEN", "true");
        let result = Settings::load_from("/nonexistent/ledcube.toml");
        std::env::remove_var("LEDCUBE_WINDOW__FULLSCREEN");

        assert!(result.unwrap().window.fullscreen);
    }

    #[test]
    #[serial]
    fn test_invalid_log_level_rejected() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(b"log_level = \"verbose\"\n").unwrap();

        let err = Settings::load_from(file.path()).unwrap_err();
        assert!(err.to_string().contains("Invalid log_level"));
    }

    #[test]
    #[serial]
    fn test_zero_window_rejected() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(b"[window]\nwidth = 0.0\n").unwrap();

        let err = Settings::load_from(file.path()).unwrap_err();
        assert!(err.to_string().contains("window size"));
    }

    #[test]
    fn test_level_filter_parsing() {
        let settings = Settings {
            log_level: "warn".to_string(),
            ..Settings::default()
        };
        assert_eq!(settings.level_filter(), LevelFilter::Warn);
    }
}
