// User configuration
// Optional TOML settings read once at startup; the file is never created or written

use directories::ProjectDirs;
use serde::Deserialize;
use std::env;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use tracing::Level;

use crate::xtq_error::{QuizError, Result};

/// User preferences
/// Every field falls back to its default when missing from the file
#[derive(Deserialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct Config {
    pub language: String,          // Language code ("en" or "zh")
    pub ascii_icons: bool,         // Use ASCII fallback glyphs (*, <-, <3)
    pub sound: bool,               // Play correct/wrong cues when assets are present
    pub sounds_dir: PathBuf,       // Directory holding correct.wav and wrong.wav
    pub correct_volume: f32,
    pub wrong_volume: f32,
    pub log_file: Option<PathBuf>, // Tracing output; no logging when unset
    pub log_level: String,
}

impl Default for Config {
    fn default() -> Self {
        // Auto-detect system language
        let system_lang = sys_locale::get_locale().unwrap_or_else(|| "en".to_string());
        let lang = if system_lang.to_lowercase().starts_with("zh") {
            "zh".to_string()
        } else {
            "en".to_string()
        };

        Config {
            language: lang,
            ascii_icons: false,
            sound: true,
            sounds_dir: PathBuf::from("sounds"),
            correct_volume: 0.3,
            wrong_volume: 0.5,
            log_file: None,
            log_level: "info".to_string(),
        }
    }
}

impl Config {
    /// Parse a config from TOML text
    pub fn from_toml(path: &Path, text: &str) -> Result<Config> {
        let mut cfg: Config = toml::from_str(text).map_err(|source| QuizError::Config {
            path: path.to_path_buf(),
            source,
        })?;
        cfg.correct_volume = cfg.correct_volume.clamp(0.0, 1.0);
        cfg.wrong_volume = cfg.wrong_volume.clamp(0.0, 1.0);
        Ok(cfg)
    }

    /// Tracing level from `log_level`, INFO when unrecognized
    pub fn level(&self) -> Level {
        self.log_level.parse().unwrap_or(Level::INFO)
    }
}

/// Get the configuration file path
/// Uses platform-specific config directory (e.g., ~/.config/xtquiz/xtquiz.toml on Linux)
/// Falls back to current directory if ProjectDirs is unavailable
pub fn config_path() -> Option<PathBuf> {
    if let Ok(exe) = env::current_exe() {
        if let Some(name) = exe.file_stem().and_then(|s| s.to_str()) {
            if let Some(proj) = ProjectDirs::from("com", "xhbl", name) {
                let mut path = proj.config_dir().to_path_buf();
                path.push(format!("{}.toml", name));
                return Some(path);
            } else if let Ok(mut path) = env::current_dir() {
                path.push(format!("{}.toml", name));
                return Some(path);
            }
        }
    }
    None
}

/// Read the config at `path`
/// A missing file is not an error and yields the defaults
pub fn load_config_from(path: &Path) -> Result<Config> {
    match fs::read_to_string(path) {
        Ok(s) => Config::from_toml(path, &s),
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(Config::default()),
        Err(e) => Err(e.into()),
    }
}

/// Load configuration from the platform path
/// Errors are returned to the caller, which logs them and keeps the defaults
pub fn load_config() -> Result<Config> {
    match config_path() {
        Some(path) => load_config_from(&path),
        None => Ok(Config::default()),
    }
}
