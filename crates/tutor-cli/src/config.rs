//! Configuration file support

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Configuration for the tutor
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Gemini model id
    pub model: Option<String>,
    /// Stream fragments (true) or wait for the whole answer (false)
    pub stream: Option<bool>,
    /// Whether to use TUI mode by default
    pub tui: Option<bool>,
    /// Sampling temperature passed to the model
    pub temperature: Option<f32>,
    /// API key (alternative to environment variables)
    pub api_key: Option<String>,
}

impl Config {
    pub fn config_dir() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("tutor")
    }

    /// `$TUTOR_CONFIG_PATH`, else `<config_dir>/tutor/config.toml`
    pub fn config_path() -> PathBuf {
        if let Ok(path) = std::env::var("TUTOR_CONFIG_PATH") {
            return PathBuf::from(path);
        }
        Self::config_dir().join("config.toml")
    }

    /// Load config from the default location
    pub fn load() -> Self {
        Self::load_from(&Self::config_path())
    }

    /// Load config from `path`. A missing or unreadable file yields defaults.
    pub fn load_from(path: &Path) -> Self {
        if !path.exists() {
            return Self::default();
        }

        match fs::read_to_string(path) {
            Ok(content) => match toml::from_str(&content) {
                Ok(config) => config,
                Err(e) => {
                    eprintln!("Warning: Failed to parse config file: {}", e);
                    Self::default()
                }
            },
            Err(e) => {
                eprintln!("Warning: Failed to read config file: {}", e);
                Self::default()
            }
        }
    }

    pub fn save_to(&self, path: &Path) -> std::io::Result<()> {
        if let Some(dir) = path.parent() {
            fs::create_dir_all(dir)?;
        }
        let content = toml::to_string_pretty(self).map_err(std::io::Error::other)?;
        fs::write(path, content)
    }

    /// Create a default config file if it doesn't exist
    pub fn init() -> std::io::Result<PathBuf> {
        let path = Self::config_path();
        if path.exists() {
            return Ok(path);
        }

        let default_config = Config {
            model: Some(tutor_ai::models::DEFAULT_MODEL_ID.to_string()),
            stream: Some(true),
            tui: Some(true),
            temperature: None,
            api_key: None,
        };

        default_config.save_to(&path)?;
        Ok(path)
    }
}

/// Generate example config content
pub fn example_config() -> &'static str {
    r#"# tutor configuration file
# Place at ~/.config/tutor/config.toml (Linux), ~/Library/Application Support/tutor/config.toml
# (macOS) or %APPDATA%\tutor\config.toml (Windows), or point TUTOR_CONFIG_PATH at it.

# Gemini model to use
model = "gemini-2.0-flash-exp"

# Show the explanation while it is being written (true) or all at once (false)
stream = true

# Whether to use TUI mode by default
# Set to false for plain stdin/stdout mode
tui = true

# Sampling temperature (optional)
# temperature = 0.4

# API key (optional - GOOGLE_API_KEY or GEMINI_API_KEY also work)
# api_key = "..."
"#
}
