/// Card configuration loader - parses cards.toml
///
/// Separates output locations, render sizes, and the data source from code,
/// making it easy to add a card variant or point at a different dataset
/// without recompiling the service.

use serde::Deserialize;
use std::env;
use std::fs;
use std::io;
use std::path::Path;

use crate::logging::{self, Stage};

/// Default configuration file, relative to the working directory.
pub const DEFAULT_CONFIG_PATH: &str = "cards.toml";

/// Environment variable overriding the configuration file path.
pub const CONFIG_PATH_ENV: &str = "RACE_CARDS_CONFIG";

/// Environment variable overriding `[source].data_url`.
pub const DATA_URL_ENV: &str = "RACE_DATA_URL";

// ---------------------------------------------------------------------------
// Configuration structures
// ---------------------------------------------------------------------------

/// Root configuration loaded from cards.toml
#[derive(Debug, Clone, Deserialize)]
pub struct CardConfig {
    #[serde(default)]
    pub output: OutputConfig,
    #[serde(default)]
    pub bars: BarConfig,
    #[serde(default)]
    pub source: SourceConfig,
    #[serde(default = "default_workers")]
    pub workers: usize,
    #[serde(rename = "variant", default = "default_variants")]
    pub variants: Vec<CardVariant>,
}

/// Where exported card files are written
#[derive(Debug, Clone, Deserialize)]
pub struct OutputConfig {
    /// Root output directory.
    pub directory: String,
    /// Subdirectory for race cards, also reported in each card's render target.
    pub relative_path: String,
}

/// Bar chart scaling
#[derive(Debug, Clone, Deserialize)]
pub struct BarConfig {
    /// Bars shorter than this fraction of the maximum are drawn at this fraction.
    pub min_width_fraction: f64,
}

/// Dataset location
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SourceConfig {
    pub data_url: Option<String>,
    pub data_file: Option<String>,
}

/// A render target: one card image per state is produced for each variant.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct CardVariant {
    pub name: String,
    pub width: f64,
    pub height: f64,
    #[serde(default)]
    pub filename_suffix: String,
    #[serde(default)]
    pub square: bool,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            directory: "public/images".to_string(),
            relative_path: "race-dashboard".to_string(),
        }
    }
}

impl Default for BarConfig {
    fn default() -> Self {
        Self { min_width_fraction: 0.1 }
    }
}

fn default_workers() -> usize {
    4
}

fn default_variants() -> Vec<CardVariant> {
    vec![
        CardVariant {
            name: "landscape".to_string(),
            width: 900.0,
            height: 472.5,
            filename_suffix: String::new(),
            square: false,
        },
        CardVariant {
            name: "square".to_string(),
            width: 700.0,
            height: 700.0,
            filename_suffix: "-square".to_string(),
            square: true,
        },
    ]
}

impl Default for CardConfig {
    fn default() -> Self {
        Self {
            output: OutputConfig::default(),
            bars: BarConfig::default(),
            source: SourceConfig::default(),
            workers: default_workers(),
            variants: default_variants(),
        }
    }
}

impl CardConfig {
    /// Looks up a variant by name.
    pub fn variant(&self, name: &str) -> Option<&CardVariant> {
        self.variants.iter().find(|v| v.name == name)
    }


    fn validate(&self) -> Result<(), ConfigError> {
        if !(0.0..=1.0).contains(&self.bars.min_width_fraction) {
            return Err(ConfigError::Invalid(format!(
                "bars.min_width_fraction must be between 0 and 1, got {}",
                self.bars.min_width_fraction
            )));
        }
        if self.workers == 0 {
            return Err(ConfigError::Invalid("workers must be at least 1".to_string()));
        }
        if self.variants.is_empty() {
            return Err(ConfigError::Invalid("at least one [[variant]] is required".to_string()));
        }
        for variant in &self.variants {
            if variant.width <= 0.0 || variant.height <= 0.0 {
                return Err(ConfigError::Invalid(format!(
                    "variant '{}' must have positive width and height",
                    variant.name
                )));
            }
        }
        let mut names: Vec<&str> = self.variants.iter().map(|v| v.name.as_str()).collect();
        names.sort_unstable();
        names.dedup();
        if names.len() != self.variants.len() {
            return Err(ConfigError::Invalid("variant names must be unique".to_string()));
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

#[derive(Debug)]
pub enum ConfigError {
    Read { path: String, source: std::io::Error },
    Parse { path: String, message: String },
    Invalid(String),
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::Read { path, source } => {
                write!(f, "Failed to read {}: {}\n\n", path, source)?;
                write!(f, "  Copy the default configuration into the working directory,\n")?;
                write!(f, "  or point {} at an existing file.", CONFIG_PATH_ENV)
            }
            ConfigError::Parse { path, message } => {
                write!(f, "Failed to parse {}: {}", path, message)
            }
            ConfigError::Invalid(msg) => write!(f, "Invalid configuration: {}", msg),
        }
    }
}

impl std::error::Error for ConfigError {}

// ---------------------------------------------------------------------------
// Loading
// ---------------------------------------------------------------------------

/// Parses configuration from a TOML string.
pub fn parse_config(contents: &str, origin: &str) -> Result<CardConfig, ConfigError> {
    let config: CardConfig = toml::from_str(contents).map_err(|e| ConfigError::Parse {
        path: origin.to_string(),
        message: e.to_string(),
    })?;
    config.validate()?;
    Ok(config)
}

/// Loads configuration from a TOML file.
pub fn load_config_from<P: AsRef<Path>>(path: P) -> Result<CardConfig, ConfigError> {
    let path = path.as_ref();
    let display = path.display().to_string();
    let contents = fs::read_to_string(path).map_err(|source| ConfigError::Read {
        path: display.clone(),
        source,
    })?;
    parse_config(&contents, &display)
}

/// Loads configuration from `RACE_CARDS_CONFIG`, or cards.toml in the
/// working directory. A `.env` file is read first if present.
pub fn load_config() -> Result<CardConfig, ConfigError> {
    dotenv::dotenv().ok();
    load_config_or_default(env_value(CONFIG_PATH_ENV).as_deref())
}

/// Loads `explicit` when given; a path someone named must exist. Without
/// one, reads cards.toml and falls back to the built-in defaults only when
/// that file is absent.
pub fn load_config_or_default(explicit: Option<&str>) -> Result<CardConfig, ConfigError> {
    if let Some(path) = explicit {
        return load_config_from(path);
    }

    match load_config_from(DEFAULT_CONFIG_PATH) {
        Err(ConfigError::Read { path, source }) if source.kind() == io::ErrorKind::NotFound => {
            logging::warn(
                Stage::System,
                None,
                &format!("{} not found, using built-in defaults", path),
            );
            Ok(CardConfig::default())
        }
        other => other,
    }
}

/// Dataset URL from `RACE_DATA_URL`, if set and non-blank.
pub fn env_data_url() -> Option<String> {
    env_value(DATA_URL_ENV)
}

fn env_value(key: &str) -> Option<String> {
    env::var(key).ok().filter(|v| !v.trim().is_empty())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
