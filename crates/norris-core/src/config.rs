// Configuration loading and parsing (norris.toml).

use serde::Deserialize;
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::season::Season;

/// Name of the single configuration file under `config/` and `defaults/`.
pub const CONFIG_FILE: &str = "norris.toml";

// ---------------------------------------------------------------------------
// Error types
// ---------------------------------------------------------------------------

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("config file not found: {path}")]
    FileNotFound { path: PathBuf },

    #[error("failed to read config file {path}: {source}")]
    ReadError {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to parse config file {path}: {source}")]
    ParseError {
        path: PathBuf,
        source: toml::de::Error,
    },

    #[error("validation error for field `{field}`: {message}")]
    ValidationError { field: String, message: String },

    #[error("failed to initialize config from defaults: {message}")]
    DefaultsCopyError { message: String },
}

// ---------------------------------------------------------------------------
// Top-level assembled Config
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub data: DataConfig,
    #[serde(default)]
    pub seasons: SeasonConfig,
    #[serde(default)]
    pub model: ModelConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

// ---------------------------------------------------------------------------
// [data]
// ---------------------------------------------------------------------------

/// Where the per-season tables live. A table for `season` is read from
/// `{root}/{dir}/{prefix}_{season}.csv`.
#[derive(Debug, Clone, Deserialize)]
pub struct DataConfig {
    pub root: String,
    pub standings: FamilyLayout,
    pub skater_stats: FamilyLayout,
    pub voting: FamilyLayout,
}

#[derive(Debug, Clone, Deserialize)]
pub struct FamilyLayout {
    pub dir: String,
    pub prefix: String,
}

impl FamilyLayout {
    fn new(dir: &str, prefix: &str) -> Self {
        FamilyLayout {
            dir: dir.into(),
            prefix: prefix.into(),
        }
    }

    /// Path of the table for one season, relative to the data root.
    pub fn relative_path(&self, season: Season) -> PathBuf {
        Path::new(&self.dir).join(format!("{}_{}.csv", self.prefix, season))
    }
}

impl Default for DataConfig {
    fn default() -> Self {
        DataConfig {
            root: "nhl_data".into(),
            standings: FamilyLayout::new("season_standings", "season_standings"),
            skater_stats: FamilyLayout::new("skater_stats", "skater_stats"),
            voting: FamilyLayout::new("norris_voting", "norris_voting"),
        }
    }
}

// ---------------------------------------------------------------------------
// [seasons]
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Deserialize)]
pub struct SeasonConfig {
    pub first_start_year: i32,
    /// Month (1-12) in which a new season is considered started.
    pub season_start_month: u32,
    /// Seasons that were never played.
    #[serde(default)]
    pub excluded: Vec<Season>,
}

impl Default for SeasonConfig {
    fn default() -> Self {
        SeasonConfig {
            first_start_year: 1979,
            season_start_month: 10,
            excluded: vec![Season::new(2004)],
        }
    }
}

// ---------------------------------------------------------------------------
// [model]
// ---------------------------------------------------------------------------

/// Hyperparameters for the regularized linear estimator and the size of the
/// published ranking.
#[derive(Debug, Clone, Deserialize)]
pub struct ModelConfig {
    pub penalty: f64,
    pub l1_ratio: f64,
    pub max_iterations: u32,
    pub tolerance: f64,
    pub top_n: usize,
}

impl Default for ModelConfig {
    fn default() -> Self {
        ModelConfig {
            penalty: 0.01,
            l1_ratio: 0.1,
            max_iterations: 1000,
            tolerance: 1e-4,
            top_n: 10,
        }
    }
}

// ---------------------------------------------------------------------------
// [logging]
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    pub filter: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        LoggingConfig {
            filter: "norris_core=info,norris=info,warn".into(),
        }
    }
}

// ---------------------------------------------------------------------------
// Loading logic
// ---------------------------------------------------------------------------

/// Load and validate `config/norris.toml` relative to `base_dir`.
///
/// Does not copy defaults; prefer `load_config()` for that.
pub fn load_config_from(base_dir: &Path) -> Result<Config, ConfigError> {
    let path = base_dir.join("config").join(CONFIG_FILE);
    let text = read_file(&path)?;
    let config = parse_config(&text).map_err(|e| ConfigError::ParseError {
        path: path.clone(),
        source: e,
    })?;
    validate(&config)?;
    Ok(config)
}

/// Parse config text without validating it.
pub fn parse_config(text: &str) -> Result<Config, toml::de::Error> {
    toml::from_str(text)
}

/// Copy `defaults/norris.toml` into `config/` if it is not there yet.
/// Returns the copied path, or `None` when nothing was copied.
pub fn ensure_config_file(base_dir: &Path) -> Result<Option<PathBuf>, ConfigError> {
    let config_dir = base_dir.join("config");
    let target = config_dir.join(CONFIG_FILE);
    if target.exists() {
        return Ok(None);
    }

    let source = base_dir.join("defaults").join(CONFIG_FILE);
    if !source.exists() {
        return Err(ConfigError::DefaultsCopyError {
            message: format!(
                "neither config/{CONFIG_FILE} nor defaults/{CONFIG_FILE} found in {}",
                base_dir.display()
            ),
        });
    }

    std::fs::create_dir_all(&config_dir).map_err(|e| ConfigError::DefaultsCopyError {
        message: format!("failed to create config directory: {e}"),
    })?;
    std::fs::copy(&source, &target).map_err(|e| ConfigError::DefaultsCopyError {
        message: format!("failed to copy {}: {e}", source.display()),
    })?;
    Ok(Some(target))
}

/// Load config relative to `base_dir`, copying defaults first if needed.
pub fn load_config(base_dir: &Path) -> Result<Config, ConfigError> {
    ensure_config_file(base_dir)?;
    load_config_from(base_dir)
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn read_file(path: &Path) -> Result<String, ConfigError> {
    std::fs::read_to_string(path).map_err(|e| match e.kind() {
        std::io::ErrorKind::NotFound => ConfigError::FileNotFound {
            path: path.to_path_buf(),
        },
        _ => ConfigError::ReadError {
            path: path.to_path_buf(),
            source: e,
        },
    })
}

fn invalid(field: &str, message: impl Into<String>) -> ConfigError {
    ConfigError::ValidationError {
        field: field.into(),
        message: message.into(),
    }
}

// ---------------------------------------------------------------------------
// Validation
// ---------------------------------------------------------------------------

pub fn validate(config: &Config) -> Result<(), ConfigError> {
    let data = &config.data;
    if data.root.trim().is_empty() {
        return Err(invalid("data.root", "must not be empty"));
    }
    let layouts: &[(&str, &FamilyLayout)] = &[
        ("data.standings.prefix", &data.standings),
        ("data.skater_stats.prefix", &data.skater_stats),
        ("data.voting.prefix", &data.voting),
    ];
    for (name, layout) in layouts {
        if layout.prefix.trim().is_empty() {
            return Err(invalid(name, "must not be empty"));
        }
    }

    let seasons = &config.seasons;
    if !(1..=12).contains(&seasons.season_start_month) {
        return Err(invalid(
            "seasons.season_start_month",
            format!("must be between 1 and 12, got {}", seasons.season_start_month),
        ));
    }
    if seasons.first_start_year < 1900 {
        return Err(invalid(
            "seasons.first_start_year",
            format!("must be 1900 or later, got {}", seasons.first_start_year),
        ));
    }

    let model = &config.model;
    if !(model.penalty > 0.0) {
        return Err(invalid(
            "model.penalty",
            format!("must be > 0, got {}", model.penalty),
        ));
    }
    if !(0.0..=1.0).contains(&model.l1_ratio) {
        return Err(invalid(
            "model.l1_ratio",
            format!("must be between 0.0 and 1.0 inclusive, got {}", model.l1_ratio),
        ));
    }
    if !(model.tolerance > 0.0) {
        return Err(invalid(
            "model.tolerance",
            format!("must be > 0, got {}", model.tolerance),
        ));
    }
    if model.max_iterations == 0 {
        return Err(invalid("model.max_iterations", "must be > 0"));
    }
    if model.top_n == 0 {
        return Err(invalid("model.top_n", "must be > 0"));
    }

    Ok(())
}

// ---------------------------------------------------------------------------
// Unit tests
// ---------------------------------------------------------------------------
