// Configuration loading and parsing (config/rotolens.toml).

use serde::Deserialize;
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::category::Category;

// ---------------------------------------------------------------------------
// Error types
// ---------------------------------------------------------------------------

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("config file not found: {path}")]
    FileNotFound { path: PathBuf },

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

/// Name of the config file inside `config/` and `defaults/`.
pub const CONFIG_FILE: &str = "rotolens.toml";

// ---------------------------------------------------------------------------
// Top-level assembled Config
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    pub db_path: String,
    pub baseline: BaselineConfig,
    pub rating: RatingConfig,
    pub roster: RosterRules,
    pub categories: CategoryConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            db_path: "rotolens.db".into(),
            baseline: BaselineConfig::default(),
            rating: RatingConfig::default(),
            roster: RosterRules::default(),
            categories: CategoryConfig::default(),
        }
    }
}

// ---------------------------------------------------------------------------
// Sections
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct BaselineConfig {
    /// Divisor that turns league-wide counting totals into an
    /// average-team value.
    pub teams_per_league: u32,
}

impl Default for BaselineConfig {
    fn default() -> Self {
        Self {
            teams_per_league: 15,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct RatingConfig {
    pub strength_threshold: u8,
    pub weakness_threshold: u8,
    /// Absolute batting-average difference spanning the rating scale.
    pub batting_avg_spread: f64,
    pub era_spread: f64,
    pub whip_spread: f64,
}

impl RatingConfig {
    /// Spread for a rate category; `None` for counting categories.
    pub fn spread(&self, category: Category) -> Option<f64> {
        match category {
            Category::BattingAvg => Some(self.batting_avg_spread),
            Category::Era => Some(self.era_spread),
            Category::Whip => Some(self.whip_spread),
            _ => None,
        }
    }
}

impl Default for RatingConfig {
    fn default() -> Self {
        Self {
            strength_threshold: 8,
            weakness_threshold: 4,
            batting_avg_spread: 0.030,
            era_spread: 0.50,
            whip_spread: 0.10,
        }
    }
}

/// Minimum slot counts below which the roster rules fire.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct RosterRules {
    pub min_outfielders: usize,
    pub min_relievers: usize,
}

impl Default for RosterRules {
    fn default() -> Self {
        Self {
            min_outfielders: 3,
            min_relievers: 2,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct CategoryConfig {
    /// Categories rated on the 1-10 scale.
    pub rated: Vec<Category>,
    /// Categories ranked in rotisserie standings.
    pub standings: Vec<Category>,
}

impl Default for CategoryConfig {
    fn default() -> Self {
        Self {
            rated: Category::RATED.to_vec(),
            standings: Category::ALL.to_vec(),
        }
    }
}

// ---------------------------------------------------------------------------
// Raw file layout
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Deserialize)]
struct ConfigFile {
    database: DatabaseSection,
    #[serde(default)]
    baseline: BaselineConfig,
    #[serde(default)]
    rating: RatingConfig,
    #[serde(default)]
    roster: RosterRules,
    #[serde(default)]
    categories: Option<CategoriesSection>,
}

#[derive(Debug, Clone, Deserialize)]
struct DatabaseSection {
    path: String,
}

#[derive(Debug, Clone, Deserialize)]
struct CategoriesSection {
    rated: Vec<String>,
    standings: Vec<String>,
}

// ---------------------------------------------------------------------------
// Loading logic
// ---------------------------------------------------------------------------

/// Load and validate `config/rotolens.toml` relative to `base_dir`.
///
/// This is the lower-level loading primitive that does not auto-copy defaults.
/// Prefer `load_config()` which handles default initialization automatically.
pub fn load_config_from(base_dir: &Path) -> Result<Config, ConfigError> {
    let path = base_dir.join("config").join(CONFIG_FILE);
    let text = read_file(&path)?;
    parse_config(&text, &path)
}

/// Parse and validate config text. `path` is used only for error messages.
pub fn parse_config(text: &str, path: &Path) -> Result<Config, ConfigError> {
    let file: ConfigFile = toml::from_str(text).map_err(|e| ConfigError::ParseError {
        path: path.to_path_buf(),
        source: e,
    })?;

    let categories = match file.categories {
        Some(section) => CategoryConfig {
            rated: parse_categories("categories.rated", &section.rated)?,
            standings: parse_categories("categories.standings", &section.standings)?,
        },
        None => CategoryConfig::default(),
    };

    let config = Config {
        db_path: file.database.path,
        baseline: file.baseline,
        rating: file.rating,
        roster: file.roster,
        categories,
    };

    validate(&config)?;

    Ok(config)
}

/// Copy `defaults/rotolens.toml` into `config/` when it isn't there yet.
/// Returns the copied paths (empty when nothing needed copying).
pub fn ensure_config_files(base_dir: &Path) -> Result<Vec<PathBuf>, ConfigError> {
    let defaults_dir = base_dir.join("defaults");
    let config_dir = base_dir.join("config");

    if !defaults_dir.exists() {
        if !config_dir.exists() {
            return Err(ConfigError::DefaultsCopyError {
                message: format!(
                    "neither defaults/ nor config/ directory found in {}; \
                     run from the project root or ensure defaults/ is present",
                    base_dir.display()
                ),
            });
        }
        return Ok(vec![]);
    }

    let source = defaults_dir.join(CONFIG_FILE);
    let target = config_dir.join(CONFIG_FILE);
    if target.exists() || !source.is_file() {
        return Ok(vec![]);
    }

    std::fs::create_dir_all(&config_dir).map_err(|e| ConfigError::DefaultsCopyError {
        message: format!("failed to create config directory: {e}"),
    })?;
    std::fs::copy(&source, &target).map_err(|e| ConfigError::DefaultsCopyError {
        message: format!("failed to copy {}: {e}", source.display()),
    })?;

    Ok(vec![target])
}

/// Resolve the directory holding `config/` (or `defaults/`): `explicit` when
/// given, else the working directory when it has either, else the
/// platform config directory.
pub fn resolve_base_dir(explicit: Option<&Path>) -> Result<PathBuf, ConfigError> {
    if let Some(dir) = explicit {
        return Ok(dir.to_path_buf());
    }

    let cwd = std::env::current_dir().map_err(|_| ConfigError::FileNotFound {
        path: PathBuf::from("."),
    })?;
    if cwd.join("config").exists() || cwd.join("defaults").exists() {
        return Ok(cwd);
    }

    match directories::ProjectDirs::from("", "", "rotolens") {
        Some(dirs) => Ok(dirs.config_dir().to_path_buf()),
        None => Ok(cwd),
    }
}

/// Convenience wrapper: resolves the base directory, copies defaults if
/// needed, then loads.
pub fn load_config(explicit_dir: Option<&Path>) -> Result<Config, ConfigError> {
    let base = resolve_base_dir(explicit_dir)?;
    ensure_config_files(&base)?;
    load_config_from(&base)
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn read_file(path: &Path) -> Result<String, ConfigError> {
    std::fs::read_to_string(path).map_err(|_| ConfigError::FileNotFound {
        path: path.to_path_buf(),
    })
}

fn parse_categories(field: &str, raw: &[String]) -> Result<Vec<Category>, ConfigError> {
    raw.iter()
        .map(|s| {
            s.parse::<Category>().map_err(|e| ConfigError::ValidationError {
                field: field.to_string(),
                message: e.to_string(),
            })
        })
        .collect()
}

// ---------------------------------------------------------------------------
// Validation
// ---------------------------------------------------------------------------

fn validate(config: &Config) -> Result<(), ConfigError> {
    if config.db_path.trim().is_empty() {
        return Err(ConfigError::ValidationError {
            field: "database.path".into(),
            message: "must not be empty".into(),
        });
    }

    if config.baseline.teams_per_league == 0 {
        return Err(ConfigError::ValidationError {
            field: "baseline.teams_per_league".into(),
            message: "must be greater than 0".into(),
        });
    }

    let rating = &config.rating;
    for (name, val) in [
        ("rating.strength_threshold", rating.strength_threshold),
        ("rating.weakness_threshold", rating.weakness_threshold),
    ] {
        if !(1..=10).contains(&val) {
            return Err(ConfigError::ValidationError {
                field: name.to_string(),
                message: format!("must be between 1 and 10 inclusive, got {val}"),
            });
        }
    }
    if rating.weakness_threshold >= rating.strength_threshold {
        return Err(ConfigError::ValidationError {
            field: "rating.weakness_threshold".into(),
            message: format!(
                "must be below strength_threshold ({}), got {}",
                rating.strength_threshold, rating.weakness_threshold
            ),
        });
    }

    let spreads: &[(&str, f64)] = &[
        ("rating.batting_avg_spread", rating.batting_avg_spread),
        ("rating.era_spread", rating.era_spread),
        ("rating.whip_spread", rating.whip_spread),
    ];
    for (name, val) in spreads {
        if !val.is_finite() || *val <= 0.0 {
            return Err(ConfigError::ValidationError {
                field: name.to_string(),
                message: format!("must be > 0, got {val}"),
            });
        }
    }

    for (name, list) in [
        ("categories.rated", &config.categories.rated),
        ("categories.standings", &config.categories.standings),
    ] {
        if list.is_empty() {
            return Err(ConfigError::ValidationError {
                field: name.to_string(),
                message: "must list at least one category".into(),
            });
        }
        for (i, c) in list.iter().enumerate() {
            if list[..i].contains(c) {
                return Err(ConfigError::ValidationError {
                    field: name.to_string(),
                    message: format!("duplicate category `{c}`"),
                });
            }
        }
    }

    Ok(())
}

// ---------------------------------------------------------------------------
// Unit tests
// ---------------------------------------------------------------------------
