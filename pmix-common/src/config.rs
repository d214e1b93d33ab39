//! Configuration loading and defaults
//!
//! Every setting has a built-in default. A TOML file may override any subset:
//!
//! ```toml
//! [mix]
//! mode = "flex"
//! curve = "wave"
//! max_tracks = 120
//!
//! [weights]
//! artist_repeat = 0.5
//!
//! [weights.transition]
//! energy = 2.0
//!
//! [windows]
//! strict = 40
//!
//! [logging]
//! level = "debug"
//! ```
//!
//! Config file resolution priority:
//! 1. Command-line argument (highest priority)
//! 2. `PMIX_CONFIG` environment variable
//! 3. `<user config dir>/pmix/config.toml`
//! 4. Built-in defaults (no file)

use crate::{CurveProfile, Error, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// Environment variable naming the config file
pub const CONFIG_ENV_VAR: &str = "PMIX_CONFIG";

/// Selection policy
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MixMode {
    /// Round-robin through sources, best candidate within the turn's source
    #[default]
    Strict,
    /// Best candidate across all sources, under fairness pressure
    Flex,
}

impl MixMode {
    /// Parse mode from its name (case-insensitive)
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "strict" => Some(MixMode::Strict),
            "flex" => Some(MixMode::Flex),
            _ => None,
        }
    }

    /// Canonical lowercase name
    pub fn as_str(&self) -> &'static str {
        match self {
            MixMode::Strict => "strict",
            MixMode::Flex => "flex",
        }
    }
}

impl std::fmt::Display for MixMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Per-run mix options
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MixOptions {
    pub mode: MixMode,
    pub curve: CurveProfile,
    /// Keep only the first occurrence of each track across all sources
    pub remove_duplicates: bool,
    /// Penalize the same primary artist back-to-back
    pub avoid_same_artist: bool,
    /// Penalize large duration jumps between consecutive tracks
    pub prefer_similar_duration: bool,
    /// Output length cap (must be >= 1)
    pub max_tracks: usize,
    /// Name for the published playlist (publisher default when None)
    pub playlist_name: Option<String>,
}

impl Default for MixOptions {
    fn default() -> Self {
        Self {
            mode: MixMode::Strict,
            curve: CurveProfile::Steady,
            remove_duplicates: true,
            avoid_same_artist: true,
            prefer_similar_duration: true,
            max_tracks: 500,
            playlist_name: None,
        }
    }
}

impl MixOptions {
    /// Reject options the sequencer cannot run with
    pub fn validate(&self) -> Result<()> {
        if self.max_tracks == 0 {
            return Err(Error::InvalidInput(
                "max_tracks must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}

/// Per-feature weights of the transition distance (weighted L1)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TransitionWeights {
    pub energy: f64,
    pub valence: f64,
    pub tempo: f64,
    pub loudness: f64,
    pub duration: f64,
    pub danceability: f64,
}

impl Default for TransitionWeights {
    fn default() -> Self {
        Self {
            energy: 1.6,
            valence: 1.2,
            tempo: 1.0,
            loudness: 0.8,
            duration: 0.7,
            danceability: 0.6,
        }
    }
}

/// Scoring weights
///
/// Defaults were tuned by ear, not derived. Treat them as a set.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScoringWeights {
    pub transition: TransitionWeights,
    /// Curve penalty weight on energy distance
    pub target_energy: f64,
    /// Curve penalty weight on valence distance
    pub target_valence: f64,
    /// Multiplier of the t=0 curve penalty for the very first pick
    pub initial_bias: f64,
    /// Same primary artist as previous pick
    pub artist_repeat: f64,
    /// Same source list as previous pick
    pub source_repeat: f64,
    /// Per pick above a source's proportional share (flex only)
    pub fairness: f64,
    /// Multiplier of the normalized duration difference to previous pick
    pub duration_jump: f64,
}

impl Default for ScoringWeights {
    fn default() -> Self {
        Self {
            transition: TransitionWeights::default(),
            target_energy: 0.9,
            target_valence: 0.7,
            initial_bias: 0.7,
            artist_repeat: 0.35,
            source_repeat: 0.25,
            fairness: 0.12,
            duration_jump: 0.25,
        }
    }
}

impl ScoringWeights {
    /// Every weight must be finite and non-negative so scores stay >= 0
    pub fn validate(&self) -> Result<()> {
        let t = &self.transition;
        let all = [
            ("transition.energy", t.energy),
            ("transition.valence", t.valence),
            ("transition.tempo", t.tempo),
            ("transition.loudness", t.loudness),
            ("transition.duration", t.duration),
            ("transition.danceability", t.danceability),
            ("target_energy", self.target_energy),
            ("target_valence", self.target_valence),
            ("initial_bias", self.initial_bias),
            ("artist_repeat", self.artist_repeat),
            ("source_repeat", self.source_repeat),
            ("fairness", self.fairness),
            ("duration_jump", self.duration_jump),
        ];
        for (name, value) in all {
            if !value.is_finite() || value < 0.0 {
                return Err(Error::InvalidInput(format!(
                    "weight {} must be a non-negative number, got {}",
                    name, value
                )));
            }
        }
        if t.energy + t.valence + t.tempo + t.loudness + t.duration + t.danceability == 0.0 {
            warn!("All transition weights are zero; consecutive tracks will not be matched");
        }
        Ok(())
    }
}

/// How many candidates per pool the selectors score each step
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SelectionWindows {
    /// Window into the turn's pool in strict mode
    pub strict: usize,
    /// Window into every pool in flex mode
    pub flex: usize,
}

impl Default for SelectionWindows {
    fn default() -> Self {
        Self { strict: 30, flex: 20 }
    }
}

impl SelectionWindows {
    pub fn validate(&self) -> Result<()> {
        if self.strict == 0 || self.flex == 0 {
            return Err(Error::InvalidInput(format!(
                "selection windows must be at least 1 (strict = {}, flex = {})",
                self.strict, self.flex
            )));
        }
        Ok(())
    }
}

/// Logging configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
        }
    }
}

/// Complete configuration file
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TomlConfig {
    pub mix: MixOptions,
    pub weights: ScoringWeights,
    pub windows: SelectionWindows,
    pub logging: LoggingConfig,
}

impl TomlConfig {
    /// Load configuration from a TOML file
    ///
    /// Missing sections and fields fall back to built-in defaults.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: TomlConfig = toml::from_str(&content)?;
        config.validate()?;
        debug!("Loaded configuration from {}", path.display());
        Ok(config)
    }

    /// Validate values that serde cannot check
    pub fn validate(&self) -> Result<()> {
        self.mix
            .validate()
            .and_then(|_| self.windows.validate())
            .and_then(|_| self.weights.validate())
            .map_err(|e| Error::Config(e.to_string()))
    }
}

/// Resolves which config file (if any) to load
pub struct ConfigResolver {
    cli_path: Option<PathBuf>,
}

impl ConfigResolver {
    pub fn new(cli_path: Option<PathBuf>) -> Self {
        Self { cli_path }
    }

    /// Resolve config file path by priority order
    ///
    /// Returns None when no file is named and the user config file does not
    /// exist.
    pub fn resolve(&self) -> Option<PathBuf> {
        // Priority 1: Command-line argument
        if let Some(path) = &self.cli_path {
            return Some(path.clone());
        }

        // Priority 2: Environment variable
        if let Ok(path) = std::env::var(CONFIG_ENV_VAR) {
            if !path.is_empty() {
                return Some(PathBuf::from(path));
            }
        }

        // Priority 3: User config directory
        default_config_path().filter(|path| path.exists())
    }

    /// Resolve and load configuration
    ///
    /// An explicitly named file (CLI or env) must load. When nothing is
    /// named and the user config file does not exist, built-in defaults are
    /// returned together with `None` as the source path.
    pub fn load(&self) -> Result<(TomlConfig, Option<PathBuf>)> {
        match self.resolve() {
            Some(path) => {
                if !path.exists() {
                    return Err(Error::Config(format!(
                        "Config file not found: {}",
                        path.display()
                    )));
                }
                let config = TomlConfig::load(&path)?;
                Ok((config, Some(path)))
            }
            None => Ok((TomlConfig::default(), None)),
        }
    }
}

/// `<user config dir>/pmix/config.toml`
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("pmix").join("config.toml"))
}
