//! Configuration for wallcal alignment runs.
//!
//! Configuration is a typed structure with documented defaults. Every field
//! may be omitted from a config file; missing fields take the default value.
//! Files are TOML, or JSON when the content starts with `{`.
//!
//! ```toml
//! [solver]
//! min_reference_distance = 0.0001
//! collinearity_epsilon = 0.000001
//!
//! [animation]
//! animate = true
//! duration_ms = 1000
//! easing = "ease_in_out_cubic"
//! ```

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;
use wallcal_spatial::Easing;

/// File name searched for by [`AlignmentConfig::discover`].
pub const CONFIG_FILE_NAME: &str = "wallcal.toml";

/// Longest accepted animation, one hour.
pub const MAX_DURATION_MS: u64 = 60 * 60 * 1000;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse TOML config: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("Failed to serialize TOML config: {0}")]
    TomlSerialize(#[from] toml::ser::Error),

    #[error("Failed to parse JSON config: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Invalid configuration: {}", .0.join("; "))]
    Invalid(Vec<String>),
}

pub type Result<T> = std::result::Result<T, ConfigError>;

/// Top-level configuration
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AlignmentConfig {
    pub solver: SolverConfig,
    pub animation: AnimationConfig,
}

/// Thresholds used by the alignment solver
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SolverConfig {
    /// Minimum distance between model markers 0 and 1 (after conversion into
    /// the target's local space). Below it no stable scale exists.
    /// Default: `1e-4`.
    pub min_reference_distance: f64,
    /// Minimum edge length and cross-product magnitude accepted when building
    /// an orthonormal frame from three markers. Default: `1e-6`.
    ///
    /// This is an absolute length in marker units: the cross-product
    /// magnitude is the distance of the third marker from the line through
    /// the first two. It does not scale with the size of the triad.
    pub collinearity_epsilon: f64,
}

impl Default for SolverConfig {
    fn default() -> Self {
        Self {
            min_reference_distance: 1e-4,
            collinearity_epsilon: 1e-6,
        }
    }
}

/// How a solved transform is applied to the target
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnimationConfig {
    /// Interpolate toward the solved transform instead of snapping.
    /// Default: `true`.
    pub animate: bool,
    /// Interpolation length in milliseconds, at most [`MAX_DURATION_MS`].
    /// Default: `1000`.
    pub duration_ms: u64,
    /// Timing curve. Default: [`Easing::EaseInOutCubic`].
    pub easing: Easing,
}

impl Default for AnimationConfig {
    fn default() -> Self {
        Self {
            animate: true,
            duration_ms: 1000,
            easing: Easing::EaseInOutCubic,
        }
    }
}

impl SolverConfig {
    pub fn validate(&self) -> Result<()> {
        into_result(self.problems())
    }

    fn problems(&self) -> Vec<String> {
        let mut errors = Vec::new();

        let min_distance = self.min_reference_distance;
        if !min_distance.is_finite() || min_distance <= 0.0 {
            errors.push(format!(
                "solver.min_reference_distance must be a positive number, got {}",
                min_distance
            ));
        }

        let epsilon = self.collinearity_epsilon;
        if !epsilon.is_finite() || epsilon <= 0.0 {
            errors.push(format!(
                "solver.collinearity_epsilon must be a positive number, got {}",
                epsilon
            ));
        }

        errors
    }
}

impl AnimationConfig {
    pub fn duration(&self) -> Duration {
        Duration::from_millis(self.duration_ms)
    }

    pub fn validate(&self) -> Result<()> {
        into_result(self.problems())
    }

    fn problems(&self) -> Vec<String> {
        let mut errors = Vec::new();
        if self.duration_ms > MAX_DURATION_MS {
            errors.push(format!(
                "animation.duration_ms must be at most {}, got {}",
                MAX_DURATION_MS, self.duration_ms
            ));
        }
        errors
    }
}

fn into_result(errors: Vec<String>) -> Result<()> {
    if errors.is_empty() {
        Ok(())
    } else {
        Err(ConfigError::Invalid(errors))
    }
}

impl AlignmentConfig {
    /// Build a configuration, rejecting invalid values
    pub fn new(solver: SolverConfig, animation: AnimationConfig) -> Result<Self> {
        let config = Self { solver, animation };
        config.validate()?;
        Ok(config)
    }

    /// Parse configuration text, detecting JSON by a leading `{`
    pub fn parse(content: &str) -> Result<Self> {
        let config: Self = if content.trim_start().starts_with('{') {
            serde_json::from_str(content)?
        } else {
            toml::from_str(content)?
        };
        config.validate()?;
        Ok(config)
    }

    /// Load and validate configuration from a file
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let config = Self::parse(&content)?;
        tracing::debug!("Loaded configuration from {}", path.display());
        Ok(config)
    }

    /// Write configuration as TOML
    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let path = path.as_ref();
        let content = toml::to_string_pretty(self)?;
        fs::write(path, content).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Find a config file: `./wallcal.toml` first, then the platform config
    /// directory. Falls back to defaults when neither exists.
    pub fn discover() -> Result<Self> {
        match Self::discover_path() {
            Some(path) => Self::load_from_file(path),
            None => {
                tracing::debug!("No {} found, using defaults", CONFIG_FILE_NAME);
                Ok(Self::default())
            }
        }
    }

    /// Location of the first existing config file, if any
    pub fn discover_path() -> Option<PathBuf> {
        let local = PathBuf::from(CONFIG_FILE_NAME);
        if local.is_file() {
            return Some(local);
        }
        directories::ProjectDirs::from("", "", "wallcal")
            .map(|dirs| dirs.config_dir().join(CONFIG_FILE_NAME))
            .filter(|path| path.is_file())
    }

    pub fn validate(&self) -> Result<()> {
        let mut errors = self.solver.problems();
        errors.extend(self.animation.problems());
        into_result(errors)
    }
}
