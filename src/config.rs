//! Star field configuration.
//!
//! All tunables live here: pool sizes, variant pools, shooting-star
//! intervals. Configs load from TOML or JSON files and are validated once,
//! before any GPU resource exists; the simulation itself has no per-frame
//! failure paths.

use glam::{Vec3, Vec4};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use thiserror::Error;

/// Configuration error
#[derive(Error, Debug)]
pub enum ConfigError {
    /// File read error
    #[error("Config file error: {0}")]
    FileError(#[from] std::io::Error),
    /// Parse error
    #[error("Config parse error: {0}")]
    ParseError(String),
    /// Validation error
    #[error("Config validation error: {0}")]
    ValidationError(String),
}

pub type ConfigResult<T> = Result<T, ConfigError>;

/// Star field configuration.
///
/// The variant pools (`colors`, `directions`, `speeds`, `twinkles`,
/// `star_sizes`, `huge_star_sizes`) are sampled uniformly and independently
/// per star at initialization. Every pool must contain at least one element
/// (`huge_star_sizes` only when `huge_star_ratio > 0`).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StarFieldConfig {
    /// Number of stars; clamped to the point-topology vertex ceiling (65000).
    pub star_amount: u32,

    /// Per-star tint variants (RGBA).
    pub colors: Vec<Vec4>,

    /// Travel direction variants; the Y component is ignored, the XZ
    /// projection must be non-zero.
    pub directions: Vec<Vec3>,

    /// Speed scalar variants.
    pub speeds: Vec<f32>,

    /// Twinkle-speed coefficient variants.
    pub twinkles: Vec<f32>,

    /// Baseline sprite scale variants.
    pub star_sizes: Vec<f32>,

    /// Huge-star sprite scale variants.
    pub huge_star_sizes: Vec<f32>,

    /// Huge-star selection spacing: every `huge_star_ratio`-th record id
    /// renders at `huge_star_size`; 0 disables huge stars entirely. Note
    /// this is the spacing between huge stars, not a huge-star count, so
    /// 1 makes *every* star huge.
    pub huge_star_ratio: u32,

    /// Sprite scale used while a record is shooting.
    pub shooting_star_size: f32,

    /// Base seconds between shooting stars (normal mode).
    pub shooting_star_interval: f32,

    /// Uniform jitter added to the normal-mode interval.
    pub shooting_star_randomize_range: f32,

    /// Base seconds between shooting stars (dense mode).
    pub full_shooting_star_interval: f32,

    /// Uniform jitter added to the dense-mode interval.
    pub full_shooting_star_randomize_range: f32,
}

impl Default for StarFieldConfig {
    fn default() -> Self {
        Self {
            star_amount: 3000,
            colors: vec![Vec4::ONE],
            directions: vec![Vec3::new(1.0, 0.0, 0.35)],
            speeds: vec![0.05, 0.12, 0.3],
            twinkles: vec![4.0, 8.0, 14.0],
            star_sizes: vec![0.2, 0.3, 0.5],
            huge_star_sizes: vec![1.2, 1.6],
            huge_star_ratio: 25,
            shooting_star_size: 0.45,
            shooting_star_interval: 30.0,
            shooting_star_randomize_range: 3.0,
            full_shooting_star_interval: 2.0,
            full_shooting_star_randomize_range: 2.0,
        }
    }
}

impl StarFieldConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Loads a configuration from a TOML file.
    pub fn from_toml_file<P: AsRef<Path>>(path: P) -> ConfigResult<Self> {
        let content = fs::read_to_string(path).map_err(ConfigError::FileError)?;
        Self::from_toml_str(&content)
    }

    /// Parses a configuration from a TOML string.
    pub fn from_toml_str(content: &str) -> ConfigResult<Self> {
        toml::from_str(content).map_err(|e| ConfigError::ParseError(e.to_string()))
    }

    /// Loads a configuration from a JSON file.
    pub fn from_json_file<P: AsRef<Path>>(path: P) -> ConfigResult<Self> {
        let content = fs::read_to_string(path).map_err(ConfigError::FileError)?;
        Self::from_json_str(&content)
    }

    /// Parses a configuration from a JSON string.
    pub fn from_json_str(content: &str) -> ConfigResult<Self> {
        serde_json::from_str(content).map_err(|e| ConfigError::ParseError(e.to_string()))
    }

    /// Validates the configuration.
    ///
    /// Empty required pools, degenerate directions and negative intervals
    /// are configuration errors; the system must not proceed to render with
    /// an invalid config.
    pub fn validate(&self) -> ConfigResult<()> {
        Self::check_pool("colors", self.colors.len())?;
        Self::check_pool("directions", self.directions.len())?;
        Self::check_pool("speeds", self.speeds.len())?;
        Self::check_pool("twinkles", self.twinkles.len())?;
        Self::check_pool("star_sizes", self.star_sizes.len())?;
        if self.huge_star_ratio > 0 {
            Self::check_pool("huge_star_sizes", self.huge_star_sizes.len())?;
        }

        for (i, dir) in self.directions.iter().enumerate() {
            if Vec3::new(dir.x, 0.0, dir.z).length_squared() <= f32::EPSILON {
                return Err(ConfigError::ValidationError(format!(
                    "directions[{i}] has a zero XZ projection and cannot be normalized"
                )));
            }
        }

        for (name, value) in [
            ("shooting_star_interval", self.shooting_star_interval),
            ("shooting_star_randomize_range", self.shooting_star_randomize_range),
            ("full_shooting_star_interval", self.full_shooting_star_interval),
            (
                "full_shooting_star_randomize_range",
                self.full_shooting_star_randomize_range,
            ),
        ] {
            if !value.is_finite() || value < 0.0 {
                return Err(ConfigError::ValidationError(format!(
                    "{name} is {value}, expected a finite value >= 0"
                )));
            }
        }

        Ok(())
    }

    fn check_pool(name: &str, len: usize) -> ConfigResult<()> {
        if len == 0 {
            return Err(ConfigError::ValidationError(format!(
                "{name} count is 0, please set at least 1 variant"
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_valid() {
        assert!(StarFieldConfig::default().validate().is_ok());
    }

    #[test]
    fn empty_pool_is_rejected() {
        let mut config = StarFieldConfig::default();
        config.speeds.clear();
        let err = config.validate().unwrap_err();
        assert!(matches!(err, ConfigError::ValidationError(_)));
        assert!(err.to_string().contains("speeds"));
    }

    #[test]
    fn default_ratio_makes_huge_stars_the_exception() {
        let config = StarFieldConfig::default();
        let huge = (0..100u32)
            .filter(|id| crate::render::is_huge_star(*id, config.huge_star_ratio))
            .count();
        assert!(huge > 0);
        assert!(huge < 10, "{huge} of 100 stars render huge by default");
    }

    #[test]
    fn huge_star_sizes_only_required_when_ratio_positive() {
        let mut config = StarFieldConfig::default();
        config.huge_star_sizes.clear();
        assert!(config.validate().is_err());

        config.huge_star_ratio = 0;
        assert!(config.validate().is_ok());
    }

    #[test]
    fn vertical_direction_is_rejected() {
        let mut config = StarFieldConfig::default();
        config.directions = vec![Vec3::Y];
        assert!(config.validate().is_err());
    }

    #[test]
    fn negative_interval_is_rejected() {
        let mut config = StarFieldConfig::default();
        config.shooting_star_interval = -1.0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn toml_round_trip() {
        let config = StarFieldConfig::default();
        let text = toml::to_string(&config).unwrap();
        let parsed = StarFieldConfig::from_toml_str(&text).unwrap();
        assert_eq!(parsed.star_amount, config.star_amount);
        assert_eq!(parsed.directions.len(), config.directions.len());
    }

    #[test]
    fn json_parse_reports_errors() {
        assert!(matches!(
            StarFieldConfig::from_json_str("{ not json"),
            Err(ConfigError::ParseError(_))
        ));
    }
}
