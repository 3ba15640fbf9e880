//! Engine configuration, loadable from TOML.

use std::path::Path;

use derive_more::Display;
use serde::{Deserialize, Serialize};

/// Tunables for the difficulty tiers and the classic search layers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Chance that Easy plays the optimal route instead of a random cell.
    pub easy_search_chance: f64,
    /// Chance that Medium plays a random cell instead of its tactics.
    pub medium_noise: f64,
    /// Answer known openings from the book.
    pub opening_book: bool,
    /// Remember searched positions for the rest of the game.
    pub transposition_cache: bool,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            easy_search_chance: 0.3,
            medium_noise: 0.15,
            opening_book: true,
            transposition_cache: true,
        }
    }
}

#[derive(Debug, Display)]
pub enum ConfigError {
    #[display("Failed to read config: {}", _0)]
    Io(std::io::Error),

    #[display("Failed to parse config: {}", _0)]
    Parse(toml::de::Error),

    #[display("Invalid config: {}", _0)]
    Invalid(String),
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ConfigError::Io(e) => Some(e),
            ConfigError::Parse(e) => Some(e),
            ConfigError::Invalid(_) => None,
        }
    }
}

impl From<std::io::Error> for ConfigError {
    fn from(e: std::io::Error) -> Self {
        ConfigError::Io(e)
    }
}

impl From<toml::de::Error> for ConfigError {
    fn from(e: toml::de::Error) -> Self {
        ConfigError::Parse(e)
    }
}

impl EngineConfig {
    /// Parse and validate a TOML document. Missing keys keep their defaults.
    pub fn from_toml_str(s: &str) -> Result<Self, ConfigError> {
        let config: EngineConfig = toml::from_str(s)?;
        config.validate()?;
        Ok(config)
    }

    /// Read, parse and validate a TOML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path)?;
        Self::from_toml_str(&text)
    }

    /// Probabilities must lie in [0, 1].
    pub fn validate(&self) -> Result<(), ConfigError> {
        for (name, p) in [
            ("easy_search_chance", self.easy_search_chance),
            ("medium_noise", self.medium_noise),
        ] {
            if !(0.0..=1.0).contains(&p) {
                return Err(ConfigError::Invalid(format!(
                    "{} must be within [0, 1], got {}",
                    name, p
                )));
            }
        }
        Ok(())
    }

    /// No randomness anywhere: Easy always plays optimally, Medium never adds noise.
    pub fn deterministic() -> Self {
        Self {
            easy_search_chance: 1.0,
            medium_noise: 0.0,
            ..Self::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = EngineConfig::default();
        assert_eq!(config.easy_search_chance, 0.3);
        assert_eq!(config.medium_noise, 0.15);
        assert!(config.opening_book);
        assert!(config.transposition_cache);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let text = "medium_noise = 0.0\nopening_book = false\n";
        let config = EngineConfig::from_toml_str(text).unwrap();
        assert_eq!(config.medium_noise, 0.0);
        assert!(!config.opening_book);
        assert_eq!(config.easy_search_chance, 0.3);
        assert!(config.transposition_cache);
    }

    #[test]
    fn test_empty_toml_is_default() {
        assert_eq!(EngineConfig::from_toml_str("").unwrap(), EngineConfig::default());
    }

    #[test]
    fn test_out_of_range_rejected() {
        let err = EngineConfig::from_toml_str("easy_search_chance = 1.5").unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(_)));
        assert!(err.to_string().contains("easy_search_chance"));

        let nan = EngineConfig {
            medium_noise: f64::NAN,
            ..EngineConfig::default()
        };
        assert!(nan.validate().is_err());
    }

    #[test]
    fn test_parse_error() {
        let err = EngineConfig::from_toml_str("medium_noise = \"lots\"").unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn test_missing_file() {
        let err = EngineConfig::load("/nonexistent/tictwist.toml").unwrap_err();
        assert!(matches!(err, ConfigError::Io(_)));
    }
}
