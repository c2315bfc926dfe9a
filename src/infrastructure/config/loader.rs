use anyhow::{Context, Result};
use figment::providers::{Env, Format, Serialized, Yaml};
use figment::Figment;
use thiserror::Error;

use crate::domain::models::Config;

/// Configuration error types
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Invalid max_correction_attempts: {0}. Must be at least 1")]
    InvalidMaxAttempts(u32),

    #[error("Invalid stagnation_ceiling: {0}. Must be at least 1")]
    InvalidStagnationCeiling(u32),

    #[error("Invalid base_temperature: {0}. Must be between 0.0 and 1.0")]
    InvalidBaseTemperature(f32),

    #[error("Invalid approx_min_cases_to_cover: {0}. Must be at least 1")]
    InvalidMinCases(u32),

    #[error("Invalid log level: {0}. Must be one of: trace, debug, info, warn, error")]
    InvalidLogLevel(String),

    #[error("Invalid log format: {0}. Must be one of: json, pretty")]
    InvalidLogFormat(String),

    #[error(
        "Invalid backoff configuration: initial_backoff_ms ({0}) must be less than max_backoff_ms ({1})"
    )]
    InvalidBackoff(u64, u64),

    #[error("Configuration validation failed: {0}")]
    ValidationFailed(String),
}

/// Configuration loader with hierarchical merging
pub struct ConfigLoader;

impl ConfigLoader {
    /// Load configuration with hierarchical merging.
    ///
    /// Precedence (lowest to highest):
    /// 1. Programmatic defaults (Serialized)
    /// 2. .testforge/config.yaml (project config)
    /// 3. .testforge/local.yaml (project local overrides, optional)
    /// 4. Environment variables (TESTFORGE_* prefix, highest priority)
    pub fn load() -> Result<Config> {
        let config: Config = Figment::new()
            .merge(Serialized::defaults(Config::default()))
            .merge(Yaml::file(".testforge/config.yaml"))
            .merge(Yaml::file(".testforge/local.yaml"))
            .merge(Env::prefixed("TESTFORGE_").split("__"))
            .extract()
            .context("Failed to extract configuration from figment")?;

        Self::validate(&config)?;
        Ok(config)
    }

    /// Load configuration from a specific file
    pub fn load_from_file(path: impl AsRef<std::path::Path>) -> Result<Config> {
        let config: Config = Figment::new()
            .merge(Serialized::defaults(Config::default()))
            .merge(Yaml::file(path.as_ref()))
            .merge(Env::prefixed("TESTFORGE_").split("__"))
            .extract()
            .context(format!("Failed to load config from {}", path.as_ref().display()))?;

        Self::validate(&config)?;
        Ok(config)
    }

    /// Validate configuration after loading
    pub fn validate(config: &Config) -> Result<(), ConfigError> {
        if config.convergence.max_correction_attempts == 0 {
            return Err(ConfigError::InvalidMaxAttempts(config.convergence.max_correction_attempts));
        }

        if config.convergence.stagnation_ceiling == 0 {
            return Err(ConfigError::InvalidStagnationCeiling(config.convergence.stagnation_ceiling));
        }

        let base = config.convergence.base_temperature;
        if !(0.0..=1.0).contains(&base) {
            return Err(ConfigError::InvalidBaseTemperature(base));
        }

        if config.generation.approx_min_cases_to_cover == 0 {
            return Err(ConfigError::InvalidMinCases(config.generation.approx_min_cases_to_cover));
        }

        for (name, model) in [
            ("models.explain", &config.models.explain),
            ("models.plan", &config.models.plan),
            ("models.execute", &config.models.execute),
        ] {
            if model.is_empty() {
                return Err(ConfigError::ValidationFailed(format!("{name} cannot be empty")));
            }
        }

        if config.runner.pytest_bin.is_empty() {
            return Err(ConfigError::ValidationFailed("runner.pytest_bin cannot be empty".to_string()));
        }

        if config.runner.test_output_path.is_empty() {
            return Err(ConfigError::ValidationFailed(
                "runner.test_output_path cannot be empty".to_string(),
            ));
        }

        if config.api.initial_backoff_ms >= config.api.max_backoff_ms {
            return Err(ConfigError::InvalidBackoff(
                config.api.initial_backoff_ms,
                config.api.max_backoff_ms,
            ));
        }

        let valid_log_levels = ["trace", "debug", "info", "warn", "error"];
        if !valid_log_levels.contains(&config.logging.level.as_str()) {
            return Err(ConfigError::InvalidLogLevel(config.logging.level.clone()));
        }

        let valid_log_formats = ["json", "pretty"];
        if !valid_log_formats.contains(&config.logging.format.as_str()) {
            return Err(ConfigError::InvalidLogFormat(config.logging.format.clone()));
        }

        Ok(())
    }
}
