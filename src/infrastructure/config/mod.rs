//! Configuration loading with hierarchical merging.

use anyhow::{Context, Result};
use figment::providers::{Env, Format, Serialized, Yaml};
use figment::Figment;
use thiserror::Error;

use crate::domain::models::config::Config;

/// Configuration error types.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Invalid max_passes: {0}. Must be between 1 and 25")]
    InvalidMaxPasses(u32),

    #[error("Invalid min_refine_passes: {0}. Must be at least 1 and no greater than max_passes ({1})")]
    InvalidMinRefinePasses(u32, u32),

    #[error("Invalid threshold {name}: {value}. Must be within (0, 1]")]
    InvalidThreshold { name: &'static str, value: f64 },

    #[error("Invalid high_stakes_amount_threshold: {0}. Must be positive")]
    InvalidAmountThreshold(f64),

    #[error("Invalid high_stakes_deadline_hours: {0}. Must be positive")]
    InvalidDeadlineHours(i64),

    #[error("Invalid tier timeout: {0}s. Must be positive")]
    InvalidTierTimeout(u64),

    #[error("Invalid max_concurrent_analyses: {0}. Must be between 1 and 256")]
    InvalidMaxConcurrent(usize),

    #[error("Invalid log level: {0}. Must be one of: trace, debug, info, warn, error")]
    InvalidLogLevel(String),

    #[error("Invalid log format: {0}. Must be one of: json, pretty")]
    InvalidLogFormat(String),
}

/// Configuration loader with hierarchical merging.
pub struct ConfigLoader;

impl ConfigLoader {
    /// Load configuration with hierarchical merging.
    ///
    /// Precedence (lowest to highest):
    /// 1. Programmatic defaults (Serialized)
    /// 2. .adjutant/config.yaml (project config)
    /// 3. .adjutant/local.yaml (local overrides, optional)
    /// 4. Environment variables (ADJUTANT_* prefix, highest priority)
    pub fn load() -> Result<Config> {
        let config: Config = Figment::new()
            .merge(Serialized::defaults(Config::default()))
            .merge(Yaml::file(".adjutant/config.yaml"))
            .merge(Yaml::file(".adjutant/local.yaml"))
            .merge(Env::prefixed("ADJUTANT_").split("__"))
            .extract()
            .context("Failed to extract configuration from figment")?;

        Self::validate(&config)?;
        Ok(config)
    }

    /// Load configuration from a specific file.
    pub fn load_from_file(path: impl AsRef<std::path::Path>) -> Result<Config> {
        let config: Config = Figment::new()
            .merge(Serialized::defaults(Config::default()))
            .merge(Yaml::file(path.as_ref()))
            .extract()
            .context(format!(
                "Failed to load config from {}",
                path.as_ref().display()
            ))?;

        Self::validate(&config)?;
        Ok(config)
    }

    /// Validate configuration after loading.
    pub fn validate(config: &Config) -> Result<(), ConfigError> {
        let analysis = &config.analysis;

        if analysis.max_passes == 0 || analysis.max_passes > 25 {
            return Err(ConfigError::InvalidMaxPasses(analysis.max_passes));
        }

        if analysis.min_refine_passes == 0 || analysis.min_refine_passes > analysis.max_passes {
            return Err(ConfigError::InvalidMinRefinePasses(
                analysis.min_refine_passes,
                analysis.max_passes,
            ));
        }

        for (name, value) in [
            ("auto_apply_threshold", analysis.auto_apply_threshold),
            (
                "required_enrichment_threshold",
                analysis.required_enrichment_threshold,
            ),
            ("convergence_confidence", analysis.convergence_confidence),
            ("escalation_floor", analysis.escalation_floor),
        ] {
            if !(value > 0.0 && value <= 1.0) {
                return Err(ConfigError::InvalidThreshold { name, value });
            }
        }

        if let Some(amount) = analysis.high_stakes_amount_threshold {
            if amount <= 0.0 {
                return Err(ConfigError::InvalidAmountThreshold(amount));
            }
        }

        if analysis.high_stakes_deadline_hours <= 0 {
            return Err(ConfigError::InvalidDeadlineHours(
                analysis.high_stakes_deadline_hours,
            ));
        }

        for secs in [
            analysis.tier_timeouts.fast_cheap_secs,
            analysis.tier_timeouts.balanced_secs,
            analysis.tier_timeouts.expert_secs,
        ] {
            if secs == 0 {
                return Err(ConfigError::InvalidTierTimeout(secs));
            }
        }

        let max_concurrent = config.concurrency.max_concurrent_analyses;
        if max_concurrent == 0 || max_concurrent > 256 {
            return Err(ConfigError::InvalidMaxConcurrent(max_concurrent));
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
