//! Configuration loading.
//!
//! Merges the base TOML file, an optional profile overlay, and
//! `GRAINFLOW_`-prefixed environment variables. The loaded configuration
//! is validated before it is handed to the engine.

use crate::config::EngineConfig;
use anyhow::Result;
use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};

pub struct ConfigLoader;

impl ConfigLoader {
    /// Loads the engine configuration from defaults, TOML, and environment.
    ///
    /// # Errors
    ///
    /// Returns an error if configuration files cannot be read or parsed,
    /// or if the merged configuration is internally inconsistent.
    pub fn load() -> Result<EngineConfig> {
        let config: EngineConfig = Figment::from(Serialized::defaults(EngineConfig::default()))
            .merge(Toml::file("config/Config.toml"))
            .merge(Env::prefixed("GRAINFLOW_").split("__"))
            .extract()?;

        config.validate()?;
        Ok(config)
    }

    /// Loads configuration with a profile overlay (e.g., "backtest").
    ///
    /// # Errors
    ///
    /// Returns an error if configuration files cannot be read or parsed,
    /// or if the merged configuration is internally inconsistent.
    pub fn load_with_profile(profile: &str) -> Result<EngineConfig> {
        let config: EngineConfig = Figment::from(Serialized::defaults(EngineConfig::default()))
            .merge(Toml::file("config/Config.toml"))
            .merge(Toml::file(format!("config/Config.{profile}.toml")))
            .merge(Env::prefixed("GRAINFLOW_").split("__"))
            .extract()?;

        config.validate()?;
        tracing::debug!(profile, "loaded engine configuration");
        Ok(config)
    }
}
