//! # Lockbete Configuration System
//!
//! Hierarchical configuration for the SNMP sensor.
//!
//! ## Features
//! - **Unified Configuration**: one document covers listener, evidence sink,
//!   decoy replies and telemetry
//! - **Validation**: every loaded configuration is validated before use
//! - **Environment Awareness**: per-environment overlay files and
//!   `LOCKBETE_*` variables

#![warn(unsafe_code)]
#![deny(rustdoc::broken_intra_doc_links)]

use std::path::{Path, PathBuf};

use figment::{
    providers::{Env, Format, Serialized, Yaml},
    Figment,
};
use serde::{Deserialize, Serialize};
use validator::Validate;

mod error;
mod listener;
mod responder;
mod sink;
mod telemetry;
mod validation;

pub use error::ConfigError;
pub use listener::ListenerConfig;
pub use responder::ResponderConfig;
pub use sink::SinkConfig;
pub use telemetry::TelemetryConfig;

/// Top‑level configuration container.
#[derive(Debug, Serialize, Deserialize, Validate, Default, Clone)]
pub struct LockbeteConfig {
    /// UDP listener parameters.
    #[validate(nested)]
    #[serde(default)]
    pub listener: ListenerConfig,

    /// Evidence log destination.
    #[validate(nested)]
    #[serde(default)]
    pub sink: SinkConfig,

    /// Decoy reply policy.
    #[validate(nested)]
    #[serde(default)]
    pub responder: ResponderConfig,

    /// Operational logging.
    #[validate(nested)]
    #[serde(default)]
    pub telemetry: TelemetryConfig,
}

impl LockbeteConfig {
    /// Load configuration from default files and environment.
    ///
    /// Hierarchy:
    /// 1. Default Values
    /// 2. `config/lockbete.yaml` - Base settings. If missing, defaults are used.
    /// 3. `config/<LOCKBETE_ENV>.yaml` - Environment‑specific overrides.
    /// 4. `LOCKBETE_*` environment variables, `__` separating sections.
    pub fn load() -> Result<Self, ConfigError> {
        let mut figment = Figment::from(Serialized::defaults(LockbeteConfig::default()));

        if Path::new("config/lockbete.yaml").exists() {
            figment = figment.merge(Yaml::file("config/lockbete.yaml"));
        }

        let env = std::env::var("LOCKBETE_ENV").unwrap_or_else(|_| "production".into());
        let env_file = format!("config/{}.yaml", env);
        if Path::new(&env_file).exists() {
            figment = figment.merge(Yaml::file(env_file));
        }

        Self::finish(figment)
    }

    /// Load configuration from a specific file, still honouring `LOCKBETE_*`
    /// overrides.
    pub fn load_from_path<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(ConfigError::FileNotFound(PathBuf::from(path)));
        }

        let figment = Figment::from(Serialized::defaults(LockbeteConfig::default()))
            .merge(Yaml::file(path));
        Self::finish(figment)
    }

    fn finish(figment: Figment) -> Result<Self, ConfigError> {
        figment
            .merge(Env::prefixed("LOCKBETE_").split("__"))
            .extract()
            .map_err(ConfigError::from)
            .and_then(|config: Self| {
                config.validate()?;
                Ok(config)
            })
    }
}
