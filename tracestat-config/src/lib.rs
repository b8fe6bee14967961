//! # tracestat Configuration
//!
//! Layered configuration for the analyzer and the replayer.
//!
//! ## Sources (later wins)
//! 1. Built-in defaults
//! 2. `config/tracestat.yaml`, if present
//! 3. An explicit file given on the command line
//! 4. `TRACESTAT_*` environment variables, `__` separating sections
//!    (`TRACESTAT_FLOW_TABLE__CAPACITY=65536`)

#![warn(unsafe_code)]
#![deny(rustdoc::broken_intra_doc_links)]

use std::path::Path;

use figment::{
    providers::{Env, Format, Serialized, Yaml},
    Figment,
};
use serde::{Deserialize, Serialize};
use validator::Validate;

mod error;
mod flow_table;
mod replay;
mod telemetry;
mod tracker;
mod validation;

pub use error::ConfigError;
pub use flow_table::{FlowExpiration, FlowTableConfig};
pub use replay::ReplayConfig;
pub use telemetry::TelemetryConfig;
pub use tracker::TrackerConfig;

pub const DEFAULT_CONFIG_PATH: &str = "config/tracestat.yaml";
pub const ENV_PREFIX: &str = "TRACESTAT_";

#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
pub struct TracestatConfig {
    /// Epoch and progress reporting of the traffic tracker.
    #[validate(nested)]
    #[serde(default)]
    pub tracker: TrackerConfig,

    /// Flow table sizing and eviction.
    #[validate(nested)]
    #[serde(default)]
    pub flow_table: FlowTableConfig,

    /// Trace replay parameters.
    #[validate(nested)]
    #[serde(default)]
    pub replay: ReplayConfig,

    #[validate(nested)]
    #[serde(default)]
    pub telemetry: TelemetryConfig,
}

impl TracestatConfig {
    /// Loads defaults, `config/tracestat.yaml` and the environment.
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_with(None)
    }

    /// Like [`TracestatConfig::load`], merging `path` on top of the default
    /// file. A missing explicit file is an error.
    pub fn load_with(path: Option<&Path>) -> Result<Self, ConfigError> {
        let mut figment = Figment::from(Serialized::defaults(TracestatConfig::default()));

        if Path::new(DEFAULT_CONFIG_PATH).exists() {
            figment = figment.merge(Yaml::file(DEFAULT_CONFIG_PATH));
        }

        if let Some(path) = path {
            if !path.exists() {
                return Err(ConfigError::FileNotFound(path.to_path_buf()));
            }
            figment = figment.merge(Yaml::file(path));
        }

        Self::extract(figment.merge(Env::prefixed(ENV_PREFIX).split("__")))
    }

    /// Loads a single file on top of the defaults, ignoring the environment.
    pub fn load_from_path<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(ConfigError::FileNotFound(path.to_path_buf()));
        }

        Self::extract(
            Figment::from(Serialized::defaults(TracestatConfig::default())).merge(Yaml::file(path)),
        )
    }

    /// Re-runs validation, for values changed after loading.
    pub fn ensure_valid(&self) -> Result<(), ConfigError> {
        self.validate()?;
        Ok(())
    }

    fn extract(figment: Figment) -> Result<Self, ConfigError> {
        figment
            .extract()
            .map_err(ConfigError::from)
            .and_then(|config: Self| {
                config.validate()?;
                Ok(config)
            })
    }
}
