//! Trace replay parameters.

use serde::{Deserialize, Serialize};
use validator::{self, Validate};

use crate::validation;

#[derive(Debug, Serialize, Deserialize, Validate, Clone)]
pub struct ReplayConfig {
    /// Interface the frames are injected on.
    #[validate(custom(function = validation::validate_interface))]
    #[serde(default = "default_interface")]
    pub interface: String,

    /// Synthetic line rate in Mbit/s.
    #[validate(range(min = 1, max = 1000000))]
    #[serde(default = "default_rate")]
    pub rate_mbps: u64,

    /// Number of passes over the trace.
    #[validate(range(min = 1))]
    #[serde(default = "default_loops")]
    pub loops: u32,
}

fn default_interface() -> String {
    "eth0".into()
}

fn default_rate() -> u64 {
    1000
}

fn default_loops() -> u32 {
    1
}

impl Default for ReplayConfig {
    fn default() -> Self {
        Self {
            interface: default_interface(),
            rate_mbps: default_rate(),
            loops: default_loops(),
        }
    }
}
