//! Traffic tracker parameters.

use serde::{Deserialize, Serialize};
use validator::{self, Validate};

#[derive(Debug, Serialize, Deserialize, Validate, Clone)]
pub struct TrackerConfig {
    /// Length of a statistics epoch in nanoseconds of trace time.
    #[serde(default = "default_epoch_duration")]
    #[validate(range(min = 1))]
    pub epoch_duration_ns: i64,

    /// Log a progress line every this many packets.
    #[serde(default = "default_progress_interval")]
    #[validate(range(min = 1))]
    pub progress_interval: u64,
}

fn default_epoch_duration() -> i64 {
    1_000_000_000
}

fn default_progress_interval() -> u64 {
    1_000_000
}

impl Default for TrackerConfig {
    fn default() -> Self {
        Self {
            epoch_duration_ns: default_epoch_duration(),
            progress_interval: default_progress_interval(),
        }
    }
}
