//! Flow table sizing and eviction.
//!
//! The table is allocated up front, so `capacity` bounds memory use as well
//! as the number of flows alive at the same time.

use serde::{Deserialize, Serialize};
use validator::{self, Validate};

pub use tracestat_core::FlowExpiration;

#[derive(Debug, Serialize, Deserialize, Validate, Clone)]
pub struct FlowTableConfig {
    #[serde(default = "default_capacity")]
    #[validate(range(min = 1, max = 67108864))]
    pub capacity: usize,

    #[serde(default = "default_ttl")]
    #[validate(range(min = 1))]
    pub ttl_ns: i64,

    #[serde(default)]
    pub expiration: FlowExpiration,
}

fn default_capacity() -> usize {
    1 << 20
}

fn default_ttl() -> i64 {
    1_000_000_000
}

impl Default for FlowTableConfig {
    fn default() -> Self {
        Self {
            capacity: default_capacity(),
            ttl_ns: default_ttl(),
            expiration: FlowExpiration::default(),
        }
    }
}
