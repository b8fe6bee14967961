//! ## tracestat-core::flow
//! **Flow identity table**
//!
//! ### Key Submodules:
//! - `table/`: bidirectional key <-> slot mapping over an `IndexChain`
//! - `stats/`: lifecycle counters (inserted / expired / removed / peak)
//! - `expiration/`: TTL reference point policy

pub mod expiration;
pub mod stats;
pub mod table;

pub use expiration::FlowExpiration;
pub use stats::FlowTableStats;
pub use table::{FlowTable, Insertion};
