//! # tracestat-core
//!
//! Flow table engine for offline trace analysis.
//!
//! Everything here is synchronous, allocation-free after construction and
//! driven by caller-supplied timestamps, so a replayed trace always produces
//! the same sequence of allocations and evictions.
//!
//! ### Key Submodules:
//! - `alloc`: fixed-capacity index allocator with time-ordered eviction
//! - `flow`: flow identity table built on top of the allocator
//! - `time`: nanosecond time type and the epoch ticker

pub mod alloc;
pub mod error;
pub mod flow;
pub mod time;

pub mod prelude {
    pub use crate::alloc::*;
    pub use crate::error::*;
    pub use crate::flow::*;
    pub use crate::time::*;
}

pub use alloc::IndexChain;
pub use error::{ChainError, FlowTableError, ParseExpirationError};
pub use flow::{FlowExpiration, FlowTable, Insertion};
pub use time::{EpochClock, TimeNs};
