//! ## tracestat-core::alloc
//! **Fixed-capacity slot allocation**
//!
//! ### Key Submodules:
//! - `index_chain/`: arena of slots threaded by a free list and an
//!   activation-ordered allocated list

pub mod index_chain;

pub use index_chain::{AllocatedIter, IndexChain, SlotState};
