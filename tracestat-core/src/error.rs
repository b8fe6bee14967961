use thiserror::Error;

/// Errors returned by [`IndexChain`](crate::alloc::IndexChain).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ChainError {
    #[error("Invalid capacity (must be greater than zero)")]
    InvalidCapacity,

    #[error("No free slot left (capacity {capacity})")]
    CapacityExhausted { capacity: usize },

    #[error("Slot {0} is not allocated")]
    SlotNotAllocated(usize),

    #[error("Slot {index} is out of range (capacity {capacity})")]
    IndexOutOfRange { index: usize, capacity: usize },
}

/// Errors returned by [`FlowTable`](crate::flow::FlowTable).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum FlowTableError {
    /// The table was sized too small for the workload.
    #[error("flow table capacity exceeded (capacity {capacity})")]
    CapacityExceeded { capacity: usize },

    #[error(transparent)]
    Chain(#[from] ChainError),
}

/// Error returned when parsing a [`FlowExpiration`](crate::flow::FlowExpiration) name.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown flow expiration '{0}' (expected creation or activity)")]
pub struct ParseExpirationError(pub String);
