//! ## tracestat-core::flow::stats
//! **Flow table lifecycle counters**
//!
//! Counts the events a [`FlowTable`](super::FlowTable) produces so that the
//! orchestrator can report them without looking into the table's arena.

/// Lifecycle counters of a flow table.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct FlowTableStats {
    inserted: u64,
    expired: u64,
    removed: u64,
    peak_occupancy: usize,
}

impl FlowTableStats {
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    pub(crate) fn record_inserted(&mut self, occupancy: usize) {
        self.inserted += 1;
        self.peak_occupancy = self.peak_occupancy.max(occupancy);
    }

    #[inline]
    pub(crate) fn record_expired(&mut self, count: usize) {
        self.expired += count as u64;
    }

    #[inline]
    pub(crate) fn record_removed(&mut self) {
        self.removed += 1;
    }

    /// Flows ever inserted.
    pub fn inserted(&self) -> u64 {
        self.inserted
    }

    /// Flows evicted by TTL expiration.
    pub fn expired(&self) -> u64 {
        self.expired
    }

    /// Flows explicitly removed by the caller.
    pub fn removed(&self) -> u64 {
        self.removed
    }

    /// Highest number of flows held at once.
    pub fn peak_occupancy(&self) -> usize {
        self.peak_occupancy
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_flow_table_stats_increment_and_read() {
        let mut stats = FlowTableStats::new();
        assert_eq!(stats.inserted(), 0);
        assert_eq!(stats.peak_occupancy(), 0);

        stats.record_inserted(1);
        stats.record_inserted(2);
        stats.record_expired(2);
        stats.record_inserted(1);
        stats.record_removed();

        assert_eq!(stats.inserted(), 3);
        assert_eq!(stats.expired(), 2);
        assert_eq!(stats.removed(), 1);
        assert_eq!(stats.peak_occupancy(), 2);
    }
}
