//! ## tracestat-analysis::tracker
//! **Per-packet traffic orchestrator**
//!
//! [`TrafficStatsTracker`] is fed packets in trace order. It keeps the
//! aggregate counters of the report and drives a [`FlowTable`] that bounds
//! how many flows are considered live at once. Flow-table bookkeeping is
//! derived from the table's own insertion and eviction results, never from
//! its internals.

use std::collections::{HashMap, HashSet};

use tracing::{debug, info};

use tracestat_capture::CapturedPacket;
use tracestat_core::time::NANOS_PER_MICRO;
use tracestat_core::{EpochClock, FlowExpiration, FlowTable, TimeNs};
use tracestat_protocols::{FlowKey, SymmetricFlowKey};

use crate::cdf::Cdf;
use crate::error::AnalysisError;
use crate::report::{FlowTableReport, TrafficReport};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TrackerSettings {
    pub epoch_duration_ns: TimeNs,
    pub progress_interval: u64,
    pub flow_capacity: usize,
    pub flow_ttl_ns: TimeNs,
    pub expiration: FlowExpiration,
}

impl Default for TrackerSettings {
    fn default() -> Self {
        Self {
            epoch_duration_ns: 1_000_000_000,
            progress_interval: 1_000_000,
            flow_capacity: 1 << 20,
            flow_ttl_ns: 1_000_000_000,
            expiration: FlowExpiration::Creation,
        }
    }
}

/// Flow-table events caused by one packet.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PacketOutcome {
    pub flow_inserted: bool,
    pub flows_expired: usize,
}

#[derive(Debug, Clone)]
struct FlowRecord {
    packets: u64,
    bytes: u64,
    first: TimeNs,
    last: TimeNs,
    dt_sum_us: u64,
    dt_count: u64,
}

impl FlowRecord {
    fn new(ts: TimeNs, bytes: u64) -> Self {
        Self {
            packets: 1,
            bytes,
            first: ts,
            last: ts,
            dt_sum_us: 0,
            dt_count: 0,
        }
    }

    fn update(&mut self, ts: TimeNs, bytes: u64) {
        self.packets += 1;
        self.bytes += bytes;
        self.dt_sum_us += to_micros(ts - self.last);
        self.dt_count += 1;
        self.last = ts;
    }
}

#[derive(Debug)]
pub struct TrafficStatsTracker {
    settings: TrackerSettings,
    clock: EpochClock,
    table: FlowTable<FlowKey>,
    // Latest timestamp seen; the flow table never sees time go backwards.
    table_now: TimeNs,

    start: Option<TimeNs>,
    end: TimeNs,
    total_pkts: u64,
    tcpudp_pkts: u64,
    pkt_sizes: Cdf,

    flows: HashMap<FlowKey, FlowRecord>,
    symm_flows: HashSet<SymmetricFlowKey>,

    epoch_flows: HashSet<FlowKey>,
    epoch_expired: u64,
    concurrent_flows_per_epoch: Cdf,
    expired_per_epoch: Cdf,
}

impl TrafficStatsTracker {
    pub fn new(settings: TrackerSettings) -> Result<Self, AnalysisError> {
        if settings.epoch_duration_ns <= 0 {
            return Err(AnalysisError::InvalidEpochDuration(settings.epoch_duration_ns));
        }
        if settings.flow_ttl_ns <= 0 {
            return Err(AnalysisError::InvalidTtl(settings.flow_ttl_ns));
        }
        if settings.progress_interval == 0 {
            return Err(AnalysisError::InvalidProgressInterval);
        }
        let table = FlowTable::with_capacity(settings.flow_capacity)?;

        debug!(
            capacity = settings.flow_capacity,
            ttl_ns = settings.flow_ttl_ns,
            expiration = %settings.expiration,
            epoch_ns = settings.epoch_duration_ns,
            "traffic tracker created"
        );

        Ok(Self {
            settings,
            clock: EpochClock::new(settings.epoch_duration_ns),
            table,
            table_now: TimeNs::MIN,
            start: None,
            end: 0,
            total_pkts: 0,
            tcpudp_pkts: 0,
            pkt_sizes: Cdf::new(),
            flows: HashMap::new(),
            symm_flows: HashSet::new(),
            epoch_flows: HashSet::new(),
            epoch_expired: 0,
            concurrent_flows_per_epoch: Cdf::new(),
            expired_per_epoch: Cdf::new(),
        })
    }

    pub fn settings(&self) -> &TrackerSettings {
        &self.settings
    }

    pub fn total_packets(&self) -> u64 {
        self.total_pkts
    }

    /// Flows currently held by the flow table.
    pub fn live_flows(&self) -> usize {
        self.table.len()
    }

    /// Accounts one packet. Fails only when a new flow does not fit in the
    /// flow table.
    pub fn feed_packet(&mut self, packet: &CapturedPacket) -> Result<PacketOutcome, AnalysisError> {
        let ts = packet.timestamp_ns;
        let wire_len = u64::from(packet.wire_len);

        self.end = ts;
        self.start.get_or_insert(ts);
        self.total_pkts += 1;
        self.pkt_sizes.add(wire_len);

        let Some(flow) = packet.flow else {
            return Ok(PacketOutcome::default());
        };

        if self.total_pkts % self.settings.progress_interval == 0 {
            info!(ts = ts, packets = self.total_pkts, "processed packets");
        }

        if self.clock.tick(ts) {
            self.close_epoch();
        }

        self.tcpudp_pkts += 1;
        self.symm_flows.insert(SymmetricFlowKey::from(flow));
        self.epoch_flows.insert(flow);
        self.flows
            .entry(flow)
            .and_modify(|record| record.update(ts, wire_len))
            .or_insert_with(|| FlowRecord::new(ts, wire_len));

        if ts < self.table_now {
            debug!(ts = ts, now = self.table_now, "out-of-order packet");
        }
        self.table_now = self.table_now.max(ts);
        let now = self.table_now;

        let flows_expired = self.table.expire_all(now, self.settings.flow_ttl_ns);
        self.epoch_expired += flows_expired as u64;

        let insertion = self.table.observe(flow, now, self.settings.expiration)?;

        Ok(PacketOutcome {
            flow_inserted: insertion.is_new(),
            flows_expired,
        })
    }

    fn close_epoch(&mut self) {
        self.concurrent_flows_per_epoch.add(self.epoch_flows.len() as u64);
        self.expired_per_epoch.add(self.epoch_expired);
        self.epoch_flows.clear();
        self.epoch_expired = 0;
    }

    /// Builds the report. The epoch in progress counts as a full epoch.
    pub fn report(&self) -> TrafficReport {
        let mut concurrent = self.concurrent_flows_per_epoch.clone();
        concurrent.add(self.epoch_flows.len() as u64);
        let mut expired = self.expired_per_epoch.clone();
        expired.add(self.epoch_expired);

        let mut pkts_per_flow = Cdf::new();
        let mut flow_duration_us = Cdf::new();
        let mut flow_dts_us = Cdf::new();
        let mut packets: Vec<u64> = Vec::with_capacity(self.flows.len());
        let mut bytes: Vec<u64> = Vec::with_capacity(self.flows.len());

        for record in self.flows.values() {
            pkts_per_flow.add(record.packets);
            packets.push(record.packets);
            bytes.push(record.bytes);
            flow_duration_us.add(to_micros(record.last - record.first));
            if record.dt_count > 0 {
                flow_dts_us.add(record.dt_sum_us / record.dt_count);
            }
        }

        packets.sort_unstable_by(|a, b| b.cmp(a));
        bytes.sort_unstable_by(|a, b| b.cmp(a));
        let mut top_k_flows = Cdf::new();
        let mut top_k_flows_bytes = Cdf::new();
        for (rank, (pkts, bytes)) in packets.iter().zip(&bytes).enumerate() {
            top_k_flows.add_n(rank as u64 + 1, *pkts);
            top_k_flows_bytes.add_n(rank as u64 + 1, *bytes);
        }

        let stats = self.table.stats();
        let flow_table = FlowTableReport {
            capacity: self.table.capacity(),
            ttl_ns: self.settings.flow_ttl_ns,
            expiration: self.settings.expiration.to_string(),
            inserted: stats.inserted(),
            expired: stats.expired(),
            peak_occupancy: stats.peak_occupancy(),
            expired_per_epoch_avg: expired.mean(),
            expired_per_epoch_stdev: expired.stdev(),
            expired_per_epoch_cdf: expired.series(),
        };

        TrafficReport::new(self.start.unwrap_or(0), self.end)
            .with_packets(self.total_pkts, self.tcpudp_pkts, &self.pkt_sizes)
            .with_flows(self.flows.len() as u64, self.symm_flows.len() as u64)
            .with_pkts_per_flow(&pkts_per_flow)
            .with_flow_duration_us(&flow_duration_us)
            .with_flow_dts_us(&flow_dts_us)
            .with_top_k(&top_k_flows, &top_k_flows_bytes)
            .with_concurrent_flows(&concurrent)
            .with_flow_table(flow_table)
    }
}

fn to_micros(ns: TimeNs) -> u64 {
    (ns / NANOS_PER_MICRO).max(0) as u64
}
