//! ## tracestat-telemetry::metrics
//! **Prometheus counters for analysis and replay**
//!
//! Metrics live in a private registry. Runs are offline, so nothing is
//! scraped: the text exposition is written out once the run ends.

use prometheus::{Encoder, Histogram, HistogramOpts, IntCounter, IntGauge, Registry, TextEncoder};

#[derive(Debug, Clone)]
pub struct MetricsRecorder {
    pub registry: Registry,
    pub packets: IntCounter,
    pub transport_packets: IntCounter,
    pub flows_inserted: IntCounter,
    pub flows_expired: IntCounter,
    pub replayed_packets: IntCounter,
    pub flow_table_occupancy: IntGauge,
    pub packet_wire_bytes: Histogram,
}

impl MetricsRecorder {
    pub fn new() -> Result<Self, prometheus::Error> {
        let registry = Registry::new();

        let packets = IntCounter::new("tracestat_packets_total", "Packets read from the trace")?;
        let transport_packets = IntCounter::new(
            "tracestat_transport_packets_total",
            "Packets carrying a TCP or UDP flow",
        )?;
        let flows_inserted = IntCounter::new(
            "tracestat_flows_inserted_total",
            "Flows inserted into the flow table",
        )?;
        let flows_expired = IntCounter::new(
            "tracestat_flows_expired_total",
            "Flows evicted from the flow table by TTL",
        )?;
        let replayed_packets =
            IntCounter::new("tracestat_replayed_packets_total", "Frames sent by replay")?;
        let flow_table_occupancy = IntGauge::new(
            "tracestat_flow_table_occupancy",
            "Flows currently held by the flow table",
        )?;
        let packet_wire_bytes = Histogram::with_opts(
            HistogramOpts::new("tracestat_packet_wire_bytes", "On-wire packet sizes")
                .buckets(vec![64.0, 128.0, 256.0, 512.0, 1024.0, 1522.0, 9022.0]),
        )?;

        registry.register(Box::new(packets.clone()))?;
        registry.register(Box::new(transport_packets.clone()))?;
        registry.register(Box::new(flows_inserted.clone()))?;
        registry.register(Box::new(flows_expired.clone()))?;
        registry.register(Box::new(replayed_packets.clone()))?;
        registry.register(Box::new(flow_table_occupancy.clone()))?;
        registry.register(Box::new(packet_wire_bytes.clone()))?;

        Ok(Self {
            registry,
            packets,
            transport_packets,
            flows_inserted,
            flows_expired,
            replayed_packets,
            flow_table_occupancy,
            packet_wire_bytes,
        })
    }

    pub fn gather_metrics(&self) -> Result<String, prometheus::Error> {
        let encoder = TextEncoder::new();
        let mut buffer = Vec::<u8>::new();
        encoder.encode(&self.registry.gather(), &mut buffer)?;
        String::from_utf8(buffer).map_err(|err| prometheus::Error::Msg(err.to_string()))
    }

    pub fn record_packet(&self, wire_len: u32, has_flow: bool) {
        self.packets.inc();
        self.packet_wire_bytes.observe(f64::from(wire_len));
        if has_flow {
            self.transport_packets.inc();
        }
    }

    pub fn record_flow_events(&self, inserted: bool, expired: usize, occupancy: usize) {
        if inserted {
            self.flows_inserted.inc();
        }
        self.flows_expired.inc_by(expired as u64);
        self.flow_table_occupancy.set(occupancy as i64);
    }

    pub fn inc_replayed_packets(&self) {
        self.replayed_packets.inc();
    }
}
