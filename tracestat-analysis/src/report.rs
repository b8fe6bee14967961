//! ## tracestat-analysis::report
//! **Serializable analysis summary**
//!
//! Field names are the keys of the JSON report. Every distribution is
//! exported as `<name>_avg`, `<name>_stdev` and `<name>_cdf`.

use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};

use tracestat_core::TimeNs;

use crate::cdf::{Cdf, CdfSeries};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TrafficReport {
    pub start_utc_ns: TimeNs,
    pub end_utc_ns: TimeNs,
    pub start_utc: String,
    pub end_utc: String,

    pub total_pkts: u64,
    pub tcpudp_pkts: u64,
    pub pkt_bytes_avg: f64,
    pub pkt_bytes_stdev: f64,
    pub pkt_bytes_cdf: CdfSeries,

    pub total_flows: u64,
    pub total_symm_flows: u64,
    pub pkts_per_flow_avg: f64,
    pub pkts_per_flow_stdev: f64,
    pub pkts_per_flow_cdf: CdfSeries,

    pub flow_duration_us_avg: f64,
    pub flow_duration_us_stdev: f64,
    pub flow_duration_us_cdf: CdfSeries,

    pub flow_dts_us_avg: f64,
    pub flow_dts_us_stdev: f64,
    pub flow_dts_us_cdf: CdfSeries,

    pub top_k_flows_cdf: CdfSeries,
    pub top_k_flows_bytes_cdf: CdfSeries,

    pub concurrent_flows_per_epoch_avg: f64,
    pub concurrent_flows_per_epoch_stdev: f64,
    pub concurrent_flows_per_epoch_cdf: CdfSeries,

    pub flow_table: FlowTableReport,
}

/// Flow table sizing and lifecycle counters.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FlowTableReport {
    pub capacity: usize,
    pub ttl_ns: TimeNs,
    pub expiration: String,
    pub inserted: u64,
    pub expired: u64,
    pub peak_occupancy: usize,
    pub expired_per_epoch_avg: f64,
    pub expired_per_epoch_stdev: f64,
    pub expired_per_epoch_cdf: CdfSeries,
}

impl TrafficReport {
    pub fn new(start_ns: TimeNs, end_ns: TimeNs) -> Self {
        Self {
            start_utc_ns: start_ns,
            end_utc_ns: end_ns,
            start_utc: rfc3339(start_ns),
            end_utc: rfc3339(end_ns),
            ..Self::default()
        }
    }

    pub fn with_packets(mut self, total: u64, tcpudp: u64, sizes: &Cdf) -> Self {
        self.total_pkts = total;
        self.tcpudp_pkts = tcpudp;
        self.pkt_bytes_avg = sizes.mean();
        self.pkt_bytes_stdev = sizes.stdev();
        self.pkt_bytes_cdf = sizes.series();
        self
    }

    pub fn with_flows(mut self, total: u64, symmetric: u64) -> Self {
        self.total_flows = total;
        self.total_symm_flows = symmetric;
        self
    }

    pub fn with_pkts_per_flow(mut self, cdf: &Cdf) -> Self {
        self.pkts_per_flow_avg = cdf.mean();
        self.pkts_per_flow_stdev = cdf.stdev();
        self.pkts_per_flow_cdf = cdf.series();
        self
    }

    pub fn with_flow_duration_us(mut self, cdf: &Cdf) -> Self {
        self.flow_duration_us_avg = cdf.mean();
        self.flow_duration_us_stdev = cdf.stdev();
        self.flow_duration_us_cdf = cdf.series();
        self
    }

    pub fn with_flow_dts_us(mut self, cdf: &Cdf) -> Self {
        self.flow_dts_us_avg = cdf.mean();
        self.flow_dts_us_stdev = cdf.stdev();
        self.flow_dts_us_cdf = cdf.series();
        self
    }

    pub fn with_top_k(mut self, packets: &Cdf, bytes: &Cdf) -> Self {
        self.top_k_flows_cdf = packets.series();
        self.top_k_flows_bytes_cdf = bytes.series();
        self
    }

    pub fn with_concurrent_flows(mut self, cdf: &Cdf) -> Self {
        self.concurrent_flows_per_epoch_avg = cdf.mean();
        self.concurrent_flows_per_epoch_stdev = cdf.stdev();
        self.concurrent_flows_per_epoch_cdf = cdf.series();
        self
    }

    pub fn with_flow_table(mut self, flow_table: FlowTableReport) -> Self {
        self.flow_table = flow_table;
        self
    }

    /// Trace duration in seconds.
    pub fn duration_secs(&self) -> f64 {
        (self.end_utc_ns - self.start_utc_ns) as f64 / 1e9
    }
}

fn rfc3339(ns: TimeNs) -> String {
    DateTime::<Utc>::from_timestamp_nanos(ns).to_rfc3339_opts(SecondsFormat::Nanos, true)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_timestamps_are_rendered_in_utc() {
        let report = TrafficReport::new(1_700_000_000_123_456_789, 1_700_000_001_000_000_000);
        assert_eq!(report.start_utc, "2023-11-14T22:13:20.123456789Z");
        assert_eq!(report.end_utc, "2023-11-14T22:13:21.000000000Z");
        assert!((report.duration_secs() - 0.876543211).abs() < 1e-9);
    }

    #[test]
    fn test_json_keys() {
        let mut sizes = Cdf::new();
        sizes.add(64);
        sizes.add(1518);
        let report = TrafficReport::new(0, 1_000)
            .with_packets(2, 2, &sizes)
            .with_flows(1, 1);

        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json["total_pkts"], 2);
        assert_eq!(json["pkt_bytes_avg"], 791.0);
        assert_eq!(json["pkt_bytes_cdf"]["values"], serde_json::json!([64, 1518]));
        assert_eq!(
            json["pkt_bytes_cdf"]["probabilities"],
            serde_json::json!([0.5, 1.0])
        );
        assert_eq!(json["flow_table"]["inserted"], 0);
        for key in [
            "start_utc_ns",
            "end_utc",
            "total_symm_flows",
            "flow_dts_us_stdev",
            "top_k_flows_bytes_cdf",
            "concurrent_flows_per_epoch_avg",
        ] {
            assert!(json.get(key).is_some(), "missing {key}");
        }

        let parsed: TrafficReport = serde_json::from_value(json).unwrap();
        assert_eq!(parsed, report);
    }
}
