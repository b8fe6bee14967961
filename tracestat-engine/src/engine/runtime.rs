//! Run orchestration.
//!
//! Trace processing is synchronous and CPU bound, so every run is moved onto
//! a `spawn_blocking` worker and the async side only waits for its result.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::{Duration, Instant};

use tokio::task::spawn_blocking;
use tracing::{debug, info, instrument, warn};

use tracestat_analysis::{TrackerSettings, TrafficReport, TrafficStatsTracker};
use tracestat_capture::{InterfaceSink, PacketSink, RatePacer, ReplayStats, Replayer, TraceReader};
use tracestat_config::TracestatConfig;
use tracestat_telemetry::{EventLogger, MetricsRecorder};

use crate::engine::error::EngineError;
use crate::engine::report_output::{report_digest, write_report};
use crate::engine::settings::tracker_settings;

#[derive(Debug, Clone, Default)]
pub struct AnalysisOptions {
    pub trace: PathBuf,
    /// Where to write the JSON report. Nothing is written when unset.
    pub output: Option<PathBuf>,
    /// Expected report digest; a mismatch fails the run.
    pub validate_hash: Option<String>,
}

#[derive(Debug, Clone)]
pub struct AnalysisOutcome {
    pub report: TrafficReport,
    pub digest: String,
    pub elapsed: Duration,
}

#[derive(Debug, Clone, Default)]
pub struct ReplayOptions {
    pub trace: PathBuf,
}

/// Shared state of analysis and replay runs.
pub struct TraceRuntime {
    config: Arc<TracestatConfig>,
    pub metrics: Arc<MetricsRecorder>,
}

impl TraceRuntime {
    pub fn new(config: TracestatConfig) -> Result<Self, EngineError> {
        debug!(config = ?config, "initializing runtime");
        Ok(Self {
            config: Arc::new(config),
            metrics: Arc::new(MetricsRecorder::new()?),
        })
    }

    pub fn config(&self) -> &TracestatConfig {
        &self.config
    }

    /// Analyzes a trace and optionally writes and verifies its report.
    #[instrument(skip_all, fields(trace = %options.trace.display()))]
    pub async fn run_analysis(
        &self,
        options: AnalysisOptions,
    ) -> Result<AnalysisOutcome, EngineError> {
        let started = Instant::now();
        let settings = tracker_settings(&self.config);
        let metrics = self.metrics.clone();
        let trace = options.trace.clone();

        let report = spawn_blocking(move || analyze_trace(&trace, settings, &metrics)).await??;

        let digest = report_digest(&report)?;
        info!(digest = %digest, "report digest");

        if let Some(expected) = options.validate_hash.as_deref() {
            if !expected.eq_ignore_ascii_case(&digest) {
                warn!(expected = expected, actual = %digest, "report digest mismatch");
                return Err(EngineError::HashMismatch {
                    expected: expected.to_string(),
                    actual: digest,
                });
            }
            info!("report digest verified");
        }

        if let Some(path) = options.output.as_deref() {
            write_report(path, &report)?;
        }

        let elapsed = started.elapsed();
        EventLogger::log_run_summary("analyze", report.total_pkts, elapsed.as_millis());
        Ok(AnalysisOutcome {
            report,
            digest,
            elapsed,
        })
    }

    /// Replays a trace on the configured interface.
    #[instrument(skip_all, fields(trace = %options.trace.display(), interface = %self.config.replay.interface))]
    pub async fn run_replay(&self, options: ReplayOptions) -> Result<ReplayStats, EngineError> {
        let interface = self.config.replay.interface.clone();
        let sink = spawn_blocking(move || InterfaceSink::open(&interface)).await??;
        self.run_replay_with_sink(options, sink).await
    }

    /// Replays a trace into an arbitrary sink.
    pub async fn run_replay_with_sink<S>(
        &self,
        options: ReplayOptions,
        sink: S,
    ) -> Result<ReplayStats, EngineError>
    where
        S: PacketSink + Send + 'static,
    {
        let pacer = RatePacer::new(self.config.replay.rate_mbps)?;
        let loops = self.config.replay.loops;
        let metrics = self.metrics.clone();
        let trace = options.trace;

        info!(
            rate_mbps = self.config.replay.rate_mbps,
            loops = loops,
            "starting replay"
        );
        let stats = spawn_blocking(move || {
            let mut replayer = Replayer::new(sink, pacer, loops);
            replayer.replay_with(&trace, |_| metrics.inc_replayed_packets())
        })
        .await??;

        EventLogger::log_run_summary("replay", stats.packets, stats.elapsed.as_millis());
        Ok(stats)
    }

    /// Writes the Prometheus text exposition of this runtime's metrics.
    pub fn write_metrics(&self, path: &Path) -> Result<(), EngineError> {
        std::fs::write(path, self.metrics.gather_metrics()?)?;
        info!(path = %path.display(), "metrics written");
        Ok(())
    }
}

/// Feeds every packet of the trace at `path` through a fresh tracker.
pub fn analyze_trace(
    path: &Path,
    settings: TrackerSettings,
    metrics: &MetricsRecorder,
) -> Result<TrafficReport, EngineError> {
    let mut reader = TraceReader::open(path)?;
    let mut tracker = TrafficStatsTracker::new(settings)?;
    info!(link_type = ?reader.link_type(), "analyzing trace");

    while let Some(packet) = reader.next_packet()? {
        metrics.record_packet(packet.wire_len, packet.flow.is_some());
        let outcome = tracker.feed_packet(&packet)?;
        if packet.flow.is_some() {
            metrics.record_flow_events(
                outcome.flow_inserted,
                outcome.flows_expired,
                tracker.live_flows(),
            );
        }
    }

    info!(packets = tracker.total_packets(), "trace exhausted");
    Ok(tracker.report())
}
