use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use tracing::info;

use tracestat_config::{FlowExpiration, TracestatConfig};
use tracestat_engine::{AnalysisOptions, ReplayOptions, TraceRuntime};
use tracestat_telemetry::EventLogger;

#[derive(Parser, Debug)]
#[command(name = "tracestat", version, about = "Offline traffic statistics for pcap traces")]
pub struct Cli {
    /// Configuration file merged over `config/tracestat.yaml`
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Default log level (RUST_LOG takes precedence)
    #[arg(long, global = true)]
    pub log_level: Option<String>,

    /// Write Prometheus metrics to this file when the run ends
    #[arg(long, global = true)]
    pub metrics_out: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Compute traffic statistics of a trace
    Analyze(AnalyzeArgs),
    /// Re-inject a trace on a network interface at a fixed rate
    Replay(ReplayArgs),
}

#[derive(Args, Debug, Clone)]
pub struct AnalyzeArgs {
    /// Trace file (pcap, or zstd-compressed pcap)
    pub trace: PathBuf,

    /// Output report JSON file
    #[arg(long)]
    pub out: Option<PathBuf>,

    /// Epoch duration in nanoseconds
    #[arg(long)]
    pub epoch: Option<i64>,

    /// Flow table capacity
    #[arg(long)]
    pub capacity: Option<usize>,

    /// Flow TTL in nanoseconds
    #[arg(long)]
    pub ttl: Option<i64>,

    /// What the flow TTL is measured from
    #[arg(long, value_name = "creation|activity")]
    pub expiration: Option<FlowExpiration>,

    /// Fail unless the report digest matches
    #[arg(long)]
    pub validate_hash: Option<String>,
}

#[derive(Args, Debug, Clone)]
pub struct ReplayArgs {
    /// Trace file (pcap, or zstd-compressed pcap)
    pub trace: PathBuf,

    /// Interface to inject frames on
    #[arg(short, long)]
    pub interface: Option<String>,

    /// Line rate in Mbit/s
    #[arg(long)]
    pub rate_mbps: Option<u64>,

    /// Number of passes over the trace
    #[arg(long)]
    pub loops: Option<u32>,
}

/// Loads the configuration and layers the command-line flags on top.
pub fn resolve_config(cli: &Cli) -> Result<TracestatConfig> {
    let mut config = TracestatConfig::load_with(cli.config.as_deref())
        .context("failed to load configuration")?;

    if let Some(level) = &cli.log_level {
        config.telemetry.log_level = level.clone();
    }

    match &cli.command {
        Commands::Analyze(args) => {
            if let Some(epoch) = args.epoch {
                config.tracker.epoch_duration_ns = epoch;
            }
            if let Some(capacity) = args.capacity {
                config.flow_table.capacity = capacity;
            }
            if let Some(ttl) = args.ttl {
                config.flow_table.ttl_ns = ttl;
            }
            if let Some(expiration) = args.expiration {
                config.flow_table.expiration = expiration;
            }
        }
        Commands::Replay(args) => {
            if let Some(interface) = &args.interface {
                config.replay.interface = interface.clone();
            }
            if let Some(rate) = args.rate_mbps {
                config.replay.rate_mbps = rate;
            }
            if let Some(loops) = args.loops {
                config.replay.loops = loops;
            }
        }
    }

    config
        .ensure_valid()
        .context("invalid command-line options")?;
    Ok(config)
}

pub async fn run_command(cli: Cli) -> Result<()> {
    let config = resolve_config(&cli)?;
    EventLogger::init(&config.telemetry.log_level)?;
    let runtime = TraceRuntime::new(config)?;

    match &cli.command {
        Commands::Analyze(args) => {
            let outcome = runtime
                .run_analysis(AnalysisOptions {
                    trace: args.trace.clone(),
                    output: args.out.clone(),
                    validate_hash: args.validate_hash.clone(),
                })
                .await
                .with_context(|| format!("analysis of {} failed", args.trace.display()))?;
            info!(
                packets = outcome.report.total_pkts,
                flows = outcome.report.total_flows,
                digest = %outcome.digest,
                "analysis complete"
            );
        }
        Commands::Replay(args) => {
            let stats = runtime
                .run_replay(ReplayOptions {
                    trace: args.trace.clone(),
                })
                .await
                .with_context(|| format!("replay of {} failed", args.trace.display()))?;
            info!(
                packets = stats.packets,
                bytes = stats.bytes,
                elapsed_ms = stats.elapsed.as_millis() as u64,
                "replay complete"
            );
        }
    }

    if let Some(path) = &cli.metrics_out {
        runtime
            .write_metrics(path)
            .with_context(|| format!("failed to write metrics to {}", path.display()))?;
    }
    Ok(())
}
