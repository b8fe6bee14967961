//! # tracestat Analysis
//!
//! Turns a stream of captured packets into distribution statistics.
//!
//! - `cdf`: discrete value distribution with 5 % sampled CDF export
//! - `tracker`: per-packet orchestrator owning the flow table
//! - `report`: serializable summary of a finished analysis

pub mod cdf;
pub mod error;
pub mod report;
pub mod tracker;

pub use cdf::{Cdf, CdfSeries};
pub use error::AnalysisError;
pub use report::{FlowTableReport, TrafficReport};
pub use tracker::{PacketOutcome, TrackerSettings, TrafficStatsTracker};
