//! # tracestat Engine
//!
//! Drives whole runs: reads the configuration, feeds a trace through the
//! tracker or the replayer on a blocking task, records metrics and writes
//! the results. Front-ends only parse arguments and call into [`TraceRuntime`].

pub mod engine;

pub use engine::{
    AnalysisOptions, AnalysisOutcome, EngineError, ReplayOptions, TraceRuntime,
};
