mod error;
mod report_output;
mod runtime;
mod settings;

pub use self::{
    error::EngineError,
    report_output::{render_report, report_digest, write_report},
    runtime::{analyze_trace, AnalysisOptions, AnalysisOutcome, ReplayOptions, TraceRuntime},
    settings::tracker_settings,
};

pub mod prelude {
    pub use super::{AnalysisOptions, EngineError, ReplayOptions, TraceRuntime};
}
