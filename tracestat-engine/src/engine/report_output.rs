//! Report serialization and fingerprinting.

use std::fs;
use std::path::Path;

use tracing::info;

use tracestat_analysis::TrafficReport;

use crate::engine::error::EngineError;

/// Serializes the report as pretty-printed JSON with a trailing newline.
pub fn render_report(report: &TrafficReport) -> Result<String, EngineError> {
    let mut json = serde_json::to_string_pretty(report)?;
    json.push('\n');
    Ok(json)
}

/// BLAKE3 digest of the rendered report, hex encoded. Identical traces and
/// settings always produce the same digest.
pub fn report_digest(report: &TrafficReport) -> Result<String, EngineError> {
    let json = render_report(report)?;
    Ok(hex::encode(blake3::hash(json.as_bytes()).as_bytes()))
}

pub fn write_report(path: &Path, report: &TrafficReport) -> Result<(), EngineError> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }
    fs::write(path, render_report(report)?)?;
    info!(path = %path.display(), "report written");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn digest_is_stable_and_content_sensitive() {
        let report = TrafficReport::new(0, 10);
        let first = report_digest(&report).unwrap();
        assert_eq!(first.len(), 64);
        assert_eq!(first, report_digest(&report.clone()).unwrap());

        let other = TrafficReport::new(0, 11);
        assert_ne!(first, report_digest(&other).unwrap());
    }

    #[test]
    fn written_report_parses_back() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("reports").join("trace.json");
        let report = TrafficReport::new(5, 10);

        write_report(&path, &report).unwrap();
        let text = fs::read_to_string(&path).unwrap();
        assert!(text.ends_with("}\n"));
        let parsed: TrafficReport = serde_json::from_str(&text).unwrap();
        assert_eq!(parsed, report);
    }
}
