use crate::error::CliError;
use engine_processing::report::TransferReport;
use tracing::info;

fn generate_report_json(report: &TransferReport) -> Result<String, CliError> {
    let json = serde_json::to_string_pretty(report)?;
    Ok(json)
}

pub fn write_report(report: &TransferReport, path: &str) -> Result<(), CliError> {
    let report_json = generate_report_json(report)?;
    std::fs::write(path, report_json)?;
    info!(path, "Transfer report written");
    Ok(())
}

/// Logs a one-line summary and, when asked, writes the full report.
pub fn emit_report(report: &TransferReport, path: Option<&str>) -> Result<(), CliError> {
    info!(
        operation = ?report.operation,
        docs = report.documents,
        pages = report.pages,
        commits = report.commits,
        skipped = report.skipped,
        elapsed_ms = report.duration_ms(),
        "Done"
    );
    match path {
        Some(path) => write_report(report, path),
        None => Ok(()),
    }
}
