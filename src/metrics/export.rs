//! CSV export of a dashboard snapshot.
//!
//! Layout: a header block, then `Summary Metrics`, `Top Intents` and
//! `County Summary` sections separated by blank lines. Numbers are written
//! plainly (no thousands separators) so the file re-imports cleanly.

use std::path::{Path, PathBuf};

use crate::types::{DashboardMetrics, TimeRange};

pub const ALL_COUNTIES_LABEL: &str = "All Counties";

/// Render `metrics` as CSV. `generated_at` is printed verbatim.
#[must_use]
pub fn to_csv(metrics: &DashboardMetrics, range: TimeRange, county: Option<&str>, generated_at: &str) -> String {
    let mut rows: Vec<String> = vec![
        "Dashboard Metrics Export".into(),
        format!("Generated: {generated_at}"),
        format!("Time Range: {range}"),
        format!("County Filter: {}", county.unwrap_or(ALL_COUNTIES_LABEL)),
        String::new(),
        "Summary Metrics".into(),
        "Metric,Value".into(),
        format!("Total Queries,{}", metrics.total_queries),
        format!("Satisfaction Rate,{}%", metrics.satisfaction_rate),
        format!("Average Response Time,{}s", metrics.avg_response_time),
        format!("Escalations,{}", metrics.escalations),
        String::new(),
        "Top Intents".into(),
        "Intent,Count,Percentage".into(),
    ];

    for intent in &metrics.top_intents {
        rows.push(format!("{},{},{}%", field(&intent.intent), intent.count, intent.percentage));
    }

    rows.push(String::new());
    rows.push("County Summary".into());
    rows.push("County,Queries,Satisfaction %,Escalations".into());
    for c in &metrics.county_summary {
        rows.push(format!("{},{},{},{}", field(&c.county_name), c.queries, c.satisfaction, c.escalations));
    }

    rows.join("\n")
}

/// `dashboard-export-{range}-{county|all-counties}-{millis}.csv`
#[must_use]
pub fn export_file_name(range: TimeRange, county: Option<&str>, millis: u64) -> String {
    let county = county.unwrap_or("all-counties");
    format!("dashboard-export-{range}-{county}-{millis}.csv")
}

/// Write the CSV into `dir` under its [`export_file_name`] and return the
/// full path.
///
/// # Errors
///
/// Returns any I/O error from writing the file.
pub fn save_csv(
    dir: &Path,
    metrics: &DashboardMetrics,
    range: TimeRange,
    county: Option<&str>,
    generated_at: &str,
    millis: u64,
) -> std::io::Result<PathBuf> {
    let path = dir.join(export_file_name(range, county, millis));
    std::fs::write(&path, to_csv(metrics, range, county, generated_at))?;
    tracing::info!(path = %path.display(), "metrics: csv exported");
    Ok(path)
}

/// Quote a text cell when it would otherwise break the row.
fn field(value: &str) -> String {
    if value.contains([',', '"', '\n']) {
        format!("\"{}\"", value.replace('"', "\"\""))
    } else {
        value.to_owned()
    }
}

#[cfg(test)]
#[path = "export_test.rs"]
mod tests;
