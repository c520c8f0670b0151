//! Reporting and output generation
//!
//! Global invariants enforced:
//! - Deterministic output ordering (dashboard order, then the overview)
//! - Byte-for-byte identical output across runs

use crate::aggregates::AggregateSummary;
use crate::metrics::MetricSummary;

/// Render an aggregate as a text table
pub fn render_text(aggregate: &AggregateSummary) -> String {
    let mut output = String::new();

    output.push_str(&format!(
        "{:<12} {:<8} {:<8} {:>6}  {}\n",
        "METRIC", "GRADE", "PASS", "PCT", "ATTENTION"
    ));

    for summary in aggregate.summaries() {
        let counts = format!("{}/{}", summary.pass_count, summary.total_count);
        output.push_str(&format!(
            "{:<12} {:<8} {:<8} {:>5}%  {}\n",
            summary.family.as_str(),
            summary.grade.as_str(),
            counts,
            summary.percentage,
            attention(summary),
        ));
    }

    let overview = &aggregate.overview;
    output.push('\n');
    if overview.families_with_data == 0 {
        output.push_str("No analysis data\n");
    } else {
        output.push_str(&format!(
            "Average {}% across {} metrics ({} success, {} warning, {} error)\n",
            overview.average_percentage,
            overview.families_with_data,
            overview.success_count,
            overview.warning_count,
            overview.error_count,
        ));
        let weakest: Vec<&str> = overview.weakest.iter().map(|f| f.as_str()).collect();
        output.push_str(&format!("Weakest first: {}\n", weakest.join(", ")));
    }

    output
}

/// Render an aggregate as JSON output
pub fn render_json(aggregate: &AggregateSummary) -> String {
    serde_json::to_string_pretty(aggregate).unwrap_or_else(|_| "{}".to_string())
}

/// Failing item keys, most urgent first, truncated for the table
fn attention(summary: &MetricSummary) -> String {
    let failing: Vec<&str> = summary
        .items
        .iter()
        .filter(|i| !i.passed)
        .map(|i| i.key.as_str())
        .collect();
    if failing.is_empty() {
        return "-".to_string();
    }
    truncate(&failing.join(", "), 40)
}

/// Truncate string to a maximum display width
fn truncate(s: &str, width: usize) -> String {
    if s.chars().count() > width {
        let kept: String = s.chars().take(width.saturating_sub(3)).collect();
        format!("{}...", kept)
    } else {
        s.to_string()
    }
}
