//! Metric normalizers
//!
//! Each family exposes a pure `summarize` over a borrowed snapshot and returns a
//! [`MetricSummary`].
//!
//! Global invariants enforced:
//! - Normalizers never mutate the snapshot
//! - `percentage` is `round(100 * pass / total)` in [0, 100], and 0 when total is 0
//! - Item order is explicit and stable (failing items first)

pub mod authors;
pub mod captions;
pub mod contrast;
pub mod font;
pub mod hyperlinks;
pub mod logo;
pub mod resolution;

use crate::policy::Grade;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;

/// Metric family identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MetricFamily {
    Contrast,
    Font,
    Logo,
    Resolution,
    Hyperlinks,
    Authors,
    Tables,
    Diagrams,
}

impl MetricFamily {
    /// Dashboard order
    pub const ALL: [MetricFamily; 8] = [
        MetricFamily::Contrast,
        MetricFamily::Font,
        MetricFamily::Logo,
        MetricFamily::Resolution,
        MetricFamily::Hyperlinks,
        MetricFamily::Authors,
        MetricFamily::Tables,
        MetricFamily::Diagrams,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            MetricFamily::Contrast => "contrast",
            MetricFamily::Font => "font",
            MetricFamily::Logo => "logo",
            MetricFamily::Resolution => "resolution",
            MetricFamily::Hyperlinks => "hyperlinks",
            MetricFamily::Authors => "authors",
            MetricFamily::Tables => "tables",
            MetricFamily::Diagrams => "diagrams",
        }
    }
}

impl fmt::Display for MetricFamily {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One graded entry of a metric family, in display priority order
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "snake_case")]
pub struct SummaryItem {
    pub key: String,
    pub passed: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
}

/// Normalized pass/fail/percentage/grade output of one metric family
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "snake_case")]
pub struct MetricSummary {
    pub family: MetricFamily,
    pub pass_count: usize,
    pub total_count: usize,
    pub percentage: u8,
    pub grade: Grade,
    pub items: Vec<SummaryItem>,
}

impl MetricSummary {
    /// Build a summary from graded items, counting passes in one pass
    pub fn from_items(
        family: MetricFamily,
        items: Vec<SummaryItem>,
        grade: impl FnOnce(usize, usize, u8) -> Grade,
    ) -> Self {
        let total_count = items.len();
        let pass_count = items.iter().filter(|i| i.passed).count();
        let percentage = percentage(pass_count, total_count);
        MetricSummary {
            family,
            pass_count,
            total_count,
            percentage,
            grade: grade(pass_count, total_count, percentage),
            items,
        }
    }

    /// The zeroed summary reported when there is nothing to measure
    pub fn no_data(family: MetricFamily, grade: Grade) -> Self {
        MetricSummary {
            family,
            pass_count: 0,
            total_count: 0,
            percentage: 0,
            grade,
            items: Vec::new(),
        }
    }

    pub fn has_data(&self) -> bool {
        self.total_count > 0
    }

    pub fn fail_count(&self) -> usize {
        self.total_count - self.pass_count
    }
}

/// Integer percentage `round(100 * numerator / denominator)`, 0 for an empty denominator
pub fn percentage(numerator: usize, denominator: usize) -> u8 {
    if denominator == 0 {
        return 0;
    }
    let pct = (100.0 * numerator as f64 / denominator as f64).round();
    pct.clamp(0.0, 100.0) as u8
}

/// Stable sort: failing items first, original order otherwise
pub fn sort_failing_first(items: &mut [SummaryItem]) {
    items.sort_by_key(|i| i.passed);
}

/// Stable sort: failing items first, then ascending value (items without a value last)
pub fn sort_failing_first_by_value(items: &mut [SummaryItem]) {
    items.sort_by(|a, b| {
        a.passed
            .cmp(&b.passed)
            .then_with(|| compare_optional_values(a.value, b.value))
    });
}

fn compare_optional_values(a: Option<f64>, b: Option<f64>) -> Ordering {
    match (a, b) {
        (Some(x), Some(y)) => x.partial_cmp(&y).unwrap_or(Ordering::Equal),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}
