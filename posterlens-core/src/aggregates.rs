//! Aggregate metrics facade
//!
//! Composes every metric normalizer into one dashboard-level view and derives a
//! cross-metric overview.
//!
//! Global invariants enforced:
//! - Aggregates are strictly derived (never stored, always computed)
//! - Never fails: a missing snapshot yields the No-Data aggregate
//! - Deterministic ordering; identical input yields identical output

use crate::error::EngineError;
use crate::metrics::{
    authors, captions, contrast, font, hyperlinks, logo, resolution, MetricFamily, MetricSummary,
};
use crate::policy::{Grade, Policies};
use crate::snapshot::AnalysisSnapshot;
use crate::store::{SessionStorage, SessionStore};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Per-family summaries plus the cross-metric overview
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "snake_case")]
pub struct AggregateSummary {
    pub contrast: MetricSummary,
    pub font: MetricSummary,
    pub logo: MetricSummary,
    pub resolution: MetricSummary,
    pub hyperlinks: MetricSummary,
    pub authors: MetricSummary,
    pub tables: MetricSummary,
    pub diagrams: MetricSummary,
    pub overview: Overview,
}

/// Dashboard-level comparison across families
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub struct Overview {
    /// Mean percentage over families that have data (0 when none do)
    pub average_percentage: u8,
    pub families_with_data: usize,
    pub success_count: usize,
    pub warning_count: usize,
    pub error_count: usize,
    pub neutral_count: usize,
    /// Families with data, most urgent first
    pub weakest: Vec<MetricFamily>,
}

impl AggregateSummary {
    /// Aggregate reported before any snapshot exists
    pub fn no_data(policies: &Policies) -> Self {
        summarize_all(&AnalysisSnapshot::default(), policies)
    }

    /// Summaries in dashboard order
    pub fn summaries(&self) -> [&MetricSummary; 8] {
        [
            &self.contrast,
            &self.font,
            &self.logo,
            &self.resolution,
            &self.hyperlinks,
            &self.authors,
            &self.tables,
            &self.diagrams,
        ]
    }

    pub fn get(&self, family: MetricFamily) -> &MetricSummary {
        match family {
            MetricFamily::Contrast => &self.contrast,
            MetricFamily::Font => &self.font,
            MetricFamily::Logo => &self.logo,
            MetricFamily::Resolution => &self.resolution,
            MetricFamily::Hyperlinks => &self.hyperlinks,
            MetricFamily::Authors => &self.authors,
            MetricFamily::Tables => &self.tables,
            MetricFamily::Diagrams => &self.diagrams,
        }
    }
}

/// Summarize a single family
pub fn summarize_family(
    snapshot: &AnalysisSnapshot,
    family: MetricFamily,
    policies: &Policies,
) -> MetricSummary {
    match family {
        MetricFamily::Contrast => contrast::summarize(snapshot, &policies.contrast),
        MetricFamily::Font => font::summarize(snapshot, &policies.font, &policies.font_grades),
        MetricFamily::Logo => logo::summarize(snapshot, &policies.logo),
        MetricFamily::Resolution => resolution::summarize(snapshot, &policies.resolution),
        MetricFamily::Hyperlinks => hyperlinks::summarize(snapshot, &policies.hyperlink_list),
        MetricFamily::Authors => authors::summarize(snapshot),
        MetricFamily::Tables => captions::summarize_tables(snapshot, &policies.captions),
        MetricFamily::Diagrams => captions::summarize_diagrams(snapshot, &policies.captions),
    }
}

/// Summarize every family of a snapshot
pub fn summarize_all(snapshot: &AnalysisSnapshot, policies: &Policies) -> AggregateSummary {
    let contrast = summarize_family(snapshot, MetricFamily::Contrast, policies);
    let font = summarize_family(snapshot, MetricFamily::Font, policies);
    let logo = summarize_family(snapshot, MetricFamily::Logo, policies);
    let resolution = summarize_family(snapshot, MetricFamily::Resolution, policies);
    let hyperlinks = summarize_family(snapshot, MetricFamily::Hyperlinks, policies);
    let authors = summarize_family(snapshot, MetricFamily::Authors, policies);
    let tables = summarize_family(snapshot, MetricFamily::Tables, policies);
    let diagrams = summarize_family(snapshot, MetricFamily::Diagrams, policies);

    let overview = compute_overview(&[
        &contrast,
        &font,
        &logo,
        &resolution,
        &hyperlinks,
        &authors,
        &tables,
        &diagrams,
    ]);

    AggregateSummary {
        contrast,
        font,
        logo,
        resolution,
        hyperlinks,
        authors,
        tables,
        diagrams,
        overview,
    }
}

/// Summarize whatever the session store currently holds
///
/// `MissingSnapshot` is an expected state here and maps to the No-Data aggregate.
pub fn summarize_stored<S: SessionStorage>(
    store: &SessionStore<S>,
    policies: &Policies,
) -> AggregateSummary {
    match store.get() {
        Ok(snapshot) => summarize_all(snapshot, policies),
        Err(EngineError::MissingSnapshot) => {
            debug!("no snapshot in session, reporting no data");
            AggregateSummary::no_data(policies)
        }
        Err(e) => {
            debug!(error = %e, "snapshot unavailable, reporting no data");
            AggregateSummary::no_data(policies)
        }
    }
}

fn compute_overview(summaries: &[&MetricSummary]) -> Overview {
    let mut overview = Overview {
        average_percentage: 0,
        families_with_data: 0,
        success_count: 0,
        warning_count: 0,
        error_count: 0,
        neutral_count: 0,
        weakest: Vec::new(),
    };

    for summary in summaries {
        match summary.grade {
            Grade::Success => overview.success_count += 1,
            Grade::Warning => overview.warning_count += 1,
            Grade::Error => overview.error_count += 1,
            Grade::Neutral => overview.neutral_count += 1,
        }
    }

    let mut with_data: Vec<&MetricSummary> =
        summaries.iter().copied().filter(|s| s.has_data()).collect();
    overview.families_with_data = with_data.len();

    if !with_data.is_empty() {
        let total: usize = with_data.iter().map(|s| s.percentage as usize).sum();
        overview.average_percentage =
            (total as f64 / with_data.len() as f64).round().clamp(0.0, 100.0) as u8;
    }

    // Sort deterministically: grade severity, then percentage, then dashboard order
    with_data.sort_by(|a, b| {
        a.grade
            .severity()
            .cmp(&b.grade.severity())
            .then_with(|| a.percentage.cmp(&b.percentage))
            .then_with(|| a.family.cmp(&b.family))
    });
    overview.weakest = with_data.into_iter().map(|s| s.family).collect();

    overview
}
