//! Logo complexity normalizer
//!
//! A logo passes when the service labelled it `Simple`.

use super::{sort_failing_first, MetricFamily, MetricSummary, SummaryItem};
use crate::policy::GradeBands;
use crate::snapshot::{AnalysisSnapshot, LogoLabel};

pub fn summarize(snapshot: &AnalysisSnapshot, bands: &GradeBands) -> MetricSummary {
    let mut items: Vec<SummaryItem> = snapshot
        .logo_evaluation
        .logos
        .iter()
        .enumerate()
        .map(|(index, logo)| SummaryItem {
            key: format!("logo_{}", index + 1),
            passed: logo.label == Some(LogoLabel::Simple),
            value: None,
            label: logo.label.map(|l| l.as_str().to_string()),
        })
        .collect();
    sort_failing_first(&mut items);

    MetricSummary::from_items(MetricFamily::Logo, items, |_, _, pct| bands.grade(pct))
}
