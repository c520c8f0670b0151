//! Hyperlink normalizer
//!
//! Branches on the producer's shape: a URL mapping is graded on existence, a validated
//! list on the share of links marked valid.

use super::{sort_failing_first, MetricFamily, MetricSummary, SummaryItem};
use crate::policy::{Grade, GradeBands};
use crate::snapshot::{AnalysisSnapshot, HyperlinksShape};

pub fn summarize(snapshot: &AnalysisSnapshot, list_bands: &GradeBands) -> MetricSummary {
    match &snapshot.hyperlinks {
        HyperlinksShape::Mapping(links) => {
            // validity is optional here; only an explicit `false` counts against a link
            let mut items: Vec<SummaryItem> = links
                .iter()
                .map(|(url, meta)| SummaryItem {
                    key: url.clone(),
                    passed: meta.valid != Some(false),
                    value: None,
                    label: meta.valid.map(validity_label),
                })
                .collect();
            sort_failing_first(&mut items);
            MetricSummary::from_items(MetricFamily::Hyperlinks, items, |_, total, _| {
                Grade::from_bool(total > 0)
            })
        }
        HyperlinksShape::ValidatedList(entries) => {
            // only entries carrying a verdict are counted
            let mut items: Vec<SummaryItem> = entries
                .iter()
                .filter_map(|entry| {
                    let valid = entry.valid?;
                    Some(SummaryItem {
                        key: entry.url.clone(),
                        passed: valid,
                        value: None,
                        label: Some(validity_label(valid)),
                    })
                })
                .collect();
            sort_failing_first(&mut items);
            MetricSummary::from_items(MetricFamily::Hyperlinks, items, |_, total, pct| {
                if total == 0 {
                    Grade::Error
                } else {
                    list_bands.grade(pct)
                }
            })
        }
    }
}

fn validity_label(valid: bool) -> String {
    let label = if valid { "valid" } else { "invalid" };
    label.to_string()
}
