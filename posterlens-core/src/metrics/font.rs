//! Font size normalizer

use super::{sort_failing_first_by_value, MetricFamily, MetricSummary, SummaryItem};
use crate::policy::{FontPolicy, Grade, GradeBands};
use crate::snapshot::AnalysisSnapshot;

/// Summarize font samples under `policy`
///
/// With a single threshold the percentage is graded by `bands`. The type-aware policy
/// is all-or-nothing: every sample must meet the minimum for its role.
pub fn summarize(
    snapshot: &AnalysisSnapshot,
    policy: &FontPolicy,
    bands: &GradeBands,
) -> MetricSummary {
    let mut items: Vec<SummaryItem> = snapshot
        .font_sizes
        .iter()
        .map(|(key, font)| SummaryItem {
            key: key.clone(),
            passed: policy.passes(font),
            value: Some(font.font_size),
            label: Some(font.kind.as_str().to_string()),
        })
        .collect();
    sort_failing_first_by_value(&mut items);

    MetricSummary::from_items(MetricFamily::Font, items, |pass, total, pct| match policy {
        FontPolicy::SingleThreshold { .. } => bands.grade(pct),
        FontPolicy::TypeAware { .. } => Grade::from_bool(total > 0 && pass == total),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::policy::FONT_GRADES;
    use crate::snapshot::{FontEntry, FontKind};

    fn snapshot(fonts: &[(&str, f64, FontKind)]) -> AnalysisSnapshot {
        let mut snapshot = AnalysisSnapshot::default();
        for (key, size, kind) in fonts {
            snapshot.font_sizes.insert(
                key.to_string(),
                FontEntry {
                    font_size: *size,
                    kind: kind.clone(),
                    image_url: None,
                },
            );
        }
        snapshot
    }

    #[test]
    fn test_single_threshold_counts() {
        let s = snapshot(&[
            ("a", 10.0, FontKind::PlainText),
            ("b", 14.0, FontKind::PlainText),
            ("c", 15.0, FontKind::Caption),
            ("d", 20.0, FontKind::Heading),
            ("e", 12.0, FontKind::PlainText),
        ]);
        let summary = summarize(&s, &FontPolicy::single_threshold(), &FONT_GRADES);
        assert_eq!(summary.pass_count, 3);
        assert_eq!(summary.total_count, 5);
        assert_eq!(summary.percentage, 60);
        assert_eq!(summary.grade, Grade::Warning);

        let keys: Vec<&str> = summary.items.iter().map(|i| i.key.as_str()).collect();
        assert_eq!(keys, vec!["a", "e", "b", "c", "d"]);
    }

    #[test]
    fn test_type_aware_is_all_or_nothing() {
        let good = snapshot(&[
            ("title", 16.0, FontKind::Heading),
            ("body", 12.0, FontKind::PlainText),
        ]);
        let summary = summarize(&good, &FontPolicy::type_aware(), &FONT_GRADES);
        assert_eq!(summary.percentage, 100);
        assert_eq!(summary.grade, Grade::Success);

        let one_short = snapshot(&[
            ("title", 15.0, FontKind::Heading),
            ("body", 12.0, FontKind::PlainText),
            ("body2", 13.0, FontKind::PlainText),
        ]);
        let summary = summarize(&one_short, &FontPolicy::type_aware(), &FONT_GRADES);
        assert_eq!(summary.pass_count, 2);
        assert_eq!(summary.percentage, 67);
        assert_eq!(summary.grade, Grade::Error);
    }

    #[test]
    fn test_policies_disagree_on_same_snapshot() {
        let s = snapshot(&[("body", 12.0, FontKind::PlainText)]);
        let single = summarize(&s, &FontPolicy::single_threshold(), &FONT_GRADES);
        let split = summarize(&s, &FontPolicy::type_aware(), &FONT_GRADES);
        assert_eq!(single.pass_count, 0);
        assert_eq!(split.pass_count, 1);
    }

    #[test]
    fn test_no_fonts() {
        for policy in [FontPolicy::single_threshold(), FontPolicy::type_aware()] {
            let summary = summarize(&AnalysisSnapshot::default(), &policy, &FONT_GRADES);
            assert_eq!(summary.total_count, 0);
            assert_eq!(summary.percentage, 0);
            assert_eq!(summary.grade, Grade::Error);
        }
    }
}
