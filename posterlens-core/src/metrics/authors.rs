//! Author listing normalizer
//!
//! Existence-graded: the poster passes once at least one named author is detected.

use super::{sort_failing_first, MetricFamily, MetricSummary, SummaryItem};
use crate::policy::Grade;
use crate::snapshot::AnalysisSnapshot;

pub fn summarize(snapshot: &AnalysisSnapshot) -> MetricSummary {
    let mut items: Vec<SummaryItem> = snapshot
        .authors
        .iter()
        .enumerate()
        .map(|(index, author)| {
            let named = !author.name.trim().is_empty();
            SummaryItem {
                key: if named {
                    author.name.clone()
                } else {
                    format!("author_{}", index + 1)
                },
                passed: named,
                value: None,
                label: author.affiliation.clone(),
            }
        })
        .collect();
    sort_failing_first(&mut items);

    MetricSummary::from_items(MetricFamily::Authors, items, |pass, _, _| {
        Grade::from_bool(pass >= 1)
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::snapshot::Author;

    fn author(name: &str) -> Author {
        Author {
            name: name.to_string(),
            affiliation: None,
            email: None,
        }
    }

    #[test]
    fn test_one_author_is_enough() {
        let snapshot = AnalysisSnapshot {
            authors: vec![author("Grace Hopper")],
            ..AnalysisSnapshot::default()
        };
        let summary = summarize(&snapshot);
        assert_eq!(summary.grade, Grade::Success);
        assert_eq!(summary.percentage, 100);
    }

    #[test]
    fn test_unnamed_authors_do_not_count() {
        let snapshot = AnalysisSnapshot {
            authors: vec![author("  "), author("")],
            ..AnalysisSnapshot::default()
        };
        let summary = summarize(&snapshot);
        assert_eq!(summary.total_count, 2);
        assert_eq!(summary.pass_count, 0);
        assert_eq!(summary.grade, Grade::Error);
        assert_eq!(summary.items[0].key, "author_1");
    }

    #[test]
    fn test_no_authors() {
        let summary = summarize(&AnalysisSnapshot::default());
        assert_eq!(summary.total_count, 0);
        assert_eq!(summary.percentage, 0);
        assert_eq!(summary.grade, Grade::Error);
    }
}
