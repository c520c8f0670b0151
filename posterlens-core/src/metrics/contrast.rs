//! Colour contrast normalizer
//!
//! Counts sections whose verdict is PASS and ranks them by WCAG level. Sections are
//! presented most urgent first: failures, then ascending ratio.

use super::{sort_failing_first_by_value, MetricFamily, MetricSummary, SummaryItem};
use crate::policy::GradeBands;
use crate::snapshot::{AnalysisSnapshot, ContrastSection};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

/// WCAG 2.x contrast conformance level
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum WcagLevel {
    #[serde(rename = "Fail")]
    Fail,
    #[serde(rename = "AA Large")]
    AaLarge,
    #[serde(rename = "AA")]
    Aa,
    #[serde(rename = "AAA")]
    Aaa,
}

impl WcagLevel {
    pub fn from_ratio(ratio: f64) -> Self {
        if ratio >= 7.0 {
            WcagLevel::Aaa
        } else if ratio >= 4.5 {
            WcagLevel::Aa
        } else if ratio >= 3.0 {
            WcagLevel::AaLarge
        } else {
            WcagLevel::Fail
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            WcagLevel::Aaa => "AAA",
            WcagLevel::Aa => "AA",
            WcagLevel::AaLarge => "AA Large",
            WcagLevel::Fail => "Fail",
        }
    }
}

/// Order sections for the detail view
///
/// Failing sections first, then ascending contrast ratio; ties keep payload order.
pub fn prioritize_sections(sections: &[ContrastSection]) -> Vec<&ContrastSection> {
    let mut ordered: Vec<&ContrastSection> = sections.iter().collect();
    ordered.sort_by(|a, b| {
        a.accessibility
            .is_pass()
            .cmp(&b.accessibility.is_pass())
            .then_with(|| {
                a.contrast_ratio
                    .partial_cmp(&b.contrast_ratio)
                    .unwrap_or(Ordering::Equal)
            })
    });
    ordered
}

/// Summarize contrast sections
pub fn summarize(snapshot: &AnalysisSnapshot, bands: &GradeBands) -> MetricSummary {
    let mut items: Vec<SummaryItem> = snapshot
        .color_contrast
        .sections
        .iter()
        .map(|section| SummaryItem {
            key: section.section_id.clone(),
            passed: section.accessibility.is_pass(),
            value: Some(section.contrast_ratio),
            label: Some(WcagLevel::from_ratio(section.contrast_ratio).as_str().to_string()),
        })
        .collect();
    sort_failing_first_by_value(&mut items);

    MetricSummary::from_items(MetricFamily::Contrast, items, |_, _, pct| bands.grade(pct))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::policy::{Grade, CONTRAST_GRADES};
    use crate::snapshot::{Accessibility, Rgb};

    fn section(id: &str, ratio: f64, accessibility: Accessibility) -> ContrastSection {
        ContrastSection {
            section_id: id.to_string(),
            contrast_ratio: ratio,
            accessibility,
            accessibility_derived: false,
            threshold: 4.5,
            text_type: "normal".to_string(),
            text_color: Rgb::new(0, 0, 0),
            background_color: Rgb::new(255, 255, 255),
            section_image_url: None,
        }
    }

    #[test]
    fn test_wcag_levels() {
        assert_eq!(WcagLevel::from_ratio(21.0), WcagLevel::Aaa);
        assert_eq!(WcagLevel::from_ratio(7.0), WcagLevel::Aaa);
        assert_eq!(WcagLevel::from_ratio(6.99), WcagLevel::Aa);
        assert_eq!(WcagLevel::from_ratio(4.5), WcagLevel::Aa);
        assert_eq!(WcagLevel::from_ratio(4.49), WcagLevel::AaLarge);
        assert_eq!(WcagLevel::from_ratio(3.0), WcagLevel::AaLarge);
        assert_eq!(WcagLevel::from_ratio(2.99), WcagLevel::Fail);
        assert_eq!(WcagLevel::from_ratio(0.0), WcagLevel::Fail);
    }

    #[test]
    fn test_sorting_law() {
        let sections = vec![
            section("a", 5.0, Accessibility::Pass),
            section("b", 2.0, Accessibility::Fail),
            section("c", 6.0, Accessibility::Pass),
            section("d", 1.0, Accessibility::Fail),
        ];
        let ratios: Vec<f64> = prioritize_sections(&sections)
            .iter()
            .map(|s| s.contrast_ratio)
            .collect();
        assert_eq!(ratios, vec![1.0, 2.0, 5.0, 6.0]);

        let summary = summarize(
            &AnalysisSnapshot {
                color_contrast: crate::snapshot::ColorContrast {
                    summary_image_url: None,
                    sections,
                },
                ..AnalysisSnapshot::default()
            },
            &CONTRAST_GRADES,
        );
        let keys: Vec<&str> = summary.items.iter().map(|i| i.key.as_str()).collect();
        assert_eq!(keys, vec!["d", "b", "a", "c"]);
    }

    #[test]
    fn test_equal_ratios_keep_payload_order() {
        let sections = vec![
            section("first", 3.0, Accessibility::Fail),
            section("second", 3.0, Accessibility::Fail),
        ];
        let ids: Vec<&str> = prioritize_sections(&sections)
            .iter()
            .map(|s| s.section_id.as_str())
            .collect();
        assert_eq!(ids, vec!["first", "second"]);
    }

    #[test]
    fn test_verdict_is_trusted_over_ratio() {
        // a section the service marked FAIL stays failing even with a high ratio
        let snapshot = AnalysisSnapshot {
            color_contrast: crate::snapshot::ColorContrast {
                summary_image_url: None,
                sections: vec![section("x", 9.0, Accessibility::Fail)],
            },
            ..AnalysisSnapshot::default()
        };
        let summary = summarize(&snapshot, &CONTRAST_GRADES);
        assert_eq!(summary.pass_count, 0);
        assert_eq!(summary.items[0].label.as_deref(), Some("AAA"));
        assert_eq!(summary.grade, Grade::Error);
    }

    #[test]
    fn test_empty_contrast() {
        let summary = summarize(&AnalysisSnapshot::default(), &CONTRAST_GRADES);
        assert_eq!(summary.total_count, 0);
        assert_eq!(summary.percentage, 0);
        assert_eq!(summary.grade, Grade::Error);
    }
}
