//! Table and diagram caption normalizers
//!
//! Both families read the single `captions` mapping and select entries by key prefix.
//! Keys encode type and ordinal, e.g. `table_2` or `bar_graphs_1`.

use super::{MetricFamily, MetricSummary, SummaryItem};
use crate::policy::{Grade, GradeBands};
use crate::snapshot::AnalysisSnapshot;
use serde::{Deserialize, Serialize};

/// Values the detector emits when it found no caption
pub const PLACEHOLDER_CAPTIONS: &[&str] = &["No caption provided", "\"\"", "\"", "[]", "{}"];

/// Captioned item type, decoded from the key prefix
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CaptionKind {
    Table,
    Diagram,
    BarGraph,
    PieChart,
}

impl CaptionKind {
    const ALL: [CaptionKind; 4] = [
        CaptionKind::Table,
        CaptionKind::Diagram,
        CaptionKind::BarGraph,
        CaptionKind::PieChart,
    ];

    pub fn prefix(&self) -> &'static str {
        match self {
            CaptionKind::Table => "table_",
            CaptionKind::Diagram => "diagram_",
            CaptionKind::BarGraph => "bar_graphs_",
            CaptionKind::PieChart => "pie_chart_",
        }
    }

    pub fn family(&self) -> MetricFamily {
        match self {
            CaptionKind::Table => MetricFamily::Tables,
            CaptionKind::Diagram | CaptionKind::BarGraph | CaptionKind::PieChart => {
                MetricFamily::Diagrams
            }
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            CaptionKind::Table => "Table",
            CaptionKind::Diagram => "Diagram",
            CaptionKind::BarGraph => "Bar graph",
            CaptionKind::PieChart => "Pie chart",
        }
    }
}

/// Decoded caption key
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CaptionKey {
    pub kind: CaptionKind,
    /// Ordinal suffix, None when the suffix is not a number
    pub ordinal: Option<u32>,
}

impl CaptionKey {
    pub fn parse(key: &str) -> Option<Self> {
        CaptionKind::ALL.iter().find_map(|kind| {
            let suffix = key.strip_prefix(kind.prefix())?;
            Some(CaptionKey {
                kind: *kind,
                ordinal: suffix.parse().ok(),
            })
        })
    }
}

/// True when the caption text is real content rather than empty or a placeholder
pub fn is_caption_present(text: &str) -> bool {
    let trimmed = text.trim();
    !trimmed.is_empty() && !PLACEHOLDER_CAPTIONS.contains(&trimmed)
}

pub fn summarize_tables(snapshot: &AnalysisSnapshot, bands: &GradeBands) -> MetricSummary {
    summarize_family(snapshot, MetricFamily::Tables, bands)
}

/// Diagrams cover plain diagrams, bar graphs and pie charts
pub fn summarize_diagrams(snapshot: &AnalysisSnapshot, bands: &GradeBands) -> MetricSummary {
    summarize_family(snapshot, MetricFamily::Diagrams, bands)
}

fn summarize_family(
    snapshot: &AnalysisSnapshot,
    family: MetricFamily,
    bands: &GradeBands,
) -> MetricSummary {
    let mut keyed: Vec<(CaptionKey, SummaryItem)> = snapshot
        .captions
        .iter()
        .filter_map(|(key, caption)| {
            let parsed = CaptionKey::parse(key)?;
            if parsed.kind.family() != family {
                return None;
            }
            let present = is_caption_present(&caption.text);
            Some((
                parsed,
                SummaryItem {
                    key: key.clone(),
                    passed: present,
                    value: None,
                    label: present.then(|| caption.text.trim().to_string()),
                },
            ))
        })
        .collect();

    // missing captions first, then by type and natural ordinal (table_2 before table_10)
    keyed.sort_by(|(ka, a), (kb, b)| {
        a.passed
            .cmp(&b.passed)
            .then_with(|| ka.kind.cmp(&kb.kind))
            .then_with(|| ka.ordinal.cmp(&kb.ordinal))
            .then_with(|| a.key.cmp(&b.key))
    });
    let items = keyed.into_iter().map(|(_, item)| item).collect();

    MetricSummary::from_items(family, items, |_, total, pct| {
        if total == 0 {
            Grade::Neutral
        } else {
            bands.grade(pct)
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::policy::CAPTION_GRADES;
    use crate::snapshot::Caption;

    fn snapshot(captions: &[(&str, &str)]) -> AnalysisSnapshot {
        let mut snapshot = AnalysisSnapshot::default();
        for (key, text) in captions {
            snapshot.captions.insert(
                key.to_string(),
                Caption {
                    text: text.to_string(),
                    image_url: None,
                },
            );
        }
        snapshot
    }

    #[test]
    fn test_placeholders_are_absent() {
        for text in ["", "\"\"", "\"", "   ", "No caption provided", "[]", "{}", " [] "] {
            assert!(!is_caption_present(text), "{:?} should be absent", text);
        }
    }

    #[test]
    fn test_real_captions_are_present() {
        for text in ["Figure 1", "  Table 2: ablation  ", "x", "No caption", "[1]"] {
            assert!(is_caption_present(text), "{:?} should be present", text);
        }
    }

    #[test]
    fn test_parse_keys() {
        assert_eq!(
            CaptionKey::parse("table_2"),
            Some(CaptionKey {
                kind: CaptionKind::Table,
                ordinal: Some(2)
            })
        );
        assert_eq!(
            CaptionKey::parse("bar_graphs_10").map(|k| (k.kind, k.ordinal)),
            Some((CaptionKind::BarGraph, Some(10)))
        );
        assert_eq!(
            CaptionKey::parse("pie_chart_x").map(|k| k.ordinal),
            Some(None)
        );
        assert_eq!(CaptionKey::parse("figure_1"), None);
    }

    #[test]
    fn test_tables_and_diagrams_split() {
        let s = snapshot(&[
            ("table_1", "Table 1"),
            ("table_2", "No caption provided"),
            ("diagram_1", "Overview"),
            ("bar_graphs_1", "[]"),
            ("pie_chart_1", "Share"),
            ("logo_1", "ignored"),
        ]);

        let tables = summarize_tables(&s, &CAPTION_GRADES);
        assert_eq!((tables.pass_count, tables.total_count), (1, 2));
        assert_eq!(tables.percentage, 50);
        assert_eq!(tables.grade, Grade::Warning);

        let diagrams = summarize_diagrams(&s, &CAPTION_GRADES);
        assert_eq!((diagrams.pass_count, diagrams.total_count), (2, 3));
        assert_eq!(diagrams.percentage, 67);
        assert_eq!(diagrams.grade, Grade::Warning);
        assert_eq!(diagrams.items[0].key, "bar_graphs_1");
        assert_eq!(diagrams.items[1].label.as_deref(), Some("Overview"));
    }

    #[test]
    fn test_full_caption_coverage_is_success() {
        let s = snapshot(&[("table_1", "A"), ("table_2", "B")]);
        assert_eq!(summarize_tables(&s, &CAPTION_GRADES).grade, Grade::Success);
    }

    #[test]
    fn test_natural_ordinal_order() {
        let s = snapshot(&[("table_10", ""), ("table_2", ""), ("table_1", "")]);
        let keys: Vec<String> = summarize_tables(&s, &CAPTION_GRADES)
            .items
            .into_iter()
            .map(|i| i.key)
            .collect();
        assert_eq!(keys, vec!["table_1", "table_2", "table_10"]);
    }

    #[test]
    fn test_no_captions_is_neutral() {
        let summary = summarize_tables(&AnalysisSnapshot::default(), &CAPTION_GRADES);
        assert_eq!(summary.total_count, 0);
        assert_eq!(summary.percentage, 0);
        assert_eq!(summary.grade, Grade::Neutral);
    }
}
