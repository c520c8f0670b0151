//! Detail view adapters
//!
//! Turns a snapshot into display-ready rows for one metric family: colour strings,
//! WCAG labels, ratio labels, decoded caption keys and per-policy verdicts.
//!
//! Global invariants enforced:
//! - Pure and deterministic (no IO, no clocks)
//! - Row order matches the order of the family's summary items

use crate::aggregates::summarize_family;
use crate::error::EngineResult;
use crate::metrics::captions::{is_caption_present, CaptionKey, CaptionKind};
use crate::metrics::contrast::{prioritize_sections, WcagLevel};
use crate::metrics::resolution::{dimension_tier, meets_dpi, DimensionTier};
use crate::metrics::{MetricFamily, MetricSummary};
use crate::policy::{FontPolicy, Grade, Policies, ResolutionPolicy};
use crate::snapshot::{AnalysisSnapshot, Dimensions, HyperlinksShape, LogoLabel};
use serde::Serialize;
use serde_json::Value;

/// Progress bar colour for a grade
pub fn grade_color(grade: Grade) -> &'static str {
    match grade {
        Grade::Success => "#22c55e",
        Grade::Warning => "#eab308",
        Grade::Error => "#ef4444",
        Grade::Neutral => "#6b7280",
    }
}

/// Summary block shown above the rows
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct DetailHeader {
    pub family: MetricFamily,
    pub pass_count: usize,
    pub total_count: usize,
    pub percentage: u8,
    pub grade: Grade,
    pub progress_color: &'static str,
    pub headline: String,
}

impl DetailHeader {
    pub fn from_summary(summary: &MetricSummary) -> Self {
        let headline = if summary.has_data() {
            format!(
                "{} of {} {} pass",
                summary.pass_count,
                summary.total_count,
                noun(summary.family)
            )
        } else {
            format!("No {} detected", noun(summary.family))
        };
        DetailHeader {
            family: summary.family,
            pass_count: summary.pass_count,
            total_count: summary.total_count,
            percentage: summary.percentage,
            grade: summary.grade,
            progress_color: grade_color(summary.grade),
            headline,
        }
    }
}

fn noun(family: MetricFamily) -> &'static str {
    match family {
        MetricFamily::Contrast => "text sections",
        MetricFamily::Font => "font samples",
        MetricFamily::Logo => "logos",
        MetricFamily::Resolution => "resolution checks",
        MetricFamily::Hyperlinks => "hyperlinks",
        MetricFamily::Authors => "authors",
        MetricFamily::Tables => "table captions",
        MetricFamily::Diagrams => "diagram captions",
    }
}

/// Header plus rows of one family
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct Detail<R> {
    pub header: DetailHeader,
    pub rows: Vec<R>,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct ContrastRow {
    pub section_id: String,
    pub contrast_ratio: f64,
    /// e.g. `4.52:1`
    pub ratio_label: String,
    pub wcag: WcagLevel,
    pub passed: bool,
    pub accessibility_derived: bool,
    pub threshold: f64,
    pub text_type: String,
    pub text_color_css: String,
    pub text_color_hex: String,
    pub background_color_css: String,
    pub background_color_hex: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub section_image_url: Option<String>,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct FontRow {
    pub key: String,
    pub font_size: f64,
    pub kind: String,
    /// Minimum under the active policy
    pub required_size: f64,
    pub passed: bool,
    pub passes_single_threshold: bool,
    pub passes_type_aware: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct LogoRow {
    pub key: String,
    pub label: Option<LogoLabel>,
    pub passed: bool,
    pub image_urls: Vec<String>,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct ResolutionRow {
    pub dpi: f64,
    pub resolution: String,
    pub dimensions: Option<Dimensions>,
    pub meets_dpi: bool,
    pub tier: DimensionTier,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub laplacian_variance: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub psnr: Option<f64>,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct HyperlinkRow {
    pub url: String,
    /// None when the producer did not validate the link
    pub valid: Option<bool>,
    pub passed: bool,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct AuthorRow {
    pub name: String,
    pub affiliation: Option<String>,
    pub email: Option<String>,
    pub mailto: Option<String>,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct CaptionRow {
    pub key: String,
    pub kind: CaptionKind,
    pub kind_label: &'static str,
    pub ordinal: Option<u32>,
    pub present: bool,
    pub text: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
}

/// Format a ratio as `N.NN:1`
pub fn ratio_label(ratio: f64) -> String {
    format!("{:.2}:1", ratio)
}

fn header(snapshot: &AnalysisSnapshot, family: MetricFamily, policies: &Policies) -> DetailHeader {
    DetailHeader::from_summary(&summarize_family(snapshot, family, policies))
}

pub fn contrast_detail(snapshot: &AnalysisSnapshot, policies: &Policies) -> Detail<ContrastRow> {
    let rows = prioritize_sections(&snapshot.color_contrast.sections)
        .into_iter()
        .map(|section| ContrastRow {
            section_id: section.section_id.clone(),
            contrast_ratio: section.contrast_ratio,
            ratio_label: ratio_label(section.contrast_ratio),
            wcag: WcagLevel::from_ratio(section.contrast_ratio),
            passed: section.accessibility.is_pass(),
            accessibility_derived: section.accessibility_derived,
            threshold: section.threshold,
            text_type: section.text_type.clone(),
            text_color_css: section.text_color.css(),
            text_color_hex: section.text_color.hex(),
            background_color_css: section.background_color.css(),
            background_color_hex: section.background_color.hex(),
            section_image_url: section.section_image_url.clone(),
        })
        .collect();

    Detail {
        header: header(snapshot, MetricFamily::Contrast, policies),
        rows,
    }
}

/// Font rows carry verdicts under both font policies
///
/// The alternative policy uses its defaults unless it is the active one.
pub fn font_detail(snapshot: &AnalysisSnapshot, policies: &Policies) -> Detail<FontRow> {
    let active = &policies.font;
    let single = match active {
        FontPolicy::SingleThreshold { .. } => *active,
        FontPolicy::TypeAware { .. } => FontPolicy::single_threshold(),
    };
    let type_aware = match active {
        FontPolicy::TypeAware { .. } => *active,
        FontPolicy::SingleThreshold { .. } => FontPolicy::type_aware(),
    };

    let summary = summarize_family(snapshot, MetricFamily::Font, policies);
    let rows = summary
        .items
        .iter()
        .filter_map(|item| {
            let font = snapshot.font_sizes.get(&item.key)?;
            Some(FontRow {
                key: item.key.clone(),
                font_size: font.font_size,
                kind: font.kind.as_str().to_string(),
                required_size: active.minimum_for(&font.kind),
                passed: item.passed,
                passes_single_threshold: single.passes(font),
                passes_type_aware: type_aware.passes(font),
                image_url: font.image_url.clone(),
            })
        })
        .collect();

    Detail {
        header: DetailHeader::from_summary(&summary),
        rows,
    }
}

pub fn logo_detail(snapshot: &AnalysisSnapshot, policies: &Policies) -> Detail<LogoRow> {
    let mut rows: Vec<LogoRow> = snapshot
        .logo_evaluation
        .logos
        .iter()
        .enumerate()
        .map(|(index, logo)| LogoRow {
            key: format!("logo_{}", index + 1),
            label: logo.label,
            passed: logo.label == Some(LogoLabel::Simple),
            image_urls: logo.image_urls.clone(),
        })
        .collect();
    rows.sort_by_key(|row| row.passed);

    Detail {
        header: header(snapshot, MetricFamily::Logo, policies),
        rows,
    }
}

/// Resolution detail reports both the DPI and the pixel-dimension verdict
///
/// Thresholds come from the active policy when it is that kind, defaults otherwise.
/// An unmeasured poster has no row.
pub fn resolution_detail(
    snapshot: &AnalysisSnapshot,
    policies: &Policies,
) -> Detail<ResolutionRow> {
    let resolution = &snapshot.image_resolution;
    let (min_dpi, minimum, hd) = match policies.resolution {
        ResolutionPolicy::Dpi { min_dpi } => (
            min_dpi,
            ResolutionPolicy::DEFAULT_MINIMUM,
            ResolutionPolicy::DEFAULT_HD,
        ),
        ResolutionPolicy::Dimensions { minimum, hd } => {
            (ResolutionPolicy::DEFAULT_MIN_DPI, minimum, hd)
        }
    };

    let mut rows = Vec::new();
    if !resolution.is_unmeasured() {
        rows.push(ResolutionRow {
            dpi: resolution.dpi,
            resolution: resolution.resolution.clone(),
            dimensions: resolution.dimensions(),
            meets_dpi: meets_dpi(resolution, min_dpi),
            tier: dimension_tier(resolution, &minimum, &hd),
            laplacian_variance: resolution.laplacian_variance,
            psnr: resolution.psnr,
        });
    }

    Detail {
        header: header(snapshot, MetricFamily::Resolution, policies),
        rows,
    }
}

pub fn hyperlink_detail(snapshot: &AnalysisSnapshot, policies: &Policies) -> Detail<HyperlinkRow> {
    let mut rows: Vec<HyperlinkRow> = match &snapshot.hyperlinks {
        HyperlinksShape::Mapping(links) => links
            .iter()
            .map(|(url, meta)| HyperlinkRow {
                url: url.clone(),
                valid: meta.valid,
                passed: meta.valid != Some(false),
            })
            .collect(),
        HyperlinksShape::ValidatedList(entries) => entries
            .iter()
            .filter_map(|entry| {
                let valid = entry.valid?;
                Some(HyperlinkRow {
                    url: entry.url.clone(),
                    valid: Some(valid),
                    passed: valid,
                })
            })
            .collect(),
    };
    rows.sort_by_key(|row| row.passed);

    Detail {
        header: header(snapshot, MetricFamily::Hyperlinks, policies),
        rows,
    }
}

/// Authors in payload order
pub fn author_detail(snapshot: &AnalysisSnapshot, policies: &Policies) -> Detail<AuthorRow> {
    let rows = snapshot
        .authors
        .iter()
        .map(|author| {
            let email = author
                .email
                .as_deref()
                .map(str::trim)
                .filter(|e| !e.is_empty());
            AuthorRow {
                name: author.name.clone(),
                affiliation: author.affiliation.clone(),
                email: email.map(str::to_string),
                mailto: email.map(|e| format!("mailto:{}", e)),
            }
        })
        .collect();

    Detail {
        header: header(snapshot, MetricFamily::Authors, policies),
        rows,
    }
}

pub fn caption_detail(
    snapshot: &AnalysisSnapshot,
    family: MetricFamily,
    policies: &Policies,
) -> Detail<CaptionRow> {
    let summary = summarize_family(snapshot, family, policies);
    let rows = summary
        .items
        .iter()
        .filter_map(|item| {
            let caption = snapshot.captions.get(&item.key)?;
            let key = CaptionKey::parse(&item.key)?;
            Some(CaptionRow {
                key: item.key.clone(),
                kind: key.kind,
                kind_label: key.kind.display_name(),
                ordinal: key.ordinal,
                present: is_caption_present(&caption.text),
                text: caption.text.clone(),
                image_url: caption.image_url.clone(),
            })
        })
        .collect();

    Detail {
        header: DetailHeader::from_summary(&summary),
        rows,
    }
}

/// Detail of any family as JSON
pub fn detail_json(
    family: MetricFamily,
    snapshot: &AnalysisSnapshot,
    policies: &Policies,
) -> EngineResult<Value> {
    let value = match family {
        MetricFamily::Contrast => serde_json::to_value(contrast_detail(snapshot, policies))?,
        MetricFamily::Font => serde_json::to_value(font_detail(snapshot, policies))?,
        MetricFamily::Logo => serde_json::to_value(logo_detail(snapshot, policies))?,
        MetricFamily::Resolution => serde_json::to_value(resolution_detail(snapshot, policies))?,
        MetricFamily::Hyperlinks => serde_json::to_value(hyperlink_detail(snapshot, policies))?,
        MetricFamily::Authors => serde_json::to_value(author_detail(snapshot, policies))?,
        MetricFamily::Tables | MetricFamily::Diagrams => {
            serde_json::to_value(caption_detail(snapshot, family, policies))?
        }
    };
    Ok(value)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::snapshot::{
        Accessibility, Author, Caption, ContrastSection, FontEntry, FontKind, ImageResolution,
        Rgb,
    };

    fn contrast_snapshot() -> AnalysisSnapshot {
        let mut snapshot = AnalysisSnapshot::default();
        snapshot.color_contrast.sections = vec![
            ContrastSection {
                section_id: "title".to_string(),
                contrast_ratio: 12.0,
                accessibility: Accessibility::Pass,
                accessibility_derived: false,
                threshold: 4.5,
                text_type: "normal".to_string(),
                text_color: Rgb::new(0, 0, 0),
                background_color: Rgb::new(255, 255, 255),
                section_image_url: None,
            },
            ContrastSection {
                section_id: "footer".to_string(),
                contrast_ratio: 2.346,
                accessibility: Accessibility::Fail,
                accessibility_derived: true,
                threshold: 4.5,
                text_type: "normal".to_string(),
                text_color: Rgb::new(128, 128, 128),
                background_color: Rgb::new(160, 32, 240),
                section_image_url: Some("https://eval.example.org/s2.png".to_string()),
            },
        ];
        snapshot
    }

    #[test]
    fn test_grade_palette() {
        assert_eq!(grade_color(Grade::Success), "#22c55e");
        assert_eq!(grade_color(Grade::Warning), "#eab308");
        assert_eq!(grade_color(Grade::Error), "#ef4444");
        assert_eq!(grade_color(Grade::Neutral), "#6b7280");
    }

    #[test]
    fn test_ratio_label() {
        assert_eq!(ratio_label(4.5234), "4.52:1");
        assert_eq!(ratio_label(21.0), "21.00:1");
    }

    #[test]
    fn test_contrast_rows() {
        let detail = contrast_detail(&contrast_snapshot(), &Policies::default());
        assert_eq!(detail.rows.len(), 2);

        let first = &detail.rows[0];
        assert_eq!(first.section_id, "footer");
        assert_eq!(first.ratio_label, "2.35:1");
        assert_eq!(first.wcag, WcagLevel::Fail);
        assert_eq!(first.text_color_css, "rgb(128, 128, 128)");
        assert_eq!(first.background_color_hex, "#a020f0");
        assert!(first.accessibility_derived);

        assert_eq!(detail.rows[1].wcag, WcagLevel::Aaa);
        assert_eq!(detail.header.percentage, 50);
        assert_eq!(detail.header.grade, Grade::Warning);
        assert_eq!(detail.header.progress_color, "#eab308");
        assert_eq!(detail.header.headline, "1 of 2 text sections pass");
    }

    #[test]
    fn test_font_rows_carry_both_verdicts() {
        let mut snapshot = AnalysisSnapshot::default();
        snapshot.font_sizes.insert(
            "title".to_string(),
            FontEntry {
                font_size: 15.0,
                kind: FontKind::Heading,
                image_url: None,
            },
        );
        snapshot.font_sizes.insert(
            "body".to_string(),
            FontEntry {
                font_size: 13.0,
                kind: FontKind::PlainText,
                image_url: None,
            },
        );

        let detail = font_detail(&snapshot, &Policies::default());
        // body fails the single threshold, so it comes first
        let body = &detail.rows[0];
        assert_eq!(body.key, "body");
        assert!(!body.passes_single_threshold);
        assert!(body.passes_type_aware);
        assert_eq!(body.required_size, 14.0);

        let title = &detail.rows[1];
        assert!(title.passes_single_threshold);
        assert!(!title.passes_type_aware);

        let dashboard = font_detail(&snapshot, &Policies::dashboard());
        assert_eq!(dashboard.rows[0].key, "title");
        assert_eq!(dashboard.rows[0].required_size, 16.0);
        assert_eq!(dashboard.header.grade, Grade::Error);
    }

    #[test]
    fn test_resolution_row_reports_both_policies() {
        let snapshot = AnalysisSnapshot {
            image_resolution: ImageResolution {
                dpi: 150.0,
                resolution: "2400x1600".to_string(),
                laplacian_variance: Some(210.5),
                psnr: None,
            },
            ..AnalysisSnapshot::default()
        };
        let detail = resolution_detail(&snapshot, &Policies::default());
        assert_eq!(detail.rows.len(), 1);
        assert!(!detail.rows[0].meets_dpi);
        assert_eq!(detail.rows[0].tier, DimensionTier::Hd);
        assert_eq!(detail.rows[0].dimensions, Some(Dimensions::new(2400, 1600)));
        assert_eq!(detail.header.grade, Grade::Error);

        let detail = resolution_detail(&snapshot, &Policies::dashboard());
        assert_eq!(detail.header.grade, Grade::Success);
    }

    #[test]
    fn test_unmeasured_resolution_has_no_rows() {
        let detail = resolution_detail(&AnalysisSnapshot::default(), &Policies::default());
        assert!(detail.rows.is_empty());
        assert_eq!(detail.header.headline, "No resolution checks detected");
    }

    #[test]
    fn test_author_mailto() {
        let snapshot = AnalysisSnapshot {
            authors: vec![
                Author {
                    name: "Ada".to_string(),
                    affiliation: Some("Analytical Engines".to_string()),
                    email: Some(" ada@example.org ".to_string()),
                },
                Author {
                    name: "Bob".to_string(),
                    affiliation: None,
                    email: Some(String::new()),
                },
            ],
            ..AnalysisSnapshot::default()
        };
        let detail = author_detail(&snapshot, &Policies::default());
        assert_eq!(detail.rows[0].mailto.as_deref(), Some("mailto:ada@example.org"));
        assert_eq!(detail.rows[1].email, None);
        assert_eq!(detail.rows[1].mailto, None);
    }

    #[test]
    fn test_caption_rows_decode_keys() {
        let mut snapshot = AnalysisSnapshot::default();
        for (key, text) in [("pie_chart_2", "Share"), ("diagram_1", "No caption provided")] {
            snapshot.captions.insert(
                key.to_string(),
                Caption {
                    text: text.to_string(),
                    image_url: None,
                },
            );
        }
        let detail = caption_detail(&snapshot, MetricFamily::Diagrams, &Policies::default());
        assert_eq!(detail.rows.len(), 2);
        assert_eq!(detail.rows[0].key, "diagram_1");
        assert!(!detail.rows[0].present);
        assert_eq!(detail.rows[1].kind, CaptionKind::PieChart);
        assert_eq!(detail.rows[1].kind_label, "Pie chart");
        assert_eq!(detail.rows[1].ordinal, Some(2));
    }

    #[test]
    fn test_detail_json_is_deterministic() {
        let snapshot = contrast_snapshot();
        for family in MetricFamily::ALL {
            let a = detail_json(family, &snapshot, &Policies::default()).unwrap();
            let b = detail_json(family, &snapshot, &Policies::default()).unwrap();
            assert_eq!(a, b);
            assert_eq!(a["header"]["family"], family.as_str());
        }
    }
}
