//! Image resolution normalizer
//!
//! Two independent notions of "sufficient" exist: print density (DPI) and pixel
//! dimensions. The caller chooses one through [`ResolutionPolicy`].

use super::{MetricFamily, MetricSummary, SummaryItem};
use crate::policy::{Grade, ResolutionPolicy};
use crate::snapshot::{AnalysisSnapshot, Dimensions, ImageResolution};
use serde::{Deserialize, Serialize};

/// Where the poster's pixel dimensions fall
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DimensionTier {
    /// Resolution string could not be parsed
    Unknown,
    BelowMinimum,
    Minimum,
    Hd,
}

impl DimensionTier {
    pub fn as_str(&self) -> &'static str {
        match self {
            DimensionTier::Unknown => "unknown",
            DimensionTier::BelowMinimum => "below_minimum",
            DimensionTier::Minimum => "minimum",
            DimensionTier::Hd => "hd",
        }
    }
}

pub fn dimension_tier(
    resolution: &ImageResolution,
    minimum: &Dimensions,
    hd: &Dimensions,
) -> DimensionTier {
    match resolution.dimensions() {
        None => DimensionTier::Unknown,
        Some(d) if d.covers(hd) => DimensionTier::Hd,
        Some(d) if d.covers(minimum) => DimensionTier::Minimum,
        Some(_) => DimensionTier::BelowMinimum,
    }
}

pub fn meets_dpi(resolution: &ImageResolution, min_dpi: f64) -> bool {
    resolution.dpi >= min_dpi
}

/// Summarize image resolution as a single graded item
///
/// A snapshot without any resolution data reports the No-Data summary.
pub fn summarize(snapshot: &AnalysisSnapshot, policy: &ResolutionPolicy) -> MetricSummary {
    let resolution = &snapshot.image_resolution;
    if resolution.is_unmeasured() {
        return MetricSummary::no_data(MetricFamily::Resolution, Grade::Error);
    }

    match policy {
        ResolutionPolicy::Dpi { min_dpi } => {
            let passed = meets_dpi(resolution, *min_dpi);
            let item = SummaryItem {
                key: "dpi".to_string(),
                passed,
                value: Some(resolution.dpi),
                label: Some(format!("{} DPI", resolution.dpi)),
            };
            MetricSummary::from_items(MetricFamily::Resolution, vec![item], |_, _, _| {
                Grade::from_bool(passed)
            })
        }
        ResolutionPolicy::Dimensions { minimum, hd } => {
            let tier = dimension_tier(resolution, minimum, hd);
            let item = SummaryItem {
                key: "dimensions".to_string(),
                passed: matches!(tier, DimensionTier::Minimum | DimensionTier::Hd),
                value: resolution
                    .dimensions()
                    .map(|d| f64::from(d.width) * f64::from(d.height)),
                label: Some(resolution.resolution.clone()),
            };
            MetricSummary::from_items(MetricFamily::Resolution, vec![item], |_, _, _| {
                match tier {
                    DimensionTier::Hd => Grade::Success,
                    DimensionTier::Minimum => Grade::Warning,
                    DimensionTier::BelowMinimum | DimensionTier::Unknown => Grade::Error,
                }
            })
        }
    }
}
