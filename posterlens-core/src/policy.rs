//! Grading policies
//!
//! One policy object per metric family. Families that are graded differently by
//! different views carry named variants; the caller picks one explicitly and the
//! variants are never merged.
//!
//! Global invariants enforced:
//! - Policies are plain data (no IO)
//! - Grade bands are evaluated on integer percentages in [0, 100]

use crate::snapshot::{Dimensions, FontEntry, FontKind};
use serde::{Deserialize, Serialize};

/// Qualitative bucket derived from a percentage or boolean condition
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Grade {
    Success,
    Warning,
    Error,
    /// Nothing to grade (e.g. a poster without tables)
    Neutral,
}

impl Grade {
    pub fn as_str(&self) -> &'static str {
        match self {
            Grade::Success => "success",
            Grade::Warning => "warning",
            Grade::Error => "error",
            Grade::Neutral => "neutral",
        }
    }

    /// Severity rank, most urgent first
    pub fn severity(&self) -> u8 {
        match self {
            Grade::Error => 0,
            Grade::Warning => 1,
            Grade::Neutral => 2,
            Grade::Success => 3,
        }
    }

    pub fn from_bool(ok: bool) -> Self {
        if ok {
            Grade::Success
        } else {
            Grade::Error
        }
    }
}

/// Percentage cut-offs for success and (optionally) warning
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct GradeBands {
    pub success: u8,
    /// None means there is no intermediate tier
    pub warning: Option<u8>,
}

impl GradeBands {
    pub const fn new(success: u8, warning: Option<u8>) -> Self {
        GradeBands { success, warning }
    }

    pub fn grade(&self, percentage: u8) -> Grade {
        if percentage >= self.success {
            Grade::Success
        } else if self.warning.map_or(false, |w| percentage >= w) {
            Grade::Warning
        } else {
            Grade::Error
        }
    }
}

pub const CONTRAST_GRADES: GradeBands = GradeBands::new(70, Some(50));
pub const FONT_GRADES: GradeBands = GradeBands::new(70, Some(50));
pub const LOGO_GRADES: GradeBands = GradeBands::new(70, None);
pub const CAPTION_GRADES: GradeBands = GradeBands::new(100, Some(50));
pub const HYPERLINK_LIST_GRADES: GradeBands = GradeBands::new(90, None);

/// Minimum font sizes (points)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "policy", rename_all = "snake_case")]
pub enum FontPolicy {
    /// One minimum for every text role
    SingleThreshold { min_size: f64 },
    /// Headings and body text are held to different minimums
    TypeAware { heading_min: f64, body_min: f64 },
}

impl FontPolicy {
    pub const DEFAULT_MIN_SIZE: f64 = 14.0;
    pub const DEFAULT_HEADING_MIN: f64 = 16.0;
    pub const DEFAULT_BODY_MIN: f64 = 12.0;

    pub fn single_threshold() -> Self {
        FontPolicy::SingleThreshold {
            min_size: Self::DEFAULT_MIN_SIZE,
        }
    }

    /// The stricter heading-vs-body split used by the dashboard
    pub fn type_aware() -> Self {
        FontPolicy::TypeAware {
            heading_min: Self::DEFAULT_HEADING_MIN,
            body_min: Self::DEFAULT_BODY_MIN,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            FontPolicy::SingleThreshold { .. } => "single_threshold",
            FontPolicy::TypeAware { .. } => "type_aware",
        }
    }

    /// Minimum size a font of `kind` must reach
    pub fn minimum_for(&self, kind: &FontKind) -> f64 {
        match self {
            FontPolicy::SingleThreshold { min_size } => *min_size,
            FontPolicy::TypeAware {
                heading_min,
                body_min,
            } => {
                if kind.is_heading() {
                    *heading_min
                } else {
                    *body_min
                }
            }
        }
    }

    pub fn passes(&self, font: &FontEntry) -> bool {
        font.font_size >= self.minimum_for(&font.kind)
    }
}

impl Default for FontPolicy {
    fn default() -> Self {
        FontPolicy::single_threshold()
    }
}

/// What counts as sufficient image resolution
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "policy", rename_all = "snake_case")]
pub enum ResolutionPolicy {
    /// Print density check
    Dpi { min_dpi: f64 },
    /// Pixel dimension check with a minimum and an HD tier
    Dimensions { minimum: Dimensions, hd: Dimensions },
}

impl ResolutionPolicy {
    pub const DEFAULT_MIN_DPI: f64 = 300.0;
    pub const DEFAULT_MINIMUM: Dimensions = Dimensions::new(800, 600);
    pub const DEFAULT_HD: Dimensions = Dimensions::new(1920, 1080);

    pub fn dpi() -> Self {
        ResolutionPolicy::Dpi {
            min_dpi: Self::DEFAULT_MIN_DPI,
        }
    }

    pub fn dimensions() -> Self {
        ResolutionPolicy::Dimensions {
            minimum: Self::DEFAULT_MINIMUM,
            hd: Self::DEFAULT_HD,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            ResolutionPolicy::Dpi { .. } => "dpi",
            ResolutionPolicy::Dimensions { .. } => "dimensions",
        }
    }
}

impl Default for ResolutionPolicy {
    fn default() -> Self {
        ResolutionPolicy::dpi()
    }
}

/// Full set of policies handed to the normalizers
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct Policies {
    pub contrast: GradeBands,
    pub font: FontPolicy,
    pub font_grades: GradeBands,
    pub logo: GradeBands,
    pub resolution: ResolutionPolicy,
    pub hyperlink_list: GradeBands,
    pub captions: GradeBands,
}

impl Default for Policies {
    fn default() -> Self {
        Policies {
            contrast: CONTRAST_GRADES,
            font: FontPolicy::default(),
            font_grades: FONT_GRADES,
            logo: LOGO_GRADES,
            resolution: ResolutionPolicy::default(),
            hyperlink_list: HYPERLINK_LIST_GRADES,
            captions: CAPTION_GRADES,
        }
    }
}

impl Policies {
    /// Policies of the dashboard view: heading/body font split, pixel-dimension resolution
    pub fn dashboard() -> Self {
        Policies {
            font: FontPolicy::type_aware(),
            resolution: ResolutionPolicy::dimensions(),
            ..Policies::default()
        }
    }
}
