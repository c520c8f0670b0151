//! Analysis snapshot data model
//!
//! The canonical, fully-defaulted representation of one evaluation result.
//!
//! Global invariants enforced:
//! - Every field has a value (absent payload fields are defaulted by the adapter)
//! - Every image URL is absolute
//! - Maps are ordered so serialization is byte-for-byte deterministic
//! - Contrast ratios are never negative

use regex::Regex;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use std::fmt;
use std::sync::OnceLock;

/// Complete normalized evaluation for one uploaded poster
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "snake_case")]
pub struct AnalysisSnapshot {
    #[serde(default)]
    pub authors: Vec<Author>,
    #[serde(default)]
    pub captions: BTreeMap<String, Caption>,
    #[serde(default)]
    pub color_contrast: ColorContrast,
    #[serde(default)]
    pub hyperlinks: HyperlinksShape,
    #[serde(default)]
    pub image_resolution: ImageResolution,
    #[serde(default)]
    pub logo_evaluation: LogoEvaluation,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub poster_layout_image_url: Option<String>,
    #[serde(default)]
    pub font_sizes: BTreeMap<String, FontEntry>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub struct Author {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub affiliation: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
}

/// Caption text as detected on the poster, plus the cropped figure/table image
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub struct Caption {
    pub text: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "snake_case")]
pub struct ColorContrast {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub summary_image_url: Option<String>,
    #[serde(default)]
    pub sections: Vec<ContrastSection>,
}

/// Pass/fail verdict of a contrast section
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Accessibility {
    Pass,
    Fail,
}

impl Accessibility {
    pub fn as_str(&self) -> &'static str {
        match self {
            Accessibility::Pass => "PASS",
            Accessibility::Fail => "FAIL",
        }
    }

    pub fn is_pass(&self) -> bool {
        matches!(self, Accessibility::Pass)
    }
}

/// An sRGB colour triple
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Rgb(pub [u8; 3]);

impl Rgb {
    pub fn new(r: u8, g: u8, b: u8) -> Self {
        Rgb([r, g, b])
    }

    /// CSS functional notation, e.g. `rgb(255, 255, 255)`
    pub fn css(&self) -> String {
        let [r, g, b] = self.0;
        format!("rgb({}, {}, {})", r, g, b)
    }

    /// Lowercase hex notation, e.g. `#ffffff`
    pub fn hex(&self) -> String {
        let [r, g, b] = self.0;
        format!("#{:02x}{:02x}{:02x}", r, g, b)
    }
}

/// One text region measured for foreground/background contrast
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "snake_case")]
pub struct ContrastSection {
    pub section_id: String,
    pub contrast_ratio: f64,
    pub accessibility: Accessibility,
    /// True when the payload carried no verdict and it was re-derived from the ratio
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub accessibility_derived: bool,
    pub threshold: f64,
    #[serde(rename = "type")]
    pub text_type: String,
    pub text_color: Rgb,
    pub background_color: Rgb,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub section_image_url: Option<String>,
}

/// Hyperlink data as delivered by the producer
///
/// Producers disagree on the shape: some send a mapping keyed by URL, some a list of
/// entries that already carry a validity verdict.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "shape", content = "links", rename_all = "snake_case")]
pub enum HyperlinksShape {
    Mapping(BTreeMap<String, LinkMetadata>),
    ValidatedList(Vec<LinkEntry>),
}

impl Default for HyperlinksShape {
    fn default() -> Self {
        HyperlinksShape::Mapping(BTreeMap::new())
    }
}

impl HyperlinksShape {
    pub fn len(&self) -> usize {
        match self {
            HyperlinksShape::Mapping(map) => map.len(),
            HyperlinksShape::ValidatedList(entries) => entries.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "snake_case")]
pub struct LinkMetadata {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub valid: Option<bool>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub attributes: BTreeMap<String, Value>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "snake_case")]
pub struct LinkEntry {
    /// `link_N` when the producer sent a verdict without a URL
    pub url: String,
    /// None when the producer sent the link without a verdict
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub valid: Option<bool>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub attributes: BTreeMap<String, Value>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "snake_case")]
pub struct ImageResolution {
    pub dpi: f64,
    /// Pixel dimensions as reported, `"WxH"`
    pub resolution: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub laplacian_variance: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub psnr: Option<f64>,
}

impl Default for ImageResolution {
    fn default() -> Self {
        ImageResolution {
            dpi: 0.0,
            resolution: "0x0".to_string(),
            laplacian_variance: None,
            psnr: None,
        }
    }
}

impl ImageResolution {
    /// Parse the `"WxH"` resolution string
    ///
    /// Accepts `x`, `X` or `×` as separator and surrounding whitespace.
    /// Returns None when the string is not in that form.
    pub fn dimensions(&self) -> Option<Dimensions> {
        static RESOLUTION_RE: OnceLock<Regex> = OnceLock::new();
        let re = RESOLUTION_RE.get_or_init(|| {
            Regex::new(r"^\s*(\d+)\s*[xX×]\s*(\d+)\s*$").expect("valid resolution pattern")
        });
        let caps = re.captures(&self.resolution)?;
        let width = caps.get(1)?.as_str().parse().ok()?;
        let height = caps.get(2)?.as_str().parse().ok()?;
        Some(Dimensions { width, height })
    }

    /// True when the payload carried no resolution data at all
    pub fn is_unmeasured(&self) -> bool {
        self.dpi <= 0.0 && self.dimensions().map_or(true, |d| d.is_zero())
    }
}

/// Pixel width and height
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Dimensions {
    pub width: u32,
    pub height: u32,
}

impl Dimensions {
    pub const fn new(width: u32, height: u32) -> Self {
        Dimensions { width, height }
    }

    pub fn is_zero(&self) -> bool {
        self.width == 0 || self.height == 0
    }

    /// True when both sides are at least as large as `other`
    pub fn covers(&self, other: &Dimensions) -> bool {
        self.width >= other.width && self.height >= other.height
    }
}

impl fmt::Display for Dimensions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}x{}", self.width, self.height)
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "snake_case")]
pub struct LogoEvaluation {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub summary_image_url: Option<String>,
    #[serde(default)]
    pub logos: Vec<Logo>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum LogoLabel {
    Simple,
    Complex,
}

impl LogoLabel {
    pub fn as_str(&self) -> &'static str {
        match self {
            LogoLabel::Simple => "Simple",
            LogoLabel::Complex => "Complex",
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub struct Logo {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<LogoLabel>,
    /// Up to three resolved image URLs (`logo_1`..`logo_3`)
    #[serde(default)]
    pub image_urls: Vec<String>,
}

/// Text role of a measured font sample
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum FontKind {
    Heading,
    PlainText,
    Caption,
    Other(String),
}

impl FontKind {
    pub fn as_str(&self) -> &str {
        match self {
            FontKind::Heading => "heading",
            FontKind::PlainText => "plain_text",
            FontKind::Caption => "caption",
            FontKind::Other(s) => s,
        }
    }

    pub fn is_heading(&self) -> bool {
        matches!(self, FontKind::Heading)
    }
}

impl From<String> for FontKind {
    fn from(s: String) -> Self {
        match s.trim().to_ascii_lowercase().as_str() {
            "heading" => FontKind::Heading,
            "plain_text" => FontKind::PlainText,
            "caption" => FontKind::Caption,
            _ => FontKind::Other(s),
        }
    }
}

impl From<FontKind> for String {
    fn from(kind: FontKind) -> Self {
        kind.as_str().to_string()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "snake_case")]
pub struct FontEntry {
    pub font_size: f64,
    #[serde(rename = "type")]
    pub kind: FontKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
}
