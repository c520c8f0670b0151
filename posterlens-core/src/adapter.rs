//! Raw result adapter
//!
//! Converts the evaluation service's loosely-typed JSON into an [`AnalysisSnapshot`].
//!
//! Global invariants enforced:
//! - Only a non-object top-level payload is an error
//! - Absent, null or mistyped fields fall back to documented defaults
//! - Relative asset paths are joined with the base URL; nothing else rewrites URLs

use crate::error::{EngineError, EngineResult};
use crate::snapshot::{
    Accessibility, AnalysisSnapshot, Author, Caption, ColorContrast, ContrastSection, FontEntry,
    FontKind, HyperlinksShape, ImageResolution, LinkEntry, LinkMetadata, Logo, LogoEvaluation,
    LogoLabel, Rgb,
};
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use tracing::debug;

/// WCAG minimum for normal-size text
pub const DEFAULT_NORMAL_TEXT_THRESHOLD: f64 = 4.5;

/// WCAG minimum for large text
pub const DEFAULT_LARGE_TEXT_THRESHOLD: f64 = 3.0;

/// Maximum number of image variants kept per logo (`logo_1`..`logo_3`)
const MAX_LOGO_IMAGES: usize = 3;

/// Parse payload text and adapt it
///
/// JSON syntax errors are reported as `MalformedResponse` as well.
pub fn parse_payload(text: &str, base_url: &str) -> EngineResult<AnalysisSnapshot> {
    let raw: Value = serde_json::from_str(text)
        .map_err(|e| EngineError::malformed(format!("unparseable JSON ({})", e)))?;
    adapt(&raw, base_url)
}

/// Adapt a raw evaluation payload into a snapshot
pub fn adapt(raw: &Value, base_url: &str) -> EngineResult<AnalysisSnapshot> {
    let root = raw
        .as_object()
        .ok_or_else(|| EngineError::malformed(value_kind(raw)))?;

    let snapshot = AnalysisSnapshot {
        authors: adapt_authors(root.get("authors")),
        captions: adapt_captions(root.get("captions"), base_url),
        color_contrast: adapt_color_contrast(root.get("color_contrast"), base_url),
        hyperlinks: adapt_hyperlinks(root.get("hyperlinks")),
        image_resolution: adapt_image_resolution(root.get("image_resolution")),
        logo_evaluation: adapt_logo_evaluation(root.get("logo_evaluation"), base_url),
        poster_layout_image_url: resolve_asset_url(base_url, root.get("poster_layout")),
        font_sizes: adapt_font_sizes(root.get("font_sizes"), base_url),
    };

    debug!(
        authors = snapshot.authors.len(),
        captions = snapshot.captions.len(),
        contrast_sections = snapshot.color_contrast.sections.len(),
        logos = snapshot.logo_evaluation.logos.len(),
        fonts = snapshot.font_sizes.len(),
        hyperlinks = snapshot.hyperlinks.len(),
        "adapted evaluation payload"
    );

    Ok(snapshot)
}

/// Resolve a path-like payload value into an absolute URL
///
/// Non-empty strings are joined with `base_url`; values that already carry a scheme
/// are returned unchanged. Anything else (absent, null, empty, non-string) is None.
pub fn resolve_asset_url(base_url: &str, value: Option<&Value>) -> Option<String> {
    let path = value?.as_str()?.trim();
    if path.is_empty() {
        return None;
    }
    if has_scheme(path) {
        return Some(path.to_string());
    }
    Some(format!(
        "{}/{}",
        base_url.trim_end_matches('/'),
        path.trim_start_matches('/')
    ))
}

fn has_scheme(path: &str) -> bool {
    path.starts_with("http://") || path.starts_with("https://") || path.starts_with("data:")
}

fn value_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

/// Number, or a string holding a number
fn lenient_f64(value: Option<&Value>) -> Option<f64> {
    let parsed = match value? {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    };
    parsed.filter(|v| v.is_finite())
}

/// String, or a scalar rendered as one
fn lenient_string(value: Option<&Value>) -> Option<String> {
    match value? {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

fn lenient_bool(value: Option<&Value>) -> Option<bool> {
    match value? {
        Value::Bool(b) => Some(*b),
        Value::String(s) => match s.trim().to_ascii_lowercase().as_str() {
            "true" | "valid" | "yes" => Some(true),
            "false" | "invalid" | "no" => Some(false),
            _ => None,
        },
        Value::Number(n) => n.as_i64().map(|v| v != 0),
        _ => None,
    }
}

fn non_empty_string(value: Option<&Value>) -> Option<String> {
    lenient_string(value)
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
}

/// First key present in `obj` among `keys`
fn first_of<'a>(obj: &'a Map<String, Value>, keys: &[&str]) -> Option<&'a Value> {
    keys.iter()
        .filter_map(|k| obj.get(*k))
        .find(|v| !v.is_null())
}

fn adapt_authors(value: Option<&Value>) -> Vec<Author> {
    let Some(Value::Array(items)) = value else {
        debug!(field = "authors", "missing or not an array, defaulting to empty");
        return Vec::new();
    };

    items
        .iter()
        .filter_map(|item| match item {
            Value::String(name) => Some(Author {
                name: name.trim().to_string(),
                affiliation: None,
                email: None,
            }),
            Value::Object(obj) => Some(Author {
                name: non_empty_string(obj.get("name")).unwrap_or_default(),
                affiliation: non_empty_string(obj.get("affiliation")),
                email: non_empty_string(obj.get("email")),
            }),
            _ => {
                debug!(field = "authors", kind = value_kind(item), "skipping entry");
                None
            }
        })
        .collect()
}

/// Caption text as the service delivered it
///
/// Arrays and objects are rendered as JSON so that empty ones surface as the `[]` and
/// `{}` placeholders the caption normalizer recognises.
fn caption_text(value: Option<&Value>) -> String {
    match value {
        None | Some(Value::Null) => String::new(),
        Some(Value::String(s)) => s.clone(),
        Some(other) => other.to_string(),
    }
}

fn adapt_captions(value: Option<&Value>, base_url: &str) -> BTreeMap<String, Caption> {
    let Some(Value::Object(entries)) = value else {
        debug!(field = "captions", "missing or not an object, defaulting to empty");
        return BTreeMap::new();
    };

    entries
        .iter()
        .map(|(key, entry)| {
            let caption = match entry {
                Value::Object(obj) => Caption {
                    text: caption_text(first_of(obj, &["caption", "text"])),
                    image_url: resolve_asset_url(base_url, first_of(obj, &["img", "image"])),
                },
                other => Caption {
                    text: caption_text(Some(other)),
                    image_url: None,
                },
            };
            (key.clone(), caption)
        })
        .collect()
}

fn adapt_rgb(value: Option<&Value>, fallback: Rgb) -> Rgb {
    let Some(Value::Array(channels)) = value else {
        return fallback;
    };
    if channels.len() < 3 {
        return fallback;
    }
    let mut rgb = [0u8; 3];
    for (slot, channel) in rgb.iter_mut().zip(channels) {
        match lenient_f64(Some(channel)) {
            Some(v) => *slot = v.round().clamp(0.0, 255.0) as u8,
            None => return fallback,
        }
    }
    Rgb(rgb)
}

fn adapt_accessibility(value: Option<&Value>) -> Option<Accessibility> {
    let s = value?.as_str()?;
    match s.trim().to_ascii_uppercase().as_str() {
        "PASS" => Some(Accessibility::Pass),
        "FAIL" => Some(Accessibility::Fail),
        _ => None,
    }
}

fn adapt_contrast_section(
    index: usize,
    obj: &Map<String, Value>,
    base_url: &str,
) -> ContrastSection {
    let text_type = non_empty_string(obj.get("type")).unwrap_or_else(|| "normal".to_string());
    let contrast_ratio = lenient_f64(obj.get("contrast_ratio"))
        .unwrap_or(0.0)
        .max(0.0);
    let threshold = lenient_f64(obj.get("threshold")).unwrap_or_else(|| {
        if text_type.to_ascii_lowercase().contains("large") {
            DEFAULT_LARGE_TEXT_THRESHOLD
        } else {
            DEFAULT_NORMAL_TEXT_THRESHOLD
        }
    });

    let (accessibility, accessibility_derived) = match adapt_accessibility(obj.get("accessibility"))
    {
        Some(verdict) => (verdict, false),
        None => {
            let verdict = if contrast_ratio >= threshold {
                Accessibility::Pass
            } else {
                Accessibility::Fail
            };
            debug!(
                section = index,
                ratio = contrast_ratio,
                threshold,
                "re-deriving missing accessibility verdict"
            );
            (verdict, true)
        }
    };

    ContrastSection {
        section_id: non_empty_string(first_of(obj, &["section_id", "id"]))
            .unwrap_or_else(|| (index + 1).to_string()),
        contrast_ratio,
        accessibility,
        accessibility_derived,
        threshold,
        text_type,
        text_color: adapt_rgb(obj.get("text_color"), Rgb::new(0, 0, 0)),
        background_color: adapt_rgb(obj.get("background_color"), Rgb::new(255, 255, 255)),
        section_image_url: resolve_asset_url(base_url, obj.get("section_image")),
    }
}

fn adapt_color_contrast(value: Option<&Value>, base_url: &str) -> ColorContrast {
    let Some(Value::Object(obj)) = value else {
        debug!(field = "color_contrast", "missing or not an object, defaulting to empty");
        return ColorContrast::default();
    };

    let sections = match obj.get("sections") {
        Some(Value::Array(items)) => items
            .iter()
            .enumerate()
            .filter_map(|(index, item)| match item {
                Value::Object(section) => Some(adapt_contrast_section(index, section, base_url)),
                _ => {
                    debug!(section = index, "skipping non-object contrast section");
                    None
                }
            })
            .collect(),
        _ => Vec::new(),
    };

    ColorContrast {
        summary_image_url: resolve_asset_url(base_url, first_of(obj, &["summary_image", "image"])),
        sections,
    }
}

fn link_attributes(obj: &Map<String, Value>, skip: &[&str]) -> BTreeMap<String, Value> {
    obj.iter()
        .filter(|(k, _)| !skip.contains(&k.as_str()))
        .map(|(k, v)| (k.clone(), v.clone()))
        .collect()
}

fn adapt_hyperlinks(value: Option<&Value>) -> HyperlinksShape {
    match value {
        Some(Value::Object(map)) => HyperlinksShape::Mapping(
            map.iter()
                .map(|(url, meta)| {
                    let metadata = match meta {
                        Value::Object(obj) => LinkMetadata {
                            valid: lenient_bool(obj.get("valid")),
                            attributes: link_attributes(obj, &["valid"]),
                        },
                        other => LinkMetadata {
                            valid: lenient_bool(Some(other)),
                            attributes: BTreeMap::new(),
                        },
                    };
                    (url.clone(), metadata)
                })
                .collect(),
        ),
        Some(Value::Array(items)) => HyperlinksShape::ValidatedList(
            items
                .iter()
                .enumerate()
                .filter_map(|(index, item)| match item {
                    Value::String(url) if !url.trim().is_empty() => Some(LinkEntry {
                        url: url.trim().to_string(),
                        valid: None,
                        attributes: BTreeMap::new(),
                    }),
                    Value::Object(obj) => {
                        let valid = lenient_bool(obj.get("valid"));
                        let url = match non_empty_string(first_of(obj, &["url", "link", "href"])) {
                            Some(url) => url,
                            None if valid.is_some() => format!("link_{}", index + 1),
                            None => {
                                debug!(field = "hyperlinks", entry = index, "skipping empty entry");
                                return None;
                            }
                        };
                        Some(LinkEntry {
                            url,
                            valid,
                            attributes: link_attributes(obj, &["url", "link", "href", "valid"]),
                        })
                    }
                    _ => {
                        debug!(field = "hyperlinks", kind = value_kind(item), "skipping entry");
                        None
                    }
                })
                .collect(),
        ),
        _ => {
            debug!(field = "hyperlinks", "missing, defaulting to empty mapping");
            HyperlinksShape::default()
        }
    }
}

fn adapt_resolution_string(value: Option<&Value>) -> Option<String> {
    match value? {
        Value::String(s) if !s.trim().is_empty() => Some(s.trim().to_string()),
        Value::Array(pair) if pair.len() == 2 => {
            let w = lenient_f64(pair.first())?;
            let h = lenient_f64(pair.get(1))?;
            Some(format!("{}x{}", w.max(0.0) as u64, h.max(0.0) as u64))
        }
        Value::Object(obj) => {
            let w = lenient_f64(obj.get("width"))?;
            let h = lenient_f64(obj.get("height"))?;
            Some(format!("{}x{}", w.max(0.0) as u64, h.max(0.0) as u64))
        }
        _ => None,
    }
}

fn adapt_image_resolution(value: Option<&Value>) -> ImageResolution {
    let Some(Value::Object(obj)) = value else {
        debug!(field = "image_resolution", "missing or not an object, defaulting");
        return ImageResolution::default();
    };

    let defaults = ImageResolution::default();
    ImageResolution {
        dpi: lenient_f64(obj.get("dpi")).unwrap_or(defaults.dpi).max(0.0),
        resolution: adapt_resolution_string(obj.get("resolution")).unwrap_or(defaults.resolution),
        laplacian_variance: lenient_f64(first_of(obj, &["laplacian_variance", "laplacian"])),
        psnr: lenient_f64(obj.get("psnr")),
    }
}

fn adapt_logo_label(value: Option<&Value>) -> Option<LogoLabel> {
    let label = value?.as_str()?;
    match label.trim().to_ascii_lowercase().as_str() {
        "simple" => Some(LogoLabel::Simple),
        "complex" => Some(LogoLabel::Complex),
        other => {
            if !other.is_empty() {
                debug!(label = other, "unrecognised logo label, leaving unset");
            }
            None
        }
    }
}

fn adapt_logo_evaluation(value: Option<&Value>, base_url: &str) -> LogoEvaluation {
    let Some(Value::Object(obj)) = value else {
        debug!(field = "logo_evaluation", "missing or not an object, defaulting to empty");
        return LogoEvaluation::default();
    };

    let logos = match obj.get("logos") {
        Some(Value::Array(items)) => items
            .iter()
            .map(|item| match item {
                Value::Object(logo) => Logo {
                    label: adapt_logo_label(logo.get("label")),
                    image_urls: (1..=MAX_LOGO_IMAGES)
                        .filter_map(|n| {
                            resolve_asset_url(base_url, logo.get(&format!("logo_{}", n)))
                        })
                        .collect(),
                },
                other => Logo {
                    label: adapt_logo_label(Some(other)),
                    image_urls: Vec::new(),
                },
            })
            .collect(),
        _ => Vec::new(),
    };

    LogoEvaluation {
        summary_image_url: resolve_asset_url(base_url, first_of(obj, &["summary_image", "image"])),
        logos,
    }
}

fn adapt_font_sizes(value: Option<&Value>, base_url: &str) -> BTreeMap<String, FontEntry> {
    let Some(Value::Object(entries)) = value else {
        debug!(field = "font_sizes", "missing or not an object, defaulting to empty");
        return BTreeMap::new();
    };

    entries
        .iter()
        .map(|(key, entry)| {
            let font = match entry {
                Value::Object(obj) => FontEntry {
                    font_size: lenient_f64(obj.get("font_size")).unwrap_or(0.0).max(0.0),
                    kind: non_empty_string(obj.get("type"))
                        .map(FontKind::from)
                        .unwrap_or(FontKind::PlainText),
                    image_url: resolve_asset_url(base_url, first_of(obj, &["img", "image"])),
                },
                other => FontEntry {
                    font_size: lenient_f64(Some(other)).unwrap_or(0.0).max(0.0),
                    kind: FontKind::PlainText,
                    image_url: None,
                },
            };
            (key.clone(), font)
        })
        .collect()
}
