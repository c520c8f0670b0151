//! Configuration file support for Posterlens
//!
//! Loads grading policies and the asset base URL from JSON files.
//!
//! Search order:
//! 1. Explicit path (--config CLI flag)
//! 2. `.posterlensrc.json` in the working directory
//! 3. `posterlens.config.json` in the working directory
//! 4. `"posterlens"` key in `package.json`
//!
//! All fields are optional. CLI flags take precedence over config file values.

use crate::policy::{FontPolicy, GradeBands, Policies, ResolutionPolicy};
use crate::snapshot::Dimensions;
use anyhow::{Context, Result};
use serde::{Deserialize, Deserializer, Serialize};
use std::path::{Path, PathBuf};

/// Base URL of the evaluation service when none is configured
pub const DEFAULT_BASE_URL: &str = "http://localhost:8000";

/// Posterlens configuration loaded from a JSON config file
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PosterlensConfig {
    /// Base URL joined with relative asset paths (default: http://localhost:8000)
    #[serde(default)]
    pub base_url: Option<String>,

    /// Font size policy
    #[serde(default)]
    pub font: Option<FontConfig>,

    /// Image resolution policy
    #[serde(default)]
    pub resolution: Option<ResolutionConfig>,

    /// Custom grade bands per metric family
    #[serde(default)]
    pub grades: Option<GradesConfig>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FontPolicyKind {
    SingleThreshold,
    TypeAware,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResolutionPolicyKind {
    Dpi,
    Dimensions,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FontConfig {
    /// Which font policy to apply (default: single_threshold)
    pub policy: Option<FontPolicyKind>,
    /// Minimum size for every role under single_threshold (default: 14)
    pub min_size: Option<f64>,
    /// Heading minimum under type_aware (default: 16)
    pub heading_min: Option<f64>,
    /// Body minimum under type_aware (default: 12)
    pub body_min: Option<f64>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ResolutionConfig {
    /// Which resolution policy to apply (default: dpi)
    pub policy: Option<ResolutionPolicyKind>,
    /// Minimum print density (default: 300)
    pub min_dpi: Option<f64>,
    /// Minimum pixel dimensions (default: 800x600)
    pub min_width: Option<u32>,
    pub min_height: Option<u32>,
    /// HD pixel dimensions (default: 1920x1080)
    pub hd_width: Option<u32>,
    pub hd_height: Option<u32>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct GradesConfig {
    pub contrast: Option<BandConfig>,
    pub font: Option<BandConfig>,
    pub logo: Option<BandConfig>,
    /// Bands for validated hyperlink lists
    pub hyperlinks: Option<BandConfig>,
    /// Bands for table and diagram captions
    pub captions: Option<BandConfig>,
}

/// Percentage cut-offs; unset values keep the family's default
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct BandConfig {
    pub success: Option<u8>,
    /// Absent keeps the default tier; `null` removes it
    #[serde(
        default,
        deserialize_with = "explicit_null",
        skip_serializing_if = "Option::is_none"
    )]
    pub warning: Option<Option<u8>>,
}

impl BandConfig {
    fn apply(&self, defaults: GradeBands) -> GradeBands {
        GradeBands {
            success: self.success.unwrap_or(defaults.success),
            warning: self.warning.unwrap_or(defaults.warning),
        }
    }
}

fn explicit_null<'de, D>(deserializer: D) -> std::result::Result<Option<Option<u8>>, D::Error>
where
    D: Deserializer<'de>,
{
    Option::<u8>::deserialize(deserializer).map(Some)
}

/// Command-line values that take precedence over the config file
#[derive(Debug, Clone, Default)]
pub struct Overrides {
    pub base_url: Option<String>,
    pub font_policy: Option<FontPolicyKind>,
    pub resolution_policy: Option<ResolutionPolicyKind>,
}

/// Resolved configuration ready for use
#[derive(Debug, Clone)]
pub struct ResolvedConfig {
    pub base_url: String,
    pub policies: Policies,
    /// Path the config was loaded from (None if defaults)
    pub config_path: Option<PathBuf>,
}

impl PosterlensConfig {
    /// Validate the configuration for logical errors
    pub fn validate(&self) -> Result<()> {
        if let Some(ref url) = self.base_url {
            let trimmed = url.trim();
            if !(trimmed.starts_with("http://") || trimmed.starts_with("https://")) {
                anyhow::bail!("base_url must start with http:// or https:// (got {:?})", url);
            }
        }

        if let Some(ref font) = self.font {
            for (name, val) in [
                ("min_size", font.min_size),
                ("heading_min", font.heading_min),
                ("body_min", font.body_min),
            ] {
                if let Some(v) = val {
                    if !v.is_finite() || v <= 0.0 {
                        anyhow::bail!("font.{} must be positive (got {})", name, v);
                    }
                }
            }
        }

        if let Some(ref res) = self.resolution {
            if let Some(dpi) = res.min_dpi {
                if !dpi.is_finite() || dpi <= 0.0 {
                    anyhow::bail!("resolution.min_dpi must be positive (got {})", dpi);
                }
            }
            let (minimum, hd) = res.dimensions();
            if minimum.is_zero() {
                anyhow::bail!("resolution minimum dimensions must be non-zero (got {})", minimum);
            }
            if !hd.covers(&minimum) {
                anyhow::bail!(
                    "resolution minimum ({}) must not exceed the HD dimensions ({})",
                    minimum,
                    hd
                );
            }
        }

        if let Some(ref grades) = self.grades {
            let policies = Policies::default();
            for (name, bands, defaults) in [
                ("contrast", &grades.contrast, policies.contrast),
                ("font", &grades.font, policies.font_grades),
                ("logo", &grades.logo, policies.logo),
                ("hyperlinks", &grades.hyperlinks, policies.hyperlink_list),
                ("captions", &grades.captions, policies.captions),
            ] {
                if let Some(b) = bands {
                    validate_bands(name, &b.apply(defaults))?;
                }
            }
        }

        Ok(())
    }

    /// Resolve config into policies ready for use
    pub fn resolve(&self) -> Result<ResolvedConfig> {
        self.resolve_with(&Overrides::default())
    }

    /// Resolve config with command-line overrides applied first
    pub fn resolve_with(&self, overrides: &Overrides) -> Result<ResolvedConfig> {
        let mut merged = self.clone();
        if let Some(ref url) = overrides.base_url {
            merged.base_url = Some(url.clone());
        }
        if let Some(kind) = overrides.font_policy {
            merged.font.get_or_insert_with(FontConfig::default).policy = Some(kind);
        }
        if let Some(kind) = overrides.resolution_policy {
            merged
                .resolution
                .get_or_insert_with(ResolutionConfig::default)
                .policy = Some(kind);
        }
        merged.validate()?;

        let base_url = merged
            .base_url
            .as_deref()
            .map(str::trim)
            .unwrap_or(DEFAULT_BASE_URL)
            .to_string();

        let font = merged.font.unwrap_or_default();
        let font_policy = match font.policy.unwrap_or(FontPolicyKind::SingleThreshold) {
            FontPolicyKind::SingleThreshold => FontPolicy::SingleThreshold {
                min_size: font.min_size.unwrap_or(FontPolicy::DEFAULT_MIN_SIZE),
            },
            FontPolicyKind::TypeAware => FontPolicy::TypeAware {
                heading_min: font.heading_min.unwrap_or(FontPolicy::DEFAULT_HEADING_MIN),
                body_min: font.body_min.unwrap_or(FontPolicy::DEFAULT_BODY_MIN),
            },
        };

        let resolution = merged.resolution.unwrap_or_default();
        let resolution_policy = match resolution.policy.unwrap_or(ResolutionPolicyKind::Dpi) {
            ResolutionPolicyKind::Dpi => ResolutionPolicy::Dpi {
                min_dpi: resolution
                    .min_dpi
                    .unwrap_or(ResolutionPolicy::DEFAULT_MIN_DPI),
            },
            ResolutionPolicyKind::Dimensions => {
                let (minimum, hd) = resolution.dimensions();
                ResolutionPolicy::Dimensions { minimum, hd }
            }
        };

        let defaults = Policies::default();
        let grades = merged.grades.unwrap_or_default();
        let band = |config: &Option<BandConfig>, fallback: GradeBands| match config {
            Some(c) => c.apply(fallback),
            None => fallback,
        };

        let policies = Policies {
            contrast: band(&grades.contrast, defaults.contrast),
            font: font_policy,
            font_grades: band(&grades.font, defaults.font_grades),
            logo: band(&grades.logo, defaults.logo),
            resolution: resolution_policy,
            hyperlink_list: band(&grades.hyperlinks, defaults.hyperlink_list),
            captions: band(&grades.captions, defaults.captions),
        };

        Ok(ResolvedConfig {
            base_url,
            policies,
            config_path: None,
        })
    }
}

impl ResolutionConfig {
    /// Minimum and HD dimensions with defaults filled in
    fn dimensions(&self) -> (Dimensions, Dimensions) {
        let min = ResolutionPolicy::DEFAULT_MINIMUM;
        let hd = ResolutionPolicy::DEFAULT_HD;
        (
            Dimensions::new(
                self.min_width.unwrap_or(min.width),
                self.min_height.unwrap_or(min.height),
            ),
            Dimensions::new(
                self.hd_width.unwrap_or(hd.width),
                self.hd_height.unwrap_or(hd.height),
            ),
        )
    }
}

fn validate_bands(name: &str, bands: &GradeBands) -> Result<()> {
    if bands.success > 100 {
        anyhow::bail!(
            "grades.{}.success must be at most 100 (got {})",
            name,
            bands.success
        );
    }
    if let Some(warning) = bands.warning {
        if warning >= bands.success {
            anyhow::bail!(
                "grades.{}.warning ({}) must be less than grades.{}.success ({})",
                name,
                warning,
                name,
                bands.success
            );
        }
    }
    Ok(())
}

/// Discover and load a config file from a directory
///
/// Search order:
/// 1. `.posterlensrc.json`
/// 2. `posterlens.config.json`
/// 3. `"posterlens"` key in `package.json`
///
/// Returns `None` if no config file is found (use defaults).
pub fn discover_config(root: &Path) -> Result<Option<(PosterlensConfig, PathBuf)>> {
    let rc_path = root.join(".posterlensrc.json");
    if rc_path.exists() {
        let config = load_config_file(&rc_path)?;
        return Ok(Some((config, rc_path)));
    }

    let config_path = root.join("posterlens.config.json");
    if config_path.exists() {
        let config = load_config_file(&config_path)?;
        return Ok(Some((config, config_path)));
    }

    let pkg_path = root.join("package.json");
    if pkg_path.exists() {
        if let Some(config) = load_from_package_json(&pkg_path)? {
            return Ok(Some((config, pkg_path)));
        }
    }

    Ok(None)
}

/// Load config from an explicit file path
pub fn load_config_file(path: &Path) -> Result<PosterlensConfig> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read config file: {}", path.display()))?;

    let config: PosterlensConfig = serde_json::from_str(&content)
        .with_context(|| format!("failed to parse config file: {}", path.display()))?;

    config
        .validate()
        .with_context(|| format!("invalid config in: {}", path.display()))?;

    Ok(config)
}

/// Load config from the "posterlens" key in package.json
fn load_from_package_json(path: &Path) -> Result<Option<PosterlensConfig>> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read {}", path.display()))?;

    let pkg: serde_json::Value = serde_json::from_str(&content)
        .with_context(|| format!("failed to parse {}", path.display()))?;

    match pkg.get("posterlens") {
        Some(value) => {
            let config: PosterlensConfig = serde_json::from_value(value.clone())
                .with_context(|| format!("invalid posterlens config in {}", path.display()))?;
            config
                .validate()
                .with_context(|| format!("invalid posterlens config in {}", path.display()))?;
            Ok(Some(config))
        }
        None => Ok(None),
    }
}

/// Load and resolve config
///
/// If `config_path` is provided, loads from that file.
/// Otherwise, discovers config in `root`.
/// Returns default config if nothing is found.
pub fn load_and_resolve(
    root: &Path,
    config_path: Option<&Path>,
    overrides: &Overrides,
) -> Result<ResolvedConfig> {
    let (config, source_path) = if let Some(path) = config_path {
        let config = load_config_file(path)?;
        (config, Some(path.to_path_buf()))
    } else {
        match discover_config(root)? {
            Some((config, path)) => (config, Some(path)),
            None => (PosterlensConfig::default(), None),
        }
    };

    let mut resolved = config.resolve_with(overrides)?;
    resolved.config_path = source_path;
    Ok(resolved)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::policy::{CAPTION_GRADES, FONT_GRADES};
    use std::fs;

    #[test]
    fn test_default_config_is_valid() {
        let config = PosterlensConfig::default();
        config.validate().expect("default config should be valid");
        let resolved = config.resolve().expect("default config should resolve");
        assert_eq!(resolved.base_url, DEFAULT_BASE_URL);
        assert_eq!(resolved.policies, Policies::default());
        assert!(resolved.config_path.is_none());
    }

    #[test]
    fn test_parse_minimal_config() {
        let config: PosterlensConfig = serde_json::from_str("{}").unwrap();
        config.validate().unwrap();
    }

    #[test]
    fn test_parse_full_config() {
        let json = r#"{
            "base_url": "https://eval.example.org",
            "font": {"policy": "type_aware", "heading_min": 18, "body_min": 11},
            "resolution": {
                "policy": "dimensions",
                "min_width": 1024,
                "min_height": 768,
                "hd_width": 3840,
                "hd_height": 2160
            },
            "grades": {
                "contrast": {"success": 80, "warning": 60},
                "hyperlinks": {"success": 95}
            }
        }"#;
        let config: PosterlensConfig = serde_json::from_str(json).unwrap();
        config.validate().unwrap();
        let resolved = config.resolve().unwrap();
        assert_eq!(resolved.base_url, "https://eval.example.org");
        assert_eq!(
            resolved.policies.font,
            FontPolicy::TypeAware {
                heading_min: 18.0,
                body_min: 11.0
            }
        );
        assert_eq!(
            resolved.policies.resolution,
            ResolutionPolicy::Dimensions {
                minimum: Dimensions::new(1024, 768),
                hd: Dimensions::new(3840, 2160)
            }
        );
        assert_eq!(resolved.policies.contrast, GradeBands::new(80, Some(60)));
        assert_eq!(resolved.policies.hyperlink_list, GradeBands::new(95, None));
        assert_eq!(resolved.policies.captions, CAPTION_GRADES);
    }

    #[test]
    fn test_reject_unknown_fields() {
        let result: Result<PosterlensConfig, _> = serde_json::from_str(r#"{"unknown_field": true}"#);
        assert!(result.is_err(), "unknown fields should be rejected");

        let nested: Result<PosterlensConfig, _> =
            serde_json::from_str(r#"{"font": {"minimum": 12}}"#);
        assert!(nested.is_err(), "unknown nested fields should be rejected");
    }

    #[test]
    fn test_reject_unknown_policy() {
        let result: Result<PosterlensConfig, _> =
            serde_json::from_str(r#"{"font": {"policy": "strict"}}"#);
        assert!(result.is_err());
    }

    #[test]
    fn test_reject_bad_base_url() {
        let config: PosterlensConfig =
            serde_json::from_str(r#"{"base_url": "ftp://files.example.org"}"#).unwrap();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_reject_non_positive_font_size() {
        let config: PosterlensConfig =
            serde_json::from_str(r#"{"font": {"min_size": 0}}"#).unwrap();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_reject_negative_dpi() {
        let config: PosterlensConfig =
            serde_json::from_str(r#"{"resolution": {"min_dpi": -72}}"#).unwrap();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_reject_minimum_above_hd() {
        let config: PosterlensConfig =
            serde_json::from_str(r#"{"resolution": {"min_width": 2000}}"#).unwrap();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_reject_unordered_bands() {
        let config: PosterlensConfig =
            serde_json::from_str(r#"{"grades": {"logo": {"success": 60, "warning": 60}}}"#)
                .unwrap();
        assert!(config.validate().is_err());

        // warning inherited from the default (50) must still sit below success
        let config: PosterlensConfig =
            serde_json::from_str(r#"{"grades": {"contrast": {"success": 40}}}"#).unwrap();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_null_warning_removes_inherited_tier() {
        let config: PosterlensConfig = serde_json::from_str(
            r#"{"grades": {"contrast": {"success": 40, "warning": null}, "font": {"success": 80}}}"#,
        )
        .unwrap();
        config.validate().unwrap();
        let resolved = config.resolve().unwrap();
        assert_eq!(resolved.policies.contrast, GradeBands::new(40, None));
        assert_eq!(resolved.policies.font_grades.warning, FONT_GRADES.warning);
    }

    #[test]
    fn test_reject_band_over_100() {
        let config: PosterlensConfig =
            serde_json::from_str(r#"{"grades": {"font": {"success": 101}}}"#).unwrap();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_partial_font_config_uses_defaults() {
        let config: PosterlensConfig =
            serde_json::from_str(r#"{"font": {"policy": "type_aware", "body_min": 10}}"#).unwrap();
        let resolved = config.resolve().unwrap();
        assert_eq!(
            resolved.policies.font,
            FontPolicy::TypeAware {
                heading_min: 16.0,
                body_min: 10.0
            }
        );
    }

    #[test]
    fn test_overrides_take_precedence() {
        let config: PosterlensConfig = serde_json::from_str(
            r#"{"base_url": "https://a.example", "font": {"min_size": 20}}"#,
        )
        .unwrap();
        let overrides = Overrides {
            base_url: Some("https://b.example".to_string()),
            font_policy: Some(FontPolicyKind::TypeAware),
            resolution_policy: Some(ResolutionPolicyKind::Dimensions),
        };
        let resolved = config.resolve_with(&overrides).unwrap();
        assert_eq!(resolved.base_url, "https://b.example");
        assert_eq!(resolved.policies.font, FontPolicy::type_aware());
        assert_eq!(resolved.policies.resolution, ResolutionPolicy::dimensions());
    }

    #[test]
    fn test_override_base_url_is_validated() {
        let overrides = Overrides {
            base_url: Some("localhost:8000".to_string()),
            ..Overrides::default()
        };
        assert!(PosterlensConfig::default().resolve_with(&overrides).is_err());
    }

    #[test]
    fn test_discover_posterlensrc() {
        let dir = tempfile::tempdir().unwrap();
        let config_path = dir.path().join(".posterlensrc.json");
        fs::write(&config_path, r#"{"base_url": "https://rc.example"}"#).unwrap();

        let result = discover_config(dir.path()).unwrap();
        assert!(result.is_some());
        let (config, path) = result.unwrap();
        assert_eq!(config.base_url.as_deref(), Some("https://rc.example"));
        assert_eq!(path, config_path);
    }

    #[test]
    fn test_discover_posterlens_config_json() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(
            dir.path().join("posterlens.config.json"),
            r#"{"resolution": {"min_dpi": 150}}"#,
        )
        .unwrap();

        let (config, _) = discover_config(dir.path()).unwrap().unwrap();
        assert_eq!(config.resolution.unwrap().min_dpi, Some(150.0));
    }

    #[test]
    fn test_discover_package_json() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(
            dir.path().join("package.json"),
            r#"{
            "name": "poster-site",
            "version": "1.0.0",
            "posterlens": {
                "font": {"policy": "type_aware"}
            }
        }"#,
        )
        .unwrap();

        let (config, _) = discover_config(dir.path()).unwrap().unwrap();
        assert_eq!(
            config.font.unwrap().policy,
            Some(FontPolicyKind::TypeAware)
        );
    }

    #[test]
    fn test_discover_package_json_without_posterlens_key() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(
            dir.path().join("package.json"),
            r#"{"name": "poster-site", "version": "1.0.0"}"#,
        )
        .unwrap();

        assert!(discover_config(dir.path()).unwrap().is_none());
    }

    #[test]
    fn test_discover_priority_order() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(
            dir.path().join(".posterlensrc.json"),
            r#"{"base_url": "https://first.example"}"#,
        )
        .unwrap();
        fs::write(
            dir.path().join("posterlens.config.json"),
            r#"{"base_url": "https://second.example"}"#,
        )
        .unwrap();

        let (config, _) = discover_config(dir.path()).unwrap().unwrap();
        assert_eq!(
            config.base_url.as_deref(),
            Some("https://first.example"),
            ".posterlensrc.json should take priority"
        );
    }

    #[test]
    fn test_invalid_discovered_config_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(
            dir.path().join(".posterlensrc.json"),
            r#"{"grades": {"captions": {"success": 30, "warning": 50}}}"#,
        )
        .unwrap();
        assert!(discover_config(dir.path()).is_err());
    }

    #[test]
    fn test_load_and_resolve_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let resolved = load_and_resolve(dir.path(), None, &Overrides::default()).unwrap();
        assert!(resolved.config_path.is_none());
        assert_eq!(resolved.base_url, DEFAULT_BASE_URL);
    }

    #[test]
    fn test_load_and_resolve_explicit_path() {
        let dir = tempfile::tempdir().unwrap();
        let config_path = dir.path().join("custom.json");
        fs::write(&config_path, r#"{"font": {"min_size": 18}}"#).unwrap();

        let resolved =
            load_and_resolve(dir.path(), Some(&config_path), &Overrides::default()).unwrap();
        assert_eq!(
            resolved.policies.font,
            FontPolicy::SingleThreshold { min_size: 18.0 }
        );
        assert_eq!(resolved.config_path, Some(config_path));
    }
}
