//! Configuration file support for photo-id.
//!
//! Supports TOML configuration from:
//! - XDG config: `~/.config/photo-id/config.toml` (lowest priority)
//! - Project-local: `.photo-id.toml` (searched up directory tree)
//! - CLI flags (highest priority, applied separately)

use std::path::{Path, PathBuf};

use photo_id_core::standard_by_id;
use serde::Deserialize;
use tracing::{debug, info};

/// Name of the project-local config file.
const PROJECT_FILE: &str = ".photo-id.toml";

/// Top-level configuration structure.
#[derive(Debug, Default, Clone, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// General options.
    pub general: GeneralConfig,
    /// Background scoring settings.
    pub background: BackgroundSection,
    /// Compliance tolerance settings.
    pub compliance: ComplianceSection,
    /// Content moderation settings.
    pub moderation: ModerationSection,
    /// Output formatting settings.
    pub output: OutputConfig,
}

/// General configuration options.
#[derive(Debug, Default, Clone, Deserialize)]
#[serde(default)]
pub struct GeneralConfig {
    /// Recurse into subdirectories by default.
    pub recursive: Option<bool>,
    /// Default photo standard identifier.
    pub standard: Option<String>,
}

/// Background scoring configuration.
#[derive(Debug, Default, Clone, Deserialize)]
#[serde(default)]
pub struct BackgroundSection {
    /// Score (0-100) at or above which no removal is recommended.
    pub accept_threshold: Option<f32>,
}

/// Compliance tolerance configuration.
#[derive(Debug, Default, Clone, Deserialize)]
#[serde(default)]
pub struct ComplianceSection {
    /// Percentage points outside a range that still count as a warning.
    pub range_tolerance: Option<f32>,
    /// Horizontal face offset (percent of width) that warns.
    pub centering_warn: Option<f32>,
    /// Horizontal face offset (percent of width) that fails.
    pub centering_fail: Option<f32>,
}

/// Content moderation configuration.
#[derive(Debug, Default, Clone, Deserialize)]
#[serde(default)]
pub struct ModerationSection {
    /// Enable/disable classifier-backed moderation.
    pub enabled: Option<bool>,
    /// Confidence at which a blocking category blocks (0.0-1.0).
    pub block_threshold: Option<f32>,
    /// Confidence at which a category warns (0.0-1.0).
    pub warn_threshold: Option<f32>,
}

/// Output formatting configuration.
#[derive(Debug, Default, Clone, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    /// Output format: "json" or "jsonl".
    pub format: Option<String>,
    /// Pretty-print JSON output.
    pub pretty: Option<bool>,
    /// Show progress bar.
    pub progress: Option<bool>,
}

impl AppConfig {
    /// Load configuration from XDG and project-local files.
    ///
    /// Missing files are silently ignored. Invalid values are reported as warnings.
    pub fn load() -> Self {
        let mut config = Self::default();

        if let Some(xdg_path) = xdg_config_path() {
            if xdg_path.exists() {
                info!("Loading XDG config: {}", xdg_path.display());
                if let Some(xdg_config) = load_file(&xdg_path) {
                    config = xdg_config;
                }
            } else {
                debug!("XDG config not found: {}", xdg_path.display());
            }
        }

        if let Some(project_path) = find_project_config() {
            info!("Loading project config: {}", project_path.display());
            if let Some(project_config) = load_file(&project_path) {
                config.merge(project_config);
            }
        }

        if let Err(e) = config.validate() {
            eprintln!("warning: {e}");
        }

        config
    }

    /// Validate configuration values are within acceptable ranges.
    fn validate(&self) -> Result<(), String> {
        if let Some(ref id) = self.general.standard {
            if standard_by_id(id).is_none() {
                return Err(format!("general.standard '{id}' is not a known standard"));
            }
        }
        if let Some(t) = self.background.accept_threshold {
            if !(0.0..=100.0).contains(&t) {
                return Err(format!(
                    "background.accept_threshold must be 0-100, got {t}"
                ));
            }
        }
        let percent = |name: &str, v: Option<f32>| match v {
            Some(t) if !(0.0..=50.0).contains(&t) => Err(format!("{name} must be 0-50, got {t}")),
            _ => Ok(()),
        };
        percent("compliance.range_tolerance", self.compliance.range_tolerance)?;
        percent("compliance.centering_warn", self.compliance.centering_warn)?;
        percent("compliance.centering_fail", self.compliance.centering_fail)?;
        let unit = |name: &str, v: Option<f32>| match v {
            Some(t) if !(0.0..=1.0).contains(&t) => {
                Err(format!("{name} must be 0.0-1.0, got {t}"))
            }
            _ => Ok(()),
        };
        unit("moderation.block_threshold", self.moderation.block_threshold)?;
        unit("moderation.warn_threshold", self.moderation.warn_threshold)?;

        if let (Some(warn), Some(fail)) =
            (self.compliance.centering_warn, self.compliance.centering_fail)
        {
            if warn > fail {
                return Err(format!(
                    "compliance.centering_warn ({warn}) must not exceed centering_fail ({fail})"
                ));
            }
        }
        if let (Some(warn), Some(block)) =
            (self.moderation.warn_threshold, self.moderation.block_threshold)
        {
            if warn > block {
                return Err(format!(
                    "moderation.warn_threshold ({warn}) must not exceed block_threshold ({block})"
                ));
            }
        }

        if let Some(ref f) = self.output.format {
            if f != "json" && f != "jsonl" {
                return Err(format!(
                    "output.format must be 'json' or 'jsonl', got '{f}'"
                ));
            }
        }

        Ok(())
    }

    /// Merge another config into this one.
    /// Values from `other` override values in `self` when present.
    fn merge(&mut self, other: Self) {
        self.general.recursive = other.general.recursive.or(self.general.recursive);
        self.general.standard = other
            .general
            .standard
            .or_else(|| self.general.standard.take());

        self.background.accept_threshold = other
            .background
            .accept_threshold
            .or(self.background.accept_threshold);

        self.compliance.range_tolerance = other
            .compliance
            .range_tolerance
            .or(self.compliance.range_tolerance);
        self.compliance.centering_warn = other
            .compliance
            .centering_warn
            .or(self.compliance.centering_warn);
        self.compliance.centering_fail = other
            .compliance
            .centering_fail
            .or(self.compliance.centering_fail);

        self.moderation.enabled = other.moderation.enabled.or(self.moderation.enabled);
        self.moderation.block_threshold = other
            .moderation
            .block_threshold
            .or(self.moderation.block_threshold);
        self.moderation.warn_threshold = other
            .moderation
            .warn_threshold
            .or(self.moderation.warn_threshold);

        self.output.format = other.output.format.or_else(|| self.output.format.take());
        self.output.pretty = other.output.pretty.or(self.output.pretty);
        self.output.progress = other.output.progress.or(self.output.progress);
    }
}

/// Get the XDG config file path.
fn xdg_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("photo-id").join("config.toml"))
}

/// Find project-local config by searching up from current directory.
fn find_project_config() -> Option<PathBuf> {
    let cwd = std::env::current_dir().ok()?;
    find_config_in_parents(&cwd)
}

/// Search for `.photo-id.toml` in the given directory and its parents.
fn find_config_in_parents(start: &Path) -> Option<PathBuf> {
    let mut current = Some(start);

    while let Some(dir) = current {
        let config_path = dir.join(PROJECT_FILE);
        if config_path.exists() {
            return Some(config_path);
        }
        current = dir.parent();
    }

    None
}

/// Load and parse a TOML config file.
fn load_file(path: &Path) -> Option<AppConfig> {
    let content = match std::fs::read_to_string(path) {
        Ok(c) => c,
        Err(e) => {
            tracing::warn!("Failed to read config file {}: {}", path.display(), e);
            return None;
        }
    };

    match toml::from_str(&content) {
        Ok(config) => Some(config),
        Err(e) => {
            tracing::warn!("Failed to parse config file {}: {}", path.display(), e);
            None
        }
    }
}

#[cfg(test)]
#[allow(clippy::expect_used, clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = AppConfig::default();
        assert!(config.general.standard.is_none());
        assert!(config.background.accept_threshold.is_none());
        assert!(config.moderation.enabled.is_none());
    }

    #[test]
    fn test_parse_full_config() {
        let toml = r"
[general]
recursive = true
standard = 'uk-passport'

[background]
accept_threshold = 80.0

[compliance]
range_tolerance = 3.0
centering_warn = 4.0
centering_fail = 10.0

[moderation]
enabled = false
block_threshold = 0.8
warn_threshold = 0.5

[output]
format = 'json'
pretty = true
progress = false
";
        let config: AppConfig = toml::from_str(toml).expect("parse full config");

        assert_eq!(config.general.recursive, Some(true));
        assert_eq!(config.general.standard.as_deref(), Some("uk-passport"));
        assert_eq!(config.background.accept_threshold, Some(80.0));
        assert_eq!(config.compliance.range_tolerance, Some(3.0));
        assert_eq!(config.compliance.centering_fail, Some(10.0));
        assert_eq!(config.moderation.enabled, Some(false));
        assert_eq!(config.moderation.warn_threshold, Some(0.5));
        assert_eq!(config.output.format, Some("json".to_string()));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_merge_preserves_base_when_override_is_none() {
        let mut base: AppConfig = toml::from_str(
            r"
[general]
standard = 'ca-passport'

[compliance]
range_tolerance = 2.0
centering_warn = 5.0
",
        )
        .expect("parse base");

        let override_config: AppConfig = toml::from_str(
            r"
[compliance]
range_tolerance = 4.0

[moderation]
block_threshold = 0.9
",
        )
        .expect("parse override");

        base.merge(override_config);

        assert_eq!(base.compliance.range_tolerance, Some(4.0));
        assert_eq!(base.compliance.centering_warn, Some(5.0));
        assert_eq!(base.general.standard.as_deref(), Some("ca-passport"));
        assert_eq!(base.moderation.block_threshold, Some(0.9));
    }

    #[test]
    fn test_merge_all_sections() {
        let mut base: AppConfig = toml::from_str(
            r"
[general]
recursive = false
standard = 'us-passport'

[moderation]
enabled = true

[output]
format = 'json'
",
        )
        .expect("parse base");

        let override_config: AppConfig = toml::from_str(
            r"
[general]
recursive = true
standard = 'jp-passport'

[moderation]
enabled = false

[output]
format = 'jsonl'
",
        )
        .expect("parse override");

        base.merge(override_config);

        assert_eq!(base.general.recursive, Some(true));
        assert_eq!(base.general.standard.as_deref(), Some("jp-passport"));
        assert_eq!(base.moderation.enabled, Some(false));
        assert_eq!(base.output.format, Some("jsonl".to_string()));
    }

    #[test]
    fn test_merge_empty_override_preserves_base() {
        let mut base: AppConfig = toml::from_str(
            r"
[background]
accept_threshold = 75.0
",
        )
        .expect("parse base");

        base.merge(AppConfig::default());

        assert_eq!(base.background.accept_threshold, Some(75.0));
    }

    #[test]
    fn test_invalid_field_type_handled() {
        let toml = r#"
[moderation]
block_threshold = "high"
"#;
        let result: Result<AppConfig, _> = toml::from_str(toml);
        assert!(result.is_err(), "type mismatch should return error");
    }

    #[test]
    fn test_validate_unknown_standard() {
        let mut config = AppConfig::default();
        config.general.standard = Some("atlantis-passport".to_string());

        let err = config.validate().unwrap_err();
        assert!(err.contains("general.standard"));
    }

    #[test]
    fn test_validate_threshold_ranges() {
        let mut config = AppConfig::default();
        config.background.accept_threshold = Some(120.0);
        assert!(config
            .validate()
            .unwrap_err()
            .contains("background.accept_threshold"));

        let mut config = AppConfig::default();
        config.moderation.block_threshold = Some(1.5);
        assert!(config
            .validate()
            .unwrap_err()
            .contains("moderation.block_threshold"));

        let mut config = AppConfig::default();
        config.compliance.centering_warn = Some(-1.0);
        assert!(config
            .validate()
            .unwrap_err()
            .contains("compliance.centering_warn"));
    }

    #[test]
    fn test_validate_centering_is_percent() {
        let mut config = AppConfig::default();
        config.compliance.centering_warn = Some(5.0);
        config.compliance.centering_fail = Some(10.0);
        assert!(config.validate().is_ok());

        config.compliance.centering_fail = Some(60.0);
        assert!(config
            .validate()
            .unwrap_err()
            .contains("compliance.centering_fail must be 0-50"));
    }

    #[test]
    fn test_validate_ordering_of_tiers() {
        let mut config = AppConfig::default();
        config.moderation.warn_threshold = Some(0.9);
        config.moderation.block_threshold = Some(0.5);
        assert!(config.validate().unwrap_err().contains("warn_threshold"));

        let mut config = AppConfig::default();
        config.compliance.centering_warn = Some(20.0);
        config.compliance.centering_fail = Some(10.0);
        assert!(config.validate().unwrap_err().contains("centering_warn"));
    }

    #[test]
    fn test_validate_output_format_invalid() {
        let mut config = AppConfig::default();
        config.output.format = Some("xml".to_string());

        assert!(config.validate().unwrap_err().contains("output.format"));
    }

    #[test]
    fn test_find_config_in_parents() {
        let dir = tempfile::tempdir().expect("tempdir");
        let nested = dir.path().join("a").join("b");
        std::fs::create_dir_all(&nested).expect("mkdir");
        std::fs::write(dir.path().join(PROJECT_FILE), "").expect("write");

        let found = find_config_in_parents(&nested).expect("config found");
        assert_eq!(found, dir.path().join(PROJECT_FILE));
    }
}
