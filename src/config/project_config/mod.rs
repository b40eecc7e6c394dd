//! Package-level configuration support
//!
//! Loads per-package configuration from `replet.toml` or `.repletrc.json`
//! in the package root.
//!
//! # Configuration Format
//!
//! ```toml
//! # replet.toml
//!
//! [scoring]
//! strategy = "authenticity"
//! complete_threshold = 0.8
//!
//! [classifier]
//! placeholder_text = ["Lorem ipsum"]
//! tracker_brands = ["sr research"]
//! archive_hosts = ["figshare.com"]
//!
//! [integrity]
//! aoi_exempt_stimuli = ["S00_practice"]
//!
//! [defaults]
//! format = "markdown"
//! fail_under = 0.5
//! ```

use crate::models::ScoringStrategy;
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::{debug, warn};

/// File names searched in the package root, in priority order
pub const CONFIG_FILE_NAMES: &[&str] = &["replet.toml", ".repletrc.json"];

/// Package-level configuration loaded from replet.toml or .repletrc.json
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct ProjectConfig {
    /// Scoring configuration
    #[serde(default)]
    pub scoring: ScoringConfig,

    /// Extra entries for the authenticity classifier tables
    #[serde(default)]
    pub classifier: ClassifierConfig,

    /// Integrity checker options
    #[serde(default)]
    pub integrity: IntegrityConfig,

    /// Default CLI flags
    #[serde(default)]
    pub defaults: CliDefaults,
}

/// Scoring strategy and compliance threshold
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ScoringConfig {
    /// Which scorer to run (default: presence)
    #[serde(default)]
    pub strategy: ScoringStrategy,

    /// A category counts as compliant above this score (default: 0.8)
    #[serde(default = "default_complete_threshold")]
    pub complete_threshold: f64,
}

impl Default for ScoringConfig {
    fn default() -> Self {
        Self {
            strategy: ScoringStrategy::default(),
            complete_threshold: default_complete_threshold(),
        }
    }
}

fn default_complete_threshold() -> f64 {
    0.8
}

impl ScoringConfig {
    /// Threshold clipped into [0, 1]; non-finite values fall back to the default
    pub fn effective_threshold(&self) -> f64 {
        if self.complete_threshold.is_finite() {
            self.complete_threshold.clamp(0.0, 1.0)
        } else {
            default_complete_threshold()
        }
    }
}

/// Additional classifier table entries. Appended to the built-in lists.
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct ClassifierConfig {
    /// Free-text fragments that mark a value as template content
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub placeholder_text: Vec<String>,

    /// Identifiers that mark a participant as a scaffold entry
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub placeholder_ids: Vec<String>,

    /// Eye-tracker manufacturers recognised as real hardware
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tracker_brands: Vec<String>,

    /// Monitor manufacturers recognised as real hardware
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub monitor_brands: Vec<String>,

    /// Hosts that count as a public archive for reproducibility materials
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub archive_hosts: Vec<String>,

    /// Method-name keywords that mark an analysis as advanced
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub analysis_keywords: Vec<String>,
}

/// Integrity checker options
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct IntegrityConfig {
    /// Stimuli allowed to have no AOI definitions
    #[serde(default)]
    pub aoi_exempt_stimuli: Vec<String>,
}

impl IntegrityConfig {
    /// Whether a stimulus may have no AOI definitions
    pub fn is_aoi_exempt(&self, stimulus_id: &str) -> bool {
        self.aoi_exempt_stimuli.iter().any(|s| s == stimulus_id)
    }
}

/// Default CLI flags that can be set in package config
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct CliDefaults {
    /// Default output format (text, json, markdown, svg)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub format: Option<String>,

    /// Default report directory for `assess`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub out_dir: Option<String>,

    /// Fail `assess` when the overall score is below this value
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fail_under: Option<f64>,
}

/// Load package configuration from the package root.
///
/// Searches for configuration files in this order:
/// 1. `replet.toml`
/// 2. `.repletrc.json`
///
/// A file that fails to parse is logged and skipped. Returns defaults when
/// nothing usable is found.
pub fn load_project_config(package_root: &Path) -> ProjectConfig {
    // Try TOML first (preferred format)
    let toml_path = package_root.join("replet.toml");
    if toml_path.exists() {
        match load_toml_config(&toml_path) {
            Ok(config) => {
                debug!("Loaded package config from {}", toml_path.display());
                return config;
            }
            Err(e) => {
                warn!("Failed to load {}: {}", toml_path.display(), e);
            }
        }
    }

    // Try JSON
    let json_path = package_root.join(".repletrc.json");
    if json_path.exists() {
        match load_json_config(&json_path) {
            Ok(config) => {
                debug!("Loaded package config from {}", json_path.display());
                return config;
            }
            Err(e) => {
                warn!("Failed to load {}: {}", json_path.display(), e);
            }
        }
    }

    debug!("No package config found, using defaults");
    ProjectConfig::default()
}

/// Load configuration from a TOML file
fn load_toml_config(path: &Path) -> anyhow::Result<ProjectConfig> {
    let content = std::fs::read_to_string(path)?;
    let config: ProjectConfig = toml::from_str(&content)?;
    Ok(config)
}

/// Load configuration from a JSON file
fn load_json_config(path: &Path) -> anyhow::Result<ProjectConfig> {
    let content = std::fs::read_to_string(path)?;
    let config: ProjectConfig = serde_json::from_str(&content)?;
    Ok(config)
}

impl ProjectConfig {
    /// Strategy to use, preferring an explicit CLI override
    pub fn strategy(&self, cli_override: Option<ScoringStrategy>) -> ScoringStrategy {
        cli_override.unwrap_or(self.scoring.strategy)
    }

    pub fn complete_threshold(&self) -> f64 {
        self.scoring.effective_threshold()
    }

    /// Render the effective configuration as TOML
    pub fn to_toml(&self) -> anyhow::Result<String> {
        Ok(toml::to_string_pretty(self)?)
    }
}
