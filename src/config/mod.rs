//! Configuration module for replet
//!
//! This module handles:
//! - Package-level configuration (replet.toml)
//! - Scoring strategy and compliance threshold
//! - Classifier table extensions
//! - CLI defaults

mod project_config;

pub use project_config::{
    load_project_config, ClassifierConfig, CliDefaults, IntegrityConfig, ProjectConfig,
    ScoringConfig, CONFIG_FILE_NAMES,
};
