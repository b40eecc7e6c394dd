//! Output reporters for replet assessments
//!
//! Supports multiple output formats:
//! - `text` - Terminal output with colors
//! - `json` - Category-to-score map, or the full assessment with `--detailed`
//! - `markdown` - GitHub-flavored Markdown with checklist and score table
//! - `svg` - Radar chart with one axis per category
//!
//! The README patcher in [`readme`] reuses the Markdown sections.

mod json;
mod markdown;
pub mod readme;
pub mod svg;
mod text;

use crate::models::{ComplianceReport, IntegrityViolation};
use crate::scoring::Framework;
use anyhow::{anyhow, Result};
use serde::Serialize;
use std::str::FromStr;

pub use markdown::{render_checklist, render_scores_table, status_icon};

/// Supported output formats
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Text,
    Json,
    Markdown,
    Svg,
}

impl FromStr for OutputFormat {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "text" | "txt" | "terminal" => Ok(OutputFormat::Text),
            "json" => Ok(OutputFormat::Json),
            "markdown" | "md" => Ok(OutputFormat::Markdown),
            "svg" | "radar" => Ok(OutputFormat::Svg),
            _ => Err(anyhow!(
                "Unknown format '{}'. Valid formats: text, json, markdown, svg",
                s
            )),
        }
    }
}

impl std::fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OutputFormat::Text => write!(f, "text"),
            OutputFormat::Json => write!(f, "json"),
            OutputFormat::Markdown => write!(f, "markdown"),
            OutputFormat::Svg => write!(f, "svg"),
        }
    }
}

/// Everything a reporter may show about one package
#[derive(Debug, Clone, Serialize)]
pub struct Assessment {
    /// Package root as given on the command line
    pub package: String,
    #[serde(flatten)]
    pub report: ComplianceReport,
    pub violations: Vec<IntegrityViolation>,
    pub frameworks: Vec<Framework>,
}

impl Assessment {
    pub fn new(package: impl Into<String>, report: ComplianceReport) -> Self {
        Self {
            package: package.into(),
            report,
            violations: Vec::new(),
            frameworks: Vec::new(),
        }
    }

    pub fn with_violations(mut self, violations: Vec<IntegrityViolation>) -> Self {
        self.violations = violations;
        self
    }

    pub fn with_frameworks(mut self, frameworks: Vec<Framework>) -> Self {
        self.frameworks = frameworks;
        self
    }
}

/// Render an assessment using an OutputFormat enum.
///
/// `detailed` only affects JSON: the full assessment instead of the flat
/// score map.
pub fn report_with_format(assessment: &Assessment, format: OutputFormat, detailed: bool) -> Result<String> {
    match format {
        OutputFormat::Text => text::render(assessment),
        OutputFormat::Json if detailed => json::render_detailed(assessment),
        OutputFormat::Json => json::render(&assessment.report),
        OutputFormat::Markdown => markdown::render(assessment),
        OutputFormat::Svg => svg::render(&assessment.report),
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::models::{Category, ScoringStrategy, ViolationKind};
    use crate::scoring::{aggregate, Criterion};
    use std::collections::BTreeMap;

    /// A mid-range assessment with one violation and one framework
    pub(crate) fn test_assessment() -> Assessment {
        let scores: BTreeMap<Category, f64> = [
            (Category::Metadata, 1.0),
            (Category::Participants, 0.75),
            (Category::Equipment, 0.75),
            (Category::Stimuli, 0.4),
            (Category::Aois, 1.0),
            (Category::DataQuality, 0.75),
            (Category::Preprocessing, 0.0),
            (Category::Analysis, 0.5),
            (Category::Threats, 1.0),
            (Category::Reproducibility, 0.25),
        ]
        .into_iter()
        .collect();
        let report = aggregate(ScoringStrategy::Presence, scores, 0.8);

        Assessment::new("demo-study", report)
            .with_violations(vec![IntegrityViolation::new(
                ViolationKind::InvalidGeometry,
                "A2",
                "height must be > 0 (got -5)",
            )])
            .with_frameworks(vec![Framework {
                name: "FAIR",
                criteria: vec![
                    Criterion {
                        key: "findable",
                        label: "Findable",
                        met: true,
                    },
                    Criterion {
                        key: "accessible",
                        label: "Accessible",
                        met: false,
                    },
                ],
            }])
    }

    #[test]
    fn test_format_parsing() {
        assert_eq!(OutputFormat::from_str("text").unwrap(), OutputFormat::Text);
        assert_eq!(OutputFormat::from_str("JSON").unwrap(), OutputFormat::Json);
        assert_eq!(OutputFormat::from_str("md").unwrap(), OutputFormat::Markdown);
        assert_eq!(OutputFormat::from_str("svg").unwrap(), OutputFormat::Svg);
        assert!(OutputFormat::from_str("sarif").is_err());
    }

    #[test]
    fn test_every_format_renders() {
        let assessment = test_assessment();
        for format in [
            OutputFormat::Text,
            OutputFormat::Json,
            OutputFormat::Markdown,
            OutputFormat::Svg,
        ] {
            let out = report_with_format(&assessment, format, false).unwrap();
            assert!(!out.is_empty(), "{format} rendered nothing");
        }
    }
}
