//! Assess command - score a study package and emit reports

use crate::config::{load_project_config, ProjectConfig};
use crate::integrity::check_package;
use crate::models::{ComplianceReport, ScoringStrategy};
use crate::package::StudyPackage;
use crate::reporters::{self, Assessment, OutputFormat};
use crate::scoring::{assess_with_config, evaluate_frameworks};
use anyhow::{Context, Result};
use console::style;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use tracing::info;

/// File names written by `--out-dir`
pub const REPORT_JSON: &str = "report.json";
pub const REPORT_MD: &str = "report.md";
pub const SCORE_SVG: &str = "score.svg";

/// Flags of the assess command. `None` falls back to the package config.
#[derive(Debug, Default)]
pub struct AssessOptions {
    pub format: Option<String>,
    pub output: Option<PathBuf>,
    pub out_dir: Option<PathBuf>,
    pub strategy: Option<String>,
    pub detailed: bool,
    pub fail_under: Option<f64>,
}

/// Open, score and check a package in one pass
pub(super) fn build_assessment(
    path: &Path,
    config: &ProjectConfig,
    strategy: Option<&str>,
) -> Result<(StudyPackage, Assessment)> {
    let package = StudyPackage::open(path)
        .with_context(|| format!("Cannot assess package at {}", path.display()))?;
    let strategy = strategy.map(ScoringStrategy::from_str).transpose()?;

    let report = assess_with_config(&package, config, strategy);
    let violations = check_package(&package, &config.integrity);
    let frameworks = evaluate_frameworks(&package, &report);

    let assessment = Assessment::new(path.display().to_string(), report)
        .with_violations(violations)
        .with_frameworks(frameworks);
    Ok((package, assessment))
}

/// Run the assess command
pub fn run(path: &Path, options: AssessOptions) -> Result<()> {
    let config = load_project_config(path);
    let (_package, assessment) = build_assessment(path, &config, options.strategy.as_deref())?;

    let format_name = options
        .format
        .or_else(|| config.defaults.format.clone())
        .unwrap_or_else(|| "text".to_string());
    let format = OutputFormat::from_str(&format_name)?;

    let out_dir = options
        .out_dir
        .or_else(|| config.defaults.out_dir.as_ref().map(|d| path.join(d)));
    if let Some(dir) = out_dir {
        write_report_bundle(&dir, &assessment, options.detailed)?;
    }

    let output = reporters::report_with_format(&assessment, format, options.detailed)?;
    match options.output {
        Some(out_path) => {
            std::fs::write(&out_path, &output)
                .with_context(|| format!("Failed to write {}", out_path.display()))?;
            // Use stderr for machine-readable formats to keep stdout clean
            eprintln!(
                "\n{}Report written to: {}",
                style("📄 ").bold(),
                style(out_path.display()).cyan()
            );
        }
        None => println!("{}", output),
    }

    let fail_under = options.fail_under.or(config.defaults.fail_under);
    check_fail_threshold(fail_under, &assessment.report);
    Ok(())
}

/// Write report.json, report.md and score.svg into `dir`
pub fn write_report_bundle(dir: &Path, assessment: &Assessment, detailed: bool) -> Result<()> {
    std::fs::create_dir_all(dir)
        .with_context(|| format!("Failed to create output directory {}", dir.display()))?;

    let outputs = [
        (REPORT_JSON, OutputFormat::Json),
        (REPORT_MD, OutputFormat::Markdown),
        (SCORE_SVG, OutputFormat::Svg),
    ];
    for (name, format) in outputs {
        let content = reporters::report_with_format(assessment, format, detailed)?;
        let target = dir.join(name);
        std::fs::write(&target, content)
            .with_context(|| format!("Failed to write {}", target.display()))?;
        info!("Wrote {}", target.display());
    }

    eprintln!(
        "{} Reports written to {}",
        style("✓").green(),
        style(dir.display()).cyan()
    );
    Ok(())
}

/// Exit with code 1 when the overall score falls below the threshold
fn check_fail_threshold(fail_under: Option<f64>, report: &ComplianceReport) {
    if let Some(threshold) = fail_under {
        if report.overall < threshold {
            eprintln!(
                "Failing due to --fail-under={}: overall score {:.3}",
                threshold, report.overall
            );
            std::process::exit(1);
        }
    }
}
