//! Readme command - patch the package README with the current assessment

use super::assess::build_assessment;
use crate::config::load_project_config;
use crate::reporters::{readme, svg};
use anyhow::{Context, Result};
use console::style;
use std::path::Path;

/// Radar chart written next to the README
pub const SPIDER_GRAPH: &str = "reproducibility_spider_graph.svg";
const README: &str = "README.md";

/// Run the readme command
pub fn run(path: &Path, strategy: Option<&str>) -> Result<()> {
    let config = load_project_config(path);
    let (package, assessment) = build_assessment(path, &config, strategy)?;
    let report = &assessment.report;

    let chart_path = package.path(SPIDER_GRAPH);
    std::fs::write(&chart_path, svg::render(report)?)
        .with_context(|| format!("Failed to write {}", chart_path.display()))?;

    let readme_path = package.path(README);
    let existing = if readme_path.exists() {
        Some(
            std::fs::read_to_string(&readme_path)
                .with_context(|| format!("Failed to read {}", readme_path.display()))?,
        )
    } else {
        None
    };
    let patched = readme::patch(existing.as_deref(), report, SPIDER_GRAPH);
    std::fs::write(&readme_path, patched)
        .with_context(|| format!("Failed to write {}", readme_path.display()))?;

    println!(
        "{} {} updated",
        style("✓").green(),
        style(readme_path.display()).cyan()
    );
    println!("  Overall Score: {:.1}%", report.overall * 100.0);
    println!(
        "  Compliance:    {}/{} ({:.1}%)",
        report.compliant_count,
        report.scores.len(),
        report.compliance_ratio * 100.0
    );
    println!("  Status:        {}", report.status);

    Ok(())
}
