//! Check command - cross-file integrity report

use crate::config::load_project_config;
use crate::integrity::check_package;
use crate::models::IntegrityViolation;
use crate::package::StudyPackage;
use anyhow::{Context, Result};
use console::style;
use serde::Serialize;
use std::path::Path;

#[derive(Serialize)]
struct CheckOutput<'a> {
    package: String,
    total: usize,
    violations: &'a [IntegrityViolation],
}

/// Run the check command. Exits with code 1 when violations exist.
pub fn run(path: &Path, format: &str) -> Result<()> {
    let package = StudyPackage::open(path)
        .with_context(|| format!("Cannot check package at {}", path.display()))?;
    let config = load_project_config(package.root());
    let violations = check_package(&package, &config.integrity);

    if format == "json" {
        let output = CheckOutput {
            package: path.display().to_string(),
            total: violations.len(),
            violations: &violations,
        };
        println!("{}", serde_json::to_string_pretty(&output)?);
    } else {
        print_text(&violations);
    }

    if !violations.is_empty() {
        std::process::exit(1);
    }
    Ok(())
}

fn print_text(violations: &[IntegrityViolation]) {
    if violations.is_empty() {
        println!("{} No integrity violations found", style("✓").green());
        return;
    }

    println!(
        "\n{} {} integrity violation(s)\n",
        style("✗").red().bold(),
        violations.len()
    );
    for v in violations {
        println!(
            "  {:<24} {:<14} {}",
            style(v.kind.to_string()).yellow(),
            style(&v.subject_id).cyan(),
            v.detail
        );
    }
}
