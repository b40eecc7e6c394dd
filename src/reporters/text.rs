//! Text (terminal) reporter with colors and formatting

use super::Assessment;
use crate::models::{Category, ComplianceStatus, ViolationKind};
use anyhow::Result;

/// Status colors (ANSI escape codes)
fn status_color(status: ComplianceStatus) -> &'static str {
    match status {
        ComplianceStatus::Complete => "\x1b[32m",   // Green
        ComplianceStatus::InProgress => "\x1b[33m", // Yellow
        ComplianceStatus::Starting => "\x1b[31m",   // Red
    }
}

/// Violation colors
fn kind_color(kind: ViolationKind) -> &'static str {
    match kind {
        ViolationKind::MissingCrossReference => "\x1b[31m", // Red
        ViolationKind::DuplicateIdentifier => "\x1b[91m",   // Light red
        ViolationKind::InvalidGeometry => "\x1b[33m",       // Yellow
        ViolationKind::OutOfRangeValue => "\x1b[34m",       // Blue
    }
}

/// Reset ANSI color
const RESET: &str = "\x1b[0m";
const BOLD: &str = "\x1b[1m";
const DIM: &str = "\x1b[2m";

const BAR_WIDTH: usize = 20;
const MAX_VIOLATIONS: usize = 10;

/// Render assessment as formatted terminal output
pub fn render(assessment: &Assessment) -> Result<String> {
    let report = &assessment.report;
    let mut out = String::new();

    // Header
    let status_c = status_color(report.status);
    out.push_str(&format!("\n{BOLD}Replet Assessment{RESET}  {DIM}{}{RESET}\n", assessment.package));
    out.push_str(&format!(
        "{DIM}──────────────────────────────────────{RESET}\n"
    ));
    out.push_str(&format!(
        "Overall: {BOLD}{}{RESET}  Status: {status_c}{BOLD}{}{RESET} {DIM}({}){RESET}  ",
        format_score(report.overall),
        report.status,
        report.status_detail
    ));
    out.push_str(&format!(
        "Compliant: {}/{}  Strategy: {}\n\n",
        report.compliant_count,
        Category::ALL.len(),
        report.strategy
    ));

    // Category scores
    out.push_str(&format!("{BOLD}SCORES{RESET}\n"));
    for category in Category::ALL {
        let score = report.score(category);
        out.push_str(&format!(
            "  {:<18} {} {}\n",
            category.label(),
            bar(score),
            format_score(score)
        ));
    }
    out.push('\n');

    // Frameworks
    if !assessment.frameworks.is_empty() {
        out.push_str(&format!("{BOLD}FRAMEWORKS{RESET}\n"));
        for framework in &assessment.frameworks {
            out.push_str(&format!(
                "  {:<20} {}/{}\n",
                framework.name,
                framework.met_count(),
                framework.criteria.len()
            ));
        }
        out.push('\n');
    }

    // Integrity violations
    out.push_str(&format!(
        "{BOLD}INTEGRITY{RESET} ({} violations)\n",
        assessment.violations.len()
    ));
    for v in assessment.violations.iter().take(MAX_VIOLATIONS) {
        let kind_c = kind_color(v.kind);
        out.push_str(&format!(
            "  {kind_c}{:<24}{RESET} {:<12} {DIM}{}{RESET}\n",
            v.kind.to_string(),
            v.subject_id,
            v.detail
        ));
    }
    let remaining = assessment.violations.len().saturating_sub(MAX_VIOLATIONS);
    if remaining > 0 {
        out.push_str(&format!(
            "  {DIM}...and {} more (use `replet check`){RESET}\n",
            remaining
        ));
    }
    out.push('\n');

    match report.status {
        ComplianceStatus::Complete => {
            out.push_str(&format!("{DIM}Publication ready.{RESET}\n"))
        }
        ComplianceStatus::InProgress => out.push_str(&format!(
            "{DIM}Good progress. Fill the categories marked below 80%.{RESET}\n"
        )),
        ComplianceStatus::Starting => out.push_str(&format!(
            "{DIM}Run `replet init` to scaffold the missing documents.{RESET}\n"
        )),
    }

    Ok(out)
}

fn bar(score: f64) -> String {
    let filled = (score.clamp(0.0, 1.0) * BAR_WIDTH as f64).round() as usize;
    format!(
        "{}{DIM}{}{RESET}",
        "█".repeat(filled),
        "░".repeat(BAR_WIDTH - filled)
    )
}

/// Format a unit score as a colored percentage
fn format_score(score: f64) -> String {
    let color = if score > 0.8 {
        "\x1b[32m"
    } else if score > 0.5 {
        "\x1b[33m"
    } else {
        "\x1b[31m"
    };
    format!("{color}{:.1}%{RESET}", score * 100.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reporters::tests::test_assessment;

    #[test]
    fn test_text_render() {
        let out = render(&test_assessment()).expect("render text");
        assert!(out.contains("Replet Assessment"));
        assert!(out.contains("demo-study"));
        assert!(out.contains("Starting"));
        assert!(out.contains("Compliant: 3/10"));
        assert!(out.contains("Participant Info"));
        assert!(out.contains("(1 violations)"));
        assert!(out.contains("replet init"));
    }

    #[test]
    fn test_bar_width_is_fixed() {
        for score in [0.0, 0.33, 1.0] {
            let b = bar(score);
            let cells = b.chars().filter(|c| *c == '█' || *c == '░').count();
            assert_eq!(cells, BAR_WIDTH);
        }
    }
}
