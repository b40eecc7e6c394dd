//! Markdown reporter for GitHub-flavored Markdown output
//!
//! Generates reports suitable for:
//! - `report.md` next to the JSON and radar outputs
//! - Study README files (see [`super::readme`])
//! - Pull request comments on study repositories

use super::Assessment;
use crate::models::{Category, ComplianceReport};
use anyhow::Result;
use chrono::Local;

/// Render assessment as GitHub-flavored Markdown
pub fn render(assessment: &Assessment) -> Result<String> {
    let report = &assessment.report;
    let mut md = String::new();

    md.push_str(&render_header(assessment));
    md.push('\n');

    md.push_str(&render_score_lines(report));
    md.push('\n');

    md.push_str(&render_checklist(report));
    md.push('\n');

    md.push_str(render_scores_table(report).trim_start());
    md.push('\n');

    if !assessment.frameworks.is_empty() {
        md.push_str(&render_frameworks(assessment));
        md.push('\n');
    }

    md.push_str(&render_violations(assessment));
    md.push('\n');

    md.push_str("See `score.svg` for the radar chart.\n");

    Ok(md)
}

fn render_header(assessment: &Assessment) -> String {
    let timestamp = Local::now().format("%Y-%m-%d %H:%M:%S");

    format!(
        r#"# Reproducibility Report: {}

**Strategy**: {} | **Overall**: {:.1}%

Generated: {}
"#,
        assessment.package,
        assessment.report.strategy,
        assessment.report.overall * 100.0,
        timestamp
    )
}

/// One `category: score` line per category, then the overall line
fn render_score_lines(report: &ComplianceReport) -> String {
    let mut md = String::from("## Scores\n\n");
    for category in Category::ALL {
        md.push_str(&format!("- **{}**: {:.2}\n", category, report.score(category)));
    }
    md.push_str(&format!("\n**Overall**: {:.3} ({:.1}%)\n", report.overall, report.overall * 100.0));
    md
}

/// ✅ above 0.8, ⚠️ above 0.5, ❌ otherwise
pub fn status_icon(score: f64) -> &'static str {
    if score > 0.8 {
        "✅"
    } else if score > 0.5 {
        "⚠️"
    } else {
        "❌"
    }
}

/// The `## 📋 Compliance Checklist` section, ending with a rule
pub fn render_checklist(report: &ComplianceReport) -> String {
    let items: Vec<String> = Category::ALL
        .iter()
        .map(|c| {
            let score = report.score(*c);
            format!("- {} **{}**: {:.1}%", status_icon(score), c.label(), score * 100.0)
        })
        .collect();

    format!(
        r#"## 📋 Compliance Checklist

**Status**: {} ({})  
**Overall Compliance**: {}/{} criteria met ({:.1}%)

### Component Scores:
{}

### Legend:
- ✅ **Complete** (>80%): Publication ready
- ⚠️ **Partial** (50-80%): Good progress, needs refinement
- ❌ **Missing** (<50%): Requires attention

---
"#,
        report.status,
        report.status_detail,
        report.compliant_count,
        Category::ALL.len(),
        report.compliance_ratio * 100.0,
        items.join("\n")
    )
}

/// The `| Study Component | Score |` table, closed by the overall row
pub fn render_scores_table(report: &ComplianceReport) -> String {
    let rows: Vec<String> = Category::ALL
        .iter()
        .map(|c| format!("| {} | {:.1}% |", c.label(), report.score(*c) * 100.0))
        .collect();

    format!(
        r#"
| Study Component | Score |
|----------------|-------|
{}
| **Overall Study Score** | **{:.1}%** |
"#,
        rows.join("\n"),
        report.overall * 100.0
    )
}

fn render_frameworks(assessment: &Assessment) -> String {
    let mut md = String::from("## Compliance Frameworks\n");
    for framework in &assessment.frameworks {
        md.push_str(&format!(
            "\n### {} ({}/{})\n\n",
            framework.name,
            framework.met_count(),
            framework.criteria.len()
        ));
        for criterion in &framework.criteria {
            let mark = if criterion.met { "x" } else { " " };
            md.push_str(&format!("- [{}] {}\n", mark, criterion.label));
        }
    }
    md
}

fn render_violations(assessment: &Assessment) -> String {
    if assessment.violations.is_empty() {
        return "## Integrity\n\nNo cross-file integrity violations found.\n".to_string();
    }

    let mut md = format!(
        "## Integrity\n\n{} violation(s) found.\n\n| Kind | Subject | Detail |\n|------|---------|--------|\n",
        assessment.violations.len()
    );
    for v in &assessment.violations {
        md.push_str(&format!(
            "| {} | `{}` | {} |\n",
            v.kind,
            v.subject_id,
            v.detail.replace('|', "\\|")
        ));
    }
    md
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reporters::tests::test_assessment;

    #[test]
    fn test_markdown_render() {
        let assessment = test_assessment();
        let md = render(&assessment).expect("render markdown");
        assert!(md.starts_with("# Reproducibility Report: demo-study"));
        assert!(md.contains("- **metadata**: 1.00"));
        assert!(md.contains("- **reproducibility**: 0.25"));
        assert!(md.contains("**Overall**: 0.640 (64.0%)"));
        assert!(md.contains("### FAIR (1/2)"));
        assert!(md.contains("- [x] Findable"));
        assert!(md.contains("| invalid-geometry | `A2` |"));
    }

    #[test]
    fn test_checklist_icons_and_status() {
        let report = test_assessment().report;
        let checklist = render_checklist(&report);
        assert!(checklist.starts_with("## 📋 Compliance Checklist"));
        assert!(checklist.contains("- ✅ **Study Metadata**: 100.0%"));
        assert!(checklist.contains("- ⚠️ **Participant Info**: 75.0%"));
        assert!(checklist.contains("- ❌ **Preprocessing**: 0.0%"));
        assert!(checklist.contains("**Status**: Starting (Basic Setup)"));
        assert!(checklist.contains("3/10 criteria met (30.0%)"));
    }

    #[test]
    fn test_scores_table_ends_with_overall_row() {
        let table = render_scores_table(&test_assessment().report);
        assert!(table.trim_end().ends_with("| **Overall Study Score** | **64.0%** |"));
        assert!(table.contains("| Validity | 100.0% |"));
    }

    #[test]
    fn test_no_violations_message() {
        let mut assessment = test_assessment();
        assessment.violations.clear();
        let md = render(&assessment).expect("render markdown");
        assert!(md.contains("No cross-file integrity violations found."));
    }
}
