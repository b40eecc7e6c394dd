//! JSON reporter
//!
//! The default output is a flat object mapping each category name to its
//! score, in canonical order. `render_detailed` emits the whole assessment.

use super::Assessment;
use crate::models::ComplianceReport;
use anyhow::Result;

/// Render the category-to-score map
pub fn render(report: &ComplianceReport) -> Result<String> {
    Ok(serde_json::to_string_pretty(&report.scores)?)
}

/// Render scores, verdict, violations and frameworks
pub fn render_detailed(assessment: &Assessment) -> Result<String> {
    Ok(serde_json::to_string_pretty(assessment)?)
}
