//! Overall verdict from the ten category scores
//!
//! ```text
//! overall          = mean of the 10 category scores
//! compliant_count  = count(score > threshold)          threshold default 0.8
//! compliance_ratio = compliant_count / 10
//!
//! ratio >= 0.8  Complete     "Publication Ready"
//! ratio >= 0.5  InProgress   "Good Progress"
//! ratio <  0.3  Starting     "Empty Template"
//! otherwise     Starting     "Basic Setup"
//! ```

use crate::models::{Category, CategoryScore, ComplianceReport, ComplianceStatus, ScoringStrategy};
use std::collections::BTreeMap;

/// Tier and human-readable detail for a compliance ratio
pub fn status_for(compliance_ratio: f64) -> (ComplianceStatus, &'static str) {
    if compliance_ratio >= 0.8 {
        (ComplianceStatus::Complete, "Publication Ready")
    } else if compliance_ratio >= 0.5 {
        (ComplianceStatus::InProgress, "Good Progress")
    } else if compliance_ratio < 0.3 {
        (ComplianceStatus::Starting, "Empty Template")
    } else {
        (ComplianceStatus::Starting, "Basic Setup")
    }
}

/// Fold category scores into a report.
///
/// Categories missing from `scores` count as 0; values are clipped into
/// [0, 1] so the report always holds exactly ten valid entries.
pub fn aggregate(
    strategy: ScoringStrategy,
    scores: BTreeMap<Category, f64>,
    complete_threshold: f64,
) -> ComplianceReport {
    let scores: BTreeMap<Category, f64> = Category::ALL
        .iter()
        .map(|&c| {
            let value = scores.get(&c).copied().unwrap_or(0.0);
            (c, CategoryScore::new(c, value).value)
        })
        .collect();

    let total = scores.len();
    let overall = scores.values().sum::<f64>() / total as f64;
    let compliant_count = scores.values().filter(|v| **v > complete_threshold).count();
    let compliance_ratio = compliant_count as f64 / total as f64;
    let (status, detail) = status_for(compliance_ratio);

    ComplianceReport {
        strategy,
        scores,
        overall,
        compliant_count,
        compliance_ratio,
        status,
        status_detail: detail.to_string(),
    }
}
