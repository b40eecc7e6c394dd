//! Reproducibility scoring
//!
//! Each of the ten categories is scored independently in [0, 1] by a
//! [`CategoryScorer`]. Two strategies exist:
//!
//! - **Presence** ([`PresenceScorer`]): partial credit for every expected
//!   artifact found on disk.
//! - **Authenticity** ([`AuthenticityScorer`]): full credit only when the
//!   content looks like real study data rather than an unfilled scaffold.
//!
//! # Engine contract
//!
//! ```text
//! score(category) = clamp(scorer(category), 0, 1)     NaN -> 0
//! missing artifact   -> 0
//! malformed document -> 0, logged as a warning
//! ```
//!
//! The per-category values are folded into a [`ComplianceReport`] by
//! [`aggregate::aggregate`].

pub mod aggregate;
mod authenticity;
pub mod frameworks;
mod presence;

pub use aggregate::aggregate;
pub use authenticity::AuthenticityScorer;
pub use frameworks::{evaluate_frameworks, Criterion, Framework};
pub use presence::PresenceScorer;

use crate::classifier::ClassifierTables;
use crate::config::ProjectConfig;
use crate::models::{Category, CategoryScore, ComplianceReport, ScoringStrategy};
use crate::package::{PackageError, StudyPackage};
use std::collections::BTreeMap;
use tracing::{debug, info, warn};

/// One scoring rule per category
pub trait CategoryScorer {
    fn strategy(&self) -> ScoringStrategy;

    /// Raw score for one category. Missing artifacts are `Ok(0.0)`; a
    /// malformed document may surface as an error.
    fn score(&self, package: &StudyPackage, category: Category) -> Result<f64, PackageError>;
}

/// Build the scorer for a strategy
pub fn scorer_for(strategy: ScoringStrategy, tables: ClassifierTables) -> Box<dyn CategoryScorer> {
    match strategy {
        ScoringStrategy::Presence => Box::new(PresenceScorer),
        ScoringStrategy::Authenticity => Box::new(AuthenticityScorer::new(tables)),
    }
}

/// Score every category, clipping results and turning errors into 0
pub fn score_categories(package: &StudyPackage, scorer: &dyn CategoryScorer) -> BTreeMap<Category, f64> {
    Category::ALL
        .iter()
        .map(|&category| {
            let raw = match scorer.score(package, category) {
                Ok(value) => value,
                Err(e) => {
                    warn!("Scoring {} as 0: {}", category, e);
                    0.0
                }
            };
            let score = CategoryScore::new(category, raw);
            debug!("{} ({}): {:.2}", category, scorer.strategy(), score.value);
            (category, score.value)
        })
        .collect()
}

/// Score and aggregate a package with an explicit scorer
pub fn assess(package: &StudyPackage, scorer: &dyn CategoryScorer, complete_threshold: f64) -> ComplianceReport {
    let scores = score_categories(package, scorer);
    let report = aggregate(scorer.strategy(), scores, complete_threshold);
    info!(
        "Overall score: {:.1}% ({}/{} compliant, {})",
        report.overall * 100.0,
        report.compliant_count,
        Category::ALL.len(),
        report.status
    );
    report
}

/// Score a package the way its configuration asks for
pub fn assess_with_config(
    package: &StudyPackage,
    config: &ProjectConfig,
    strategy_override: Option<ScoringStrategy>,
) -> ComplianceReport {
    let strategy = config.strategy(strategy_override);
    let scorer = scorer_for(strategy, ClassifierTables::from_config(&config.classifier));
    assess(package, scorer.as_ref(), config.complete_threshold())
}
