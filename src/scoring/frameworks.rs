//! Compliance framework checklists
//!
//! Maps category scores and artifact presence onto the criteria of four
//! reporting frameworks: FAIR, general research standards, iGuidelines and
//! TRRRACED. A criterion is met when the backing documents carry content and
//! the relevant scores clear their bar.

use crate::models::{Category, ComplianceReport};
use crate::package::layout;
use crate::package::StudyPackage;
use serde::Serialize;

/// Score a category must exceed to back a "complete" criterion
const STRONG: f64 = 0.8;
/// Score a category must exceed to back a "partial" criterion
const PARTIAL: f64 = 0.5;
/// JSON files a package needs to count as using open formats throughout
const MIN_JSON_FILES: usize = 10;
/// Core categories checked for transparent reporting, and how many must pass
const TRANSPARENT_CATEGORIES: [Category; 5] = [
    Category::Metadata,
    Category::Participants,
    Category::Equipment,
    Category::DataQuality,
    Category::Analysis,
];
const TRANSPARENT_MIN: usize = 4;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Criterion {
    pub key: &'static str,
    pub label: &'static str,
    pub met: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Framework {
    pub name: &'static str,
    pub criteria: Vec<Criterion>,
}

impl Framework {
    pub fn met_count(&self) -> usize {
        self.criteria.iter().filter(|c| c.met).count()
    }
}

fn criterion(key: &'static str, label: &'static str, met: bool) -> Criterion {
    Criterion { key, label, met }
}

/// Evaluate every framework for a scored package
pub fn evaluate_frameworks(package: &StudyPackage, report: &ComplianceReport) -> Vec<Framework> {
    let has = |rel: &str| package.has_content(rel);
    let above = |c: Category, bar: f64| report.score(c) > bar;
    let metadata_strong = above(Category::Metadata, STRONG);

    let fair = Framework {
        name: "FAIR",
        criteria: vec![
            criterion("findable", "Findable", has(layout::METADATA) && metadata_strong),
            criterion(
                "accessible",
                "Accessible",
                package.count_json_files(".") >= MIN_JSON_FILES && metadata_strong,
            ),
            criterion(
                "interoperable",
                "Interoperable",
                package.list_files(layout::SCHEMAS_DIR, "json").len() >= MIN_JSON_FILES && metadata_strong,
            ),
            criterion("reusable", "Reusable", has(layout::METADATA) && metadata_strong),
        ],
    };

    let equipment_documented = layout::EQUIPMENT_DOCUMENTS.iter().any(|d| has(*d));
    let research = Framework {
        name: "Research Standards",
        criteria: vec![
            criterion(
                "study_design",
                "Study design",
                has(layout::METADATA) && metadata_strong,
            ),
            criterion(
                "equipment_reporting",
                "Equipment reporting",
                equipment_documented && above(Category::Equipment, STRONG),
            ),
            criterion(
                "stimuli_documentation",
                "Stimuli documentation",
                (has(layout::STIMULI_METADATA) || has(layout::STIMULI_ANNOTATIONS))
                    && above(Category::Stimuli, PARTIAL),
            ),
            criterion(
                "methodology_transparency",
                "Methodology transparency",
                has(layout::PREPROCESSING)
                    && has(layout::ANALYSIS)
                    && above(Category::Preprocessing, PARTIAL)
                    && above(Category::Analysis, PARTIAL),
            ),
            criterion(
                "validity_assessment",
                "Validity assessment",
                has(layout::VALIDITY) && above(Category::Threats, STRONG),
            ),
        ],
    };

    let iguidelines = Framework {
        name: "iGuidelines",
        criteria: vec![
            criterion(
                "participant_reporting",
                "Participant reporting",
                has(layout::PARTICIPANTS) && above(Category::Participants, STRONG),
            ),
            criterion(
                "calibration_procedures",
                "Calibration procedures",
                has(layout::TRACKER_SPECS) && above(Category::Equipment, STRONG),
            ),
            criterion(
                "exclusion_criteria",
                "Exclusion criteria",
                has(layout::PARTICIPANTS) && above(Category::Participants, PARTIAL),
            ),
            criterion(
                "quality_metrics",
                "Quality metrics",
                has(layout::PREPROCESSING) && above(Category::Preprocessing, PARTIAL),
            ),
        ],
    };

    let transparent = TRANSPARENT_CATEGORIES
        .iter()
        .filter(|c| above(**c, PARTIAL))
        .count()
        >= TRANSPARENT_MIN;
    let trrraced = Framework {
        name: "TRRRACED",
        criteria: vec![
            criterion("transparent_reporting", "Transparent reporting", transparent),
            criterion(
                "replication_materials",
                "Replication materials",
                has(layout::REPRODUCIBILITY) && above(Category::Reproducibility, PARTIAL),
            ),
            criterion(
                "data_availability",
                "Data availability",
                has(layout::REPRODUCIBILITY) && above(Category::DataQuality, PARTIAL),
            ),
            criterion("environment_specs", "Environment specs", has(layout::SOFTWARE_ENV)),
        ],
    };

    vec![fair, research, iguidelines, trrraced]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::ScoringStrategy;
    use crate::scoring::aggregate;
    use std::collections::BTreeMap;
    use std::path::Path;

    fn write(root: &Path, rel: &str, content: &str) {
        let path = root.join(rel);
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        std::fs::write(path, content).unwrap();
    }

    fn report_with(scores: &[(Category, f64)]) -> ComplianceReport {
        let map: BTreeMap<Category, f64> = scores.iter().copied().collect();
        aggregate(ScoringStrategy::Presence, map, 0.8)
    }

    fn met(frameworks: &[Framework], key: &str) -> bool {
        frameworks
            .iter()
            .flat_map(|f| f.criteria.iter())
            .find(|c| c.key == key)
            .map(|c| c.met)
            .unwrap()
    }

    #[test]
    fn test_empty_package_meets_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let pkg = StudyPackage::open(dir.path()).unwrap();
        let frameworks = evaluate_frameworks(&pkg, &report_with(&[]));
        assert_eq!(frameworks.len(), 4);
        assert!(frameworks.iter().all(|f| f.met_count() == 0));
    }

    #[test]
    fn test_findable_needs_content_and_score() {
        let dir = tempfile::tempdir().unwrap();
        write(dir.path(), layout::METADATA, "{}");
        let pkg = StudyPackage::open(dir.path()).unwrap();
        let report = report_with(&[(Category::Metadata, 1.0)]);
        assert!(!met(&evaluate_frameworks(&pkg, &report), "findable"));

        write(dir.path(), layout::METADATA, r#"{"study_title": "Reading"}"#);
        assert!(met(&evaluate_frameworks(&pkg, &report), "findable"));
        assert!(met(&evaluate_frameworks(&pkg, &report), "study_design"));
        assert!(!met(&evaluate_frameworks(&pkg, &report), "accessible"));
    }

    #[test]
    fn test_transparent_reporting_needs_four_of_five() {
        let dir = tempfile::tempdir().unwrap();
        let pkg = StudyPackage::open(dir.path()).unwrap();
        let three = report_with(&[
            (Category::Metadata, 0.9),
            (Category::Participants, 0.9),
            (Category::Equipment, 0.9),
        ]);
        assert!(!met(&evaluate_frameworks(&pkg, &three), "transparent_reporting"));

        let four = report_with(&[
            (Category::Metadata, 0.9),
            (Category::Participants, 0.9),
            (Category::Equipment, 0.9),
            (Category::Analysis, 0.6),
        ]);
        assert!(met(&evaluate_frameworks(&pkg, &four), "transparent_reporting"));
    }

    #[test]
    fn test_environment_specs_follow_software_env() {
        let dir = tempfile::tempdir().unwrap();
        write(dir.path(), layout::SOFTWARE_ENV, r#"{"operating_system": {"name": "Linux"}}"#);
        let pkg = StudyPackage::open(dir.path()).unwrap();
        assert!(met(&evaluate_frameworks(&pkg, &report_with(&[])), "environment_specs"));
    }
}
