//! Presence-based category rules
//!
//! Credit for each expected artifact found. Content is only inspected where a
//! rule names specific fields.

use super::CategoryScorer;
use crate::models::{Category, ScoringStrategy};
use crate::package::layout;
use crate::package::{is_truthy, CategoryArtifacts, PackageError, StudyPackage};
use serde_json::Value;

const METADATA_FIELDS: [&str; 3] = ["study_title", "paradigm", "task_description"];
const PARTICIPANT_FIELDS: [&str; 4] = ["age", "gender", "handedness", "vision"];

/// Scores categories by artifact presence
#[derive(Debug, Clone, Copy, Default)]
pub struct PresenceScorer;

impl CategoryScorer for PresenceScorer {
    fn strategy(&self) -> ScoringStrategy {
        ScoringStrategy::Presence
    }

    fn score(&self, package: &StudyPackage, category: Category) -> Result<f64, PackageError> {
        Ok(match category {
            Category::Metadata => metadata(package)?,
            Category::Participants => participants(package)?,
            Category::Equipment => equipment(&package.artifacts(category)),
            Category::Stimuli => stimuli(&package.artifacts(category)),
            Category::Aois | Category::DataQuality | Category::Preprocessing => {
                document_with_dir(&package.artifacts(category))
            }
            Category::Analysis => analysis(&package.artifacts(category)),
            Category::Threats => threats(package)?,
            Category::Reproducibility => reproducibility(package),
        })
    }
}

fn metadata(package: &StudyPackage) -> Result<f64, PackageError> {
    let Some(doc) = package.read_json(layout::METADATA)? else {
        return Ok(0.0);
    };
    let Some(obj) = doc.as_object() else {
        return Ok(0.25);
    };
    if METADATA_FIELDS.iter().all(|k| obj.get(*k).is_some_and(is_truthy)) {
        Ok(1.0)
    } else if METADATA_FIELDS.iter().any(|k| obj.contains_key(*k)) {
        Ok(0.5)
    } else {
        Ok(0.25)
    }
}

fn participants(package: &StudyPackage) -> Result<f64, PackageError> {
    let Some(doc) = package.read_json(layout::PARTICIPANTS)? else {
        return Ok(0.0);
    };
    let entries = match doc.get("participants") {
        Some(Value::Array(entries)) if !entries.is_empty() => entries,
        _ => return Ok(0.25),
    };
    let complete = entries.iter().all(|p| {
        p.as_object()
            .is_some_and(|p| PARTICIPANT_FIELDS.iter().all(|f| p.contains_key(*f)))
    });
    Ok(if complete { 1.0 } else { 0.75 })
}

fn equipment(artifacts: &CategoryArtifacts) -> f64 {
    match artifacts.documents_present() {
        0 => 0.0,
        1 => 0.5,
        2 => 0.75,
        _ => 1.0,
    }
}

fn stimuli(artifacts: &CategoryArtifacts) -> f64 {
    let mut score = 0.0;
    if present(artifacts, layout::STIMULI_METADATA) {
        score += 0.4;
    }
    if present(artifacts, layout::STIMULI_ANNOTATIONS) {
        score += 0.3;
    }
    if artifacts.directory_entries(layout::STIMULI_RAW) > 0 {
        score += 0.3;
    }
    f64::min(score, 1.0)
}

/// 0 without the document, 0.75 with it, 1.0 when its directory has entries
fn document_with_dir(artifacts: &CategoryArtifacts) -> f64 {
    if artifacts.documents_present() == 0 {
        0.0
    } else if artifacts.directories.iter().any(|(_, entries)| *entries > 0) {
        1.0
    } else {
        0.75
    }
}

fn analysis(artifacts: &CategoryArtifacts) -> f64 {
    let mut score = 0.0;
    if present(artifacts, layout::ANALYSIS) {
        score += 0.5;
    }
    if artifacts.directory_entries(layout::RESULTS_TABLES) > 0 {
        score += 0.25;
    }
    if artifacts.directory_entries(layout::ANALYSIS_VISUALIZATIONS) > 0 {
        score += 0.25;
    }
    f64::min(score, 1.0)
}

fn present(artifacts: &CategoryArtifacts, rel: &str) -> bool {
    artifacts.document(rel).is_some_and(|d| d.is_present())
}

fn threats(package: &StudyPackage) -> Result<f64, PackageError> {
    let Some(doc) = package.read_json(layout::VALIDITY)? else {
        return Ok(0.0);
    };
    Ok(match doc.get("threats") {
        Some(threats) if is_truthy(threats) => 1.0,
        _ => 0.5,
    })
}

fn reproducibility(package: &StudyPackage) -> f64 {
    let found = layout::REPRODUCIBILITY_ARTIFACTS
        .iter()
        .filter(|a| package.exists(a))
        .count();
    match found {
        0 => 0.0,
        1 => 0.25,
        2 => 0.5,
        n if n < layout::REPRODUCIBILITY_ARTIFACTS.len() => 0.75,
        _ => 1.0,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scoring::score_categories;
    use std::path::Path;

    fn write(root: &Path, rel: &str, content: &str) {
        let path = root.join(rel);
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        std::fs::write(path, content).unwrap();
    }

    fn score(root: &Path, category: Category) -> f64 {
        let pkg = StudyPackage::open(root).unwrap();
        PresenceScorer.score(&pkg, category).unwrap()
    }

    #[test]
    fn test_metadata_levels() {
        let dir = tempfile::tempdir().unwrap();
        assert_eq!(score(dir.path(), Category::Metadata), 0.0);

        write(dir.path(), layout::METADATA, r#"{"authors": []}"#);
        assert_eq!(score(dir.path(), Category::Metadata), 0.25);

        write(dir.path(), layout::METADATA, r#"{"study_title": ""}"#);
        assert_eq!(score(dir.path(), Category::Metadata), 0.5);

        write(
            dir.path(),
            layout::METADATA,
            r#"{"study_title": "T", "paradigm": "free viewing", "task_description": "Read code"}"#,
        );
        assert_eq!(score(dir.path(), Category::Metadata), 1.0);
    }

    #[test]
    fn test_malformed_metadata_scores_zero_through_engine() {
        let dir = tempfile::tempdir().unwrap();
        write(dir.path(), layout::METADATA, "{ broken");
        let pkg = StudyPackage::open(dir.path()).unwrap();
        assert!(PresenceScorer.score(&pkg, Category::Metadata).is_err());
        let scores = score_categories(&pkg, &PresenceScorer);
        assert_eq!(scores[&Category::Metadata], 0.0);
    }

    #[test]
    fn test_participants_levels() {
        let dir = tempfile::tempdir().unwrap();
        assert_eq!(score(dir.path(), Category::Participants), 0.0);

        write(dir.path(), layout::PARTICIPANTS, r#"{"participants": []}"#);
        assert_eq!(score(dir.path(), Category::Participants), 0.25);

        write(
            dir.path(),
            layout::PARTICIPANTS,
            r#"{"participants": [
                {"participant_id": "P01", "age": 24, "gender": "female", "handedness": "right", "vision": "none"},
                {"participant_id": "P02", "age": 31, "gender": "male", "handedness": "left"}
            ]}"#,
        );
        assert_eq!(score(dir.path(), Category::Participants), 0.75);

        write(
            dir.path(),
            layout::PARTICIPANTS,
            r#"{"participants": [
                {"participant_id": "P01", "age": 24, "gender": "female", "handedness": "right", "vision": "none"}
            ]}"#,
        );
        assert_eq!(score(dir.path(), Category::Participants), 1.0);
    }

    #[test]
    fn test_equipment_counts_documents() {
        let dir = tempfile::tempdir().unwrap();
        assert_eq!(score(dir.path(), Category::Equipment), 0.0);
        write(dir.path(), layout::TRACKER_SPECS, "{}");
        assert_eq!(score(dir.path(), Category::Equipment), 0.5);
        write(dir.path(), layout::SCREEN_SETUP, "{}");
        assert_eq!(score(dir.path(), Category::Equipment), 0.75);
        write(dir.path(), layout::SOFTWARE_ENV, "{}");
        assert_eq!(score(dir.path(), Category::Equipment), 1.0);
    }

    #[test]
    fn test_stimuli_additive() {
        let dir = tempfile::tempdir().unwrap();
        write(dir.path(), layout::STIMULI_ANNOTATIONS, "{}");
        assert!((score(dir.path(), Category::Stimuli) - 0.3).abs() < 1e-9);
        std::fs::create_dir_all(dir.path().join(layout::STIMULI_RAW)).unwrap();
        assert!((score(dir.path(), Category::Stimuli) - 0.3).abs() < 1e-9);
        write(dir.path(), "stimuli/stimuli_raw/s1.png", "png");
        write(dir.path(), layout::STIMULI_METADATA, "{}");
        assert!((score(dir.path(), Category::Stimuli) - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_document_with_directory_pattern() {
        let dir = tempfile::tempdir().unwrap();
        assert_eq!(score(dir.path(), Category::DataQuality), 0.0);
        write(dir.path(), layout::PROTOCOL, "{}");
        assert_eq!(score(dir.path(), Category::DataQuality), 0.75);
        write(dir.path(), "collection/logs/session1.log", "ok");
        assert_eq!(score(dir.path(), Category::DataQuality), 1.0);
    }

    #[test]
    fn test_analysis_additive() {
        let dir = tempfile::tempdir().unwrap();
        write(dir.path(), "analysis/visualizations/heatmap.png", "png");
        assert_eq!(score(dir.path(), Category::Analysis), 0.25);
        write(dir.path(), layout::ANALYSIS, "{}");
        assert_eq!(score(dir.path(), Category::Analysis), 0.75);
    }

    #[test]
    fn test_threats() {
        let dir = tempfile::tempdir().unwrap();
        write(dir.path(), layout::VALIDITY, r#"{"threats": []}"#);
        assert_eq!(score(dir.path(), Category::Threats), 0.5);
        write(dir.path(), layout::VALIDITY, r#"{"threats": [{"type": "internal"}]}"#);
        assert_eq!(score(dir.path(), Category::Threats), 1.0);
    }

    #[test]
    fn test_reproducibility_checklist_levels() {
        let dir = tempfile::tempdir().unwrap();
        let expected = [0.25, 0.5, 0.75, 0.75, 1.0];
        for (artifact, want) in layout::REPRODUCIBILITY_ARTIFACTS.iter().zip(expected) {
            write(dir.path(), artifact, "x");
            assert_eq!(score(dir.path(), Category::Reproducibility), want, "after {artifact}");
        }
    }
}
