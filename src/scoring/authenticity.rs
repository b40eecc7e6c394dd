//! Authenticity-based category rules
//!
//! A scaffolded package with every file present but nothing filled in should
//! score near zero here. Each rule inspects document content through the
//! classifier and quantizes the result with the bands in [`ClassifierTables`].
//!
//! `data_quality` has no content heuristic and is scored by the presence rule.

use super::{CategoryScorer, PresenceScorer};
use crate::classifier::{classify, contains_any_ci, value_text, Classification, ClassifierTables, FieldKind, Tally};
use crate::models::{Category, ScoringStrategy};
use crate::package::layout;
use crate::package::{is_truthy, PackageError, StudyPackage};
use serde_json::Value;
use tracing::{debug, warn};

/// Scores categories by how real their content looks
#[derive(Debug, Clone, Default)]
pub struct AuthenticityScorer {
    tables: ClassifierTables,
}

impl AuthenticityScorer {
    pub fn new(tables: ClassifierTables) -> Self {
        Self { tables }
    }
}

impl CategoryScorer for AuthenticityScorer {
    fn strategy(&self) -> ScoringStrategy {
        ScoringStrategy::Authenticity
    }

    fn score(&self, package: &StudyPackage, category: Category) -> Result<f64, PackageError> {
        let t = &self.tables;
        match category {
            Category::Metadata => with_document(package, layout::METADATA, |doc| metadata(doc, t)),
            Category::Participants => with_document(package, layout::PARTICIPANTS, |doc| participants(doc, t)),
            Category::Equipment => Ok(equipment(package, t)),
            Category::Stimuli => with_document(package, layout::STIMULI_METADATA, |doc| stimuli(doc, t)),
            Category::Aois => with_document(package, layout::AOIS_DEFINITION, |doc| aois(doc, t)),
            Category::DataQuality => PresenceScorer.score(package, category),
            Category::Preprocessing => with_document(package, layout::PREPROCESSING, |doc| preprocessing(doc, t)),
            Category::Analysis => with_document(package, layout::ANALYSIS, |doc| analysis(doc, t)),
            Category::Threats => with_document(package, layout::VALIDITY, |doc| threats(doc, t)),
            Category::Reproducibility => {
                with_document(package, layout::REPRODUCIBILITY, |doc| reproducibility(doc, t))
            }
        }
    }
}

/// 0 when the document is absent, otherwise the rule applied to its content
fn with_document(
    package: &StudyPackage,
    rel: &str,
    rule: impl FnOnce(&Value) -> f64,
) -> Result<f64, PackageError> {
    Ok(package.read_json(rel)?.map_or(0.0, |doc| rule(&doc)))
}

/// Array stored under `key`, empty when absent or not an array
fn entries<'a>(doc: &'a Value, key: &str) -> &'a [Value] {
    doc.get(key)
        .and_then(Value::as_array)
        .map(Vec::as_slice)
        .unwrap_or(&[])
}

/// Trimmed text of `doc[key]`
fn field_text(doc: &Value, key: &str) -> String {
    doc.get(key)
        .map(value_text)
        .unwrap_or_default()
        .trim()
        .to_string()
}

fn field<'a>(doc: &'a Value, key: &str) -> &'a Value {
    doc.get(key).unwrap_or(&Value::Null)
}

fn len(text: &str) -> usize {
    text.chars().count()
}

fn metadata(doc: &Value, t: &ClassifierTables) -> f64 {
    let title = classify(field(doc, "study_title"), t.text_kind(), t);
    let authors = classify(field(doc, "authors"), t.text_kind(), t);
    let institution = classify(field(doc, "institution"), FieldKind::FreeText { min_len: 1 }, t);

    let author_text = field_text(doc, "authors");
    let generic_author = t
        .generic_authors
        .iter()
        .any(|g| g.eq_ignore_ascii_case(&author_text));

    let real = [title, authors, institution]
        .iter()
        .all(|c| *c == Classification::Real);
    if real && !generic_author {
        t.verdicts.real
    } else {
        debug!("metadata looks like template content");
        t.verdicts.template
    }
}

fn participants(doc: &Value, t: &ClassifierTables) -> f64 {
    let list = entries(doc, "participants");
    if list.is_empty() {
        return t.empty_score;
    }
    let mut tally = Tally::default();
    for participant in list.iter().filter(|p| p.is_object()) {
        tally.record(classify(field(participant, "participant_id"), FieldKind::Identifier, t));
        tally.record(classify(field(participant, "age"), t.age_kind(), t));
        tally.record(classify(field(participant, "gender"), t.gender_kind(), t));
    }
    let total = list.len() * 3;
    debug!(
        "participants: {} real, {} template of {} checks",
        tally.real, tally.template, total
    );
    t.participants.score(tally.real, tally.template, total)
}

fn equipment(package: &StudyPackage, t: &ClassifierTables) -> f64 {
    let sub_scores = [
        equipment_document(package, layout::TRACKER_SPECS, |doc| tracker(doc, t)),
        equipment_document(package, layout::SCREEN_SETUP, |doc| screen(doc, t)),
        equipment_document(package, layout::SOFTWARE_ENV, |doc| software(doc, t)),
    ];
    let scored: Vec<f64> = sub_scores.into_iter().filter(|s| *s > 0.0).collect();
    if scored.is_empty() {
        0.0
    } else {
        scored.iter().sum::<f64>() / scored.len() as f64
    }
}

/// A malformed equipment document only zeroes its own sub-score
fn equipment_document(package: &StudyPackage, rel: &str, rule: impl FnOnce(&Value) -> f64) -> f64 {
    match with_document(package, rel, rule) {
        Ok(score) => score,
        Err(e) => {
            warn!("Skipping {}: {}", rel, e);
            0.0
        }
    }
}

fn tracker(doc: &Value, t: &ClassifierTables) -> f64 {
    let tracker = field(doc, "eye_tracker");
    let manufacturer = field_text(tracker, "manufacturer");
    let model = field_text(tracker, "model");

    let is_template = contains_any_ci(&manufacturer, &t.equipment_placeholders)
        || contains_any_ci(&model, &t.equipment_placeholders);
    let known_brand = contains_any_ci(&manufacturer, &t.tracker_brands);

    if known_brand && len(&manufacturer) > t.tracker_min_name_len && len(&model) > t.tracker_min_name_len {
        t.verdicts.real
    } else if !is_template && !manufacturer.is_empty() && !model.is_empty() {
        t.verdicts.partial
    } else {
        t.verdicts.template
    }
}

fn screen(doc: &Value, t: &ClassifierTables) -> f64 {
    let monitor = field(doc, "monitor");
    let manufacturer = field_text(monitor, "manufacturer");
    let model = field_text(monitor, "model");

    if contains_any_ci(&manufacturer, &t.monitor_brands) && !model.is_empty() {
        t.verdicts.real
    } else if !manufacturer.is_empty() && !model.is_empty() {
        t.verdicts.partial
    } else {
        t.verdicts.template
    }
}

fn software(doc: &Value, t: &ClassifierTables) -> f64 {
    let os = is_truthy(field(doc, "operating_system"));
    let tracking = is_truthy(field(doc, "eye_tracking_software"));
    match (os, tracking) {
        (true, true) => t.verdicts.real,
        (true, false) | (false, true) => t.verdicts.partial,
        (false, false) => t.verdicts.template,
    }
}

fn stimuli(doc: &Value, t: &ClassifierTables) -> f64 {
    let list = entries(doc, "stimuli");
    if list.is_empty() {
        return t.empty_score;
    }
    let mut tally = Tally::default();
    for stimulus in list.iter().filter(|s| s.is_object()) {
        let id = field_text(stimulus, "stimulus_id").to_lowercase();
        tally.check(!id.is_empty() && !t.stimulus_placeholder_ids.contains(&id));

        let metrics = match field(stimulus, "complexity_metrics") {
            Value::Object(m) => m.len(),
            Value::Array(a) => a.len(),
            _ => 0,
        };
        tally.check(metrics > t.min_complexity_metrics);

        let language = field_text(stimulus, "programming_language").to_lowercase();
        tally.check(!t.language_placeholders.contains(&language));
    }
    t.stimuli_bands.quantize(tally.real, tally.total())
}

fn aois(doc: &Value, t: &ClassifierTables) -> f64 {
    let list = entries(doc, "aois");
    if list.is_empty() {
        return t.empty_score;
    }
    let mut tally = Tally::default();
    for aoi in list.iter().filter(|a| a.is_object()) {
        let id = field_text(aoi, "aoi_id");
        tally.check(
            len(&id) > t.aoi_min_id_len && !id.to_lowercase().starts_with(&t.aoi_placeholder_prefix),
        );
        tally.check(len(&field_text(aoi, "description")) > t.aoi_min_description_len);
        let relevance = field_text(aoi, "cognitive_relevance");
        tally.check(!relevance.is_empty() && relevance != t.aoi_placeholder_relevance);
    }
    t.ratio_bands.quantize(tally.real, tally.total())
}

fn preprocessing(doc: &Value, t: &ClassifierTables) -> f64 {
    let steps = match doc.get("preprocessing_steps") {
        Some(steps) => steps.as_array().map(Vec::as_slice).unwrap_or(&[]),
        None => entries(doc, "steps"),
    };
    if steps.is_empty() {
        return t.empty_score;
    }
    if steps.len() < t.preprocessing_min_steps {
        return t.verdicts.template;
    }
    let detailed = steps
        .iter()
        .filter(|step| match step.get("parameters") {
            Some(Value::Object(params)) => params.len() > t.step_min_parameters,
            _ => false,
        })
        .count();
    t.preprocessing_bands.quantize(detailed, steps.len())
}

fn analysis(doc: &Value, t: &ClassifierTables) -> f64 {
    let methods = entries(doc, "analysis_methods");
    if methods.is_empty() {
        return t.empty_score;
    }
    let advanced = methods
        .iter()
        .filter(|m| m.is_object())
        .filter(|m| contains_any_ci(&field_text(m, "method_name"), &t.analysis_keywords))
        .count();
    t.analysis_bands.score_for(advanced as f64)
}

fn threats(doc: &Value, t: &ClassifierTables) -> f64 {
    let list = entries(doc, "threats");
    if list.is_empty() {
        return t.empty_score;
    }
    let detailed = list
        .iter()
        .filter(|threat| {
            entries(threat, "mitigation_strategies").len() >= t.threat_min_strategies
                && len(&field_text(threat, "description")) > t.threat_min_description_len
        })
        .count();
    t.ratio_bands.quantize(detailed, list.len())
}

fn reproducibility(doc: &Value, t: &ClassifierTables) -> f64 {
    let materials = entries(doc, "materials");
    if materials.is_empty() {
        return t.empty_score;
    }
    let archived = materials
        .iter()
        .filter(|m| contains_any_ci(&field_text(m, "location"), &t.archive_hosts))
        .count();
    t.ratio_bands.quantize(archived, materials.len())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::path::Path;

    fn write(root: &Path, rel: &str, content: &Value) {
        let path = root.join(rel);
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        std::fs::write(path, serde_json::to_string_pretty(content).unwrap()).unwrap();
    }

    fn score(root: &Path, category: Category) -> f64 {
        let pkg = StudyPackage::open(root).unwrap();
        AuthenticityScorer::default().score(&pkg, category).unwrap()
    }

    #[test]
    fn test_missing_documents_score_zero() {
        let dir = tempfile::tempdir().unwrap();
        for category in Category::ALL {
            assert_eq!(score(dir.path(), category), 0.0, "{category}");
        }
    }

    #[test]
    fn test_metadata_template_vs_real() {
        let dir = tempfile::tempdir().unwrap();
        write(
            dir.path(),
            layout::METADATA,
            &json!({"study_title": "Your Study Title", "authors": "Author Name", "institution": "Your Institution"}),
        );
        assert_eq!(score(dir.path(), Category::Metadata), 0.05);

        write(
            dir.path(),
            layout::METADATA,
            &json!({
                "study_title": "Eye movements in code comprehension",
                "authors": [{"name": "Ada Lovelace"}],
                "institution": "MIT"
            }),
        );
        assert_eq!(score(dir.path(), Category::Metadata), 0.95);

        write(
            dir.path(),
            layout::METADATA,
            &json!({"study_title": "Eye movements in code comprehension", "authors": "Researcher", "institution": "MIT"}),
        );
        assert_eq!(score(dir.path(), Category::Metadata), 0.05);
    }

    #[test]
    fn test_participants_real_and_template() {
        let dir = tempfile::tempdir().unwrap();
        write(dir.path(), layout::PARTICIPANTS, &json!({"participants": []}));
        assert_eq!(score(dir.path(), Category::Participants), 0.05);

        write(
            dir.path(),
            layout::PARTICIPANTS,
            &json!({"participants": [{"participant_id": "P001", "age": "age", "gender": "gender"}]}),
        );
        assert_eq!(score(dir.path(), Category::Participants), 0.05);

        write(
            dir.path(),
            layout::PARTICIPANTS,
            &json!({"participants": [
                {"participant_id": "P017", "age": 24, "gender": "female"},
                {"participant_id": "P018", "age": 31, "gender": "male"}
            ]}),
        );
        assert_eq!(score(dir.path(), Category::Participants), 0.90);
    }

    #[test]
    fn test_equipment_means_nonzero_subscores() {
        let dir = tempfile::tempdir().unwrap();
        write(
            dir.path(),
            layout::TRACKER_SPECS,
            &json!({"eye_tracker": {"manufacturer": "Tobii", "model": "Pro Spectrum"}}),
        );
        assert_eq!(score(dir.path(), Category::Equipment), 0.95);

        write(
            dir.path(),
            layout::SOFTWARE_ENV,
            &json!({"operating_system": {"name": "Windows 10"}}),
        );
        assert!((score(dir.path(), Category::Equipment) - 0.825).abs() < 1e-9);

        // A malformed document contributes nothing
        std::fs::write(dir.path().join(layout::SCREEN_SETUP), "not json").unwrap();
        assert!((score(dir.path(), Category::Equipment) - 0.825).abs() < 1e-9);
    }

    #[test]
    fn test_template_tracker_scores_low() {
        let dir = tempfile::tempdir().unwrap();
        write(
            dir.path(),
            layout::TRACKER_SPECS,
            &json!({"eye_tracker": {"manufacturer": "Brand", "model": "Model"}}),
        );
        assert_eq!(score(dir.path(), Category::Equipment), 0.05);
    }

    #[test]
    fn test_stimuli_bands() {
        let dir = tempfile::tempdir().unwrap();
        write(
            dir.path(),
            layout::STIMULI_METADATA,
            &json!({"stimuli": [{"stimulus_id": "S01", "programming_language": "Java"}]}),
        );
        assert_eq!(score(dir.path(), Category::Stimuli), 0.05);

        write(
            dir.path(),
            layout::STIMULI_METADATA,
            &json!({"stimuli": [{
                "stimulus_id": "bubble_sort_v2",
                "programming_language": "Python",
                "complexity_metrics": {"loc": 40, "cyclomatic": 6, "halstead": 210.5}
            }]}),
        );
        assert_eq!(score(dir.path(), Category::Stimuli), 0.95);
    }

    #[test]
    fn test_aois() {
        let dir = tempfile::tempdir().unwrap();
        write(
            dir.path(),
            layout::AOIS_DEFINITION,
            &json!({"aois": [{"aoi_id": "A01", "description": "line", "cognitive_relevance": "medium"}]}),
        );
        assert_eq!(score(dir.path(), Category::Aois), 0.05);

        write(
            dir.path(),
            layout::AOIS_DEFINITION,
            &json!({"aois": [{
                "aoi_id": "loop_header",
                "description": "The for-loop header including the bound check",
                "cognitive_relevance": "high"
            }]}),
        );
        assert_eq!(score(dir.path(), Category::Aois), 0.95);
    }

    #[test]
    fn test_preprocessing_needs_five_detailed_steps() {
        let dir = tempfile::tempdir().unwrap();
        let detailed = json!({"name": "filter", "parameters": {"a": 1, "b": 2, "c": 3}});
        let bare = json!({"name": "filter"});

        write(dir.path(), layout::PREPROCESSING, &json!({"steps": [detailed, detailed]}));
        assert_eq!(score(dir.path(), Category::Preprocessing), 0.05);

        write(
            dir.path(),
            layout::PREPROCESSING,
            &json!({"preprocessing_steps": [detailed, detailed, detailed, bare, bare]}),
        );
        assert_eq!(score(dir.path(), Category::Preprocessing), 0.70);

        write(
            dir.path(),
            layout::PREPROCESSING,
            &json!({"preprocessing_steps": [bare, bare, bare, bare, bare]}),
        );
        assert_eq!(score(dir.path(), Category::Preprocessing), 0.30);
    }

    #[test]
    fn test_analysis_counts_advanced_methods() {
        let dir = tempfile::tempdir().unwrap();
        write(
            dir.path(),
            layout::ANALYSIS,
            &json!({"analysis_methods": [
                {"method_name": "Mixed_Effects regression"},
                {"method_name": "descriptive"}
            ]}),
        );
        assert_eq!(score(dir.path(), Category::Analysis), 0.70);
    }

    #[test]
    fn test_threats_and_reproducibility() {
        let dir = tempfile::tempdir().unwrap();
        write(
            dir.path(),
            layout::VALIDITY,
            &json!({"threats": [{
                "description": "Participants were all students from a single university course.",
                "mitigation_strategies": ["a", "b", "c"]
            }]}),
        );
        assert_eq!(score(dir.path(), Category::Threats), 0.95);

        write(
            dir.path(),
            layout::REPRODUCIBILITY,
            &json!({"materials": [
                {"location": "https://osf.io/abcd"},
                {"location": "on request"}
            ]}),
        );
        assert_eq!(score(dir.path(), Category::Reproducibility), 0.70);
    }

    #[test]
    fn test_data_quality_uses_presence_rule() {
        let dir = tempfile::tempdir().unwrap();
        write(dir.path(), layout::PROTOCOL, &json!({}));
        assert_eq!(score(dir.path(), Category::DataQuality), 0.75);
    }
}
