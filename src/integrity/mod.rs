//! Cross-file referential integrity
//!
//! Walks the package, validates every invariant that spans documents and
//! collects all violations rather than stopping at the first. Records are
//! read one at a time: an unreadable record is itself a violation and the
//! rest of its document is still checked. A document that is not valid JSON
//! skips the checks that need it, with a warning.
//!
//! Checks:
//! - Stimulus ids agree between metadata, annotations and AOI definitions
//! - AOI geometry is a valid rectangle; AOI ids are unique per stimulus
//! - Results tables only mention known participants
//! - Participant records are well-formed and unique
//! - Referenced stimulus files exist under `stimuli/stimuli_raw`
//! - Equipment values are physically plausible

use crate::config::IntegrityConfig;
use crate::models::{lenient_text, Aoi, IntegrityViolation, Participant, Stimulus, ViolationKind, Vision};
use crate::package::layout;
use crate::package::StudyPackage;
use regex::Regex;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::Value;
use std::collections::{BTreeSet, HashSet};
use std::path::Path;
use std::sync::OnceLock;
use tracing::{debug, info, warn};

static PARTICIPANT_ID: OnceLock<Regex> = OnceLock::new();

fn participant_id_regex() -> &'static Regex {
    PARTICIPANT_ID.get_or_init(|| Regex::new(r"^P\d+$").expect("valid participant id regex"))
}

#[derive(Debug, Deserialize)]
struct StimulusRef {
    #[serde(default, deserialize_with = "lenient_text")]
    stimulus_id: String,
}

/// Records shared between checks, loaded once per run
struct Documents {
    stimuli: Option<Vec<Stimulus>>,
    annotations: Option<Vec<StimulusRef>>,
    aois: Option<Vec<Aoi>>,
    participants: Option<Vec<Participant>>,
}

/// File name of a layout path, used as a violation subject
fn file_name(rel: &str) -> &str {
    rel.rsplit('/').next().unwrap_or(rel)
}

/// A record's id, or `file[index]` when it has none
fn subject(id: &str, rel: &str, index: usize) -> String {
    if id.is_empty() {
        format!("{}[{index}]", file_name(rel))
    } else {
        id.to_string()
    }
}

fn non_empty_ids<'r, T>(records: &'r [T], id: impl Fn(&'r T) -> &'r str) -> BTreeSet<&'r str> {
    records.iter().map(id).filter(|id| !id.is_empty()).collect()
}

/// Runs every integrity check over one package
pub struct IntegrityChecker<'a> {
    package: &'a StudyPackage,
    config: &'a IntegrityConfig,
}

impl<'a> IntegrityChecker<'a> {
    pub fn new(package: &'a StudyPackage, config: &'a IntegrityConfig) -> Self {
        Self { package, config }
    }

    /// All violations, sorted and deduplicated
    pub fn run(&self) -> Vec<IntegrityViolation> {
        let mut violations = Vec::new();
        let docs = Documents {
            stimuli: self.load_records(layout::STIMULI_METADATA, "stimuli", &mut violations),
            annotations: self.load_records(layout::STIMULI_ANNOTATIONS, "annotations", &mut violations),
            aois: self.load_records(layout::AOIS_DEFINITION, "aois", &mut violations),
            participants: self.load_records(layout::PARTICIPANTS, "participants", &mut violations),
        };

        self.check_record_ids(&docs, &mut violations);
        self.check_stimulus_ids(&docs, &mut violations);
        self.check_aoi_geometry(&docs, &mut violations);
        self.check_participant_references(&docs, &mut violations);
        self.check_participant_records(&docs, &mut violations);
        self.check_stimulus_files(&docs, &mut violations);
        self.check_equipment(&mut violations);

        violations.sort();
        violations.dedup();
        info!("Integrity check found {} violation(s)", violations.len());
        violations
    }

    /// Records of the list under `key`, each read on its own.
    ///
    /// `None` when the document is absent or not valid JSON. Entries that
    /// cannot be read as a record are reported and left out.
    fn load_records<T: DeserializeOwned>(
        &self,
        rel: &str,
        key: &str,
        out: &mut Vec<IntegrityViolation>,
    ) -> Option<Vec<T>> {
        let doc = match self.package.read_json(rel) {
            Ok(doc) => doc?,
            Err(e) => {
                warn!("Skipping checks that need {}: {}", rel, e);
                return None;
            }
        };
        let entries = match doc.get(key) {
            None | Some(Value::Null) => return Some(Vec::new()),
            Some(Value::Array(entries)) => entries,
            Some(other) => {
                out.push(IntegrityViolation::new(
                    ViolationKind::OutOfRangeValue,
                    file_name(rel),
                    format!("'{key}' must be a list (got {other})"),
                ));
                return Some(Vec::new());
            }
        };

        let mut records = Vec::with_capacity(entries.len());
        for (index, entry) in entries.iter().enumerate() {
            match T::deserialize(entry) {
                Ok(record) => records.push(record),
                Err(e) => out.push(IntegrityViolation::new(
                    ViolationKind::OutOfRangeValue,
                    subject("", rel, index),
                    format!("unreadable {key} entry: {e}"),
                )),
            }
        }
        Some(records)
    }

    /// Records that cannot take part in cross-references because an id is missing
    fn check_record_ids(&self, docs: &Documents, out: &mut Vec<IntegrityViolation>) {
        let missing = |rel: &str, index: usize, field: &str| {
            IntegrityViolation::new(
                ViolationKind::MissingCrossReference,
                subject("", rel, index),
                format!("{field} is missing"),
            )
        };

        for (i, stimulus) in docs.stimuli.iter().flatten().enumerate() {
            if stimulus.stimulus_id.is_empty() {
                out.push(missing(layout::STIMULI_METADATA, i, "stimulus_id"));
            }
        }
        for (i, annotation) in docs.annotations.iter().flatten().enumerate() {
            if annotation.stimulus_id.is_empty() {
                out.push(missing(layout::STIMULI_ANNOTATIONS, i, "stimulus_id"));
            }
        }
        for (i, aoi) in docs.aois.iter().flatten().enumerate() {
            if aoi.aoi_id.is_empty() {
                out.push(missing(layout::AOIS_DEFINITION, i, "aoi_id"));
            }
            if aoi.stimulus_id.is_empty() {
                out.push(missing(layout::AOIS_DEFINITION, i, "stimulus_id"));
            }
        }
    }

    /// Pairwise comparisons against the stimulus metadata, each run when
    /// both of its documents are present
    fn check_stimulus_ids(&self, docs: &Documents, out: &mut Vec<IntegrityViolation>) {
        let Some(stimuli) = &docs.stimuli else {
            debug!("No stimulus metadata, skipping stimulus id checks");
            return;
        };
        let metadata_ids = non_empty_ids(stimuli, |s| s.stimulus_id.as_str());

        if let Some(annotations) = &docs.annotations {
            let annotation_ids = non_empty_ids(annotations, |a| a.stimulus_id.as_str());
            for id in metadata_ids.difference(&annotation_ids) {
                out.push(IntegrityViolation::new(
                    ViolationKind::MissingCrossReference,
                    *id,
                    "stimulus in stimuli_metadata.json has no entry in stimuli_annotations.json",
                ));
            }
            for id in annotation_ids.difference(&metadata_ids) {
                out.push(IntegrityViolation::new(
                    ViolationKind::MissingCrossReference,
                    *id,
                    "stimulus in stimuli_annotations.json has no entry in stimuli_metadata.json",
                ));
            }
        }

        let Some(aois) = &docs.aois else {
            debug!("No AOI definitions, skipping stimulus coverage check");
            return;
        };
        let aoi_ids = non_empty_ids(aois, |a| a.stimulus_id.as_str());
        for id in metadata_ids.difference(&aoi_ids) {
            if self.config.is_aoi_exempt(id) {
                continue;
            }
            out.push(IntegrityViolation::new(
                ViolationKind::MissingCrossReference,
                *id,
                "stimulus has no AOI definitions",
            ));
        }
        for (i, aoi) in aois.iter().enumerate() {
            if !aoi.stimulus_id.is_empty() && !metadata_ids.contains(aoi.stimulus_id.as_str()) {
                out.push(IntegrityViolation::new(
                    ViolationKind::MissingCrossReference,
                    subject(&aoi.aoi_id, layout::AOIS_DEFINITION, i),
                    format!("AOI references unknown stimulus '{}'", aoi.stimulus_id),
                ));
            }
        }
    }

    fn check_aoi_geometry(&self, docs: &Documents, out: &mut Vec<IntegrityViolation>) {
        let Some(aois) = &docs.aois else {
            return;
        };

        let mut seen: HashSet<(&str, &str)> = HashSet::new();
        for (i, aoi) in aois.iter().enumerate() {
            let subject = subject(&aoi.aoi_id, layout::AOIS_DEFINITION, i);
            if !aoi.aoi_id.is_empty() && !seen.insert((aoi.stimulus_id.as_str(), aoi.aoi_id.as_str())) {
                out.push(IntegrityViolation::new(
                    ViolationKind::DuplicateIdentifier,
                    subject.as_str(),
                    format!("AOI id defined more than once for stimulus '{}'", aoi.stimulus_id),
                ));
            }

            let Some(coords) = aoi.coordinates else {
                out.push(IntegrityViolation::new(
                    ViolationKind::InvalidGeometry,
                    subject.as_str(),
                    "missing coordinates",
                ));
                continue;
            };
            let fields = [
                ("x", coords.x, false),
                ("y", coords.y, false),
                ("width", coords.width, true),
                ("height", coords.height, true),
            ];
            for (name, value, strictly_positive) in fields {
                let detail = match value {
                    None => format!("{name} is missing or not a number"),
                    Some(v) if strictly_positive && v <= 0.0 => format!("{name} must be > 0 (got {v})"),
                    Some(v) if v < 0.0 => format!("{name} must be >= 0 (got {v})"),
                    Some(_) => continue,
                };
                out.push(IntegrityViolation::new(
                    ViolationKind::InvalidGeometry,
                    subject.as_str(),
                    detail,
                ));
            }
        }
    }

    fn check_participant_references(&self, docs: &Documents, out: &mut Vec<IntegrityViolation>) {
        let Some(participants) = &docs.participants else {
            debug!("No participants document, skipping results table references");
            return;
        };
        let known: HashSet<&str> = participants.iter().map(|p| p.participant_id.as_str()).collect();

        for table in self.package.list_files(layout::RESULTS_TABLES, "csv") {
            let ids = match participant_ids_in_csv(&table) {
                Ok(Some(ids)) => ids,
                Ok(None) => continue,
                Err(e) => {
                    debug!("Skipping unreadable table {}: {}", table.display(), e);
                    continue;
                }
            };
            let name = table
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_default();
            for id in ids.iter().filter(|id| !known.contains(id.as_str())) {
                out.push(IntegrityViolation::new(
                    ViolationKind::MissingCrossReference,
                    id.as_str(),
                    format!("participant in {name} is not listed in participants.json"),
                ));
            }
        }
    }

    fn check_participant_records(&self, docs: &Documents, out: &mut Vec<IntegrityViolation>) {
        let Some(participants) = &docs.participants else {
            return;
        };

        let mut seen: HashSet<&str> = HashSet::new();
        for (i, p) in participants.iter().enumerate() {
            let subject = subject(&p.participant_id, layout::PARTICIPANTS, i);
            if !p.participant_id.is_empty() && !seen.insert(p.participant_id.as_str()) {
                out.push(IntegrityViolation::new(
                    ViolationKind::DuplicateIdentifier,
                    subject.as_str(),
                    "participant id listed more than once",
                ));
            }
            if !participant_id_regex().is_match(&p.participant_id) {
                out.push(IntegrityViolation::new(
                    ViolationKind::OutOfRangeValue,
                    subject.as_str(),
                    "participant id must be 'P' followed by digits",
                ));
            }
            if let Some(age) = p.age.filter(|a| *a < 0) {
                out.push(IntegrityViolation::new(
                    ViolationKind::OutOfRangeValue,
                    subject.as_str(),
                    format!("age must be >= 0 (got {age})"),
                ));
            }
            if let Some(years) = p.experience_years.filter(|y| *y < 0) {
                out.push(IntegrityViolation::new(
                    ViolationKind::OutOfRangeValue,
                    subject.as_str(),
                    format!("experience_years must be >= 0 (got {years})"),
                ));
            }
            if let Some(vision) = p.vision.as_deref().filter(|v| Vision::parse(v).is_none()) {
                out.push(IntegrityViolation::new(
                    ViolationKind::OutOfRangeValue,
                    subject.as_str(),
                    format!("vision '{vision}' is not one of none, glasses, contact_lenses, unknown, other"),
                ));
            }
            let mut languages: HashSet<String> = HashSet::new();
            for language in &p.programming_languages {
                if !languages.insert(language.to_lowercase()) {
                    out.push(IntegrityViolation::new(
                        ViolationKind::DuplicateIdentifier,
                        subject.as_str(),
                        format!("programming language '{language}' listed more than once"),
                    ));
                }
            }
        }
    }

    fn check_stimulus_files(&self, docs: &Documents, out: &mut Vec<IntegrityViolation>) {
        let Some(stimuli) = &docs.stimuli else {
            return;
        };
        let raw_dir = self.package.path(layout::STIMULI_RAW);
        if !raw_dir.is_dir() {
            debug!("No {} directory, skipping stimulus file check", layout::STIMULI_RAW);
            return;
        }
        for (i, stimulus) in stimuli.iter().enumerate() {
            let Some(file_name) = stimulus.file_name.as_deref().filter(|f| !f.is_empty()) else {
                continue;
            };
            if !raw_dir.join(file_name).exists() {
                out.push(IntegrityViolation::new(
                    ViolationKind::MissingCrossReference,
                    subject(&stimulus.stimulus_id, layout::STIMULI_METADATA, i),
                    format!("stimulus file '{file_name}' not found in {}", layout::STIMULI_RAW),
                ));
            }
        }
    }

    fn check_equipment(&self, out: &mut Vec<IntegrityViolation>) {
        for rel in layout::EQUIPMENT_DOCUMENTS {
            let doc = match self.package.read_json(rel) {
                Ok(Some(doc)) => doc,
                Ok(None) => continue,
                Err(e) => {
                    warn!("Skipping equipment checks for {}: {}", rel, e);
                    continue;
                }
            };
            let subject = file_name(rel);
            check_equipment_values(subject, "", &doc, out);
            if let Some(obj) = doc.as_object() {
                for (key, nested) in obj.iter().filter(|(_, v)| v.is_object()) {
                    check_equipment_values(subject, &format!("{key}."), nested, out);
                }
            }
        }
    }
}

/// Validate the physical quantities directly inside one JSON object
fn check_equipment_values(subject: &str, prefix: &str, doc: &Value, out: &mut Vec<IntegrityViolation>) {
    let positive = |v: &Value| v.as_f64().is_some_and(|n| n > 0.0);

    for key in ["sampling_rate_hz", "distance_cm"] {
        if let Some(value) = doc.get(key).filter(|v| !positive(*v)) {
            out.push(IntegrityViolation::new(
                ViolationKind::OutOfRangeValue,
                subject,
                format!("{prefix}{key} must be a positive number (got {value})"),
            ));
        }
    }

    if let Some(resolution) = doc.get("resolution_px") {
        let valid = resolution
            .as_array()
            .is_some_and(|r| r.len() == 2 && r.iter().all(positive));
        if !valid {
            out.push(IntegrityViolation::new(
                ViolationKind::OutOfRangeValue,
                subject,
                format!("{prefix}resolution_px must be two positive numbers (got {resolution})"),
            ));
        }
    }
}

/// Distinct values of the `participant_id` column, `None` if there is no such column
fn participant_ids_in_csv(path: &Path) -> anyhow::Result<Option<BTreeSet<String>>> {
    let mut reader = csv::Reader::from_path(path)?;
    let Some(column) = reader
        .headers()?
        .iter()
        .position(|h| h.trim() == "participant_id")
    else {
        return Ok(None);
    };
    let mut ids = BTreeSet::new();
    for record in reader.records() {
        let record = record?;
        if let Some(id) = record.get(column).map(str::trim).filter(|id| !id.is_empty()) {
            ids.insert(id.to_string());
        }
    }
    Ok(Some(ids))
}

/// Run every integrity check over a package
pub fn check_package(package: &StudyPackage, config: &IntegrityConfig) -> Vec<IntegrityViolation> {
    IntegrityChecker::new(package, config).run()
}
