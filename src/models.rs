//! Core data models for replet
//!
//! These models are shared by the reader, the scorers, the integrity
//! checker and the reporters.

use anyhow::anyhow;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use std::str::FromStr;

/// The ten fixed reproducibility categories, in canonical report order.
///
/// `Ord` follows declaration order, so a `BTreeMap<Category, _>` iterates
/// in the order every report uses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Category {
    Metadata,
    Participants,
    Equipment,
    Stimuli,
    Aois,
    DataQuality,
    Preprocessing,
    Analysis,
    Threats,
    Reproducibility,
}

impl Category {
    pub const ALL: [Category; 10] = [
        Category::Metadata,
        Category::Participants,
        Category::Equipment,
        Category::Stimuli,
        Category::Aois,
        Category::DataQuality,
        Category::Preprocessing,
        Category::Analysis,
        Category::Threats,
        Category::Reproducibility,
    ];

    /// Machine name used in JSON reports
    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Metadata => "metadata",
            Category::Participants => "participants",
            Category::Equipment => "equipment",
            Category::Stimuli => "stimuli",
            Category::Aois => "aois",
            Category::DataQuality => "data_quality",
            Category::Preprocessing => "preprocessing",
            Category::Analysis => "analysis",
            Category::Threats => "threats",
            Category::Reproducibility => "reproducibility",
        }
    }

    /// Human-readable name for checklists and tables
    pub fn label(&self) -> &'static str {
        match self {
            Category::Metadata => "Study Metadata",
            Category::Participants => "Participant Info",
            Category::Equipment => "Equipment",
            Category::Stimuli => "Stimuli",
            Category::Aois => "AOIs",
            Category::DataQuality => "Data Quality",
            Category::Preprocessing => "Preprocessing",
            Category::Analysis => "Analysis",
            Category::Threats => "Validity",
            Category::Reproducibility => "Reproducibility",
        }
    }

    /// Two-line axis label for the radar chart
    pub fn axis_label(&self) -> [&'static str; 2] {
        match self {
            Category::Metadata => ["Study", "Metadata"],
            Category::Participants => ["Participant", "Info"],
            Category::Equipment => ["Equipment", "Specs"],
            Category::Stimuli => ["Stimuli", "& Materials"],
            Category::Aois => ["Areas of", "Interest"],
            Category::DataQuality => ["Data Quality", "& Collection"],
            Category::Preprocessing => ["Data", "Preprocessing"],
            Category::Analysis => ["Statistical", "Analysis"],
            Category::Threats => ["Validity", "Threats"],
            Category::Reproducibility => ["Reproducibility", "Materials"],
        }
    }
}

impl std::fmt::Display for Category {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Category {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Category::ALL
            .iter()
            .copied()
            .find(|c| c.as_str() == s.to_lowercase())
            .ok_or_else(|| anyhow!("Unknown category '{}'", s))
    }
}

/// A single category's score, always within [0, 1]
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CategoryScore {
    pub category: Category,
    pub value: f64,
}

impl CategoryScore {
    /// Build a score, clipping into [0, 1]. NaN becomes 0.
    pub fn new(category: Category, value: f64) -> Self {
        let value = if value.is_nan() { 0.0 } else { value.clamp(0.0, 1.0) };
        Self { category, value }
    }
}

/// Which scoring philosophy produced a report
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum ScoringStrategy {
    /// Partial credit for each expected artifact found
    #[default]
    Presence,
    /// Full credit only when content looks like real study data
    Authenticity,
}

impl FromStr for ScoringStrategy {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "presence" => Ok(ScoringStrategy::Presence),
            "authenticity" | "content" => Ok(ScoringStrategy::Authenticity),
            _ => Err(anyhow!(
                "Unknown strategy '{}'. Valid strategies: presence, authenticity",
                s
            )),
        }
    }
}

impl std::fmt::Display for ScoringStrategy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ScoringStrategy::Presence => write!(f, "presence"),
            ScoringStrategy::Authenticity => write!(f, "authenticity"),
        }
    }
}

/// Compliance tier derived from the fraction of complete categories
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ComplianceStatus {
    Starting,
    InProgress,
    Complete,
}

impl std::fmt::Display for ComplianceStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ComplianceStatus::Starting => write!(f, "Starting"),
            ComplianceStatus::InProgress => write!(f, "In Progress"),
            ComplianceStatus::Complete => write!(f, "Complete"),
        }
    }
}

/// Aggregated assessment of one study package
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComplianceReport {
    pub strategy: ScoringStrategy,
    /// Always exactly ten entries, one per [`Category`]
    pub scores: BTreeMap<Category, f64>,
    pub overall: f64,
    pub compliant_count: usize,
    /// `compliant_count / 10`, in [0, 1]
    pub compliance_ratio: f64,
    pub status: ComplianceStatus,
    pub status_detail: String,
}

impl ComplianceReport {
    pub fn score(&self, category: Category) -> f64 {
        self.scores.get(&category).copied().unwrap_or(0.0)
    }

    pub fn category_scores(&self) -> Vec<CategoryScore> {
        Category::ALL
            .iter()
            .map(|c| CategoryScore::new(*c, self.score(*c)))
            .collect()
    }
}

/// Kinds of cross-file problems the integrity checker reports
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum ViolationKind {
    MissingCrossReference,
    InvalidGeometry,
    OutOfRangeValue,
    DuplicateIdentifier,
}

impl std::fmt::Display for ViolationKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ViolationKind::MissingCrossReference => write!(f, "missing-cross-reference"),
            ViolationKind::InvalidGeometry => write!(f, "invalid-geometry"),
            ViolationKind::OutOfRangeValue => write!(f, "out-of-range-value"),
            ViolationKind::DuplicateIdentifier => write!(f, "duplicate-identifier"),
        }
    }
}

/// One violated cross-file invariant. Never blocks scoring.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct IntegrityViolation {
    pub kind: ViolationKind,
    pub subject_id: String,
    pub detail: String,
}

impl IntegrityViolation {
    pub fn new(kind: ViolationKind, subject_id: impl Into<String>, detail: impl Into<String>) -> Self {
        Self {
            kind,
            subject_id: subject_id.into(),
            detail: detail.into(),
        }
    }
}

/// Corrective vision reported for a participant
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Vision {
    None,
    Glasses,
    ContactLenses,
    Unknown,
    Other,
}

impl Vision {
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "none" => Some(Vision::None),
            "glasses" => Some(Vision::Glasses),
            "contact_lenses" => Some(Vision::ContactLenses),
            "unknown" => Some(Vision::Unknown),
            "other" => Some(Vision::Other),
            _ => None,
        }
    }
}

/// A participant record from `participants/participants.json`
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Participant {
    #[serde(default, deserialize_with = "lenient_text")]
    pub participant_id: String,
    #[serde(default, deserialize_with = "lenient_integer")]
    pub age: Option<i64>,
    #[serde(default, deserialize_with = "lenient_optional_text")]
    pub gender: Option<String>,
    #[serde(default, deserialize_with = "lenient_optional_text")]
    pub handedness: Option<String>,
    #[serde(default, deserialize_with = "lenient_optional_text")]
    pub vision: Option<String>,
    #[serde(default, deserialize_with = "lenient_integer")]
    pub experience_years: Option<i64>,
    #[serde(default, deserialize_with = "lenient_text_list")]
    pub programming_languages: Vec<String>,
}

/// A stimulus record from `stimuli/stimuli_metadata.json`
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Stimulus {
    #[serde(default, deserialize_with = "lenient_text")]
    pub stimulus_id: String,
    #[serde(default, rename = "type", deserialize_with = "lenient_optional_text")]
    pub kind: Option<String>,
    #[serde(default, deserialize_with = "lenient_optional_text")]
    pub description: Option<String>,
    #[serde(default, deserialize_with = "lenient_optional_text")]
    pub file_name: Option<String>,
}

/// Rectangle of an AOI in stimulus pixel space
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    #[serde(default, deserialize_with = "lenient_number")]
    pub x: Option<f64>,
    #[serde(default, deserialize_with = "lenient_number")]
    pub y: Option<f64>,
    #[serde(default, deserialize_with = "lenient_number")]
    pub width: Option<f64>,
    #[serde(default, deserialize_with = "lenient_number")]
    pub height: Option<f64>,
}

/// Accept any JSON value; only numbers survive. Keeps one bad field from
/// rejecting the whole document.
fn lenient_number<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<f64>, D::Error> {
    Ok(Option::<Value>::deserialize(deserializer)?.and_then(|v| v.as_f64()))
}

/// Integers, or numeric strings such as `"24"`
fn lenient_integer<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<i64>, D::Error> {
    Ok(match Option::<Value>::deserialize(deserializer)? {
        Some(Value::Number(n)) => n.as_i64(),
        Some(Value::String(s)) => s.trim().parse().ok(),
        _ => None,
    })
}

/// Text of a scalar: strings as-is, numbers and booleans rendered
fn scalar_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

/// Identifier fields: `7` reads as `"7"`, `null` or a non-scalar as empty
pub(crate) fn lenient_text<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
    Ok(Option::<Value>::deserialize(deserializer)?
        .as_ref()
        .and_then(scalar_text)
        .unwrap_or_default())
}

fn lenient_optional_text<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<String>, D::Error> {
    Ok(Option::<Value>::deserialize(deserializer)?
        .as_ref()
        .and_then(scalar_text))
}

/// Scalar items of a list; anything else is dropped
fn lenient_text_list<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<String>, D::Error> {
    Ok(match Option::<Value>::deserialize(deserializer)? {
        Some(Value::Array(items)) => items.iter().filter_map(scalar_text).collect(),
        _ => Vec::new(),
    })
}

/// Coordinates only when given as an object
fn lenient_coordinates<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<Coordinates>, D::Error> {
    Ok(Option::<Value>::deserialize(deserializer)?
        .filter(Value::is_object)
        .and_then(|v| serde_json::from_value(v).ok()))
}

/// An area of interest from `aois/aois_definition.json`
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Aoi {
    #[serde(default, deserialize_with = "lenient_text")]
    pub aoi_id: String,
    #[serde(default, deserialize_with = "lenient_text")]
    pub stimulus_id: String,
    #[serde(default, deserialize_with = "lenient_optional_text")]
    pub label: Option<String>,
    #[serde(default, deserialize_with = "lenient_optional_text")]
    pub shape: Option<String>,
    #[serde(default, deserialize_with = "lenient_coordinates")]
    pub coordinates: Option<Coordinates>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_category_order_is_canonical() {
        let names: Vec<&str> = Category::ALL.iter().map(|c| c.as_str()).collect();
        assert_eq!(
            names,
            vec![
                "metadata",
                "participants",
                "equipment",
                "stimuli",
                "aois",
                "data_quality",
                "preprocessing",
                "analysis",
                "threats",
                "reproducibility"
            ]
        );
        let mut sorted = Category::ALL.to_vec();
        sorted.sort();
        assert_eq!(sorted, Category::ALL.to_vec());
    }

    #[test]
    fn test_category_serializes_snake_case() {
        let json = serde_json::to_string(&Category::DataQuality).unwrap();
        assert_eq!(json, "\"data_quality\"");
        assert_eq!("DATA_QUALITY".parse::<Category>().unwrap(), Category::DataQuality);
        assert!("gaze".parse::<Category>().is_err());
    }

    #[test]
    fn test_category_score_clips() {
        assert_eq!(CategoryScore::new(Category::Aois, 1.7).value, 1.0);
        assert_eq!(CategoryScore::new(Category::Aois, -0.2).value, 0.0);
        assert_eq!(CategoryScore::new(Category::Aois, f64::NAN).value, 0.0);
    }

    #[test]
    fn test_strategy_parsing() {
        assert_eq!("Presence".parse::<ScoringStrategy>().unwrap(), ScoringStrategy::Presence);
        assert_eq!(
            "authenticity".parse::<ScoringStrategy>().unwrap(),
            ScoringStrategy::Authenticity
        );
        assert!("random".parse::<ScoringStrategy>().is_err());
    }

    #[test]
    fn test_records_tolerate_off_type_fields() {
        let p: Participant = serde_json::from_value(serde_json::json!({
            "participant_id": 7,
            "gender": null,
            "vision": ["glasses"],
            "programming_languages": ["Rust", 3, {"name": "Go"}]
        }))
        .unwrap();
        assert_eq!(p.participant_id, "7");
        assert_eq!(p.gender, None);
        assert_eq!(p.vision, None);
        assert_eq!(p.programming_languages, vec!["Rust", "3"]);

        let aoi: Aoi = serde_json::from_value(serde_json::json!({
            "aoi_id": null,
            "stimulus_id": "S01",
            "coordinates": "top left"
        }))
        .unwrap();
        assert!(aoi.aoi_id.is_empty());
        assert!(aoi.coordinates.is_none());
    }

    #[test]
    fn test_vision_parse() {
        assert_eq!(Vision::parse("Contact_Lenses"), Some(Vision::ContactLenses));
        assert_eq!(Vision::parse("normal"), None);
    }

    #[test]
    fn test_non_numeric_fields_become_none() {
        let aoi: Aoi = serde_json::from_value(serde_json::json!({
            "aoi_id": "S01_A1",
            "stimulus_id": "S01",
            "coordinates": {"x": "left", "y": 0, "width": 10, "height": 10}
        }))
        .unwrap();
        assert_eq!(aoi.coordinates.unwrap().x, None);

        let p: Participant = serde_json::from_value(serde_json::json!({
            "participant_id": "P01",
            "age": "24",
            "experience_years": "lots"
        }))
        .unwrap();
        assert_eq!(p.age, Some(24));
        assert_eq!(p.experience_years, None);
    }

    #[test]
    fn test_aoi_deserializes_partial_coordinates() {
        let aoi: Aoi = serde_json::from_value(serde_json::json!({
            "aoi_id": "S01_A1",
            "stimulus_id": "S01",
            "coordinates": {"x": 10, "y": 20, "width": 100}
        }))
        .unwrap();
        let coords = aoi.coordinates.unwrap();
        assert_eq!(coords.width, Some(100.0));
        assert_eq!(coords.height, None);
    }
}
