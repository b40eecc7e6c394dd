//! Data tables driving the authenticity heuristics
//!
//! Every placeholder list, brand list, plausible range and score band the
//! authenticity scorer uses lives here, so the heuristics can be tuned and
//! tested without touching scoring code.

use crate::config::ClassifierConfig;

/// Ordered `(min, score)` steps plus a floor.
///
/// Steps are checked top to bottom; the first whose `min` is reached wins.
#[derive(Debug, Clone, PartialEq)]
pub struct ScoreBands {
    pub steps: Vec<(f64, f64)>,
    pub floor: f64,
}

impl ScoreBands {
    pub fn new(steps: &[(f64, f64)], floor: f64) -> Self {
        Self {
            steps: steps.to_vec(),
            floor,
        }
    }

    /// Score for a raw measure (a ratio or a count)
    pub fn score_for(&self, measure: f64) -> f64 {
        self.steps
            .iter()
            .find(|(min, _)| measure >= *min)
            .map(|(_, score)| *score)
            .unwrap_or(self.floor)
    }

    /// Score for `real / total`; zero checks yield the floor
    pub fn quantize(&self, real: usize, total: usize) -> f64 {
        if total == 0 {
            return self.floor;
        }
        self.score_for(real as f64 / total as f64)
    }
}

/// Scores assigned by the per-document verdicts
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Verdicts {
    /// Content looks like real study data
    pub real: f64,
    /// Content is filled in but not recognisably real
    pub partial: f64,
    /// Content is an unfilled scaffold
    pub template: f64,
}

/// Thresholds for the participant verdict
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ParticipantRule {
    /// Fraction of checks that must be real for `real_score`
    pub real_fraction: f64,
    /// Fraction of template checks that yields `template_score`
    pub template_fraction: f64,
    pub real_score: f64,
    pub majority_score: f64,
    pub template_score: f64,
    pub mixed_score: f64,
}

impl ParticipantRule {
    pub fn score(&self, real: usize, template: usize, total: usize) -> f64 {
        let total = total as f64;
        if real as f64 >= total * self.real_fraction {
            self.real_score
        } else if real > template {
            self.majority_score
        } else if template as f64 >= total * self.template_fraction {
            self.template_score
        } else {
            self.mixed_score
        }
    }
}

/// All classifier tables
#[derive(Debug, Clone, PartialEq)]
pub struct ClassifierTables {
    /// Case-insensitive fragments marking free text as template content
    pub placeholder_text: Vec<String>,
    /// Whole-value tokens too generic to be real free text
    pub generic_tokens: Vec<String>,
    pub generic_authors: Vec<String>,
    pub min_text_len: usize,

    pub placeholder_ids: Vec<String>,
    pub age_range: (f64, f64),
    /// Ages a scaffold ships with; matched against the value as text
    pub age_placeholders: Vec<String>,
    pub gender_allowed: Vec<String>,
    pub gender_placeholders: Vec<String>,

    pub equipment_placeholders: Vec<String>,
    pub tracker_brands: Vec<String>,
    pub monitor_brands: Vec<String>,
    /// Manufacturer and model must both be longer than this for a real tracker
    pub tracker_min_name_len: usize,

    pub stimulus_placeholder_ids: Vec<String>,
    pub language_placeholders: Vec<String>,
    pub min_complexity_metrics: usize,

    pub aoi_placeholder_prefix: String,
    pub aoi_min_id_len: usize,
    pub aoi_min_description_len: usize,
    pub aoi_placeholder_relevance: String,

    pub preprocessing_min_steps: usize,
    pub step_min_parameters: usize,

    pub analysis_keywords: Vec<String>,

    pub threat_min_strategies: usize,
    pub threat_min_description_len: usize,

    pub archive_hosts: Vec<String>,

    pub verdicts: Verdicts,
    /// Score for a present document with no entries
    pub empty_score: f64,
    pub participants: ParticipantRule,
    pub stimuli_bands: ScoreBands,
    pub ratio_bands: ScoreBands,
    pub preprocessing_bands: ScoreBands,
    /// Keyed on the number of advanced methods, not a ratio
    pub analysis_bands: ScoreBands,
}

fn strings(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

impl Default for ClassifierTables {
    fn default() -> Self {
        Self {
            placeholder_text: strings(&[
                "Your Study Title",
                "Author Name",
                "Your Institution",
                "Study Title Here",
                "Enter study title",
                "Template",
                "Example Study",
                "Sample Study",
            ]),
            generic_tokens: strings(&["test", "demo", "study"]),
            generic_authors: strings(&["author", "researcher"]),
            min_text_len: 5,

            placeholder_ids: strings(&["", "ID", "participant_id", "1", "001", "P001", "Subject1"]),
            age_range: (15.0, 80.0),
            age_placeholders: strings(&["", "age", "25", "30"]),
            gender_allowed: strings(&["male", "female", "other", "non-binary"]),
            gender_placeholders: strings(&["", "gender", "M", "F"]),

            equipment_placeholders: strings(&["Template", "Example", "Your Tracker", "Brand", "Model"]),
            tracker_brands: strings(&["tobii", "eyelink", "gazepoint", "pupil", "smart eye"]),
            monitor_brands: strings(&["dell", "samsung", "lg", "asus", "acer", "hp"]),
            tracker_min_name_len: 3,

            stimulus_placeholder_ids: strings(&["s01", "s02", "template", "example"]),
            language_placeholders: strings(&["", "language", "java"]),
            min_complexity_metrics: 2,

            aoi_placeholder_prefix: "a0".to_string(),
            aoi_min_id_len: 3,
            aoi_min_description_len: 20,
            aoi_placeholder_relevance: "medium".to_string(),

            preprocessing_min_steps: 5,
            step_min_parameters: 2,

            analysis_keywords: strings(&[
                "cognitive_load",
                "multimodal",
                "machine_learning",
                "mixed_effects",
                "sequence_analysis",
                "classification",
                "synchrony",
                "frequency",
                "statistical",
            ]),

            threat_min_strategies: 3,
            threat_min_description_len: 50,

            archive_hosts: strings(&["github.com", "osf.io", "zenodo", "protocols.io"]),

            verdicts: Verdicts {
                real: 0.95,
                partial: 0.70,
                template: 0.05,
            },
            empty_score: 0.05,
            participants: ParticipantRule {
                real_fraction: 0.7,
                template_fraction: 0.5,
                real_score: 0.90,
                majority_score: 0.60,
                template_score: 0.05,
                mixed_score: 0.30,
            },
            stimuli_bands: ScoreBands::new(&[(0.8, 0.95), (0.5, 0.70), (0.2, 0.30)], 0.05),
            ratio_bands: ScoreBands::new(&[(0.8, 0.95), (0.5, 0.70)], 0.05),
            preprocessing_bands: ScoreBands::new(&[(0.8, 0.95), (0.5, 0.70)], 0.30),
            analysis_bands: ScoreBands::new(&[(3.0, 0.95), (1.0, 0.70)], 0.05),
        }
    }
}

fn extend_unique(target: &mut Vec<String>, extra: &[String]) {
    for item in extra {
        if !target.iter().any(|t| t.eq_ignore_ascii_case(item)) {
            target.push(item.clone());
        }
    }
}

impl ClassifierTables {
    /// Built-in tables plus the entries from a `[classifier]` config section
    pub fn from_config(config: &ClassifierConfig) -> Self {
        let mut tables = Self::default();
        tables.extend_from(config);
        tables
    }

    pub fn extend_from(&mut self, config: &ClassifierConfig) {
        extend_unique(&mut self.placeholder_text, &config.placeholder_text);
        extend_unique(&mut self.placeholder_ids, &config.placeholder_ids);
        extend_unique(&mut self.tracker_brands, &config.tracker_brands);
        extend_unique(&mut self.monitor_brands, &config.monitor_brands);
        extend_unique(&mut self.archive_hosts, &config.archive_hosts);
        extend_unique(&mut self.analysis_keywords, &config.analysis_keywords);
    }
}
