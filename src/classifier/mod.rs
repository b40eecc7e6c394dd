//! Authenticity classifier
//!
//! Decides whether a single field value looks like real study data or like
//! an unfilled scaffold:
//! - Free text (titles, names, descriptions)
//! - Identifiers (participant ids)
//! - Numbers with a plausible range (age)
//! - Enumerations with an allow-list (gender)
//!
//! Classification is deterministic and side-effect free. All lists and
//! ranges come from [`ClassifierTables`].

pub mod tables;

pub use tables::{ClassifierTables, ParticipantRule, ScoreBands, Verdicts};

use serde_json::Value;

/// Verdict for a single field
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Classification {
    /// Placeholder content from an unfilled scaffold
    Template,
    /// Plausible real study data
    Real,
    /// Neither clearly real nor clearly placeholder
    Mixed,
}

/// How a field should be judged
#[derive(Debug, Clone, Copy)]
pub enum FieldKind<'a> {
    /// Free text with a minimum trimmed length
    FreeText { min_len: usize },
    Identifier,
    /// Number (or numeric string) that must fall inside `[min, max]`
    Numeric {
        min: f64,
        max: f64,
        /// Reject fractional values
        whole: bool,
        /// Exact values a scaffold ships with
        placeholders: &'a [String],
    },
    Enumerated {
        allowed: &'a [String],
        placeholders: &'a [String],
    },
}

impl ClassifierTables {
    pub fn text_kind(&self) -> FieldKind<'_> {
        FieldKind::FreeText {
            min_len: self.min_text_len,
        }
    }

    pub fn age_kind(&self) -> FieldKind<'_> {
        FieldKind::Numeric {
            min: self.age_range.0,
            max: self.age_range.1,
            whole: true,
            placeholders: &self.age_placeholders,
        }
    }

    pub fn gender_kind(&self) -> FieldKind<'_> {
        FieldKind::Enumerated {
            allowed: &self.gender_allowed,
            placeholders: &self.gender_placeholders,
        }
    }
}

/// Classify one field value
pub fn classify(value: &Value, kind: FieldKind<'_>, tables: &ClassifierTables) -> Classification {
    match kind {
        FieldKind::FreeText { min_len } => classify_text(&value_text(value), min_len, tables),
        FieldKind::Identifier => classify_identifier(&value_text(value), tables),
        FieldKind::Numeric {
            min,
            max,
            whole,
            placeholders,
        } => {
            if placeholders.iter().any(|p| p == value_text(value).trim()) {
                return Classification::Template;
            }
            match value_number(value) {
                Some(n) if whole && n.fract() != 0.0 => Classification::Template,
                Some(n) if n >= min && n <= max => Classification::Real,
                _ => Classification::Template,
            }
        }
        FieldKind::Enumerated {
            allowed,
            placeholders,
        } => {
            let text = value_text(value);
            let text = text.trim();
            if placeholders.iter().any(|p| p == text) {
                Classification::Template
            } else if allowed.iter().any(|a| a.eq_ignore_ascii_case(text)) {
                Classification::Real
            } else {
                Classification::Mixed
            }
        }
    }
}

fn classify_text(text: &str, min_len: usize, tables: &ClassifierTables) -> Classification {
    let text = text.trim();
    if text.is_empty()
        || contains_any_ci(text, &tables.placeholder_text)
        || text.chars().count() < min_len
        || tables
            .generic_tokens
            .iter()
            .any(|g| g.eq_ignore_ascii_case(text))
    {
        return Classification::Template;
    }
    Classification::Real
}

fn classify_identifier(text: &str, tables: &ClassifierTables) -> Classification {
    let text = text.trim();
    if tables.placeholder_ids.iter().any(|p| p == text) {
        Classification::Template
    } else if text.chars().count() > 1 {
        Classification::Real
    } else {
        Classification::Mixed
    }
}

/// Case-insensitive substring test against a list of needles
pub fn contains_any_ci(haystack: &str, needles: &[String]) -> bool {
    let lower = haystack.to_lowercase();
    needles
        .iter()
        .any(|n| !n.is_empty() && lower.contains(&n.to_lowercase()))
}

/// Flatten a JSON value into the text the heuristics inspect.
///
/// Lists are joined with ", ", objects contribute their `name` field.
pub fn value_text(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        Value::Bool(b) => b.to_string(),
        Value::Number(n) => n.to_string(),
        Value::Array(items) => items
            .iter()
            .map(value_text)
            .filter(|s| !s.is_empty())
            .collect::<Vec<_>>()
            .join(", "),
        Value::Object(map) => map.get("name").map(value_text).unwrap_or_default(),
    }
}

fn value_number(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok().filter(|n| n.is_finite()),
        _ => None,
    }
}

/// Running count of classifications
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Tally {
    pub real: usize,
    pub template: usize,
    pub mixed: usize,
}

impl Tally {
    pub fn record(&mut self, classification: Classification) {
        match classification {
            Classification::Real => self.real += 1,
            Classification::Template => self.template += 1,
            Classification::Mixed => self.mixed += 1,
        }
    }

    /// Record a plain pass/fail check
    pub fn check(&mut self, passed: bool) {
        self.record(if passed {
            Classification::Real
        } else {
            Classification::Template
        });
    }

    pub fn total(&self) -> usize {
        self.real + self.template + self.mixed
    }

    pub fn real_ratio(&self) -> f64 {
        match self.total() {
            0 => 0.0,
            total => self.real as f64 / total as f64,
        }
    }
}
