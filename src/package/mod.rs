//! Study package reader
//!
//! A [`StudyPackage`] is a read-only handle over a package directory. It
//! never fails for a missing file: absence is a value, not an error. A
//! present file that does not parse as JSON yields
//! [`PackageError::Malformed`], which callers turn into a zero score.

pub mod layout;

use crate::models::Category;
use ignore::WalkBuilder;
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::debug;

/// Errors raised while reading a study package
#[derive(Debug, Error)]
pub enum PackageError {
    #[error("package root does not exist: {0}")]
    MissingRoot(PathBuf),

    #[error("package root is not a directory: {0}")]
    NotADirectory(PathBuf),

    #[error("malformed document {path}: {reason}")]
    Malformed { path: PathBuf, reason: String },

    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Parsed state of one canonical document
#[derive(Debug, Clone, PartialEq)]
pub enum DocumentState {
    Missing,
    Malformed(String),
    Parsed(Value),
}

impl DocumentState {
    pub fn is_present(&self) -> bool {
        !matches!(self, DocumentState::Missing)
    }

    pub fn value(&self) -> Option<&Value> {
        match self {
            DocumentState::Parsed(v) => Some(v),
            _ => None,
        }
    }
}

/// Everything on disk that belongs to one category
#[derive(Debug, Clone)]
pub struct CategoryArtifacts {
    pub category: Category,
    /// `(relative path, state)` in layout order
    pub documents: Vec<(&'static str, DocumentState)>,
    /// `(relative path, entry count)`; 0 when the directory is absent
    pub directories: Vec<(&'static str, usize)>,
}

impl CategoryArtifacts {
    pub fn document(&self, rel: &str) -> Option<&DocumentState> {
        self.documents.iter().find(|(p, _)| *p == rel).map(|(_, s)| s)
    }

    pub fn documents_present(&self) -> usize {
        self.documents.iter().filter(|(_, s)| s.is_present()).count()
    }

    pub fn directory_entries(&self, rel: &str) -> usize {
        self.directories
            .iter()
            .find(|(p, _)| *p == rel)
            .map(|(_, n)| *n)
            .unwrap_or(0)
    }
}

/// Read-only handle over a study package directory
#[derive(Debug, Clone)]
pub struct StudyPackage {
    root: PathBuf,
}

impl StudyPackage {
    /// Open a package. Fails only if the root is missing or not a directory.
    pub fn open(root: impl AsRef<Path>) -> Result<Self, PackageError> {
        let root = root.as_ref();
        if !root.exists() {
            return Err(PackageError::MissingRoot(root.to_path_buf()));
        }
        if !root.is_dir() {
            return Err(PackageError::NotADirectory(root.to_path_buf()));
        }
        Ok(Self {
            root: root.to_path_buf(),
        })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn path(&self, rel: &str) -> PathBuf {
        self.root.join(rel)
    }

    pub fn exists(&self, rel: &str) -> bool {
        self.path(rel).exists()
    }

    /// Number of entries in a directory, 0 if it is absent or unreadable
    pub fn entry_count(&self, rel_dir: &str) -> usize {
        let dir = self.path(rel_dir);
        if !dir.is_dir() {
            return 0;
        }
        match std::fs::read_dir(&dir) {
            Ok(entries) => entries.filter_map(|e| e.ok()).count(),
            Err(e) => {
                debug!("Cannot list {}: {}", dir.display(), e);
                0
            }
        }
    }

    /// Read and parse a JSON document.
    ///
    /// `Ok(None)` when the file is absent, `Err(Malformed)` when it exists
    /// but is not valid JSON.
    pub fn read_json(&self, rel: &str) -> Result<Option<Value>, PackageError> {
        let path = self.path(rel);
        if !path.is_file() {
            return Ok(None);
        }
        let content = std::fs::read_to_string(&path).map_err(|source| PackageError::Io {
            path: path.clone(),
            source,
        })?;
        serde_json::from_str(&content)
            .map(Some)
            .map_err(|e| PackageError::Malformed {
                path,
                reason: e.to_string(),
            })
    }

    /// Read a document into a typed structure
    pub fn read_document<T: DeserializeOwned>(&self, rel: &str) -> Result<Option<T>, PackageError> {
        match self.read_json(rel)? {
            Some(value) => serde_json::from_value(value)
                .map(Some)
                .map_err(|e| PackageError::Malformed {
                    path: self.path(rel),
                    reason: e.to_string(),
                }),
            None => Ok(None),
        }
    }

    fn document_state(&self, rel: &str) -> DocumentState {
        match self.read_json(rel) {
            Ok(Some(value)) => DocumentState::Parsed(value),
            Ok(None) => DocumentState::Missing,
            Err(e) => DocumentState::Malformed(e.to_string()),
        }
    }

    /// Load every canonical document and directory of a category
    pub fn artifacts(&self, category: Category) -> CategoryArtifacts {
        let l = layout::layout(category);
        CategoryArtifacts {
            category,
            documents: l
                .documents
                .iter()
                .map(|rel| (*rel, self.document_state(rel)))
                .collect(),
            directories: l
                .directories
                .iter()
                .map(|rel| (*rel, self.entry_count(rel)))
                .collect(),
        }
    }

    /// Files directly inside `rel_dir` with the given extension, sorted
    pub fn list_files(&self, rel_dir: &str, extension: &str) -> Vec<PathBuf> {
        let dir = self.path(rel_dir);
        let Ok(entries) = std::fs::read_dir(&dir) else {
            return Vec::new();
        };
        let mut files: Vec<PathBuf> = entries
            .filter_map(|e| e.ok())
            .map(|e| e.path())
            .filter(|p| p.is_file())
            .filter(|p| {
                p.extension()
                    .and_then(|e| e.to_str())
                    .is_some_and(|e| e.eq_ignore_ascii_case(extension))
            })
            .collect();
        files.sort();
        files
    }

    /// True when a file exists and carries content: a non-empty JSON value
    /// for `.json` files, a non-zero size for anything else.
    pub fn has_content(&self, rel: &str) -> bool {
        let path = self.path(rel);
        if !path.is_file() {
            return false;
        }
        if rel.ends_with(".json") {
            return match self.read_json(rel) {
                Ok(Some(value)) => is_truthy(&value),
                _ => false,
            };
        }
        std::fs::metadata(&path).map(|m| m.len() > 0).unwrap_or(false)
    }

    /// Count `.json` files below `rel_dir` (recursive, hidden files included)
    pub fn count_json_files(&self, rel_dir: &str) -> usize {
        let dir = self.path(rel_dir);
        if !dir.is_dir() {
            return 0;
        }
        WalkBuilder::new(&dir)
            .hidden(false)
            .git_ignore(false)
            .git_global(false)
            .git_exclude(false)
            .build()
            .filter_map(|e| e.ok())
            .filter(|e| e.file_type().is_some_and(|t| t.is_file()))
            .filter(|e| e.path().extension().and_then(|x| x.to_str()) == Some("json"))
            .count()
    }
}

/// JSON truthiness: null, false, 0, "" and empty containers are falsy
pub fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0),
        Value::String(s) => !s.is_empty(),
        Value::Array(a) => !a.is_empty(),
        Value::Object(o) => !o.is_empty(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn write(root: &Path, rel: &str, content: &str) {
        let path = root.join(rel);
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        std::fs::write(path, content).unwrap();
    }

    #[test]
    fn test_open_missing_root_fails() {
        let dir = tempfile::tempdir().unwrap();
        let err = StudyPackage::open(dir.path().join("nope")).unwrap_err();
        assert!(matches!(err, PackageError::MissingRoot(_)));
    }

    #[test]
    fn test_open_file_root_fails() {
        let dir = tempfile::tempdir().unwrap();
        write(dir.path(), "file.txt", "x");
        let err = StudyPackage::open(dir.path().join("file.txt")).unwrap_err();
        assert!(matches!(err, PackageError::NotADirectory(_)));
    }

    #[test]
    fn test_read_json_absent_present_malformed() {
        let dir = tempfile::tempdir().unwrap();
        write(dir.path(), "metadata.json", r#"{"study_title": "X"}"#);
        write(dir.path(), "validity/validity.json", "{ not json");
        let pkg = StudyPackage::open(dir.path()).unwrap();

        assert_eq!(pkg.read_json(layout::PARTICIPANTS).unwrap(), None);
        assert_eq!(
            pkg.read_json(layout::METADATA).unwrap(),
            Some(json!({"study_title": "X"}))
        );
        assert!(matches!(
            pkg.read_json(layout::VALIDITY),
            Err(PackageError::Malformed { .. })
        ));
    }

    #[test]
    fn test_artifacts_reports_documents_and_directories() {
        let dir = tempfile::tempdir().unwrap();
        write(dir.path(), "analysis/analysis.json", "{}");
        write(dir.path(), "analysis/results_tables/fixations.csv", "participant_id\nP01\n");
        std::fs::create_dir_all(dir.path().join("analysis/visualizations")).unwrap();
        let pkg = StudyPackage::open(dir.path()).unwrap();

        let artifacts = pkg.artifacts(Category::Analysis);
        assert_eq!(artifacts.documents_present(), 1);
        assert_eq!(artifacts.directory_entries(layout::RESULTS_TABLES), 1);
        assert_eq!(artifacts.directory_entries(layout::ANALYSIS_VISUALIZATIONS), 0);
        assert!(matches!(
            artifacts.document(layout::ANALYSIS),
            Some(DocumentState::Parsed(_))
        ));
    }

    #[test]
    fn test_list_files_filters_extension() {
        let dir = tempfile::tempdir().unwrap();
        write(dir.path(), "analysis/results_tables/b.csv", "a");
        write(dir.path(), "analysis/results_tables/a.CSV", "a");
        write(dir.path(), "analysis/results_tables/notes.txt", "a");
        let pkg = StudyPackage::open(dir.path()).unwrap();
        let files = pkg.list_files(layout::RESULTS_TABLES, "csv");
        assert_eq!(files.len(), 2);
        assert!(files[0].ends_with("a.CSV"));
    }

    #[test]
    fn test_has_content() {
        let dir = tempfile::tempdir().unwrap();
        write(dir.path(), "metadata.json", "{}");
        write(dir.path(), "validity/validity.json", r#"{"threats": []}"#);
        write(dir.path(), "LICENSE", "");
        write(dir.path(), "README.md", "# Study");
        let pkg = StudyPackage::open(dir.path()).unwrap();
        assert!(!pkg.has_content(layout::METADATA));
        assert!(pkg.has_content(layout::VALIDITY));
        assert!(!pkg.has_content(layout::LICENSE));
        assert!(pkg.has_content(layout::README));
        assert!(!pkg.has_content(layout::PARTICIPANTS));
    }

    #[test]
    fn test_count_json_files_recurses() {
        let dir = tempfile::tempdir().unwrap();
        write(dir.path(), "metadata.json", "{}");
        write(dir.path(), "equipment/tracker_specs.json", "{}");
        write(dir.path(), ".hidden/x.json", "{}");
        write(dir.path(), "README.md", "");
        let pkg = StudyPackage::open(dir.path()).unwrap();
        assert_eq!(pkg.count_json_files("."), 3);
        assert_eq!(pkg.count_json_files("missing"), 0);
    }

    #[test]
    fn test_is_truthy() {
        assert!(!is_truthy(&json!(null)));
        assert!(!is_truthy(&json!("")));
        assert!(!is_truthy(&json!(0)));
        assert!(!is_truthy(&json!([])));
        assert!(is_truthy(&json!("x")));
        assert!(is_truthy(&json!({"a": 1})));
    }
}
