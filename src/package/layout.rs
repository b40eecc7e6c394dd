//! Fixed on-disk layout of a study package
//!
//! Every path is relative to the package root.

use crate::models::Category;

pub const METADATA: &str = "metadata.json";
pub const PARTICIPANTS: &str = "participants/participants.json";

pub const TRACKER_SPECS: &str = "equipment/tracker_specs.json";
pub const SCREEN_SETUP: &str = "equipment/screen_setup.json";
pub const SOFTWARE_ENV: &str = "equipment/software_env.json";

pub const STIMULI_METADATA: &str = "stimuli/stimuli_metadata.json";
pub const STIMULI_ANNOTATIONS: &str = "stimuli/stimuli_annotations.json";
pub const STIMULI_RAW: &str = "stimuli/stimuli_raw";

pub const AOIS_DEFINITION: &str = "aois/aois_definition.json";
pub const AOIS_VISUALIZATIONS: &str = "aois/aois_visualizations";

pub const PROTOCOL: &str = "collection/protocol.json";
pub const LOGS: &str = "collection/logs";

pub const PREPROCESSING: &str = "preprocessing/preprocessing.json";
pub const SCRIPTS: &str = "preprocessing/scripts";

pub const ANALYSIS: &str = "analysis/analysis.json";
pub const RESULTS_TABLES: &str = "analysis/results_tables";
pub const ANALYSIS_VISUALIZATIONS: &str = "analysis/visualizations";

pub const VALIDITY: &str = "validity/validity.json";
pub const REPRODUCIBILITY: &str = "reproducibility/reproducibility.json";

pub const README: &str = "README.md";
pub const LICENSE: &str = "LICENSE";
pub const ENVIRONMENT: &str = "reproducibility/environment.yml";
pub const CITATION: &str = "reproducibility/CITATION.cff";
pub const CHECKLIST: &str = "repl_et_checklist.md";

pub const SCHEMAS_DIR: &str = "schemas";

/// Artifacts whose presence makes up the reproducibility checklist
pub const REPRODUCIBILITY_ARTIFACTS: &[&str] = &[README, LICENSE, ENVIRONMENT, CITATION, CHECKLIST];

pub const EQUIPMENT_DOCUMENTS: &[&str] = &[TRACKER_SPECS, SCREEN_SETUP, SOFTWARE_ENV];

/// Canonical documents and directories belonging to one category
#[derive(Debug, Clone, Copy)]
pub struct CategoryLayout {
    pub documents: &'static [&'static str],
    pub directories: &'static [&'static str],
}

/// Look up where a category's artifacts live
pub fn layout(category: Category) -> CategoryLayout {
    match category {
        Category::Metadata => CategoryLayout {
            documents: &[METADATA],
            directories: &[],
        },
        Category::Participants => CategoryLayout {
            documents: &[PARTICIPANTS],
            directories: &[],
        },
        Category::Equipment => CategoryLayout {
            documents: EQUIPMENT_DOCUMENTS,
            directories: &[],
        },
        Category::Stimuli => CategoryLayout {
            documents: &[STIMULI_METADATA, STIMULI_ANNOTATIONS],
            directories: &[STIMULI_RAW],
        },
        Category::Aois => CategoryLayout {
            documents: &[AOIS_DEFINITION],
            directories: &[AOIS_VISUALIZATIONS],
        },
        Category::DataQuality => CategoryLayout {
            documents: &[PROTOCOL],
            directories: &[LOGS],
        },
        Category::Preprocessing => CategoryLayout {
            documents: &[PREPROCESSING],
            directories: &[SCRIPTS],
        },
        Category::Analysis => CategoryLayout {
            documents: &[ANALYSIS],
            directories: &[RESULTS_TABLES, ANALYSIS_VISUALIZATIONS],
        },
        Category::Threats => CategoryLayout {
            documents: &[VALIDITY],
            directories: &[],
        },
        Category::Reproducibility => CategoryLayout {
            documents: &[REPRODUCIBILITY],
            directories: &[],
        },
    }
}

/// Every directory a fully scaffolded package contains
pub fn all_directories() -> Vec<&'static str> {
    let mut dirs: Vec<&'static str> = Vec::new();
    for category in Category::ALL {
        let l = layout(category);
        for doc in l.documents {
            if let Some((parent, _)) = doc.rsplit_once('/') {
                if !dirs.contains(&parent) {
                    dirs.push(parent);
                }
            }
        }
        for dir in l.directories {
            if !dirs.contains(dir) {
                dirs.push(dir);
            }
        }
    }
    dirs
}
