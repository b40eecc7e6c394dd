//! Replet - reproducibility assessment for eye-tracking study packages
//!
//! Scores a study package on ten compliance categories, checks cross-file
//! integrity between its documents, and renders JSON, Markdown, terminal and
//! radar-chart reports.
//!
//! ```no_run
//! use replet::config::load_project_config;
//! use replet::package::StudyPackage;
//! use replet::scoring::assess_with_config;
//!
//! let package = StudyPackage::open("my-study")?;
//! let config = load_project_config(package.root());
//! let report = assess_with_config(&package, &config, None);
//! println!("overall: {:.2}", report.overall);
//! # Ok::<(), replet::package::PackageError>(())
//! ```

pub mod classifier;
pub mod cli;
pub mod config;
pub mod integrity;
pub mod models;
pub mod package;
pub mod reporters;
pub mod scoring;
