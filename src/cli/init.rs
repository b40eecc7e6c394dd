//! Init command - scaffold an empty template package

use crate::config::ProjectConfig;
use crate::models::Category;
use crate::package::layout;
use anyhow::{Context, Result};
use console::style;
use serde_json::{json, Value};
use std::path::Path;

/// Placeholder body for a canonical document, without its `$schema` key
fn placeholder(doc: &str) -> Value {
    match doc {
        layout::METADATA => json!({
            "study_title": "Your Study Title",
            "authors": ["Author Name"],
            "institution": "Your Institution",
            "paradigm": "",
            "task_description": ""
        }),
        layout::PARTICIPANTS => json!({ "participants": [] }),
        layout::TRACKER_SPECS => json!({
            "eye_tracker": { "manufacturer": "Brand", "model": "Model" }
        }),
        layout::SCREEN_SETUP => json!({
            "monitor": { "manufacturer": "Brand", "model": "Model" }
        }),
        layout::SOFTWARE_ENV => json!({
            "operating_system": {},
            "eye_tracking_software": {}
        }),
        layout::STIMULI_METADATA => json!({ "stimuli": [] }),
        layout::STIMULI_ANNOTATIONS => json!({ "annotations": [] }),
        layout::AOIS_DEFINITION => json!({ "aois": [] }),
        layout::PROTOCOL => json!({ "procedure": [] }),
        layout::PREPROCESSING => json!({ "preprocessing_steps": [] }),
        layout::ANALYSIS => json!({ "analysis_methods": [] }),
        layout::VALIDITY => json!({ "threats": [] }),
        layout::REPRODUCIBILITY => json!({ "materials": [] }),
        _ => json!({}),
    }
}

/// Relative `$schema` reference for a document, e.g. `../schemas/aois_definition.schema.json`
fn schema_ref(doc: &str) -> String {
    let depth = doc.matches('/').count();
    let stem = doc
        .rsplit('/')
        .next()
        .unwrap_or(doc)
        .trim_end_matches(".json");
    format!(
        "{}{}/{}.schema.json",
        "../".repeat(depth),
        layout::SCHEMAS_DIR,
        stem
    )
}

/// Full document content with `$schema` first
fn template_document(doc: &str) -> Value {
    let mut map = serde_json::Map::new();
    map.insert("$schema".to_string(), Value::String(schema_ref(doc)));
    if let Value::Object(body) = placeholder(doc) {
        map.extend(body);
    }
    Value::Object(map)
}

/// Run the init command
pub fn run(path: &Path) -> Result<()> {
    std::fs::create_dir_all(path)
        .with_context(|| format!("Failed to create {}", path.display()))?;
    let root = path
        .canonicalize()
        .with_context(|| format!("Path does not exist: {}", path.display()))?;

    if !root.is_dir() {
        anyhow::bail!("Path is not a directory: {}", root.display());
    }

    println!("\n{} Scaffolding study package\n", style("🧪").bold());

    let mut dirs = layout::all_directories();
    dirs.push(layout::SCHEMAS_DIR);
    for dir in dirs {
        std::fs::create_dir_all(root.join(dir))
            .with_context(|| format!("Failed to create {}", dir))?;
    }

    let mut created = 0;
    for category in Category::ALL {
        for doc in layout::layout(category).documents {
            let target = root.join(doc);
            if target.exists() {
                println!("{} Kept existing {}", style("·").dim(), style(doc).dim());
                continue;
            }
            let content = serde_json::to_string_pretty(&template_document(doc))?;
            std::fs::write(&target, content + "\n")
                .with_context(|| format!("Failed to create {}", doc))?;
            println!("{} Created {}", style("✓").green(), style(doc).cyan());
            created += 1;
        }
    }

    let config_path = root.join("replet.toml");
    if !config_path.exists() {
        let config = format!(
            "# Replet package configuration\n\n{}",
            ProjectConfig::default().to_toml()?
        );
        std::fs::write(&config_path, config).with_context(|| "Failed to create replet.toml")?;
        println!("{} Created {}", style("✓").green(), style("replet.toml").cyan());
    }

    println!(
        "\n{} Package scaffolded ({} documents created)",
        style("✨").bold(),
        created
    );
    println!("\nNext steps:");
    println!("  {} Fill in the placeholder documents", style("$EDITOR metadata.json").cyan());
    println!("  {} Score the package", style("replet assess .").cyan());
    println!("  {} Check cross-file references", style("replet check .").cyan());

    Ok(())
}
