//! README patcher
//!
//! Rewrites three generated regions of a study README in place: the
//! compliance checklist section, the score table and the radar image link.
//! Regions that are missing get appended. Patching an already patched README
//! with the same report is a no-op.

use super::markdown::{render_checklist, render_scores_table};
use crate::models::ComplianceReport;
use regex::{NoExpand, Regex};
use std::sync::OnceLock;

pub const CHECKLIST_HEADING: &str = "## 📋 Compliance Checklist";
pub const IMAGE_ALT: &str = "Reproducibility Spider Graph";
/// Starting content when the package has no README
pub const EMPTY_README: &str = "# Study Assessment\n\n";

static SCORE_TABLE: OnceLock<Regex> = OnceLock::new();
static IMAGE_LINK: OnceLock<Regex> = OnceLock::new();
static HEADING: OnceLock<Regex> = OnceLock::new();

fn score_table_regex() -> &'static Regex {
    SCORE_TABLE.get_or_init(|| {
        Regex::new(r"(?s)\| Study Component \| Score.*?\*\*Overall Study Score.*?\*\*[^\n]*")
            .expect("valid score table regex")
    })
}

fn image_link_regex() -> &'static Regex {
    IMAGE_LINK.get_or_init(|| {
        Regex::new(r"!\[Reproducibility Spider Graph\]\([^)]+\)").expect("valid image link regex")
    })
}

fn heading_regex() -> &'static Regex {
    HEADING.get_or_init(|| Regex::new(r"(?m)^#{1,2} ").expect("valid heading regex"))
}

/// Patch `existing` README content (or a fresh one) with the report
pub fn patch(existing: Option<&str>, report: &ComplianceReport, image_path: &str) -> String {
    let mut content = existing.unwrap_or(EMPTY_README).to_string();

    content = patch_checklist(&content, &render_checklist(report));
    content = patch_scores_table(&content, &render_scores_table(report));
    content = patch_image(&content, image_path);

    content
}

/// Byte range of the checklist section: from its heading to the closing
/// `---` rule, or to the next level 1/2 heading, or to the end.
fn checklist_span(content: &str) -> Option<(usize, usize)> {
    let start = content.find(CHECKLIST_HEADING)?;
    let body_start = start + CHECKLIST_HEADING.len();
    let mut end = heading_regex()
        .find_at(content, body_start)
        .map(|m| m.start())
        .unwrap_or(content.len());

    if let Some(rule) = content[body_start..end].find("\n---\n") {
        end = body_start + rule + "\n---\n".len();
    }
    Some((start, end))
}

fn patch_checklist(content: &str, checklist: &str) -> String {
    match checklist_span(content) {
        Some((start, end)) => {
            let mut out = String::with_capacity(content.len() + checklist.len());
            out.push_str(&content[..start]);
            out.push_str(checklist);
            // Keep a blank line before a following heading
            if end < content.len() && !content[..end].ends_with("---\n") {
                out.push('\n');
            }
            out.push_str(&content[end..]);
            out
        }
        None => format!("{}\n{}\n", content, checklist),
    }
}

fn patch_scores_table(content: &str, table: &str) -> String {
    let re = score_table_regex();
    if re.is_match(content) {
        re.replace_all(content, NoExpand(table.trim())).into_owned()
    } else {
        format!("{}\n{}\n", content, table)
    }
}

fn patch_image(content: &str, image_path: &str) -> String {
    let link = format!("![{}]({})", IMAGE_ALT, image_path);
    let re = image_link_regex();
    if re.is_match(content) {
        re.replace_all(content, NoExpand(&link)).into_owned()
    } else {
        format!("{}\n{}\n", content, link)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Category, ScoringStrategy};
    use crate::reporters::tests::test_assessment;
    use crate::scoring::aggregate;
    use std::collections::BTreeMap;

    const IMG: &str = "reproducibility_spider_graph.svg";

    #[test]
    fn test_missing_readme_starts_fresh() {
        let report = test_assessment().report;
        let out = patch(None, &report, IMG);
        assert!(out.starts_with("# Study Assessment\n"));
        assert_eq!(out.matches(CHECKLIST_HEADING).count(), 1);
        assert_eq!(out.matches("| Study Component | Score |").count(), 1);
        assert!(out.contains("![Reproducibility Spider Graph](reproducibility_spider_graph.svg)"));
    }

    #[test]
    fn test_patch_is_idempotent() {
        let report = test_assessment().report;
        let once = patch(None, &report, IMG);
        let twice = patch(Some(&once), &report, IMG);
        assert_eq!(once, twice);

        let existing = "# My Study\n\nIntro text.\n\n## Methods\n\nSome methods.\n";
        let once = patch(Some(existing), &report, IMG);
        let twice = patch(Some(&once), &report, IMG);
        assert_eq!(once, twice);
        assert!(once.contains("## Methods\n\nSome methods."));
    }

    #[test]
    fn test_replaces_sections_in_place() {
        let existing = "# Study\n\n## 📋 Compliance Checklist\n\nold checklist\n\n## Data\n\nkeep me\n\n\
| Study Component | Score |\n|---|---|\n| Old | 1.0% |\n| **Overall Study Score** | **1.0%** |\n\n\
![Reproducibility Spider Graph](old.png)\n\n## Footer\n";
        let report = test_assessment().report;
        let out = patch(Some(existing), &report, IMG);

        assert!(!out.contains("old checklist"));
        assert!(!out.contains("| Old | 1.0% |"));
        assert!(!out.contains("old.png"));
        assert!(out.contains("## Data\n\nkeep me"));
        assert!(out.trim_end().ends_with("## Footer"));
        assert!(out.contains("**64.0%**"));

        let checklist_at = out.find(CHECKLIST_HEADING).unwrap();
        let data_at = out.find("## Data").unwrap();
        assert!(checklist_at < data_at);
    }

    #[test]
    fn test_new_scores_replace_old_scores() {
        let before = test_assessment().report;
        let mut scores: BTreeMap<Category, f64> = BTreeMap::new();
        for c in Category::ALL {
            scores.insert(c, 1.0);
        }
        let after = aggregate(ScoringStrategy::Presence, scores, 0.8);

        let first = patch(None, &before, IMG);
        let second = patch(Some(&first), &after, IMG);
        assert!(second.contains("**Status**: Complete (Publication Ready)"));
        assert!(second.contains("**100.0%**"));
        assert!(!second.contains("**64.0%**"));
        assert_eq!(second.matches(CHECKLIST_HEADING).count(), 1);
    }

    #[test]
    fn test_every_score_table_is_refreshed() {
        let old_table = "| Study Component | Score |\n|---|---|\n| Old | 1.0% |\n| **Overall Study Score** | **1.0%** |";
        let existing = format!("# Study\n\n## Summary\n\n{old_table}\n\n## Appendix\n\n{old_table}\n");
        let report = test_assessment().report;
        let out = patch(Some(&existing), &report, IMG);

        assert!(!out.contains("| Old | 1.0% |"));
        assert_eq!(out.matches("| Study Component | Score |").count(), 2);
        assert_eq!(out.matches("**64.0%**").count(), 2);
        assert!(out.contains("## Appendix"));
    }

    #[test]
    fn test_image_path_with_dollar_sign_is_literal() {
        let report = test_assessment().report;
        let out = patch(None, &report, "charts/$1.svg");
        assert!(out.contains("](charts/$1.svg)"));
    }
}
