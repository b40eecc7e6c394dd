//! CLI command definitions and handlers

mod assess;
mod check;
mod config;
mod init;
mod readme;

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Parse and validate a unit score (0.0-1.0)
fn parse_unit_score(s: &str) -> Result<f64, String> {
    let v: f64 = s
        .parse()
        .map_err(|_| format!("'{}' is not a valid number", s))?;
    if !(0.0..=1.0).contains(&v) {
        Err("score must be between 0.0 and 1.0".to_string())
    } else {
        Ok(v)
    }
}

/// Replet - reproducibility assessment for eye-tracking study packages
#[derive(Parser, Debug)]
#[command(name = "replet")]
#[command(
    version,
    about = "Reproducibility assessment for eye-tracking study packages",
    long_about = "Replet scores a study package on ten reproducibility categories, \
checks cross-file integrity between stimuli, AOIs, participants and results, \
and renders JSON, Markdown and radar-chart reports.\n\n\
Run without a subcommand to assess the current directory:\n  \
replet .",
    after_help = "\
Examples:
  replet .                              Assess current directory
  replet assess . --format json         Category scores as JSON
  replet assess . --out-dir outputs     Write report.json, report.md and score.svg
  replet check .                        Cross-file integrity check
  replet readme .                       Update README checklist and radar chart
  replet init my-study                  Scaffold an empty template package"
)]
pub struct Cli {
    /// Path to the study package (default: current directory)
    #[arg(global = true, default_value = ".")]
    pub path: PathBuf,

    /// Log level (error, warn, info, debug, trace)
    #[arg(long, global = true, default_value = "warn", value_parser = ["error", "warn", "info", "debug", "trace"])]
    pub log_level: String,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Score the package on all ten categories (default command)
    #[command(after_help = "\
Examples:
  replet assess .                                  Terminal summary
  replet assess . --format json                    Category-to-score map
  replet assess . --format json --detailed         Scores, status, violations, frameworks
  replet assess . --format markdown -o report.md   Markdown report
  replet assess . --strategy authenticity          Penalise template placeholders
  replet assess . --fail-under 0.6                 Exit code 1 below 60% (CI mode)")]
    Assess {
        /// Output format: text, json, markdown (or md), svg
        #[arg(long, short = 'f', value_parser = ["text", "json", "markdown", "md", "svg"])]
        format: Option<String>,

        /// Output file path (default: stdout)
        #[arg(long, short = 'o')]
        output: Option<PathBuf>,

        /// Write report.json, report.md and score.svg into this directory
        #[arg(long)]
        out_dir: Option<PathBuf>,

        /// Scoring strategy: presence, authenticity
        #[arg(long, short = 's', value_parser = ["presence", "authenticity"])]
        strategy: Option<String>,

        /// Full assessment in JSON output instead of the score map
        #[arg(long)]
        detailed: bool,

        /// Exit with code 1 if the overall score is below this value (0.0-1.0)
        #[arg(long, value_parser = parse_unit_score)]
        fail_under: Option<f64>,
    },

    /// Check cross-file integrity (stimuli, AOIs, participants, results)
    Check {
        /// Output format: text, json
        #[arg(long, short = 'f', default_value = "text", value_parser = ["text", "json"])]
        format: String,
    },

    /// Update README.md with the compliance checklist, score table and radar chart
    Readme {
        /// Scoring strategy: presence, authenticity
        #[arg(long, short = 's', value_parser = ["presence", "authenticity"])]
        strategy: Option<String>,
    },

    /// Scaffold an empty template package with placeholder documents
    Init,

    /// Print the effective package configuration
    Config,
}

/// Run the CLI with parsed arguments
pub fn run(cli: Cli) -> Result<()> {
    match cli.command {
        Some(Commands::Assess {
            format,
            output,
            out_dir,
            strategy,
            detailed,
            fail_under,
        }) => assess::run(
            &cli.path,
            assess::AssessOptions {
                format,
                output,
                out_dir,
                strategy,
                detailed,
                fail_under,
            },
        ),

        Some(Commands::Check { format }) => check::run(&cli.path, &format),

        Some(Commands::Readme { strategy }) => readme::run(&cli.path, strategy.as_deref()),

        Some(Commands::Init) => init::run(&cli.path),

        Some(Commands::Config) => config::run(&cli.path),

        None => {
            // Check if the path looks like an unknown subcommand
            check_unknown_subcommand(&cli.path)?;
            assess::run(&cli.path, assess::AssessOptions::default())
        }
    }
}

fn check_unknown_subcommand(path: &std::path::Path) -> anyhow::Result<()> {
    let path_str = path.to_string_lossy();
    let looks_like_command = !path.exists()
        && !path_str.contains('/')
        && !path_str.contains('\\')
        && !path_str.starts_with('.');
    if !looks_like_command {
        return Ok(());
    }
    let known_commands = ["assess", "check", "readme", "init", "config"];
    if !known_commands.contains(&path_str.as_ref()) {
        anyhow::bail!(
            "Unknown command '{}'. Run 'replet --help' for available commands.\n\nDid you mean one of: {}?",
            path_str,
            known_commands.join(", ")
        );
    }
    Ok(())
}
