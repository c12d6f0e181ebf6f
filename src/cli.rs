//! Command-line interface

use crate::config::OutputFormat;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "ats-scorer")]
#[command(about = "Score a resume against a job description the way an applicant tracking system would")]
#[command(long_about = "Extracts a category schema from the job description, finds matching items in the resume, and combines per-category scores with semantic similarity into a 0-100 ATS score")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Configuration file path
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Score a resume against a job description
    Score {
        /// Path to resume file (PDF, TXT, MD)
        #[arg(short, long)]
        resume: PathBuf,

        /// Path to job description file (PDF, TXT, MD)
        #[arg(short, long)]
        job: PathBuf,

        /// Include improvement feedback
        #[arg(short, long)]
        feedback: bool,

        /// Output format: console, json
        #[arg(short, long, value_parser = parse_output_format)]
        output: Option<OutputFormat>,

        /// Use the built-in hashing encoder instead of a downloaded model
        #[arg(long)]
        offline: bool,

        /// Show the extracted information per category
        #[arg(short, long)]
        details: bool,

        /// Save output to file
        #[arg(short, long)]
        save: Option<PathBuf>,
    },

    /// Answer a JSON scoring request {job_description, resume, id}
    Request {
        /// Path to the request JSON file
        file: PathBuf,

        /// Use the built-in hashing encoder instead of a downloaded model
        #[arg(long)]
        offline: bool,
    },

    /// Embedding model management
    Models {
        #[command(subcommand)]
        action: ModelAction,
    },

    /// Show or reset configuration
    Config {
        #[command(subcommand)]
        action: Option<ConfigAction>,
    },
}

#[derive(Subcommand)]
pub enum ModelAction {
    /// List available embedding models
    List,

    /// Download an embedding model at the configured revision
    Download {
        /// Model id, name or Hugging Face repo id
        model: String,

        /// Hub revision to fetch instead of the configured one
        #[arg(long)]
        revision: Option<String>,

        /// Re-download even if the model is present
        #[arg(short, long)]
        force: bool,
    },

    /// Show model information
    Info {
        /// Model id, name or Hugging Face repo id
        model: String,
    },
}

#[derive(Subcommand)]
pub enum ConfigAction {
    /// Show current configuration
    Show,

    /// Reset configuration to defaults
    Reset,

    /// Print the configuration file location
    Path,
}

/// Parse and validate output format
pub fn parse_output_format(format: &str) -> Result<OutputFormat, String> {
    match format.to_lowercase().as_str() {
        "console" => Ok(OutputFormat::Console),
        "json" => Ok(OutputFormat::Json),
        _ => Err(format!(
            "Invalid output format: {}. Supported: console, json",
            format
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_score_command() {
        let cli = Cli::try_parse_from([
            "ats-scorer", "score", "--resume", "cv.pdf", "--job", "jd.txt", "--feedback", "-o", "json",
        ])
        .unwrap();

        match cli.command {
            Commands::Score { resume, output, feedback, offline, .. } => {
                assert_eq!(resume, PathBuf::from("cv.pdf"));
                assert_eq!(output, Some(OutputFormat::Json));
                assert!(feedback);
                assert!(!offline);
            }
            _ => panic!("expected score command"),
        }
    }

    #[test]
    fn test_output_format_rejects_unknown() {
        assert!(parse_output_format("html").is_err());
        assert_eq!(parse_output_format("Console"), Ok(OutputFormat::Console));
    }
}
