//! ats-scorer: applicant-tracking-system style resume scoring

use ats_scorer::cli::{Cli, Commands, ConfigAction, ModelAction};
use ats_scorer::config::Config;
use ats_scorer::error::{AtsError, Result};
use ats_scorer::input::DocumentLoader;
use ats_scorer::output::formatter::formatter_for;
use ats_scorer::output::{AtsRequest, AtsResponse, ScoreReport};
use ats_scorer::processing::ats_calculator::AtsCalculator;
use ats_scorer::processing::embedding_manager::EmbeddingModelManager;
use clap::Parser;
use log::{error, info, warn};
use std::path::Path;
use std::process;

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let log_level = if cli.verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(log_level)).init();

    let config_path = cli.config.clone().unwrap_or_else(Config::config_path);
    let config = match Config::load_from(&config_path) {
        Ok(config) => config,
        Err(e) => {
            error!("Failed to load configuration: {}", e);
            process::exit(1);
        }
    };

    if !config.models.offline && !config.revision_is_pinned() {
        warn!(
            "models.embedding_revision '{}' is not a commit hash; it will be pinned to the commit fetched on first download",
            config.models.embedding_revision
        );
    }

    if let Err(e) = run_command(cli.command, config, &config_path).await {
        error!("Command failed: {}", e);
        process::exit(1);
    }
}

async fn run_command(command: Commands, mut config: Config, config_path: &Path) -> Result<()> {
    match command {
        Commands::Score {
            resume,
            job,
            feedback,
            output,
            offline,
            details,
            save,
        } => {
            config.models.offline |= offline;
            let format = output.unwrap_or(config.output.format);
            let include_feedback = feedback || config.output.include_feedback;

            let loader = DocumentLoader::new();
            let resume_text = loader.load(&resume).await?;
            let job_text = loader.load(&job).await?;
            info!(
                "Loaded resume ({} chars) and job description ({} chars)",
                resume_text.len(),
                job_text.len()
            );

            pin_model_revision(&mut config, config_path).await?;
            let calculator = AtsCalculator::from_config(&config).await?;
            let outcome = calculator.compute_score(&resume_text, &job_text);
            let report = ScoreReport::new(
                outcome,
                &resume.to_string_lossy(),
                &job.to_string_lossy(),
                calculator.embedding_model(),
                include_feedback,
            );

            let use_colors = config.output.color_output && save.is_none();
            let rendered = formatter_for(format, use_colors, details).format_report(&report)?;
            write_output(&rendered, save.as_deref())?;
        }

        Commands::Request { file, offline } => {
            config.models.offline |= offline;
            let request = AtsRequest::from_json(&std::fs::read_to_string(&file)?)?;

            pin_model_revision(&mut config, config_path).await?;
            let calculator = AtsCalculator::from_config(&config).await?;
            let outcome = calculator.compute_score(&request.resume, &request.job_description);
            let response = AtsResponse::new(&outcome, request.id);
            println!("{}", serde_json::to_string_pretty(&response)?);
        }

        Commands::Models { action } => run_models_command(action, &config).await?,

        Commands::Config { action } => match action {
            Some(ConfigAction::Show) | None => {
                let rendered = toml::to_string_pretty(&config)
                    .map_err(|e| AtsError::Configuration(format!("Failed to serialize config: {}", e)))?;
                println!("{}", rendered);
            }
            Some(ConfigAction::Reset) => {
                Config::default().save_to(config_path)?;
                info!("Configuration reset to defaults at {}", config_path.display());
            }
            Some(ConfigAction::Path) => println!("{}", config_path.display()),
        },
    }

    Ok(())
}

async fn run_models_command(action: ModelAction, config: &Config) -> Result<()> {
    let mut manager = EmbeddingModelManager::new(config.models_dir().clone()).await?;

    match action {
        ModelAction::List => {
            println!("Embedding models:");
            for (id, model) in manager.list_available_models() {
                let status = if manager.is_model_downloaded(id) {
                    "downloaded"
                } else {
                    "available"
                };
                let marker = if *id == config.models.embedding_model { "*" } else { " " };
                println!(
                    "{} {:<16} {:<28} {:>4} MB  {}d  [{}]",
                    marker, id, model.repo_id, model.size_mb, model.dimensions, status
                );
                println!("    {}", model.description);
            }
        }

        ModelAction::Download { model, revision, force } => {
            let model_id = resolve(&manager, &model)?;
            let revision = revision.unwrap_or_else(|| config.models.embedding_revision.clone());

            let path = if force {
                manager.download_model(&model_id, &revision).await?
            } else {
                manager.ensure_model_available(&model_id, &revision).await?
            };
            println!("{} ready at {}", model_id, path.display());
        }

        ModelAction::Info { model } => {
            let model_id = resolve(&manager, &model)?;
            let info = manager
                .get_model_info(&model_id)
                .ok_or_else(|| AtsError::ModelError(format!("Unknown embedding model: {}", model)))?;

            println!("Id:          {}", model_id);
            println!("Name:        {}", info.name);
            println!("Repository:  {}", info.repo_id);
            println!("Size:        {} MB", info.size_mb);
            println!("Dimensions:  {}", info.dimensions);
            println!("Description: {}", info.description);
            match manager.get_model_path(&model_id) {
                Some(path) => {
                    let revision = manager
                        .downloaded_revision(&model_id)
                        .await
                        .unwrap_or_else(|| "unknown".to_string());
                    let commit = manager
                        .downloaded_commit(&model_id)
                        .await
                        .unwrap_or_else(|| "unresolved".to_string());
                    println!(
                        "Status:      downloaded at {} (revision {}, commit {})",
                        path.display(),
                        revision,
                        commit
                    );
                }
                None => println!("Status:      not downloaded"),
            }
        }
    }

    Ok(())
}

/// Fetch the configured model and, if its revision is a branch, persist the commit it resolved to
async fn pin_model_revision(config: &mut Config, config_path: &Path) -> Result<()> {
    if config.models.offline || config.revision_is_pinned() {
        return Ok(());
    }

    let mut manager = EmbeddingModelManager::new(config.models_dir().clone()).await?;
    let model_id = resolve(&manager, &config.models.embedding_model)?;
    manager
        .ensure_model_available(&model_id, &config.models.embedding_revision)
        .await?;

    if let Some(commit) = manager.downloaded_commit(&model_id).await {
        if config.pin_revision(&commit) {
            config.save_to(config_path)?;
            info!("Saved pinned revision to {}", config_path.display());
        }
    }
    Ok(())
}

fn resolve(manager: &EmbeddingModelManager, model: &str) -> Result<String> {
    manager
        .resolve_model_id(model)
        .ok_or_else(|| AtsError::ModelError(format!("Unknown embedding model: {}", model)))
}

fn write_output(rendered: &str, save: Option<&Path>) -> Result<()> {
    match save {
        Some(path) => {
            std::fs::write(path, rendered)?;
            info!("Report saved to {}", path.display());
        }
        None => println!("{}", rendered),
    }
    Ok(())
}
