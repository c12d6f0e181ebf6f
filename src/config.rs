//! Configuration management for the ATS scorer

use crate::error::{AtsError, Result};
use crate::processing::embedding_manager::is_commit_revision;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub models: ModelConfig,
    pub extraction: ExtractionConfig,
    pub scoring: ScoringConfig,
    pub output: OutputConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelConfig {
    pub models_dir: PathBuf,
    /// Catalog id of the sentence-embedding model
    pub embedding_model: String,
    /// Hub revision of the model. A branch name is replaced by the commit it
    /// resolved to on the first download.
    pub embedding_revision: String,
    /// Use the built-in hashing encoder instead of a downloaded model
    pub offline: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExtractionConfig {
    pub keyword_top_k: usize,
    pub keyword_max_ngram: usize,
    pub keyword_dedup_threshold: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScoringConfig {
    /// Clamp cosine similarities into [0, 1] before they are blended into scores
    pub clamp_embedding_similarity: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutputConfig {
    pub format: OutputFormat,
    pub include_feedback: bool,
    pub color_output: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    Console,
    Json,
}

impl Default for Config {
    fn default() -> Self {
        let models_dir = dirs::home_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(".ats-scorer")
            .join("models");

        Self {
            models: ModelConfig {
                models_dir,
                embedding_model: "potion-base-8M".to_string(),
                embedding_revision: "main".to_string(),
                offline: false,
            },
            extraction: ExtractionConfig {
                keyword_top_k: 20,
                keyword_max_ngram: 3,
                keyword_dedup_threshold: 0.9,
            },
            scoring: ScoringConfig {
                clamp_embedding_similarity: false,
            },
            output: OutputConfig {
                format: OutputFormat::Console,
                include_feedback: false,
                color_output: true,
            },
        }
    }
}

impl Config {
    /// Load from the default location, writing defaults on first use
    pub fn load() -> Result<Self> {
        Self::load_from(&Self::config_path())
    }

    pub fn load_from(config_path: &Path) -> Result<Self> {
        if config_path.exists() {
            let content = std::fs::read_to_string(config_path)?;
            let config: Config = toml::from_str(&content)
                .map_err(|e| AtsError::Configuration(format!("Failed to parse config: {}", e)))?;
            config.validate()?;
            Ok(config)
        } else {
            let config = Self::default();
            config.save_to(config_path)?;
            Ok(config)
        }
    }

    pub fn save(&self) -> Result<()> {
        self.save_to(&Self::config_path())
    }

    pub fn save_to(&self, config_path: &Path) -> Result<()> {
        if let Some(parent) = config_path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let content = toml::to_string_pretty(self)
            .map_err(|e| AtsError::Configuration(format!("Failed to serialize config: {}", e)))?;

        std::fs::write(config_path, content)?;
        Ok(())
    }

    pub fn config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| dirs::home_dir().unwrap_or_else(|| PathBuf::from(".")))
            .join("ats-scorer")
            .join("config.toml")
    }

    pub fn validate(&self) -> Result<()> {
        let extraction = &self.extraction;
        if extraction.keyword_top_k == 0 {
            return Err(AtsError::Configuration(
                "extraction.keyword_top_k must be at least 1".to_string(),
            ));
        }
        if extraction.keyword_max_ngram == 0 {
            return Err(AtsError::Configuration(
                "extraction.keyword_max_ngram must be at least 1".to_string(),
            ));
        }
        if !(0.0..=1.0).contains(&extraction.keyword_dedup_threshold) {
            return Err(AtsError::Configuration(format!(
                "extraction.keyword_dedup_threshold must lie in [0, 1], got {}",
                extraction.keyword_dedup_threshold
            )));
        }
        Ok(())
    }

    /// Whether `embedding_revision` names a fixed commit
    pub fn revision_is_pinned(&self) -> bool {
        is_commit_revision(&self.models.embedding_revision)
    }

    /// Replace a branch revision with `commit`; returns whether anything changed
    pub fn pin_revision(&mut self, commit: &str) -> bool {
        if self.revision_is_pinned() || !is_commit_revision(commit) {
            return false;
        }
        log::info!(
            "Pinning embedding revision {} to commit {}",
            self.models.embedding_revision,
            commit
        );
        self.models.embedding_revision = commit.to_string();
        true
    }

    pub fn models_dir(&self) -> &PathBuf {
        &self.models.models_dir
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_default_config_is_valid() {
        let config = Config::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.extraction.keyword_top_k, 20);
        assert_eq!(config.extraction.keyword_max_ngram, 3);
        assert!(!config.scoring.clamp_embedding_similarity);
    }

    #[test]
    fn test_load_creates_default_file() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("nested").join("config.toml");

        let config = Config::load_from(&path).unwrap();
        assert!(path.exists());
        assert_eq!(config.models.embedding_model, "potion-base-8M");
    }

    #[test]
    fn test_round_trip_preserves_overrides() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("config.toml");

        let mut config = Config::default();
        config.models.offline = true;
        config.output.format = OutputFormat::Json;
        config.save_to(&path).unwrap();

        let loaded = Config::load_from(&path).unwrap();
        assert!(loaded.models.offline);
        assert_eq!(loaded.output.format, OutputFormat::Json);
    }

    #[test]
    fn test_branch_revision_is_pinned_once() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("config.toml");
        let commit = "0123456789abcdef0123456789abcdef01234567";

        let mut config = Config::default();
        assert!(!config.revision_is_pinned());
        assert!(!config.pin_revision("main"));
        assert!(config.pin_revision(commit));
        assert!(!config.pin_revision("fedcba9876543210fedcba9876543210fedcba98"));
        config.save_to(&path).unwrap();

        let loaded = Config::load_from(&path).unwrap();
        assert!(loaded.revision_is_pinned());
        assert_eq!(loaded.models.embedding_revision, commit);
    }

    #[test]
    fn test_invalid_threshold_rejected() {
        let mut config = Config::default();
        config.extraction.keyword_dedup_threshold = 1.5;
        assert!(matches!(config.validate(), Err(AtsError::Configuration(_))));
    }
}
