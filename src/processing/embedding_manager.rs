//! Download and cache management for Model2Vec embedding models

use crate::error::{AtsError, Result};
use hf_hub::api::tokio::Api;
use hf_hub::{Repo, RepoType};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::path::{Path, PathBuf};
use tokio::fs;

/// Files a Model2Vec model directory must contain to be loadable
const REQUIRED_FILES: [&str; 3] = ["tokenizer.json", "model.safetensors", "config.json"];
const OPTIONAL_FILES: [&str; 1] = ["README.md"];
const MANIFEST_FILE: &str = "ats-model.json";

/// Information about an available embedding model
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmbeddingModelInfo {
    pub name: String,
    pub repo_id: String,
    pub size_mb: u64,
    pub description: String,
    pub dimensions: u32,
}

/// Written next to the model files; records what was fetched
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
struct ModelManifest {
    repo_id: String,
    revision: String,
    /// Commit the revision resolved to at download time
    #[serde(default)]
    commit: Option<String>,
}

/// True for a full 40-character Hub commit hash; branch and tag names are not pins
pub fn is_commit_revision(revision: &str) -> bool {
    revision.len() == 40 && revision.chars().all(|c| c.is_ascii_hexdigit())
}

pub struct EmbeddingModelManager {
    models_dir: PathBuf,
    available_models: BTreeMap<String, EmbeddingModelInfo>,
    downloaded_models: BTreeSet<String>,
}

impl EmbeddingModelManager {
    pub async fn new(models_dir: PathBuf) -> Result<Self> {
        if !models_dir.exists() {
            fs::create_dir_all(&models_dir).await.map_err(|e| {
                AtsError::ModelError(format!("Failed to create models directory: {}", e))
            })?;
        }

        let mut manager = Self {
            models_dir,
            available_models: catalog(),
            downloaded_models: BTreeSet::new(),
        };
        manager.scan_downloaded_models().await?;

        Ok(manager)
    }

    async fn scan_downloaded_models(&mut self) -> Result<()> {
        let mut entries = fs::read_dir(&self.models_dir).await.map_err(|e| {
            AtsError::ModelError(format!("Failed to scan models directory: {}", e))
        })?;

        while let Some(entry) = entries.next_entry().await? {
            if !entry.file_type().await?.is_dir() {
                continue;
            }
            let model_id = entry.file_name().to_string_lossy().to_string();
            if self.available_models.contains_key(&model_id)
                && is_complete_model_directory(&entry.path()).await
            {
                log::debug!("Found downloaded embedding model: {}", model_id);
                self.downloaded_models.insert(model_id);
            }
        }

        Ok(())
    }

    /// Download `model_id` at `revision` from the Hugging Face Hub
    pub async fn download_model(&mut self, model_id: &str, revision: &str) -> Result<PathBuf> {
        let model_info = self
            .available_models
            .get(model_id)
            .ok_or_else(|| AtsError::ModelError(format!("Unknown embedding model: {}", model_id)))?
            .clone();

        let model_dir = self.models_dir.join(model_id);
        log::info!(
            "Downloading embedding model {} ({} MB) from {}@{}",
            model_info.name,
            model_info.size_mb,
            model_info.repo_id,
            revision
        );

        fs::create_dir_all(&model_dir).await.map_err(|e| {
            AtsError::ModelError(format!("Failed to create model directory: {}", e))
        })?;

        let api = Api::new()
            .map_err(|e| AtsError::ModelError(format!("Failed to initialize HF API: {}", e)))?;
        let repo = api.repo(Repo::with_revision(
            model_info.repo_id.clone(),
            RepoType::Model,
            revision.to_string(),
        ));

        let commit = match repo.info().await {
            Ok(info) => Some(info.sha),
            Err(e) => {
                log::warn!("Could not resolve {}@{} to a commit: {}", model_info.repo_id, revision, e);
                None
            }
        };

        for file in REQUIRED_FILES.iter().chain(OPTIONAL_FILES.iter()) {
            match repo.get(file).await {
                Ok(cached_path) => {
                    fs::copy(&cached_path, model_dir.join(file)).await.map_err(|e| {
                        AtsError::ModelError(format!("Failed to copy {}: {}", file, e))
                    })?;
                    log::debug!("Downloaded {}", file);
                }
                Err(e) if OPTIONAL_FILES.contains(file) => {
                    log::debug!("Optional file {} not available: {}", file, e);
                }
                Err(e) => {
                    return Err(AtsError::ModelError(format!(
                        "Failed to download required file {}: {}",
                        file, e
                    )));
                }
            }
        }

        let manifest = ModelManifest {
            repo_id: model_info.repo_id.clone(),
            revision: revision.to_string(),
            commit,
        };
        fs::write(model_dir.join(MANIFEST_FILE), serde_json::to_vec_pretty(&manifest)?).await?;

        self.downloaded_models.insert(model_id.to_string());
        log::info!("Embedding model {} downloaded", model_info.name);
        Ok(model_dir)
    }

    pub fn get_model_path(&self, model_id: &str) -> Option<PathBuf> {
        self.downloaded_models
            .contains(model_id)
            .then(|| self.models_dir.join(model_id))
    }

    /// Path to the model at `revision`, downloading it when missing or pinned differently
    pub async fn ensure_model_available(&mut self, model_id: &str, revision: &str) -> Result<PathBuf> {
        if let Some(path) = self.get_model_path(model_id) {
            match self.read_manifest(model_id).await {
                Some(found) if found.revision == revision || found.commit.as_deref() == Some(revision) => {
                    return Ok(path)
                }
                Some(found) => log::info!(
                    "Model {} is at revision {}, fetching {}",
                    model_id,
                    found.commit.unwrap_or(found.revision),
                    revision
                ),
                None => log::warn!("Model {} has no manifest, fetching {}", model_id, revision),
            }
        }

        self.download_model(model_id, revision).await
    }

    /// Revision recorded when the model was downloaded
    pub async fn downloaded_revision(&self, model_id: &str) -> Option<String> {
        self.read_manifest(model_id).await.map(|m| m.revision)
    }

    /// Commit the downloaded files came from, when it could be resolved
    pub async fn downloaded_commit(&self, model_id: &str) -> Option<String> {
        self.read_manifest(model_id).await.and_then(|m| m.commit)
    }

    async fn read_manifest(&self, model_id: &str) -> Option<ModelManifest> {
        let path = self.models_dir.join(model_id).join(MANIFEST_FILE);
        let bytes = fs::read(path).await.ok()?;
        serde_json::from_slice(&bytes).ok()
    }

    /// Catalog entries keyed by model id
    pub fn list_available_models(&self) -> impl Iterator<Item = (&String, &EmbeddingModelInfo)> {
        self.available_models.iter()
    }

    pub fn list_downloaded_models(&self) -> Vec<String> {
        self.downloaded_models.iter().cloned().collect()
    }

    pub fn get_model_info(&self, model_id: &str) -> Option<&EmbeddingModelInfo> {
        self.available_models.get(model_id)
    }

    pub fn is_model_downloaded(&self, model_id: &str) -> bool {
        self.downloaded_models.contains(model_id)
    }

    /// Resolve a catalog id, hub repo id or display name to a catalog id
    pub fn resolve_model_id(&self, input: &str) -> Option<String> {
        if self.available_models.contains_key(input) {
            return Some(input.to_string());
        }

        let input_lower = input.to_lowercase();
        self.available_models
            .iter()
            .find(|(_, info)| info.repo_id == input || info.name.to_lowercase() == input_lower)
            .map(|(id, _)| id.clone())
    }
}

async fn is_complete_model_directory(path: &Path) -> bool {
    for file in REQUIRED_FILES {
        if fs::metadata(path.join(file)).await.is_err() {
            return false;
        }
    }
    true
}

fn catalog() -> BTreeMap<String, EmbeddingModelInfo> {
    let entries = [
        (
            "potion-base-8M",
            "Potion Base 8M",
            "minishlab/potion-base-8M",
            33,
            "Compact general-purpose static embeddings (default)",
            256,
        ),
        (
            "m2v-base",
            "Model2Vec Base",
            "minishlab/M2V_base_output",
            90,
            "Model2Vec base embeddings distilled from bge-base",
            256,
        ),
        (
            "m2v-large",
            "Model2Vec Large",
            "minishlab/M2V_large_output",
            250,
            "Higher-capacity Model2Vec embeddings",
            512,
        ),
    ];

    entries
        .into_iter()
        .map(|(id, name, repo_id, size_mb, description, dimensions)| {
            (
                id.to_string(),
                EmbeddingModelInfo {
                    name: name.to_string(),
                    repo_id: repo_id.to_string(),
                    size_mb,
                    description: description.to_string(),
                    dimensions,
                },
            )
        })
        .collect()
}
