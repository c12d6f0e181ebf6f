//! Sentence embeddings and cosine similarity.
//!
//! `EmbeddingService` owns one encoder instance behind an `Arc`. It is built
//! once at start-up and holds no per-call mutable state, so clones can be
//! handed to concurrent requests without locking.

use crate::config::Config;
use crate::error::{AtsError, Result};
use crate::processing::embedding_manager::EmbeddingModelManager;
use model2vec_rs::model::StaticModel;
use std::collections::hash_map::DefaultHasher;
use std::collections::BTreeSet;
use std::hash::{Hash, Hasher};
use std::path::Path;
use std::sync::Arc;
use std::time::Instant;

/// Anything that turns texts into fixed-size vectors
pub trait TextEncoder: Send + Sync {
    fn encode(&self, texts: &[String]) -> Vec<Vec<f32>>;

    fn encode_single(&self, text: &str) -> Vec<f32> {
        self.encode(&[text.to_string()])
            .into_iter()
            .next()
            .unwrap_or_default()
    }

    fn name(&self) -> &str;
}

/// Pretrained Model2Vec static embeddings
pub struct Model2VecEncoder {
    model: StaticModel,
    name: String,
}

impl Model2VecEncoder {
    pub fn load(model_path: &Path, name: &str) -> Result<Self> {
        let start_time = Instant::now();
        log::info!("Loading Model2Vec embedding model from: {}", model_path.display());

        let model = StaticModel::from_pretrained(
            model_path,
            None, // token
            None, // normalize
            None, // subfolder
        )
        .map_err(|e| AtsError::Embedding(format!("Failed to load model: {}", e)))?;

        log::info!("Model loaded successfully in {:.2?}", start_time.elapsed());
        Ok(Self {
            model,
            name: name.to_string(),
        })
    }
}

impl TextEncoder for Model2VecEncoder {
    fn encode(&self, texts: &[String]) -> Vec<Vec<f32>> {
        self.model.encode(texts)
    }

    fn encode_single(&self, text: &str) -> Vec<f32> {
        self.model.encode_single(text)
    }

    fn name(&self) -> &str {
        &self.name
    }
}

/// Feature-hashing encoder over character trigrams and words.
///
/// Needs no model files; used for offline runs and tests. `DefaultHasher::new()`
/// uses fixed keys, so vectors are stable across runs of the same build.
#[derive(Debug, Clone)]
pub struct HashingEncoder {
    dimension: usize,
}

impl Default for HashingEncoder {
    fn default() -> Self {
        Self::new(256)
    }
}

impl HashingEncoder {
    pub fn new(dimension: usize) -> Self {
        Self {
            dimension: dimension.max(1),
        }
    }

    fn bucket<T: Hash + ?Sized>(&self, value: &T) -> usize {
        let mut hasher = DefaultHasher::new();
        value.hash(&mut hasher);
        (hasher.finish() % self.dimension as u64) as usize
    }

    fn embed(&self, text: &str) -> Vec<f32> {
        let mut vector = vec![0.0f32; self.dimension];
        let normalized = text.to_lowercase();

        for trigram in trigrams(&normalized) {
            vector[self.bucket(&trigram)] += 1.0;
        }
        for word in normalized.split_whitespace() {
            vector[self.bucket(word)] += 2.0;
        }

        let magnitude: f32 = vector.iter().map(|x| x * x).sum::<f32>().sqrt();
        if magnitude > 0.0 {
            for v in &mut vector {
                *v /= magnitude;
            }
        }
        vector
    }
}

impl TextEncoder for HashingEncoder {
    fn encode(&self, texts: &[String]) -> Vec<Vec<f32>> {
        texts.iter().map(|t| self.embed(t)).collect()
    }

    fn name(&self) -> &str {
        "hashing"
    }
}

fn trigrams(text: &str) -> BTreeSet<String> {
    let chars: Vec<char> = format!("  {} ", text).chars().collect();
    chars.windows(3).map(|w| w.iter().collect()).collect()
}

#[derive(Clone)]
pub struct EmbeddingService {
    encoder: Arc<dyn TextEncoder>,
    clamp: bool,
}

impl EmbeddingService {
    pub fn new(encoder: Arc<dyn TextEncoder>) -> Self {
        Self {
            encoder,
            clamp: false,
        }
    }

    /// Service backed by the hashing encoder
    pub fn offline() -> Self {
        Self::new(Arc::new(HashingEncoder::default()))
    }

    /// Clamp every similarity into [0, 1] instead of [-1, 1]
    pub fn with_clamping(mut self, clamp: bool) -> Self {
        self.clamp = clamp;
        self
    }

    /// Load the configured model, downloading it into the models directory if needed
    pub async fn from_config(config: &Config) -> Result<Self> {
        let service = if config.models.offline {
            log::warn!("Offline mode: using hashing encoder instead of a pretrained model");
            Self::offline()
        } else {
            let mut manager = EmbeddingModelManager::new(config.models_dir().clone()).await?;
            let model_id = manager
                .resolve_model_id(&config.models.embedding_model)
                .ok_or_else(|| {
                    AtsError::Configuration(format!(
                        "Unknown embedding model: {}",
                        config.models.embedding_model
                    ))
                })?;
            let model_path = manager
                .ensure_model_available(&model_id, &config.models.embedding_revision)
                .await?;
            let encoder = Model2VecEncoder::load(&model_path, &model_id)?;
            Self::new(Arc::new(encoder))
        };
        Ok(service.with_clamping(config.scoring.clamp_embedding_similarity))
    }

    pub fn model_name(&self) -> &str {
        self.encoder.name()
    }

    pub fn encode(&self, texts: &[String]) -> Vec<Vec<f32>> {
        self.encoder.encode(texts)
    }

    /// Cosine similarity of two texts, each encoded independently
    pub fn similarity(&self, text_a: &str, text_b: &str) -> Result<f64> {
        let a = self.encoder.encode_single(text_a);
        let b = self.encoder.encode_single(text_b);
        Ok(self.finish(Self::cosine_similarity(&a, &b)?))
    }

    /// `rows x cols` matrix of cosine similarities
    pub fn similarity_matrix(&self, rows: &[String], cols: &[String]) -> Result<Vec<Vec<f64>>> {
        let row_vectors = self.encoder.encode(rows);
        let col_vectors = self.encoder.encode(cols);

        row_vectors
            .iter()
            .map(|r| {
                col_vectors
                    .iter()
                    .map(|c| Self::cosine_similarity(r, c).map(|s| self.finish(s)))
                    .collect::<Result<Vec<f64>>>()
            })
            .collect()
    }

    fn finish(&self, similarity: f64) -> f64 {
        if self.clamp {
            similarity.clamp(0.0, 1.0)
        } else {
            similarity
        }
    }

    /// Cosine similarity between two embeddings; zero vectors give 0.0
    pub fn cosine_similarity(a: &[f32], b: &[f32]) -> Result<f64> {
        if a.len() != b.len() {
            return Err(AtsError::Embedding(format!(
                "Embedding dimensions don't match: {} vs {}",
                a.len(),
                b.len()
            )));
        }

        let dot_product: f64 = a.iter().zip(b).map(|(x, y)| *x as f64 * *y as f64).sum();
        let norm_a: f64 = a.iter().map(|x| (*x as f64).powi(2)).sum::<f64>().sqrt();
        let norm_b: f64 = b.iter().map(|x| (*x as f64).powi(2)).sum::<f64>().sqrt();

        if norm_a == 0.0 || norm_b == 0.0 {
            Ok(0.0)
        } else {
            Ok(dot_product / (norm_a * norm_b))
        }
    }
}
