//! Error handling for the ATS scorer

use thiserror::Error;

#[derive(Error, Debug)]
pub enum AtsError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("PDF extraction error: {0}")]
    PdfExtraction(String),

    #[error("File format not supported: {0}")]
    UnsupportedFormat(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Raised while building the extraction subsystem. Always fatal.
    #[error("Initialization error: {0}")]
    Initialization(String),

    #[error("Embedding error: {0}")]
    Embedding(String),

    #[error("Model error: {0}")]
    ModelError(String),

    #[error("Scoring error in '{category}': {message}")]
    Scoring { category: String, message: String },

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, AtsError>;

impl AtsError {
    pub fn scoring(category: impl Into<String>, message: impl Into<String>) -> Self {
        AtsError::Scoring {
            category: category.into(),
            message: message.into(),
        }
    }
}

/// model2vec reports load failures through anyhow
impl From<anyhow::Error> for AtsError {
    fn from(err: anyhow::Error) -> Self {
        AtsError::ModelError(err.to_string())
    }
}

/// A pattern table that fails to compile means the extractor cannot start
impl From<regex::Error> for AtsError {
    fn from(err: regex::Error) -> Self {
        AtsError::Initialization(format!("invalid pattern: {}", err))
    }
}
