//! ATS-style resume scoring library
//!
//! A job description is turned into a category schema, both texts are
//! matched against it, and per-category scores plus whole-document
//! semantic similarity are combined into a weighted 0-100 score.

pub mod cli;
pub mod config;
pub mod error;
pub mod input;
pub mod output;
pub mod processing;

pub use config::Config;
pub use error::{AtsError, Result};
pub use processing::ats_calculator::{generate_feedback, AtsCalculator, ScoreOutcome};
pub use processing::embeddings::EmbeddingService;
