//! Extraction and scoring pipeline

pub mod ats_calculator;
pub mod category_extractor;
pub mod embedding_manager;
pub mod embeddings;
pub mod entities;
pub mod info_extractor;
pub mod keywords;
pub mod patterns;
pub mod schema;
pub mod scorer;
pub mod text_processor;
