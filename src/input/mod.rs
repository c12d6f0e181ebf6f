//! Document input: format detection and plain-text extraction

pub mod format;
pub mod loader;
pub mod text_extractor;

pub use format::SourceFormat;
pub use loader::DocumentLoader;
