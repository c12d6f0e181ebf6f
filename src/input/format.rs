//! Source format detection

use crate::error::{AtsError, Result};
use std::path::Path;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceFormat {
    Pdf,
    Text,
    Markdown,
}

impl SourceFormat {
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext.to_lowercase().as_str() {
            "pdf" => Some(SourceFormat::Pdf),
            "txt" => Some(SourceFormat::Text),
            "md" | "markdown" => Some(SourceFormat::Markdown),
            _ => None,
        }
    }

    pub fn detect(path: &Path) -> Result<Self> {
        let extension = path
            .extension()
            .and_then(|ext| ext.to_str())
            .ok_or_else(|| {
                AtsError::InvalidInput(format!("File has no extension: {}", path.display()))
            })?;

        Self::from_extension(extension).ok_or_else(|| {
            AtsError::UnsupportedFormat(format!(
                "'.{}' files are not supported ({})",
                extension,
                path.display()
            ))
        })
    }
}
