//! Loads resumes and job descriptions from disk

use crate::error::{AtsError, Result};
use crate::input::format::SourceFormat;
use crate::input::text_extractor::{MarkdownExtractor, PdfExtractor, PlainTextExtractor, TextExtractor};
use log::info;
use std::path::Path;

#[derive(Debug, Default)]
pub struct DocumentLoader;

impl DocumentLoader {
    pub fn new() -> Self {
        Self
    }

    /// Plain text of the document at `path`; empty documents are rejected
    pub async fn load(&self, path: &Path) -> Result<String> {
        if !path.exists() {
            return Err(AtsError::InvalidInput(format!(
                "File does not exist: {}",
                path.display()
            )));
        }

        let text = match SourceFormat::detect(path)? {
            SourceFormat::Pdf => {
                info!("Extracting text from PDF: {}", path.display());
                PdfExtractor.extract(path).await?
            }
            SourceFormat::Text => {
                info!("Reading plain text file: {}", path.display());
                PlainTextExtractor.extract(path).await?
            }
            SourceFormat::Markdown => {
                info!("Processing markdown file: {}", path.display());
                MarkdownExtractor.extract(path).await?
            }
        };

        if text.trim().is_empty() {
            return Err(AtsError::InvalidInput(format!(
                "No text could be extracted from {}",
                path.display()
            )));
        }
        Ok(text)
    }
}
