//! Finds which schema items are present in a given text

use crate::config::ExtractionConfig;
use crate::error::Result;
use crate::processing::keywords::KeywordExtractor;
use crate::processing::patterns::RuleSet;
use crate::processing::schema::{Category, CategorySchema, InfoStructure, InfoValue, SchemaValue};
use crate::processing::text_processor::TextProcessor;
use std::collections::BTreeSet;

pub struct InfoExtractor {
    processor: TextProcessor,
    keywords: KeywordExtractor,
    rules: RuleSet,
}

impl InfoExtractor {
    pub fn new(config: &ExtractionConfig) -> Result<Self> {
        Ok(Self {
            processor: TextProcessor::new(),
            keywords: KeywordExtractor::from_config(config),
            rules: RuleSet::standard()?,
        })
    }

    /// Info structure for `text`, keyed exactly like `schema`.
    ///
    /// A set item is kept when it is one of the text's own keywords or occurs
    /// as a whole word. Years come from the first numeric rule that matches.
    pub fn extract_info(&self, text: &str, schema: &CategorySchema) -> InfoStructure {
        let text_keywords: BTreeSet<String> = self
            .keywords
            .extract_phrases(text, &self.processor)
            .into_iter()
            .collect();

        let mut info = InfoStructure::new();
        for (category, value) in schema.iter() {
            let extracted = match value {
                SchemaValue::Items(items) => InfoValue::Items(
                    items
                        .iter()
                        .filter(|item| {
                            text_keywords.contains(item.as_str())
                                || self.processor.contains_whole_word(text, item)
                        })
                        .cloned()
                        .collect(),
                ),
                SchemaValue::Years(_) => InfoValue::Years(
                    self.rules
                        .first_number(Category::YearsOfExperience, text)
                        .unwrap_or(0),
                ),
            };
            info.insert(category, extracted);
        }
        info
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;

    fn schema_with(category: Category, items: &[&str]) -> CategorySchema {
        let mut schema = CategorySchema::new();
        for item in items {
            schema.add_item(category, item);
        }
        schema
    }

    #[test]
    fn test_whole_word_items_are_kept() {
        let extractor = InfoExtractor::new(&Config::default().extraction).unwrap();
        let schema = schema_with(Category::Skills, &["aws", "java", "python"]);

        let info = extractor.extract_info("Shipped Python services on AWS; some JavaScript.", &schema);
        assert_eq!(info.items(Category::Skills), ["aws", "python"]);
    }

    #[test]
    fn test_keys_mirror_schema() {
        let extractor = InfoExtractor::new(&Config::default().extraction).unwrap();
        let mut schema = schema_with(Category::Education, &["phd"]);
        schema.items_mut(Category::Location);
        schema.set_years(5);

        let info = extractor.extract_info("Nothing relevant here", &schema);
        let keys: Vec<Category> = info.categories().collect();
        assert_eq!(
            keys,
            vec![Category::Education, Category::Location, Category::YearsOfExperience]
        );
        assert!(info.items(Category::Education).is_empty());
        assert_eq!(info.years(), Some(0));
    }

    #[test]
    fn test_years_use_first_matching_rule() {
        let extractor = InfoExtractor::new(&Config::default().extraction).unwrap();
        let mut schema = CategorySchema::new();
        schema.set_years(7);

        let info = extractor.extract_info(
            "Minimum 3 years in retail. 7+ years of experience preferred.",
            &schema,
        );
        assert_eq!(info.years(), Some(7));

        let info = extractor.extract_info("At least 4 yrs in sales, 9 years overall", &schema);
        assert_eq!(info.years(), Some(4));
    }
}
