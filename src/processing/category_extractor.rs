//! Derives a category schema from a job description

use crate::config::ExtractionConfig;
use crate::error::Result;
use crate::processing::entities::{EntityLabel, EntityRecognizer};
use crate::processing::keywords::KeywordExtractor;
use crate::processing::patterns::{RuleOutcome, RuleSet};
use crate::processing::schema::{Category, CategorySchema};
use crate::processing::text_processor::TextProcessor;

/// Categories whose schema entry is a plain union of pattern-table matches
const UNION_CATEGORIES: [Category; 4] = [
    Category::Education,
    Category::Experience,
    Category::JobType,
    Category::Industry,
];

pub struct CategoryExtractor {
    processor: TextProcessor,
    keywords: KeywordExtractor,
    entities: EntityRecognizer,
    rules: RuleSet,
}

impl CategoryExtractor {
    /// Compiles every pattern table and gazetteer; failures here are fatal
    pub fn new(config: &ExtractionConfig) -> Result<Self> {
        Ok(Self {
            processor: TextProcessor::new(),
            keywords: KeywordExtractor::from_config(config),
            entities: EntityRecognizer::new()?,
            rules: RuleSet::standard()?,
        })
    }

    /// Build the full schema for a job description.
    ///
    /// Every set-valued category is present (possibly empty);
    /// `years_of_experience` is present only when a positive number was found.
    pub fn extract_categories(&self, text: &str) -> CategorySchema {
        let mut schema = CategorySchema::new();
        for category in Category::ALL {
            if category != Category::YearsOfExperience {
                schema.items_mut(category);
            }
        }

        self.extract_job_title(text, &mut schema);
        self.extract_skills(text, &mut schema);
        self.extract_entities(text, &mut schema);
        for category in UNION_CATEGORIES {
            self.extract_from_rules(category, text, &mut schema);
        }
        if let RuleOutcome::Number(years) = self.rules.apply(Category::YearsOfExperience, text) {
            schema.set_years(years);
        }

        log::debug!(
            "Extracted schema: {}",
            serde_json::to_string(&schema).unwrap_or_default()
        );
        schema
    }

    /// Schema restricted to a single category
    pub fn extract_specific_category(&self, text: &str, category: Category) -> CategorySchema {
        let mut schema = CategorySchema::new();
        match category {
            Category::JobTitle => self.extract_job_title(text, &mut schema),
            Category::Skills => {
                schema.items_mut(Category::Skills);
                self.extract_skills(text, &mut schema);
                for entity in self.entities.recognize(text) {
                    if matches!(entity.label, EntityLabel::Organization | EntityLabel::Product) {
                        schema.add_item(Category::Skills, &entity.text);
                    }
                }
            }
            Category::Location => {
                schema.items_mut(Category::Location);
                for entity in self.entities.recognize(text) {
                    if entity.label == EntityLabel::GeoPoliticalEntity {
                        schema.add_item(Category::Location, &entity.text);
                    }
                }
            }
            Category::YearsOfExperience => {
                if let RuleOutcome::Number(years) = self.rules.apply(category, text) {
                    schema.set_years(years);
                }
            }
            Category::Education | Category::Experience | Category::JobType | Category::Industry => {
                schema.items_mut(category);
                self.extract_from_rules(category, text, &mut schema);
            }
        }
        schema
    }

    fn extract_job_title(&self, text: &str, schema: &mut CategorySchema) {
        schema.items_mut(Category::JobTitle);
        match self.rules.apply(Category::JobTitle, text) {
            RuleOutcome::Items(items) => {
                for item in items {
                    schema.add_item(Category::JobTitle, &item);
                }
            }
            _ => {
                if let Some(sentence) = self.processor.first_sentence(text) {
                    log::debug!("No title pattern matched, using first sentence");
                    schema.add_item(Category::JobTitle, &sentence);
                }
            }
        }
    }

    fn extract_skills(&self, text: &str, schema: &mut CategorySchema) {
        for phrase in self.keywords.extract_phrases(text, &self.processor) {
            schema.add_item(Category::Skills, &phrase);
        }
        self.extract_from_rules(Category::Skills, text, schema);
    }

    fn extract_entities(&self, text: &str, schema: &mut CategorySchema) {
        for entity in self.entities.recognize(text) {
            let category = match entity.label {
                EntityLabel::Organization | EntityLabel::Product => Category::Skills,
                EntityLabel::GeoPoliticalEntity => Category::Location,
            };
            schema.add_item(category, &entity.text);
        }
    }

    fn extract_from_rules(&self, category: Category, text: &str, schema: &mut CategorySchema) {
        if let RuleOutcome::Items(items) = self.rules.apply(category, text) {
            for item in items {
                schema.add_item(category, &item);
            }
        }
    }
}

/// Per-category union of two schemas; years take the larger value
pub fn merge_schemas(a: &CategorySchema, b: &CategorySchema) -> CategorySchema {
    a.merge(b)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;

    fn extractor() -> CategoryExtractor {
        CategoryExtractor::new(&Config::default().extraction).unwrap()
    }

    const MARKETING_JD: &str = "job title: Marketing Coordinator
Company: XYZ Corp
Location: New York, NY
Job Type: Full-Time

XYZ Corp is seeking a Marketing Coordinator to assist in the development of marketing campaigns.
Bachelor's degree in Marketing, Business, or related field.
1-2 years of experience in marketing or communications.
Proficient in Microsoft Office Suite and social media platforms.";

    #[test]
    fn test_marketing_job_description() {
        let schema = extractor().extract_categories(MARKETING_JD);

        let title = schema.items(Category::JobTitle).unwrap();
        assert!(title.contains("marketing coordinator"));

        let location = schema.items(Category::Location).unwrap();
        assert!(location.contains("new york"));
        assert!(location.contains("ny"));

        let skills = schema.items(Category::Skills).unwrap();
        assert!(skills.contains("xyz corp"));
        assert!(skills.contains("microsoft office suite"));

        assert!(schema.items(Category::JobType).unwrap().contains("full-time"));
        assert!(schema
            .items(Category::Education)
            .unwrap()
            .iter()
            .any(|e| e.starts_with("bachelor")));
        assert_eq!(schema.years(), Some(2));
    }

    #[test]
    fn test_all_set_categories_present() {
        let schema = extractor().extract_categories("Sweep the floors.");

        for category in Category::ALL {
            if category == Category::YearsOfExperience {
                assert!(!schema.contains(category));
            } else {
                assert!(schema.items(category).is_some(), "{category}");
            }
        }
        assert!(schema.items(Category::Education).unwrap().is_empty());
    }

    #[test]
    fn test_title_falls_back_to_first_sentence() {
        let schema = extractor().extract_categories("Great pay. Apply today.");
        let titles = schema.items(Category::JobTitle).unwrap();

        assert_eq!(titles.len(), 1);
        assert!(titles.contains("great pay."));
    }

    #[test]
    fn test_extraction_is_deterministic() {
        let extractor = extractor();
        assert_eq!(
            extractor.extract_categories(MARKETING_JD),
            extractor.extract_categories(MARKETING_JD)
        );
    }

    #[test]
    fn test_extract_specific_category() {
        let extractor = extractor();
        let schema = extractor.extract_specific_category(MARKETING_JD, Category::JobType);

        assert_eq!(schema.len(), 1);
        assert!(schema.items(Category::JobType).unwrap().contains("full-time"));

        let years = extractor.extract_specific_category("3 years of experience", Category::YearsOfExperience);
        assert_eq!(years.years(), Some(3));
    }

    #[test]
    fn test_merge_schemas() {
        let extractor = extractor();
        let a = extractor.extract_specific_category("Remote contract role", Category::JobType);
        let b = extractor.extract_specific_category("Full-time, remote", Category::JobType);

        let merged = merge_schemas(&a, &b);
        let job_type = merged.items(Category::JobType).unwrap();
        assert!(job_type.contains("remote"));
        assert!(job_type.contains("contract"));
        assert!(job_type.contains("full-time"));
    }
}
