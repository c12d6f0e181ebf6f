//! End-to-end ATS scoring: schema extraction, per-category scores, weighted total

use crate::config::Config;
use crate::error::Result;
use crate::processing::category_extractor::CategoryExtractor;
use crate::processing::embeddings::EmbeddingService;
use crate::processing::info_extractor::InfoExtractor;
use crate::processing::schema::{Category, InfoStructure, InfoValue};
use crate::processing::scorer::CategoryScorer;
use crate::processing::text_processor::TextProcessor;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::time::Instant;

/// Whole-document embedding similarity entry of the score map
pub const TEXT_SIMILARITY: &str = "text_similarity";

/// Fixed aggregation weights; they sum to 1.0
pub const WEIGHTS: [(&str, f64); 9] = [
    ("job_title", 0.15),
    ("skills", 0.30),
    ("education", 0.10),
    ("experience", 0.10),
    ("years_of_experience", 0.10),
    ("industry", 0.05),
    ("job_type", 0.05),
    ("location", 0.05),
    (TEXT_SIMILARITY, 0.10),
];

const NEEDS_IMPROVEMENT_BELOW: f64 = 70.0;
const GOOD_MATCH_BELOW: f64 = 85.0;
const TITLE_FEEDBACK_BELOW: f64 = 0.5;

/// Category name -> score, including `text_similarity`
pub type CategoryScores = BTreeMap<String, f64>;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoreOutcome {
    /// Weighted total scaled to 0-100
    pub score: f64,
    pub category_scores: CategoryScores,
    pub resume_info: InfoStructure,
    pub job_info: InfoStructure,
}

/// Scores one resume against one job description.
///
/// Holds no per-call state; a single instance can serve any number of requests.
pub struct AtsCalculator {
    processor: TextProcessor,
    categories: CategoryExtractor,
    info: InfoExtractor,
    scorer: CategoryScorer,
    embeddings: EmbeddingService,
}

impl AtsCalculator {
    pub fn new(config: &Config, embeddings: EmbeddingService) -> Result<Self> {
        Ok(Self {
            processor: TextProcessor::new(),
            categories: CategoryExtractor::new(&config.extraction)?,
            info: InfoExtractor::new(&config.extraction)?,
            scorer: CategoryScorer::new(embeddings.clone()),
            embeddings,
        })
    }

    /// Load the configured embedding model and build the calculator
    pub async fn from_config(config: &Config) -> Result<Self> {
        let embeddings = EmbeddingService::from_config(config).await?;
        Self::new(config, embeddings)
    }

    pub fn embedding_model(&self) -> &str {
        self.embeddings.model_name()
    }

    pub fn compute_score(&self, resume_text: &str, job_description: &str) -> ScoreOutcome {
        let start_time = Instant::now();
        let resume_text = self.processor.normalize_unicode(resume_text);
        let job_description = self.processor.normalize_unicode(job_description);

        log::info!("Extracting categories from job description");
        let schema = self.categories.extract_categories(&job_description);
        let resume_info = self.info.extract_info(&resume_text, &schema);
        let job_info = self.info.extract_info(&job_description, &schema);
        log::debug!("Resume info: {:?}", resume_info);
        log::debug!("Job info: {:?}", job_info);

        let mut category_scores = self.category_scores(&resume_info, &job_info);
        let text_similarity = match self.embeddings.similarity(&resume_text, &job_description) {
            Ok(similarity) => similarity,
            Err(e) => {
                log::error!("Error calculating score for {}: {}", TEXT_SIMILARITY, e);
                0.0
            }
        };
        category_scores.insert(TEXT_SIMILARITY.to_string(), text_similarity);

        let score = total_score(&category_scores) * 100.0;
        log::info!(
            "ATS score {:.1} computed in {:.2?}",
            score,
            start_time.elapsed()
        );

        ScoreOutcome {
            score,
            category_scores,
            resume_info,
            job_info,
        }
    }

    /// One score per job_info category; a failing category scores 0.0
    fn category_scores(&self, resume_info: &InfoStructure, job_info: &InfoStructure) -> CategoryScores {
        let mut scores = CategoryScores::new();
        for (category, job_value) in job_info.iter() {
            let empty = InfoValue::Items(Vec::new());
            let resume_value = resume_info.get(category).unwrap_or(&empty);

            let score = match self.scorer.score(category, resume_value, job_value) {
                Ok(score) => score,
                Err(e) => {
                    log::error!("Error calculating score for {}: {}", category, e);
                    0.0
                }
            };
            log::debug!("{} score: {:.3}", category, score);
            scores.insert(category.as_str().to_string(), score);
        }
        scores
    }
}

/// Weighted sum over the weight table; missing categories contribute 0
pub fn total_score(category_scores: &CategoryScores) -> f64 {
    WEIGHTS
        .iter()
        .map(|(name, weight)| weight * category_scores.get(*name).copied().unwrap_or(0.0))
        .sum()
}

/// Human-readable feedback, one sentence per line
pub fn generate_feedback(
    score: f64,
    category_scores: &CategoryScores,
    resume_info: &InfoStructure,
    job_info: &InfoStructure,
) -> String {
    let mut feedback = Vec::new();

    let verdict = if score < NEEDS_IMPROVEMENT_BELOW {
        "Your overall match with the job requirements needs improvement."
    } else if score < GOOD_MATCH_BELOW {
        "You have a good match with the job requirements, but there's room for improvement."
    } else {
        "Excellent match with the job requirements!"
    };
    feedback.push(verdict.to_string());

    if resume_info.contains(Category::JobTitle) && job_info.contains(Category::JobTitle) {
        if let Some(title_score) = category_scores.get(Category::JobTitle.as_str()) {
            if *title_score < TITLE_FEEDBACK_BELOW {
                feedback.push(format!(
                    "Your resume title '{}' doesn't closely match the job title '{}'. Consider aligning your resume title more closely with the job title.",
                    resume_info.items(Category::JobTitle).join(" "),
                    job_info.items(Category::JobTitle).join(" ")
                ));
            }
        }
    }

    for (category, value) in job_info.iter() {
        if matches!(category, Category::YearsOfExperience | Category::JobTitle) {
            continue;
        }
        let InfoValue::Items(job_items) = value else {
            continue;
        };
        let resume_items = resume_info.items(category);
        let missing: Vec<&str> = job_items
            .iter()
            .filter(|item| !resume_items.contains(*item))
            .map(String::as_str)
            .collect();
        if !missing.is_empty() {
            feedback.push(format!(
                "Consider adding or highlighting these {}: {}.",
                category,
                missing.join(", ")
            ));
        }
    }

    if let (Some(resume_years), Some(job_years)) = (resume_info.years(), job_info.years()) {
        if resume_years < job_years {
            feedback.push(format!(
                "The job requires {} years of experience, but your resume shows {} years.",
                job_years, resume_years
            ));
        }
    }

    log::debug!("Generated {} feedback sentences", feedback.len());
    feedback.join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn info(entries: &[(Category, &[&str])]) -> InfoStructure {
        let mut info = InfoStructure::new();
        for (category, items) in entries {
            info.insert(
                *category,
                InfoValue::Items(items.iter().map(|s| s.to_string()).collect()),
            );
        }
        info
    }

    #[test]
    fn test_weights_sum_to_one() {
        let sum: f64 = WEIGHTS.iter().map(|(_, w)| w).sum();
        assert!((sum - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_missing_categories_are_not_renormalized() {
        let mut scores = CategoryScores::new();
        scores.insert("skills".to_string(), 1.0);

        assert!((total_score(&scores) - 0.30).abs() < 1e-12);
    }

    #[test]
    fn test_perfect_scores_total_one() {
        let scores: CategoryScores = WEIGHTS
            .iter()
            .map(|(name, _)| (name.to_string(), 1.0))
            .collect();

        assert!((total_score(&scores) - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_feedback_thresholds() {
        let empty = InfoStructure::new();
        let scores = CategoryScores::new();

        let low = generate_feedback(69.999, &scores, &empty, &empty);
        assert_eq!(low, "Your overall match with the job requirements needs improvement.");

        let good = generate_feedback(70.0, &scores, &empty, &empty);
        assert!(good.starts_with("You have a good match"));

        let excellent = generate_feedback(85.0, &scores, &empty, &empty);
        assert_eq!(excellent, "Excellent match with the job requirements!");
    }

    #[test]
    fn test_feedback_sentences_in_order() {
        let mut resume_info = info(&[
            (Category::JobTitle, &["data analyst"]),
            (Category::Skills, &["sql"]),
            (Category::Location, &[]),
        ]);
        resume_info.insert(Category::YearsOfExperience, InfoValue::Years(2));
        let mut job_info = info(&[
            (Category::JobTitle, &["backend engineer"]),
            (Category::Skills, &["aws", "python", "sql"]),
            (Category::Location, &["berlin"]),
        ]);
        job_info.insert(Category::YearsOfExperience, InfoValue::Years(5));

        let mut scores = CategoryScores::new();
        scores.insert("job_title".to_string(), 0.1);

        let feedback = generate_feedback(50.0, &scores, &resume_info, &job_info);
        let lines: Vec<&str> = feedback.lines().collect();
        assert_eq!(
            lines,
            vec![
                "Your overall match with the job requirements needs improvement.",
                "Your resume title 'data analyst' doesn't closely match the job title 'backend engineer'. Consider aligning your resume title more closely with the job title.",
                "Consider adding or highlighting these location: berlin.",
                "Consider adding or highlighting these skills: aws, python.",
                "The job requires 5 years of experience, but your resume shows 2 years.",
            ]
        );
    }

    #[test]
    fn test_no_title_sentence_for_close_titles() {
        let resume_info = info(&[(Category::JobTitle, &["engineer"])]);
        let job_info = info(&[(Category::JobTitle, &["engineer"])]);
        let mut scores = CategoryScores::new();
        scores.insert("job_title".to_string(), 0.5);

        let feedback = generate_feedback(90.0, &scores, &resume_info, &job_info);
        assert_eq!(feedback, "Excellent match with the job requirements!");
    }

    #[test]
    fn test_no_title_sentence_without_title_score() {
        let resume_info = info(&[(Category::JobTitle, &["data analyst"])]);
        let job_info = info(&[(Category::JobTitle, &["backend engineer"])]);

        let feedback = generate_feedback(90.0, &CategoryScores::new(), &resume_info, &job_info);
        assert_eq!(feedback, "Excellent match with the job requirements!");
    }
}
