//! Per-category similarity scores in [0, 1]

use crate::error::{AtsError, Result};
use crate::processing::embeddings::EmbeddingService;
use crate::processing::schema::{Category, InfoValue};
use crate::processing::text_processor::TITLE_STOP_WORDS;
use std::collections::BTreeSet;

/// Education levels from lowest to highest; unrecognized degrees are level 0
const EDUCATION_LEVELS: [(&str, u32); 5] = [
    ("high school", 1),
    ("associate", 2),
    ("bachelor", 3),
    ("master", 4),
    ("phd", 5),
];

pub struct CategoryScorer {
    embeddings: EmbeddingService,
}

impl CategoryScorer {
    pub fn new(embeddings: EmbeddingService) -> Self {
        Self { embeddings }
    }

    /// Score one category by dispatching on its kind
    pub fn score(&self, category: Category, resume: &InfoValue, job: &InfoValue) -> Result<f64> {
        match (category, resume, job) {
            (Category::YearsOfExperience, InfoValue::Years(r), InfoValue::Years(j)) => {
                Ok(experience_duration_score(*r, *j))
            }
            (Category::YearsOfExperience, _, _) => Err(AtsError::scoring(
                category.as_str(),
                "expected a number of years on both sides",
            )),
            (_, InfoValue::Items(r), InfoValue::Items(j)) => match category {
                Category::JobTitle => self.job_title_score(&r.join(" "), &j.join(" ")),
                Category::Skills => self.skills_score(r, j),
                Category::Education => Ok(education_score(r, j)),
                _ => Ok(generic_overlap_score(r, j)),
            },
            _ => Err(AtsError::scoring(
                category.as_str(),
                "expected item lists on both sides",
            )),
        }
    }

    /// Mean of token Jaccard and embedding similarity of the full titles
    pub fn job_title_score(&self, resume_title: &str, job_title: &str) -> Result<f64> {
        if resume_title.trim().is_empty() || job_title.trim().is_empty() {
            return Ok(0.0);
        }

        let resume_tokens = title_tokens(resume_title);
        let job_tokens = title_tokens(job_title);
        if resume_tokens.is_empty() || job_tokens.is_empty() {
            return Ok(0.0);
        }

        let intersection = resume_tokens.intersection(&job_tokens).count();
        let union = resume_tokens.union(&job_tokens).count();
        let jaccard = intersection as f64 / union as f64;

        let embedding_similarity = self.embeddings.similarity(resume_title, job_title)?;
        log::debug!(
            "Title '{}' vs '{}': jaccard {:.3}, embedding {:.3}",
            resume_title,
            job_title,
            jaccard,
            embedding_similarity
        );
        Ok((jaccard + embedding_similarity) / 2.0)
    }

    /// Mean of exact overlap and best-match semantic similarity
    pub fn skills_score(&self, resume_skills: &[String], job_skills: &[String]) -> Result<f64> {
        if job_skills.is_empty() {
            return Ok(1.0);
        }

        let resume_set = normalize_skills(resume_skills);
        let job_set = normalize_skills(job_skills);
        let exact = exact_match_score(&resume_set, &job_set);

        let semantic = if resume_set.is_empty() || job_set.is_empty() {
            0.0
        } else {
            let rows: Vec<String> = resume_set.into_iter().collect();
            let cols: Vec<String> = job_set.into_iter().collect();
            let matrix = self.embeddings.similarity_matrix(&rows, &cols)?;

            let best_per_job_skill: Vec<f64> = (0..cols.len())
                .map(|j| {
                    matrix
                        .iter()
                        .map(|row| row[j])
                        .fold(f64::NEG_INFINITY, f64::max)
                })
                .collect();
            best_per_job_skill.iter().sum::<f64>() / best_per_job_skill.len() as f64
        };

        log::debug!("Skills: exact {:.3}, semantic {:.3}", exact, semantic);
        Ok((exact + semantic) / 2.0)
    }
}

/// Share of normalized job skills that also appear among the resume skills
pub fn exact_match_score(resume_set: &BTreeSet<String>, job_set: &BTreeSet<String>) -> f64 {
    if job_set.is_empty() {
        return 0.0;
    }
    resume_set.intersection(job_set).count() as f64 / job_set.len() as f64
}

/// Skills compared with all whitespace removed and lowercased
pub fn normalize_skills(skills: &[String]) -> BTreeSet<String> {
    skills
        .iter()
        .map(|s| s.chars().filter(|c| !c.is_whitespace()).collect::<String>().to_lowercase())
        .filter(|s| !s.is_empty())
        .collect()
}

fn title_tokens(title: &str) -> BTreeSet<String> {
    title
        .split_whitespace()
        .map(str::to_lowercase)
        .filter(|w| !TITLE_STOP_WORDS.contains(&w.as_str()))
        .collect()
}

/// Map a free-form degree mention onto a canonical level name.
///
/// Levels are checked from highest to lowest. Full words match as substrings,
/// short abbreviations (MS, BA, GED, ...) only as whole tokens.
/// Unrecognized input is returned unchanged.
pub fn normalize_education(edu: &str) -> String {
    let edu = edu.to_lowercase().replace("'s", "").replace('\'', "");
    let tokens: BTreeSet<String> = edu
        .split(|c: char| c.is_whitespace() || c == ',' || c == '/' || c == '(' || c == ')')
        .map(|t| t.replace('.', ""))
        .filter(|t| !t.is_empty())
        .collect();
    let has_token = |candidates: &[&str]| candidates.iter().any(|c| tokens.contains(*c));

    if ["phd", "ph.d", "doctorate", "doctoral"].iter().any(|k| edu.contains(k)) {
        "phd".to_string()
    } else if edu.contains("master") || has_token(&["mba", "ma", "ms"]) {
        "master".to_string()
    } else if edu.contains("bachelor") || has_token(&["ba", "bs"]) {
        "bachelor".to_string()
    } else if edu.contains("associate") || has_token(&["aa", "as"]) {
        "associate".to_string()
    } else if edu.contains("high school") || edu.contains("secondary") || has_token(&["ged"]) {
        "high school".to_string()
    } else {
        edu
    }
}

pub fn education_level(edu: &str) -> u32 {
    let normalized = normalize_education(edu);
    EDUCATION_LEVELS
        .iter()
        .find(|(name, _)| *name == normalized)
        .map_or(0, |(_, level)| *level)
}

/// Highest resume level relative to the highest required level, capped at 1
pub fn education_score(resume_edu: &[String], job_edu: &[String]) -> f64 {
    let resume_level = resume_edu.iter().map(|e| education_level(e)).max().unwrap_or(0);
    let job_level = job_edu.iter().map(|e| education_level(e)).max().unwrap_or(0);

    if job_level == 0 {
        return 1.0;
    }
    (resume_level as f64 / job_level as f64).min(1.0)
}

pub fn experience_duration_score(resume_years: u32, job_years: u32) -> f64 {
    if job_years == 0 {
        return 1.0;
    }
    (resume_years as f64 / job_years as f64).min(1.0)
}

/// Fraction of job items also present in the resume items
pub fn generic_overlap_score(resume_items: &[String], job_items: &[String]) -> f64 {
    if job_items.is_empty() {
        return 1.0;
    }
    let resume_set: BTreeSet<&String> = resume_items.iter().collect();
    let job_set: BTreeSet<&String> = job_items.iter().collect();
    resume_set.intersection(&job_set).count() as f64 / job_items.len() as f64
}
