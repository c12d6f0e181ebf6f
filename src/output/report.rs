//! Serializable report and wire types

use crate::error::{AtsError, Result};
use crate::processing::ats_calculator::{generate_feedback, CategoryScores, ScoreOutcome};
use crate::processing::schema::InfoStructure;
use serde::{Deserialize, Serialize};

/// Scoring request: `{job_description, resume, id}`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AtsRequest {
    pub job_description: String,
    pub resume: String,
    #[serde(default)]
    pub id: String,
}

impl AtsRequest {
    pub fn from_json(json: &str) -> Result<Self> {
        let request: AtsRequest = serde_json::from_str(json)?;
        request.validate()?;
        Ok(request)
    }

    pub fn validate(&self) -> Result<()> {
        if self.job_description.trim().is_empty() {
            return Err(AtsError::InvalidInput("job_description must not be empty".to_string()));
        }
        if self.resume.trim().is_empty() {
            return Err(AtsError::InvalidInput("resume must not be empty".to_string()));
        }
        Ok(())
    }
}

/// Scoring response: `{score, category_scores}` echoing the request id
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AtsResponse {
    pub score: f64,
    pub category_scores: CategoryScores,
    #[serde(skip_serializing_if = "String::is_empty", default)]
    pub id: String,
}

impl AtsResponse {
    pub fn new(outcome: &ScoreOutcome, id: impl Into<String>) -> Self {
        Self {
            score: outcome.score,
            category_scores: outcome.category_scores.clone(),
            id: id.into(),
        }
    }
}

/// Everything the `score` command reports
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScoreReport {
    pub resume_path: String,
    pub job_path: String,
    pub embedding_model: String,
    pub score: f64,
    pub category_scores: CategoryScores,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub feedback: Option<String>,
    pub resume_info: InfoStructure,
    pub job_info: InfoStructure,
}

impl ScoreReport {
    pub fn new(
        outcome: ScoreOutcome,
        resume_path: &str,
        job_path: &str,
        embedding_model: &str,
        include_feedback: bool,
    ) -> Self {
        let feedback = include_feedback.then(|| {
            generate_feedback(
                outcome.score,
                &outcome.category_scores,
                &outcome.resume_info,
                &outcome.job_info,
            )
        });

        Self {
            resume_path: resume_path.to_string(),
            job_path: job_path.to_string(),
            embedding_model: embedding_model.to_string(),
            score: outcome.score,
            category_scores: outcome.category_scores,
            feedback,
            resume_info: outcome.resume_info,
            job_info: outcome.job_info,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_parsing() {
        let request = AtsRequest::from_json(
            r#"{"job_description": "Rust engineer", "resume": "I write Rust", "id": "42"}"#,
        )
        .unwrap();
        assert_eq!(request.id, "42");

        let missing_id = AtsRequest::from_json(r#"{"job_description": "a", "resume": "b"}"#).unwrap();
        assert_eq!(missing_id.id, "");
    }

    #[test]
    fn test_request_rejects_blank_fields() {
        let result = AtsRequest::from_json(r#"{"job_description": "  ", "resume": "b", "id": "1"}"#);
        assert!(matches!(result, Err(AtsError::InvalidInput(_))));

        let result = AtsRequest::from_json(r#"{"resume": "b"}"#);
        assert!(matches!(result, Err(AtsError::Serialization(_))));
    }

    #[test]
    fn test_response_shape() {
        let mut category_scores = CategoryScores::new();
        category_scores.insert("skills".to_string(), 0.5);
        let response = AtsResponse {
            score: 15.0,
            category_scores,
            id: "7".to_string(),
        };

        let value = serde_json::to_value(&response).unwrap();
        assert_eq!(value["score"], 15.0);
        assert_eq!(value["category_scores"]["skills"], 0.5);
        assert_eq!(value["id"], "7");
    }
}
