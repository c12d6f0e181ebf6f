//! Named entity recognition for organizations, products and places.
//!
//! Recognition is rule based so that results are fully reproducible: a
//! case-sensitive gazetteer matched with Aho-Corasick, a corporate-suffix
//! rule for organizations, and a "City, ST" rule for US locations.

use crate::error::{AtsError, Result};
use aho_corasick::{AhoCorasick, MatchKind};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum EntityLabel {
    Organization,
    Product,
    GeoPoliticalEntity,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Entity {
    pub text: String,
    pub label: EntityLabel,
    pub start: usize,
}

pub struct EntityRecognizer {
    gazetteer: AhoCorasick,
    gazetteer_labels: Vec<EntityLabel>,
    org_suffix_regex: Regex,
    city_state_regex: Regex,
    state_codes: BTreeSet<&'static str>,
}

impl EntityRecognizer {
    pub fn new() -> Result<Self> {
        let mut terms: Vec<&'static str> = Vec::new();
        let mut gazetteer_labels = Vec::new();
        for (label, names) in [
            (EntityLabel::Organization, ORGANIZATIONS),
            (EntityLabel::Product, PRODUCTS),
            (EntityLabel::GeoPoliticalEntity, PLACES),
        ] {
            for name in names {
                terms.push(name);
                gazetteer_labels.push(label);
            }
        }

        let gazetteer = AhoCorasick::builder()
            .match_kind(MatchKind::LeftmostLongest)
            .build(&terms)
            .map_err(|e| AtsError::Initialization(format!("Failed to build entity gazetteer: {}", e)))?;

        let org_suffix_regex = Regex::new(
            r"\b((?:[A-Z][A-Za-z0-9&'-]*[ \t]+){1,4}(?:Inc|Corp|Corporation|LLC|Ltd|Company|Group|Agency|Labs|Technologies|Solutions|Systems|Bank|Partners|University|Institute)\b\.?)",
        )?;
        let city_state_regex = Regex::new(r"\b([A-Z][a-z]+(?:[ \t][A-Z][a-z]+)*),[ \t]+([A-Z]{2})\b")?;

        Ok(Self {
            gazetteer,
            gazetteer_labels,
            org_suffix_regex,
            city_state_regex,
            state_codes: US_STATE_CODES.iter().copied().collect(),
        })
    }

    /// Entities in order of appearance; overlapping spans keep the earliest, longest one
    pub fn recognize(&self, text: &str) -> Vec<Entity> {
        let mut spans: Vec<(usize, usize, EntityLabel)> = Vec::new();

        for mat in self.gazetteer.find_iter(text) {
            if is_word_bounded(text, mat.start(), mat.end()) {
                spans.push((mat.start(), mat.end(), self.gazetteer_labels[mat.pattern().as_usize()]));
            }
        }

        for caps in self.org_suffix_regex.captures_iter(text) {
            if let Some(m) = caps.get(1) {
                let trimmed = m.as_str().trim_end_matches('.');
                spans.push((m.start(), m.start() + trimmed.len(), EntityLabel::Organization));
            }
        }

        for caps in self.city_state_regex.captures_iter(text) {
            let (Some(city), Some(state)) = (caps.get(1), caps.get(2)) else {
                continue;
            };
            if self.state_codes.contains(state.as_str()) {
                spans.push((city.start(), city.end(), EntityLabel::GeoPoliticalEntity));
                spans.push((state.start(), state.end(), EntityLabel::GeoPoliticalEntity));
            }
        }

        spans.sort_by(|a, b| a.0.cmp(&b.0).then_with(|| b.1.cmp(&a.1)));

        let mut entities = Vec::new();
        let mut covered_until = 0;
        for (start, end, label) in spans {
            if start < covered_until {
                continue;
            }
            covered_until = end;
            entities.push(Entity {
                text: text[start..end].to_string(),
                label,
                start,
            });
        }
        entities
    }
}

fn is_word_bounded(text: &str, start: usize, end: usize) -> bool {
    let before_ok = text[..start]
        .chars()
        .next_back()
        .map_or(true, |c| !c.is_alphanumeric());
    let after_ok = text[end..]
        .chars()
        .next()
        .map_or(true, |c| !c.is_alphanumeric());
    before_ok && after_ok
}

const ORGANIZATIONS: &[&str] = &[
    "Google", "Microsoft", "Amazon", "Apple", "Meta", "Facebook", "IBM", "Oracle", "Intel",
    "Netflix", "Nvidia", "NVIDIA", "Adobe", "Cisco", "SAP SE", "Deloitte", "Accenture",
    "McKinsey", "KPMG", "PwC", "Goldman Sachs", "JPMorgan", "Morgan Stanley", "Uber",
    "Airbnb", "Spotify", "Twitter", "LinkedIn", "Stripe", "Shopify", "Tesla", "OpenAI",
    "Anthropic", "Mozilla", "Red Hat", "GitHub", "GitLab", "Atlassian", "Samsung", "Siemens",
];

const PRODUCTS: &[&str] = &[
    "Microsoft Office", "Microsoft Office Suite", "Excel", "PowerPoint", "Outlook",
    "Google Analytics", "Google Ads", "Salesforce", "HubSpot", "Tableau", "Power BI",
    "Jira", "Confluence", "Trello", "Asana", "Slack", "Figma", "Photoshop", "Illustrator",
    "QuickBooks", "Workday", "ServiceNow", "Zendesk", "Mailchimp", "WordPress", "Shopify Plus",
    "Docker", "Kubernetes", "Terraform", "Ansible", "Jenkins", "PostgreSQL", "MySQL",
    "MongoDB", "Redis", "Elasticsearch", "Kafka", "Spark", "Hadoop", "Snowflake",
    "Databricks", "Airflow", "TensorFlow", "PyTorch", "Linux", "Windows", "macOS", "iOS",
    "Android", "Amazon Web Services", "Google Cloud", "Google Cloud Platform", "Instagram",
    "LinkedIn Ads", "Facebook Ads", "SharePoint", "Visual Studio", "Xcode", "Unity",
];

const PLACES: &[&str] = &[
    // Countries
    "United States", "USA", "United Kingdom", "UK", "Canada", "Mexico", "Brazil", "Argentina",
    "Germany", "France", "Spain", "Italy", "Portugal", "Netherlands", "Belgium", "Switzerland",
    "Austria", "Sweden", "Norway", "Denmark", "Finland", "Poland", "Ireland", "India",
    "China", "Japan", "Singapore", "Australia", "New Zealand", "South Africa", "Nigeria",
    "Kenya", "Egypt", "Israel", "United Arab Emirates", "UAE", "Pakistan", "Bangladesh",
    "Indonesia", "Philippines", "Vietnam", "South Korea",
    // US states
    "Alabama", "Alaska", "Arizona", "Arkansas", "California", "Colorado", "Connecticut",
    "Delaware", "Florida", "Georgia", "Hawaii", "Idaho", "Illinois", "Indiana", "Iowa",
    "Kansas", "Kentucky", "Louisiana", "Maine", "Maryland", "Massachusetts", "Michigan",
    "Minnesota", "Mississippi", "Missouri", "Montana", "Nebraska", "Nevada", "New Hampshire",
    "New Jersey", "New Mexico", "New York", "North Carolina", "North Dakota", "Ohio",
    "Oklahoma", "Oregon", "Pennsylvania", "Rhode Island", "South Carolina", "South Dakota",
    "Tennessee", "Texas", "Utah", "Vermont", "Virginia", "Washington", "West Virginia",
    "Wisconsin", "Wyoming",
    // Cities
    "New York City", "Los Angeles", "San Francisco", "San Jose", "San Diego", "Seattle",
    "Chicago", "Boston", "Austin", "Dallas", "Houston", "Denver", "Atlanta", "Miami",
    "Phoenix", "Philadelphia", "Portland", "London", "Paris", "Berlin", "Munich", "Madrid",
    "Barcelona", "Lisbon", "Amsterdam", "Dublin", "Zurich", "Stockholm", "Toronto",
    "Vancouver", "Montreal", "Sydney", "Melbourne", "Tokyo", "Bangalore", "Bengaluru",
    "Mumbai", "Delhi", "Hyderabad", "Dubai", "Tel Aviv", "Warsaw", "Prague",
];

const US_STATE_CODES: &[&str] = &[
    "AL", "AK", "AZ", "AR", "CA", "CO", "CT", "DE", "FL", "GA", "HI", "ID", "IL", "IN", "IA",
    "KS", "KY", "LA", "ME", "MD", "MA", "MI", "MN", "MS", "MO", "MT", "NE", "NV", "NH", "NJ",
    "NM", "NY", "NC", "ND", "OH", "OK", "OR", "PA", "RI", "SC", "SD", "TN", "TX", "UT", "VT",
    "VA", "WA", "WV", "WI", "WY", "DC",
];

#[cfg(test)]
mod tests {
    use super::*;

    fn labels_for(entities: &[Entity], label: EntityLabel) -> Vec<String> {
        entities
            .iter()
            .filter(|e| e.label == label)
            .map(|e| e.text.clone())
            .collect()
    }

    #[test]
    fn test_recognizes_places() {
        let recognizer = EntityRecognizer::new().unwrap();
        let entities = recognizer.recognize("Location: New York, NY (hybrid) or remote from Canada.");

        let places = labels_for(&entities, EntityLabel::GeoPoliticalEntity);
        assert_eq!(places, vec!["New York", "NY", "Canada"]);
    }

    #[test]
    fn test_recognizes_organizations_by_suffix() {
        let recognizer = EntityRecognizer::new().unwrap();
        let entities = recognizer.recognize("Company: XYZ Corp is hiring. Formerly at ABC Marketing Agency.");

        let orgs = labels_for(&entities, EntityLabel::Organization);
        assert!(orgs.contains(&"XYZ Corp".to_string()));
        assert!(orgs.contains(&"ABC Marketing Agency".to_string()));
    }

    #[test]
    fn test_longest_product_wins() {
        let recognizer = EntityRecognizer::new().unwrap();
        let entities = recognizer.recognize("Proficient in Microsoft Office Suite and Excel.");

        let products = labels_for(&entities, EntityLabel::Product);
        assert_eq!(products, vec!["Microsoft Office Suite", "Excel"]);
    }

    #[test]
    fn test_gazetteer_requires_word_boundaries() {
        let recognizer = EntityRecognizer::new().unwrap();
        let entities = recognizer.recognize("Sparkling Excellence at Indianapolis");

        assert!(entities.is_empty());
    }

    #[test]
    fn test_unknown_state_code_ignored() {
        let recognizer = EntityRecognizer::new().unwrap();
        let entities = recognizer.recognize("Springfield, ZZ");

        assert!(entities.is_empty());
    }
}
