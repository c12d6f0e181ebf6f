//! Declarative pattern rules for category extraction.
//!
//! Every rule is a `(category, pattern, policy, capture)` row. One generic
//! loop (`RuleSet::apply`) evaluates the rows of a category according to the
//! category's policy:
//!
//! * `FirstWins`: rules are tried in table order, the first match is the result.
//! * `UnionAll`: every match of every rule is collected.
//! * `MaxNumber`: each rule contributes its first captured integer; the maximum wins.

use crate::error::{AtsError, Result};
use crate::processing::schema::Category;
use regex::Regex;
use std::num::IntErrorKind;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatchPolicy {
    FirstWins,
    UnionAll,
    MaxNumber,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Capture {
    /// The whole match text
    WholeMatch,
    /// Capture group 1
    Group,
    /// Capture group 1, split on commas into several items
    CommaList,
    /// Capture group 1, parsed as an integer
    Number,
}

#[derive(Debug, Clone, Copy)]
pub struct PatternRule {
    pub category: Category,
    pub pattern: &'static str,
    pub policy: MatchPolicy,
    pub capture: Capture,
}

const fn rule(category: Category, pattern: &'static str, policy: MatchPolicy, capture: Capture) -> PatternRule {
    PatternRule { category, pattern, policy, capture }
}

use Capture::*;
use Category::*;
use MatchPolicy::*;

/// The standard rule table, in evaluation order.
///
/// Short upper-case abbreviations (AS, BA, IT, ...) are matched case-sensitively
/// so that ordinary words such as "as" or "it" are not read as requirements.
pub const STANDARD_RULES: &[PatternRule] = &[
    // Job title
    rule(JobTitle, r"(?i)\b(?:job title|position|role|title|position title|job role)s?:?\s*(.*?)(?:\n|$)", FirstWins, Group),
    rule(JobTitle, r"(?i)(?:we are hiring|hiring for|looking for|seeking)\s*(?:an?\s+)?(.*?)(?:\n|$)", FirstWins, Group),
    rule(JobTitle, r"(?i)^(?:senior|junior|lead|principal|staff)?\s*([^.!?\n]+)(?:\n|$)", FirstWins, Group),
    // Skills
    rule(Skills, r"(?i)\b(?:proficient|experienced|skilled|expertise)\s+in\s+([\w\s,/+]+)", UnionAll, CommaList),
    rule(Skills, r"(?i)\b(?:knowledge|understanding)\s+of\s+([\w\s,/+]+)", UnionAll, CommaList),
    rule(Skills, r"(?i)(?:technologies|tools|frameworks|languages):\s*([\w\s,/+]+)", UnionAll, CommaList),
    rule(Skills, r"(?i)\b(?:HTML5?|CSS3?|JavaScript|Python|Java|C\+\+|React|Angular|Vue|Node\.js|SQL|AWS|Azure|Git)\b", UnionAll, WholeMatch),
    // Education
    rule(Education, r"(?i)\b(?:high school diploma|(?-i:GED)|secondary education)\b", UnionAll, WholeMatch),
    rule(Education, r"(?i)\b(?:associate'?s?|(?-i:AA|AS))\s*(?:degree)?\b", UnionAll, WholeMatch),
    rule(Education, r"(?i)\b(?:bachelor'?s?|(?-i:BA|BS)|B\.A\.|B\.S\.)\s*(?:degree)?\b", UnionAll, WholeMatch),
    rule(Education, r"(?i)\b(?:master'?s?|(?-i:MA|MS)|M\.A\.|M\.S\.|MBA|M\.B\.A\.)\s*(?:degree)?\b", UnionAll, WholeMatch),
    rule(Education, r"(?i)\b(?:phd|ph\.d\.|doctorate|doctoral)\s*(?:degree)?\b", UnionAll, WholeMatch),
    rule(Education, r"(?i)\b(?:post-graduate|postgraduate)\s*(?:degree|qualification)?\b", UnionAll, WholeMatch),
    // Experience level
    rule(Experience, r"(?i)\b(?:entry[ -]level|junior|graduate|fresher)\b", UnionAll, WholeMatch),
    rule(Experience, r"(?i)\b(?:mid[ -]level|intermediate|associate)\b", UnionAll, WholeMatch),
    rule(Experience, r"(?i)\b(?:senior|experienced|advanced)\b", UnionAll, WholeMatch),
    rule(Experience, r"(?i)\b(?:lead|principal|architect|manager)\b", UnionAll, WholeMatch),
    rule(Experience, r"(?i)\b(?:director|head|chief|vp|vice president|executive)\b", UnionAll, WholeMatch),
    rule(Experience, r"(?i)\b(?:c-level|cto|cio|ceo|cfo)\b", UnionAll, WholeMatch),
    // Job type
    rule(JobType, r"(?i)\b(?:full[ -]time|permanent|regular)\b", UnionAll, WholeMatch),
    rule(JobType, r"(?i)\b(?:part[ -]time|hourly)\b", UnionAll, WholeMatch),
    rule(JobType, r"(?i)\b(?:contract|temporary|interim|temp)\b", UnionAll, WholeMatch),
    rule(JobType, r"(?i)\b(?:freelance|independent|consultant)\b", UnionAll, WholeMatch),
    rule(JobType, r"(?i)\b(?:internship|intern|trainee|co-op)\b", UnionAll, WholeMatch),
    rule(JobType, r"(?i)\b(?:remote|work from home|wfh|hybrid|on-site|in-office)\b", UnionAll, WholeMatch),
    // Industry
    rule(Industry, r"(?i)\b(?:technology|(?-i:IT)|software|tech)\b", UnionAll, WholeMatch),
    rule(Industry, r"(?i)\b(?:finance|banking|fintech|insurance)\b", UnionAll, WholeMatch),
    rule(Industry, r"(?i)\b(?:healthcare|medical|pharma|biotech)\b", UnionAll, WholeMatch),
    rule(Industry, r"(?i)\b(?:education|academic|e-learning)\b", UnionAll, WholeMatch),
    rule(Industry, r"(?i)\b(?:retail|e-commerce|consumer)\b", UnionAll, WholeMatch),
    rule(Industry, r"(?i)\b(?:manufacturing|industrial|production)\b", UnionAll, WholeMatch),
    rule(Industry, r"(?i)\b(?:media|entertainment|digital|creative)\b", UnionAll, WholeMatch),
    rule(Industry, r"(?i)\b(?:government|public sector|defense)\b", UnionAll, WholeMatch),
    rule(Industry, r"(?i)\b(?:consulting|professional services)\b", UnionAll, WholeMatch),
    rule(Industry, r"(?i)\b(?:telecommunications|telecom)\b", UnionAll, WholeMatch),
    rule(Industry, r"(?i)\b(?:automotive|transportation)\b", UnionAll, WholeMatch),
    rule(Industry, r"(?i)\b(?:energy|utilities|oil|gas)\b", UnionAll, WholeMatch),
    // Years of experience
    rule(YearsOfExperience, r"(?i)(\d+)\+?\s*(?:years?|yrs?)\s*(?:of)?\s*(?:experience|exp)", MaxNumber, Number),
    rule(YearsOfExperience, r"(?i)(?:minimum|min)\s*(?:of)?\s*(\d+)\s*(?:years?|yrs?)", MaxNumber, Number),
    rule(YearsOfExperience, r"(?i)(?:at least|minimum)\s*(\d+)\s*(?:years?|yrs?)", MaxNumber, Number),
    rule(YearsOfExperience, r"(?i)(\d+)(?:-\d+)?\s*(?:years?|yrs?)\s*(?:experience|exp)?", MaxNumber, Number),
];

/// Result of evaluating the rules of one category
#[derive(Debug, Clone, PartialEq)]
pub enum RuleOutcome {
    Items(Vec<String>),
    Number(u32),
    NoMatch,
}

#[derive(Debug, Clone)]
pub struct CompiledRule {
    pub rule: PatternRule,
    regex: Regex,
}

impl CompiledRule {
    pub fn compile(rule: PatternRule) -> Result<Self> {
        let regex = Regex::new(rule.pattern).map_err(|e| {
            AtsError::Initialization(format!(
                "Invalid {} pattern '{}': {}",
                rule.category, rule.pattern, e
            ))
        })?;
        Ok(Self { rule, regex })
    }

    /// Every item this rule yields in `text`, in order of appearance
    pub fn all_items(&self, text: &str) -> Vec<String> {
        self.regex
            .captures_iter(text)
            .flat_map(|caps| self.items_from(&caps))
            .collect()
    }

    /// Items of the leftmost match only
    pub fn first_items(&self, text: &str) -> Vec<String> {
        self.regex
            .captures(text)
            .map(|caps| self.items_from(&caps))
            .unwrap_or_default()
    }

    /// Integer captured by the leftmost match
    pub fn first_number(&self, text: &str) -> Option<u32> {
        let caps = self.regex.captures(text)?;
        let digits = caps.get(1)?.as_str();
        match digits.parse::<u32>() {
            Ok(n) => Some(n),
            Err(e) if *e.kind() == IntErrorKind::PosOverflow => Some(u32::MAX),
            Err(e) => {
                log::warn!("Ignoring unparsable number '{}': {}", digits, e);
                None
            }
        }
    }

    fn items_from(&self, caps: &regex::Captures<'_>) -> Vec<String> {
        let raw = match self.rule.capture {
            WholeMatch => caps.get(0),
            Group | CommaList | Number => caps.get(1),
        };
        let Some(raw) = raw else {
            return Vec::new();
        };

        let pieces: Vec<&str> = match self.rule.capture {
            CommaList => raw.as_str().split(',').collect(),
            _ => vec![raw.as_str()],
        };
        pieces
            .into_iter()
            .map(|p| p.trim().to_lowercase())
            .filter(|p| !p.is_empty())
            .collect()
    }
}

#[derive(Debug, Clone)]
pub struct RuleSet {
    rules: Vec<CompiledRule>,
}

impl RuleSet {
    pub fn standard() -> Result<Self> {
        Self::compile(STANDARD_RULES)
    }

    pub fn compile(rules: &[PatternRule]) -> Result<Self> {
        let rules = rules
            .iter()
            .copied()
            .map(CompiledRule::compile)
            .collect::<Result<Vec<_>>>()?;
        Ok(Self { rules })
    }

    pub fn rules_for(&self, category: Category) -> impl Iterator<Item = &CompiledRule> {
        self.rules.iter().filter(move |r| r.rule.category == category)
    }

    pub fn policy_for(&self, category: Category) -> Option<MatchPolicy> {
        self.rules_for(category).next().map(|r| r.rule.policy)
    }

    /// Evaluate the rules of `category` under the category's policy
    pub fn apply(&self, category: Category, text: &str) -> RuleOutcome {
        let Some(policy) = self.policy_for(category) else {
            return RuleOutcome::NoMatch;
        };

        match policy {
            FirstWins => self
                .rules_for(category)
                .map(|r| r.first_items(text))
                .find(|items| !items.is_empty())
                .map(RuleOutcome::Items)
                .unwrap_or(RuleOutcome::NoMatch),
            UnionAll => {
                let items: Vec<String> = self
                    .rules_for(category)
                    .flat_map(|r| r.all_items(text))
                    .collect();
                if items.is_empty() {
                    RuleOutcome::NoMatch
                } else {
                    RuleOutcome::Items(items)
                }
            }
            MaxNumber => self
                .rules_for(category)
                .filter_map(|r| r.first_number(text))
                .max()
                .filter(|n| *n > 0)
                .map(RuleOutcome::Number)
                .unwrap_or(RuleOutcome::NoMatch),
        }
    }

    /// Integer captured by the first rule of `category` that matches at all
    pub fn first_number(&self, category: Category, text: &str) -> Option<u32> {
        self.rules_for(category).find_map(|r| r.first_number(text))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn items(outcome: RuleOutcome) -> Vec<String> {
        match outcome {
            RuleOutcome::Items(items) => items,
            other => panic!("expected items, got {:?}", other),
        }
    }

    #[test]
    fn test_standard_rules_compile() {
        let rules = RuleSet::standard().unwrap();
        for category in Category::ALL {
            if category == Location {
                assert!(rules.policy_for(category).is_none());
            } else {
                assert!(rules.policy_for(category).is_some(), "{category}");
            }
        }
    }

    #[test]
    fn test_each_category_has_a_single_policy() {
        for category in Category::ALL {
            let policies: Vec<MatchPolicy> = STANDARD_RULES
                .iter()
                .filter(|r| r.category == category)
                .map(|r| r.policy)
                .collect();
            assert!(policies.windows(2).all(|w| w[0] == w[1]), "{category}");
        }
    }

    #[test]
    fn test_explicit_title_label_wins() {
        let rules = RuleSet::standard().unwrap();
        let text = "We are hiring a Data Analyst\nJob Title: Senior Data Engineer\n";

        assert_eq!(items(rules.apply(JobTitle, text)), vec!["senior data engineer"]);
    }

    #[test]
    fn test_hiring_phrase_drops_article() {
        let rules = RuleSet::standard().unwrap();
        let text = "Acme is seeking an Operations Manager to join us.\nApply now";

        assert_eq!(
            items(rules.apply(JobTitle, text)),
            vec!["operations manager to join us."]
        );
    }

    #[test]
    fn test_hiring_phrase_continues_on_next_line() {
        let rules = RuleSet::standard().unwrap();
        let text = "Seeking\nSenior Engineer";

        assert_eq!(items(rules.apply(JobTitle, text)), vec!["senior engineer"]);
    }

    #[test]
    fn test_title_label_needs_word_boundary() {
        let rules = RuleSet::standard().unwrap();
        let text = "Disposition: pending\nWe are hiring a Site Reliability Engineer";

        assert_eq!(
            items(rules.apply(JobTitle, text)),
            vec!["site reliability engineer"]
        );
    }

    #[test]
    fn test_leading_line_heuristic_strips_seniority() {
        let rules = RuleSet::standard().unwrap();
        let text = "Senior Backend Developer\nBuild APIs all day.";

        assert_eq!(items(rules.apply(JobTitle, text)), vec!["backend developer"]);
    }

    #[test]
    fn test_union_collects_across_rules() {
        let rules = RuleSet::standard().unwrap();
        let text = "Full-time or contract. Remote friendly.";

        assert_eq!(
            items(rules.apply(JobType, text)),
            vec!["full-time", "contract", "remote"]
        );
    }

    #[test]
    fn test_education_abbreviations_are_case_sensitive() {
        let rules = RuleSet::standard().unwrap();

        assert_eq!(rules.apply(Education, "Work as part of a team"), RuleOutcome::NoMatch);
        assert_eq!(
            items(rules.apply(Education, "MS or PhD in Computer Science")),
            vec!["ms", "phd"]
        );
    }

    #[test]
    fn test_skill_lists_split_on_commas() {
        let rules = RuleSet::standard().unwrap();
        let found = items(rules.apply(Skills, "Tools: Jira, Figma,  Miro"));

        assert!(found.contains(&"jira".to_string()));
        assert!(found.contains(&"figma".to_string()));
        assert!(found.contains(&"miro".to_string()));
    }

    #[test]
    fn test_years_takes_maximum_across_rules() {
        let rules = RuleSet::standard().unwrap();
        let text = "Minimum 3 years in retail. 7+ years of experience preferred.";

        // rule 1 -> 7, rule 2 -> 3, rule 3 -> 3, rule 4 -> 3
        assert_eq!(rules.apply(YearsOfExperience, text), RuleOutcome::Number(7));
    }

    #[test]
    fn test_years_first_rule_wins() {
        let rules = RuleSet::standard().unwrap();
        let text = "Minimum 3 years in retail. 7+ years of experience preferred.";

        assert_eq!(rules.first_number(YearsOfExperience, text), Some(7));
        assert_eq!(rules.first_number(YearsOfExperience, "At least 4 yrs"), Some(4));
        assert_eq!(rules.first_number(YearsOfExperience, "no numbers here"), None);
    }

    #[test]
    fn test_oversized_year_counts_saturate() {
        let rules = RuleSet::standard().unwrap();
        let text = "99999999999 years of experience. Minimum 3 years.";

        assert_eq!(rules.first_number(YearsOfExperience, text), Some(u32::MAX));
        assert_eq!(rules.apply(YearsOfExperience, text), RuleOutcome::Number(u32::MAX));
    }

    #[test]
    fn test_years_zero_is_absent() {
        let rules = RuleSet::standard().unwrap();
        assert_eq!(rules.apply(YearsOfExperience, "0 years"), RuleOutcome::NoMatch);
    }

    #[test]
    fn test_invalid_pattern_is_initialization_error() {
        let broken = [rule(Skills, r"(unclosed", UnionAll, Group)];
        assert!(matches!(RuleSet::compile(&broken), Err(AtsError::Initialization(_))));
    }
}
