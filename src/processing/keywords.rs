//! Statistical keyword extraction.
//!
//! Unsupervised, single-document scoring in the style of YAKE: every term is
//! rated from casing, position, frequency, context dispersion and sentence
//! spread, and candidate phrases of up to `max_ngram` words are ranked by the
//! combined rating of their terms (lower is better). Near-duplicate phrases
//! are removed with a normalized Levenshtein similarity.

use crate::config::ExtractionConfig;
use crate::processing::text_processor::TextProcessor;
use std::collections::{BTreeMap, BTreeSet};
use strsim::normalized_levenshtein;
use unicode_segmentation::UnicodeSegmentation;

#[derive(Debug, Clone, PartialEq)]
pub struct Keyword {
    /// Lowercased phrase
    pub phrase: String,
    /// Relevance rating, lower is more relevant
    pub score: f64,
}

#[derive(Debug, Clone)]
pub struct KeywordExtractor {
    max_ngram: usize,
    top_k: usize,
    dedup_threshold: f64,
}

#[derive(Debug, Default)]
struct TermStats {
    tf: usize,
    tf_acronym: usize,
    tf_capitalized: usize,
    sentence_ids: Vec<usize>,
    left: BTreeMap<String, usize>,
    right: BTreeMap<String, usize>,
    is_stop: bool,
}

#[derive(Debug)]
struct Token {
    lower: String,
    sentence: usize,
}

impl Default for KeywordExtractor {
    fn default() -> Self {
        Self::new(3, 20, 0.9)
    }
}

impl KeywordExtractor {
    pub fn new(max_ngram: usize, top_k: usize, dedup_threshold: f64) -> Self {
        Self {
            max_ngram: max_ngram.max(1),
            top_k,
            dedup_threshold,
        }
    }

    pub fn from_config(config: &ExtractionConfig) -> Self {
        Self::new(
            config.keyword_max_ngram,
            config.keyword_top_k,
            config.keyword_dedup_threshold,
        )
    }

    /// Lowercased top-K keyphrases, most relevant first
    pub fn extract_phrases(&self, text: &str, processor: &TextProcessor) -> Vec<String> {
        self.extract(text, processor)
            .into_iter()
            .map(|k| k.phrase)
            .collect()
    }

    pub fn extract(&self, text: &str, processor: &TextProcessor) -> Vec<Keyword> {
        let (chunks, sentence_count) = Self::chunk_text(text);
        if chunks.is_empty() {
            return Vec::new();
        }

        let stats = Self::term_statistics(text, &chunks, processor);
        let term_scores = Self::score_terms(&stats, sentence_count);

        let mut candidates = self.score_candidates(&chunks, &stats, &term_scores);
        candidates.sort_by(|a, b| {
            a.score
                .total_cmp(&b.score)
                .then_with(|| a.phrase.cmp(&b.phrase))
        });

        let mut selected: Vec<Keyword> = Vec::new();
        for candidate in candidates {
            if selected.len() >= self.top_k {
                break;
            }
            let duplicate = selected.iter().any(|kept| {
                normalized_levenshtein(&kept.phrase, &candidate.phrase) > self.dedup_threshold
            });
            if !duplicate {
                selected.push(candidate);
            }
        }
        selected
    }

    /// Split into runs of words that are not separated by punctuation or a
    /// sentence boundary. Returns the runs and the number of sentences.
    fn chunk_text(text: &str) -> (Vec<Vec<Token>>, usize) {
        let mut chunks = Vec::new();
        let mut sentence_count = 0;

        for (sentence_idx, sentence) in text.unicode_sentences().enumerate() {
            sentence_count = sentence_idx + 1;
            let mut current: Vec<Token> = Vec::new();
            for piece in sentence.split_word_bounds() {
                if piece.chars().all(char::is_whitespace) {
                    continue;
                }
                if piece.chars().any(char::is_alphanumeric) {
                    current.push(Token {
                        lower: piece.to_lowercase(),
                        sentence: sentence_idx,
                    });
                } else if !current.is_empty() {
                    chunks.push(std::mem::take(&mut current));
                }
            }
            if !current.is_empty() {
                chunks.push(current);
            }
        }

        (chunks, sentence_count)
    }

    fn term_statistics(
        text: &str,
        chunks: &[Vec<Token>],
        processor: &TextProcessor,
    ) -> BTreeMap<String, TermStats> {
        let mut stats: BTreeMap<String, TermStats> = BTreeMap::new();

        // Casing needs the surface form, which chunking lowercased away
        let mut surface = Vec::new();
        for (sentence_idx, sentence) in text.unicode_sentences().enumerate() {
            for (word_idx, word) in sentence.unicode_words().enumerate() {
                surface.push((word.to_lowercase(), word.to_string(), sentence_idx, word_idx));
            }
        }
        for (lower, raw, _, word_idx) in &surface {
            let entry = stats.entry(lower.clone()).or_default();
            let letters: Vec<char> = raw.chars().filter(|c| c.is_alphabetic()).collect();
            if letters.len() > 1 && letters.iter().all(|c| c.is_uppercase()) {
                entry.tf_acronym += 1;
            } else if *word_idx > 0 && raw.chars().next().is_some_and(char::is_uppercase) {
                entry.tf_capitalized += 1;
            }
        }

        for chunk in chunks {
            for (i, token) in chunk.iter().enumerate() {
                let entry = stats.entry(token.lower.clone()).or_default();
                entry.tf += 1;
                entry.sentence_ids.push(token.sentence);
                entry.is_stop = processor.is_stop_word(&token.lower);
                if i > 0 {
                    *entry.left.entry(chunk[i - 1].lower.clone()).or_insert(0) += 1;
                }
                if let Some(next) = chunk.get(i + 1) {
                    *entry.right.entry(next.lower.clone()).or_insert(0) += 1;
                }
            }
        }

        stats.retain(|_, s| s.tf > 0);
        stats
    }

    fn score_terms(stats: &BTreeMap<String, TermStats>, sentence_count: usize) -> BTreeMap<String, f64> {
        let valid_tfs: Vec<f64> = stats
            .values()
            .filter(|s| !s.is_stop)
            .map(|s| s.tf as f64)
            .collect();
        let mean_tf = if valid_tfs.is_empty() {
            0.0
        } else {
            valid_tfs.iter().sum::<f64>() / valid_tfs.len() as f64
        };
        let std_tf = if valid_tfs.is_empty() {
            0.0
        } else {
            (valid_tfs.iter().map(|tf| (tf - mean_tf).powi(2)).sum::<f64>() / valid_tfs.len() as f64)
                .sqrt()
        };
        let max_tf = stats.values().map(|s| s.tf).max().unwrap_or(1) as f64;
        let sentences = sentence_count.max(1) as f64;

        stats
            .iter()
            .map(|(term, s)| {
                let tf = s.tf as f64;
                let casing = s.tf_acronym.max(s.tf_capitalized) as f64 / (1.0 + tf.ln());
                let position = (3.0 + median(&s.sentence_ids)).ln().ln();
                let freq_norm = tf / (mean_tf + std_tf).max(1.0);
                let left_spread = dispersion(&s.left);
                let right_spread = dispersion(&s.right);
                let relatedness = 1.0 + (left_spread + right_spread) * (tf / max_tf);
                let distinct_sentences = s.sentence_ids.iter().collect::<BTreeSet<_>>().len() as f64;
                let spread = distinct_sentences / sentences;

                let score = (position * relatedness)
                    / (casing + freq_norm / relatedness + spread / relatedness);
                (term.clone(), score)
            })
            .collect()
    }

    fn score_candidates(
        &self,
        chunks: &[Vec<Token>],
        stats: &BTreeMap<String, TermStats>,
        term_scores: &BTreeMap<String, f64>,
    ) -> Vec<Keyword> {
        let mut occurrences: BTreeMap<String, (usize, Vec<String>)> = BTreeMap::new();

        for chunk in chunks {
            for start in 0..chunk.len() {
                for len in 1..=self.max_ngram {
                    let Some(window) = chunk.get(start..start + len) else {
                        break;
                    };
                    if !Self::is_valid_candidate(window, stats) {
                        continue;
                    }
                    let terms: Vec<String> = window.iter().map(|t| t.lower.clone()).collect();
                    let phrase = terms.join(" ");
                    let entry = occurrences.entry(phrase).or_insert_with(|| (0, terms));
                    entry.0 += 1;
                }
            }
        }

        occurrences
            .into_iter()
            .map(|(phrase, (count, terms))| {
                let mut product = 1.0;
                let mut sum = 0.0;
                for term in &terms {
                    let is_stop = stats.get(term).map(|s| s.is_stop).unwrap_or(false);
                    if is_stop {
                        continue;
                    }
                    let h = term_scores.get(term).copied().unwrap_or(1.0);
                    product *= h;
                    sum += h;
                }
                let score = product / (count as f64 * (1.0 + sum));
                Keyword { phrase, score }
            })
            .collect()
    }

    /// Phrases may not start or end with a stop word, and every word must
    /// contain a letter and be at least two characters long.
    fn is_valid_candidate(window: &[Token], stats: &BTreeMap<String, TermStats>) -> bool {
        let is_stop = |t: &Token| stats.get(&t.lower).map(|s| s.is_stop).unwrap_or(false);
        let (Some(first), Some(last)) = (window.first(), window.last()) else {
            return false;
        };
        if is_stop(first) || is_stop(last) {
            return false;
        }
        window.iter().all(|t| {
            t.lower.chars().count() >= 2 && t.lower.chars().any(char::is_alphabetic)
        })
    }
}

fn median(values: &[usize]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    let mut sorted = values.to_vec();
    sorted.sort_unstable();
    let mid = sorted.len() / 2;
    if sorted.len() % 2 == 0 {
        (sorted[mid - 1] + sorted[mid]) as f64 / 2.0
    } else {
        sorted[mid] as f64
    }
}

/// Distinct neighbours over total neighbour occurrences
fn dispersion(neighbours: &BTreeMap<String, usize>) -> f64 {
    let total: usize = neighbours.values().sum();
    if total == 0 {
        0.0
    } else {
        neighbours.len() as f64 / total as f64
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const JOB_TEXT: &str = "Senior Rust Engineer. We build distributed systems in Rust. \
        Experience with Kubernetes and distributed systems is required. \
        Rust, Kubernetes, PostgreSQL.";

    #[test]
    fn test_extracts_repeated_terms() {
        let processor = TextProcessor::new();
        let extractor = KeywordExtractor::default();
        let phrases = extractor.extract_phrases(JOB_TEXT, &processor);

        assert!(!phrases.is_empty());
        assert!(phrases.len() <= 20);
        assert!(phrases.contains(&"rust".to_string()));
        assert!(phrases.contains(&"kubernetes".to_string()));
    }

    #[test]
    fn test_phrases_never_start_or_end_with_stop_words() {
        let processor = TextProcessor::new();
        let extractor = KeywordExtractor::default();

        for phrase in extractor.extract_phrases(JOB_TEXT, &processor) {
            let words: Vec<&str> = phrase.split(' ').collect();
            assert!(words.len() <= 3);
            assert!(!processor.is_stop_word(words[0]), "{phrase}");
            assert!(!processor.is_stop_word(words[words.len() - 1]), "{phrase}");
        }
    }

    #[test]
    fn test_respects_top_k() {
        let processor = TextProcessor::new();
        let extractor = KeywordExtractor::new(3, 2, 0.9);

        assert_eq!(extractor.extract(JOB_TEXT, &processor).len(), 2);
    }

    #[test]
    fn test_deterministic_ranking() {
        let processor = TextProcessor::new();
        let extractor = KeywordExtractor::default();

        let first = extractor.extract(JOB_TEXT, &processor);
        let second = extractor.extract(JOB_TEXT, &processor);
        assert_eq!(first, second);
    }

    #[test]
    fn test_empty_text() {
        let processor = TextProcessor::new();
        let extractor = KeywordExtractor::default();
        assert!(extractor.extract("  ... ", &processor).is_empty());
    }

    #[test]
    fn test_numbers_are_not_keywords() {
        let processor = TextProcessor::new();
        let extractor = KeywordExtractor::default();
        let phrases = extractor.extract_phrases("5 years. 10 projects. 2024", &processor);

        assert!(phrases.iter().all(|p| p.chars().any(char::is_alphabetic)));
    }
}
