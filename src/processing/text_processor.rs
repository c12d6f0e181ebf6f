//! Text processing and normalization

use regex::{Regex, RegexBuilder};
use std::collections::HashSet;
use unicode_segmentation::UnicodeSegmentation;

/// Words ignored when comparing job titles
pub const TITLE_STOP_WORDS: [&str; 12] = [
    "a", "an", "the", "and", "or", "but", "in", "on", "at", "to", "for", "of",
];

pub struct TextProcessor {
    stop_words: HashSet<&'static str>,
    whitespace_regex: Regex,
    disallowed_chars_regex: Regex,
}

impl Default for TextProcessor {
    fn default() -> Self {
        Self::new()
    }
}

impl TextProcessor {
    pub fn new() -> Self {
        let whitespace_regex = Regex::new(r"\s+").expect("Invalid whitespace regex");
        let disallowed_chars_regex =
            Regex::new(r"[^a-zA-Z0-9\s\.\+#/\-]").expect("Invalid character filter regex");

        Self {
            stop_words: STOP_WORDS.iter().copied().collect(),
            whitespace_regex,
            disallowed_chars_regex,
        }
    }

    pub fn first_sentence(&self, text: &str) -> Option<String> {
        text.unicode_sentences()
            .map(str::trim)
            .find(|s| !s.is_empty())
            .map(str::to_string)
    }

    pub fn is_stop_word(&self, word: &str) -> bool {
        self.stop_words.contains(word.to_lowercase().as_str())
    }

    /// Case-insensitive whole-word search for `item` inside `text`
    pub fn contains_whole_word(&self, text: &str, item: &str) -> bool {
        if item.trim().is_empty() {
            return false;
        }
        let pattern = format!(r"\b{}\b", regex::escape(item));
        match RegexBuilder::new(&pattern).case_insensitive(true).build() {
            Ok(re) => re.is_match(text),
            Err(e) => {
                log::warn!("Could not build word matcher for '{}': {}", item, e);
                false
            }
        }
    }

    /// Collapse whitespace, lowercase, and keep only alphanumerics and `. + # / -`
    pub fn preprocess_text(&self, text: &str) -> String {
        let collapsed = self.normalize_whitespace(text).to_lowercase();
        self.disallowed_chars_regex
            .replace_all(&collapsed, "")
            .to_string()
    }

    /// Collapse runs of whitespace into a single space
    pub fn normalize_whitespace(&self, text: &str) -> String {
        self.whitespace_regex.replace_all(text, " ").trim().to_string()
    }

    /// Map typographic quotes and dashes onto their ASCII forms
    pub fn normalize_unicode(&self, text: &str) -> String {
        text.chars()
            .map(|c| match c {
                '\u{2018}' | '\u{2019}' => '\'',
                '\u{201C}' | '\u{201D}' => '"',
                '\u{2013}' | '\u{2014}' => '-',
                '\u{2026}' => '.',
                _ => c,
            })
            .collect()
    }
}

/// Common English stop words used by keyword extraction
const STOP_WORDS: &[&str] = &[
    "a", "about", "above", "across", "after", "again", "against", "all", "almost", "along",
    "already", "also", "although", "always", "am", "among", "an", "and", "another", "any",
    "are", "around", "as", "at", "be", "because", "been", "before", "being", "below",
    "between", "both", "but", "by", "can", "could", "did", "do", "does", "doing", "done",
    "down", "during", "each", "either", "else", "enough", "etc", "even", "ever", "every",
    "few", "for", "from", "further", "had", "has", "have", "having", "he", "her", "here",
    "hers", "him", "his", "how", "however", "i", "if", "in", "into", "is", "it", "its",
    "itself", "just", "least", "less", "like", "may", "me", "might", "more", "most", "much",
    "must", "my", "neither", "no", "nor", "not", "now", "of", "off", "often", "on", "once",
    "only", "or", "other", "others", "our", "ours", "out", "over", "own", "per", "please",
    "rather", "same", "shall", "she", "should", "since", "so", "some", "such", "than",
    "that", "the", "their", "theirs", "them", "then", "there", "these", "they", "this",
    "those", "though", "through", "thus", "to", "too", "toward", "under", "until", "up",
    "upon", "us", "very", "via", "was", "we", "well", "were", "what", "when", "where",
    "whether", "which", "while", "who", "whom", "whose", "why", "will", "with", "within",
    "without", "would", "yet", "you", "your", "yours",
];
