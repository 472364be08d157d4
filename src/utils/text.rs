// src/utils/text.rs

//! Tokenization and stopword utilities.

use unicode_segmentation::UnicodeSegmentation;

/// English stopwords dropped from extracted documents.
const STOPWORDS: &[&str] = &[
    "the", "a", "an", "and", "or", "but", "if", "then", "so", "to", "of", "in", "on", "at",
    "for", "from", "with", "by", "is", "are", "was", "were", "be", "been", "being", "it",
    "this", "that", "these", "those", "i", "you", "he", "she", "we", "they", "me", "him",
    "her", "us", "them", "my", "your", "his", "its", "our", "their", "as", "not", "no",
    "yes", "do", "does", "did", "have", "has", "had", "will", "would", "can", "could",
    "should", "may", "might", "which", "what", "who", "when", "where", "how", "also", "more",
    "other", "such", "than", "there", "into", "about",
];

/// Split text into word tokens along Unicode word boundaries.
pub fn tokenize(text: &str) -> Vec<String> {
    text.unicode_words().map(str::to_string).collect()
}

/// Whether a token is in the fixed stopword set (case-insensitive).
pub fn is_stopword(word: &str) -> bool {
    let lower = word.to_lowercase();
    STOPWORDS.contains(&lower.as_str())
}

/// Whether a token consists solely of alphabetic characters.
pub fn is_alphabetic(word: &str) -> bool {
    !word.is_empty() && word.chars().all(char::is_alphabetic)
}
