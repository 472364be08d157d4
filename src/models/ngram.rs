// src/models/ngram.rs

//! N-gram value types and the frequency model.
//!
//! An n-gram is an ordered tuple of symbols with structural equality
//! and a total order, so the model can be stored in a `BTreeMap` and
//! enumerated deterministically. That enumeration order is the tie-break
//! for the greedy walk: when two successors carry the same weight, the
//! first one in map order wins.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

/// A single model symbol: a word, or a document-boundary sentinel.
///
/// The derived `Ord` puts `Start` before every word and `Stop` after,
/// which keeps sentinel n-grams grouped at the edges of the map.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Symbol {
    /// Marks the beginning of a document.
    Start,
    /// An ordinary token.
    Word(String),
    /// Marks the end of a document.
    Stop,
}

impl Symbol {
    /// Create a word symbol.
    pub fn word(s: impl Into<String>) -> Self {
        Self::Word(s.into())
    }

    /// The word carried by this symbol, if it is one.
    pub fn as_word(&self) -> Option<&str> {
        match self {
            Symbol::Word(w) => Some(w),
            _ => None,
        }
    }

}

impl fmt::Display for Symbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Symbol::Start => write!(f, "<s>"),
            Symbol::Word(w) => write!(f, "{w}"),
            Symbol::Stop => write!(f, "</s>"),
        }
    }
}

/// A fixed-length ordered tuple of symbols.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Ngram(Vec<Symbol>);

impl Ngram {
    pub fn new(symbols: Vec<Symbol>) -> Self {
        Self(symbols)
    }

    /// Build an n-gram of plain words.
    pub fn from_words<S: Into<String>>(words: impl IntoIterator<Item = S>) -> Self {
        Self(words.into_iter().map(Symbol::word).collect())
    }

    pub fn width(&self) -> usize {
        self.0.len()
    }

    pub fn symbols(&self) -> &[Symbol] {
        &self.0
    }

    pub fn first(&self) -> Option<&Symbol> {
        self.0.first()
    }

    pub fn last(&self) -> Option<&Symbol> {
        self.0.last()
    }

    /// All symbols but the last.
    pub fn prefix(&self) -> &[Symbol] {
        &self.0[..self.0.len().saturating_sub(1)]
    }

    /// All symbols but the first.
    pub fn suffix(&self) -> &[Symbol] {
        if self.0.is_empty() { &[] } else { &self.0[1..] }
    }

    /// The adjacency relation of the transition graph: `self` can follow
    /// `other` when `self`'s prefix equals `other`'s suffix.
    pub fn follows(&self, other: &Ngram) -> bool {
        self.prefix() == other.suffix()
    }
}

impl fmt::Display for Ngram {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "(")?;
        for (i, sym) in self.0.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{sym}")?;
        }
        write!(f, ")")
    }
}

/// Frequency model: a mapping from n-gram to a normalized weight.
///
/// Built once per run from a fixed corpus snapshot, read-only after.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NgramModel {
    width: usize,
    weights: BTreeMap<Ngram, f64>,
}

impl NgramModel {
    pub fn new(width: usize, weights: BTreeMap<Ngram, f64>) -> Self {
        Self { width, weights }
    }

    /// The configured n-gram width.
    pub fn width(&self) -> usize {
        self.width
    }

    /// Number of distinct n-grams.
    pub fn len(&self) -> usize {
        self.weights.len()
    }

    pub fn is_empty(&self) -> bool {
        self.weights.is_empty()
    }

    pub fn weight(&self, ngram: &Ngram) -> Option<f64> {
        self.weights.get(ngram).copied()
    }

    /// Enumerate all entries in deterministic (lexicographic) order.
    pub fn iter(&self) -> impl Iterator<Item = (&Ngram, f64)> {
        self.weights.iter().map(|(k, v)| (k, *v))
    }

    /// N-grams whose first symbol is `Start` and whose weight exceeds
    /// the given threshold.
    pub fn start_candidates(&self, min_weight: f64) -> Vec<&Ngram> {
        self.weights
            .iter()
            .filter(|(k, v)| k.first() == Some(&Symbol::Start) && **v > min_weight)
            .map(|(k, _)| k)
            .collect()
    }

    /// The highest-weighted n-gram that can follow `current`.
    ///
    /// Ties resolve to the first candidate in enumeration order: the
    /// comparison is strict, so a later equal weight never displaces an
    /// earlier one.
    pub fn best_successor(&self, current: &Ngram) -> Option<(&Ngram, f64)> {
        let mut best: Option<(&Ngram, f64)> = None;
        for (candidate, weight) in self.weights.iter() {
            if !candidate.follows(current) {
                continue;
            }
            match best {
                Some((_, w)) if *weight <= w => {}
                _ => best = Some((candidate, *weight)),
            }
        }
        best
    }
}
