// src/pipeline/generate.rs

//! Greedy best-first walk over the n-gram transition graph.
//!
//! Not sampling, not beam search: from the current n-gram the walk
//! always advances to the highest-weighted n-gram whose prefix equals
//! the current suffix, with ties resolved by model enumeration order.
//! The walk is deterministic given a model and a start n-gram; only
//! the start selection is randomized.

use rand::Rng;

use crate::error::{AppError, Result};
use crate::models::{GenerationConfig, Ngram, NgramModel, Symbol};

/// Why a generation run ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopReason {
    /// The output reached the configured length bound.
    LengthReached,
    /// No n-gram in the model could follow the current one.
    DeadEnd,
    /// A STOP sentinel was reached.
    StopSentinel,
}

/// A finite, possibly shorter-than-requested generated sequence.
#[derive(Debug, Clone)]
pub struct Generation {
    pub words: Vec<String>,
    pub stop_reason: StopReason,
}

impl Generation {
    pub fn text(&self) -> String {
        self.words.join(" ")
    }
}

/// Generate a sequence by picking a start n-gram and walking greedily.
///
/// In sentinel mode the start is drawn uniformly among n-grams whose
/// first symbol is START with weight above the configured minimum
/// ([`AppError::NoStartCandidate`] when none qualify); otherwise
/// uniformly among all n-grams.
pub fn generate<R: Rng + ?Sized>(
    model: &NgramModel,
    config: &GenerationConfig,
    sentinel_mode: bool,
    rng: &mut R,
) -> Result<Generation> {
    if model.is_empty() {
        return Err(AppError::degenerate("cannot generate from an empty model"));
    }

    let start = if sentinel_mode {
        let candidates = model.start_candidates(config.min_start_weight);
        if candidates.is_empty() {
            return Err(AppError::NoStartCandidate);
        }
        candidates[rng.gen_range(0..candidates.len())].clone()
    } else {
        let all: Vec<&Ngram> = model.iter().map(|(k, _)| k).collect();
        all[rng.gen_range(0..all.len())].clone()
    };

    log::debug!("Starting walk at {start}");
    Ok(walk(model, start, config))
}

/// Walk the transition graph greedily from a fixed start n-gram.
///
/// The first step emits all of the start's word symbols; every later
/// step emits only the successor's last word, since the rest already
/// appeared through the overlap. Sentinels are never emitted. A dead
/// end is a normal terminal condition, not an error; cycles are
/// tolerated and bounded only by `max_length`.
pub fn walk(model: &NgramModel, start: Ngram, config: &GenerationConfig) -> Generation {
    let mut words: Vec<String> = start
        .symbols()
        .iter()
        .filter_map(|s| s.as_word().map(str::to_string))
        .collect();
    words.truncate(config.max_length);

    if start.last() == Some(&Symbol::Stop) {
        return Generation {
            words,
            stop_reason: StopReason::StopSentinel,
        };
    }

    let mut current = start;
    while words.len() < config.max_length {
        let Some((next, _)) = model.best_successor(&current) else {
            return Generation {
                words,
                stop_reason: StopReason::DeadEnd,
            };
        };

        match next.last() {
            Some(Symbol::Stop) => {
                return Generation {
                    words,
                    stop_reason: StopReason::StopSentinel,
                };
            }
            Some(Symbol::Word(w)) => words.push(w.clone()),
            _ => {}
        }
        current = next.clone();
    }

    Generation {
        words,
        stop_reason: StopReason::LengthReached,
    }
}
