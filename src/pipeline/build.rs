// src/pipeline/build.rs

//! N-gram frequency model construction.
//!
//! Consumes the corpus as per-document symbol sequences; n-grams are
//! contiguous windows within a single document and never span two
//! documents.

use std::collections::BTreeMap;

use crate::error::{AppError, Result};
use crate::models::{Corpus, ModelConfig, Ngram, NgramModel, Normalization, Symbol};

/// Build a frequency model over fixed-width n-grams of the corpus.
///
/// In strict mode (`allow_variable_size == false`) only tuples of
/// exactly the configured width are counted, so trailing windows of a
/// short document never pollute the model; permissive mode counts them
/// too. An empty corpus yields an empty model, which callers must
/// refuse before generation.
pub fn build_model(corpus: &Corpus, config: &ModelConfig) -> Result<NgramModel> {
    if config.width < 2 {
        return Err(AppError::validation("n-gram width must be >= 2"));
    }

    let width = config.width;
    let mut counts: BTreeMap<Ngram, u64> = BTreeMap::new();

    for doc in &corpus.documents {
        let symbols: Vec<Symbol> = doc.tokens.iter().map(|t| Symbol::word(t.as_str())).collect();
        let len = symbols.len();

        for i in 0..len {
            let tuple = if config.sentinel_mode && i == 0 {
                let mut t = Vec::with_capacity(width);
                t.push(Symbol::Start);
                t.extend_from_slice(&symbols[..(width - 1).min(len)]);
                t
            } else if config.sentinel_mode && len >= width && i == len - width {
                let mut t = symbols[i..i + width - 1].to_vec();
                t.push(Symbol::Stop);
                t
            } else {
                symbols[i..(i + width).min(len)].to_vec()
            };

            if !config.allow_variable_size && tuple.len() != width {
                continue;
            }
            *counts.entry(Ngram::new(tuple)).or_insert(0) += 1;
        }
    }

    let weights = normalize(&counts, config.normalization)?;
    Ok(NgramModel::new(width, weights))
}

/// Apply the configured normalization scheme to raw counts.
fn normalize(
    counts: &BTreeMap<Ngram, u64>,
    scheme: Normalization,
) -> Result<BTreeMap<Ngram, f64>> {
    match scheme {
        Normalization::UniqueCount => {
            let uniques = counts.len() as f64;
            Ok(counts
                .iter()
                .map(|(k, v)| (k.clone(), *v as f64 / uniques))
                .collect())
        }
        Normalization::StandardScore => {
            if counts.len() < 2 {
                return Err(AppError::degenerate(
                    "standard-score normalization needs at least two distinct n-grams",
                ));
            }
            let n = counts.len() as f64;
            let mean = counts.values().map(|v| *v as f64).sum::<f64>() / n;
            let variance = counts
                .values()
                .map(|v| {
                    let d = *v as f64 - mean;
                    d * d
                })
                .sum::<f64>()
                / n;
            let std_dev = variance.sqrt();
            if std_dev == 0.0 {
                return Err(AppError::degenerate(
                    "standard-score normalization undefined for zero variance",
                ));
            }
            Ok(counts
                .iter()
                .map(|(k, v)| (k.clone(), (*v as f64 - mean) / std_dev))
                .collect())
        }
    }
}
