// src/pipeline/mod.rs

//! Corpus-to-text pipeline: model building, generation, and
//! orchestration.

mod build;
mod generate;
mod run;

pub use build::build_model;
pub use generate::{Generation, StopReason, generate, walk};
pub use run::{acquire_corpus, run_generation};
