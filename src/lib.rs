// src/lib.rs

//! wikigram library
//!
//! A one-level link crawler that accumulates a token corpus from a seed
//! page, an n-gram frequency model over that corpus, and a greedy
//! generator that walks the model.

pub mod error;
pub mod models;
pub mod pipeline;
pub mod services;
pub mod storage;
pub mod utils;
