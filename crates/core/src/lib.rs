//! Parsing and analytics core for exported chat transcripts.
//!
//! Raw text goes through [`parser`] and [`features`] into a [`application::Session`];
//! [`aggregator`] computes the summary tables and [`tokenizer`] together with
//! [`language`] feed the vocabulary table. Input and output go through [`ports`].

pub mod aggregator;
pub mod application;
pub mod config;
pub mod domain;
pub mod error;
pub mod features;
pub mod language;
pub mod parser;
pub mod ports;
pub mod tokenizer;
pub mod utils;

pub use error::{ChatError, Result};
