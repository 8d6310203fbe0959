//! # NLP - Pregroup Sentence Parsing
//!
//! This crate parses sentences against a pregroup grammar built from the
//! `lambek-core` data model.
//!
//! ## Core Concepts
//!
//! - **Grammar**: atom inventory, reduction table, metarules and a dictionary
//!   whose entries list candidate types per word
//! - **Morphology**: suffix stripping and irregular forms for dictionary lookup
//! - **Reduction engine**: tries every candidate path with a stack-based
//!   reduction, then repairs over-frequent atom types with a dummy type
//! - **Nesting depth**: how deeply the accepted cancellations nest
//! - **Corpus runner**: per-sentence reports and the average nesting depth
//!
//! ## Example: Parsing "Alice loves Bob"
//!
//! ```rust
//! use lambek_nlp::grammar::Grammar;
//!
//! let grammar = Grammar::english_basic().unwrap();
//!
//! // Parse and check grammaticality
//! let result = grammar.parse(&["Alice", "loves", "Bob"]).unwrap();
//! assert!(result.is_grammatical());
//!
//! // See the links
//! println!("{}", result.trace());
//! ```

pub mod config;
pub mod corpus;
mod error;
pub mod grammar;
pub mod loader;
pub mod morphology;
pub mod nesting;
pub mod pregroup;

pub use config::{GrammarConfig, LambekConfig, ParserConfig, RepairStrategy};
pub use corpus::{parse_corpus_concurrent, tokenize, CorpusReport, SentenceReport, SentenceStatus};
pub use error::NlpError;
pub use grammar::{Entry, Grammar, GrammarBuilder, MarkerCategory};
pub use morphology::{MorphStep, Morphology};
pub use nesting::nesting_depth;
pub use pregroup::{
    Acceptance, Derivation, Link, ParseOutcome, Parser, PendingStack, Repair, Stage,
};
