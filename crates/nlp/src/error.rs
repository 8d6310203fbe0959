//! Error types for grammar loading and parsing.

use lambek_core::CoreError;
use thiserror::Error;

/// Errors that can occur while building grammars or parsing sentences.
#[derive(Debug, Clone, Error)]
pub enum NlpError {
    /// Invalid atom, reduction table or metarule.
    #[error(transparent)]
    Core(#[from] CoreError),

    /// Grammar text is malformed.
    #[error("Grammar format error on line {line}: {message}")]
    GrammarFormat { line: usize, message: String },

    /// Standalone type not present in the atom inventory.
    #[error("Standalone type '{name}' is not a declared atom type")]
    UnknownStandalone { name: String },

    /// Word not found in the dictionary, even after morphological stripping.
    #[error("Unknown word: '{word}'")]
    UnknownWord { word: String },

    /// Empty sentence.
    #[error("Cannot parse empty sentence")]
    EmptySentence,

    /// Grammar or corpus file could not be read.
    #[error("Cannot read '{path}': {message}")]
    Io { path: String, message: String },

    /// Invalid configuration values.
    #[error("Invalid configuration: {message}")]
    Config { message: String },

    /// A concurrent sentence worker panicked or was cancelled.
    #[error("Sentence worker failed: {message}")]
    Worker { message: String },
}

impl NlpError {
    /// Configuration and invariant violations abort a corpus run; a sentence
    /// that cannot be looked up or is empty does not.
    pub fn is_fatal(&self) -> bool {
        !matches!(self, NlpError::UnknownWord { .. } | NlpError::EmptySentence)
    }
}
