//! # Error Types
//!
//! Errors raised while building or querying the grammar-level structures.
//! Most of them are configuration errors: a grammar that references an
//! undeclared atom type, or a metarule that the matcher cannot interpret,
//! is not something a parse can recover from.

use thiserror::Error;

/// Core errors for atoms, reduction tables and metarules.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CoreError {
    /// An atom names a type that is neither declared nor the dummy sentinel.
    #[error("Unknown atom type: '{name}'")]
    UnknownAtomType { name: String },

    /// The same type name appears twice in the atom inventory.
    #[error("Atom type '{name}' declared more than once")]
    DuplicateAtomType { name: String },

    /// The dummy sentinel shares its name with a declared atom type.
    #[error("Dummy type '{name}' collides with a declared atom type")]
    DummyCollision { name: String },

    /// Atom notation could not be parsed.
    #[error("Malformed atom '{input}': {reason}")]
    MalformedAtom { input: String, reason: String },

    /// A metarule uses generics in a way the matcher does not support.
    #[error("Invalid metarule {tag}: {reason}")]
    InvalidMetaRule { tag: i64, reason: String },

    /// A candidate type aligns to a pattern in more than one way.
    #[error("Ambiguous match of '{candidate}' against metarule {tag} pattern '{pattern}'")]
    AmbiguousMatch {
        tag: i64,
        pattern: String,
        candidate: String,
    },
}
