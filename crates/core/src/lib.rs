//! # Core - Type-Logical Grammar Foundations
//!
//! This crate provides the grammar-level data model for pregroup parsing:
//!
//! - **Atoms**: type name, adjoint exponent, markers or a generic binding
//! - **Types**: ordered atom sequences, one reading of a word
//! - **Reduction table**: which atom types may cancel against which
//! - **Metarules**: pattern → target rewrites that derive extra word types
//! - **Paths**: Cartesian enumeration of per-word candidate types
//!
//! Everything here is immutable once a grammar is loaded and can be shared
//! freely between sentence parses.
//!
//! ## Example
//!
//! ```rust
//! use lambek_core::{Atom, PregroupType, ReductionTable};
//!
//! let table = ReductionTable::new(["n", "s"], "x", &[]).unwrap();
//! let verb: PregroupType = "n^1 s^0".parse().unwrap();
//! let subject = Atom::new("n", 0);
//! assert!(table.reduction_exists(&subject, &verb.atoms()[0]).unwrap());
//! ```

pub mod atom;
pub mod error;
pub mod metarule;
pub mod paths;
pub mod reduction;
pub mod types;

pub use atom::{Atom, AtomKind, Binding, Marker};
pub use error::CoreError;
pub use metarule::{expand_types, ExpansionReport, MetaRule, MetaruleIteration, PatternMatch};
pub use paths::{enumerate_paths, path_count, PathTree};
pub use reduction::ReductionTable;
pub use types::PregroupType;
