//! # Pregroup Types
//!
//! A pregroup type is an ordered sequence of atoms: one grammatical reading
//! of a word or span. Transitive verbs, for instance, are usually written
//! `n^1 s^0 n^-1`.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::atom::{Atom, Binding};
use crate::error::CoreError;

/// An ordered sequence of atoms.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct PregroupType {
    atoms: Vec<Atom>,
}

impl PregroupType {
    /// Create a type from its atoms, left to right.
    pub fn new(atoms: Vec<Atom>) -> Self {
        Self { atoms }
    }

    /// The empty type.
    pub fn unit() -> Self {
        Self { atoms: Vec::new() }
    }

    /// The atoms in order.
    pub fn atoms(&self) -> &[Atom] {
        &self.atoms
    }

    /// Consume the type, returning its atoms.
    pub fn into_atoms(self) -> Vec<Atom> {
        self.atoms
    }

    /// Number of atoms.
    pub fn len(&self) -> usize {
        self.atoms.len()
    }

    /// True for the unit type.
    pub fn is_empty(&self) -> bool {
        self.atoms.is_empty()
    }

    /// Iterate over the atoms.
    pub fn iter(&self) -> std::slice::Iter<'_, Atom> {
        self.atoms.iter()
    }

    /// Concatenation of two types.
    pub fn tensor(&self, other: &PregroupType) -> PregroupType {
        let mut atoms = self.atoms.clone();
        atoms.extend(other.atoms.iter().cloned());
        PregroupType { atoms }
    }

    /// Loose equality: same length and pairwise [`Atom::matches`].
    pub fn matches(&self, other: &PregroupType) -> bool {
        self.len() == other.len()
            && self
                .atoms
                .iter()
                .zip(&other.atoms)
                .all(|(a, b)| a.matches(b))
    }

    /// True if any atom is a metarule wildcard.
    pub fn has_generics(&self) -> bool {
        self.atoms.iter().any(Atom::is_generic)
    }

    /// Replace every bound generic by its components, each re-stamped with
    /// the generic's adjoint. Concrete atoms pass through; unbound generics
    /// contribute nothing.
    pub fn flatten(&self) -> PregroupType {
        let mut atoms = Vec::with_capacity(self.atoms.len());
        for atom in &self.atoms {
            match atom.binding() {
                None => atoms.push(atom.clone()),
                Some(Binding::Bound(components)) => atoms.extend(
                    components
                        .iter()
                        .map(|component| component.with_adjoint(atom.adjoint())),
                ),
                Some(Binding::Unbound) => {}
            }
        }
        PregroupType { atoms }
    }
}

impl From<Vec<Atom>> for PregroupType {
    fn from(atoms: Vec<Atom>) -> Self {
        Self::new(atoms)
    }
}

impl<'a> IntoIterator for &'a PregroupType {
    type Item = &'a Atom;
    type IntoIter = std::slice::Iter<'a, Atom>;

    fn into_iter(self) -> Self::IntoIter {
        self.atoms.iter()
    }
}

impl fmt::Display for PregroupType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.atoms.is_empty() {
            write!(f, "1")
        } else {
            let parts: Vec<String> = self.atoms.iter().map(|a| a.to_string()).collect();
            write!(f, "{}", parts.join(" "))
        }
    }
}

impl FromStr for PregroupType {
    type Err = CoreError;

    /// Parse whitespace-separated atoms, e.g. `n^1 s^0 n^-1`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.split_whitespace()
            .map(str::parse)
            .collect::<Result<Vec<Atom>, _>>()
            .map(PregroupType::new)
    }
}
