//! # Atoms and Markers
//!
//! An atom is the smallest unit of a pregroup type: a type name with an
//! adjoint exponent. Concrete atoms may carry morphological markers
//! (person, case, number, ...); generic atoms are wildcards used only inside
//! metarules and carry the run of atoms they were bound to instead.
//!
//! ## Notation
//!
//! Atoms are written `name_m0_m1^adjoint`, where each `_m` is a marker value
//! and its position gives the marker category:
//!
//! ```rust
//! use lambek_core::atom::{Atom, Marker};
//!
//! let atom: Atom = "n_1_2^-1".parse().unwrap();
//! assert_eq!(atom.name(), "n");
//! assert_eq!(atom.adjoint(), -1);
//! assert_eq!(atom.markers(), &[Marker::new(0, 1), Marker::new(1, 2)]);
//!
//! let generic: Atom = "*X^0".parse().unwrap();
//! assert!(generic.is_generic());
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::CoreError;

/// A grammatical feature value: `(category, value)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Marker {
    /// Feature category (position in the atom notation)
    pub category: u16,
    /// Value within that category
    pub value: u32,
}

impl Marker {
    /// Create a marker from a category index and its value.
    pub fn new(category: u16, value: u32) -> Self {
        Self { category, value }
    }
}

/// What a generic atom currently stands for.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Binding {
    /// Not yet matched against a candidate type.
    Unbound,
    /// Bound to a captured run of atoms (possibly empty).
    Bound(Vec<Atom>),
}

/// The two kinds of atom. Only concrete atoms carry markers and only
/// generic atoms carry a binding.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AtomKind {
    Concrete { markers: Vec<Marker> },
    Generic(Binding),
}

/// A typed unit: name, adjoint exponent and kind.
///
/// `PartialEq` is strict structural equality. The looser comparison used by
/// the parser and the metarule matcher, where an unmarked atom agrees with
/// any marker sequence, is [`Atom::matches`].
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Atom {
    name: String,
    adjoint: i32,
    kind: AtomKind,
}

impl Atom {
    /// Create a concrete atom without markers.
    pub fn new(name: impl Into<String>, adjoint: i32) -> Self {
        Self::with_markers(name, adjoint, Vec::new())
    }

    /// Create a concrete atom with a marker sequence.
    pub fn with_markers(name: impl Into<String>, adjoint: i32, markers: Vec<Marker>) -> Self {
        Self {
            name: name.into(),
            adjoint,
            kind: AtomKind::Concrete { markers },
        }
    }

    /// Create an unbound generic atom.
    pub fn generic(name: impl Into<String>, adjoint: i32) -> Self {
        Self {
            name: name.into(),
            adjoint,
            kind: AtomKind::Generic(Binding::Unbound),
        }
    }

    /// Create a generic atom bound to a run of atoms.
    pub fn bound(name: impl Into<String>, adjoint: i32, components: Vec<Atom>) -> Self {
        Self {
            name: name.into(),
            adjoint,
            kind: AtomKind::Generic(Binding::Bound(components)),
        }
    }

    /// Atom type name, e.g. `n` or `*X`.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Adjoint exponent (0 for the basic type).
    pub fn adjoint(&self) -> i32 {
        self.adjoint
    }

    /// Concrete or generic, with markers or binding.
    pub fn kind(&self) -> &AtomKind {
        &self.kind
    }

    /// Markers of a concrete atom; always empty for generics.
    pub fn markers(&self) -> &[Marker] {
        match &self.kind {
            AtomKind::Concrete { markers } => markers,
            AtomKind::Generic(_) => &[],
        }
    }

    /// True for metarule wildcards such as `*X`.
    pub fn is_generic(&self) -> bool {
        matches!(self.kind, AtomKind::Generic(_))
    }

    /// Binding of a generic atom, `None` for concrete atoms.
    pub fn binding(&self) -> Option<&Binding> {
        match &self.kind {
            AtomKind::Generic(binding) => Some(binding),
            AtomKind::Concrete { .. } => None,
        }
    }

    /// Same atom with a different adjoint exponent.
    pub fn with_adjoint(&self, adjoint: i32) -> Self {
        Self {
            adjoint,
            ..self.clone()
        }
    }

    /// Right adjoint (exponent + 1).
    pub fn right_adjoint(&self) -> Self {
        self.with_adjoint(self.adjoint + 1)
    }

    /// Left adjoint (exponent - 1).
    pub fn left_adjoint(&self) -> Self {
        self.with_adjoint(self.adjoint - 1)
    }

    /// True if both atoms have the same type name, ignoring adjoint and markers.
    pub fn same_type(&self, other: &Atom) -> bool {
        self.name == other.name
    }

    /// Marker agreement: an empty marker list agrees with anything, otherwise
    /// markers are compared position by position.
    pub fn markers_agree(&self, other: &Atom) -> bool {
        let (ours, theirs) = (self.markers(), other.markers());
        ours.is_empty() || theirs.is_empty() || ours.iter().zip(theirs).all(|(a, b)| a == b)
    }

    /// Loose structural equality: same name, same adjoint, agreeing markers.
    pub fn matches(&self, other: &Atom) -> bool {
        self.name == other.name && self.adjoint == other.adjoint && self.markers_agree(other)
    }
}

impl fmt::Display for Atom {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name)?;
        match &self.kind {
            AtomKind::Concrete { markers } => {
                for marker in markers {
                    write!(f, "_{}", marker.value)?;
                }
                write!(f, "^{}", self.adjoint)
            }
            AtomKind::Generic(Binding::Unbound) => write!(f, "^{}", self.adjoint),
            AtomKind::Generic(Binding::Bound(components)) => {
                write!(f, "^{}{{", self.adjoint)?;
                let parts: Vec<String> = components.iter().map(|a| a.to_string()).collect();
                write!(f, "{}}}", parts.join(" "))
            }
        }
    }
}

impl FromStr for Atom {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let malformed = |reason: &str| CoreError::MalformedAtom {
            input: s.to_string(),
            reason: reason.to_string(),
        };

        let input = s.trim();
        let (head, adjoint) = input
            .split_once('^')
            .ok_or_else(|| malformed("missing '^adjoint'"))?;
        if adjoint.contains('^') {
            return Err(malformed("more than one '^'"));
        }
        let adjoint: i32 = adjoint
            .trim()
            .parse()
            .map_err(|_| malformed("adjoint is not an integer"))?;

        let mut fields = head.split('_');
        let name = fields.next().unwrap_or_default();
        if name.is_empty() {
            return Err(malformed("empty type name"));
        }

        let markers = fields
            .enumerate()
            .map(|(category, value)| {
                let value = value
                    .parse::<u32>()
                    .map_err(|_| malformed("marker is not a non-negative integer"))?;
                let category =
                    u16::try_from(category).map_err(|_| malformed("too many markers"))?;
                Ok(Marker::new(category, value))
            })
            .collect::<Result<Vec<_>, CoreError>>()?;

        if name.contains('*') {
            if !markers.is_empty() {
                return Err(malformed("generic atoms cannot carry markers"));
            }
            Ok(Atom::generic(name, adjoint))
        } else {
            Ok(Atom::with_markers(name, adjoint, markers))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_plain_atom() {
        let atom: Atom = "s^0".parse().unwrap();
        assert_eq!(atom, Atom::new("s", 0));
        assert!(!atom.is_generic());
        assert!(atom.binding().is_none());
    }

    #[test]
    fn test_parse_markers_numbered_by_position() {
        let atom: Atom = "n_3_0_7^2".parse().unwrap();
        assert_eq!(
            atom.markers(),
            &[Marker::new(0, 3), Marker::new(1, 0), Marker::new(2, 7)]
        );
        assert_eq!(atom.adjoint(), 2);
    }

    #[test]
    fn test_parse_generic() {
        let atom: Atom = "*X^-1".parse().unwrap();
        assert!(atom.is_generic());
        assert_eq!(atom.binding(), Some(&Binding::Unbound));
        assert!(atom.markers().is_empty());
    }

    #[test]
    fn test_parse_rejects_malformed() {
        assert!("n".parse::<Atom>().is_err());
        assert!("n^x".parse::<Atom>().is_err());
        assert!("^0".parse::<Atom>().is_err());
        assert!("n^0^1".parse::<Atom>().is_err());
        assert!("n_a^0".parse::<Atom>().is_err());
        assert!("*X_1^0".parse::<Atom>().is_err());
    }

    #[test]
    fn test_display_round_trip() {
        for text in ["n^0", "n_1_2^-1", "*X^3", "verb_0^1"] {
            let atom: Atom = text.parse().unwrap();
            assert_eq!(atom.to_string(), text);
        }
    }

    #[test]
    fn test_display_bound_generic() {
        let atom = Atom::bound("*X", 2, vec![Atom::new("adj", 0), Atom::new("n", 1)]);
        assert_eq!(atom.to_string(), "*X^2{adj^0 n^1}");
    }

    #[test]
    fn test_unmarked_atom_matches_any_markers() {
        let plain = Atom::new("n", 0);
        let marked = Atom::with_markers("n", 0, vec![Marker::new(0, 1)]);
        assert!(plain.matches(&marked));
        assert!(marked.matches(&plain));
        assert_ne!(plain, marked);
    }

    #[test]
    fn test_marker_disagreement() {
        let a = Atom::with_markers("n", 0, vec![Marker::new(0, 1)]);
        let b = Atom::with_markers("n", 0, vec![Marker::new(0, 2)]);
        assert!(!a.matches(&b));
        assert!(a.same_type(&b));
    }

    #[test]
    fn test_adjoint_mismatch() {
        let n = Atom::new("n", 0);
        assert!(!n.matches(&n.right_adjoint()));
        assert_eq!(n.right_adjoint().adjoint(), 1);
        assert_eq!(n.left_adjoint().adjoint(), -1);
    }

    #[test]
    fn test_clone_is_deep() {
        let original = Atom::bound("*X", 0, vec![Atom::new("adj", 0)]);
        let mut copy = original.clone();
        if let AtomKind::Generic(Binding::Bound(run)) = &mut copy.kind {
            run.push(Atom::new("n", 0));
        }
        assert_eq!(original.to_string(), "*X^0{adj^0}");
        assert_eq!(copy.to_string(), "*X^0{adj^0 n^0}");
    }
}
