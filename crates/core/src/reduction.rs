//! # Reduction Table
//!
//! Precompiled adjacency matrix over the declared atom types stating which
//! type categories may cancel. The matrix is reflexive and gains one entry
//! per declared `(from, to)` rule. The dummy sentinel used by the repair
//! pass gets its own row and column, which are reflexive only.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::atom::Atom;
use crate::error::CoreError;

/// Boolean reduction matrix indexed by atom type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReductionTable {
    inventory: Vec<String>,
    dummy: String,
    index: HashMap<String, usize>,
    /// Row-major `(n + 1) x (n + 1)`, the last row/column being the dummy.
    matrix: Vec<bool>,
}

impl ReductionTable {
    /// Compile the table from the ordered inventory, the dummy name and the
    /// declared rules.
    pub fn new<I, S>(inventory: I, dummy: impl Into<String>, rules: &[(String, String)]) -> Result<Self, CoreError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let inventory: Vec<String> = inventory.into_iter().map(Into::into).collect();
        let dummy = dummy.into();

        let mut index = HashMap::with_capacity(inventory.len() + 1);
        for (i, name) in inventory.iter().enumerate() {
            if name == &dummy {
                return Err(CoreError::DummyCollision { name: dummy });
            }
            if index.insert(name.clone(), i).is_some() {
                return Err(CoreError::DuplicateAtomType { name: name.clone() });
            }
        }
        index.insert(dummy.clone(), inventory.len());

        let width = inventory.len() + 1;
        let mut matrix = vec![false; width * width];
        for i in 0..width {
            matrix[i * width + i] = true;
        }

        let mut table = Self {
            inventory,
            dummy,
            index,
            matrix,
        };
        for (from, to) in rules {
            let (i, j) = (table.index_of(from)?, table.index_of(to)?);
            table.matrix[i * width + j] = true;
        }
        Ok(table)
    }

    /// Number of declared atom types (the dummy is not counted).
    pub fn len(&self) -> usize {
        self.inventory.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inventory.is_empty()
    }

    /// Declared atom types in inventory order.
    pub fn inventory(&self) -> &[String] {
        &self.inventory
    }

    pub fn dummy(&self) -> &str {
        &self.dummy
    }

    /// True if the atom is typed as the dummy sentinel.
    pub fn is_dummy(&self, atom: &Atom) -> bool {
        atom.name() == self.dummy
    }

    pub fn contains(&self, name: &str) -> bool {
        self.index.contains_key(name)
    }

    /// Inventory position of a type name; the dummy maps to `len()`.
    pub fn index_of(&self, name: &str) -> Result<usize, CoreError> {
        self.index
            .get(name)
            .copied()
            .ok_or_else(|| CoreError::UnknownAtomType {
                name: name.to_string(),
            })
    }

    /// Whether the type of `from` may reduce to the type of `to`.
    pub fn reduction_exists(&self, from: &Atom, to: &Atom) -> Result<bool, CoreError> {
        self.names_reduce(from.name(), to.name())
    }

    /// Same as [`ReductionTable::reduction_exists`] on bare type names.
    pub fn names_reduce(&self, from: &str, to: &str) -> Result<bool, CoreError> {
        let (i, j) = (self.index_of(from)?, self.index_of(to)?);
        Ok(self.matrix[i * (self.inventory.len() + 1) + j])
    }

    /// Declared `(from, to)` pairs, excluding the reflexive diagonal.
    pub fn rules(&self) -> Vec<(&str, &str)> {
        let width = self.inventory.len() + 1;
        let mut rules = Vec::new();
        for (i, from) in self.inventory.iter().enumerate() {
            for (j, to) in self.inventory.iter().enumerate() {
                if i != j && self.matrix[i * width + j] {
                    rules.push((from.as_str(), to.as_str()));
                }
            }
        }
        rules
    }

    /// Render the matrix as a `T`/`F` grid with a header row.
    pub fn render(&self) -> String {
        let width = self.inventory.len() + 1;
        let mut out = format!("  {}\n", self.inventory.join(" "));
        for (i, name) in self.inventory.iter().enumerate() {
            out.push_str(name);
            for j in 0..self.inventory.len() {
                out.push_str(if self.matrix[i * width + j] { " T" } else { " F" });
            }
            out.push('\n');
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rule(from: &str, to: &str) -> (String, String) {
        (from.to_string(), to.to_string())
    }

    fn table() -> ReductionTable {
        ReductionTable::new(["n", "s", "pn"], "x", &[rule("pn", "n")]).unwrap()
    }

    #[test]
    fn test_reflexive() {
        let table = table();
        for name in table.inventory() {
            let atom = Atom::new(name.clone(), 0);
            assert!(table.reduction_exists(&atom, &atom).unwrap());
        }
    }

    #[test]
    fn test_declared_rule_is_directional() {
        let table = table();
        assert!(table.names_reduce("pn", "n").unwrap());
        assert!(!table.names_reduce("n", "pn").unwrap());
        assert!(!table.names_reduce("n", "s").unwrap());
    }

    #[test]
    fn test_adjoint_and_markers_ignored() {
        let table = table();
        let a: Atom = "pn_1^-1".parse().unwrap();
        let b: Atom = "n_2^3".parse().unwrap();
        assert!(table.reduction_exists(&a, &b).unwrap());
    }

    #[test]
    fn test_dummy_has_own_index() {
        let table = table();
        assert_eq!(table.index_of("x").unwrap(), 3);
        assert!(table.names_reduce("x", "x").unwrap());
        assert!(!table.names_reduce("x", "n").unwrap());
        assert!(!table.names_reduce("n", "x").unwrap());
        assert!(table.is_dummy(&Atom::new("x", 1)));
    }

    #[test]
    fn test_unknown_type_is_error() {
        let table = table();
        let err = table
            .reduction_exists(&Atom::new("q", 0), &Atom::new("n", 0))
            .unwrap_err();
        assert_eq!(err, CoreError::UnknownAtomType { name: "q".into() });
    }

    #[test]
    fn test_rule_with_unknown_type_rejected() {
        let result = ReductionTable::new(["n"], "x", &[rule("n", "s")]);
        assert!(matches!(result, Err(CoreError::UnknownAtomType { .. })));
    }

    #[test]
    fn test_duplicate_and_collision_rejected() {
        assert!(matches!(
            ReductionTable::new(["n", "n"], "x", &[]),
            Err(CoreError::DuplicateAtomType { .. })
        ));
        assert!(matches!(
            ReductionTable::new(["n", "x"], "x", &[]),
            Err(CoreError::DummyCollision { .. })
        ));
    }

    #[test]
    fn test_rules_and_render() {
        let table = table();
        assert_eq!(table.rules(), vec![("pn", "n")]);
        let grid = table.render();
        assert!(grid.starts_with("  n s pn\n"));
        assert!(grid.contains("pn T F T"));
    }
}
