//! # Metarules
//!
//! A metarule rewrites a pattern type into a target type. Patterns may
//! contain generic atoms (`*X^0`) standing for a contiguous run of atoms; the
//! same generic in the target is replaced by that run. Applied to a
//! dictionary entry, metarules enlarge the list of candidate types a word
//! may take.
//!
//! ## Matching
//!
//! A candidate `T` is a case of pattern `P` when every concrete atom of `P`
//! aligns, left to right, to exactly one [`Atom::matches`]-equal atom of `T`,
//! and every unaligned run of `T` sits in a gap of `P` occupied by a generic.
//! A concrete atom of `P` aligned to either end of `T` must itself sit at that
//! end of `P`. Patterns are restricted to at most one generic per gap, so a
//! run never has to be split between two wildcards.
//!
//! ```rust
//! use lambek_core::metarule::MetaRule;
//!
//! let rule = MetaRule::new(1, "*X^0 v^1".parse().unwrap(), "*X^2".parse().unwrap()).unwrap();
//! let derived = rule.apply(&"adj^0 v^1".parse().unwrap()).unwrap();
//! assert_eq!(derived.unwrap().to_string(), "adj^2");
//! ```

use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;

use crate::atom::{Atom, Binding};
use crate::error::CoreError;
use crate::types::PregroupType;

/// A pattern → target rewrite.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RawMetaRule")]
pub struct MetaRule {
    tag: i64,
    pattern: PregroupType,
    target: PregroupType,
}

/// Unchecked wire form of a [`MetaRule`]; deserialization goes through
/// [`MetaRule::new`].
#[derive(Deserialize)]
struct RawMetaRule {
    tag: i64,
    pattern: PregroupType,
    target: PregroupType,
}

impl TryFrom<RawMetaRule> for MetaRule {
    type Error = CoreError;

    fn try_from(raw: RawMetaRule) -> Result<Self, Self::Error> {
        MetaRule::new(raw.tag, raw.pattern, raw.target)
    }
}

impl MetaRule {
    /// Create a metarule, rejecting generic layouts the matcher cannot handle:
    /// adjacent generics in the pattern, a generic repeated in the pattern,
    /// and target generics that the pattern never binds.
    pub fn new(tag: i64, pattern: PregroupType, target: PregroupType) -> Result<Self, CoreError> {
        let invalid = |reason: String| CoreError::InvalidMetaRule { tag, reason };

        if pattern.is_empty() {
            return Err(invalid("empty pattern".to_string()));
        }

        let atoms = pattern.atoms();
        if let Some(pair) = atoms
            .windows(2)
            .find(|pair| pair[0].is_generic() && pair[1].is_generic())
        {
            return Err(invalid(format!(
                "adjacent generics {} and {} in pattern",
                pair[0], pair[1]
            )));
        }

        let mut generics = HashSet::new();
        for atom in atoms.iter().filter(|a| a.is_generic()) {
            if !generics.insert(atom.name()) {
                return Err(invalid(format!(
                    "generic {} appears twice in pattern",
                    atom.name()
                )));
            }
        }

        if let Some(unbound) = target
            .iter()
            .find(|a| a.is_generic() && !generics.contains(a.name()))
        {
            return Err(invalid(format!(
                "target generic {} does not occur in pattern",
                unbound.name()
            )));
        }

        Ok(Self {
            tag,
            pattern,
            target,
        })
    }

    /// Numeric tag from the grammar text.
    pub fn tag(&self) -> i64 {
        self.tag
    }

    /// The pattern, possibly with generics.
    pub fn pattern(&self) -> &PregroupType {
        &self.pattern
    }

    /// The rewrite target.
    pub fn target(&self) -> &PregroupType {
        &self.target
    }

    /// Decide whether `candidate` is a case of the pattern.
    ///
    /// Returns `Ok(None)` when it is not, and [`CoreError::AmbiguousMatch`]
    /// when the candidate aligns in more than one way (duplicate atoms).
    pub fn match_type(&self, candidate: &PregroupType) -> Result<Option<PatternMatch>, CoreError> {
        let aligner = Aligner::new(self.pattern.atoms(), candidate.atoms());
        let mut found = Vec::new();
        aligner.search(0, 0, &mut Vec::new(), &mut found);

        match found.len() {
            0 => Ok(None),
            1 => {
                let positions = found.remove(0);
                Ok(Some(aligner.bind(&positions)))
            }
            _ => Err(CoreError::AmbiguousMatch {
                tag: self.tag,
                pattern: self.pattern.to_string(),
                candidate: candidate.to_string(),
            }),
        }
    }

    /// Match and, on success, produce the flattened target instantiation.
    pub fn apply(&self, candidate: &PregroupType) -> Result<Option<PregroupType>, CoreError> {
        Ok(self
            .match_type(candidate)?
            .map(|found| found.instantiate(&self.target)))
    }
}

impl fmt::Display for MetaRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {} --> {}", self.tag, self.pattern, self.target)
    }
}

/// A successful match: the pattern with every generic bound to its run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PatternMatch {
    bound_pattern: PregroupType,
}

impl PatternMatch {
    pub fn bound_pattern(&self) -> &PregroupType {
        &self.bound_pattern
    }

    /// The run captured by the generic named `name`.
    pub fn binding(&self, name: &str) -> Option<&[Atom]> {
        self.bound_pattern
            .iter()
            .find(|a| a.is_generic() && a.name() == name)
            .and_then(|a| match a.binding() {
                Some(Binding::Bound(run)) => Some(run.as_slice()),
                _ => None,
            })
    }

    /// Substitute the captured runs into a copy of `target` and flatten it.
    pub fn instantiate(&self, target: &PregroupType) -> PregroupType {
        let substituted: Vec<Atom> = target
            .iter()
            .map(|atom| {
                if !atom.is_generic() {
                    return atom.clone();
                }
                match self.binding(atom.name()) {
                    Some(run) => Atom::bound(atom.name(), atom.adjoint(), run.to_vec()),
                    None => atom.clone(),
                }
            })
            .collect();
        PregroupType::new(substituted).flatten()
    }
}

/// Backtracking search for monotone alignments of the pattern's concrete
/// atoms onto the candidate.
struct Aligner<'a> {
    pattern: &'a [Atom],
    candidate: &'a [Atom],
    /// Pattern indices of the concrete atoms, in order.
    concrete: Vec<usize>,
    /// `gap_open[s]`: a generic sits before `concrete[s]` (or after the last
    /// concrete atom when `s == concrete.len()`).
    gap_open: Vec<bool>,
}

impl<'a> Aligner<'a> {
    fn new(pattern: &'a [Atom], candidate: &'a [Atom]) -> Self {
        let concrete: Vec<usize> = pattern
            .iter()
            .enumerate()
            .filter(|(_, a)| !a.is_generic())
            .map(|(j, _)| j)
            .collect();

        let mut gap_open = Vec::with_capacity(concrete.len() + 1);
        let mut previous = 0;
        for &k in &concrete {
            gap_open.push(pattern[previous..k].iter().any(Atom::is_generic));
            previous = k + 1;
        }
        gap_open.push(pattern[previous.min(pattern.len())..].iter().any(Atom::is_generic));

        Self {
            pattern,
            candidate,
            concrete,
            gap_open,
        }
    }

    /// Collect up to two complete alignments; two is enough to call the
    /// match ambiguous.
    fn search(&self, s: usize, start: usize, current: &mut Vec<usize>, found: &mut Vec<Vec<usize>>) {
        if found.len() >= 2 {
            return;
        }
        if s == self.concrete.len() {
            if start == self.candidate.len() || self.gap_open[s] {
                found.push(current.clone());
            }
            return;
        }

        let k = self.concrete[s];
        let last_pattern = self.pattern.len() - 1;
        let last_candidate = self.candidate.len().saturating_sub(1);
        for i in start..self.candidate.len() {
            if i > start && !self.gap_open[s] {
                break;
            }
            if !self.candidate[i].matches(&self.pattern[k]) {
                continue;
            }
            if (i == 0 && k != 0) || (i == last_candidate && k != last_pattern) {
                continue;
            }
            current.push(i);
            self.search(s + 1, i + 1, current, found);
            current.pop();
        }
    }

    /// Build the bound pattern from an alignment.
    fn bind(&self, positions: &[usize]) -> PatternMatch {
        let mut atoms = Vec::with_capacity(self.pattern.len());
        let mut next = 0;
        let mut s = 0;
        for atom in self.pattern {
            if atom.is_generic() {
                let end = positions.get(s).copied().unwrap_or(self.candidate.len());
                let run = self.candidate[next..end].to_vec();
                atoms.push(Atom::bound(atom.name(), atom.adjoint(), run));
                next = end;
            } else {
                let i = positions[s];
                atoms.push(self.candidate[i].clone());
                next = i + 1;
                s += 1;
            }
        }
        PatternMatch {
            bound_pattern: PregroupType::new(atoms),
        }
    }
}

/// How many rounds of metarule application to run per dictionary entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MetaruleIteration {
    /// A fixed number of rounds.
    Rounds(usize),
    /// Repeat until a round adds nothing, up to `max_rounds`.
    FixedPoint { max_rounds: usize },
}

impl Default for MetaruleIteration {
    fn default() -> Self {
        MetaruleIteration::Rounds(3)
    }
}

/// What one expansion pass did to an entry's type list.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExpansionReport {
    pub rounds_run: usize,
    pub added: usize,
    /// (type, rule) pairs skipped because the match was ambiguous.
    pub ambiguous: usize,
    /// The last round run added no types.
    pub converged: bool,
}

/// Apply every metarule to every type, round by round, appending derived
/// types that are not already present.
///
/// Each round reads only the types present when it started; types derived
/// during a round are visible to the next one.
pub fn expand_types(
    types: &mut Vec<PregroupType>,
    rules: &[MetaRule],
    iteration: MetaruleIteration,
) -> ExpansionReport {
    let (max_rounds, stop_when_stable) = match iteration {
        MetaruleIteration::Rounds(n) => (n, false),
        MetaruleIteration::FixedPoint { max_rounds } => (max_rounds, true),
    };

    let mut report = ExpansionReport::default();
    for _ in 0..max_rounds {
        let existing = types.len();
        let mut derived: Vec<PregroupType> = Vec::new();

        for candidate in &types[..existing] {
            for rule in rules {
                match rule.apply(candidate) {
                    Ok(Some(new_type)) => {
                        let known = types
                            .iter()
                            .chain(derived.iter())
                            .any(|t| t.matches(&new_type));
                        if !known {
                            tracing::debug!(rule = rule.tag(), from = %candidate, to = %new_type, "metarule derived type");
                            derived.push(new_type);
                        }
                    }
                    Ok(None) => {}
                    Err(e) => {
                        tracing::warn!(error = %e, "skipping ambiguous metarule match");
                        report.ambiguous += 1;
                    }
                }
            }
        }

        report.rounds_run += 1;
        report.added += derived.len();
        report.converged = derived.is_empty();
        types.extend(derived);

        if report.converged && stop_when_stable {
            break;
        }
    }
    report
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ty(s: &str) -> PregroupType {
        s.parse().unwrap()
    }

    fn rule(pattern: &str, target: &str) -> MetaRule {
        MetaRule::new(0, ty(pattern), ty(target)).unwrap()
    }

    #[test]
    fn test_generic_binds_leading_run() {
        let found = rule("*X^0 v^1", "*X^0 n^2")
            .match_type(&ty("adj^0 v^1"))
            .unwrap()
            .unwrap();
        assert_eq!(found.binding("*X").unwrap(), ty("adj^0").atoms());
    }

    #[test]
    fn test_instantiation_keeps_concrete_target_atoms() {
        let derived = rule("*X^0 v^1", "*X^0 n^2").apply(&ty("adj^0 v^1")).unwrap();
        assert_eq!(derived, Some(ty("adj^0 n^2")));
    }

    #[test]
    fn test_instantiation_restamps_adjoint() {
        let derived = rule("*X^0 v^1", "*X^2").apply(&ty("adj^0 v^1")).unwrap();
        assert_eq!(derived, Some(ty("adj^2")));
    }

    #[test]
    fn test_multi_atom_run() {
        let derived = rule("n^1 *X^0", "*X^0 n^-1")
            .apply(&ty("n^1 s^0 o^-1"))
            .unwrap();
        assert_eq!(derived, Some(ty("s^0 o^0 n^-1")));
    }

    #[test]
    fn test_middle_generic_may_bind_empty_run() {
        let found = rule("n^1 *X^0 s^0", "s^0")
            .match_type(&ty("n^1 s^0"))
            .unwrap()
            .unwrap();
        assert_eq!(found.binding("*X").unwrap(), &[] as &[Atom]);
    }

    #[test]
    fn test_edge_generic_requires_nonempty_run() {
        assert_eq!(rule("*X^0 v^1", "n^0").match_type(&ty("v^1")).unwrap(), None);
    }

    #[test]
    fn test_unaligned_run_without_generic_is_not_a_case() {
        assert_eq!(rule("a^0 b^0", "c^0").apply(&ty("a^0 c^0 b^0")).unwrap(), None);
        assert_eq!(rule("v^1", "n^0").apply(&ty("adj^0 v^1")).unwrap(), None);
    }

    #[test]
    fn test_concrete_atoms_must_align_in_order() {
        assert_eq!(rule("a^0 *X^0 b^0", "c^0").apply(&ty("b^0 c^0 a^0")).unwrap(), None);
    }

    #[test]
    fn test_markers_are_loose_and_preserved() {
        let derived = rule("*X^0 v^1", "*X^1").apply(&ty("n_2^0 v_1^1")).unwrap();
        assert_eq!(derived, Some(ty("n_2^1")));
    }

    #[test]
    fn test_duplicate_atoms_make_match_ambiguous() {
        let err = rule("*X^0 n^1 *Y^0", "*X^0").match_type(&ty("s^0 n^1 o^0 n^1 s^0"));
        assert!(matches!(err, Err(CoreError::AmbiguousMatch { .. })));
    }

    #[test]
    fn test_expand_skips_ambiguous_matches() {
        let rules = vec![rule("*X^0 n^1 *Y^0", "*X^0")];
        let original = vec![ty("s^0 n^1 o^0 n^1 s^0")];

        let mut types = original.clone();
        let report = expand_types(&mut types, &rules, MetaruleIteration::Rounds(1));
        assert_eq!(report.ambiguous, 1);
        assert_eq!(report.added, 0);
        assert_eq!(types, original);

        // Every round meets the same ambiguous pair again.
        let report = expand_types(&mut types, &rules, MetaruleIteration::default());
        assert_eq!(report.ambiguous, 3);
        assert_eq!(types, original);
    }

    #[test]
    fn test_duplicate_atoms_with_single_alignment_are_fine() {
        let derived = rule("*X^0 n^1", "*X^1").apply(&ty("n^1 s^0 n^1")).unwrap();
        assert_eq!(derived, Some(ty("n^1 s^1")));
    }

    #[test]
    fn test_invalid_rules_rejected() {
        assert!(MetaRule::new(1, ty("*X^0 *Y^0"), ty("n^0")).is_err());
        assert!(MetaRule::new(2, ty("*X^0 n^0 *X^0"), ty("n^0")).is_err());
        assert!(MetaRule::new(3, ty("*X^0 n^0"), ty("*Y^0")).is_err());
        assert!(MetaRule::new(4, PregroupType::unit(), ty("n^0")).is_err());
    }

    #[test]
    fn test_expand_chains_rules_across_rounds() {
        let rules = vec![rule("*X^0 v^1", "*X^0 w^1"), rule("*X^0 w^1", "*X^0 z^1")];
        let mut types = vec![ty("a^0 v^1")];
        let report = expand_types(&mut types, &rules, MetaruleIteration::Rounds(3));
        assert_eq!(types, vec![ty("a^0 v^1"), ty("a^0 w^1"), ty("a^0 z^1")]);
        assert_eq!(report.added, 2);
        assert_eq!(report.rounds_run, 3);
        assert!(report.converged);
    }

    #[test]
    fn test_expand_skips_existing_types() {
        let rules = vec![rule("*X^0 v^1", "*X^0 v^1")];
        let mut types = vec![ty("a^0 v^1")];
        let report = expand_types(&mut types, &rules, MetaruleIteration::Rounds(3));
        assert_eq!(types.len(), 1);
        assert_eq!(report.added, 0);
    }

    #[test]
    fn test_fixed_point_stops_early() {
        let rules = vec![rule("*X^0 v^1", "*X^0 w^1")];
        let mut types = vec![ty("a^0 v^1")];
        let report = expand_types(
            &mut types,
            &rules,
            MetaruleIteration::FixedPoint { max_rounds: 10 },
        );
        assert_eq!(report.rounds_run, 2);
        assert!(report.converged);
    }

    #[test]
    fn test_fourth_round_adds_nothing() {
        let rules = vec![
            rule("*X^0 v^1", "*X^0 w^1"),
            rule("*X^0 w^1", "*X^0 z^1"),
            rule("a^0 *X^0", "b^0 *X^0"),
        ];
        let mut types = vec![ty("a^0 v^1")];
        expand_types(&mut types, &rules, MetaruleIteration::Rounds(3));
        let stable = types.clone();
        let report = expand_types(&mut types, &rules, MetaruleIteration::Rounds(1));
        assert_eq!(report.added, 0);
        assert_eq!(types, stable);
    }

    #[test]
    fn test_deserialize_validates() {
        let valid = rule("*X^0 v^1", "*X^2");
        let json = serde_json::to_string(&valid).unwrap();
        assert_eq!(serde_json::from_str::<MetaRule>(&json).unwrap(), valid);

        let invalid = serde_json::json!({
            "tag": 7,
            "pattern": ty("*X^0 *Y^0"),
            "target": ty("n^0"),
        });
        let err = serde_json::from_value::<MetaRule>(invalid).unwrap_err();
        assert!(err.to_string().contains("Invalid metarule 7"));
    }

    #[test]
    fn test_display() {
        assert_eq!(rule("*X^0 v^1", "*X^2").to_string(), "0: *X^0 v^1 --> *X^2");
    }
}
