//! Pregroup Reduction Engine
//!
//! Decides grammaticality of a sentence by trying its candidate type paths
//! with an online, stack-based reduction.
//!
//! # Key Concepts
//!
//! - **Path**: one candidate type per word, tried in enumeration order
//! - **Reduction**: an atom cancels against the top of the pending stack when
//!   their types are related, the right adjoint is one higher than the left
//!   and their markers agree
//! - **Grammaticality**: exactly one atom is left unlinked and it is (or
//!   reduces to) a standalone type
//! - **Repair**: when no path succeeds, a path in which one atom type occurs
//!   too often is retried with pairs of its occurrences replaced by the dummy
//!   type, which only cancels against itself
//!
//! # Example
//!
//! ```rust
//! use lambek_nlp::grammar::Grammar;
//!
//! let grammar = Grammar::english_basic().unwrap();
//!
//! let outcome = grammar.parse(&["Alice", "loves", "Bob"]).unwrap();
//! assert!(outcome.is_grammatical());
//! assert_eq!(outcome.nesting_depth(), Some(1));
//!
//! println!("{}", outcome.trace());
//! ```

use lambek_core::{enumerate_paths, Atom, PregroupType};
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::config::{ParserConfig, RepairStrategy};
use crate::grammar::Grammar;
use crate::nesting::nesting_depth;
use crate::NlpError;

/// Two atom positions that cancelled, `left < right`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Link {
    pub left: usize,
    pub right: usize,
}

impl Link {
    pub fn new(left: usize, right: usize) -> Self {
        Self { left, right }
    }
}

impl fmt::Display for Link {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({},{})", self.left, self.right)
    }
}

/// Atom positions still waiting for a cancellation partner.
#[derive(Debug, Clone, Default)]
pub struct PendingStack {
    positions: Vec<usize>,
}

impl PendingStack {
    pub fn top(&self) -> Option<usize> {
        self.positions.last().copied()
    }

    pub fn push(&mut self, position: usize) {
        self.positions.push(position);
    }

    pub fn pop(&mut self) -> Option<usize> {
        self.positions.pop()
    }

    pub fn len(&self) -> usize {
        self.positions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }
}

/// One step of the reduction state machine: how many words have been
/// downloaded, the first atom position not yet processed, and the types
/// downloaded so far.
#[derive(Debug, Clone, Copy)]
pub struct Stage<'p> {
    pub word_index: usize,
    pub position: usize,
    pub types_so_far: &'p [&'p PregroupType],
}

impl<'p> Stage<'p> {
    fn initial() -> Self {
        Self {
            word_index: 0,
            position: 0,
            types_so_far: &[],
        }
    }
}

/// Mutable state of one parse attempt.
struct ParseContext<'p> {
    atoms: Vec<&'p Atom>,
    stack: PendingStack,
    links: Vec<Link>,
    used: Vec<bool>,
}

impl<'p> ParseContext<'p> {
    fn new(path: &[&'p PregroupType]) -> Self {
        let atoms: Vec<&Atom> = path.iter().flat_map(|t| t.iter()).collect();
        let used = vec![false; atoms.len()];
        Self {
            atoms,
            stack: PendingStack::default(),
            links: Vec::new(),
            used,
        }
    }
}

/// Result of running the state machine over one path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Derivation {
    pub links: Vec<Link>,
    /// Positions never linked, in order.
    pub unlinked: Vec<usize>,
    pub atom_count: usize,
    pub grammatical: bool,
    /// The single unlinked atom, when there is exactly one.
    pub residual: Option<Atom>,
}

impl Derivation {
    /// Turn a grammatical derivation of `path` into an acceptance.
    pub fn into_acceptance(
        self,
        path_index: usize,
        path: Vec<PregroupType>,
        repair: Option<Repair>,
    ) -> Option<Acceptance> {
        if !self.grammatical {
            return None;
        }
        let residual = self.residual?;
        Some(Acceptance {
            path_index,
            path,
            nesting_depth: nesting_depth(&self.links, self.atom_count),
            links: self.links,
            residual,
            repair,
        })
    }
}

/// Which pair of occurrences the repair pass replaced by the dummy type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Repair {
    pub atom_type: String,
    pub positions: (usize, usize),
}

/// An accepted path and its derivation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Acceptance {
    /// Index of the path in enumeration order.
    pub path_index: usize,
    /// Types of the accepted path, after any dummy substitution.
    pub path: Vec<PregroupType>,
    pub links: Vec<Link>,
    pub residual: Atom,
    pub nesting_depth: usize,
    pub repair: Option<Repair>,
}

/// Result of parsing one sentence.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParseOutcome {
    pub sentence: Vec<String>,
    /// Number of candidate paths enumerated.
    pub path_count: usize,
    pub acceptance: Option<Acceptance>,
}

impl ParseOutcome {
    pub fn is_grammatical(&self) -> bool {
        self.acceptance.is_some()
    }

    /// Accepted only after dummy substitution.
    pub fn was_repaired(&self) -> bool {
        self.acceptance
            .as_ref()
            .is_some_and(|a| a.repair.is_some())
    }

    pub fn nesting_depth(&self) -> Option<usize> {
        self.acceptance.as_ref().map(|a| a.nesting_depth)
    }

    /// Links of the accepted derivation; empty when unparsable.
    pub fn links(&self) -> &[Link] {
        match &self.acceptance {
            Some(acceptance) => &acceptance.links,
            None => &[],
        }
    }

    /// Display a detailed trace of the parse.
    pub fn trace(&self) -> String {
        let mut result = String::new();

        result.push_str("=== Parse Trace ===\n\n");
        result.push_str(&format!("Sentence: {}\n", self.sentence.join(" ")));
        result.push_str(&format!("Paths: {}\n\n", self.path_count));

        match &self.acceptance {
            Some(acceptance) => {
                result.push_str(&format!("Accepted path {}:\n", acceptance.path_index));
                for (word, ty) in self.sentence.iter().zip(&acceptance.path) {
                    result.push_str(&format!("  {} : {}\n", word, ty));
                }
                let links: Vec<String> = acceptance.links.iter().map(|l| l.to_string()).collect();
                result.push_str(&format!("\nLinks: {}\n", links.join(" ")));
                result.push_str(&format!("Residual: {}\n", acceptance.residual));
                result.push_str(&format!("Nesting depth: {}\n", acceptance.nesting_depth));
                match &acceptance.repair {
                    None => result.push_str("Result: GRAMMATICAL (first try)\n"),
                    Some(repair) => result.push_str(&format!(
                        "Result: GRAMMATICAL (second try, {} at {} and {} replaced)\n",
                        repair.atom_type, repair.positions.0, repair.positions.1
                    )),
                }
            }
            None => result.push_str("Result: NO SOLUTION\n"),
        }

        result
    }
}

/// Runs the reduction state machine over sentences of one grammar.
#[derive(Debug, Clone, Copy)]
pub struct Parser<'g> {
    grammar: &'g Grammar,
    config: ParserConfig,
}

impl<'g> Parser<'g> {
    pub fn new(grammar: &'g Grammar) -> Self {
        Self::with_config(grammar, ParserConfig::default())
    }

    pub fn with_config(grammar: &'g Grammar, config: ParserConfig) -> Self {
        Self { grammar, config }
    }

    pub fn grammar(&self) -> &'g Grammar {
        self.grammar
    }

    pub fn config(&self) -> &ParserConfig {
        &self.config
    }

    /// Whether `left` cancels against `right` standing to its right.
    ///
    /// Either type must reduce to the other, the adjoint must rise by
    /// exactly one and the markers must agree. A dummy atom only cancels
    /// against another dummy atom.
    pub fn reduces(&self, left: &Atom, right: &Atom) -> Result<bool, NlpError> {
        let table = self.grammar.table();
        let related = table.reduction_exists(left, right)? || table.reduction_exists(right, left)?;
        if table.is_dummy(left) != table.is_dummy(right) {
            return Ok(false);
        }
        Ok(related && left.adjoint().checked_add(1) == Some(right.adjoint()) && left.markers_agree(right))
    }

    /// Append the next word's type.
    fn download<'p>(&self, stage: Stage<'p>, path: &'p [&'p PregroupType]) -> Stage<'p> {
        Stage {
            word_index: stage.word_index + 1,
            position: stage.position,
            types_so_far: &path[..stage.word_index + 1],
        }
    }

    /// Cancel or push each atom the latest type introduced, left to right.
    fn update<'p>(&self, ctx: &mut ParseContext<'_>, stage: Stage<'p>) -> Result<Stage<'p>, NlpError> {
        let latest = stage.types_so_far.last().map_or(0, |t| t.len());
        let end = stage.position + latest;
        for current in stage.position..end {
            match ctx.stack.top() {
                Some(top) if self.reduces(ctx.atoms[top], ctx.atoms[current])? => {
                    ctx.stack.pop();
                    ctx.links.push(Link::new(top, current));
                    ctx.used[top] = true;
                    ctx.used[current] = true;
                }
                _ => ctx.stack.push(current),
            }
        }
        Ok(Stage {
            position: end,
            ..stage
        })
    }

    /// Run the state machine over one path and apply the terminal check.
    pub fn derive(&self, path: &[&PregroupType]) -> Result<Derivation, NlpError> {
        let mut ctx = ParseContext::new(path);
        let mut stage = Stage::initial();
        while stage.word_index < path.len() {
            stage = self.download(stage, path);
            stage = self.update(&mut ctx, stage)?;
        }

        let unlinked: Vec<usize> = (0..ctx.atoms.len()).filter(|&i| !ctx.used[i]).collect();
        let residual = match unlinked.as_slice() {
            [only] => Some(ctx.atoms[*only].clone()),
            _ => None,
        };
        let grammatical = match &residual {
            Some(atom) => self.grammar.is_standalone(atom)?,
            None => false,
        };

        Ok(Derivation {
            atom_count: ctx.atoms.len(),
            links: ctx.links,
            unlinked,
            grammatical,
            residual,
        })
    }

    /// Atom types, in inventory order, that at least `repair_threshold`
    /// atoms of the path reduce to.
    pub fn offending_types(&self, path: &[&PregroupType]) -> Result<Vec<&'g str>, NlpError> {
        let table = self.grammar.table();
        let mut offending = Vec::new();
        for name in table.inventory() {
            let mut count = 0;
            for atom in path.iter().flat_map(|t| t.iter()) {
                if table.names_reduce(atom.name(), name)? {
                    count += 1;
                }
            }
            if count >= self.config.repair_threshold {
                offending.push(name.as_str());
            }
        }
        Ok(offending)
    }

    /// Copy of `path` with the atoms at two global positions replaced by
    /// dummy atoms of the same adjoint.
    pub fn substitute(&self, path: &[&PregroupType], positions: (usize, usize)) -> Vec<PregroupType> {
        let mut index = 0;
        path.iter()
            .map(|ty| {
                let atoms = ty
                    .iter()
                    .map(|atom| {
                        let replaced = index == positions.0 || index == positions.1;
                        index += 1;
                        if replaced {
                            self.grammar.dummy_atom(atom.adjoint())
                        } else {
                            atom.clone()
                        }
                    })
                    .collect();
                PregroupType::new(atoms)
            })
            .collect()
    }

    /// Retry `path` with every pair of occurrences of `atom_type` replaced by
    /// the dummy type, returning the first grammatical variant.
    pub fn repair(
        &self,
        path: &[&PregroupType],
        atom_type: &str,
    ) -> Result<Option<(Vec<PregroupType>, Derivation, Repair)>, NlpError> {
        let table = self.grammar.table();
        let mut positions = Vec::new();
        for (i, atom) in path.iter().flat_map(|t| t.iter()).enumerate() {
            if atom.name() == atom_type || table.names_reduce(atom.name(), atom_type)? {
                positions.push(i);
            }
        }

        for (k, &first) in positions.iter().enumerate() {
            for &second in &positions[k + 1..] {
                let variant = self.substitute(path, (first, second));
                let refs: Vec<&PregroupType> = variant.iter().collect();
                let derivation = self.derive(&refs)?;
                tracing::debug!(atom_type, first, second, grammatical = derivation.grammatical, "repair attempt");
                if derivation.grammatical {
                    let repair = Repair {
                        atom_type: atom_type.to_string(),
                        positions: (first, second),
                    };
                    return Ok(Some((variant, derivation, repair)));
                }
            }
        }
        Ok(None)
    }

    /// Run the repair pass on one path for every offending atom type.
    fn try_repair(&self, path_index: usize, path: &[&PregroupType]) -> Result<Option<Acceptance>, NlpError> {
        for atom_type in self.offending_types(path)? {
            if let Some((variant, derivation, repair)) = self.repair(path, atom_type)? {
                return Ok(derivation.into_acceptance(path_index, variant, Some(repair)));
            }
        }
        Ok(None)
    }

    /// Parse a sentence whose words have already been resolved to candidate
    /// type lists.
    pub fn parse_candidates<S: AsRef<str>>(
        &self,
        sentence: &[S],
        candidates: &[&[PregroupType]],
    ) -> Result<ParseOutcome, NlpError> {
        if candidates.is_empty() {
            return Err(NlpError::EmptySentence);
        }
        let sentence: Vec<String> = sentence.iter().map(|w| w.as_ref().to_string()).collect();
        let text = sentence.join(" ");
        let paths = enumerate_paths(candidates);
        let outcome = |acceptance| ParseOutcome {
            sentence: sentence.clone(),
            path_count: paths.len(),
            acceptance,
        };

        for (index, path) in paths.iter().enumerate() {
            let derivation = self.derive(path)?;
            tracing::debug!(sentence = %text, path = index, links = derivation.links.len(), unlinked = derivation.unlinked.len(), "tried path");
            if derivation.grammatical {
                tracing::info!(sentence = %text, path = index, "first try");
                let types = path.iter().map(|&t| t.clone()).collect();
                return Ok(outcome(derivation.into_acceptance(index, types, None)));
            }
            if self.config.repair_strategy == RepairStrategy::PerPath {
                if let Some(acceptance) = self.try_repair(index, path)? {
                    tracing::info!(sentence = %text, path = index, "second try");
                    return Ok(outcome(Some(acceptance)));
                }
            }
        }

        if self.config.repair_strategy == RepairStrategy::AfterAllPaths {
            for (index, path) in paths.iter().enumerate() {
                if let Some(acceptance) = self.try_repair(index, path)? {
                    tracing::info!(sentence = %text, path = index, "second try");
                    return Ok(outcome(Some(acceptance)));
                }
            }
        }

        tracing::info!(sentence = %text, paths = paths.len(), "no solution");
        Ok(outcome(None))
    }

    /// Resolve each word through the dictionary and parse the sentence.
    pub fn parse<S: AsRef<str>>(&self, words: &[S]) -> Result<ParseOutcome, NlpError> {
        if words.is_empty() {
            return Err(NlpError::EmptySentence);
        }
        let entries = words
            .iter()
            .map(|w| self.grammar.resolve(w.as_ref()))
            .collect::<Result<Vec<_>, _>>()?;
        let candidates: Vec<&[PregroupType]> = entries.iter().map(|e| e.types()).collect();
        self.parse_candidates(words, &candidates)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ty(s: &str) -> PregroupType {
        s.parse().unwrap()
    }

    fn english() -> Grammar {
        Grammar::english_basic().unwrap()
    }

    #[test]
    fn test_link_display() {
        assert_eq!(Link::new(3, 4).to_string(), "(3,4)");
    }

    #[test]
    fn test_pending_stack() {
        let mut stack = PendingStack::default();
        assert_eq!(stack.top(), None);
        stack.push(2);
        stack.push(5);
        assert_eq!(stack.top(), Some(5));
        assert_eq!(stack.pop(), Some(5));
        assert_eq!(stack.len(), 1);
        assert!(!stack.is_empty());
    }

    #[test]
    fn test_reduces_requires_adjoint_rise() {
        let grammar = english();
        let parser = grammar.parser();
        let n0 = Atom::new("n", 0);

        assert!(parser.reduces(&n0, &Atom::new("n", 1)).unwrap());
        assert!(parser.reduces(&Atom::new("n", -1), &n0).unwrap());
        assert!(!parser.reduces(&Atom::new("n", 1), &n0).unwrap());
        assert!(!parser.reduces(&n0, &Atom::new("s", 1)).unwrap());
        // pn < n is declared, so the relation works in both directions
        assert!(parser.reduces(&Atom::new("pn", 0), &Atom::new("n", 1)).unwrap());
        assert!(parser.reduces(&Atom::new("n", -1), &Atom::new("pn", 0)).unwrap());
    }

    #[test]
    fn test_reduces_checks_markers() {
        let grammar = english();
        let parser = grammar.parser();
        let singular: Atom = "n_1^0".parse().unwrap();

        assert!(!parser.reduces(&singular, &"n_2^1".parse().unwrap()).unwrap());
        assert!(parser.reduces(&singular, &"n_1^1".parse().unwrap()).unwrap());
        assert!(parser.reduces(&singular, &Atom::new("n", 1)).unwrap());
    }

    #[test]
    fn test_dummy_only_cancels_dummy() {
        let grammar = english();
        let parser = grammar.parser();
        let x0 = grammar.dummy_atom(0);

        assert!(parser.reduces(&x0, &grammar.dummy_atom(1)).unwrap());
        assert!(!parser.reduces(&x0, &Atom::new("n", 1)).unwrap());
        assert!(!parser.reduces(&Atom::new("n", 0), &grammar.dummy_atom(1)).unwrap());
    }

    #[test]
    fn test_extreme_adjoints_do_not_overflow() {
        let grammar = Grammar::builder()
            .standalone_type("n")
            .entry("a", vec![ty("n^2147483647")])
            .entry("b", vec![ty("n^-2147483648")])
            .build()
            .unwrap();
        let parser = grammar.parser();

        assert!(!parser.reduces(&Atom::new("n", i32::MAX), &Atom::new("n", i32::MIN)).unwrap());
        assert!(!parser.reduces(&Atom::new("n", i32::MIN), &Atom::new("n", i32::MAX)).unwrap());
        assert!(parser.reduces(&Atom::new("n", i32::MAX - 1), &Atom::new("n", i32::MAX)).unwrap());

        let outcome = grammar.parse(&["a", "b"]).unwrap();
        assert!(!outcome.is_grammatical());
    }

    #[test]
    fn test_unknown_atom_type_is_fatal() {
        let grammar = english();
        let err = grammar
            .parser()
            .reduces(&Atom::new("adv", 0), &Atom::new("n", 1))
            .unwrap_err();
        assert!(err.is_fatal());
    }

    #[test]
    fn test_derive_transitive() {
        let grammar = english();
        let types = [ty("pn^0"), ty("n^1 s^0 n^-1"), ty("pn^0")];
        let path: Vec<&PregroupType> = types.iter().collect();

        let derivation = grammar.parser().derive(&path).unwrap();
        assert!(derivation.grammatical);
        assert_eq!(derivation.links, vec![Link::new(0, 1), Link::new(3, 4)]);
        assert_eq!(derivation.unlinked, vec![2]);
        assert_eq!(derivation.residual, Some(Atom::new("s", 0)));
    }

    #[test]
    fn test_substitute_keeps_adjoints() {
        let grammar = english();
        let types = [ty("n^0 n^-1"), ty("n_1^0")];
        let path: Vec<&PregroupType> = types.iter().collect();

        let variant = grammar.parser().substitute(&path, (1, 2));
        assert_eq!(variant, vec![ty("n^0 x^-1"), ty("x^0")]);
    }

    #[test]
    fn test_intransitive_sentence() {
        let grammar = english();

        // "Alice runs" should be grammatical
        let result = grammar.parse(&["Alice", "runs"]).unwrap();
        assert!(result.is_grammatical());
        assert_eq!(result.links(), &[Link::new(0, 1)]);
    }

    #[test]
    fn test_transitive_sentence() {
        let grammar = english();

        // "Alice loves Bob" should be grammatical
        let result = grammar.parse(&["Alice", "loves", "Bob"]).unwrap();
        assert!(result.is_grammatical());
        assert_eq!(result.nesting_depth(), Some(1));
    }

    #[test]
    fn test_derived_intransitive_reading() {
        let grammar = english();

        // "eats" only reduces through the metarule-derived n^1 s^0
        let result = grammar.parse(&["Bob", "eats"]).unwrap();
        let acceptance = result.acceptance.unwrap();
        assert_eq!(acceptance.path_index, 1);
        assert_eq!(acceptance.path[1], ty("n^1 s^0"));
        assert_eq!(result.path_count, 2);
    }

    #[test]
    fn test_complex_sentence() {
        let grammar = english();

        // "the big dog runs" should be grammatical
        let result = grammar.parse(&["the", "big", "dog", "runs"]).unwrap();
        assert!(result.is_grammatical());
        assert_eq!(result.nesting_depth(), Some(2));
    }

    #[test]
    fn test_sentence_complement() {
        let grammar = english();

        // "Alice thinks Bob runs" should be grammatical
        let result = grammar.parse(&["Alice", "thinks", "Bob", "runs"]).unwrap();
        assert!(result.is_grammatical());
        assert_eq!(
            result.links(),
            &[Link::new(0, 1), Link::new(4, 5), Link::new(3, 6)]
        );
        assert_eq!(result.nesting_depth(), Some(2));
    }

    #[test]
    fn test_ungrammatical_order() {
        let grammar = english();

        // "sees Alice Bob" should not parse, even after repair
        let result = grammar.parse(&["sees", "Alice", "Bob"]).unwrap();
        assert!(!result.is_grammatical());
        assert!(result.links().is_empty());
        assert!(result.trace().contains("NO SOLUTION"));
    }

    #[test]
    fn test_unknown_word() {
        let grammar = english();

        let result = grammar.parse(&["Alice", "fnords", "Bob"]);
        assert!(matches!(result, Err(NlpError::UnknownWord { .. })));
    }

    #[test]
    fn test_empty_sentence() {
        let grammar = english();
        let words: [&str; 0] = [];
        assert!(matches!(grammar.parse(&words), Err(NlpError::EmptySentence)));
    }

    #[test]
    fn test_trace() {
        let grammar = english();
        let result = grammar.parse(&["Alice", "runs"]).unwrap();
        let trace = result.trace();

        assert!(trace.contains("Sentence: Alice runs"));
        assert!(trace.contains("Alice : pn^0"));
        assert!(trace.contains("Links: (0,1)"));
        assert!(trace.contains("first try"));
    }
}
