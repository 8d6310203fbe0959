//! Grammars and their dictionaries.
//!
//! A [`Grammar`] bundles everything a parse reads but never writes: the atom
//! inventory with its standalone types, the compiled reduction table, marker
//! categories, metarules, the dictionary and the morphology tables. It is
//! built once through a [`GrammarBuilder`] (or read from the text format, see
//! [`crate::loader`]) and is immutable afterwards, so one grammar can serve
//! any number of parsers, including parsers on other threads.
//!
//! # Example
//!
//! ```rust
//! use lambek_nlp::grammar::Grammar;
//!
//! let grammar = Grammar::builder()
//!     .standalone_type("s")
//!     .atom_type("n")
//!     .entry("Alice", vec!["n^0".parse().unwrap()])
//!     .entry("runs", vec!["n^1 s^0".parse().unwrap()])
//!     .build()
//!     .unwrap();
//!
//! let outcome = grammar.parse(&["Alice", "runs"]).unwrap();
//! assert!(outcome.is_grammatical());
//! ```

use lambek_core::{expand_types, Atom, Marker, MetaRule, PregroupType, ReductionTable};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

use crate::config::{GrammarConfig, ParserConfig};
use crate::morphology::Morphology;
use crate::pregroup::{ParseOutcome, Parser};
use crate::NlpError;

/// A named marker category and its values. Marker values in atom notation
/// are 1-based positions into `values`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MarkerCategory {
    pub name: String,
    pub values: Vec<String>,
}

/// A dictionary entry: a word and its candidate types, in preference order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Entry {
    word: String,
    types: Vec<PregroupType>,
}

impl Entry {
    pub fn word(&self) -> &str {
        &self.word
    }

    pub fn types(&self) -> &[PregroupType] {
        &self.types
    }
}

impl fmt::Display for Entry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let types: Vec<String> = self.types.iter().map(|t| t.to_string()).collect();
        write!(f, "{}: {}", self.word, types.join(", "))
    }
}

/// An immutable pregroup grammar.
#[derive(Debug, Clone)]
pub struct Grammar {
    table: ReductionTable,
    standalones: Vec<String>,
    markers: Vec<MarkerCategory>,
    metarules: Vec<MetaRule>,
    entries: Vec<Entry>,
    /// Lowercased word -> position in `entries`.
    lookup: HashMap<String, usize>,
    morphology: Morphology,
    config: GrammarConfig,
}

impl Grammar {
    pub fn builder() -> GrammarBuilder {
        GrammarBuilder::new()
    }

    /// A small English grammar covering proper and common nouns,
    /// determiners, adjectives and intransitive, transitive and
    /// sentence-complement verbs.
    pub fn english_basic() -> Result<Self, NlpError> {
        Self::from_text(
            include_str!("../data/english.grammar"),
            GrammarConfig::default(),
        )
    }

    pub fn table(&self) -> &ReductionTable {
        &self.table
    }

    pub fn standalones(&self) -> &[String] {
        &self.standalones
    }

    pub fn markers(&self) -> &[MarkerCategory] {
        &self.markers
    }

    pub fn metarules(&self) -> &[MetaRule] {
        &self.metarules
    }

    /// Dictionary entries, sorted case-insensitively by word.
    pub fn entries(&self) -> &[Entry] {
        &self.entries
    }

    pub fn morphology(&self) -> &Morphology {
        &self.morphology
    }

    pub fn config(&self) -> &GrammarConfig {
        &self.config
    }

    /// Exact (case-insensitive) dictionary lookup.
    pub fn entry(&self, word: &str) -> Option<&Entry> {
        self.lookup
            .get(&word.to_lowercase())
            .map(|&idx| &self.entries[idx])
    }

    /// Look a surface word up, falling back on the morphology tables.
    pub fn resolve(&self, word: &str) -> Result<&Entry, NlpError> {
        for (step, form) in self.morphology.lookup_forms(word) {
            if let Some(entry) = self.entry(&form) {
                tracing::debug!(word, %step, entry = entry.word(), "resolved word");
                return Ok(entry);
            }
        }
        Err(NlpError::UnknownWord {
            word: word.to_string(),
        })
    }

    /// The dummy sentinel atom with the given adjoint.
    pub fn dummy_atom(&self, adjoint: i32) -> Atom {
        Atom::new(self.table.dummy(), adjoint)
    }

    /// Whether an atom may end a successful parse: its type is a standalone
    /// type or reduces to one.
    pub fn is_standalone(&self, atom: &Atom) -> Result<bool, NlpError> {
        for standalone in &self.standalones {
            if atom.name() == standalone || self.table.names_reduce(atom.name(), standalone)? {
                return Ok(true);
            }
        }
        Ok(false)
    }

    /// Human-readable `category=value` form of a marker, if it is declared.
    pub fn describe_marker(&self, marker: &Marker) -> Option<String> {
        let category = self.markers.get(usize::from(marker.category))?;
        let value = (marker.value as usize)
            .checked_sub(1)
            .and_then(|idx| category.values.get(idx))?;
        Some(format!("{}={}", category.name, value))
    }

    /// A parser over this grammar with default settings.
    pub fn parser(&self) -> Parser<'_> {
        Parser::new(self)
    }

    pub fn parser_with(&self, config: ParserConfig) -> Parser<'_> {
        Parser::with_config(self, config)
    }

    /// Parse a sentence with default parser settings.
    pub fn parse<S: AsRef<str>>(&self, words: &[S]) -> Result<ParseOutcome, NlpError> {
        self.parser().parse(words)
    }
}

impl fmt::Display for Grammar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Atom types: {}", self.table.inventory().join(", "))?;
        writeln!(f, "Standalone types: {}", self.standalones.join(", "))?;
        if !self.markers.is_empty() {
            writeln!(f, "Markers:")?;
            for category in &self.markers {
                writeln!(f, "  {}: {}", category.name, category.values.join(", "))?;
            }
        }
        writeln!(f, "Dictionary ({} entries):", self.entries.len())?;
        for entry in &self.entries {
            writeln!(f, "  {}", entry)?;
        }
        let m = &self.morphology;
        writeln!(f, "Verbal suffixes: {}", m.verbal_suffixes.join(", "))?;
        writeln!(f, "Noun suffixes: {}", m.noun_suffixes.join(", "))?;
        writeln!(f, "Adjective suffixes: {}", m.adjective_suffixes.join(", "))?;
        for (form, replacement) in &m.irregulars {
            writeln!(f, "Irregular: {} --> {}", form, replacement)?;
        }
        if !self.metarules.is_empty() {
            writeln!(f, "Metarules:")?;
            for rule in &self.metarules {
                writeln!(f, "  {}", rule)?;
            }
        }
        writeln!(f, "Reduction rules:")?;
        for (from, to) in self.table.rules() {
            writeln!(f, "  {} < {}", from, to)?;
        }
        write!(f, "{}", self.table.render())
    }
}

/// Collects the parts of a grammar and validates them in [`GrammarBuilder::build`].
#[derive(Debug, Clone, Default)]
pub struct GrammarBuilder {
    config: GrammarConfig,
    inventory: Vec<String>,
    standalones: Vec<String>,
    markers: Vec<MarkerCategory>,
    reductions: Vec<(String, String)>,
    metarules: Vec<MetaRule>,
    entries: Vec<Entry>,
    morphology: Morphology,
}

impl GrammarBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn config(mut self, config: GrammarConfig) -> Self {
        self.config = config;
        self
    }

    /// Declare an atom type. Inventory order is declaration order.
    pub fn atom_type(mut self, name: impl Into<String>) -> Self {
        self.inventory.push(name.into());
        self
    }

    /// Declare an atom type and mark it standalone.
    pub fn standalone_type(self, name: impl Into<String>) -> Self {
        let name = name.into();
        self.atom_type(name.clone()).standalone(name)
    }

    /// Mark an atom type standalone; it must be declared by build time.
    pub fn standalone(mut self, name: impl Into<String>) -> Self {
        self.standalones.push(name.into());
        self
    }

    pub fn marker_category<I, S>(mut self, name: impl Into<String>, values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.markers.push(MarkerCategory {
            name: name.into(),
            values: values.into_iter().map(Into::into).collect(),
        });
        self
    }

    /// Allow atoms of type `from` to reduce to type `to`.
    pub fn reduction(mut self, from: impl Into<String>, to: impl Into<String>) -> Self {
        self.reductions.push((from.into(), to.into()));
        self
    }

    pub fn metarule(mut self, rule: MetaRule) -> Self {
        self.metarules.push(rule);
        self
    }

    /// Add a dictionary entry. The first definition of a word wins; later
    /// ones are ignored.
    pub fn entry(mut self, word: impl Into<String>, types: Vec<PregroupType>) -> Self {
        let word = word.into();
        if self.entries.iter().any(|e| e.word == word) {
            tracing::debug!(word = %word, "ignoring repeated dictionary entry");
        } else {
            self.entries.push(Entry { word, types });
        }
        self
    }

    pub fn morphology(mut self, morphology: Morphology) -> Self {
        self.morphology = morphology;
        self
    }

    pub(crate) fn morphology_mut(&mut self) -> &mut Morphology {
        &mut self.morphology
    }

    /// Compile the reduction table, check that every type name is declared,
    /// expand dictionary entries with the metarules and index the dictionary.
    pub fn build(self) -> Result<Grammar, NlpError> {
        let table = ReductionTable::new(
            self.inventory,
            self.config.dummy_type.clone(),
            &self.reductions,
        )?;

        for name in &self.standalones {
            if !table.inventory().contains(name) {
                return Err(NlpError::UnknownStandalone { name: name.clone() });
            }
        }

        for rule in &self.metarules {
            for atom in rule.pattern().iter().chain(rule.target().iter()) {
                if !atom.is_generic() {
                    table.index_of(atom.name())?;
                }
            }
        }

        let mut entries = self.entries;
        let mut derived = 0;
        let mut ambiguous = 0;
        for entry in &mut entries {
            for atom in entry.types.iter().flat_map(|t| t.iter()) {
                table.index_of(atom.name())?;
            }
            let report = expand_types(&mut entry.types, &self.metarules, self.config.metarule_iteration);
            if report.added > 0 {
                tracing::debug!(word = %entry.word, added = report.added, rounds = report.rounds_run, "expanded entry");
            }
            derived += report.added;
            ambiguous += report.ambiguous;
        }

        entries.sort_by_cached_key(|e| e.word.to_lowercase());
        let mut lookup = HashMap::with_capacity(entries.len());
        for (idx, entry) in entries.iter().enumerate() {
            lookup.entry(entry.word.to_lowercase()).or_insert(idx);
        }

        tracing::info!(
            atom_types = table.len(),
            entries = entries.len(),
            metarules = self.metarules.len(),
            derived,
            ambiguous,
            "grammar built"
        );

        Ok(Grammar {
            table,
            standalones: self.standalones,
            markers: self.markers,
            metarules: self.metarules,
            entries,
            lookup,
            morphology: self.morphology,
            config: self.config,
        })
    }
}
