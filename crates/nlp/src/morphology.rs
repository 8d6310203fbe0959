//! Morphological fallback for dictionary lookup.
//!
//! When a surface form is not in the dictionary, the resolver tries a fixed
//! sequence of rewrites, each starting again from the surface form:
//!
//! 1. strip the first matching verbal suffix;
//! 2. strip every matching nominal suffix, in table order;
//! 3. strip every matching adjectival suffix, in table order;
//! 4. replace the word by an irregular form it contains.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Which rewrite produced a lookup form.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MorphStep {
    Surface,
    Verbal,
    Nominal,
    Adjectival,
    Irregular,
}

impl fmt::Display for MorphStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            MorphStep::Surface => "surface",
            MorphStep::Verbal => "verbal",
            MorphStep::Nominal => "nominal",
            MorphStep::Adjectival => "adjectival",
            MorphStep::Irregular => "irregular",
        };
        write!(f, "{}", name)
    }
}

/// Suffix and irregular-form tables.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Morphology {
    pub verbal_suffixes: Vec<String>,
    pub noun_suffixes: Vec<String>,
    pub adjective_suffixes: Vec<String>,
    /// `(form, replacement)` pairs.
    pub irregulars: Vec<(String, String)>,
}

impl Morphology {
    pub fn is_empty(&self) -> bool {
        self.verbal_suffixes.is_empty()
            && self.noun_suffixes.is_empty()
            && self.adjective_suffixes.is_empty()
            && self.irregulars.is_empty()
    }

    /// Strip the first verbal suffix the word ends with.
    pub fn strip_verbal(&self, word: &str) -> Option<String> {
        self.verbal_suffixes
            .iter()
            .find(|s| !s.is_empty() && word.ends_with(s.as_str()))
            .map(|s| word[..word.len() - s.len()].to_string())
    }

    pub fn strip_nominal(&self, word: &str) -> Option<String> {
        strip_all(&self.noun_suffixes, word)
    }

    pub fn strip_adjectival(&self, word: &str) -> Option<String> {
        strip_all(&self.adjective_suffixes, word)
    }

    /// Replace the whole word whenever it contains an irregular form; later
    /// table rows see the result of earlier replacements.
    pub fn replace_irregular(&self, word: &str) -> Option<String> {
        let mut form = word.to_string();
        let mut changed = false;
        for (irregular, replacement) in &self.irregulars {
            if !irregular.is_empty() && form.contains(irregular.as_str()) {
                form = replacement.clone();
                changed = true;
            }
        }
        changed.then_some(form)
    }

    /// Lookup forms in the order they should be tried, surface form first.
    /// Rewrites that change nothing or leave an empty word are omitted.
    pub fn lookup_forms(&self, word: &str) -> Vec<(MorphStep, String)> {
        let mut forms = vec![(MorphStep::Surface, word.to_string())];
        let rewrites = [
            (MorphStep::Verbal, self.strip_verbal(word)),
            (MorphStep::Nominal, self.strip_nominal(word)),
            (MorphStep::Adjectival, self.strip_adjectival(word)),
            (MorphStep::Irregular, self.replace_irregular(word)),
        ];
        for (step, form) in rewrites {
            if let Some(form) = form.filter(|f| !f.is_empty()) {
                forms.push((step, form));
            }
        }
        forms
    }
}

fn strip_all(suffixes: &[String], word: &str) -> Option<String> {
    let mut form = word.to_string();
    let mut changed = false;
    for suffix in suffixes {
        if !suffix.is_empty() && form.ends_with(suffix.as_str()) {
            form.truncate(form.len() - suffix.len());
            changed = true;
        }
    }
    changed.then_some(form)
}
