//! Grammar text format.
//!
//! A grammar file has six sections separated by a line of ten asterisks:
//!
//! ```text
//! 3                     atom types: count, then one name per line
//! #s                    ('#' marks a standalone type)
//! n
//! pn
//! **********
//! 1                     markers: count, category names, '#value' lines
//! number
//! #singular
//! #plural
//! **********
//! #Verbs:               suffix tables and irregular forms
//! s
//! #Irregulars:
//! ran>run
//! **********
//! 1:                    metarules: 'tag:' then 'pattern<target' lines
//! *X^1 s^0 n^-1<*X^1 s^0
//! **********
//! Alice:pn^0            entries: 'word:type,type,...'
//! run:n^1 s^0
//! **********
//! pn^0<n^0              reduction rules: 'from<to'
//! ```
//!
//! Blank lines are ignored everywhere.

use lambek_core::{Atom, MetaRule, PregroupType};
use std::fs;
use std::path::Path;

use crate::config::GrammarConfig;
use crate::grammar::{Grammar, GrammarBuilder};
use crate::NlpError;

pub const SECTION_BREAK: &str = "**********";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Section {
    AtomTypes,
    Markers,
    Substitutions,
    MetaRules,
    Entries,
    Reductions,
}

impl Section {
    fn next(self) -> Option<Section> {
        match self {
            Section::AtomTypes => Some(Section::Markers),
            Section::Markers => Some(Section::Substitutions),
            Section::Substitutions => Some(Section::MetaRules),
            Section::MetaRules => Some(Section::Entries),
            Section::Entries => Some(Section::Reductions),
            Section::Reductions => None,
        }
    }
}

#[derive(Debug, Clone, Copy)]
enum SuffixTable {
    Verbs,
    Nouns,
    Adjectives,
    Irregulars,
}

/// A declared count and the line it was declared on.
#[derive(Debug, Clone, Copy)]
struct Declared {
    count: usize,
    line: usize,
}

struct GrammarReader {
    builder: GrammarBuilder,
    section: Section,
    declared: Option<Declared>,
    seen: usize,
    marker_category: Option<(String, Vec<String>)>,
    suffix_table: Option<SuffixTable>,
    metarule_tag: Option<i64>,
}

fn format_error(line: usize, message: impl Into<String>) -> NlpError {
    NlpError::GrammarFormat {
        line,
        message: message.into(),
    }
}

/// Split `text` on `sep` into exactly two non-empty, trimmed fields.
fn two_fields<'a>(text: &'a str, sep: char, line: usize, what: &str) -> Result<(&'a str, &'a str), NlpError> {
    let fields: Vec<&str> = text.split(sep).map(str::trim).collect();
    match fields.as_slice() {
        [left, right] if !left.is_empty() && !right.is_empty() => Ok((left, right)),
        _ => Err(format_error(line, format!("expected {}", what))),
    }
}

fn parse_type(text: &str, line: usize) -> Result<PregroupType, NlpError> {
    text.parse()
        .map_err(|e: lambek_core::CoreError| format_error(line, e.to_string()))
}

impl GrammarReader {
    fn new(config: GrammarConfig) -> Self {
        Self {
            builder: GrammarBuilder::new().config(config),
            section: Section::AtomTypes,
            declared: None,
            seen: 0,
            marker_category: None,
            suffix_table: None,
            metarule_tag: None,
        }
    }

    fn read(mut self, text: &str) -> Result<GrammarBuilder, NlpError> {
        let mut last_line = 0;
        for (idx, raw) in text.lines().enumerate() {
            let line = idx + 1;
            last_line = line;
            let content = raw.trim();
            if content.is_empty() {
                continue;
            }
            if content == SECTION_BREAK {
                self.finish_section(line)?;
                self.section = self
                    .section
                    .next()
                    .ok_or_else(|| format_error(line, "more than six sections"))?;
                continue;
            }
            match self.section {
                Section::AtomTypes => self.atom_type_line(content, line)?,
                Section::Markers => self.marker_line(content, line)?,
                Section::Substitutions => self.substitution_line(content, line)?,
                Section::MetaRules => self.metarule_line(content, line)?,
                Section::Entries => self.entry_line(content, line)?,
                Section::Reductions => self.reduction_line(content, line)?,
            }
        }
        self.finish_section(last_line)?;
        Ok(self.builder)
    }

    /// Parse a count line if none has been read yet in this section.
    fn count_line(&mut self, content: &str, line: usize) -> Result<bool, NlpError> {
        if self.declared.is_some() {
            return Ok(false);
        }
        let count = content
            .parse()
            .map_err(|_| format_error(line, format!("expected a count, found '{}'", content)))?;
        self.declared = Some(Declared { count, line });
        Ok(true)
    }

    fn finish_section(&mut self, line: usize) -> Result<(), NlpError> {
        if let Some((name, values)) = self.marker_category.take() {
            self.builder = std::mem::take(&mut self.builder).marker_category(name, values);
        }
        if matches!(self.section, Section::AtomTypes | Section::Markers) {
            let what = if self.section == Section::AtomTypes {
                "atom types"
            } else {
                "marker categories"
            };
            match self.declared {
                Some(declared) if declared.count != self.seen => {
                    return Err(format_error(
                        declared.line,
                        format!("declared {} {}, found {}", declared.count, what, self.seen),
                    ))
                }
                None if self.section == Section::AtomTypes => {
                    return Err(format_error(line, "missing atom type count"))
                }
                _ => {}
            }
        }
        self.declared = None;
        self.seen = 0;
        Ok(())
    }

    fn atom_type_line(&mut self, content: &str, line: usize) -> Result<(), NlpError> {
        if self.count_line(content, line)? {
            return Ok(());
        }
        let builder = std::mem::take(&mut self.builder);
        self.builder = match content.strip_prefix('#') {
            Some(name) if !name.trim().is_empty() => builder.standalone_type(name.trim()),
            Some(_) => return Err(format_error(line, "empty standalone type name")),
            None => builder.atom_type(content),
        };
        self.seen += 1;
        Ok(())
    }

    fn marker_line(&mut self, content: &str, line: usize) -> Result<(), NlpError> {
        if self.count_line(content, line)? {
            return Ok(());
        }
        match content.strip_prefix('#') {
            Some(value) => {
                let (_, values) = self
                    .marker_category
                    .as_mut()
                    .ok_or_else(|| format_error(line, "marker value before any category"))?;
                values.push(value.trim().to_string());
            }
            None => {
                if let Some((name, values)) = self.marker_category.take() {
                    self.builder = std::mem::take(&mut self.builder).marker_category(name, values);
                }
                self.marker_category = Some((content.to_string(), Vec::new()));
                self.seen += 1;
            }
        }
        Ok(())
    }

    fn substitution_line(&mut self, content: &str, line: usize) -> Result<(), NlpError> {
        let header = [
            ("#Verbs:", SuffixTable::Verbs),
            ("#Nouns:", SuffixTable::Nouns),
            ("#Adjectives:", SuffixTable::Adjectives),
            ("#Irregulars:", SuffixTable::Irregulars),
        ]
        .into_iter()
        .find(|(label, _)| content.contains(label));
        if let Some((_, table)) = header {
            self.suffix_table = Some(table);
            return Ok(());
        }

        let table = self
            .suffix_table
            .ok_or_else(|| format_error(line, "substitution before any table header"))?;
        let morphology = self.builder.morphology_mut();
        match table {
            SuffixTable::Verbs => morphology.verbal_suffixes.push(content.to_string()),
            SuffixTable::Nouns => morphology.noun_suffixes.push(content.to_string()),
            SuffixTable::Adjectives => morphology.adjective_suffixes.push(content.to_string()),
            SuffixTable::Irregulars => {
                let (form, replacement) = two_fields(content, '>', line, "'form>replacement'")?;
                morphology
                    .irregulars
                    .push((form.to_string(), replacement.to_string()));
            }
        }
        Ok(())
    }

    fn metarule_line(&mut self, content: &str, line: usize) -> Result<(), NlpError> {
        if let Some(tag) = content.strip_suffix(':') {
            let tag = tag
                .trim()
                .parse()
                .map_err(|_| format_error(line, format!("invalid metarule tag '{}'", tag)))?;
            self.metarule_tag = Some(tag);
            return Ok(());
        }

        let tag = self
            .metarule_tag
            .ok_or_else(|| format_error(line, "metarule before any 'tag:' line"))?;
        let (pattern, target) = two_fields(content, '<', line, "'pattern<target'")?;
        let rule = MetaRule::new(tag, parse_type(pattern, line)?, parse_type(target, line)?)
            .map_err(|e| format_error(line, e.to_string()))?;
        self.builder = std::mem::take(&mut self.builder).metarule(rule);
        Ok(())
    }

    fn entry_line(&mut self, content: &str, line: usize) -> Result<(), NlpError> {
        let (word, types) = two_fields(content, ':', line, "'word:type,type,...'")?;
        let types = types
            .split(',')
            .map(|t| {
                if t.trim().is_empty() {
                    Err(format_error(line, "empty type in entry"))
                } else {
                    parse_type(t, line)
                }
            })
            .collect::<Result<Vec<_>, _>>()?;
        self.builder = std::mem::take(&mut self.builder).entry(word, types);
        Ok(())
    }

    fn reduction_line(&mut self, content: &str, line: usize) -> Result<(), NlpError> {
        let (from, to) = two_fields(content, '<', line, "'from^0<to^0'")?;
        let parse_atom = |text: &str| {
            text.parse::<Atom>()
                .map_err(|e| format_error(line, e.to_string()))
        };
        let (from, to) = (parse_atom(from)?, parse_atom(to)?);
        self.builder = std::mem::take(&mut self.builder).reduction(from.name(), to.name());
        Ok(())
    }
}

impl Grammar {
    /// Read a grammar from its text format.
    pub fn from_text(text: &str, config: GrammarConfig) -> Result<Self, NlpError> {
        GrammarReader::new(config).read(text)?.build()
    }

    /// Read a grammar file.
    pub fn load(path: impl AsRef<Path>, config: GrammarConfig) -> Result<Self, NlpError> {
        let path = path.as_ref();
        let text = fs::read_to_string(path).map_err(|e| NlpError::Io {
            path: path.display().to_string(),
            message: e.to_string(),
        })?;
        tracing::info!(path = %path.display(), "loading grammar");
        Self::from_text(&text, config)
    }
}
