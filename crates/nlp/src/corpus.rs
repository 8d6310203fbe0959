//! Corpus parsing and statistics.
//!
//! A corpus is plain text with one sentence per line. Lines are tokenized on
//! whitespace and punctuation, blank lines are skipped, and every sentence
//! is parsed independently against the same grammar. Unknown words are a
//! per-sentence failure; configuration errors abort the run.
//!
//! Sentences share nothing but the immutable grammar, so
//! [`parse_corpus_concurrent`] can hand each one to its own blocking task.

use serde::Serialize;
use std::sync::Arc;

use crate::config::ParserConfig;
use crate::grammar::Grammar;
use crate::pregroup::{ParseOutcome, Parser};
use crate::NlpError;

const DELIMITERS: &[char] = &[
    '.', ',', ';', ':', '?', '!', '(', ')', '"', '#', '$', '%', '&', '\'',
];

/// Split a line into words on whitespace and punctuation.
pub fn tokenize(line: &str) -> Vec<&str> {
    line.split(|c: char| c.is_whitespace() || DELIMITERS.contains(&c))
        .filter(|token| !token.is_empty())
        .collect()
}

/// Non-blank lines of a corpus with their 1-based line numbers.
fn sentences(text: &str) -> impl Iterator<Item = (usize, Vec<String>)> + '_ {
    text.lines().enumerate().filter_map(|(idx, line)| {
        let words: Vec<String> = tokenize(line).into_iter().map(str::to_string).collect();
        (!words.is_empty()).then_some((idx + 1, words))
    })
}

/// What happened to one sentence.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum SentenceStatus {
    Parsed(ParseOutcome),
    /// A word could not be resolved; the sentence was not parsed.
    Unresolved { reason: String },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SentenceReport {
    pub line: usize,
    pub words: Vec<String>,
    pub status: SentenceStatus,
}

impl SentenceReport {
    pub fn outcome(&self) -> Option<&ParseOutcome> {
        match &self.status {
            SentenceStatus::Parsed(outcome) => Some(outcome),
            SentenceStatus::Unresolved { .. } => None,
        }
    }
}

/// Per-sentence results of a corpus run, in input order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct CorpusReport {
    pub sentences: Vec<SentenceReport>,
}

impl CorpusReport {
    pub fn total(&self) -> usize {
        self.sentences.len()
    }

    fn count(&self, pred: impl Fn(&ParseOutcome) -> bool) -> usize {
        self.sentences
            .iter()
            .filter_map(SentenceReport::outcome)
            .filter(|o| pred(o))
            .count()
    }

    pub fn grammatical(&self) -> usize {
        self.count(ParseOutcome::is_grammatical)
    }

    pub fn first_try(&self) -> usize {
        self.count(|o| o.is_grammatical() && !o.was_repaired())
    }

    pub fn repaired(&self) -> usize {
        self.count(ParseOutcome::was_repaired)
    }

    pub fn unparsable(&self) -> usize {
        self.count(|o| !o.is_grammatical())
    }

    pub fn unresolved(&self) -> usize {
        self.total() - self.sentences.iter().filter_map(SentenceReport::outcome).count()
    }

    /// Sum of nesting depths of grammatical sentences over the number of
    /// sentences in the corpus.
    pub fn mean_nesting(&self) -> f64 {
        if self.sentences.is_empty() {
            return 0.0;
        }
        let sum: usize = self
            .sentences
            .iter()
            .filter_map(SentenceReport::outcome)
            .filter_map(ParseOutcome::nesting_depth)
            .sum();
        sum as f64 / self.total() as f64
    }

    /// One line per sentence followed by the totals.
    pub fn render(&self) -> String {
        let mut out = String::new();
        for sentence in &self.sentences {
            let verdict = match &sentence.status {
                SentenceStatus::Parsed(outcome) => match &outcome.acceptance {
                    Some(acceptance) => {
                        let path: Vec<String> = acceptance.path.iter().map(|t| t.to_string()).collect();
                        let links: Vec<String> = acceptance.links.iter().map(|l| l.to_string()).collect();
                        let attempt = if acceptance.repair.is_some() {
                            "second try"
                        } else {
                            "first try"
                        };
                        format!(
                            "{}: [{}] {} depth {}",
                            attempt,
                            path.join(", "),
                            links.join(" "),
                            acceptance.nesting_depth
                        )
                    }
                    None => "no solution".to_string(),
                },
                SentenceStatus::Unresolved { reason } => reason.clone(),
            };
            out.push_str(&format!("{:>4}  {}  =>  {}\n", sentence.line, sentence.words.join(" "), verdict));
        }
        out.push_str(&format!(
            "\nSentences: {}  grammatical: {} (first try {}, repaired {})  unparsable: {}  unresolved: {}\n",
            self.total(),
            self.grammatical(),
            self.first_try(),
            self.repaired(),
            self.unparsable(),
            self.unresolved()
        ));
        out.push_str(&format!("Average degree of nesting: {:.3}\n", self.mean_nesting()));
        out
    }
}

fn sentence_report(parser: &Parser<'_>, line: usize, words: Vec<String>) -> Result<SentenceReport, NlpError> {
    let status = match parser.parse(&words) {
        Ok(outcome) => SentenceStatus::Parsed(outcome),
        Err(e) if e.is_fatal() => return Err(e),
        Err(e) => {
            tracing::warn!(line, error = %e, "sentence not parsed");
            SentenceStatus::Unresolved {
                reason: e.to_string(),
            }
        }
    };
    Ok(SentenceReport {
        line,
        words,
        status,
    })
}

impl Parser<'_> {
    /// Parse one corpus line; blank lines yield `None`.
    pub fn parse_line(&self, line_number: usize, line: &str) -> Result<Option<SentenceReport>, NlpError> {
        let words: Vec<String> = tokenize(line).into_iter().map(str::to_string).collect();
        if words.is_empty() {
            return Ok(None);
        }
        sentence_report(self, line_number, words).map(Some)
    }

    /// Parse every non-blank line of a corpus, in order.
    pub fn parse_corpus(&self, text: &str) -> Result<CorpusReport, NlpError> {
        let mut report = CorpusReport::default();
        for (line, words) in sentences(text) {
            report.sentences.push(sentence_report(self, line, words)?);
        }
        tracing::info!(
            sentences = report.total(),
            grammatical = report.grammatical(),
            mean_nesting = report.mean_nesting(),
            "corpus parsed"
        );
        Ok(report)
    }
}

/// Parse a corpus with one blocking task per sentence.
///
/// The report lists sentences in input order, exactly as
/// [`Parser::parse_corpus`] would.
pub async fn parse_corpus_concurrent(
    grammar: Arc<Grammar>,
    config: ParserConfig,
    text: &str,
) -> Result<CorpusReport, NlpError> {
    let mut handles = Vec::new();
    for (line, words) in sentences(text) {
        let grammar = Arc::clone(&grammar);
        handles.push(tokio::task::spawn_blocking(move || {
            let parser = Parser::with_config(&grammar, config);
            sentence_report(&parser, line, words)
        }));
    }

    let mut report = CorpusReport::default();
    for handle in handles {
        let sentence = handle.await.map_err(|e| NlpError::Worker {
            message: e.to_string(),
        })??;
        report.sentences.push(sentence);
    }
    tracing::info!(
        sentences = report.total(),
        grammatical = report.grammatical(),
        "corpus parsed concurrently"
    );
    Ok(report)
}
