//! Corpus parsing with a pregroup grammar.
//!
//! Run with: cargo run -p lambek-nlp --example corpus_parse -- [GRAMMAR CORPUS] [--config CONFIG.json]
//!
//! Without arguments the built-in English grammar and demo corpus are used.
//! Set `RUST_LOG=debug` to watch every path and repair attempt.
//!
//! This example demonstrates:
//! - Loading a grammar from the six-section text format
//! - Parsing single sentences and printing their traces
//! - Running a whole corpus, sequentially and concurrently

use clap::Parser;
use lambek_nlp::{parse_corpus_concurrent, Grammar, LambekConfig, NlpError};
use std::path::{Path, PathBuf};
use std::sync::Arc;

const DEMO_CORPUS: &str = include_str!("../data/corpus.txt");

#[derive(Parser, Debug)]
#[command(
    name = "corpus_parse",
    about = "Parse a corpus against a pregroup grammar and report nesting statistics"
)]
struct Cli {
    /// Grammar in the six-section text format (default: built-in English)
    #[arg(requires = "corpus")]
    grammar: Option<PathBuf>,

    /// Corpus with one sentence per line
    #[arg(requires = "grammar")]
    corpus: Option<PathBuf>,

    /// JSON parser and grammar settings
    #[arg(long, value_name = "PATH")]
    config: Option<PathBuf>,
}

fn read(path: &Path) -> Result<String, NlpError> {
    std::fs::read_to_string(path).map_err(|e| NlpError::Io {
        path: path.display().to_string(),
        message: e.to_string(),
    })
}

#[tokio::main]
async fn main() -> Result<(), NlpError> {
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();
    let config = match &cli.config {
        Some(path) => LambekConfig::from_json(&read(path)?)?,
        None => LambekConfig::default(),
    };

    let (grammar, corpus) = match (&cli.grammar, &cli.corpus) {
        (Some(grammar_path), Some(corpus_path)) => (
            Grammar::load(grammar_path, config.grammar.clone())?,
            read(corpus_path)?,
        ),
        _ => (Grammar::english_basic()?, DEMO_CORPUS.to_string()),
    };

    // -------------------------------------------------------------------------
    // 1. The Grammar
    // -------------------------------------------------------------------------
    println!("1. The Grammar");
    println!("--------------\n");
    println!("{}", grammar);

    // -------------------------------------------------------------------------
    // 2. Single Sentences
    // -------------------------------------------------------------------------
    println!("2. Single Sentences");
    println!("-------------------\n");

    let parser = grammar.parser_with(config.parser);
    for sentence in corpus.lines().filter(|l| !l.trim().is_empty()).take(2) {
        if let Some(report) = parser.parse_line(0, sentence)? {
            match report.outcome() {
                Some(outcome) => println!("{}", outcome.trace()),
                None => println!("{}: not parsed\n", sentence),
            }
        }
    }

    // -------------------------------------------------------------------------
    // 3. The Corpus
    // -------------------------------------------------------------------------
    println!("3. The Corpus");
    println!("-------------\n");

    let report = parser.parse_corpus(&corpus)?;
    println!("{}", report.render());

    let grammar = Arc::new(grammar);
    let concurrent = parse_corpus_concurrent(Arc::clone(&grammar), config.parser, &corpus).await?;
    println!(
        "Concurrent run agrees with sequential run: {}",
        concurrent == report
    );

    Ok(())
}
