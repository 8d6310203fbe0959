//! Configuration for grammar construction and parsing.
//!
//! All fields have defaults reproducing the classic behavior, so an empty
//! JSON object is a valid configuration:
//!
//! ```rust
//! use lambek_nlp::config::{LambekConfig, RepairStrategy};
//!
//! let config = LambekConfig::from_json("{}").unwrap();
//! assert_eq!(config.parser.repair_threshold, 4);
//! assert_eq!(config.parser.repair_strategy, RepairStrategy::AfterAllPaths);
//!
//! let config = LambekConfig::from_json(
//!     r#"{"grammar": {"metarule_iteration": {"fixed_point": {"max_rounds": 8}}}}"#,
//! ).unwrap();
//! ```

use lambek_core::MetaruleIteration;
use serde::{Deserialize, Serialize};

use crate::NlpError;

/// Grammar-level settings, fixed at load time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GrammarConfig {
    /// Name of the dummy sentinel type substituted during repair.
    pub dummy_type: String,
    /// How many metarule rounds to run per dictionary entry.
    pub metarule_iteration: MetaruleIteration,
}

impl Default for GrammarConfig {
    fn default() -> Self {
        Self {
            dummy_type: "x".to_string(),
            metarule_iteration: MetaruleIteration::default(),
        }
    }
}

/// When the repair pass runs relative to the first pass over paths.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RepairStrategy {
    /// Try every path plainly first, then repair failing paths in order.
    #[default]
    AfterAllPaths,
    /// Repair each failing path right after its plain attempt.
    PerPath,
}

/// Parse-time settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ParserConfig {
    /// Occurrences of one atom type (directly or via reduction) that flag a
    /// path for repair.
    pub repair_threshold: usize,
    pub repair_strategy: RepairStrategy,
}

impl Default for ParserConfig {
    fn default() -> Self {
        Self {
            repair_threshold: 4,
            repair_strategy: RepairStrategy::default(),
        }
    }
}

/// Complete configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LambekConfig {
    pub grammar: GrammarConfig,
    pub parser: ParserConfig,
}

impl LambekConfig {
    /// Parse and validate a JSON configuration.
    pub fn from_json(text: &str) -> Result<Self, NlpError> {
        let config: LambekConfig = serde_json::from_str(text).map_err(|e| NlpError::Config {
            message: e.to_string(),
        })?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), NlpError> {
        let invalid = |message: &str| {
            Err(NlpError::Config {
                message: message.to_string(),
            })
        };

        let dummy = &self.grammar.dummy_type;
        if dummy.is_empty() || dummy.contains(&['*', '_', '^'][..]) || dummy.contains(char::is_whitespace) {
            return invalid("dummy_type must be a plain, non-empty type name");
        }
        if self.parser.repair_threshold < 2 {
            return invalid("repair_threshold must be at least 2");
        }
        match self.grammar.metarule_iteration {
            MetaruleIteration::FixedPoint { max_rounds: 0 } => {
                invalid("fixed_point.max_rounds must be positive")
            }
            _ => Ok(()),
        }
    }
}
