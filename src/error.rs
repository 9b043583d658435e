use std::fmt;
use std::path::PathBuf;

use thiserror::Error;

use crate::model::{PossibilityTable, Status, ValueType};

/// Problems with the category set or the rule list. These are raised before the
/// possibility table is touched and are never retried.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("no categories were given")]
    NoCategories,
    #[error("category `{0}` has no values")]
    EmptyCategory(String),
    #[error("category name `{0}` is used more than once")]
    DuplicateCategory(String),
    #[error("category `{category}` lists value `{value}` more than once")]
    DuplicateValue { category: String, value: String },
    #[error("value `{value}` in category `{category}` is not a {expected} value")]
    MismatchedValueType {
        category: String,
        value: String,
        expected: ValueType,
    },
    #[error("cannot read `{literal}` as a {expected} value")]
    InvalidLiteral { literal: String, expected: ValueType },
    #[error("unknown category `{0}`")]
    UnknownCategory(String),
    #[error("cannot find a column name that matches comparison category `{0}`")]
    UnknownComparisonCategory(String),
    #[error("comparison category `{0}` holds categorical values and cannot be ordered")]
    UnorderedComparisonCategory(String),
    #[error("`{0}` does not match a value of any category")]
    UnknownLiteral(String),
    #[error("`{literal}` is ambiguous between categories {categories:?}")]
    AmbiguousLiteral {
        literal: String,
        categories: Vec<String>,
    },
    #[error("value `{value}` is not in category `{category}`")]
    ValueNotInCategory { category: String, value: String },
    #[error("offset `{0}` is out of range")]
    InvalidOffset(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConvergenceReason {
    /// The configured number of solve attempts ran out.
    IterationCap,
    /// A whole iteration left the table unchanged.
    Stalled,
    /// Some category value has no possible row left.
    Contradiction,
}

impl fmt::Display for ConvergenceReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConvergenceReason::IterationCap => write!(f, "reached maximum number of solve attempts"),
            ConvergenceReason::Stalled => write!(f, "rules stopped making progress"),
            ConvergenceReason::Contradiction => write!(f, "rules contradict each other"),
        }
    }
}

#[derive(Debug, Error)]
pub enum PuzzleError {
    #[error(transparent)]
    Configuration(#[from] ConfigError),
    #[error("puzzle unsolved after {attempts} solve attempts: {reason}")]
    Convergence {
        attempts: usize,
        reason: ConvergenceReason,
        table: Box<PossibilityTable>,
    },
    #[error("row {row} moved from {from} to {to}")]
    InvariantViolation { row: usize, from: Status, to: Status },
}

#[derive(Debug, Error)]
pub enum LoadError {
    #[error("could not read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid YAML: {0}")]
    Yaml(#[from] serde_yaml::Error),
    #[error("invalid JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error(transparent)]
    Configuration(#[from] ConfigError),
}
