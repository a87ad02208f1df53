//! Error types for EXPLAIN parsing

use thiserror::Error;

/// Structural problems in an EXPLAIN report
#[derive(Debug, Clone, PartialEq, Error)]
pub enum FormatError {
    #[error("expected 3 border lines in explain result, found {found}")]
    MissingBorders { found: usize },

    #[error("expected one header line between the first two borders, found {found}")]
    MissingHeader { found: usize },

    #[error("row is not enclosed in '|' delimiters: {line}")]
    MalformedRow { line: String },

    #[error("row {row} has {found} columns, expected {expected}")]
    ColumnCount {
        row: usize,
        expected: usize,
        found: usize,
    },

    #[error("missing column '{0}' in explain header")]
    MissingColumn(String),

    #[error("explain result has no operator rows")]
    EmptyPlan,

    #[error("row {row} ({id}) is not attached to the operator tree")]
    DetachedRow { row: usize, id: String },

    #[error("invalid estimated row count '{value}' for operator {id}")]
    InvalidRowCount { id: String, value: String },

    #[error("operator id {0} appears more than once")]
    DuplicateOperatorId(String),
}

/// Errors returned while turning an EXPLAIN report into a plan
#[derive(Debug, Error)]
pub enum ExplainError {
    #[error("Invalid explain format: {0}")]
    Format(#[from] FormatError),

    #[error("Unsupported version: {0}")]
    UnsupportedVersion(String),

    #[error("Invalid layout configuration: {0}")]
    Config(#[from] toml::de::Error),
}

impl ExplainError {
    /// Returns true if the report text itself was malformed
    pub fn is_format_error(&self) -> bool {
        matches!(self, Self::Format(_))
    }

    /// Returns true if the version or dialect is not supported
    pub fn is_unsupported_version(&self) -> bool {
        matches!(self, Self::UnsupportedVersion(_))
    }
}

/// Result type for EXPLAIN parsing
pub type Result<T> = std::result::Result<T, ExplainError>;
