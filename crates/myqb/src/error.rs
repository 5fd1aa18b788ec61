//! Error types for myqb

use thiserror::Error;

/// Result type alias for myqb operations
pub type QbResult<T> = Result<T, QbError>;

/// Errors raised while constructing or rendering a statement.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum QbError {
    /// A list element that cannot be rendered as a numeric literal
    #[error("unsupported element type in numeric list: {0}")]
    UnsupportedElement(&'static str),

    /// A list helper was given a scalar
    #[error("input must be a list, got {0}")]
    NotAList(&'static str),

    /// CASE expression without any WHEN branch
    #[error("CASE expression requires at least one WHEN branch")]
    EmptyCase,

    /// Invalid identifier pattern for a custom normalizer
    #[error("invalid identifier pattern: {0}")]
    InvalidPattern(String),

    /// A condition that failed at construction time
    #[error("invalid condition on '{column}': {message}")]
    InvalidCondition { column: String, message: String },

    /// A field expression that failed at construction time
    #[error("invalid field expression: {0}")]
    InvalidField(String),

    /// A subquery used as a derived table without a label
    #[error("derived table for '{0}' requires a label")]
    DerivedTableAlias(String),

    /// One placeholder bound to two different values in the same statement
    #[error("placeholder ':{0}' is bound to conflicting values")]
    ParamConflict(String),

    /// Placeholder referenced in SQL but absent from the parameter map
    #[error("missing value for placeholder ':{0}'")]
    MissingParam(String),

    /// Empty list bound to an `IN (:name)` placeholder
    #[error("empty list bound to placeholder ':{0}'")]
    EmptyList(String),

    /// Other errors
    #[error("{0}")]
    Other(String),
}

impl QbError {
    /// Create an invalid condition error for a specific column
    pub fn condition(column: impl Into<String>, message: impl Into<String>) -> Self {
        Self::InvalidCondition {
            column: column.into(),
            message: message.into(),
        }
    }

    /// Check if this is a parameter conflict error
    pub fn is_param_conflict(&self) -> bool {
        matches!(self, Self::ParamConflict(_))
    }

    /// Check if this error was raised by the rebind step
    pub fn is_bind_error(&self) -> bool {
        matches!(self, Self::MissingParam(_) | Self::EmptyList(_))
    }
}
