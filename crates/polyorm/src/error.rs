//! Error types for polyorm

use std::fmt;
use thiserror::Error;

/// Result type alias for polyorm operations
pub type OrmResult<T> = Result<T, OrmError>;

/// The stage of a dialect operation that talked to the database.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Insert,
    Read,
    Update,
    Delete,
    Introspection,
    Sequence,
}

impl Phase {
    pub fn as_str(self) -> &'static str {
        match self {
            Phase::Insert => "insert",
            Phase::Read => "read",
            Phase::Update => "update",
            Phase::Delete => "delete",
            Phase::Introspection => "introspection",
            Phase::Sequence => "sequence",
        }
    }
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error types for dialect operations
#[derive(Debug, Error)]
pub enum OrmError {
    /// The model instance has no primary key value and no explicit columns were given.
    #[error("Missing primary key on model '{model}'")]
    MissingPrimaryKey { model: String },

    /// Collected value count does not match the column count.
    #[error("Argument mismatch: expected {expected} values, got {got}")]
    ArgumentMismatch { expected: usize, got: usize },

    /// A column name that does not belong to the model.
    #[error("Unknown field '{name}' on model '{model}'")]
    UnknownField { model: String, name: String },

    /// Operator name the dialect has no template for.
    #[error("Unknown operator '{operator}' for dialect {dialect}")]
    UnknownOperator {
        dialect: &'static str,
        operator: String,
    },

    /// Field type key the dialect has no column type for.
    #[error("Unsupported column type '{key}' for dialect {dialect}")]
    UnsupportedType { dialect: &'static str, key: String },

    /// No dialect registered under this name.
    #[error("Unknown dialect: {0}")]
    UnknownDialect(String),

    /// Row not found
    #[error("Not found: {0}")]
    NotFound(String),

    /// Error returned by the querier, tagged with the operation phase.
    #[error("{phase} failed: {source}")]
    Exec {
        phase: Phase,
        #[source]
        source: Box<OrmError>,
    },

    /// Driver level error reported by a `Querier` implementation.
    #[error("Driver error: {0}")]
    Driver(String),

    /// Query execution error
    #[cfg(feature = "postgres")]
    #[error("Query error: {0}")]
    Query(#[from] tokio_postgres::Error),

    /// Row decode/mapping error
    #[error("Decode error on column '{column}': {message}")]
    Decode { column: String, message: String },

    /// Validation error
    #[error("Validation error: {0}")]
    Validation(String),

    /// Other errors
    #[error("{0}")]
    Other(String),
}

impl OrmError {
    /// Create a decode error for a specific column
    pub fn decode(column: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Decode {
            column: column.into(),
            message: message.into(),
        }
    }

    /// Create a not found error
    pub fn not_found(message: impl Into<String>) -> Self {
        Self::NotFound(message.into())
    }

    /// Create a validation error
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    pub fn missing_pk(model: impl Into<String>) -> Self {
        Self::MissingPrimaryKey {
            model: model.into(),
        }
    }

    /// Tag an executor error with the phase that produced it.
    ///
    /// Errors that are already tagged are returned unchanged.
    pub fn in_phase(self, phase: Phase) -> Self {
        match self {
            err @ Self::Exec { .. } => err,
            err => Self::Exec {
                phase,
                source: Box::new(err),
            },
        }
    }

    /// The phase tag, if this error came from the querier.
    pub fn phase(&self) -> Option<Phase> {
        match self {
            Self::Exec { phase, .. } => Some(*phase),
            _ => None,
        }
    }

    /// Strip the phase tag.
    pub fn into_inner(self) -> Self {
        match self {
            Self::Exec { source, .. } => *source,
            err => err,
        }
    }

    /// Check if this is a not found error
    pub fn is_not_found(&self) -> bool {
        match self {
            Self::NotFound(_) => true,
            Self::Exec { source, .. } => source.is_not_found(),
            _ => false,
        }
    }

    pub fn is_missing_pk(&self) -> bool {
        matches!(self, Self::MissingPrimaryKey { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn phase_tag_is_applied_once() {
        let err = OrmError::Driver("boom".into())
            .in_phase(Phase::Insert)
            .in_phase(Phase::Sequence);
        assert_eq!(err.phase(), Some(Phase::Insert));
        assert_eq!(err.to_string(), "insert failed: Driver error: boom");
        assert!(matches!(err.into_inner(), OrmError::Driver(_)));
    }

    #[test]
    fn not_found_is_visible_through_tag() {
        let err = OrmError::not_found("no rows").in_phase(Phase::Read);
        assert!(err.is_not_found());
        assert!(!OrmError::Driver("x".into()).is_not_found());
    }
}
