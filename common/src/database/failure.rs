use std::error::Error as StdError;

use deadpool_postgres::PoolError;
use thiserror::Error;
use tokio_postgres::error::SqlState;

/// Store failures the router reacts to, decided once from the SQLSTATE.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreErrorKind {
    UndefinedColumn,
    UndefinedTable,
    ConstraintViolation,
    Unavailable,
    Other,
}

impl StoreErrorKind {
    pub fn from_sqlstate(code: &SqlState) -> Self {
        if *code == SqlState::UNDEFINED_COLUMN {
            Self::UndefinedColumn
        } else if *code == SqlState::UNDEFINED_TABLE {
            Self::UndefinedTable
        } else if code.code().starts_with("23") {
            // class 23: integrity constraint violation (check, not null, unique, ...)
            Self::ConstraintViolation
        } else {
            Self::Other
        }
    }
}

#[derive(Error, Debug, Clone)]
#[error("{message}")]
pub struct StoreError {
    pub kind: StoreErrorKind,
    pub message: String,
    pub code: Option<String>,
    pub detail: Option<String>,
    pub cause: Option<String>,
}

impl StoreError {
    pub fn new(kind: StoreErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            code: None,
            detail: None,
            cause: None,
        }
    }

    pub fn is(&self, kind: StoreErrorKind) -> bool {
        self.kind == kind
    }

    pub fn log(&self, context: &str) {
        tracing::error!(
            kind = ?self.kind,
            code = self.code.as_deref().unwrap_or("-"),
            detail = self.detail.as_deref().unwrap_or("-"),
            cause = self.cause.as_deref().unwrap_or("-"),
            "{context}: {}",
            self.message
        );
    }
}

fn source_chain(err: &dyn StdError) -> Option<String> {
    let mut chain = Vec::new();
    let mut current = err.source();
    while let Some(source) = current {
        chain.push(source.to_string());
        current = source.source();
    }
    (!chain.is_empty()).then(|| chain.join(": "))
}

impl From<tokio_postgres::Error> for StoreError {
    fn from(err: tokio_postgres::Error) -> Self {
        let cause = source_chain(&err);

        if let Some(db_error) = err.as_db_error() {
            return Self {
                kind: StoreErrorKind::from_sqlstate(db_error.code()),
                message: db_error.message().to_owned(),
                code: Some(db_error.code().code().to_owned()),
                detail: db_error.detail().map(str::to_owned),
                cause,
            };
        }

        let kind = if err.is_closed() {
            StoreErrorKind::Unavailable
        } else {
            StoreErrorKind::Other
        };

        Self {
            kind,
            message: err.to_string(),
            code: None,
            detail: None,
            cause,
        }
    }
}

/// Failing to check a connection out of the pool always means the store is
/// unreachable for this request, whatever the backend reported.
impl From<PoolError> for StoreError {
    fn from(err: PoolError) -> Self {
        match err {
            PoolError::Backend(backend) => Self {
                kind: StoreErrorKind::Unavailable,
                ..Self::from(backend)
            },
            other => Self {
                cause: source_chain(&other),
                ..Self::new(StoreErrorKind::Unavailable, other.to_string())
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sqlstates_map_to_named_kinds() {
        assert_eq!(
            StoreErrorKind::from_sqlstate(&SqlState::UNDEFINED_COLUMN),
            StoreErrorKind::UndefinedColumn
        );
        assert_eq!(
            StoreErrorKind::from_sqlstate(&SqlState::UNDEFINED_TABLE),
            StoreErrorKind::UndefinedTable
        );
        assert_eq!(
            StoreErrorKind::from_sqlstate(&SqlState::CHECK_VIOLATION),
            StoreErrorKind::ConstraintViolation
        );
        assert_eq!(
            StoreErrorKind::from_sqlstate(&SqlState::NOT_NULL_VIOLATION),
            StoreErrorKind::ConstraintViolation
        );
        assert_eq!(
            StoreErrorKind::from_sqlstate(&SqlState::SYNTAX_ERROR),
            StoreErrorKind::Other
        );
    }

    #[test]
    fn display_is_the_store_message() {
        let err = StoreError::new(StoreErrorKind::Other, "relation \"x\" does not exist");
        assert_eq!(err.to_string(), "relation \"x\" does not exist");
        assert!(err.is(StoreErrorKind::Other));
        assert!(!err.is(StoreErrorKind::UndefinedTable));
    }
}
