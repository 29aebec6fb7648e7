//! Repository error taxonomy.

use crate::db::DbError;
use crate::model::EntityId;
use rusqlite::ErrorCode;
use std::error::Error;
use std::fmt::{Display, Formatter};

pub type RepoResult<T> = Result<T, RepoError>;

/// Sub-step of a cascading delete.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CascadeStep {
    Begin,
    DeleteMarkets,
    DeleteSolarSystem,
    DeleteCommodity,
    Commit,
}

impl Display for CascadeStep {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Self::Begin => "begin",
            Self::DeleteMarkets => "delete_markets",
            Self::DeleteSolarSystem => "delete_solar_system",
            Self::DeleteCommodity => "delete_commodity",
            Self::Commit => "commit",
        };
        f.write_str(name)
    }
}

/// Error returned by every repository operation.
#[derive(Debug)]
pub enum RepoError {
    /// Point lookup or targeted update matched no row.
    NotFound {
        entity: &'static str,
        id: EntityId,
    },
    /// Foreign-key, check, uniqueness or not-null rule rejected a write.
    ConstraintViolation {
        operation: &'static str,
        source: rusqlite::Error,
    },
    /// A statement inside a cascading delete failed and the unit rolled back.
    TransactionFailure {
        step: CascadeStep,
        source: Box<RepoError>,
    },
    /// The caller interrupted the connection while the statement ran.
    Cancelled { operation: &'static str },
    /// Input the store cannot represent.
    InvalidInput(String),
    /// Connection schema is not at the expected migrated version.
    UninitializedConnection {
        expected_version: u32,
        actual_version: u32,
    },
    /// Required table is missing.
    MissingRequiredTable(&'static str),
    /// Any other store failure.
    Db {
        operation: &'static str,
        source: DbError,
    },
    /// Persisted data cannot be converted into a read model.
    InvalidData(String),
}

impl RepoError {
    /// Classifies a SQLite error raised while running `operation`.
    pub fn from_sqlite(operation: &'static str, err: rusqlite::Error) -> Self {
        match err.sqlite_error_code() {
            Some(ErrorCode::ConstraintViolation) => Self::ConstraintViolation {
                operation,
                source: err,
            },
            Some(ErrorCode::OperationInterrupted) => Self::Cancelled { operation },
            _ => Self::Db {
                operation,
                source: DbError::Sqlite(err),
            },
        }
    }

    /// Adapter for `map_err` that tags a SQLite error with `operation`.
    pub fn store(operation: &'static str) -> impl Fn(rusqlite::Error) -> Self {
        move |err| Self::from_sqlite(operation, err)
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }

    /// True when the failure, or the failed cascade step, was a cancellation.
    pub fn is_cancelled(&self) -> bool {
        match self {
            Self::Cancelled { .. } => true,
            Self::TransactionFailure { source, .. } => source.is_cancelled(),
            _ => false,
        }
    }

    /// Short stable category name for log lines.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::NotFound { .. } => "not_found",
            Self::ConstraintViolation { .. } => "constraint_violation",
            Self::TransactionFailure { .. } => "transaction_failure",
            Self::Cancelled { .. } => "cancelled",
            Self::InvalidInput(_) => "invalid_input",
            Self::UninitializedConnection { .. } => "uninitialized_connection",
            Self::MissingRequiredTable(_) => "missing_table",
            Self::Db { .. } => "db",
            Self::InvalidData(_) => "invalid_data",
        }
    }
}

impl Display for RepoError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NotFound { entity, id } => write!(f, "{entity} not found: {id}"),
            Self::ConstraintViolation { operation, source } => {
                write!(f, "{operation}: constraint violation: {source}")
            }
            Self::TransactionFailure { step, source } => {
                write!(f, "transaction rolled back at step `{step}`: {source}")
            }
            Self::Cancelled { operation } => write!(f, "{operation}: cancelled"),
            Self::InvalidInput(message) => write!(f, "invalid input: {message}"),
            Self::UninitializedConnection {
                expected_version,
                actual_version,
            } => write!(
                f,
                "repository requires schema version {expected_version}, got {actual_version}"
            ),
            Self::MissingRequiredTable(table) => {
                write!(f, "repository requires table `{table}`")
            }
            Self::Db { operation, source } => write!(f, "{operation}: {source}"),
            Self::InvalidData(message) => write!(f, "invalid persisted data: {message}"),
        }
    }
}

impl Error for RepoError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::ConstraintViolation { source, .. } => Some(source),
            Self::TransactionFailure { source, .. } => Some(source.as_ref()),
            Self::Db { source, .. } => Some(source),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{CascadeStep, RepoError};
    use rusqlite::ffi;

    fn sqlite_failure(code: i32) -> rusqlite::Error {
        rusqlite::Error::SqliteFailure(ffi::Error::new(code), None)
    }

    #[test]
    fn constraint_failures_are_classified() {
        let err = RepoError::from_sqlite("market.create", sqlite_failure(ffi::SQLITE_CONSTRAINT));
        assert!(matches!(
            err,
            RepoError::ConstraintViolation {
                operation: "market.create",
                ..
            }
        ));
    }

    #[test]
    fn interrupts_are_cancellations_even_inside_a_cascade() {
        let cancelled = RepoError::from_sqlite("market.list", sqlite_failure(ffi::SQLITE_INTERRUPT));
        assert!(cancelled.is_cancelled());

        let wrapped = RepoError::TransactionFailure {
            step: CascadeStep::DeleteMarkets,
            source: Box::new(cancelled),
        };
        assert!(wrapped.is_cancelled());
        assert!(wrapped.to_string().contains("delete_markets"));
    }

    #[test]
    fn other_failures_stay_generic() {
        let err = RepoError::from_sqlite("commodity.get", sqlite_failure(ffi::SQLITE_BUSY));
        assert_eq!(err.kind(), "db");
        assert!(!err.is_not_found());
    }
}
