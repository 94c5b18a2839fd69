//! Error kinds surfaced by the catalog. The front ends decide how to present
//! each kind: expected failures become a printed message, storage failures
//! abort the process.

use rusqlite::{ffi, Error as SqlError, ErrorCode};
use thiserror::Error;

pub type Result<T, E = CatalogError> = std::result::Result<T, E>;

#[derive(Debug, Error)]
pub enum CatalogError {
    /// Input rejected before touching the store (bad date, blank field).
    #[error("{0}")]
    Validation(String),

    #[error("{entity} with id {id} not found.")]
    NotFound { entity: &'static str, id: i64 },

    /// Uniqueness or referential rejection from SQLite.
    #[error("{0}")]
    ConstraintViolation(String),

    #[error("storage unavailable: {0}")]
    StorageUnavailable(#[source] SqlError),
}

impl CatalogError {
    pub fn validation(message: impl Into<String>) -> Self {
        CatalogError::Validation(message.into())
    }

    /// Whether the error belongs to the class a front end reports and moves on
    /// from, rather than treating as fatal.
    pub fn is_expected(&self) -> bool {
        !matches!(self, CatalogError::StorageUnavailable(_))
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, CatalogError::NotFound { .. })
    }
}

impl From<SqlError> for CatalogError {
    fn from(err: SqlError) -> Self {
        match constraint_kind(&err) {
            Some(kind) => CatalogError::ConstraintViolation(kind.describe(&err)),
            None => CatalogError::StorageUnavailable(err),
        }
    }
}

/// Which flavour of constraint SQLite rejected, read from the extended code.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum ConstraintKind {
    Unique,
    ForeignKey,
    NotNull,
    Check,
    Other,
}

impl ConstraintKind {
    fn describe(self, err: &SqlError) -> String {
        let detail = match err {
            SqlError::SqliteFailure(_, Some(message)) => message.as_str(),
            _ => "constraint failed",
        };
        match self {
            ConstraintKind::Unique => format!("Duplicate value rejected ({detail})."),
            ConstraintKind::ForeignKey => {
                format!("Referenced record does not exist or is still in use ({detail}).")
            }
            ConstraintKind::NotNull | ConstraintKind::Check => {
                format!("Required field missing ({detail}).")
            }
            ConstraintKind::Other => format!("Write rejected by the store ({detail})."),
        }
    }
}

pub(crate) fn constraint_kind(err: &SqlError) -> Option<ConstraintKind> {
    if !matches!(err.sqlite_error_code(), Some(ErrorCode::ConstraintViolation)) {
        return None;
    }
    let extended = match err {
        SqlError::SqliteFailure(inner, _) => inner.extended_code,
        _ => return Some(ConstraintKind::Other),
    };
    let kind = match extended {
        ffi::SQLITE_CONSTRAINT_UNIQUE | ffi::SQLITE_CONSTRAINT_PRIMARYKEY => {
            ConstraintKind::Unique
        }
        ffi::SQLITE_CONSTRAINT_FOREIGNKEY => ConstraintKind::ForeignKey,
        ffi::SQLITE_CONSTRAINT_NOTNULL => ConstraintKind::NotNull,
        ffi::SQLITE_CONSTRAINT_CHECK => ConstraintKind::Check,
        _ => ConstraintKind::Other,
    };
    Some(kind)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rusqlite::Connection;

    #[test]
    fn unique_failures_become_constraint_violations() {
        let conn = Connection::open_in_memory().unwrap();
        conn.execute_batch("CREATE TABLE t (v TEXT UNIQUE); INSERT INTO t VALUES ('a');")
            .unwrap();
        let err = conn
            .execute("INSERT INTO t VALUES ('a')", [])
            .unwrap_err();
        assert_eq!(constraint_kind(&err), Some(ConstraintKind::Unique));
        assert!(matches!(
            CatalogError::from(err),
            CatalogError::ConstraintViolation(_)
        ));
    }

    #[test]
    fn other_failures_are_storage_errors() {
        let conn = Connection::open_in_memory().unwrap();
        let err = conn.execute("SELECT * FROM missing", []).unwrap_err();
        let err = CatalogError::from(err);
        assert!(matches!(err, CatalogError::StorageUnavailable(_)));
        assert!(!err.is_expected());
    }
}
