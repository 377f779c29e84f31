//! Category database errors
//!
//! Failures of the libsql file behind the `categories` table: opening it,
//! creating its schema, running statements. Missing categories and rejected
//! input are service errors, not database errors.

use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum DatabaseError {
    /// The category database file could not be opened
    #[error("Cannot open category database {path}: {source}")]
    ConnectionFailed {
        path: PathBuf,
        source: libsql::Error,
    },

    /// Pragmas, the `categories` table or its index could not be created
    #[error("Category schema setup failed: {0}")]
    InitializationFailed(String),

    #[error("Category database {path} is not accessible")]
    PermissionDenied { path: PathBuf },

    /// The directory holding the database file could not be created
    #[error("Cannot create category database directory: {0}")]
    DirectoryCreationFailed(#[from] std::io::Error),

    #[error("libsql error: {0}")]
    LibsqlError(#[from] libsql::Error),

    /// A category statement failed; `context` names the statement
    #[error("Category query failed: {context}")]
    SqlExecutionError { context: String },
}

impl DatabaseError {
    pub fn connection_failed(path: PathBuf, source: libsql::Error) -> Self {
        Self::ConnectionFailed { path, source }
    }

    pub fn initialization_failed(msg: impl Into<String>) -> Self {
        Self::InitializationFailed(msg.into())
    }

    pub fn permission_denied(path: PathBuf) -> Self {
        Self::PermissionDenied { path }
    }

    /// Failed statement, e.g. `sql_execution("insert category: UNIQUE constraint")`
    pub fn sql_execution(context: impl Into<String>) -> Self {
        Self::SqlExecutionError {
            context: context.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sql_execution_names_statement() {
        let err = DatabaseError::sql_execution("insert category: UNIQUE constraint");
        assert_eq!(
            err.to_string(),
            "Category query failed: insert category: UNIQUE constraint"
        );
    }

    #[test]
    fn test_permission_denied_names_path() {
        let err = DatabaseError::permission_denied(PathBuf::from("/root/linkdir.db"));
        assert_eq!(
            err.to_string(),
            "Category database /root/linkdir.db is not accessible"
        );
    }
}
