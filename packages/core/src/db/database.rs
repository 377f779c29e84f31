//! Database Connection Management
//!
//! Connection handling and schema setup for the embedded libsql database that
//! holds the `categories` table.
//!
//! # Architecture
//!
//! - **Path-agnostic**: accepts any `PathBuf`; parent directories are created
//! - **Idempotent schema**: `CREATE TABLE IF NOT EXISTS`, no migrations
//! - **WAL mode**: readers do not block the single writer
//!
//! # Connection pattern
//!
//! Always use `connect_with_timeout()` in async code. It sets a 5 second busy
//! timeout so concurrent requests wait for the write lock instead of failing
//! with `SQLITE_BUSY`.
//!
//! ```no_run
//! # use linkdir_core::db::DatabaseService;
//! # use std::path::PathBuf;
//! # #[tokio::main]
//! # async fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let db_service = DatabaseService::new(PathBuf::from("./data/linkdir.db")).await?;
//! let conn = db_service.connect_with_timeout().await?;
//! # Ok(())
//! # }
//! ```

use crate::db::error::DatabaseError;
use libsql::{Builder, Database};
use std::path::PathBuf;
use std::sync::Arc;

/// Columns of the tree projection, in `CategoryRecord` field order
const RECORD_COLUMNS: &str = "id, parent_id, name, slug, order_index";

/// All columns, in `Category` field order
const CATEGORY_COLUMNS: &str = "id, parent_id, name, slug, order_index, title, content";

/// Database service for managing the libsql connection and schema
#[derive(Debug, Clone)]
pub struct DatabaseService {
    /// libsql database handle (wrapped in Arc for sharing)
    pub db: Arc<Database>,

    /// Path to the database file
    pub db_path: PathBuf,
}

/// Parameters for category insertion
pub struct DbCreateCategoryParams<'a> {
    pub parent_id: i64,
    pub name: &'a str,
    pub slug: &'a str,
    pub order_index: i64,
    pub title: Option<&'a str>,
    pub content: Option<&'a str>,
}

/// Parameters for a full-row category update
pub struct DbUpdateCategoryParams<'a> {
    pub id: i64,
    pub parent_id: i64,
    pub name: &'a str,
    pub slug: &'a str,
    pub order_index: i64,
    pub title: Option<&'a str>,
    pub content: Option<&'a str>,
}

impl DatabaseService {
    /// Open (or create) the database at `db_path` and initialize the schema.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError` if the parent directory cannot be created, the
    /// connection fails, or schema initialization fails.
    pub async fn new(db_path: PathBuf) -> Result<Self, DatabaseError> {
        if let Some(parent) = db_path.parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                std::fs::create_dir_all(parent).map_err(|e| {
                    if e.kind() == std::io::ErrorKind::PermissionDenied {
                        DatabaseError::permission_denied(db_path.clone())
                    } else {
                        DatabaseError::DirectoryCreationFailed(e)
                    }
                })?;
            }
        }

        let db = Builder::new_local(&db_path)
            .build()
            .await
            .map_err(|e| DatabaseError::connection_failed(db_path.clone(), e))?;

        let service = Self {
            db: Arc::new(db),
            db_path,
        };

        service.initialize_schema().await?;

        Ok(service)
    }

    /// Execute a PRAGMA statement
    ///
    /// PRAGMA statements return rows, so they go through `query()` rather
    /// than `execute()`.
    async fn execute_pragma(
        &self,
        conn: &libsql::Connection,
        pragma: &str,
    ) -> Result<(), DatabaseError> {
        let mut stmt = conn.prepare(pragma).await.map_err(|e| {
            DatabaseError::sql_execution(format!("Failed to execute '{}': {}", pragma, e))
        })?;
        let _ = stmt.query(()).await.map_err(|e| {
            DatabaseError::sql_execution(format!("Failed to execute '{}': {}", pragma, e))
        })?;
        Ok(())
    }

    /// Create the `categories` table and its index (safe to call repeatedly)
    ///
    /// `parent_id` is `0` for top-level rows and never NULL; there is no
    /// foreign key because `0` is not a real row.
    async fn initialize_schema(&self) -> Result<(), DatabaseError> {
        let conn = self.connect_with_timeout().await?;

        self.execute_pragma(&conn, "PRAGMA journal_mode = WAL")
            .await?;

        conn.execute(
            "CREATE TABLE IF NOT EXISTS categories (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                parent_id INTEGER NOT NULL DEFAULT 0,
                name TEXT NOT NULL UNIQUE,
                slug TEXT NOT NULL UNIQUE,
                title TEXT,
                content TEXT,
                order_index INTEGER NOT NULL DEFAULT 0,
                created_at DATETIME DEFAULT CURRENT_TIMESTAMP,
                modified_at DATETIME DEFAULT CURRENT_TIMESTAMP
            )",
            (),
        )
        .await
        .map_err(|e| {
            DatabaseError::initialization_failed(format!(
                "Failed to create categories table: {}",
                e
            ))
        })?;

        conn.execute(
            "CREATE INDEX IF NOT EXISTS idx_categories_parent ON categories(parent_id, order_index)",
            (),
        )
        .await
        .map_err(|e| {
            DatabaseError::initialization_failed(format!(
                "Failed to create idx_categories_parent: {}",
                e
            ))
        })?;

        Ok(())
    }

    /// Get a synchronous connection handle
    ///
    /// Only for single-threaded code that does not hold the connection across
    /// `.await` points; prefer `connect_with_timeout()`.
    pub fn connect(&self) -> Result<libsql::Connection, DatabaseError> {
        self.db.connect().map_err(DatabaseError::LibsqlError)
    }

    /// Get a connection with a 5 second busy timeout configured
    pub async fn connect_with_timeout(&self) -> Result<libsql::Connection, DatabaseError> {
        let conn = self.connect()?;

        self.execute_pragma(&conn, "PRAGMA busy_timeout = 5000")
            .await?;

        Ok(conn)
    }

    //
    // CATEGORY OPERATIONS
    // Raw SQL only; tree rules are enforced by CategoryService.
    //

    /// Snapshot of the tree projection ordered by `(parent_id, order_index)`
    pub async fn db_list_categories(&self) -> Result<libsql::Rows, DatabaseError> {
        let conn = self.connect_with_timeout().await?;

        conn.query(
            &format!(
                "SELECT {} FROM categories ORDER BY parent_id ASC, order_index ASC, id ASC",
                RECORD_COLUMNS
            ),
            (),
        )
        .await
        .map_err(|e| {
            DatabaseError::sql_execution(format!("Failed to execute list_categories query: {}", e))
        })
    }

    /// Every full row ordered by id (export dump)
    pub async fn db_list_all(&self) -> Result<libsql::Rows, DatabaseError> {
        let conn = self.connect_with_timeout().await?;

        conn.query(
            &format!("SELECT {} FROM categories ORDER BY id ASC", CATEGORY_COLUMNS),
            (),
        )
        .await
        .map_err(|e| {
            DatabaseError::sql_execution(format!("Failed to execute list_all query: {}", e))
        })
    }

    /// Single full row by id
    ///
    /// * `Ok(Some(row))` - category found
    /// * `Ok(None)` - no such category
    pub async fn db_get_category(&self, id: i64) -> Result<Option<libsql::Row>, DatabaseError> {
        let conn = self.connect_with_timeout().await?;

        let mut stmt = conn
            .prepare(&format!(
                "SELECT {} FROM categories WHERE id = ?",
                CATEGORY_COLUMNS
            ))
            .await
            .map_err(|e| {
                DatabaseError::sql_execution(format!(
                    "Failed to prepare get_category query: {}",
                    e
                ))
            })?;

        let mut rows = stmt.query([id]).await.map_err(|e| {
            DatabaseError::sql_execution(format!("Failed to execute get_category query: {}", e))
        })?;

        rows.next()
            .await
            .map_err(|e| DatabaseError::sql_execution(e.to_string()))
    }

    /// Id of the category whose `name` equals `name`, if any
    pub async fn db_find_id_by_name(&self, name: &str) -> Result<Option<i64>, DatabaseError> {
        self.find_id_where("SELECT id FROM categories WHERE name = ? LIMIT 1", name)
            .await
    }

    /// Id of the category whose `slug` equals `slug`, if any
    pub async fn db_find_id_by_slug(&self, slug: &str) -> Result<Option<i64>, DatabaseError> {
        self.find_id_where("SELECT id FROM categories WHERE slug = ? LIMIT 1", slug)
            .await
    }

    async fn find_id_where(&self, sql: &str, value: &str) -> Result<Option<i64>, DatabaseError> {
        let conn = self.connect_with_timeout().await?;

        let mut rows = conn.query(sql, [value]).await.map_err(|e| {
            DatabaseError::sql_execution(format!("Failed to execute '{}': {}", sql, e))
        })?;

        match rows
            .next()
            .await
            .map_err(|e| DatabaseError::sql_execution(e.to_string()))?
        {
            Some(row) => Ok(Some(row.get::<i64>(0)?)),
            None => Ok(None),
        }
    }

    /// Insert a category and return its new id
    pub async fn db_create_category(
        &self,
        params: DbCreateCategoryParams<'_>,
    ) -> Result<i64, DatabaseError> {
        let conn = self.connect_with_timeout().await?;

        conn.execute(
            "INSERT INTO categories (parent_id, name, slug, order_index, title, content)
             VALUES (?, ?, ?, ?, ?, ?)",
            (
                params.parent_id,
                params.name,
                params.slug,
                params.order_index,
                params.title,
                params.content,
            ),
        )
        .await
        .map_err(|e| DatabaseError::sql_execution(format!("Failed to insert category: {}", e)))?;

        Ok(conn.last_insert_rowid())
    }

    /// Overwrite every editable column of a category
    ///
    /// Returns the number of rows affected (0 when the id does not exist).
    pub async fn db_update_category(
        &self,
        params: DbUpdateCategoryParams<'_>,
    ) -> Result<u64, DatabaseError> {
        let conn = self.connect_with_timeout().await?;

        conn.execute(
            "UPDATE categories
             SET parent_id = ?, name = ?, slug = ?, order_index = ?, title = ?, content = ?,
                 modified_at = CURRENT_TIMESTAMP
             WHERE id = ?",
            (
                params.parent_id,
                params.name,
                params.slug,
                params.order_index,
                params.title,
                params.content,
                params.id,
            ),
        )
        .await
        .map_err(|e| DatabaseError::sql_execution(format!("Failed to update category: {}", e)))
    }

    /// Delete all `ids` in one transaction
    ///
    /// Idempotent: ids that do not exist are skipped. Returns the number of
    /// rows actually removed.
    pub async fn db_delete_categories(&self, ids: &[i64]) -> Result<u64, DatabaseError> {
        if ids.is_empty() {
            return Ok(0);
        }

        let conn = self.connect_with_timeout().await?;
        let tx = conn.transaction().await.map_err(|e| {
            DatabaseError::sql_execution(format!("Failed to begin delete transaction: {}", e))
        })?;

        let mut removed = 0;
        for id in ids {
            removed += tx
                .execute("DELETE FROM categories WHERE id = ?", [*id])
                .await
                .map_err(|e| {
                    DatabaseError::sql_execution(format!("Failed to delete category {}: {}", id, e))
                })?;
        }

        tx.commit().await.map_err(|e| {
            DatabaseError::sql_execution(format!("Failed to commit delete transaction: {}", e))
        })?;

        Ok(removed)
    }

    /// Flush the WAL before shutdown
    pub async fn db_close(&self) -> Result<(), DatabaseError> {
        let conn = self.connect_with_timeout().await?;
        self.execute_pragma(&conn, "PRAGMA wal_checkpoint(TRUNCATE)")
            .await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    async fn create_test_db() -> (DatabaseService, TempDir) {
        let temp_dir = TempDir::new().unwrap();
        let db_path = temp_dir.path().join("test.db");
        let db = DatabaseService::new(db_path).await.unwrap();
        (db, temp_dir)
    }

    fn params<'a>(parent_id: i64, name: &'a str, order_index: i64) -> DbCreateCategoryParams<'a> {
        DbCreateCategoryParams {
            parent_id,
            name,
            slug: name,
            order_index,
            title: None,
            content: None,
        }
    }

    #[tokio::test]
    async fn test_database_creation() {
        let temp_dir = TempDir::new().unwrap();
        let db_path = temp_dir.path().join("nested").join("test.db");

        let db_service = DatabaseService::new(db_path.clone()).await.unwrap();

        assert_eq!(db_service.db_path, db_path);
        assert!(db_path.exists());
    }

    #[tokio::test]
    async fn test_schema_initialization() {
        let (db_service, _temp_dir) = create_test_db().await;
        let conn = db_service.connect().unwrap();

        let mut stmt = conn
            .prepare("SELECT name FROM sqlite_master WHERE type='table' AND name='categories'")
            .await
            .unwrap();
        let mut rows = stmt.query(()).await.unwrap();
        let row = rows.next().await.unwrap().unwrap();
        let table_name: String = row.get(0).unwrap();
        assert_eq!(table_name, "categories");

        let mut stmt = conn
            .prepare("SELECT name FROM sqlite_master WHERE type='index' AND name LIKE 'idx_%'")
            .await
            .unwrap();
        let mut rows = stmt.query(()).await.unwrap();
        let row = rows.next().await.unwrap().unwrap();
        let index_name: String = row.get(0).unwrap();
        assert_eq!(index_name, "idx_categories_parent");
    }

    #[tokio::test]
    async fn test_schema_initialization_is_idempotent() {
        let temp_dir = TempDir::new().unwrap();
        let db_path = temp_dir.path().join("test.db");

        let first = DatabaseService::new(db_path.clone()).await.unwrap();
        first.db_create_category(params(0, "kept", 1)).await.unwrap();
        first.db_close().await.unwrap();
        drop(first);

        let second = DatabaseService::new(db_path).await.unwrap();
        assert!(second.db_find_id_by_name("kept").await.unwrap().is_some());
    }

    #[tokio::test]
    async fn test_create_returns_new_ids() {
        let (db, _temp_dir) = create_test_db().await;

        let first = db.db_create_category(params(0, "alpha", 1)).await.unwrap();
        let second = db.db_create_category(params(first, "beta", 1)).await.unwrap();
        assert!(second > first);

        assert_eq!(db.db_find_id_by_slug("beta").await.unwrap(), Some(second));
        assert_eq!(db.db_find_id_by_name("gamma").await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_unique_name_enforced() {
        let (db, _temp_dir) = create_test_db().await;

        db.db_create_category(params(0, "alpha", 1)).await.unwrap();
        let result = db.db_create_category(params(0, "alpha", 2)).await;
        assert!(matches!(
            result,
            Err(DatabaseError::SqlExecutionError { .. })
        ));
    }

    #[tokio::test]
    async fn test_list_categories_ordering() {
        let (db, _temp_dir) = create_test_db().await;

        let top = db.db_create_category(params(0, "top", 2)).await.unwrap();
        db.db_create_category(params(top, "child-b", 2)).await.unwrap();
        db.db_create_category(params(top, "child-a", 1)).await.unwrap();
        db.db_create_category(params(0, "first", 1)).await.unwrap();

        let mut rows = db.db_list_categories().await.unwrap();
        let mut names = Vec::new();
        while let Some(row) = rows.next().await.unwrap() {
            let name: String = row.get(2).unwrap();
            names.push(name);
        }
        assert_eq!(names, vec!["first", "top", "child-a", "child-b"]);
    }

    #[tokio::test]
    async fn test_delete_categories_is_idempotent() {
        let (db, _temp_dir) = create_test_db().await;

        let a = db.db_create_category(params(0, "a", 1)).await.unwrap();
        let b = db.db_create_category(params(0, "b", 2)).await.unwrap();

        assert_eq!(db.db_delete_categories(&[a, b, 999]).await.unwrap(), 2);
        assert_eq!(db.db_delete_categories(&[a, b]).await.unwrap(), 0);
        assert_eq!(db.db_delete_categories(&[]).await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_update_missing_row_affects_nothing() {
        let (db, _temp_dir) = create_test_db().await;

        let affected = db
            .db_update_category(DbUpdateCategoryParams {
                id: 42,
                parent_id: 0,
                name: "ghost",
                slug: "ghost",
                order_index: 1,
                title: None,
                content: None,
            })
            .await
            .unwrap();
        assert_eq!(affected, 0);
    }
}
