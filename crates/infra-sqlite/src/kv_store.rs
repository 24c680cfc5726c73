// SQLite KeyValueStore Implementation

use crate::SqliteNamespace;
use async_trait::async_trait;
use sqlx::SqlitePool;
use tracing::debug;
use waitline_core::error::{AppError, Result};
use waitline_core::port::{KeyValueStore, NamespaceHandle};

// Helper to convert sqlx::Error to AppError with structured information
pub(crate) fn map_sqlx_error(err: sqlx::Error) -> AppError {
    match &err {
        sqlx::Error::Database(db_err) => {
            if let Some(code) = db_err.code() {
                let code_str = code.as_ref();

                // SQLite error codes: https://www.sqlite.org/rescode.html
                match code_str {
                    "5" => {
                        // SQLITE_BUSY - database is locked
                        AppError::Storage(format!(
                            "Database locked (SQLITE_BUSY): {}",
                            db_err.message()
                        ))
                    }
                    "13" => {
                        // SQLITE_FULL - database or disk is full
                        AppError::Storage(format!("Database full: {}", db_err.message()))
                    }
                    _ => AppError::Storage(format!(
                        "Database error [{}]: {}",
                        code_str,
                        db_err.message()
                    )),
                }
            } else {
                AppError::Storage(format!("Database error: {}", db_err.message()))
            }
        }
        // Connection, pool, protocol errors
        _ => AppError::Storage(err.to_string()),
    }
}

/// Namespaced preferences store backed by the `kv_entries` table.
///
/// Each `open` starts a transaction; the handle's `close` commits it.
#[derive(Clone)]
pub struct SqliteKeyValueStore {
    pool: SqlitePool,
}

impl SqliteKeyValueStore {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl KeyValueStore for SqliteKeyValueStore {
    async fn open(&self, namespace: &str) -> Result<Box<dyn NamespaceHandle>> {
        let tx = self.pool.begin().await.map_err(map_sqlx_error)?;
        debug!(namespace = %namespace, "Namespace opened");
        Ok(Box::new(SqliteNamespace::new(tx, namespace)))
    }
}
