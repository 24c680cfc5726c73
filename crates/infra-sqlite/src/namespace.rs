// SQLite Namespace Handle (one transaction per open namespace)

use crate::kv_store::map_sqlx_error;
use async_trait::async_trait;
use sqlx::{Sqlite, Transaction as SqlxTransaction};
use tracing::debug;
use waitline_core::error::Result;
use waitline_core::port::NamespaceHandle;

/// Open namespace backed by a transaction.
///
/// `close` commits. Dropping without `close` rolls the transaction back and
/// returns the connection to the pool.
pub struct SqliteNamespace {
    tx: SqlxTransaction<'static, Sqlite>,
    namespace: String,
}

impl SqliteNamespace {
    pub fn new(tx: SqlxTransaction<'static, Sqlite>, namespace: impl Into<String>) -> Self {
        Self {
            tx,
            namespace: namespace.into(),
        }
    }
}

#[async_trait]
impl NamespaceHandle for SqliteNamespace {
    async fn get_int(&mut self, key: &str, default: i64) -> Result<i64> {
        let value: Option<Option<i64>> = sqlx::query_scalar(
            "SELECT int_value FROM kv_entries WHERE namespace = ? AND key = ?",
        )
        .bind(&self.namespace)
        .bind(key)
        .fetch_optional(&mut *self.tx)
        .await
        .map_err(map_sqlx_error)?;

        Ok(value.flatten().unwrap_or(default))
    }

    async fn get_string(&mut self, key: &str, default: &str) -> Result<String> {
        let value: Option<Option<String>> = sqlx::query_scalar(
            "SELECT str_value FROM kv_entries WHERE namespace = ? AND key = ?",
        )
        .bind(&self.namespace)
        .bind(key)
        .fetch_optional(&mut *self.tx)
        .await
        .map_err(map_sqlx_error)?;

        Ok(value.flatten().unwrap_or_else(|| default.to_string()))
    }

    async fn put_int(&mut self, key: &str, value: i64) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO kv_entries (namespace, key, int_value, str_value)
            VALUES (?, ?, ?, NULL)
            ON CONFLICT(namespace, key)
            DO UPDATE SET int_value = excluded.int_value, str_value = NULL
            "#,
        )
        .bind(&self.namespace)
        .bind(key)
        .bind(value)
        .execute(&mut *self.tx)
        .await
        .map_err(map_sqlx_error)?;

        Ok(())
    }

    async fn put_string(&mut self, key: &str, value: &str) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO kv_entries (namespace, key, int_value, str_value)
            VALUES (?, ?, NULL, ?)
            ON CONFLICT(namespace, key)
            DO UPDATE SET int_value = NULL, str_value = excluded.str_value
            "#,
        )
        .bind(&self.namespace)
        .bind(key)
        .bind(value)
        .execute(&mut *self.tx)
        .await
        .map_err(map_sqlx_error)?;

        Ok(())
    }

    async fn close(self: Box<Self>) -> Result<()> {
        let SqliteNamespace { tx, namespace } = *self;
        tx.commit().await.map_err(map_sqlx_error)?;
        debug!(namespace = %namespace, "Namespace closed");
        Ok(())
    }
}
