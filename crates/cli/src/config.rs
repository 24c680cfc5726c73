// Runtime configuration resolved from CLI flags and environment

use anyhow::{Context, Result};
use std::path::Path;

pub const DEFAULT_DB_PATH: &str = "~/.waitline/queue.db";
pub const DEFAULT_NAMESPACE: &str = "queue";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    /// Path or sqlx URL of the backing database
    pub database_url: String,
    /// Base namespace; the registry lives in `<namespace>.registry`
    pub namespace: String,
}

impl AppConfig {
    /// Expand `~` in the database path and make sure its directory exists
    pub fn resolve(db_path: &str, namespace: &str) -> Result<Self> {
        let database_url = shellexpand::tilde(db_path).into_owned();

        if !is_in_memory(&database_url) {
            if let Some(parent) = Path::new(&database_url).parent() {
                if !parent.as_os_str().is_empty() {
                    std::fs::create_dir_all(parent).with_context(|| {
                        format!("Failed to create database directory {}", parent.display())
                    })?;
                }
            }
        }

        if namespace.trim().is_empty() {
            anyhow::bail!("Namespace cannot be empty");
        }

        Ok(Self {
            database_url,
            namespace: namespace.to_string(),
        })
    }
}

fn is_in_memory(database_url: &str) -> bool {
    database_url.contains(":memory:")
}
