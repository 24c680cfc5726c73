// Waitline Infrastructure - SQLite Adapter
// Implements: KeyValueStore (namespaced preferences store)

mod connection;
mod kv_store;
mod migration;
mod namespace;

pub use connection::create_pool;
pub use kv_store::SqliteKeyValueStore;
pub use migration::run_migrations;
pub use namespace::SqliteNamespace;

// Note: sqlx::Error conversion is handled by wrapping in helper functions
// due to Rust's orphan rules (cannot implement From<sqlx::Error> for AppError here)
