// Port Layer - Interfaces for external dependencies

pub mod kv_store;
pub mod time_provider;

// Re-exports
pub use kv_store::{KeyValueStore, NamespaceHandle};
pub use time_provider::{SystemTimeProvider, TimeProvider};
