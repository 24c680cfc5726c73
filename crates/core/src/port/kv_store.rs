// Key-Value Store Port (Interface)
//
// A flat, namespaced store of string and integer values, accessed through a
// scoped handle: open -> operate -> close.

use crate::error::Result;
use async_trait::async_trait;

/// Namespaced key-value store
#[async_trait]
pub trait KeyValueStore: Send + Sync {
    /// Open a namespace for reading and writing.
    ///
    /// # Errors
    /// - `AppError::Storage` if the store is unavailable
    async fn open(&self, namespace: &str) -> Result<Box<dyn NamespaceHandle>>;
}

/// An open namespace.
///
/// Call `close` on every path. A handle dropped without `close` is still
/// released, but adapters may discard its uncommitted writes.
#[async_trait]
pub trait NamespaceHandle: Send {
    /// Read an integer, or `default` if the key is absent
    async fn get_int(&mut self, key: &str, default: i64) -> Result<i64>;

    /// Read a string, or `default` if the key is absent
    async fn get_string(&mut self, key: &str, default: &str) -> Result<String>;

    /// Write an integer, replacing any previous value
    async fn put_int(&mut self, key: &str, value: i64) -> Result<()>;

    /// Write a string, replacing any previous value
    async fn put_string(&mut self, key: &str, value: &str) -> Result<()>;

    /// Flush and release the namespace
    async fn close(self: Box<Self>) -> Result<()>;
}

// ============================================================================
// Mock Implementations for Testing
// ============================================================================

pub mod mocks {
    use super::*;
    use crate::error::AppError;
    use std::collections::{HashMap, HashSet};
    use std::sync::{Arc, Mutex};

    #[derive(Debug, Clone, PartialEq, Eq)]
    enum StoredValue {
        Int(i64),
        Str(String),
    }

    #[derive(Default)]
    struct Inner {
        namespaces: HashMap<String, HashMap<String, StoredValue>>,
        unavailable: bool,
        unavailable_namespaces: HashSet<String>,
        open_handles: usize,
        opens: usize,
    }

    /// In-memory store with failure injection and handle accounting.
    ///
    /// Writes land immediately, like flash-backed preferences. Cloning shares
    /// the same contents, which lets a test "reboot" by building a new queue
    /// over a clone.
    #[derive(Clone, Default)]
    pub struct InMemoryKeyValueStore {
        inner: Arc<Mutex<Inner>>,
    }

    impl InMemoryKeyValueStore {
        pub fn new() -> Self {
            Self::default()
        }

        /// Make every subsequent `open` fail
        pub fn set_unavailable(&self, unavailable: bool) {
            self.inner.lock().unwrap().unavailable = unavailable;
        }

        /// Make `open` fail for one namespace only
        pub fn set_namespace_unavailable(&self, namespace: &str, unavailable: bool) {
            let mut inner = self.inner.lock().unwrap();
            if unavailable {
                inner.unavailable_namespaces.insert(namespace.to_string());
            } else {
                inner.unavailable_namespaces.remove(namespace);
            }
        }

        /// Handles opened but not yet closed or dropped
        pub fn open_handles(&self) -> usize {
            self.inner.lock().unwrap().open_handles
        }

        /// Total successful `open` calls
        pub fn open_count(&self) -> usize {
            self.inner.lock().unwrap().opens
        }

        pub fn int_value(&self, namespace: &str, key: &str) -> Option<i64> {
            let inner = self.inner.lock().unwrap();
            match inner.namespaces.get(namespace)?.get(key)? {
                StoredValue::Int(v) => Some(*v),
                StoredValue::Str(_) => None,
            }
        }

        pub fn string_value(&self, namespace: &str, key: &str) -> Option<String> {
            let inner = self.inner.lock().unwrap();
            match inner.namespaces.get(namespace)?.get(key)? {
                StoredValue::Str(v) => Some(v.clone()),
                StoredValue::Int(_) => None,
            }
        }

        /// Seed a value directly (e.g. to simulate a corrupted slot)
        pub fn seed_int(&self, namespace: &str, key: &str, value: i64) {
            self.put(namespace, key, StoredValue::Int(value));
        }

        pub fn seed_string(&self, namespace: &str, key: &str, value: &str) {
            self.put(namespace, key, StoredValue::Str(value.to_string()));
        }

        fn put(&self, namespace: &str, key: &str, value: StoredValue) {
            self.inner
                .lock()
                .unwrap()
                .namespaces
                .entry(namespace.to_string())
                .or_default()
                .insert(key.to_string(), value);
        }

        fn get(&self, namespace: &str, key: &str) -> Option<StoredValue> {
            let inner = self.inner.lock().unwrap();
            inner.namespaces.get(namespace)?.get(key).cloned()
        }
    }

    #[async_trait]
    impl KeyValueStore for InMemoryKeyValueStore {
        async fn open(&self, namespace: &str) -> Result<Box<dyn NamespaceHandle>> {
            let mut inner = self.inner.lock().unwrap();
            if inner.unavailable || inner.unavailable_namespaces.contains(namespace) {
                return Err(AppError::Storage(format!(
                    "cannot open namespace '{}': store unavailable",
                    namespace
                )));
            }
            inner.open_handles += 1;
            inner.opens += 1;
            Ok(Box::new(InMemoryNamespace {
                store: self.clone(),
                namespace: namespace.to_string(),
            }))
        }
    }

    struct InMemoryNamespace {
        store: InMemoryKeyValueStore,
        namespace: String,
    }

    impl Drop for InMemoryNamespace {
        fn drop(&mut self) {
            let mut inner = self.store.inner.lock().unwrap();
            inner.open_handles = inner.open_handles.saturating_sub(1);
        }
    }

    #[async_trait]
    impl NamespaceHandle for InMemoryNamespace {
        async fn get_int(&mut self, key: &str, default: i64) -> Result<i64> {
            match self.store.get(&self.namespace, key) {
                Some(StoredValue::Int(v)) => Ok(v),
                _ => Ok(default),
            }
        }

        async fn get_string(&mut self, key: &str, default: &str) -> Result<String> {
            match self.store.get(&self.namespace, key) {
                Some(StoredValue::Str(v)) => Ok(v),
                _ => Ok(default.to_string()),
            }
        }

        async fn put_int(&mut self, key: &str, value: i64) -> Result<()> {
            self.store.put(&self.namespace, key, StoredValue::Int(value));
            Ok(())
        }

        async fn put_string(&mut self, key: &str, value: &str) -> Result<()> {
            self.store
                .put(&self.namespace, key, StoredValue::Str(value.to_string()));
            Ok(())
        }

        async fn close(self: Box<Self>) -> Result<()> {
            // Release happens in Drop
            Ok(())
        }
    }

    #[cfg(test)]
    mod tests {
        use super::*;

        #[tokio::test]
        async fn test_absent_keys_return_defaults() {
            let store = InMemoryKeyValueStore::new();
            let mut ns = store.open("queue").await.unwrap();

            assert_eq!(ns.get_int("counter", 1).await.unwrap(), 1);
            assert_eq!(ns.get_string("UID_0", "").await.unwrap(), "");
            ns.close().await.unwrap();
        }

        #[tokio::test]
        async fn test_namespaces_are_isolated() {
            let store = InMemoryKeyValueStore::new();

            let mut a = store.open("a").await.unwrap();
            a.put_int("count", 5).await.unwrap();
            a.close().await.unwrap();

            let mut b = store.open("b").await.unwrap();
            assert_eq!(b.get_int("count", 0).await.unwrap(), 0);
            b.close().await.unwrap();

            assert_eq!(store.int_value("a", "count"), Some(5));
        }

        #[tokio::test]
        async fn test_type_mismatch_reads_default() {
            let store = InMemoryKeyValueStore::new();
            store.seed_string("queue", "count", "three");

            let mut ns = store.open("queue").await.unwrap();
            assert_eq!(ns.get_int("count", 0).await.unwrap(), 0);
            ns.close().await.unwrap();
        }

        #[tokio::test]
        async fn test_handles_released_on_close_and_drop() {
            let store = InMemoryKeyValueStore::new();

            let closed = store.open("queue").await.unwrap();
            let dropped = store.open("queue").await.unwrap();
            assert_eq!(store.open_handles(), 2);

            closed.close().await.unwrap();
            drop(dropped);
            assert_eq!(store.open_handles(), 0);
            assert_eq!(store.open_count(), 2);
        }

        #[tokio::test]
        async fn test_unavailable_store_fails_open() {
            let store = InMemoryKeyValueStore::new();
            store.set_unavailable(true);

            let result = store.open("queue").await;
            assert!(matches!(result, Err(AppError::Storage(_))));
            assert_eq!(store.open_handles(), 0);
        }

        #[tokio::test]
        async fn test_single_namespace_unavailable() {
            let store = InMemoryKeyValueStore::new();
            store.set_namespace_unavailable("queue.registry", true);

            assert!(store.open("queue.registry").await.is_err());
            store.open("queue").await.unwrap().close().await.unwrap();

            store.set_namespace_unavailable("queue.registry", false);
            store
                .open("queue.registry")
                .await
                .unwrap()
                .close()
                .await
                .unwrap();
        }
    }
}
