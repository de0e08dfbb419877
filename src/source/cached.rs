use super::RowSource;
use crate::engine::Table;
use crate::Error;
use async_trait::async_trait;
use log::debug;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

/// Remembers every table another source loaded.
///
/// Tables never change once loaded, so handing out the same `Arc<Table>` to concurrent queries is
/// fine. Two queries missing the same table at the same time will both load it; the first one to
/// finish wins and the other copy is dropped.
pub struct CachedSource<S> {
    inner: S,
    tables: RwLock<HashMap<String, Arc<Table>>>,
}

impl<S: RowSource> CachedSource<S> {
    pub fn new(inner: S) -> Self {
        CachedSource {
            inner,
            tables: RwLock::new(HashMap::new()),
        }
    }

    pub fn inner(&self) -> &S {
        &self.inner
    }

    /// Drops the cached copy, the next load goes to the inner source again.
    pub async fn invalidate(&self, table: &str) -> bool {
        self.tables.write().await.remove(table).is_some()
    }

    pub async fn clear(&self) {
        self.tables.write().await.clear();
    }

    pub async fn cached_count(&self) -> usize {
        self.tables.read().await.len()
    }
}

#[async_trait]
impl<S: RowSource> RowSource for CachedSource<S> {
    async fn load(&self, table: &str) -> Result<Arc<Table>, Error> {
        if let Some(cached) = self.tables.read().await.get(table) {
            return Ok(cached.clone());
        }

        let loaded = self.inner.load(table).await?;
        debug!("caching table {}", table);

        let mut tables = self.tables.write().await;
        let cached = tables.entry(table.to_owned()).or_insert(loaded);

        Ok(cached.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source::MemorySource;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Counts how many times the inner source is hit.
    struct CountingSource {
        inner: MemorySource,
        loads: AtomicUsize,
    }

    #[async_trait]
    impl RowSource for CountingSource {
        async fn load(&self, table: &str) -> Result<Arc<Table>, Error> {
            self.loads.fetch_add(1, Ordering::SeqCst);
            self.inner.load(table).await
        }
    }

    fn source() -> CachedSource<CountingSource> {
        CachedSource::new(CountingSource {
            inner: MemorySource::new().with_table(Table::new("student", vec![], vec![])),
            loads: AtomicUsize::new(0),
        })
    }

    #[tokio::test]
    async fn test_loads_once() {
        let source = source();

        let first = source.load("student").await.unwrap();
        let second = source.load("student").await.unwrap();

        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(1, source.inner().loads.load(Ordering::SeqCst));
        assert_eq!(1, source.cached_count().await);
    }

    #[tokio::test]
    async fn test_invalidate() {
        let source = source();

        source.load("student").await.unwrap();
        assert!(source.invalidate("student").await);
        source.load("student").await.unwrap();

        assert_eq!(2, source.inner().loads.load(Ordering::SeqCst));
    }

    #[tokio::test]
    async fn test_errors_are_not_cached() {
        let source = source();

        assert!(source.load("professor").await.is_err());
        assert!(source.load("professor").await.is_err());

        assert_eq!(2, source.inner().loads.load(Ordering::SeqCst));
        assert_eq!(0, source.cached_count().await);
    }
}
