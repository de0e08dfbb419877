use super::RowSource;
use crate::engine::Table;
use crate::Error;
use async_trait::async_trait;
use std::collections::HashMap;
use std::io::{Error as IoError, ErrorKind as IoErrorKind};
use std::sync::Arc;

/// Tables held in memory, by name.
///
/// Mostly useful for tests, and for embedding when the data is already loaded.
#[derive(Debug, Default, Clone)]
pub struct MemorySource {
    tables: HashMap<String, Arc<Table>>,
}

impl MemorySource {
    pub fn new() -> Self {
        MemorySource::default()
    }

    pub fn with_table(mut self, table: Table) -> Self {
        self.insert(table);
        self
    }

    /// Replaces any table with the same name.
    pub fn insert(&mut self, table: Table) {
        self.tables.insert(table.name.clone(), Arc::new(table));
    }

    pub fn table_names(&self) -> impl Iterator<Item = &str> {
        self.tables.keys().map(String::as_str)
    }
}

#[async_trait]
impl RowSource for MemorySource {
    async fn load(&self, table: &str) -> Result<Arc<Table>, Error> {
        self.tables.get(table).cloned().ok_or_else(|| {
            Error::table_unavailable(table, IoError::new(IoErrorKind::NotFound, "no such table"))
        })
    }
}
