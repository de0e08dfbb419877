//! Row sources hand tables to the executor.
//!
//! The engine doesn't care where tables come from, only that it can ask for one by name. Sources
//! are async because the interesting ones do I/O.
mod cached;
mod csv;
mod memory;

pub use cached::CachedSource;
pub use csv::{parse_csv, CsvDirectory, CsvError};
pub use memory::MemorySource;

use crate::engine::Table;
use crate::Error;
use async_trait::async_trait;
use std::sync::Arc;

#[async_trait]
pub trait RowSource: Send + Sync {
    /// Rows must come back in source order, with every column of the table present as text.
    ///
    /// A table that doesn't exist, or can't be read, is an
    /// [ErrorKind::TableUnavailable](crate::ErrorKind::TableUnavailable) error.
    async fn load(&self, table: &str) -> Result<Arc<Table>, Error>;
}

#[async_trait]
impl<S> RowSource for Arc<S>
where
    S: RowSource + ?Sized,
{
    async fn load(&self, table: &str) -> Result<Arc<Table>, Error> {
        (**self).load(table).await
    }
}
