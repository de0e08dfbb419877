use crate::args::DataParams;
use rusty_select::context::{Context, ContextName};
use rusty_select::source::CsvDirectory;
use rusty_select::{cache, render_json_lines, render_table, QueryExecutor};
use std::path::PathBuf;
use tokio::runtime::{Builder, Runtime};

pub mod server;
pub mod shell;

pub fn query_one(input: String, data: DataParams, table: bool) -> Result<(), rusty_select::Error> {
    let executor = QueryExecutor::new(CsvDirectory::new(data_dir(data)?));

    let rows = runtime()?.block_on(executor.execute(&input))?;

    if table {
        println!("{}", render_table(&rows));
    } else if !rows.is_empty() {
        println!("{}", render_json_lines(&rows)?);
    }

    Ok(())
}

/// --dir wins, otherwise we go with the current context.
fn data_dir(data: DataParams) -> Result<PathBuf, rusty_select::Error> {
    if let Some(dir) = data.dir {
        return Ok(dir);
    }

    let current_context = ContextName::current()?;
    let context: Context = cache::read(&current_context)?;

    Ok(context.data_dir)
}

/// Tokio is our async runtime. The CLI runs one query at a time, so a single thread is plenty.
fn runtime() -> Result<Runtime, rusty_select::Error> {
    Ok(Builder::new_current_thread().enable_io().build()?)
}
