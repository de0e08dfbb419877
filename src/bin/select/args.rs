use clap::{Parser, Subcommand};
use rusty_select::context::Context;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Args {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Creates a context.
    ///
    /// Contexts remember a folder of CSV files, so you don't have to pass --dir every time.
    CreateContext(ContextParams),
    /// Selects an existing context.
    UseContext { name: String },
    /// List available contexts.
    ListContexts,
    /// Runs a single query and prints the resulting rows.
    Query {
        input: String,
        #[command(flatten)]
        data: DataParams,
        /// Print an aligned table instead of JSON lines
        #[arg(long)]
        table: bool,
    },
    /// Reads queries from the terminal until an empty line or "exit".
    Shell {
        #[command(flatten)]
        data: DataParams,
    },
    /// Runs an HTTP server answering queries on /api/v1/query?q=...
    Serve {
        #[command(flatten)]
        data: DataParams,
        /// Address to listen on
        #[arg(long, default_value = "127.0.0.1:33333")]
        bind: String,
    },
}

#[derive(clap::Args, Debug)]
pub struct ContextParams {
    /// You can reuse your context by referencing this name
    name: String,
    /// Folder holding one <table>.csv file per table
    #[arg(long)]
    dir: PathBuf,
    /// Use the new context
    #[arg(long = "use")]
    pub use_it: bool,
}

#[derive(clap::Args, Debug)]
pub struct DataParams {
    /// Folder holding one <table>.csv file per table. Defaults to the current context's folder.
    #[arg(long)]
    pub dir: Option<PathBuf>,
}

impl From<ContextParams> for Context {
    fn from(value: ContextParams) -> Self {
        Context {
            name: value.name.into(),
            data_dir: value.dir,
        }
    }
}
