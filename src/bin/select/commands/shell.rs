//! A small REPL: one query per line, results printed as a table.
use super::{data_dir, runtime};
use crate::args::DataParams;
use colored::Colorize;
use dialoguer::Input;
use rusty_select::source::{CachedSource, CsvDirectory};
use rusty_select::{render_table, QueryExecutor};

pub fn run(data: DataParams) -> Result<(), rusty_select::Error> {
    let dir = data_dir(data)?;
    println!("Reading tables from {}", dir.display().to_string().bold());

    // Tables are read once per session, edit the CSV files and restart the shell to see changes.
    let executor = QueryExecutor::new(CachedSource::new(CsvDirectory::new(dir)));
    let runtime = runtime()?;

    loop {
        let input: String = Input::new()
            .with_prompt("select")
            .allow_empty(true)
            .interact_text()?;

        let input = input.trim();
        if input.is_empty() || input.eq_ignore_ascii_case("exit") {
            return Ok(());
        }

        match runtime.block_on(executor.execute(input)) {
            Ok(rows) => println!("{}", render_table(&rows)),
            Err(error) => eprintln!("{intro}: {error}", intro = "error".bold().red()),
        }
    }
}
