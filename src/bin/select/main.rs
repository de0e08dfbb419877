mod args;
mod commands;

use crate::args::{Command, ContextParams};
use args::Args;
use clap::Parser;
use colored::Colorize;
use rusty_select::context::{Context, ContextName};
use rusty_select::{cache, InternalError};
use std::process::exit;

fn main() {
    let args = Args::parse();

    // The server logs through tracing, everything else through env_logger.
    if !matches!(args.command, Command::Serve { .. }) {
        env_logger::init();
    }

    let result = match args.command {
        Command::CreateContext(context) => create_context(context),
        Command::UseContext { name } => use_context(name),
        Command::ListContexts => list_contexts(),
        Command::Query { input, data, table } => commands::query_one(input, data, table),
        Command::Shell { data } => commands::shell::run(data),
        Command::Serve { data, bind } => commands::server::run(data, bind),
    };

    if let Err(error) = result {
        eprintln!("{intro}: {error}", intro = "error".bold().red());
        exit(1);
    }
}

fn create_context(params: ContextParams) -> Result<(), rusty_select::Error> {
    let use_it = params.use_it;
    let new_context: Context = params.into();

    validate_new_context(&new_context)?;

    cache::write(&new_context)?;

    println!("Created new context {}.", new_context.name.to_string().bold());

    if use_it {
        use_context(new_context.name.into())?;
    } else {
        println!(
            "Switch to it by running {}.",
            format!("select use-context {}", new_context.name).bold()
        );
    }

    Ok(())
}

fn validate_new_context(context: &Context) -> Result<(), rusty_select::Error> {
    if !context.data_dir.is_dir() {
        Err(InternalError(format!(
            "{} is not a directory",
            context.data_dir.display()
        )))?;
    }

    Ok(())
}

fn use_context(name: String) -> Result<(), rusty_select::Error> {
    let context_name: ContextName = name.into();

    // Fails when there is no such context.
    let _: Context = cache::read(&context_name)?;
    cache::write(&context_name)?;

    println!("Switched to context {}.", context_name.to_string().bold());

    Ok(())
}

fn list_contexts() -> Result<(), rusty_select::Error> {
    // No current context is fine, it just means nothing gets a star.
    let current_context = ContextName::current().ok();
    let known_contexts: Vec<Context> = cache::read_all()?;

    println!("Available contexts:");
    for context in &known_contexts {
        println!(
            "{}{}: {}",
            if current_context.as_ref() == Some(&context.name) {
                " * ".bold()
            } else {
                "   ".into()
            },
            context.name.to_string().bold(),
            context.data_dir.display()
        )
    }

    Ok(())
}
