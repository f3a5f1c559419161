use std::io::{self, Write};

use anyhow::Context;
use clap::Parser;
use serde_json::Value;

use crate::{
    cli::{Cli, Command},
    config::{Config, ExportOptions},
    export::{read_dump, render, write_dump},
    zotero::{Client, Collection, fetch_all},
};

mod bibtex;
mod cli;
mod config;
mod date;
mod error;
mod export;
mod item;
mod key;
mod output;
mod text;
mod zotero;

fn main() -> anyhow::Result<()> {
    let args = Cli::parse();
    output::init_tracing(args.verbose);

    match args.command {
        Command::Collections { filter, remote } => {
            let config = Config::try_from(remote)?;
            list_collections(&config, filter.as_deref().unwrap_or_default())
        }
        Command::Export { collection, remote, errors } => {
            let config = Config::try_from(remote)?;
            let client = Client::new(&config)?;
            let raw = fetch_all(&client.collection_items(&collection), config.limit)
                .with_context(|| format!("failed to fetch collection {collection}"))?;
            if let Some(path) = &config.dump {
                write_dump(path, &raw)?;
            }
            emit(&raw, &errors.into())
        }
        Command::Format { input, errors } => {
            let raw = read_dump(&input)?;
            emit(&raw, &errors.into())
        }
    }
}

fn list_collections(config: &Config, filter: &str) -> anyhow::Result<()> {
    let client = Client::new(config)?;
    let raw = fetch_all(&client.collections(), config.limit).context("failed to list collections")?;
    if let Some(path) = &config.dump {
        write_dump(path, &raw)?;
    }

    let mut stdout = io::stdout().lock();
    for collection in raw.iter().map(Collection::from_json) {
        let collection = collection?;
        if collection.matches(filter) {
            writeln!(stdout, "{} - {}", collection.key, collection.name)?;
        }
    }
    Ok(())
}

fn emit(raw: &[Value], options: &ExportOptions) -> anyhow::Result<()> {
    let rendered = render(raw, options)?;
    io::stdout()
        .lock()
        .write_all(rendered.bibtex.as_bytes())
        .context("failed to write BibTeX")?;
    output::print_summary(&rendered.summary)?;
    Ok(())
}
