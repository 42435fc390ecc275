//! `lontod index`: build or update the persisted index.

use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

use anyhow::Result;
use clap::Args;
use comfy_table::{Cell, Color, ContentArrangement, Table, presets::UTF8_FULL_CONDENSED};
use lontod_core::{BatchReport, IndexStore, Indexer};
use tracing::info;

use crate::config::{DEFAULT_DATABASE, LontodConfig};

/// Arguments for the index command
#[derive(Debug, Args)]
pub struct IndexArgs {
    /// Files or directories to index; slugs or IRIs with --remove
    #[arg(env = "LONTOD_PATHS", value_delimiter = ':')]
    pub paths: Vec<PathBuf>,

    /// Database file to write
    #[arg(short, long, env = "LONTOD_DB")]
    pub database: Option<PathBuf>,

    /// Empty the index before indexing
    #[arg(long)]
    pub clean: bool,

    /// Remove the named ontologies instead of indexing files
    #[arg(long)]
    pub remove: bool,

    /// Work on an in-memory copy and leave the database untouched
    #[arg(long)]
    pub simulate: bool,

    /// Preferred label languages, most preferred first
    #[arg(short = 'L', long = "lang", env = "LONTOD_LANG", value_delimiter = ',')]
    pub languages: Vec<String>,
}

impl IndexArgs {
    fn apply(&self, config: &mut LontodConfig) {
        if !self.paths.is_empty() {
            config.paths = self.paths.clone();
        }
        if let Some(database) = &self.database {
            config.database = Some(database.clone());
        }
        if !self.languages.is_empty() {
            config.languages = self.languages.clone();
        }
    }
}

/// Run the index command
pub async fn run(args: IndexArgs, mut config: LontodConfig) -> Result<ExitCode> {
    args.apply(&mut config);
    if config.paths.is_empty() && !args.clean {
        anyhow::bail!("nothing to do: pass at least one path");
    }

    let success = execute(&args, &config).await?;
    Ok(if success {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    })
}

/// Index or remove, returning whether every input succeeded.
async fn execute(args: &IndexArgs, config: &LontodConfig) -> Result<bool> {
    let database = config
        .database
        .clone()
        .unwrap_or_else(|| PathBuf::from(DEFAULT_DATABASE));
    let store = if args.simulate {
        IndexStore::open_copy_in_memory(&database)?
    } else {
        IndexStore::open(&database)?
    };
    let store = Arc::new(store);

    if args.clean {
        store.truncate()?;
        info!("cleared index");
    }

    let success = if args.remove {
        remove(&store, &config.paths)?
    } else {
        let indexer = Indexer::new(store.clone(), config.languages.clone());
        let paths = config.paths.clone();
        let report = tokio::task::spawn_blocking(move || indexer.index_paths(&paths)).await?;
        print_report(&report);
        report.is_success()
    };

    if args.simulate {
        println!("simulation only: {} was not modified", database.display());
    }
    Ok(success)
}

fn remove(store: &IndexStore, identifiers: &[PathBuf]) -> Result<bool> {
    let mut success = true;
    for identifier in identifiers {
        let identifier = identifier.to_string_lossy();
        match store.resolve_ontology(&identifier)? {
            Some(slug) => {
                store.delete(&slug)?;
                println!("removed {slug}");
            }
            None => {
                println!("not indexed: {identifier}");
                success = false;
            }
        }
    }
    Ok(success)
}

fn print_report(report: &BatchReport) {
    let mut table = Table::new();
    table.load_preset(UTF8_FULL_CONDENSED);
    table.set_content_arrangement(ContentArrangement::Dynamic);
    table.set_header(vec![
        Cell::new("Status").fg(Color::Cyan),
        Cell::new("Source").fg(Color::Cyan),
        Cell::new("Slug").fg(Color::Cyan),
        Cell::new("IRI").fg(Color::Cyan),
        Cell::new("Details").fg(Color::Cyan),
    ]);

    for ontology in &report.indexed {
        let mut details = format!(
            "{} formats, {} concepts",
            ontology.formats.len(),
            ontology.concepts
        );
        if !ontology.displaced.is_empty() {
            details.push_str(&format!("; replaced {}", ontology.displaced.join(", ")));
        }
        table.add_row(vec![
            Cell::new("ok").fg(Color::Green),
            Cell::new(ontology.path.display()),
            Cell::new(&ontology.slug),
            Cell::new(&ontology.uri),
            Cell::new(details),
        ]);
    }
    for failure in &report.failed {
        table.add_row(vec![
            Cell::new("failed").fg(Color::Red),
            Cell::new(failure.path().display()),
            Cell::new(""),
            Cell::new(""),
            Cell::new(failure.to_string()),
        ]);
    }

    println!("{table}");
    println!(
        "{} indexed, {} failed",
        report.indexed.len(),
        report.failed.len()
    );
}
