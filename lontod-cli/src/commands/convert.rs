//! `lontod convert`: render one ontology file in another format.

use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result, anyhow};
use clap::Args;
use lontod_core::{Format, IndexStore, Indexer, OUTPUT_FORMATS};
use tracing::info;

use crate::config::LontodConfig;

/// Arguments for the convert command
#[derive(Debug, Args)]
pub struct ConvertArgs {
    /// Ontology file to convert
    pub input: PathBuf,

    /// Output format: a media type or a short name such as ttl, xml or html
    #[arg(short, long, default_value = "xml", value_parser = parse_format)]
    pub format: Format,

    /// File to write to instead of standard output
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Preferred label languages for HTML output, most preferred first
    #[arg(short = 'L', long = "lang", env = "LONTOD_LANG", value_delimiter = ',')]
    pub languages: Vec<String>,
}

/// Accepts every output format by media type or short name.
fn parse_format(value: &str) -> Result<Format, String> {
    let format = match value {
        "html" => Some(Format::Html),
        value => Format::from_mime_type(value).or_else(|| Format::from_extension(value)),
    };
    format
        .filter(|format| OUTPUT_FORMATS.contains(format))
        .ok_or_else(|| {
            let known: Vec<&str> = OUTPUT_FORMATS.iter().map(|f| f.mime_type()).collect();
            format!("unknown output format {value:?}, expected one of {}", known.join(", "))
        })
}

/// Run the convert command
pub async fn run(args: ConvertArgs, config: LontodConfig) -> Result<()> {
    let languages = if args.languages.is_empty() {
        config.languages
    } else {
        args.languages.clone()
    };

    let input = args.input.clone();
    let format = args.format;
    let data = tokio::task::spawn_blocking(move || convert(&input, format, languages)).await??;

    match &args.output {
        Some(path) => {
            std::fs::write(path, &data)
                .with_context(|| format!("unable to write {}", path.display()))?;
            info!(output = %path.display(), %format, "wrote converted ontology");
        }
        None => {
            let mut stdout = std::io::stdout().lock();
            stdout.write_all(&data)?;
            stdout.flush()?;
        }
    }
    Ok(())
}

/// Index `input` into a throwaway store and read back one representation.
fn convert(input: &Path, format: Format, languages: Vec<String>) -> Result<Vec<u8>> {
    let store = Arc::new(IndexStore::open_in_memory()?);
    let indexed = Indexer::new(store.clone(), languages).index_file(input)?;
    store
        .get_representation(&indexed.slug, format.mime_type())?
        .ok_or_else(|| anyhow!("{} could not be written as {format}", input.display()))
}
