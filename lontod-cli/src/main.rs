use std::process::ExitCode;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

mod commands;
mod config;

use config::ConfigLoader;

#[derive(Parser)]
#[command(name = "lontod", about = "Index ontologies and serve them with content negotiation")]
#[command(version, propagate_version = true)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Verbose output
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Index ontology files into the database
    Index(commands::index::IndexArgs),
    /// Serve indexed ontologies over HTTP
    Serve(commands::serve::ServeArgs),
    /// Convert one ontology file into another format
    Convert(commands::convert::ConvertArgs),
}

#[tokio::main]
async fn main() -> Result<ExitCode> {
    let cli = Cli::parse();

    let default = if cli.verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let config = ConfigLoader::load()?;

    match cli.command {
        Commands::Index(args) => commands::index::run(args, config).await,
        Commands::Serve(args) => commands::serve::run(args, config)
            .await
            .map(|()| ExitCode::SUCCESS),
        Commands::Convert(args) => commands::convert::run(args, config)
            .await
            .map(|()| ExitCode::SUCCESS),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;
    use serial_test::serial;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    #[serial]
    fn test_verbose_is_global() {
        let cli = Cli::try_parse_from(["lontod", "index", "a.ttl", "-v"]).unwrap();
        assert!(cli.verbose);
        assert!(matches!(cli.command, Commands::Index(_)));
    }

    #[test]
    #[serial]
    fn test_convert_subcommand() {
        let cli = Cli::try_parse_from(["lontod", "convert", "onto.ttl", "-f", "nt", "-o", "onto.nt"])
            .unwrap();
        let Commands::Convert(args) = cli.command else {
            panic!("expected the convert command");
        };
        assert_eq!(args.format, lontod_core::Format::NTriples);
        assert_eq!(args.output, Some(std::path::PathBuf::from("onto.nt")));
    }
}
