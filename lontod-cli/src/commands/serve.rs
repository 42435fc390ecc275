//! `lontod serve`: answer HTTP requests from the index, optionally watching
//! the indexed paths for changes.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Result;
use clap::Args;
use lontod_core::Indexer;
use lontod_server::{IdentifierStyle, OntologyServer};
use lontod_watch::{IndexerReindexer, Watcher};
use tracing::{info, warn};

use super::open_store;
use crate::config::{ConfigError, LontodConfig, server_config};

/// Arguments for the serve command
#[derive(Debug, Args)]
pub struct ServeArgs {
    /// Files or directories to index at startup
    #[arg(env = "LONTOD_PATHS", value_delimiter = ':')]
    pub paths: Vec<PathBuf>,

    /// Database file; in-memory when paths are given without one
    #[arg(short, long, env = "LONTOD_DB")]
    pub database: Option<PathBuf>,

    /// Host to bind to
    #[arg(short = 'H', long, env = "LONTOD_HOST")]
    pub host: Option<String>,

    /// Port to listen on
    #[arg(short, long, env = "LONTOD_PORT")]
    pub port: Option<u16>,

    /// Reindex the given paths when they change
    #[arg(short, long)]
    pub watch: bool,

    /// Preferred label languages, most preferred first
    #[arg(short = 'L', long = "lang", env = "LONTOD_LANG", value_delimiter = ',')]
    pub languages: Vec<String>,

    /// Path prefix ontologies are served under
    #[arg(long, env = "LONTOD_ROUTE")]
    pub route: Option<String>,

    /// Address ontologies by query parameter or by path segment
    #[arg(long, value_name = "query|path")]
    pub identifier_style: Option<IdentifierStyle>,

    /// Public base URL used for concept lookups instead of the Host header
    #[arg(long, env = "LONTOD_PUBLIC_URL")]
    pub public_url: Option<String>,

    /// Do not reserve /.well-known/, /favicon.ico and /robots.txt
    #[arg(long)]
    pub insecure_skip_routes: bool,

    /// HTML inserted before the overview
    #[arg(long, env = "LONTOD_INDEX_HTML_HEADER")]
    pub index_html_header: Option<PathBuf>,

    /// HTML appended after the overview
    #[arg(long, env = "LONTOD_INDEX_HTML_FOOTER")]
    pub index_html_footer: Option<PathBuf>,

    /// Text inserted before the plain-text overview
    #[arg(long, env = "LONTOD_INDEX_TXT_HEADER")]
    pub index_txt_header: Option<PathBuf>,

    /// Text appended after the plain-text overview
    #[arg(long, env = "LONTOD_INDEX_TXT_FOOTER")]
    pub index_txt_footer: Option<PathBuf>,
}

impl ServeArgs {
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

        let server = &mut config.server;
        if let Some(host) = &self.host {
            server.host = host.clone();
        }
        if let Some(port) = self.port {
            server.port = port;
        }
        if let Some(route) = &self.route {
            server.route = route.clone();
        }
        if let Some(style) = self.identifier_style {
            server.identifier_style = style;
        }
        if let Some(url) = &self.public_url {
            server.public_url = Some(url.clone());
        }
        if self.insecure_skip_routes {
            server.insecure_skip_routes = true;
        }

        let snippets = &mut server.snippets;
        for (arg, slot) in [
            (&self.index_html_header, &mut snippets.html_header),
            (&self.index_html_footer, &mut snippets.html_footer),
            (&self.index_txt_header, &mut snippets.txt_header),
            (&self.index_txt_footer, &mut snippets.txt_footer),
        ] {
            if arg.is_some() {
                *slot = arg.clone();
            }
        }
    }
}

/// Run the serve command
pub async fn run(args: ServeArgs, mut config: LontodConfig) -> Result<()> {
    args.apply(&mut config);
    if args.watch && config.paths.is_empty() {
        return Err(ConfigError::WatchWithoutPaths.into());
    }
    let server_config = server_config(&config.server)?;

    let store = Arc::new(open_store(&config)?);
    let indexer = Arc::new(Indexer::new(store.clone(), config.languages.clone()));

    if !config.paths.is_empty() {
        let startup = indexer.clone();
        let paths = config.paths.clone();
        let report = tokio::task::spawn_blocking(move || startup.index_paths(&paths)).await?;
        if report.is_success() {
            info!(indexed = report.indexed.len(), "startup indexing complete");
        } else {
            warn!("startup indexing incomplete:\n{report}");
        }
    }

    let watcher = if args.watch {
        let reindexer = Arc::new(IndexerReindexer::new(indexer));
        Some(Watcher::spawn(&config.paths, reindexer, config.debounce)?)
    } else {
        None
    };

    info!(
        "Starting lontod server on {}:{}",
        server_config.host, server_config.port
    );
    let result = OntologyServer::new(store, server_config)
        .run(shutdown_signal())
        .await;

    if let Some(watcher) = watcher {
        watcher.shutdown().await;
    }
    result.map_err(Into::into)
}

async fn shutdown_signal() {
    match tokio::signal::ctrl_c().await {
        Ok(()) => info!("received Ctrl-C, shutting down"),
        Err(e) => {
            warn!(error = %e, "unable to listen for Ctrl-C");
            std::future::pending::<()>().await;
        }
    }
}
