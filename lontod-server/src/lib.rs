//! lontod-server - serves indexed ontologies over HTTP
//!
//! Requests on the configured route resolve to a stored representation via
//! content negotiation; any other path is looked up as a concept IRI and
//! redirected to the page that defines it.

pub mod config;
mod error;
pub mod http;
pub mod overview;
pub mod resolve;
mod state;

use std::future::Future;
use std::sync::Arc;

use lontod_core::IndexStore;
use tokio::net::TcpListener;

pub use config::{IdentifierStyle, ServerConfig, Snippets};
pub use error::ServerError;
pub use http::create_router;
pub use resolve::{OntologyRequest, Resolution, Resolver};
pub use state::AppState;

/// The ontology server
pub struct OntologyServer {
    state: Arc<AppState>,
}

impl OntologyServer {
    pub fn new(store: Arc<IndexStore>, config: ServerConfig) -> Self {
        Self {
            state: Arc::new(AppState::new(store, config)),
        }
    }

    /// Get the server configuration
    pub fn config(&self) -> &ServerConfig {
        &self.state.config
    }

    /// Get the shared application state
    pub fn state(&self) -> Arc<AppState> {
        Arc::clone(&self.state)
    }

    /// Run the server, binding to the configured address, until `shutdown`
    /// resolves
    pub async fn run<F>(self, shutdown: F) -> Result<(), ServerError>
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let addr = self.state.config.addr();
        let listener = TcpListener::bind(&addr)
            .await
            .map_err(|e| ServerError::Bind {
                addr: addr.clone(),
                source: e,
            })?;
        self.run_with_listener(listener, shutdown).await
    }

    /// Run the server with a pre-bound listener
    pub async fn run_with_listener<F>(
        self,
        listener: TcpListener,
        shutdown: F,
    ) -> Result<(), ServerError>
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let local = listener
            .local_addr()
            .map(|addr| addr.to_string())
            .unwrap_or_else(|_| self.state.config.addr());
        tracing::info!(
            addr = %local,
            route = %self.state.config.route(),
            "lontod server listening"
        );

        let router = create_router(self.state);
        axum::serve(listener, router)
            .with_graceful_shutdown(shutdown)
            .await
            .map_err(|e| ServerError::Internal(e.to_string()))?;

        tracing::info!("lontod server stopped");
        Ok(())
    }
}
