//! Shared application state for the ontology server

use std::sync::Arc;

use lontod_core::IndexStore;

use crate::config::ServerConfig;
use crate::resolve::Resolver;

/// Shared application state accessible by all handlers
#[derive(Clone)]
pub struct AppState {
    /// The index the server answers from
    pub store: Arc<IndexStore>,
    pub config: Arc<ServerConfig>,
}

impl AppState {
    pub fn new(store: Arc<IndexStore>, config: ServerConfig) -> Self {
        Self {
            store,
            config: Arc::new(config),
        }
    }

    pub fn resolver(&self) -> Resolver<'_> {
        Resolver::new(&self.store, &self.config)
    }
}
