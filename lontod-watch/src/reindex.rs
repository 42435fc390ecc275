//! What the watcher does with a debounced batch of changed paths.

use std::collections::BTreeSet;
use std::path::PathBuf;
use std::sync::Arc;

use async_trait::async_trait;
use lontod_core::Indexer;
use tracing::{error, info, warn};

/// Receives each debounced batch of changed paths.
#[async_trait]
pub trait Reindex: Send + Sync + 'static {
    async fn reindex(&self, paths: BTreeSet<PathBuf>);
}

/// Re-indexes files that still exist and forgets the ones that were removed.
pub struct IndexerReindexer {
    indexer: Arc<Indexer>,
}

impl IndexerReindexer {
    pub fn new(indexer: Arc<Indexer>) -> Self {
        Self { indexer }
    }
}

#[async_trait]
impl Reindex for IndexerReindexer {
    async fn reindex(&self, paths: BTreeSet<PathBuf>) {
        let indexer = self.indexer.clone();
        let result = tokio::task::spawn_blocking(move || {
            let (present, removed): (Vec<PathBuf>, Vec<PathBuf>) =
                paths.into_iter().partition(|path| path.exists());

            for path in &removed {
                if let Err(e) = indexer.remove_path(path) {
                    error!(path = %path.display(), error = %e, "unable to remove ontology");
                }
            }
            let report = indexer.index_paths(&present);
            info!(
                indexed = report.indexed.len(),
                failed = report.failed.len(),
                removed = removed.len(),
                "reindex complete"
            );
        })
        .await;

        if let Err(e) = result {
            warn!(error = %e, "reindex task panicked");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use lontod_core::IndexStore;
    use std::fs;

    const ONTO: &str = r#"
        @prefix owl: <http://www.w3.org/2002/07/owl#> .
        <http://example.org/watched#> a owl:Ontology .
        <http://example.org/watched#Thing> a owl:Class .
    "#;

    #[tokio::test]
    async fn test_reindex_adds_and_removes() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("watched.ttl");
        fs::write(&path, ONTO).unwrap();

        let store = Arc::new(IndexStore::open_in_memory().unwrap());
        let indexer = Arc::new(Indexer::new(store.clone(), vec![]));
        let reindexer = IndexerReindexer::new(indexer);

        reindexer.reindex(BTreeSet::from([path.clone()])).await;
        assert_eq!(store.list_ontologies().unwrap().len(), 1);

        fs::remove_file(&path).unwrap();
        reindexer.reindex(BTreeSet::from([path])).await;
        assert!(store.list_ontologies().unwrap().is_empty());
    }
}
