//! End-to-end watching against a real directory.

use std::fs;
use std::sync::Arc;
use std::time::Duration;

use lontod_core::{IndexStore, Indexer};
use lontod_watch::{IndexerReindexer, WatchError, Watcher};

const ONTO: &str = r#"
    @prefix owl: <http://www.w3.org/2002/07/owl#> .
    <http://example.org/live#> a owl:Ontology .
    <http://example.org/live#Thing> a owl:Class .
"#;

async fn wait_for(store: &IndexStore, count: usize) -> bool {
    for _ in 0..100 {
        if store.list_ontologies().unwrap().len() == count {
            return true;
        }
        tokio::time::sleep(Duration::from_millis(50)).await;
    }
    false
}

#[tokio::test(flavor = "multi_thread")]
async fn test_new_and_removed_files_reach_the_index() {
    let dir = tempfile::tempdir().unwrap();
    let store = Arc::new(IndexStore::open_in_memory().unwrap());
    let indexer = Arc::new(Indexer::new(store.clone(), vec![]));
    let reindexer = Arc::new(IndexerReindexer::new(indexer));

    let watcher = Watcher::spawn(
        &[dir.path().to_path_buf()],
        reindexer,
        Duration::from_millis(100),
    )
    .unwrap();

    let path = dir.path().join("live.ttl");
    fs::write(&path, ONTO).unwrap();
    assert!(wait_for(&store, 1).await, "created file was not indexed");
    assert_eq!(
        store.resolve_ontology("http://example.org/live#").unwrap().as_deref(),
        Some("live")
    );

    fs::remove_file(&path).unwrap();
    assert!(wait_for(&store, 0).await, "removed file was not dropped");

    watcher.shutdown().await;
}

#[tokio::test]
async fn test_missing_root_is_rejected() {
    let dir = tempfile::tempdir().unwrap();
    let store = Arc::new(IndexStore::open_in_memory().unwrap());
    let reindexer = Arc::new(IndexerReindexer::new(Arc::new(Indexer::new(store, vec![]))));

    let result = Watcher::spawn(
        &[dir.path().join("nope")],
        reindexer,
        Duration::from_millis(100),
    );
    assert!(matches!(result, Err(WatchError::Missing(_))));
}
