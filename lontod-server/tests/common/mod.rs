//! Shared test utilities for lontod-server integration tests

use std::fs;
use std::net::SocketAddr;
use std::sync::Arc;

use axum_test::TestServer;
use lontod_core::{IndexStore, Indexer};
use lontod_server::{AppState, OntologyServer, ServerConfig, create_router};
use tempfile::TempDir;
use tokio::net::TcpListener;

pub const ONTO: &str = r#"
@prefix owl: <http://www.w3.org/2002/07/owl#> .
@prefix rdfs: <http://www.w3.org/2000/01/rdf-schema#> .

<http://example.org/onto> a owl:Ontology ;
    rdfs:label "Example ontology"@en ;
    owl:versionIRI <http://example.org/onto/1.0> .

<http://example.org/onto/Widget> a owl:Class ;
    rdfs:label "Widget"@en .

<http://example.org/onto/weight> a owl:DatatypeProperty ;
    rdfs:label "weight"@en .
"#;

/// Same vocabulary with hash IRIs, as most OWL files write it.
#[allow(dead_code)]
pub const HASH_ONTO: &str = r#"
@prefix owl: <http://www.w3.org/2002/07/owl#> .
@prefix rdfs: <http://www.w3.org/2000/01/rdf-schema#> .

<http://example.org/onto#> a owl:Ontology ;
    rdfs:label "Example ontology"@en .

<http://example.org/onto#Widget> a owl:Class ;
    rdfs:label "Widget"@en .
"#;

/// An in-memory store holding the given `(file name, turtle)` documents.
pub fn store_with(files: &[(&str, &str)]) -> Arc<IndexStore> {
    let dir = TempDir::new().unwrap();
    let paths: Vec<_> = files
        .iter()
        .map(|(name, content)| {
            let path = dir.path().join(name);
            fs::write(&path, content).unwrap();
            path
        })
        .collect();

    let store = Arc::new(IndexStore::open_in_memory().unwrap());
    let report = Indexer::new(store.clone(), vec!["en".into()]).index_paths(&paths);
    assert!(report.is_success(), "{report}");
    store
}

/// An in-memory store holding the `onto` ontology.
pub fn indexed_store() -> Arc<IndexStore> {
    store_with(&[("onto.ttl", ONTO)])
}

/// Router-level test server over `store`.
#[allow(dead_code)]
pub fn server_over(store: Arc<IndexStore>, config: ServerConfig) -> TestServer {
    let state = Arc::new(AppState::new(store, config));
    TestServer::new(create_router(state)).unwrap()
}

/// Router-level test server over [`indexed_store`].
#[allow(dead_code)]
pub fn test_server(config: ServerConfig) -> TestServer {
    server_over(indexed_store(), config)
}

/// Spawns a real server on an ephemeral port, returns its address
#[allow(dead_code)]
pub async fn spawn_server(config: ServerConfig) -> SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let server = OntologyServer::new(indexed_store(), config);

    tokio::spawn(async move {
        let _ = server
            .run_with_listener(listener, std::future::pending())
            .await;
    });

    // Brief delay to ensure server is accepting connections
    tokio::time::sleep(std::time::Duration::from_millis(10)).await;

    addr
}
