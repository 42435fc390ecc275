//! Shared fixtures for lontod-core integration tests

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use lontod_core::{IndexStore, Indexer};
use tempfile::TempDir;

/// Fixture files shipped with the tests
pub const FIXTURES: [&str; 7] = [
    "onto.ttl",
    "shapes.rdf",
    "colors.jsonld",
    "palette.jsonld",
    "restricted.ttl",
    "terms.nt",
    "broken.ttl",
];

pub fn fixture_path(name: &str) -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("fixtures")
        .join(name)
}

/// Copies the named fixtures into a fresh temporary directory
pub fn fixture_dir(names: &[&str]) -> TempDir {
    let dir = tempfile::tempdir().unwrap();
    for name in names {
        fs::copy(fixture_path(name), dir.path().join(name)).unwrap();
    }
    dir
}

/// An indexer over a fresh in-memory store
pub fn memory_indexer() -> Indexer {
    Indexer::new(
        Arc::new(IndexStore::open_in_memory().unwrap()),
        vec!["en".to_string()],
    )
}
