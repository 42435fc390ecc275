pub mod convert;
pub mod index;
pub mod serve;

use std::path::PathBuf;

use anyhow::Result;
use lontod_core::IndexStore;

use crate::config::{DEFAULT_DATABASE, LontodConfig};

/// Open the configured database; without one, paths to index mean memory
/// and no paths mean the default file.
pub fn open_store(config: &LontodConfig) -> Result<IndexStore> {
    let store = match (&config.database, config.paths.is_empty()) {
        (Some(path), _) => IndexStore::open(path)?,
        (None, false) => IndexStore::open_in_memory()?,
        (None, true) => IndexStore::open(PathBuf::from(DEFAULT_DATABASE))?,
    };
    Ok(store)
}
