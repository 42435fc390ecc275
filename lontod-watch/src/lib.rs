//! Keeps the ontology index in step with a live filesystem.
//!
//! Filesystem events flow from a `notify` watcher through a channel into a
//! debounce loop; each quiet period yields one batch for a [`Reindex`]
//! implementation.

mod debounce;
mod error;
mod reindex;
mod watcher;

pub use debounce::{Debouncer, WatchState};
pub use error::{Result, WatchError};
pub use reindex::{IndexerReindexer, Reindex};
pub use watcher::{DEFAULT_DEBOUNCE, Watcher};
