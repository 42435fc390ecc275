//! Filesystem watcher feeding the debounce loop.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use lontod_core::Format;
use notify::{Event, EventKind, RecommendedWatcher, RecursiveMode, Watcher as _};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::debounce;
use crate::error::{Result, WatchError};
use crate::reindex::Reindex;

/// Quiet period before a burst of changes is reindexed.
pub const DEFAULT_DEBOUNCE: Duration = Duration::from_secs(1);

/// A running watch loop. Dropping it stops watching.
pub struct Watcher {
    _watcher: RecommendedWatcher,
    task: JoinHandle<()>,
}

impl Watcher {
    /// Watch `roots` (directories one level deep, or single files) and hand
    /// each debounced batch of changed ontology files to `reindexer`.
    ///
    /// Must be called from within a tokio runtime.
    pub fn spawn<R: Reindex>(
        roots: &[PathBuf],
        reindexer: Arc<R>,
        debounce: Duration,
    ) -> Result<Self> {
        let (tx, rx) = mpsc::channel::<PathBuf>(256);

        let mut watcher = notify::recommended_watcher(move |res: notify::Result<Event>| match res {
            Ok(event) => {
                if !is_relevant(&event.kind) {
                    return;
                }
                for path in event.paths {
                    if is_ontology_file(&path) {
                        // receiver gone means the loop is shutting down
                        let _ = tx.blocking_send(path);
                    }
                }
            }
            Err(e) => warn!(error = %e, "file watcher error"),
        })?;

        for root in roots {
            if !root.exists() {
                return Err(WatchError::Missing(root.clone()));
            }
            watcher.watch(root, RecursiveMode::NonRecursive)?;
            info!(path = %root.display(), "watching for changes");
        }

        let task = tokio::spawn(debounce::run(rx, reindexer, debounce));
        Ok(Self {
            _watcher: watcher,
            task,
        })
    }

    /// Stop watching and wait for a running reindex to finish.
    pub async fn shutdown(self) {
        let Self { _watcher, task } = self;
        drop(_watcher);
        if let Err(e) = task.await {
            warn!(error = %e, "watch loop ended abnormally");
        }
        debug!("watcher shut down");
    }
}

fn is_relevant(kind: &EventKind) -> bool {
    matches!(
        kind,
        EventKind::Create(_) | EventKind::Modify(_) | EventKind::Remove(_)
    )
}

/// Visible files with a recognised ontology extension.
fn is_ontology_file(path: &Path) -> bool {
    let hidden = path
        .file_name()
        .and_then(|name| name.to_str())
        .is_none_or(|name| name.starts_with('.'));
    !hidden && Format::from_path(path).is_some()
}

#[cfg(test)]
mod tests {
    use super::*;
    use notify::event::{AccessKind, CreateKind};

    #[test]
    fn test_only_ontology_files_pass() {
        assert!(is_ontology_file(Path::new("/data/onto.ttl")));
        assert!(is_ontology_file(Path::new("/data/shapes.rdf")));
        assert!(!is_ontology_file(Path::new("/data/.onto.ttl.swp")));
        assert!(!is_ontology_file(Path::new("/data/.hidden.ttl")));
        assert!(!is_ontology_file(Path::new("/data/notes.txt")));
    }

    #[test]
    fn test_access_events_are_ignored() {
        assert!(is_relevant(&EventKind::Create(CreateKind::File)));
        assert!(!is_relevant(&EventKind::Access(AccessKind::Any)));
    }
}
