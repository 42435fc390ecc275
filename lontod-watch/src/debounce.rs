//! Debounce state machine and the loop that drives it.

use std::collections::BTreeSet;
use std::mem;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::{Instant, sleep_until};
use tracing::{debug, info, warn};

use crate::reindex::Reindex;

/// Where the watcher is in its debounce cycle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WatchState {
    Idle,
    /// Changes collected; reindex once `deadline` passes without new events.
    Pending {
        paths: BTreeSet<PathBuf>,
        deadline: Instant,
    },
    Reindexing,
}

/// Collapses bursts of change events into single reindex batches.
///
/// Each event restarts the quiet period. Events seen while a batch is being
/// reindexed are held back and start the next quiet period when it finishes.
#[derive(Debug)]
pub struct Debouncer {
    state: WatchState,
    queued: BTreeSet<PathBuf>,
    window: Duration,
}

impl Debouncer {
    pub fn new(window: Duration) -> Self {
        Self {
            state: WatchState::Idle,
            queued: BTreeSet::new(),
            window,
        }
    }

    pub fn state(&self) -> &WatchState {
        &self.state
    }

    /// When the pending batch becomes due, if there is one.
    pub fn deadline(&self) -> Option<Instant> {
        match &self.state {
            WatchState::Pending { deadline, .. } => Some(*deadline),
            _ => None,
        }
    }

    /// Record a change to `path` observed at `now`.
    pub fn record(&mut self, path: PathBuf, now: Instant) {
        match &mut self.state {
            WatchState::Idle => {
                self.state = WatchState::Pending {
                    paths: BTreeSet::from([path]),
                    deadline: now + self.window,
                };
            }
            WatchState::Pending { paths, deadline } => {
                paths.insert(path);
                *deadline = now + self.window;
            }
            WatchState::Reindexing => {
                self.queued.insert(path);
            }
        }
    }

    /// Take the pending batch if its deadline has passed, entering `Reindexing`.
    pub fn take_due(&mut self, now: Instant) -> Option<BTreeSet<PathBuf>> {
        match &self.state {
            WatchState::Pending { deadline, .. } if *deadline <= now => {}
            _ => return None,
        }
        match mem::replace(&mut self.state, WatchState::Reindexing) {
            WatchState::Pending { paths, .. } => Some(paths),
            _ => None,
        }
    }

    /// The running batch finished at `now`.
    pub fn finish(&mut self, now: Instant) {
        let queued = mem::take(&mut self.queued);
        self.state = if queued.is_empty() {
            WatchState::Idle
        } else {
            WatchState::Pending {
                paths: queued,
                deadline: now + self.window,
            }
        };
    }
}

/// Consume change events until the sender side closes.
///
/// Pending changes are discarded on shutdown; a batch already running is
/// allowed to finish.
pub(crate) async fn run<R: Reindex>(
    mut events: mpsc::Receiver<PathBuf>,
    reindexer: Arc<R>,
    window: Duration,
) {
    let mut debouncer = Debouncer::new(window);
    let mut running: Option<JoinHandle<()>> = None;

    loop {
        let deadline = debouncer.deadline();
        tokio::select! {
            event = events.recv() => match event {
                Some(path) => {
                    debug!(path = %path.display(), "change observed");
                    debouncer.record(path, Instant::now());
                }
                None => break,
            },
            _ = sleep_until(deadline.unwrap_or_else(Instant::now)), if deadline.is_some() => {
                if let Some(batch) = debouncer.take_due(Instant::now()) {
                    info!(files = batch.len(), "reindexing changed files");
                    let reindexer = reindexer.clone();
                    running = Some(tokio::spawn(async move { reindexer.reindex(batch).await }));
                }
            }
            _ = join(&mut running), if running.is_some() => {
                running = None;
                debouncer.finish(Instant::now());
            }
        }
    }

    if let Some(handle) = running {
        if let Err(e) = handle.await {
            warn!(error = %e, "reindex task failed during shutdown");
        }
    }
    debug!("watch loop stopped");
}

async fn join(handle: &mut Option<JoinHandle<()>>) {
    match handle {
        Some(handle) => {
            if let Err(e) = handle.await {
                warn!(error = %e, "reindex task failed");
            }
        }
        None => std::future::pending().await,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::sync::Mutex;

    const WINDOW: Duration = Duration::from_secs(1);

    #[test]
    fn test_events_extend_the_quiet_period() {
        let start = Instant::now();
        let mut debouncer = Debouncer::new(WINDOW);
        debouncer.record(PathBuf::from("a.ttl"), start);
        debouncer.record(PathBuf::from("a.ttl"), start + Duration::from_millis(600));

        assert_eq!(debouncer.deadline(), Some(start + Duration::from_millis(1600)));
        assert!(debouncer.take_due(start + WINDOW).is_none());

        let batch = debouncer.take_due(start + Duration::from_millis(1600)).unwrap();
        assert_eq!(batch.len(), 1);
        assert_eq!(debouncer.state(), &WatchState::Reindexing);
    }

    #[test]
    fn test_changes_during_reindex_start_next_cycle() {
        let start = Instant::now();
        let mut debouncer = Debouncer::new(WINDOW);
        debouncer.record(PathBuf::from("a.ttl"), start);
        debouncer.take_due(start + WINDOW).unwrap();

        debouncer.record(PathBuf::from("b.ttl"), start + WINDOW);
        assert_eq!(debouncer.state(), &WatchState::Reindexing);

        let done = start + Duration::from_secs(2);
        debouncer.finish(done);
        assert_eq!(
            debouncer.state(),
            &WatchState::Pending {
                paths: BTreeSet::from([PathBuf::from("b.ttl")]),
                deadline: done + WINDOW,
            }
        );
    }

    #[test]
    fn test_finish_without_queued_changes_goes_idle() {
        let start = Instant::now();
        let mut debouncer = Debouncer::new(WINDOW);
        debouncer.record(PathBuf::from("a.ttl"), start);
        debouncer.take_due(start + WINDOW).unwrap();
        debouncer.finish(start + WINDOW);
        assert_eq!(debouncer.state(), &WatchState::Idle);
        assert_eq!(debouncer.deadline(), None);
    }

    /// Records every batch; each reindex takes `delay`.
    struct MockReindexer {
        batches: Mutex<Vec<BTreeSet<PathBuf>>>,
        delay: Duration,
    }

    impl MockReindexer {
        fn new(delay: Duration) -> Arc<Self> {
            Arc::new(Self {
                batches: Mutex::new(Vec::new()),
                delay,
            })
        }

        fn batches(&self) -> Vec<BTreeSet<PathBuf>> {
            self.batches.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl Reindex for MockReindexer {
        async fn reindex(&self, paths: BTreeSet<PathBuf>) {
            tokio::time::sleep(self.delay).await;
            self.batches.lock().unwrap().push(paths);
        }
    }

    fn set(paths: &[&str]) -> BTreeSet<PathBuf> {
        paths.iter().map(PathBuf::from).collect()
    }

    #[tokio::test(start_paused = true)]
    async fn test_burst_triggers_one_reindex() {
        let reindexer = MockReindexer::new(Duration::ZERO);
        let (tx, rx) = mpsc::channel(16);
        let task = tokio::spawn(run(rx, reindexer.clone(), WINDOW));

        for _ in 0..3 {
            tx.send(PathBuf::from("a.ttl")).await.unwrap();
            tokio::time::sleep(Duration::from_millis(200)).await;
        }
        tx.send(PathBuf::from("b.ttl")).await.unwrap();
        tokio::time::sleep(Duration::from_secs(3)).await;

        assert_eq!(reindexer.batches(), vec![set(&["a.ttl", "b.ttl"])]);

        drop(tx);
        task.await.unwrap();
    }

    #[tokio::test(start_paused = true)]
    async fn test_no_reindex_before_quiet_period() {
        let reindexer = MockReindexer::new(Duration::ZERO);
        let (tx, rx) = mpsc::channel(16);
        let _task = tokio::spawn(run(rx, reindexer.clone(), WINDOW));

        tx.send(PathBuf::from("a.ttl")).await.unwrap();
        tokio::time::sleep(Duration::from_millis(900)).await;
        assert!(reindexer.batches().is_empty());

        tokio::time::sleep(Duration::from_millis(200)).await;
        assert_eq!(reindexer.batches().len(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_events_during_reindex_are_queued() {
        let reindexer = MockReindexer::new(Duration::from_millis(500));
        let (tx, rx) = mpsc::channel(16);
        let task = tokio::spawn(run(rx, reindexer.clone(), WINDOW));

        tx.send(PathBuf::from("a.ttl")).await.unwrap();
        // reindex of a.ttl runs from 1.0s to 1.5s
        tokio::time::sleep(Duration::from_millis(1200)).await;
        tx.send(PathBuf::from("b.ttl")).await.unwrap();
        assert!(reindexer.batches().is_empty());

        tokio::time::sleep(Duration::from_secs(5)).await;
        assert_eq!(reindexer.batches(), vec![set(&["a.ttl"]), set(&["b.ttl"])]);

        drop(tx);
        task.await.unwrap();
    }

    #[tokio::test(start_paused = true)]
    async fn test_shutdown_waits_for_running_batch() {
        let reindexer = MockReindexer::new(Duration::from_millis(500));
        let (tx, rx) = mpsc::channel(16);
        let task = tokio::spawn(run(rx, reindexer.clone(), WINDOW));

        tx.send(PathBuf::from("a.ttl")).await.unwrap();
        tokio::time::sleep(Duration::from_millis(1100)).await;
        drop(tx);
        task.await.unwrap();

        assert_eq!(reindexer.batches().len(), 1);
    }
}
