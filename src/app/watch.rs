// LogStudio - app/watch.rs
//
// File change notifications for open log files.
//
// Architecture:
//   - `WatchManager` lives on the caller's thread; one background thread per
//     watched path polls the file's size and modification time.
//   - Each thread has its own `Arc<AtomicBool>` cancel flag so a single path
//     can be unwatched without disturbing the others.
//   - All threads share one mpsc channel; the caller drains it with
//     `poll_events` (same pattern as a scan/tail manager).
//
// Robustness:
//   - A stat failure (file deleted, permissions) sends one `Error` event and
//     keeps polling; when the file reappears with different metadata a
//     `Changed` event follows.
//   - Several changes seen between two drains collapse into one `Changed`
//     event per path, so callers never queue overlapping reloads.
//   - The poll loop sleeps in small slices so cancellation is prompt.

use crate::core::model::WatchEvent;
use crate::platform::fs::{file_stat, FileStat};
use crate::util::constants::WATCH_CANCEL_CHECK_INTERVAL_MS;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{mpsc, Arc};
use std::time::Duration;

/// Result of a `watch` request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WatchResult {
    Started,
    AlreadyWatching,
}

/// Manages background pollers for a set of files.
pub struct WatchManager {
    interval_ms: u64,
    tx: mpsc::Sender<WatchEvent>,
    rx: mpsc::Receiver<WatchEvent>,
    watchers: HashMap<PathBuf, Arc<AtomicBool>>,
}

impl WatchManager {
    /// Create a manager whose pollers check their file every `interval_ms`.
    pub fn new(interval_ms: u64) -> Self {
        let (tx, rx) = mpsc::channel();
        Self {
            interval_ms,
            tx,
            rx,
            watchers: HashMap::new(),
        }
    }

    /// Start watching `path`. Watching a path twice is a no-op.
    pub fn watch(&mut self, path: &Path) -> WatchResult {
        if self.watchers.contains_key(path) {
            tracing::debug!(file = %path.display(), "Already watching");
            return WatchResult::AlreadyWatching;
        }

        let cancel = Arc::new(AtomicBool::new(false));
        self.watchers.insert(path.to_path_buf(), Arc::clone(&cancel));

        let tx = self.tx.clone();
        let owned = path.to_path_buf();
        let interval_ms = self.interval_ms;
        std::thread::spawn(move || {
            run_poller(owned, interval_ms, tx, cancel);
        });

        tracing::info!(file = %path.display(), interval_ms, "Watching file");
        WatchResult::Started
    }

    /// Stop watching `path`. Returns false if it was not being watched.
    pub fn unwatch(&mut self, path: &Path) -> bool {
        match self.watchers.remove(path) {
            Some(flag) => {
                flag.store(true, Ordering::SeqCst);
                tracing::info!(file = %path.display(), "Stopped watching file");
                true
            }
            None => false,
        }
    }

    /// Stop every poller.
    pub fn unwatch_all(&mut self) {
        for (_, flag) in self.watchers.drain() {
            flag.store(true, Ordering::SeqCst);
        }
    }

    pub fn is_watching(&self, path: &Path) -> bool {
        self.watchers.contains_key(path)
    }

    pub fn watched_count(&self) -> usize {
        self.watchers.len()
    }

    /// Drain pending events without blocking.
    ///
    /// `Changed` events are coalesced to one per path (first-seen order);
    /// events for paths that are no longer watched are dropped.
    pub fn poll_events(&self) -> Vec<WatchEvent> {
        let mut events: Vec<WatchEvent> = Vec::new();
        while let Ok(event) = self.rx.try_recv() {
            if !self.watchers.contains_key(event.path()) {
                continue;
            }
            let duplicate = matches!(event, WatchEvent::Changed { .. })
                && events.iter().any(|e| {
                    matches!(e, WatchEvent::Changed { .. }) && e.path() == event.path()
                });
            if !duplicate {
                events.push(event);
            }
        }
        events
    }
}

impl Drop for WatchManager {
    fn drop(&mut self) {
        self.unwatch_all();
    }
}

// =============================================================================
// Background poller
// =============================================================================

fn run_poller(
    path: PathBuf,
    interval_ms: u64,
    tx: mpsc::Sender<WatchEvent>,
    cancel: Arc<AtomicBool>,
) {
    // Seed with the current metadata so only later changes are reported.
    let mut last: Option<FileStat> = file_stat(&path).ok();
    let mut in_error = last.is_none();

    let slice_ms = WATCH_CANCEL_CHECK_INTERVAL_MS.min(interval_ms.max(1));
    let slices = (interval_ms / slice_ms).max(1);

    loop {
        for _ in 0..slices {
            std::thread::sleep(Duration::from_millis(slice_ms));
            if cancel.load(Ordering::SeqCst) {
                tracing::debug!(file = %path.display(), "Watcher stopped");
                return;
            }
        }

        match file_stat(&path) {
            Ok(stat) => {
                in_error = false;
                if last != Some(stat) {
                    tracing::debug!(
                        file = %path.display(),
                        size = stat.len,
                        "Watcher: change detected"
                    );
                    last = Some(stat);
                    if tx.send(WatchEvent::Changed { path: path.clone() }).is_err() {
                        return;
                    }
                }
            }
            Err(e) => {
                if !in_error {
                    in_error = true;
                    tracing::warn!(file = %path.display(), error = %e, "Watcher: cannot stat file");
                    let event = WatchEvent::Error {
                        path: path.clone(),
                        message: format!("Cannot stat: {e}"),
                    };
                    if tx.send(event).is_err() {
                        return;
                    }
                }
                // Forget the old metadata so a recreated file of the same
                // size still counts as a change.
                last = None;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use std::time::Instant;
    use tempfile::TempDir;

    fn wait_for_events(manager: &WatchManager) -> Vec<WatchEvent> {
        let deadline = Instant::now() + Duration::from_secs(5);
        loop {
            let events = manager.poll_events();
            if !events.is_empty() || Instant::now() > deadline {
                return events;
            }
            std::thread::sleep(Duration::from_millis(20));
        }
    }

    #[test]
    fn test_watch_twice_reports_already_watching() {
        let dir = TempDir::new().expect("tmpdir");
        let path = dir.path().join("a.log");
        fs::write(&path, "x").expect("write");

        let mut manager = WatchManager::new(50);
        assert_eq!(manager.watch(&path), WatchResult::Started);
        assert_eq!(manager.watch(&path), WatchResult::AlreadyWatching);
        assert_eq!(manager.watched_count(), 1);

        assert!(manager.unwatch(&path));
        assert!(!manager.unwatch(&path));
        assert!(!manager.is_watching(&path));
    }

    #[test]
    fn test_append_produces_changed_event() {
        let dir = TempDir::new().expect("tmpdir");
        let path = dir.path().join("a.log");
        fs::write(&path, "one\n").expect("write");

        let mut manager = WatchManager::new(50);
        manager.watch(&path);
        std::thread::sleep(Duration::from_millis(100));
        fs::write(&path, "one\ntwo\n").expect("write");

        let events = wait_for_events(&manager);
        assert_eq!(events, vec![WatchEvent::Changed { path: path.clone() }]);
    }

    #[test]
    fn test_deleted_file_produces_error_event() {
        let dir = TempDir::new().expect("tmpdir");
        let path = dir.path().join("gone.log");
        fs::write(&path, "one\n").expect("write");

        let mut manager = WatchManager::new(50);
        manager.watch(&path);
        std::thread::sleep(Duration::from_millis(100));
        fs::remove_file(&path).expect("remove");

        let events = wait_for_events(&manager);
        assert!(matches!(events.first(), Some(WatchEvent::Error { .. })));
    }

    #[test]
    fn test_poll_coalesces_changes_per_path() {
        let mut manager = WatchManager::new(60_000);
        let a = PathBuf::from("/virtual/a.log");
        let b = PathBuf::from("/virtual/b.log");
        manager.watch(&a);
        manager.watch(&b);

        for p in [&a, &b, &a, &a] {
            manager
                .tx
                .send(WatchEvent::Changed { path: p.clone() })
                .unwrap();
        }
        manager
            .tx
            .send(WatchEvent::Changed {
                path: PathBuf::from("/virtual/unwatched.log"),
            })
            .unwrap();

        let events = manager.poll_events();
        assert_eq!(
            events,
            vec![
                WatchEvent::Changed { path: a.clone() },
                WatchEvent::Changed { path: b.clone() },
            ]
        );
    }
}
