//! Live directory watching.
//!
//! One [`DirectoryWatcher`] keeps one watched root in sync with its
//! index: an initial crawl, then filesystem notifications queued
//! until the directory has been quiet for the debounce interval and
//! replayed as a single batch.
//!
//! The watch loop waits on three things at once: the next raw
//! event, the idle timer and the shutdown signal.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::{Duration, Instant};

use notify::event::{ModifyKind, RenameMode};
use notify::{recommended_watcher, Event, EventKind, RecommendedWatcher, RecursiveMode, Watcher};
use tokio::sync::{mpsc, watch};

use super::walker::{uri_path, FileWalker};
use crate::core::error::{GnosisError, Result};
use crate::core::types::{CrawlStats, UpdateOutcome};

/// Destination for page changes found by a watcher
pub trait IndexSink: Send + Sync + 'static {
    /// Parse `file` and store it under `uri`
    fn update(&self, file: &Path, uri: &str) -> Result<UpdateOutcome>;

    /// Drop whatever is stored under `uri`
    fn delete(&self, uri: &str) -> Result<()>;

    /// Drop every page whose URI starts with `prefix`, returning
    /// how many were removed
    fn delete_prefix(&self, prefix: &str) -> Result<usize>;
}

/// A reconciled change to one file
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WatchAction {
    Update(PathBuf),
    Delete(PathBuf),
}

impl WatchAction {
    pub fn path(&self) -> &Path {
        match self {
            WatchAction::Update(path) | WatchAction::Delete(path) => path,
        }
    }
}

/// Watches one filesystem root served under one URI prefix
pub struct DirectoryWatcher {
    root: PathBuf,
    prefix: String,
    walker: FileWalker,
    debounce: Duration,
    events: mpsc::UnboundedReceiver<notify::Result<Event>>,
    // Dropping the notify watcher ends the event stream
    _watcher: Option<RecommendedWatcher>,
}

impl DirectoryWatcher {
    /// Subscribe to changes below `root`
    ///
    /// The root is canonicalized first so event paths and crawl
    /// paths share one form. Events that arrive before
    /// [`watch`](Self::watch) starts are queued, not lost.
    pub fn new(
        root: &Path,
        prefix: impl Into<String>,
        extension: impl Into<String>,
        debounce: Duration,
    ) -> Result<Self> {
        let watcher_err = |message: String| GnosisError::Watcher {
            path: root.to_path_buf(),
            message,
        };

        let root = root
            .canonicalize()
            .map_err(|e| watcher_err(format!("Cannot resolve watch root: {e}")))?;

        let (tx, events) = mpsc::unbounded_channel();
        let mut watcher = recommended_watcher(move |event: notify::Result<Event>| {
            // Receiver gone means the watcher is shutting down
            let _ = tx.send(event);
        })
        .map_err(|e| watcher_err(format!("Failed to create filesystem watcher: {e}")))?;

        watcher
            .watch(&root, RecursiveMode::Recursive)
            .map_err(|e| watcher_err(format!("Failed to watch directory: {e}")))?;

        let mut dir_watcher = Self::from_channel(root, prefix, extension, debounce, events);
        dir_watcher._watcher = Some(watcher);
        Ok(dir_watcher)
    }

    fn from_channel(
        root: PathBuf,
        prefix: impl Into<String>,
        extension: impl Into<String>,
        debounce: Duration,
        events: mpsc::UnboundedReceiver<notify::Result<Event>>,
    ) -> Self {
        Self {
            root,
            prefix: prefix.into(),
            walker: FileWalker::new(extension),
            debounce,
            events,
            _watcher: None,
        }
    }

    /// Canonical root being watched
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Index every page below the root
    ///
    /// Files that fail to parse are logged and skipped. The crawl
    /// stops early once `shutdown` is raised.
    pub async fn crawl(
        &self,
        sink: Arc<dyn IndexSink>,
        shutdown: watch::Receiver<bool>,
    ) -> CrawlStats {
        let root = self.root.clone();
        let prefix = self.prefix.clone();
        let files = self.walker.collect_files(&root);

        let task = tokio::task::spawn_blocking(move || {
            let start = Instant::now();
            let mut stats = CrawlStats::default();
            let total = files.len();

            for (i, file) in files.iter().enumerate() {
                if *shutdown.borrow() {
                    tracing::info!("Crawl of {:?} interrupted by shutdown", root);
                    break;
                }

                let uri = uri_path(file, &root, &prefix);
                match sink.update(file, &uri) {
                    Ok(UpdateOutcome::Indexed) => stats.indexed += 1,
                    Ok(UpdateOutcome::Excluded) => stats.excluded += 1,
                    Err(e) => {
                        tracing::warn!("Skipping {:?}: {}", file, e);
                        stats.skipped += 1;
                    }
                }

                if (i + 1) % 100 == 0 {
                    tracing::info!("Crawled {}/{} pages in {:?}", i + 1, total, root);
                }
            }

            stats.duration_ms = start.elapsed().as_millis() as u64;
            stats
        });

        match task.await {
            Ok(stats) => {
                tracing::info!(
                    "Crawled {:?}: {} indexed, {} excluded, {} skipped in {}ms",
                    self.root,
                    stats.indexed,
                    stats.excluded,
                    stats.skipped,
                    stats.duration_ms
                );
                stats
            }
            Err(e) => {
                tracing::warn!("Crawl of {:?} failed: {}", self.root, e);
                CrawlStats::default()
            }
        }
    }

    /// Apply filesystem changes until `shutdown` is raised
    pub async fn watch(mut self, sink: Arc<dyn IndexSink>, mut shutdown: watch::Receiver<bool>) {
        tracing::info!("Watching {:?} for changes...", self.root);

        let idle = tokio::time::sleep(self.debounce);
        tokio::pin!(idle);
        let mut pending: Vec<Event> = Vec::new();

        loop {
            if *shutdown.borrow() {
                break;
            }

            tokio::select! {
                biased;

                changed = shutdown.changed() => {
                    if changed.is_err() {
                        break;
                    }
                }

                event = self.events.recv() => match event {
                    Some(Ok(event)) => {
                        pending.push(event);
                        idle.as_mut().reset(tokio::time::Instant::now() + self.debounce);
                    }
                    Some(Err(e)) => tracing::warn!("Watch error in {:?}: {}", self.root, e),
                    None => break,
                },

                () = &mut idle, if !pending.is_empty() => {
                    let batch = std::mem::take(&mut pending);
                    self.apply(batch, Arc::clone(&sink)).await;
                }
            }
        }

        if !pending.is_empty() {
            tracing::debug!(
                "Dropping {} queued events for {:?} on shutdown",
                pending.len(),
                self.root
            );
        }
        tracing::info!("Stopped watching {:?}", self.root);
    }

    /// Replay one quiet-period batch against the sink
    ///
    /// Files are held to the same rules as the crawl. A directory
    /// that appears is crawled, and one that disappears takes every
    /// page below it along.
    async fn apply(&self, batch: Vec<Event>, sink: Arc<dyn IndexSink>) {
        let actions = coalesce(
            batch
                .iter()
                .flat_map(actions_for_event)
                .filter(|action| {
                    let path = action.path();
                    self.walker.accepts(&self.root, path) || self.walker.accepts_dir(&self.root, path)
                }),
        );
        if actions.is_empty() {
            return;
        }

        let root = self.root.clone();
        let prefix = self.prefix.clone();
        let walker = self.walker.clone();
        let task = tokio::task::spawn_blocking(move || {
            for action in actions {
                match action {
                    WatchAction::Update(dir) if dir.is_dir() => {
                        for file in walker.collect_files(&dir) {
                            update(sink.as_ref(), &file, &uri_path(&file, &root, &prefix));
                        }
                    }
                    WatchAction::Update(file) => {
                        if walker.accepts(&root, &file) {
                            update(sink.as_ref(), &file, &uri_path(&file, &root, &prefix));
                        }
                    }
                    WatchAction::Delete(path) => {
                        let uri = uri_path(&path, &root, &prefix);
                        if walker.accepts(&root, &path) {
                            match sink.delete(&uri) {
                                Ok(()) => tracing::debug!("delete: {}", uri),
                                Err(e) => tracing::warn!("Failed to delete {}: {}", uri, e),
                            }
                        } else {
                            // Might have been a directory
                            let below = format!("{}/", uri.trim_end_matches('/'));
                            match sink.delete_prefix(&below) {
                                Ok(0) => {}
                                Ok(n) => tracing::debug!("delete: {} pages under {}", n, below),
                                Err(e) => tracing::warn!("Failed to delete {}: {}", below, e),
                            }
                        }
                    }
                }
            }
        });

        if let Err(e) = task.await {
            tracing::warn!("Applying changes in {:?} failed: {}", self.root, e);
        }
    }
}

fn update(sink: &dyn IndexSink, file: &Path, uri: &str) {
    match sink.update(file, uri) {
        Ok(outcome) => tracing::debug!("updated: {:?} as {} ({:?})", file, uri, outcome),
        Err(e) => tracing::warn!("Failed to update {}: {}", uri, e),
    }
}

/// Translate one raw notification into file actions
///
/// Removals and the old side of a rename delete; creations, data
/// writes and the new side of a rename update. Metadata-only
/// changes and accesses are ignored.
pub fn actions_for_event(event: &Event) -> Vec<WatchAction> {
    let update = |path: &PathBuf| WatchAction::Update(path.clone());
    let delete = |path: &PathBuf| WatchAction::Delete(path.clone());

    match event.kind {
        EventKind::Create(_) => event.paths.iter().map(update).collect(),
        EventKind::Remove(_) => event.paths.iter().map(delete).collect(),
        EventKind::Modify(ModifyKind::Name(RenameMode::From)) => {
            event.paths.iter().map(delete).collect()
        }
        EventKind::Modify(ModifyKind::Name(RenameMode::To)) => {
            event.paths.iter().map(update).collect()
        }
        EventKind::Modify(ModifyKind::Name(RenameMode::Both)) => {
            let mut actions: Vec<WatchAction> = event.paths.iter().take(1).map(delete).collect();
            actions.extend(event.paths.iter().skip(1).map(update));
            actions
        }
        EventKind::Modify(ModifyKind::Name(_)) => event
            .paths
            .iter()
            .map(|path| {
                if path.exists() {
                    update(path)
                } else {
                    delete(path)
                }
            })
            .collect(),
        EventKind::Modify(ModifyKind::Metadata(_)) => Vec::new(),
        EventKind::Modify(_) => event.paths.iter().map(update).collect(),
        EventKind::Access(_) | EventKind::Any | EventKind::Other => Vec::new(),
    }
}

/// Keep only the last action per path
///
/// Survivors keep the relative order of their last occurrence, so
/// N writes to one file become one update.
pub fn coalesce(actions: impl IntoIterator<Item = WatchAction>) -> Vec<WatchAction> {
    let actions: Vec<WatchAction> = actions.into_iter().collect();

    let mut last: HashMap<&Path, usize> = HashMap::new();
    for (i, action) in actions.iter().enumerate() {
        last.insert(action.path(), i);
    }

    actions
        .iter()
        .enumerate()
        .filter(|(i, action)| last.get(action.path()) == Some(i))
        .map(|(_, action)| action.clone())
        .collect()
}
