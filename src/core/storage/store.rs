//! Index lifecycle and concurrency control.
//!
//! An [`IndexStore`] owns one [`PageIndex`] behind a single
//! `RwLock` together with the watcher tasks that feed it. Writes
//! (update, delete, wipe) take the write side; queries and field
//! enumeration take the read side. The reader is reloaded inside
//! the write lock, so a query never observes a half-applied page.

use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, RwLock, RwLockReadGuard, RwLockWriteGuard, Weak};

use tokio::sync::watch;
use tokio::task::JoinHandle;

use super::tantivy::{PageIndex, RawResults};
use crate::core::config::IndexSection;
use crate::core::error::{GnosisError, Result};
use crate::core::indexer::markdown::cleanup_markdown;
use crate::core::indexer::metadata::{slugify, PageMetadata};
use crate::core::indexer::watcher::{DirectoryWatcher, IndexSink};
use crate::core::search::{build_query, SearchRequest};
use crate::core::types::{IndexedDocument, UpdateOutcome};

/// Where a store is in its life
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Lifecycle {
    Closed,
    Opening,
    Open,
    Closing,
}

/// One search index plus the watchers keeping it current
pub struct IndexStore {
    name: String,
    index_path: PathBuf,
    index_type: String,
    restricted: Vec<String>,
    fuzzy_distance: u8,

    index: RwLock<Option<PageIndex>>,
    lifecycle: Mutex<Lifecycle>,

    shutdown: watch::Sender<bool>,
    tasks: Mutex<Vec<JoinHandle<()>>>,

    /// Number of roots whose initial crawl has finished
    crawled: watch::Sender<usize>,
    roots: usize,
}

impl std::fmt::Debug for IndexStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("IndexStore")
            .field("name", &self.name)
            .field("index_path", &self.index_path)
            .field("lifecycle", &self.lifecycle())
            .finish()
    }
}

impl IndexStore {
    /// Open (or create) the index for `section` and start watching
    ///
    /// Each watched root gets one task that crawls the root and then
    /// applies live changes until [`close`](Self::close).
    pub async fn open(section: IndexSection, fuzzy_distance: u8) -> Result<Arc<Self>> {
        tracing::info!("Opening index '{}' at {:?}", section.name, section.index_path);

        let index_path = section.index_path.clone();
        let index_type = section.index_type.clone();
        let index = tokio::task::spawn_blocking(move || {
            PageIndex::open_or_create(&index_path, &index_type)
        })
        .await
        .map_err(|e| GnosisError::IndexOpen {
            path: section.index_path.clone(),
            message: e.to_string(),
        })??;

        // Subscribe every root before the first crawl so no change
        // made during the crawl is missed
        let mut watchers = Vec::with_capacity(section.watch_dirs.len());
        for (root, prefix) in &section.watch_dirs {
            watchers.push(DirectoryWatcher::new(
                Path::new(root),
                prefix.clone(),
                section.watch_extension.clone(),
                section.debounce(),
            )?);
        }

        let (shutdown, _) = watch::channel(false);
        let (crawled, _) = watch::channel(0usize);

        let store = Arc::new(Self {
            name: section.name,
            index_path: section.index_path,
            index_type: section.index_type,
            restricted: section.restricted.iter().map(|t| slugify(t)).collect(),
            fuzzy_distance,
            index: RwLock::new(Some(index)),
            lifecycle: Mutex::new(Lifecycle::Opening),
            shutdown,
            tasks: Mutex::new(Vec::new()),
            crawled,
            roots: watchers.len(),
        });

        let handles = watchers
            .into_iter()
            .map(|watcher| store.spawn_watcher(watcher))
            .collect();
        *store.tasks.lock().unwrap_or_else(|e| e.into_inner()) = handles;

        store.set_lifecycle(Lifecycle::Open);
        tracing::info!(
            "Index '{}' open with {} watched root(s)",
            store.name,
            store.roots
        );
        Ok(store)
    }

    fn spawn_watcher(self: &Arc<Self>, watcher: DirectoryWatcher) -> JoinHandle<()> {
        // Tasks hold a weak handle so dropping the store stops them
        let sink: Arc<dyn IndexSink> = Arc::new(StoreSink(Arc::downgrade(self)));
        let shutdown = self.shutdown.subscribe();
        let crawled = self.crawled.clone();

        tokio::spawn(async move {
            watcher.crawl(Arc::clone(&sink), shutdown.clone()).await;
            crawled.send_modify(|n| *n += 1);
            watcher.watch(sink, shutdown).await;
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn lifecycle(&self) -> Lifecycle {
        *self.lifecycle.lock().unwrap_or_else(|e| e.into_inner())
    }

    fn set_lifecycle(&self, state: Lifecycle) {
        *self.lifecycle.lock().unwrap_or_else(|e| e.into_inner()) = state;
    }

    /// Re-read `file` and store it under `uri_path`
    ///
    /// A page carrying a restricted topic is removed instead and
    /// reported as [`UpdateOutcome::Excluded`].
    pub fn update(&self, file: &Path, uri_path: &str) -> Result<UpdateOutcome> {
        let page = PageMetadata::load(file)?;

        if page.matched_topic(&self.restricted) {
            let removed = self.write()?.remove(uri_path)?;
            tracing::debug!("restricted: {} (removed existing: {})", uri_path, removed);
            return Ok(UpdateOutcome::Excluded);
        }

        let (topics, keywords, authors) = page.list_meta();
        let document = IndexedDocument {
            title: page.title,
            uri_path: uri_path.to_string(),
            body: cleanup_markdown(&page.body),
            topics,
            keywords,
            authors,
            modified: page.modified,
        };

        self.write()?.upsert(&document)?;
        Ok(UpdateOutcome::Indexed)
    }

    /// Remove the page stored under `uri_path`
    pub fn delete(&self, uri_path: &str) -> Result<()> {
        if !self.write()?.remove(uri_path)? {
            tracing::debug!("Nothing indexed at {}", uri_path);
        }
        Ok(())
    }

    /// Remove every page whose URI starts with `prefix`
    pub fn delete_prefix(&self, prefix: &str) -> Result<usize> {
        let removed = self.write()?.remove_prefix(prefix)?;
        if removed > 0 {
            tracing::debug!("Removed {} pages under {}", removed, prefix);
        }
        Ok(removed)
    }

    /// Run one page of `request`
    ///
    /// Hits and facets are read under one guard, so both describe
    /// the same set of pages.
    pub fn query(&self, request: &SearchRequest) -> Result<RawResults> {
        let guard = self.read()?;
        let index = guard.as_ref().ok_or_else(|| self.closed())?;

        let query = build_query(index, &request.spec, self.fuzzy_distance)?;
        index.search(
            query.as_ref(),
            &request.fields,
            &request.facets,
            request.offset(),
            request.page_size,
        )
    }

    /// Distinct values of `field` across every live page
    pub fn field_values(&self, field: &str) -> Result<Vec<String>> {
        let guard = self.read()?;
        guard
            .as_ref()
            .ok_or_else(|| self.closed())?
            .field_values(field)
    }

    /// Number of live pages
    pub fn num_docs(&self) -> Result<u64> {
        let guard = self.read()?;
        Ok(guard.as_ref().ok_or_else(|| self.closed())?.num_docs())
    }

    /// Drop every page and start over with an empty index
    ///
    /// Watchers keep running; pages written after the wipe land in
    /// the new index.
    pub fn wipe(&self) -> Result<()> {
        let wipe_err = |message: String| GnosisError::IndexWipe {
            path: self.index_path.clone(),
            message,
        };

        let mut guard = self
            .index
            .write()
            .map_err(|_| wipe_err("Index lock poisoned".to_string()))?;
        let index = guard.take().ok_or_else(|| self.closed())?;

        index.close().map_err(|e| wipe_err(e.message()))?;
        std::fs::remove_dir_all(&self.index_path).map_err(|e| wipe_err(e.to_string()))?;
        let fresh = PageIndex::create(&self.index_path, &self.index_type)
            .map_err(|e| wipe_err(e.message()))?;
        *guard = Some(fresh);

        tracing::info!("Wiped index '{}'", self.name);
        Ok(())
    }

    /// Stop every watcher, then release the index
    ///
    /// Safe to call more than once. Operations after close fail with
    /// [`GnosisError::IndexClosed`].
    pub async fn close(&self) -> Result<()> {
        {
            let mut state = self.lifecycle.lock().unwrap_or_else(|e| e.into_inner());
            if matches!(*state, Lifecycle::Closed | Lifecycle::Closing) {
                return Ok(());
            }
            *state = Lifecycle::Closing;
        }
        tracing::info!("Closing index '{}'", self.name);

        self.shutdown.send_replace(true);
        let handles = std::mem::take(&mut *self.tasks.lock().unwrap_or_else(|e| e.into_inner()));
        for handle in handles {
            if let Err(e) = handle.await {
                tracing::warn!("Watcher task for '{}' failed: {}", self.name, e);
            }
        }

        let index = self
            .index
            .write()
            .map(|mut guard| guard.take())
            .unwrap_or_else(|e| e.into_inner().take());

        let result = match index {
            Some(index) => tokio::task::spawn_blocking(move || index.close())
                .await
                .map_err(|e| GnosisError::IndexClose {
                    name: self.name.clone(),
                    message: e.to_string(),
                })
                .and_then(|closed| {
                    closed.map_err(|e| GnosisError::IndexClose {
                        name: self.name.clone(),
                        message: e.message(),
                    })
                }),
            None => Ok(()),
        };

        self.set_lifecycle(Lifecycle::Closed);
        tracing::info!("Closed index '{}'", self.name);
        result
    }

    /// Resolve once every watched root has finished its first crawl
    pub async fn wait_until_crawled(&self) {
        let mut crawled = self.crawled.subscribe();
        // The sender lives as long as `self`
        let _ = crawled.wait_for(|done| *done >= self.roots).await;
    }

    fn read(&self) -> Result<RwLockReadGuard<'_, Option<PageIndex>>> {
        self.index
            .read()
            .map_err(|_| GnosisError::IndexRead("Index lock poisoned".to_string()))
    }

    /// Write side, failing when the store is closed
    fn write(&self) -> Result<IndexGuard<'_>> {
        let guard = self
            .index
            .write()
            .map_err(|_| GnosisError::IndexWrite("Index lock poisoned".to_string()))?;
        if guard.is_none() {
            return Err(self.closed());
        }
        Ok(IndexGuard(guard))
    }

    fn closed(&self) -> GnosisError {
        GnosisError::IndexClosed(self.name.clone())
    }
}

/// Write guard over an index known to be open
struct IndexGuard<'a>(RwLockWriteGuard<'a, Option<PageIndex>>);

impl IndexGuard<'_> {
    fn upsert(&mut self, document: &IndexedDocument) -> Result<()> {
        match self.0.as_mut() {
            Some(index) => index.upsert(document),
            None => Err(GnosisError::IndexWrite("Index is not open".to_string())),
        }
    }

    fn remove(&mut self, uri_path: &str) -> Result<bool> {
        match self.0.as_mut() {
            Some(index) => index.remove(uri_path),
            None => Err(GnosisError::IndexWrite("Index is not open".to_string())),
        }
    }

    fn remove_prefix(&mut self, prefix: &str) -> Result<usize> {
        match self.0.as_mut() {
            Some(index) => index.remove_prefix(prefix),
            None => Err(GnosisError::IndexWrite("Index is not open".to_string())),
        }
    }
}

impl IndexSink for IndexStore {
    fn update(&self, file: &Path, uri: &str) -> Result<UpdateOutcome> {
        IndexStore::update(self, file, uri)
    }

    fn delete(&self, uri: &str) -> Result<()> {
        IndexStore::delete(self, uri)
    }

    fn delete_prefix(&self, prefix: &str) -> Result<usize> {
        IndexStore::delete_prefix(self, prefix)
    }
}

/// Sink handed to watcher tasks
struct StoreSink(Weak<IndexStore>);

impl StoreSink {
    fn store(&self) -> Result<Arc<IndexStore>> {
        self.0
            .upgrade()
            .ok_or_else(|| GnosisError::IndexClosed("dropped".to_string()))
    }
}

impl IndexSink for StoreSink {
    fn update(&self, file: &Path, uri: &str) -> Result<UpdateOutcome> {
        self.store()?.update(file, uri)
    }

    fn delete(&self, uri: &str) -> Result<()> {
        self.store()?.delete(uri)
    }

    fn delete_prefix(&self, prefix: &str) -> Result<usize> {
        self.store()?.delete_prefix(prefix)
    }
}
