//! Unified service container for Gnosis
//!
//! Opens one [`IndexStore`] per configured index section and hands
//! out query engines over them.

use crate::core::config::Config;
use crate::core::error::{GnosisError, Result};
use crate::core::search::QueryEngine;
use crate::core::storage::IndexStore;
use std::collections::BTreeMap;
use std::sync::Arc;

/// Unified services container
///
/// All adapters use this same struct for service access.
#[derive(Clone)]
pub struct Services {
    /// Application configuration
    pub config: Arc<Config>,

    /// Open index stores by name
    stores: Arc<BTreeMap<String, Arc<IndexStore>>>,
}

impl Services {
    /// Open every configured index
    ///
    /// A section that fails to open is logged and left out; the
    /// remaining indexes still serve.
    pub async fn open(config: Config) -> Self {
        let mut stores = BTreeMap::new();

        for section in &config.indexes {
            let name = section.name.clone();
            match IndexStore::open(section.clone(), config.search.fuzzy_distance).await {
                Ok(store) => {
                    stores.insert(name, store);
                }
                Err(e) => tracing::error!("Failed to open index '{}': {}", name, e),
            }
        }

        tracing::info!(
            "{} of {} index(es) open",
            stores.len(),
            config.indexes.len()
        );

        Self {
            config: Arc::new(config),
            stores: Arc::new(stores),
        }
    }

    /// Names of the open indexes, sorted
    pub fn index_names(&self) -> Vec<String> {
        self.stores.keys().cloned().collect()
    }

    pub fn store(&self, name: &str) -> Result<Arc<IndexStore>> {
        self.stores
            .get(name)
            .cloned()
            .ok_or_else(|| GnosisError::IndexNotFound(name.to_string()))
    }

    /// Query engine for the named index
    pub fn engine(&self, name: &str) -> Result<QueryEngine> {
        Ok(QueryEngine::new(
            self.store(name)?,
            self.config.search.clone(),
        ))
    }

    /// Wait for the initial crawl of every index
    pub async fn wait_until_crawled(&self) {
        for store in self.stores.values() {
            store.wait_until_crawled().await;
        }
    }

    /// Close every index, reporting the first failure
    pub async fn close(&self) -> Result<()> {
        let mut first_err = None;
        for store in self.stores.values() {
            if let Err(e) = store.close().await {
                tracing::error!("{}", e);
                first_err.get_or_insert(e);
            }
        }
        first_err.map_or(Ok(()), Err)
    }
}
