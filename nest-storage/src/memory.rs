//! In-memory store.

use std::collections::{BTreeMap, HashMap};
use std::sync::{Arc, RwLock};

use async_trait::async_trait;
use nest_core::{NestResult, StorageError};

use crate::namespace::TenantNamespace;
use crate::traits::{Item, KeyValueStore};

type Table = BTreeMap<String, Item>;

/// In-memory [`KeyValueStore`] for tests and local runs.
///
/// Each namespace is an ordered map so prefix scans return items in key
/// order, matching the LMDB backend.
#[derive(Debug, Clone, Default)]
pub struct InMemoryStore {
    namespaces: Arc<RwLock<HashMap<String, Table>>>,
}

impl InMemoryStore {
    /// Create a new empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Clear all stored data.
    pub fn clear(&self) -> NestResult<()> {
        self.namespaces
            .write()
            .map_err(|_| StorageError::LockPoisoned)?
            .clear();
        Ok(())
    }

    /// Number of items stored in a namespace.
    pub fn item_count(&self, namespace: &TenantNamespace) -> NestResult<usize> {
        let namespaces = self
            .namespaces
            .read()
            .map_err(|_| StorageError::LockPoisoned)?;
        Ok(namespaces.get(&namespace.name()).map_or(0, BTreeMap::len))
    }

    /// Number of namespaces that hold at least one item.
    pub fn namespace_count(&self) -> NestResult<usize> {
        let namespaces = self
            .namespaces
            .read()
            .map_err(|_| StorageError::LockPoisoned)?;
        Ok(namespaces.values().filter(|t| !t.is_empty()).count())
    }
}

#[async_trait]
impl KeyValueStore for InMemoryStore {
    async fn put_item(
        &self,
        namespace: &TenantNamespace,
        key: &str,
        item: &Item,
    ) -> NestResult<()> {
        let mut namespaces = self
            .namespaces
            .write()
            .map_err(|_| StorageError::LockPoisoned)?;
        namespaces
            .entry(namespace.name())
            .or_default()
            .insert(key.to_string(), item.clone());
        Ok(())
    }

    async fn get_item(&self, namespace: &TenantNamespace, key: &str) -> NestResult<Option<Item>> {
        let namespaces = self
            .namespaces
            .read()
            .map_err(|_| StorageError::LockPoisoned)?;
        Ok(namespaces
            .get(&namespace.name())
            .and_then(|table| table.get(key))
            .cloned())
    }

    async fn scan_prefix(
        &self,
        namespace: &TenantNamespace,
        prefix: &str,
    ) -> NestResult<Vec<Item>> {
        let namespaces = self
            .namespaces
            .read()
            .map_err(|_| StorageError::LockPoisoned)?;
        let Some(table) = namespaces.get(&namespace.name()) else {
            return Ok(Vec::new());
        };
        Ok(table
            .range(prefix.to_string()..)
            .take_while(|(key, _)| key.starts_with(prefix))
            .map(|(_, item)| item.clone())
            .collect())
    }
}
