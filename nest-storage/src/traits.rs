//! Key-value store trait.
//!
//! The store is the only thing the repositories talk to. Implementations
//! must keep each `put_item` atomic for a single key; nothing above this
//! layer retries or locks.

use async_trait::async_trait;
use nest_core::NestResult;
use serde_json::Value;

use crate::namespace::TenantNamespace;

/// A stored item: attribute name to attribute value.
pub type Item = serde_json::Map<String, Value>;

/// Namespaced key-value store.
///
/// All methods take a [`TenantNamespace`]. Failures surface as
/// [`nest_core::StorageError`] and are never retried here.
#[async_trait]
pub trait KeyValueStore: Send + Sync {
    /// Write `item` under `key`, replacing any existing item.
    async fn put_item(&self, namespace: &TenantNamespace, key: &str, item: &Item)
        -> NestResult<()>;

    /// Read the item under `key`. Absence is `Ok(None)`, not an error.
    async fn get_item(&self, namespace: &TenantNamespace, key: &str) -> NestResult<Option<Item>>;

    /// All items whose key starts with `prefix`, in key order.
    async fn scan_prefix(&self, namespace: &TenantNamespace, prefix: &str)
        -> NestResult<Vec<Item>>;
}
