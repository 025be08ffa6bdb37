//! LMDB-backed store with tenant isolation.
//!
//! Uses the heed crate (Rust bindings for LMDB) to provide a memory-mapped,
//! transactional key-value store for field sets and customer records.
//!
//! # Tenant Isolation
//!
//! All keys are encoded through [`TenantNamespace`], so:
//! - Each tenant's tables occupy disjoint key ranges
//! - Prefix scans never leave the namespace they were issued against
//!
//! # Thread Safety
//!
//! LMDB provides ACID transactions. The backend uses:
//! - Read transactions for `get_item` and `scan_prefix`
//! - One write transaction per `put_item`, so each put is atomic

use std::path::Path;

use async_trait::async_trait;
use heed::types::Bytes;
use heed::{Database, Env, EnvOpenOptions};
use nest_core::{NestError, NestResult, StorageError};

use crate::namespace::TenantNamespace;
use crate::traits::{Item, KeyValueStore};

/// Error type for LMDB store operations.
#[derive(Debug, thiserror::Error)]
pub enum LmdbStoreError {
    /// Failed to open or create the LMDB environment.
    #[error("Failed to open LMDB environment: {0}")]
    EnvOpen(String),

    /// The requested map size does not fit in `usize` bytes.
    #[error("Map size of {0} MB is too large")]
    MapSize(usize),

    /// Failed to open the database within the environment.
    #[error("Failed to open database: {0}")]
    DbOpen(String),

    /// Transaction error.
    #[error("Transaction error: {0}")]
    Transaction(String),

    /// Serialization error.
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<LmdbStoreError> for NestError {
    fn from(e: LmdbStoreError) -> Self {
        NestError::Storage(StorageError::Unavailable {
            reason: e.to_string(),
        })
    }
}

/// LMDB-backed [`KeyValueStore`].
///
/// # Example
///
/// ```ignore
/// let store = LmdbStore::new("/var/lib/nestcrm", 256)?;
/// let ns = TenantNamespace::custom_fields(&tenant_id);
/// store.put_item(&ns, "FieldMapping", &item).await?;
/// ```
pub struct LmdbStore {
    /// The LMDB environment.
    env: Env,
    /// The main database (single unnamed database).
    db: Database<Bytes, Bytes>,
}

impl LmdbStore {
    /// Open or create an LMDB store.
    ///
    /// # Arguments
    ///
    /// * `path` - Directory where LMDB files will be stored
    /// * `max_size_mb` - Maximum size of the database in megabytes
    pub fn new<P: AsRef<Path>>(path: P, max_size_mb: usize) -> Result<Self, LmdbStoreError> {
        let map_size = max_size_mb
            .checked_mul(1024 * 1024)
            .ok_or(LmdbStoreError::MapSize(max_size_mb))?;
        std::fs::create_dir_all(&path)?;

        // SAFETY: the environment is opened once per path by this process and
        // the backing files are not modified by anything else while mapped.
        let env = unsafe {
            EnvOpenOptions::new()
                .map_size(map_size)
                .max_dbs(1)
                .open(path.as_ref())
        }
        .map_err(|e| LmdbStoreError::EnvOpen(e.to_string()))?;

        let mut wtxn = env
            .write_txn()
            .map_err(|e| LmdbStoreError::Transaction(e.to_string()))?;

        let db: Database<Bytes, Bytes> = env
            .create_database(&mut wtxn, None)
            .map_err(|e| LmdbStoreError::DbOpen(e.to_string()))?;

        wtxn.commit()
            .map_err(|e| LmdbStoreError::Transaction(e.to_string()))?;

        tracing::debug!(path = %path.as_ref().display(), max_size_mb, "Opened LMDB store");

        Ok(Self { env, db })
    }

    /// Total number of items across all namespaces.
    pub fn len(&self) -> Result<u64, LmdbStoreError> {
        let rtxn = self
            .env
            .read_txn()
            .map_err(|e| LmdbStoreError::Transaction(e.to_string()))?;
        self.db
            .len(&rtxn)
            .map_err(|e| LmdbStoreError::Transaction(e.to_string()))
    }

    pub fn is_empty(&self) -> Result<bool, LmdbStoreError> {
        Ok(self.len()? == 0)
    }
}

fn decode_item(namespace: &TenantNamespace, key: &str, bytes: &[u8]) -> NestResult<Item> {
    serde_json::from_slice(bytes).map_err(|e| {
        StorageError::Corrupt {
            namespace: namespace.name(),
            key: key.to_string(),
            reason: e.to_string(),
        }
        .into()
    })
}

#[async_trait]
impl KeyValueStore for LmdbStore {
    async fn put_item(
        &self,
        namespace: &TenantNamespace,
        key: &str,
        item: &Item,
    ) -> NestResult<()> {
        let encoded_key = namespace.encode_key(key);
        let value_bytes =
            serde_json::to_vec(item).map_err(|e| LmdbStoreError::Serialization(e.to_string()))?;

        let mut wtxn = self
            .env
            .write_txn()
            .map_err(|e| LmdbStoreError::Transaction(e.to_string()))?;

        self.db
            .put(&mut wtxn, encoded_key.as_slice(), value_bytes.as_slice())
            .map_err(|e| LmdbStoreError::Transaction(e.to_string()))?;

        wtxn.commit()
            .map_err(|e| LmdbStoreError::Transaction(e.to_string()))?;

        Ok(())
    }

    async fn get_item(&self, namespace: &TenantNamespace, key: &str) -> NestResult<Option<Item>> {
        let encoded_key = namespace.encode_key(key);

        let rtxn = self
            .env
            .read_txn()
            .map_err(|e| LmdbStoreError::Transaction(e.to_string()))?;

        match self.db.get(&rtxn, encoded_key.as_slice()) {
            Ok(Some(bytes)) => decode_item(namespace, key, bytes).map(Some),
            Ok(None) => Ok(None),
            Err(e) => Err(LmdbStoreError::Transaction(e.to_string()).into()),
        }
    }

    async fn scan_prefix(
        &self,
        namespace: &TenantNamespace,
        prefix: &str,
    ) -> NestResult<Vec<Item>> {
        let encoded_prefix = namespace.encode_prefix(prefix);

        let rtxn = self
            .env
            .read_txn()
            .map_err(|e| LmdbStoreError::Transaction(e.to_string()))?;

        let iter = self
            .db
            .prefix_iter(&rtxn, encoded_prefix.as_slice())
            .map_err(|e| LmdbStoreError::Transaction(e.to_string()))?;

        let mut items = Vec::new();
        for result in iter {
            let (raw_key, bytes) =
                result.map_err(|e| LmdbStoreError::Transaction(e.to_string()))?;
            let key = namespace.decode_key(raw_key).unwrap_or_default();
            items.push(decode_item(namespace, &key, bytes)?);
        }

        Ok(items)
    }
}
