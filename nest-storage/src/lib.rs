//! NestCRM Storage - Tenant-Scoped Store and Repositories
//!
//! Defines the namespaced key-value abstraction, its in-memory and LMDB
//! backends, the persisted item layout, and the repositories the service
//! layer talks to.

pub mod customer;
pub mod layout;
pub mod lmdb_backend;
pub mod memory;
pub mod namespace;
pub mod repository;
pub mod traits;

pub use customer::{
    record_identifier, CustomerIdentifier, CustomerRepository, StoreCustomerRepository,
};
pub use lmdb_backend::{LmdbStore, LmdbStoreError};
pub use memory::InMemoryStore;
pub use namespace::TenantNamespace;
pub use repository::{CustomFieldRepository, StoreCustomFieldRepository};
pub use traits::{Item, KeyValueStore};
