//! NestCRM Service - Use Cases and Process Shell
//!
//! Wires the custom field and customer use cases onto a configured store.
//! HTTP routing and authentication live outside this crate.

pub mod config;
pub mod error;
pub mod request;
pub mod telemetry;
pub mod usecases;

pub use config::{LogFormat, ServiceConfig, StoreBackend};
pub use error::{ServiceError, ServiceResult};
pub use request::SaveFieldsRequest;
pub use usecases::{CustomFieldUseCase, CustomerUseCase};

use std::sync::Arc;

use nest_storage::{
    InMemoryStore, KeyValueStore, LmdbStore, StoreCustomFieldRepository, StoreCustomerRepository,
};

/// Use cases sharing one store.
#[derive(Clone)]
pub struct Services {
    pub custom_fields: CustomFieldUseCase,
    pub customers: CustomerUseCase,
}

impl Services {
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        Self {
            custom_fields: CustomFieldUseCase::new(Arc::new(StoreCustomFieldRepository::new(
                Arc::clone(&store),
            ))),
            customers: CustomerUseCase::new(Arc::new(StoreCustomerRepository::new(store))),
        }
    }

    /// Open the configured store and build the use cases over it.
    pub fn from_config(config: &ServiceConfig) -> ServiceResult<Self> {
        config.validate()?;
        let store: Arc<dyn KeyValueStore> = match config.store_backend {
            StoreBackend::Lmdb => Arc::new(
                LmdbStore::new(&config.store_path, config.store_max_size_mb)
                    .map_err(nest_core::NestError::from)?,
            ),
            StoreBackend::Memory => Arc::new(InMemoryStore::new()),
        };
        tracing::info!(
            backend = ?config.store_backend,
            path = %config.store_path.display(),
            "Store opened"
        );
        Ok(Self::new(store))
    }
}
