//! Customer record repository.

use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;
use nest_core::{NestResult, Record, TenantId, ValidationError};
use serde_json::Value;

use crate::layout::{self, CUSTOMER_PREFIX};
use crate::namespace::TenantNamespace;
use crate::traits::KeyValueStore;

/// The attribute a customer record is keyed by.
///
/// Ids and emails live in separate key spaces, so an id that looks like an
/// email never replaces the record of a customer known only by that email.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CustomerIdentifier {
    Id(String),
    Email(String),
}

impl CustomerIdentifier {
    pub fn storage_key(&self) -> String {
        match self {
            CustomerIdentifier::Id(id) => layout::customer_id_key(id),
            CustomerIdentifier::Email(email) => layout::customer_email_key(email),
        }
    }
}

impl fmt::Display for CustomerIdentifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CustomerIdentifier::Id(id) => write!(f, "id:{id}"),
            CustomerIdentifier::Email(email) => write!(f, "email:{email}"),
        }
    }
}

/// The identifier a customer record is stored under.
///
/// `customer_id` wins over `email`. Numbers are accepted and rendered as
/// strings, so `17` and `"17"` name the same customer. Blank strings count as
/// absent.
pub fn record_identifier(record: &Record) -> Option<CustomerIdentifier> {
    let attr = |name: &str| match record.get(name) {
        Some(Value::String(s)) if !s.trim().is_empty() => Some(s.trim().to_string()),
        Some(Value::Number(n)) => Some(n.to_string()),
        _ => None,
    };
    attr("customer_id")
        .map(CustomerIdentifier::Id)
        .or_else(|| attr("email").map(CustomerIdentifier::Email))
}

#[async_trait]
pub trait CustomerRepository: Send + Sync {
    /// Store `record`, replacing any record with the same identifier.
    ///
    /// # Errors
    ///
    /// Returns `ValidationError::RequiredFieldMissing` if the record carries
    /// neither `customer_id` nor `email`.
    async fn save_customer(&self, tenant_id: &TenantId, record: &Record) -> NestResult<()>;

    /// All of the tenant's customer records, in key order.
    async fn get_customers(&self, tenant_id: &TenantId) -> NestResult<Vec<Record>>;
}

/// [`CustomerRepository`] over any [`KeyValueStore`].
#[derive(Clone)]
pub struct StoreCustomerRepository {
    store: Arc<dyn KeyValueStore>,
}

impl StoreCustomerRepository {
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        Self { store }
    }
}

#[async_trait]
impl CustomerRepository for StoreCustomerRepository {
    async fn save_customer(&self, tenant_id: &TenantId, record: &Record) -> NestResult<()> {
        let identifier =
            record_identifier(record).ok_or_else(|| ValidationError::RequiredFieldMissing {
                field: "customer_id or email".to_string(),
            })?;
        let namespace = TenantNamespace::customers(tenant_id);
        self.store
            .put_item(&namespace, &identifier.storage_key(), record)
            .await?;
        tracing::info!(tenant_id = %tenant_id, customer = %identifier, "Saved customer");
        Ok(())
    }

    async fn get_customers(&self, tenant_id: &TenantId) -> NestResult<Vec<Record>> {
        let namespace = TenantNamespace::customers(tenant_id);
        self.store.scan_prefix(&namespace, CUSTOMER_PREFIX).await
    }
}
