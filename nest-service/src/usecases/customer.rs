//! Customer Use Case

use std::sync::Arc;

use nest_core::{NestResult, Record, TenantId, ValidationError};
use nest_storage::{record_identifier, CustomerRepository};
use serde_json::Value;

#[derive(Clone)]
pub struct CustomerUseCase {
    repository: Arc<dyn CustomerRepository>,
}

impl CustomerUseCase {
    pub fn new(repository: Arc<dyn CustomerRepository>) -> Self {
        Self { repository }
    }

    /// Store a customer record, replacing any record with the same identifier.
    ///
    /// # Errors
    /// Returns an invalid-input error if `body` is not an object or carries
    /// neither a non-empty `customer_id` nor `email`.
    pub async fn save_customer(&self, tenant_id: &TenantId, body: Value) -> NestResult<()> {
        let Value::Object(record) = body else {
            return Err(ValidationError::InvalidValue {
                field: "body".to_string(),
                reason: "customer must be a JSON object".to_string(),
            }
            .into());
        };
        if record_identifier(&record).is_none() {
            return Err(ValidationError::RequiredFieldMissing {
                field: "customer_id or email".to_string(),
            }
            .into());
        }
        self.repository.save_customer(tenant_id, &record).await
    }

    pub async fn get_customers(&self, tenant_id: &TenantId) -> NestResult<Vec<Record>> {
        self.repository.get_customers(tenant_id).await
    }
}
