//! Custom Field Use Case
//!
//! Validates field-set requests before any I/O, delegates persistence to a
//! [`CustomFieldRepository`], and builds the prediction payload.

use std::sync::Arc;

use nest_core::{CustomField, FieldCategory, GroupedFields, NestResult, PredictionPayload, TenantId};
use nest_storage::CustomFieldRepository;
use serde_json::Value;

use crate::request::SaveFieldsRequest;

#[derive(Clone)]
pub struct CustomFieldUseCase {
    repository: Arc<dyn CustomFieldRepository>,
}

impl CustomFieldUseCase {
    pub fn new(repository: Arc<dyn CustomFieldRepository>) -> Self {
        Self { repository }
    }

    /// Replace the tenant's field set for the request's category.
    ///
    /// # Errors
    /// Returns an invalid-input error if the request fails
    /// [`SaveFieldsRequest::validate`]. Storage errors propagate unchanged.
    pub async fn save_fields(
        &self,
        tenant_id: &TenantId,
        request: SaveFieldsRequest,
    ) -> NestResult<()> {
        request.validate()?;
        let SaveFieldsRequest {
            category,
            fields,
            associations,
        } = request;

        tracing::debug!(
            tenant_id = %tenant_id,
            category = %category,
            field_count = fields.len(),
            "Saving field set"
        );
        self.repository
            .save_fields(tenant_id, category, fields, associations)
            .await
    }

    /// Parse and save an untyped request body.
    ///
    /// # Errors
    /// Returns an invalid-input error when `fields` is missing or not a list,
    /// when `category` is missing or unknown, or when associations carry no
    /// identifier.
    pub async fn save_fields_json(&self, tenant_id: &TenantId, body: Value) -> NestResult<()> {
        let request = SaveFieldsRequest::try_from(body).inspect_err(|e| {
            tracing::debug!(tenant_id = %tenant_id, error = %e, "Rejected field-set request");
        })?;
        self.save_fields(tenant_id, request).await
    }

    pub async fn get_fields(
        &self,
        tenant_id: &TenantId,
        category: FieldCategory,
    ) -> NestResult<Vec<CustomField>> {
        self.repository.get_fields(tenant_id, category).await
    }

    pub async fn get_all_fields_grouped_by_category(
        &self,
        tenant_id: &TenantId,
    ) -> NestResult<GroupedFields> {
        self.repository
            .get_all_fields_grouped_by_category(tenant_id)
            .await
    }

    /// Remap the tenant's customer records onto canonical field names.
    ///
    /// With no mapping the records pass through unchanged; with no records
    /// the payload's data is empty.
    pub async fn generate_payload(&self, tenant_id: &TenantId) -> NestResult<PredictionPayload> {
        let field_mapping = self.repository.get_mapped_fields(tenant_id).await?;
        let raw = self.repository.get_customer_data(tenant_id).await?;

        tracing::info!(
            tenant_id = %tenant_id,
            mapped_fields = field_mapping.len(),
            records = raw.len(),
            "Generating prediction payload"
        );
        Ok(PredictionPayload::build(field_mapping, raw))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use nest_core::{Associations, ErrorKind, FieldMapping};
    use nest_storage::{InMemoryStore, StoreCustomFieldRepository};
    use nest_test_utils::{fixtures, seed_customer, seed_field_mapping, FailingStore};
    use serde_json::json;

    fn use_case_over(store: InMemoryStore) -> CustomFieldUseCase {
        CustomFieldUseCase::new(Arc::new(StoreCustomFieldRepository::new(Arc::new(store))))
    }

    #[tokio::test]
    async fn test_save_and_get_fields() {
        let use_case = use_case_over(InMemoryStore::new());
        let acme = fixtures::acme();
        let request = SaveFieldsRequest::new(
            FieldCategory::Customer,
            fixtures::customer_fields(),
            Associations::customer("c-1"),
        );

        use_case.save_fields(&acme, request).await.expect("save");

        let fields = use_case
            .get_fields(&acme, FieldCategory::Customer)
            .await
            .expect("get");
        assert_eq!(fields, fixtures::customer_fields());
    }

    #[tokio::test]
    async fn test_save_fields_json() {
        let use_case = use_case_over(InMemoryStore::new());
        let acme = fixtures::acme();
        use_case
            .save_fields_json(
                &acme,
                json!({
                    "category": "Interaction",
                    "fields": [{"name": "channel", "type": "select", "value": ["email", "phone"]}],
                    "associations": {"email": "crm@acme.com"}
                }),
            )
            .await
            .expect("save");

        let grouped = use_case
            .get_all_fields_grouped_by_category(&acme)
            .await
            .expect("grouped");
        assert_eq!(grouped.interaction.len(), 1);
        assert_eq!(grouped.interaction[0].name, "channel");
    }

    #[tokio::test]
    async fn test_invalid_request_never_reaches_storage() {
        let use_case = CustomFieldUseCase::new(Arc::new(StoreCustomFieldRepository::new(
            Arc::new(FailingStore::new()),
        )));
        let err = use_case
            .save_fields_json(&fixtures::acme(), json!({"category": "Order", "fields": []}))
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidInput);
    }

    #[tokio::test]
    async fn test_generate_payload_remaps_records() {
        let store = InMemoryStore::new();
        let acme = fixtures::acme();
        let mapping = FieldMapping::from_pairs([("age", "customer_age")]).expect("mapping");
        seed_field_mapping(&store, &acme, &mapping).await.expect("seed");
        let record = json!({"customer_age": 30, "city": "Perth"});
        seed_customer(&store, &acme, "c-1", record.as_object().expect("object"))
            .await
            .expect("seed");

        let payload = use_case_over(store)
            .generate_payload(&acme)
            .await
            .expect("payload");
        assert_eq!(payload.field_mapping, mapping);
        assert_eq!(
            serde_json::to_value(&payload.data).expect("serialize"),
            json!([{"age": 30, "city": "Perth"}])
        );
    }

    #[tokio::test]
    async fn test_generate_payload_with_nothing_stored() {
        let payload = use_case_over(InMemoryStore::new())
            .generate_payload(&fixtures::acme())
            .await
            .expect("payload");
        assert!(payload.field_mapping.is_empty());
        assert!(payload.data.is_empty());
    }

    #[tokio::test]
    async fn test_storage_failure_propagates() {
        let use_case = CustomFieldUseCase::new(Arc::new(StoreCustomFieldRepository::new(
            Arc::new(FailingStore::new()),
        )));
        let err = use_case
            .generate_payload(&fixtures::acme())
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::StorageUnavailable);
    }
}
