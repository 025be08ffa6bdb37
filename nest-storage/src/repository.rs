//! Custom field repository.
//!
//! Persists one field set per tenant and category, reads them back singly or
//! grouped, and exposes the two read-only inputs of payload generation: the
//! tenant's field mapping and its customer records.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use nest_core::{
    Associations, CustomField, FieldCategory, FieldMapping, FieldSet, GroupedFields, NestResult,
    Record, TenantId,
};

use crate::layout::{self, CUSTOMER_PREFIX, FIELD_MAPPING_KEY, FIELD_SET_PREFIX};
use crate::namespace::TenantNamespace;
use crate::traits::KeyValueStore;

/// Field-set persistence for any tenant.
///
/// The tenant is passed on every call; implementations hold no per-tenant
/// state.
#[async_trait]
pub trait CustomFieldRepository: Send + Sync {
    /// Replace the tenant's field set for `category`.
    async fn save_fields(
        &self,
        tenant_id: &TenantId,
        category: FieldCategory,
        fields: Vec<CustomField>,
        associations: Associations,
    ) -> NestResult<()>;

    /// Fields stored for `category`, or an empty list when nothing was saved.
    async fn get_fields(
        &self,
        tenant_id: &TenantId,
        category: FieldCategory,
    ) -> NestResult<Vec<CustomField>>;

    /// Every category's fields. All four categories are present in the result.
    async fn get_all_fields_grouped_by_category(
        &self,
        tenant_id: &TenantId,
    ) -> NestResult<GroupedFields>;

    /// The tenant's canonical-to-tenant field mapping, empty when absent.
    async fn get_mapped_fields(&self, tenant_id: &TenantId) -> NestResult<FieldMapping>;

    /// Raw customer records, in key order.
    async fn get_customer_data(&self, tenant_id: &TenantId) -> NestResult<Vec<Record>>;
}

/// [`CustomFieldRepository`] over any [`KeyValueStore`].
#[derive(Clone)]
pub struct StoreCustomFieldRepository {
    store: Arc<dyn KeyValueStore>,
}

impl StoreCustomFieldRepository {
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        Self { store }
    }
}

#[async_trait]
impl CustomFieldRepository for StoreCustomFieldRepository {
    async fn save_fields(
        &self,
        tenant_id: &TenantId,
        category: FieldCategory,
        fields: Vec<CustomField>,
        associations: Associations,
    ) -> NestResult<()> {
        let namespace = TenantNamespace::custom_fields(tenant_id);
        let field_count = fields.len();
        let set = FieldSet {
            category,
            fields,
            associations,
            updated_at: Some(Utc::now()),
        };
        let item = layout::encode_field_set(&namespace, &set)?;
        self.store
            .put_item(&namespace, &layout::field_set_key(category), &item)
            .await?;

        tracing::info!(
            tenant_id = %tenant_id,
            category = %category,
            field_count,
            "Saved field set"
        );
        Ok(())
    }

    async fn get_fields(
        &self,
        tenant_id: &TenantId,
        category: FieldCategory,
    ) -> NestResult<Vec<CustomField>> {
        let namespace = TenantNamespace::custom_fields(tenant_id);
        let key = layout::field_set_key(category);
        match self.store.get_item(&namespace, &key).await? {
            Some(item) => layout::decode_fields(&namespace, &key, &item),
            None => {
                tracing::debug!(tenant_id = %tenant_id, category = %category, "No field set stored");
                Ok(Vec::new())
            }
        }
    }

    async fn get_all_fields_grouped_by_category(
        &self,
        tenant_id: &TenantId,
    ) -> NestResult<GroupedFields> {
        let namespace = TenantNamespace::custom_fields(tenant_id);
        let items = self.store.scan_prefix(&namespace, FIELD_SET_PREFIX).await?;

        let mut grouped = GroupedFields::default();
        for item in &items {
            let key = item
                .get("PK")
                .and_then(|pk| pk.as_str())
                .unwrap_or(FIELD_SET_PREFIX);
            let Some(category) = layout::decode_category(&namespace, key, item)? else {
                tracing::warn!(
                    tenant_id = %tenant_id,
                    key,
                    "Skipping field set with unrecognised category"
                );
                continue;
            };
            grouped.set(category, layout::decode_fields(&namespace, key, item)?);
        }
        Ok(grouped)
    }

    async fn get_mapped_fields(&self, tenant_id: &TenantId) -> NestResult<FieldMapping> {
        let namespace = TenantNamespace::custom_fields(tenant_id);
        let Some(item) = self.store.get_item(&namespace, FIELD_MAPPING_KEY).await? else {
            return Ok(FieldMapping::new());
        };
        let mapping = layout::decode_field_mapping(&namespace, &item)?;
        for (canonical, tenant_field) in mapping.shadowed() {
            tracing::warn!(
                tenant_id = %tenant_id,
                canonical,
                tenant_field,
                "Tenant field is mapped more than once; the later mapping wins"
            );
        }
        Ok(mapping)
    }

    async fn get_customer_data(&self, tenant_id: &TenantId) -> NestResult<Vec<Record>> {
        let namespace = TenantNamespace::customers(tenant_id);
        let records = self.store.scan_prefix(&namespace, CUSTOMER_PREFIX).await?;
        tracing::debug!(tenant_id = %tenant_id, count = records.len(), "Loaded customer data");
        Ok(records)
    }
}
