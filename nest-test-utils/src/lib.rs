//! NestCRM Test Utilities
//!
//! Shared test infrastructure for the NestCRM workspace:
//! - Proptest generators for tenants, categories, fields and records
//! - Fixtures for common scenarios
//! - Seeding helpers for the read-only inputs (field mapping, customer data)
//! - A store that always fails, for error propagation tests

// Re-export stores from their source crate
pub use nest_storage::{InMemoryStore, KeyValueStore, LmdbStore, TenantNamespace};

// Re-export core types for convenience
pub use nest_core::{
    Associations, CustomField, ErrorKind, FieldCategory, FieldMapping, GroupedFields, NestError,
    NestResult, PredictionPayload, Record, StorageError, TenantId,
};

use async_trait::async_trait;
use nest_storage::{layout, Item};

// ============================================================================
// FAILING STORE
// ============================================================================

/// A [`KeyValueStore`] whose every operation fails with
/// `StorageError::Unavailable`.
#[derive(Debug, Clone)]
pub struct FailingStore {
    reason: String,
}

impl FailingStore {
    pub fn new() -> Self {
        Self::with_reason("store offline")
    }

    pub fn with_reason(reason: impl Into<String>) -> Self {
        Self {
            reason: reason.into(),
        }
    }

    fn fail<T>(&self) -> NestResult<T> {
        Err(StorageError::Unavailable {
            reason: self.reason.clone(),
        }
        .into())
    }
}

impl Default for FailingStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl KeyValueStore for FailingStore {
    async fn put_item(&self, _: &TenantNamespace, _: &str, _: &Item) -> NestResult<()> {
        self.fail()
    }

    async fn get_item(&self, _: &TenantNamespace, _: &str) -> NestResult<Option<Item>> {
        self.fail()
    }

    async fn scan_prefix(&self, _: &TenantNamespace, _: &str) -> NestResult<Vec<Item>> {
        self.fail()
    }
}

// ============================================================================
// SEEDING
// ============================================================================

/// Write a tenant's field mapping the way the provisioning side stores it.
pub async fn seed_field_mapping(
    store: &dyn KeyValueStore,
    tenant_id: &TenantId,
    mapping: &FieldMapping,
) -> NestResult<()> {
    let namespace = TenantNamespace::custom_fields(tenant_id);
    let item = layout::encode_field_mapping(&namespace, mapping)?;
    store
        .put_item(&namespace, layout::FIELD_MAPPING_KEY, &item)
        .await
}

/// Write a raw customer record under an explicit customer id.
pub async fn seed_customer(
    store: &dyn KeyValueStore,
    tenant_id: &TenantId,
    customer_id: &str,
    record: &Record,
) -> NestResult<()> {
    let namespace = TenantNamespace::customers(tenant_id);
    store
        .put_item(&namespace, &layout::customer_id_key(customer_id), record)
        .await
}

// ============================================================================
// PROPTEST GENERATORS
// ============================================================================

pub mod generators {
    //! Proptest strategies for generating NestCRM types.

    use super::*;
    use proptest::prelude::*;
    use serde_json::Value;

    /// Generate a valid tenant id (a DNS label).
    pub fn arb_tenant_id() -> impl Strategy<Value = TenantId> {
        "[a-z0-9]([a-z0-9-]{0,14}[a-z0-9])?"
            .prop_map(|s| TenantId::parse(&s).expect("pattern yields valid tenant ids"))
    }

    /// Generate two distinct tenant ids.
    pub fn arb_tenant_pair() -> impl Strategy<Value = (TenantId, TenantId)> {
        (arb_tenant_id(), arb_tenant_id()).prop_filter("tenants must differ", |(a, b)| a != b)
    }

    /// Generate a FieldCategory variant.
    pub fn arb_category() -> impl Strategy<Value = FieldCategory> {
        prop_oneof![
            Just(FieldCategory::Customer),
            Just(FieldCategory::Order),
            Just(FieldCategory::Payment),
            Just(FieldCategory::Interaction),
        ]
    }

    /// Generate a non-empty field name.
    pub fn arb_field_name() -> impl Strategy<Value = String> {
        "[a-z][a-z0-9_]{0,15}"
    }

    /// Generate a field type label.
    pub fn arb_field_type() -> impl Strategy<Value = String> {
        prop_oneof![
            Just("text".to_string()),
            Just("number".to_string()),
            Just("date".to_string()),
            Just("select".to_string()),
            Just("boolean".to_string()),
        ]
    }

    /// Generate a JSON scalar.
    pub fn arb_scalar() -> impl Strategy<Value = Value> {
        prop_oneof![
            Just(Value::Null),
            any::<bool>().prop_map(Value::Bool),
            any::<i32>().prop_map(Value::from),
            "[a-zA-Z0-9 @.]{0,12}".prop_map(Value::String),
        ]
    }

    /// Generate a field's optional `type` and `value`.
    ///
    /// `value` covers absent, explicit `null` and scalars; `type` is
    /// sometimes absent or not a string.
    fn arb_field_attributes() -> impl Strategy<Value = (Option<Value>, Option<Value>)> {
        (
            proptest::option::of(prop_oneof![
                4 => arb_field_type().prop_map(Value::String),
                1 => any::<i32>().prop_map(Value::from),
            ]),
            proptest::option::of(arb_scalar()),
        )
    }

    fn build_field(name: String, field_type: Option<Value>, value: Option<Value>) -> CustomField {
        let mut field = CustomField::named(name);
        if let Some(field_type) = field_type {
            field = field.with_attribute("type", field_type);
        }
        if let Some(value) = value {
            field = field.with_value(value);
        }
        field
    }

    /// Generate a single field definition.
    pub fn arb_custom_field() -> impl Strategy<Value = CustomField> {
        (arb_field_name(), arb_field_attributes())
            .prop_map(|(name, (field_type, value))| build_field(name, field_type, value))
    }

    /// Generate a field list with unique names, in arbitrary order.
    pub fn arb_field_list() -> impl Strategy<Value = Vec<CustomField>> {
        prop::collection::btree_map(arb_field_name(), arb_field_attributes(), 0..8)
            .prop_map(|fields| {
                fields
                    .into_iter()
                    .map(|(name, (field_type, value))| build_field(name, field_type, value))
                    .collect::<Vec<_>>()
            })
            .prop_shuffle()
    }

    /// Generate associations carrying at least one identifier.
    pub fn arb_associations() -> impl Strategy<Value = Associations> {
        prop_oneof![
            "c-[0-9]{1,6}".prop_map(Associations::customer),
            "[a-z]{1,8}@[a-z]{1,8}\\.com".prop_map(Associations::email),
            ("c-[0-9]{1,6}", "[a-z]{1,8}@[a-z]{1,8}\\.com").prop_map(|(id, email)| {
                Associations {
                    customer_id: Some(id),
                    email: Some(email),
                }
            }),
        ]
    }

    /// Generate a record of scalar values.
    pub fn arb_record() -> impl Strategy<Value = Record> {
        prop::collection::vec((arb_field_name(), arb_scalar()), 0..8)
            .prop_map(|pairs| pairs.into_iter().collect::<Record>())
    }
}

// ============================================================================
// FIXTURES
// ============================================================================

pub mod fixtures {
    //! Fixed values for example-based tests.

    use super::*;
    use serde_json::json;

    pub fn tenant(id: &str) -> TenantId {
        TenantId::parse(id).expect("fixture tenant id is valid")
    }

    pub fn acme() -> TenantId {
        tenant("acme")
    }

    pub fn globex() -> TenantId {
        tenant("globex")
    }

    /// Customer-category fields a retail tenant might define.
    pub fn customer_fields() -> Vec<CustomField> {
        vec![
            CustomField::new("loyalty_tier", "select").with_value(json!(["gold", "silver"])),
            CustomField::new("customer_age", "number"),
            CustomField::new("home_city", "text"),
        ]
    }

    /// Mapping of canonical model names onto [`customer_fields`].
    pub fn customer_mapping() -> FieldMapping {
        FieldMapping::from_pairs([("age", "customer_age"), ("city", "home_city")])
            .expect("fixture mapping has unique targets")
    }

    /// A raw customer record stored under the tenant's own field names.
    pub fn customer_record(customer_id: &str, age: i64, city: &str) -> Record {
        let value = json!({
            "customer_id": customer_id,
            "customer_age": age,
            "home_city": city,
        });
        value
            .as_object()
            .cloned()
            .expect("fixture record is an object")
    }
}

// ============================================================================
// CUSTOM ASSERTIONS
// ============================================================================

pub mod assertions {
    //! Assertions on NestCRM error kinds.

    use super::*;

    /// Assert that a NestResult failed with an invalid-input error.
    #[track_caller]
    pub fn assert_invalid_input<T: std::fmt::Debug>(result: &NestResult<T>) {
        match result {
            Err(e) if e.kind() == ErrorKind::InvalidInput => {}
            other => panic!("Expected InvalidInput, got: {:?}", other),
        }
    }

    /// Assert that a NestResult failed with a storage error.
    #[track_caller]
    pub fn assert_storage_unavailable<T: std::fmt::Debug>(result: &NestResult<T>) {
        match result {
            Err(e) if e.kind() == ErrorKind::StorageUnavailable => {}
            other => panic!("Expected StorageUnavailable, got: {:?}", other),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use std::collections::HashSet;

    #[tokio::test]
    async fn test_failing_store_fails_everything() {
        let store = FailingStore::new();
        let ns = TenantNamespace::custom_fields(&fixtures::acme());
        assertions::assert_storage_unavailable(&store.get_item(&ns, "k").await);
        assertions::assert_storage_unavailable(&store.scan_prefix(&ns, "").await);
        assertions::assert_storage_unavailable(&store.put_item(&ns, "k", &Item::new()).await);
    }

    #[tokio::test]
    async fn test_seeded_mapping_is_readable() {
        let store = InMemoryStore::new();
        let acme = fixtures::acme();
        seed_field_mapping(&store, &acme, &fixtures::customer_mapping())
            .await
            .expect("seed");
        let ns = TenantNamespace::custom_fields(&acme);
        assert_eq!(store.item_count(&ns).expect("count"), 1);
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(50))]

        #[test]
        fn prop_generated_field_names_are_unique(fields in generators::arb_field_list()) {
            let names: HashSet<_> = fields.iter().map(|f| f.name.as_str()).collect();
            prop_assert_eq!(names.len(), fields.len());
        }

        #[test]
        fn prop_generated_associations_have_identifier(assoc in generators::arb_associations()) {
            prop_assert!(assoc.has_identifier());
        }
    }
}
