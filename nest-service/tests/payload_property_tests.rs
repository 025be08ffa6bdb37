//! Property-Based Tests for Prediction Payload Generation
//!
//! **Property 5: Mapping Application**
//!
//! For any tenant mapping and set of raw customer records, the generated
//! payload SHALL rename every mapped tenant field to its canonical name,
//! leave unmapped fields untouched, and keep one output record per input
//! record.
//!
//! **Property 6: Payload Isolation**
//!
//! A tenant's payload SHALL contain only that tenant's mapping and records.

use std::collections::HashSet;
use std::sync::Arc;

use nest_core::{FieldMapping, Record};
use nest_service::{CustomFieldUseCase, CustomerUseCase, Services};
use nest_storage::{InMemoryStore, LmdbStore, StoreCustomFieldRepository};
use nest_test_utils::{
    assertions, fixtures, generators, seed_customer, seed_field_mapping, FailingStore,
};
use proptest::prelude::*;
use serde_json::{json, Value};
use tempfile::TempDir;
use tokio::runtime::Runtime;

// ============================================================================
// TEST CONFIGURATION
// ============================================================================

fn test_runtime() -> Result<Runtime, TestCaseError> {
    Runtime::new().map_err(|e| TestCaseError::fail(format!("Failed to create runtime: {}", e)))
}

fn fail(e: nest_core::NestError) -> TestCaseError {
    TestCaseError::fail(format!("Operation failed: {}", e))
}

fn use_case(store: &InMemoryStore) -> CustomFieldUseCase {
    CustomFieldUseCase::new(Arc::new(StoreCustomFieldRepository::new(Arc::new(
        store.clone(),
    ))))
}

/// A mapping whose tenant fields are the record keys prefixed with `t_`.
fn arb_mapping_and_records() -> impl Strategy<Value = (FieldMapping, Vec<Record>)> {
    prop::collection::btree_set(generators::arb_field_name(), 1..6).prop_flat_map(|names| {
        let names: Vec<String> = names.into_iter().collect();
        let mapping = FieldMapping::from_pairs(
            names.iter().map(|n| (n.clone(), format!("t_{n}"))),
        )
        .expect("prefixed targets are unique");
        let record = prop::collection::vec(generators::arb_scalar(), names.len()).prop_map(
            move |values| {
                names
                    .iter()
                    .zip(values)
                    .map(|(n, v)| (format!("t_{n}"), v))
                    .collect::<Record>()
            },
        );
        (Just(mapping), prop::collection::vec(record, 0..5))
    })
}

// ============================================================================
// PROPERTIES
// ============================================================================

proptest! {
    #![proptest_config(ProptestConfig::with_cases(32))]

    /// **Property 5.1: Mapping Application**
    #[test]
    fn prop_payload_uses_canonical_names(
        tenant in generators::arb_tenant_id(),
        (mapping, records) in arb_mapping_and_records(),
    ) {
        let rt = test_runtime()?;
        rt.block_on(async {
            let store = InMemoryStore::new();
            seed_field_mapping(&store, &tenant, &mapping).await.map_err(fail)?;
            for (i, record) in records.iter().enumerate() {
                seed_customer(&store, &tenant, &format!("c-{i:03}"), record)
                    .await
                    .map_err(fail)?;
            }

            let payload = use_case(&store).generate_payload(&tenant).await.map_err(fail)?;
            prop_assert_eq!(&payload.field_mapping, &mapping);
            prop_assert_eq!(payload.data.len(), records.len());

            let canonical: HashSet<&str> = mapping.iter().map(|(c, _)| c).collect();
            for (out, raw) in payload.data.iter().zip(&records) {
                prop_assert_eq!(out.len(), raw.len());
                for (canonical_name, tenant_field) in mapping.iter() {
                    prop_assert_eq!(out.get(canonical_name), raw.get(tenant_field));
                }
                for key in out.keys() {
                    prop_assert!(canonical.contains(key.as_str()));
                }
            }
            Ok::<(), TestCaseError>(())
        })?;
    }

    /// **Property 5.2: Pass-Through**
    ///
    /// With no mapping stored, records come back exactly as stored.
    #[test]
    fn prop_payload_without_mapping_passes_through(
        tenant in generators::arb_tenant_id(),
        records in prop::collection::vec(generators::arb_record(), 0..5),
    ) {
        let rt = test_runtime()?;
        rt.block_on(async {
            let store = InMemoryStore::new();
            for (i, record) in records.iter().enumerate() {
                seed_customer(&store, &tenant, &format!("c-{i:03}"), record)
                    .await
                    .map_err(fail)?;
            }

            let payload = use_case(&store).generate_payload(&tenant).await.map_err(fail)?;
            prop_assert!(payload.field_mapping.is_empty());
            prop_assert_eq!(&payload.data, &records);
            Ok::<(), TestCaseError>(())
        })?;
    }

    /// **Property 6.1: Payload Isolation**
    #[test]
    fn prop_payload_is_tenant_scoped(
        (owner, other) in generators::arb_tenant_pair(),
        (mapping, records) in arb_mapping_and_records(),
    ) {
        let rt = test_runtime()?;
        rt.block_on(async {
            let store = InMemoryStore::new();
            seed_field_mapping(&store, &owner, &mapping).await.map_err(fail)?;
            for (i, record) in records.iter().enumerate() {
                seed_customer(&store, &owner, &format!("c-{i:03}"), record)
                    .await
                    .map_err(fail)?;
            }

            let payload = use_case(&store).generate_payload(&other).await.map_err(fail)?;
            prop_assert!(payload.field_mapping.is_empty());
            prop_assert!(payload.data.is_empty());
            Ok::<(), TestCaseError>(())
        })?;
    }
}

// ============================================================================
// EXAMPLES
// ============================================================================

#[tokio::test]
async fn test_payload_example_on_lmdb() {
    let dir = TempDir::new().expect("temp dir");
    let store = Arc::new(LmdbStore::new(dir.path(), 10).expect("open"));
    let acme = fixtures::acme();

    let mapping = FieldMapping::from_pairs([("age", "customer_age")]).expect("mapping");
    seed_field_mapping(store.as_ref(), &acme, &mapping)
        .await
        .expect("seed mapping");
    let record = json!({"customer_age": 30, "city": "Perth"});
    seed_customer(
        store.as_ref(),
        &acme,
        "c-1",
        record.as_object().expect("object"),
    )
    .await
    .expect("seed customer");

    let services = Services::new(store);
    let payload = services
        .custom_fields
        .generate_payload(&acme)
        .await
        .expect("payload");

    assert_eq!(
        serde_json::to_value(&payload).expect("serialize"),
        json!({
            "field_mapping": {"age": "customer_age"},
            "data": [{"age": 30, "city": "Perth"}]
        })
    );
}

#[tokio::test]
async fn test_payload_from_saved_customers() {
    let services = Services::new(Arc::new(InMemoryStore::new()));
    let acme = fixtures::acme();
    let customers: &CustomerUseCase = &services.customers;

    for (id, age, city) in [("c-2", 41, "Hobart"), ("c-1", 29, "Perth")] {
        customers
            .save_customer(&acme, Value::Object(fixtures::customer_record(id, age, city)))
            .await
            .expect("save customer");
    }

    let payload = services
        .custom_fields
        .generate_payload(&acme)
        .await
        .expect("payload");
    assert_eq!(payload.data.len(), 2);
    assert_eq!(payload.data[0]["customer_id"], json!("c-1"));
    assert_eq!(payload.data[0]["customer_age"], json!(29));
}

#[tokio::test]
async fn test_payload_storage_failure_propagates() {
    let services = Services::new(Arc::new(FailingStore::new()));
    assertions::assert_storage_unavailable(
        &services
            .custom_fields
            .generate_payload(&fixtures::acme())
            .await,
    );
    assertions::assert_storage_unavailable(
        &services.customers.get_customers(&fixtures::acme()).await,
    );
}

#[tokio::test]
async fn test_payload_with_repeated_mapping_target_uses_later_entry() {
    let store = InMemoryStore::new();
    let acme = fixtures::acme();
    let mapping: FieldMapping =
        serde_json::from_value(json!({"age": "x", "years": "x"})).expect("stored mapping");
    seed_field_mapping(&store, &acme, &mapping)
        .await
        .expect("seed mapping");
    let record = json!({"x": 7, "city": "Perth"});
    seed_customer(&store, &acme, "c-1", record.as_object().expect("object"))
        .await
        .expect("seed customer");

    let payload = use_case(&store)
        .generate_payload(&acme)
        .await
        .expect("payload");
    assert_eq!(
        serde_json::to_value(&payload).expect("serialize"),
        json!({
            "field_mapping": {"age": "x", "years": "x"},
            "data": [{"years": 7, "city": "Perth"}]
        })
    );
}
