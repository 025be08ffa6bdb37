//! Persisted item layout.
//!
//! Field sets live in the tenant's `CustomFields` table as
//! `{PK: "CustomFieldSet#<category>", Category, Fields, Associations, UpdatedAt}`.
//! The tenant's field mapping sits in the same table under `FieldMapping`.
//! Customer records live in the `Customers` table under `Customer#id:<id>`,
//! or `Customer#email:<email>` when the record has no id.

use chrono::{DateTime, Utc};
use nest_core::{
    Associations, CustomField, FieldCategory, FieldMapping, FieldSet, NestResult, StorageError,
};
use serde_json::Value;

use crate::namespace::TenantNamespace;
use crate::traits::Item;

/// Key prefix of every field-set item.
pub const FIELD_SET_PREFIX: &str = "CustomFieldSet#";
/// Key of the tenant's field mapping item.
pub const FIELD_MAPPING_KEY: &str = "FieldMapping";
/// Key prefix of every customer record.
pub const CUSTOMER_PREFIX: &str = "Customer#";

const ATTR_PK: &str = "PK";
const ATTR_CATEGORY: &str = "Category";
const ATTR_FIELDS: &str = "Fields";
const ATTR_ASSOCIATIONS: &str = "Associations";
const ATTR_UPDATED_AT: &str = "UpdatedAt";
const ATTR_MAPPING: &str = "Mapping";

pub fn field_set_key(category: FieldCategory) -> String {
    format!("{FIELD_SET_PREFIX}{category}")
}

pub fn customer_id_key(customer_id: &str) -> String {
    format!("{CUSTOMER_PREFIX}id:{customer_id}")
}

pub fn customer_email_key(email: &str) -> String {
    format!("{CUSTOMER_PREFIX}email:{email}")
}

fn corrupt(namespace: &TenantNamespace, key: &str, reason: impl Into<String>) -> StorageError {
    StorageError::Corrupt {
        namespace: namespace.name(),
        key: key.to_string(),
        reason: reason.into(),
    }
}

fn to_value<T: serde::Serialize>(
    namespace: &TenantNamespace,
    key: &str,
    value: &T,
) -> NestResult<Value> {
    serde_json::to_value(value).map_err(|e| corrupt(namespace, key, e.to_string()).into())
}

// ============================================================================
// FIELD SETS
// ============================================================================

/// Encode a field set as a store item.
pub fn encode_field_set(namespace: &TenantNamespace, set: &FieldSet) -> NestResult<Item> {
    let key = field_set_key(set.category);
    let mut item = Item::new();
    item.insert(ATTR_PK.to_string(), Value::String(key.clone()));
    item.insert(
        ATTR_CATEGORY.to_string(),
        Value::String(set.category.as_str().to_string()),
    );
    item.insert(ATTR_FIELDS.to_string(), to_value(namespace, &key, &set.fields)?);
    item.insert(
        ATTR_ASSOCIATIONS.to_string(),
        to_value(namespace, &key, &set.associations)?,
    );
    if let Some(updated_at) = set.updated_at {
        item.insert(
            ATTR_UPDATED_AT.to_string(),
            Value::String(updated_at.to_rfc3339()),
        );
    }
    Ok(item)
}

/// Read the `Fields` attribute. A missing attribute is an empty list.
pub fn decode_fields(
    namespace: &TenantNamespace,
    key: &str,
    item: &Item,
) -> NestResult<Vec<CustomField>> {
    match item.get(ATTR_FIELDS) {
        None | Some(Value::Null) => Ok(Vec::new()),
        Some(fields @ Value::Array(_)) => serde_json::from_value(fields.clone())
            .map_err(|e| corrupt(namespace, key, format!("Fields: {e}")).into()),
        Some(_) => Err(corrupt(namespace, key, "Fields is not an array").into()),
    }
}

/// Read the `Category` attribute.
///
/// Returns `Ok(None)` for a category this build does not know, so scans can
/// skip it.
pub fn decode_category(
    namespace: &TenantNamespace,
    key: &str,
    item: &Item,
) -> NestResult<Option<FieldCategory>> {
    match item.get(ATTR_CATEGORY) {
        Some(Value::String(s)) => Ok(FieldCategory::from_db_str(s).ok()),
        Some(_) => Err(corrupt(namespace, key, "Category is not a string").into()),
        None => Ok(None),
    }
}

/// Decode a whole field-set item.
pub fn decode_field_set(namespace: &TenantNamespace, key: &str, item: &Item) -> NestResult<FieldSet> {
    let category = decode_category(namespace, key, item)?
        .ok_or_else(|| corrupt(namespace, key, "missing or unknown Category"))?;
    let fields = decode_fields(namespace, key, item)?;
    let associations: Associations = match item.get(ATTR_ASSOCIATIONS) {
        None | Some(Value::Null) => Associations::default(),
        Some(value) => serde_json::from_value(value.clone())
            .map_err(|e| corrupt(namespace, key, format!("Associations: {e}")))?,
    };
    let updated_at = match item.get(ATTR_UPDATED_AT) {
        Some(Value::String(s)) => Some(
            DateTime::parse_from_rfc3339(s)
                .map_err(|e| corrupt(namespace, key, format!("UpdatedAt: {e}")))?
                .with_timezone(&Utc),
        ),
        _ => None,
    };
    Ok(FieldSet {
        category,
        fields,
        associations,
        updated_at,
    })
}

// ============================================================================
// FIELD MAPPING
// ============================================================================

pub fn encode_field_mapping(namespace: &TenantNamespace, mapping: &FieldMapping) -> NestResult<Item> {
    let mut item = Item::new();
    item.insert(
        ATTR_PK.to_string(),
        Value::String(FIELD_MAPPING_KEY.to_string()),
    );
    item.insert(
        ATTR_MAPPING.to_string(),
        to_value(namespace, FIELD_MAPPING_KEY, mapping)?,
    );
    Ok(item)
}

/// Read the `Mapping` attribute. A missing attribute is an empty mapping.
pub fn decode_field_mapping(namespace: &TenantNamespace, item: &Item) -> NestResult<FieldMapping> {
    match item.get(ATTR_MAPPING) {
        None | Some(Value::Null) => Ok(FieldMapping::new()),
        Some(value) => serde_json::from_value(value.clone())
            .map_err(|e| corrupt(namespace, FIELD_MAPPING_KEY, format!("Mapping: {e}")).into()),
    }
}
