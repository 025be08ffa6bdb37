//! Entity types for NestCRM custom fields

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

use crate::{FieldCategory, Timestamp};

/// A tenant record: field name to value, in insertion order.
pub type Record = serde_json::Map<String, Value>;

// ============================================================================
// CUSTOM FIELD
// ============================================================================

/// A single custom field definition.
///
/// Only `name` carries meaning to the core. Every other attribute (`type`,
/// `value`, tenant metadata) is kept verbatim in `attributes`, so an explicit
/// `null` stays distinct from an absent key.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CustomField {
    pub name: String,
    #[serde(flatten)]
    pub attributes: serde_json::Map<String, Value>,
}

impl CustomField {
    /// A field with only a name.
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            attributes: serde_json::Map::new(),
        }
    }

    /// A field with a name and a string `type`.
    pub fn new(name: impl Into<String>, field_type: impl Into<String>) -> Self {
        Self::named(name).with_attribute("type", Value::String(field_type.into()))
    }

    pub fn with_attribute(mut self, key: impl Into<String>, value: Value) -> Self {
        self.attributes.insert(key.into(), value);
        self
    }

    pub fn with_value(self, value: Value) -> Self {
        self.with_attribute("value", value)
    }

    /// The `type` attribute, whatever shape the tenant gave it.
    pub fn field_type(&self) -> Option<&Value> {
        self.attributes.get("type")
    }

    /// The `value` attribute. `Some(&Value::Null)` when sent as `null`.
    pub fn value(&self) -> Option<&Value> {
        self.attributes.get("value")
    }
}

// ============================================================================
// ASSOCIATIONS
// ============================================================================

/// Entity a field-set update relates to.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Associations {
    #[serde(
        default,
        deserialize_with = "deserialize_identifier",
        skip_serializing_if = "Option::is_none"
    )]
    pub customer_id: Option<String>,
    #[serde(
        default,
        deserialize_with = "deserialize_identifier",
        skip_serializing_if = "Option::is_none"
    )]
    pub email: Option<String>,
}

impl Associations {
    pub fn customer(customer_id: impl Into<String>) -> Self {
        Self {
            customer_id: Some(customer_id.into()),
            email: None,
        }
    }

    pub fn email(email: impl Into<String>) -> Self {
        Self {
            customer_id: None,
            email: Some(email.into()),
        }
    }

    /// The customer id if present, otherwise the email. Blank values count as absent.
    pub fn primary_identifier(&self) -> Option<&str> {
        non_blank(self.customer_id.as_deref()).or_else(|| non_blank(self.email.as_deref()))
    }

    pub fn has_identifier(&self) -> bool {
        self.primary_identifier().is_some()
    }
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

/// Accept identifiers sent as strings or numbers.
fn deserialize_identifier<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    match Option::<Value>::deserialize(deserializer)? {
        None | Some(Value::Null) => Ok(None),
        Some(Value::String(s)) => Ok(Some(s)),
        Some(Value::Number(n)) => Ok(Some(n.to_string())),
        Some(other) => Err(serde::de::Error::custom(format!(
            "identifier must be a string or number, got {other}"
        ))),
    }
}

// ============================================================================
// FIELD SETS
// ============================================================================

/// The persisted unit: one category's full field list for a tenant.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldSet {
    pub category: FieldCategory,
    pub fields: Vec<CustomField>,
    pub associations: Associations,
    pub updated_at: Option<Timestamp>,
}

/// Field lists for every category. All four are always present.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct GroupedFields {
    pub customer: Vec<CustomField>,
    pub order: Vec<CustomField>,
    pub payment: Vec<CustomField>,
    pub interaction: Vec<CustomField>,
}

impl GroupedFields {
    pub fn get(&self, category: FieldCategory) -> &[CustomField] {
        match category {
            FieldCategory::Customer => &self.customer,
            FieldCategory::Order => &self.order,
            FieldCategory::Payment => &self.payment,
            FieldCategory::Interaction => &self.interaction,
        }
    }

    pub fn set(&mut self, category: FieldCategory, fields: Vec<CustomField>) {
        let slot = match category {
            FieldCategory::Customer => &mut self.customer,
            FieldCategory::Order => &mut self.order,
            FieldCategory::Payment => &mut self.payment,
            FieldCategory::Interaction => &mut self.interaction,
        };
        *slot = fields;
    }

    pub fn iter(&self) -> impl Iterator<Item = (FieldCategory, &[CustomField])> {
        FieldCategory::ALL
            .into_iter()
            .map(move |category| (category, self.get(category)))
    }

    /// True when no category has any fields.
    pub fn is_empty(&self) -> bool {
        self.iter().all(|(_, fields)| fields.is_empty())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_custom_field_preserves_unknown_attributes() {
        let raw = json!({
            "name": "loyalty_tier",
            "type": "select",
            "value": ["gold", "silver"],
            "required": true
        });
        let field: CustomField = serde_json::from_value(raw.clone()).expect("deserialize");
        assert_eq!(field.name, "loyalty_tier");
        assert_eq!(field.field_type(), Some(&json!("select")));
        assert_eq!(field.attributes.get("required"), Some(&json!(true)));
        assert_eq!(serde_json::to_value(&field).expect("serialize"), raw);
    }

    #[test]
    fn test_custom_field_null_value_survives_roundtrip() {
        let raw = json!({"name": "sku", "type": "text", "value": null});
        let field: CustomField = serde_json::from_value(raw.clone()).expect("deserialize");
        assert_eq!(field.value(), Some(&Value::Null));
        assert_eq!(serde_json::to_value(&field).expect("serialize"), raw);

        let absent: CustomField =
            serde_json::from_value(json!({"name": "sku", "type": "text"})).expect("deserialize");
        assert_eq!(absent.value(), None);
        assert_ne!(absent, field);
    }

    #[test]
    fn test_custom_field_type_is_opaque() {
        for raw in [
            json!({"name": "sku"}),
            json!({"name": "sku", "type": 7}),
            json!({"name": "sku", "type": {"kind": "enum", "options": ["a", "b"]}}),
        ] {
            let field: CustomField = serde_json::from_value(raw.clone()).expect("deserialize");
            assert_eq!(field.field_type(), raw.get("type"));
            assert_eq!(serde_json::to_value(&field).expect("serialize"), raw);
        }
    }

    #[test]
    fn test_associations_accepts_numeric_customer_id() {
        let assoc: Associations =
            serde_json::from_value(json!({"customer_id": 42})).expect("deserialize");
        assert_eq!(assoc.customer_id.as_deref(), Some("42"));
        assert!(assoc.has_identifier());
    }

    #[test]
    fn test_associations_blank_values_are_absent() {
        let assoc = Associations {
            customer_id: Some("  ".to_string()),
            email: Some(String::new()),
        };
        assert!(!assoc.has_identifier());
        assert!(!Associations::default().has_identifier());
    }

    #[test]
    fn test_associations_primary_identifier_prefers_customer_id() {
        let assoc = Associations {
            customer_id: Some("c-1".to_string()),
            email: Some("a@b.com".to_string()),
        };
        assert_eq!(assoc.primary_identifier(), Some("c-1"));
        assert_eq!(
            Associations::email("a@b.com").primary_identifier(),
            Some("a@b.com")
        );
    }

    #[test]
    fn test_associations_rejects_object_identifier() {
        let result: Result<Associations, _> =
            serde_json::from_value(json!({"email": {"value": "x"}}));
        assert!(result.is_err());
    }

    #[test]
    fn test_grouped_fields_default_has_all_categories() {
        let grouped = GroupedFields::default();
        assert!(grouped.is_empty());
        let value = serde_json::to_value(&grouped).expect("serialize");
        let object = value.as_object().expect("object");
        for category in FieldCategory::ALL {
            assert_eq!(object.get(category.as_str()), Some(&json!([])));
        }
    }

    #[test]
    fn test_grouped_fields_set_and_get() {
        let mut grouped = GroupedFields::default();
        grouped.set(FieldCategory::Order, vec![CustomField::new("sku", "text")]);
        assert_eq!(grouped.get(FieldCategory::Order).len(), 1);
        assert!(grouped.get(FieldCategory::Customer).is_empty());
        assert!(!grouped.is_empty());
    }
}
