//! Request bodies accepted by the use cases.
//!
//! Bodies arrive as untyped JSON. Parsing checks them in a fixed order
//! (`fields`, then `category`, then `associations`, then field names) so the
//! first problem reported is stable for a given body.

use std::collections::HashSet;

use nest_core::{Associations, CustomField, FieldCategory, ValidationError};
use serde::{Deserialize, Serialize};
use serde_json::Value;

// ============================================================================
// SAVE FIELDS
// ============================================================================

/// A validated request to replace one category's field set.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SaveFieldsRequest {
    pub category: FieldCategory,
    pub fields: Vec<CustomField>,
    #[serde(default)]
    pub associations: Associations,
}

impl SaveFieldsRequest {
    pub fn new(
        category: FieldCategory,
        fields: Vec<CustomField>,
        associations: Associations,
    ) -> Self {
        Self {
            category,
            fields,
            associations,
        }
    }

    /// Checks that hold for typed and JSON requests alike.
    ///
    /// # Errors
    ///
    /// - `RequiredFieldMissing` when associations carry no identifier
    /// - `InvalidValue` for an empty field name
    /// - `DuplicateFieldName` when a name repeats within the request
    pub fn validate(&self) -> Result<(), ValidationError> {
        if !self.associations.has_identifier() {
            return Err(ValidationError::RequiredFieldMissing {
                field: "associations.customer_id or associations.email".to_string(),
            });
        }

        let mut seen = HashSet::with_capacity(self.fields.len());
        for field in &self.fields {
            if field.name.trim().is_empty() {
                return Err(ValidationError::InvalidValue {
                    field: "fields.name".to_string(),
                    reason: "field name must not be empty".to_string(),
                });
            }
            if !seen.insert(field.name.as_str()) {
                return Err(ValidationError::DuplicateFieldName {
                    category: self.category,
                    name: field.name.clone(),
                });
            }
        }
        Ok(())
    }
}

impl TryFrom<Value> for SaveFieldsRequest {
    type Error = ValidationError;

    fn try_from(body: Value) -> Result<Self, Self::Error> {
        let Value::Object(mut body) = body else {
            return Err(ValidationError::InvalidValue {
                field: "body".to_string(),
                reason: "request body must be a JSON object".to_string(),
            });
        };

        let fields = parse_fields(body.remove("fields"))?;
        let category = parse_category(body.remove("category"))?;
        let associations = parse_associations(body.remove("associations"))?;

        let request = Self {
            category,
            fields,
            associations,
        };
        request.validate()?;
        Ok(request)
    }
}

fn parse_fields(value: Option<Value>) -> Result<Vec<CustomField>, ValidationError> {
    match value {
        None | Some(Value::Null) => Err(ValidationError::RequiredFieldMissing {
            field: "fields".to_string(),
        }),
        Some(list @ Value::Array(_)) => {
            serde_json::from_value(list).map_err(|e| ValidationError::InvalidValue {
                field: "fields".to_string(),
                reason: e.to_string(),
            })
        }
        Some(_) => Err(ValidationError::InvalidValue {
            field: "fields".to_string(),
            reason: "fields must be a list".to_string(),
        }),
    }
}

/// Absent, null, `false`, `0` and `""` all count as a missing category.
fn parse_category(value: Option<Value>) -> Result<FieldCategory, ValidationError> {
    let missing = || ValidationError::RequiredFieldMissing {
        field: "category".to_string(),
    };
    match value {
        None | Some(Value::Null) | Some(Value::Bool(false)) => Err(missing()),
        Some(Value::String(s)) if s.is_empty() => Err(missing()),
        Some(Value::Number(n)) if n.as_f64() == Some(0.0) => Err(missing()),
        Some(Value::String(s)) => {
            FieldCategory::from_db_str(&s).map_err(|e| ValidationError::InvalidValue {
                field: "category".to_string(),
                reason: e.to_string(),
            })
        }
        Some(other) => Err(ValidationError::InvalidValue {
            field: "category".to_string(),
            reason: format!("expected a category name, got {other}"),
        }),
    }
}

fn parse_associations(value: Option<Value>) -> Result<Associations, ValidationError> {
    match value {
        None | Some(Value::Null) => Ok(Associations::default()),
        Some(value @ Value::Object(_)) => {
            serde_json::from_value(value).map_err(|e| ValidationError::InvalidValue {
                field: "associations".to_string(),
                reason: e.to_string(),
            })
        }
        Some(_) => Err(ValidationError::InvalidValue {
            field: "associations".to_string(),
            reason: "associations must be an object".to_string(),
        }),
    }
}
