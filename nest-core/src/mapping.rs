//! Field mapping engine.
//!
//! A tenant stores its records under its own field names. The prediction
//! pipeline expects canonical (model-facing) names. A [`FieldMapping`] records
//! `canonical -> tenant` pairs; remapping inverts it once and renames every
//! mapped key in every record, leaving unmapped keys as they are.

use std::collections::HashMap;
use std::fmt;

use serde::de::{MapAccess, Visitor};
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::{Record, ValidationError};

// ============================================================================
// FIELD MAPPING
// ============================================================================

/// Ordered `canonical field -> tenant field` mapping for one tenant.
///
/// Mappings built through [`FieldMapping::insert`] never repeat a tenant
/// field. Deserialisation accepts whatever the provisioning side stored: a
/// repeated tenant field is kept, and the later entry wins in the reverse
/// index (see [`FieldMapping::shadowed`]). Serialises as a JSON object in
/// insertion order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FieldMapping {
    entries: Vec<(String, String)>,
}

impl FieldMapping {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a mapping from `(canonical, tenant)` pairs.
    pub fn from_pairs<I, K, V>(pairs: I) -> Result<Self, ValidationError>
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        let mut mapping = Self::new();
        for (canonical, tenant) in pairs {
            mapping.insert(canonical, tenant)?;
        }
        Ok(mapping)
    }

    /// Map `canonical` to `tenant_field`.
    ///
    /// Re-inserting an existing canonical name replaces its target in place.
    /// Fails if another canonical name already targets `tenant_field`.
    pub fn insert(
        &mut self,
        canonical: impl Into<String>,
        tenant_field: impl Into<String>,
    ) -> Result<(), ValidationError> {
        let canonical = canonical.into();
        let tenant_field = tenant_field.into();

        if let Some((other, _)) = self
            .entries
            .iter()
            .find(|(c, t)| *t == tenant_field && *c != canonical)
        {
            return Err(ValidationError::DuplicateMappingTarget {
                tenant_field,
                first: other.clone(),
                second: canonical,
            });
        }

        self.upsert(canonical, tenant_field);
        Ok(())
    }

    fn upsert(&mut self, canonical: String, tenant_field: String) {
        match self.entries.iter_mut().find(|(c, _)| *c == canonical) {
            Some(entry) => entry.1 = tenant_field,
            None => self.entries.push((canonical, tenant_field)),
        }
    }

    /// Entries whose tenant field is targeted again by a later entry.
    ///
    /// Returned as `(canonical, tenant field)`. These canonical names never
    /// appear in remapped records.
    pub fn shadowed(&self) -> Vec<(&str, &str)> {
        self.entries
            .iter()
            .enumerate()
            .filter(|(i, (_, tenant))| self.entries[i + 1..].iter().any(|(_, t)| t == tenant))
            .map(|(_, (c, t))| (c.as_str(), t.as_str()))
            .collect()
    }

    /// Tenant field name for a canonical name.
    pub fn get(&self, canonical: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(c, _)| c == canonical)
            .map(|(_, t)| t.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(c, t)| (c.as_str(), t.as_str()))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Invert the mapping into a `tenant -> canonical` lookup.
    ///
    /// When a tenant field repeats, the entry inserted last wins.
    pub fn reverse_index(&self) -> ReverseIndex<'_> {
        ReverseIndex {
            by_tenant: self
                .entries
                .iter()
                .map(|(c, t)| (t.as_str(), c.as_str()))
                .collect(),
        }
    }
}

impl Serialize for FieldMapping {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (canonical, tenant) in &self.entries {
            map.serialize_entry(canonical, tenant)?;
        }
        map.end()
    }
}

impl<'de> Deserialize<'de> for FieldMapping {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct MappingVisitor;

        impl<'de> Visitor<'de> for MappingVisitor {
            type Value = FieldMapping;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("an object of canonical field names to tenant field names")
            }

            fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> Result<Self::Value, A::Error> {
                let mut mapping = FieldMapping::new();
                while let Some((canonical, tenant)) = access.next_entry::<String, String>()? {
                    mapping.upsert(canonical, tenant);
                }
                Ok(mapping)
            }
        }

        deserializer.deserialize_map(MappingVisitor)
    }
}

/// `tenant field -> canonical field` lookup borrowed from a [`FieldMapping`].
#[derive(Debug, Clone)]
pub struct ReverseIndex<'a> {
    by_tenant: HashMap<&'a str, &'a str>,
}

impl<'a> ReverseIndex<'a> {
    pub fn canonical_for(&self, tenant_field: &str) -> Option<&'a str> {
        self.by_tenant.get(tenant_field).copied()
    }
}

// ============================================================================
// REMAPPING
// ============================================================================

/// Rename the mapped keys of one record.
///
/// Keys without a mapping pass through. When two keys land on the same
/// canonical name the later one in record order wins, and the key keeps the
/// position where it was first written.
pub fn remap_record(record: Record, reverse: &ReverseIndex<'_>) -> Record {
    let mut transformed = Record::with_capacity(record.len());
    for (key, value) in record {
        match reverse.canonical_for(&key) {
            Some(canonical) => transformed.insert(canonical.to_string(), value),
            None => transformed.insert(key, value),
        };
    }
    transformed
}

/// Remap every record with one reverse index built up front.
pub fn remap_records(mapping: &FieldMapping, records: Vec<Record>) -> Vec<Record> {
    let reverse = mapping.reverse_index();
    records
        .into_iter()
        .map(|record| remap_record(record, &reverse))
        .collect()
}

// ============================================================================
// PAYLOAD
// ============================================================================

/// Remapped records plus the mapping used, handed to the prediction pipeline.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PredictionPayload {
    pub field_mapping: FieldMapping,
    pub data: Vec<Record>,
}

impl PredictionPayload {
    pub fn build(field_mapping: FieldMapping, raw: Vec<Record>) -> Self {
        let data = remap_records(&field_mapping, raw);
        Self {
            field_mapping,
            data,
        }
    }
}
