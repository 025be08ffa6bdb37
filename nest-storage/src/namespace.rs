//! Tenant-scoped storage namespaces.
//!
//! Every store operation takes a [`TenantNamespace`], and the only way to get
//! one is from a validated [`TenantId`]. No store API accepts a raw namespace
//! string, so a query against another tenant's data cannot be expressed.

use nest_core::{StoreTable, TenantId};

/// Separator byte between the namespace name and the item key.
///
/// 0xFF never appears in UTF-8, so it cannot occur inside a namespace name or
/// a key and the boundary between them is unambiguous.
const SEPARATOR: u8 = 0xFF;

/// Prefix shared by all namespace names.
const NAMESPACE_PREFIX: &str = "NestCRM";

/// A logical table belonging to exactly one tenant.
///
/// # Binary Format
///
/// Encoded keys are `[namespace name][0xFF][item key]`, which keeps a
/// tenant's table contiguous in an ordered store and lets a key prefix scan
/// stay inside one namespace.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TenantNamespace {
    /// Private inner data - cannot be constructed externally
    inner: NamespaceInner,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct NamespaceInner {
    tenant_id: TenantId,
    table: StoreTable,
}

impl TenantNamespace {
    pub fn new(tenant_id: &TenantId, table: StoreTable) -> Self {
        Self {
            inner: NamespaceInner {
                tenant_id: tenant_id.clone(),
                table,
            },
        }
    }

    /// The tenant's field-set table.
    pub fn custom_fields(tenant_id: &TenantId) -> Self {
        Self::new(tenant_id, StoreTable::CustomFields)
    }

    /// The tenant's customer-record table.
    pub fn customers(tenant_id: &TenantId) -> Self {
        Self::new(tenant_id, StoreTable::Customers)
    }

    pub fn tenant_id(&self) -> &TenantId {
        &self.inner.tenant_id
    }

    pub fn table(&self) -> StoreTable {
        self.inner.table
    }

    /// Table name, e.g. `NestCRM-acme-CustomFields`.
    pub fn name(&self) -> String {
        format!(
            "{}-{}-{}",
            NAMESPACE_PREFIX, self.inner.tenant_id, self.inner.table
        )
    }

    /// Encode an item key for an ordered byte store.
    pub fn encode_key(&self, key: &str) -> Vec<u8> {
        let name = self.name();
        let mut bytes = Vec::with_capacity(name.len() + 1 + key.len());
        bytes.extend_from_slice(name.as_bytes());
        bytes.push(SEPARATOR);
        bytes.extend_from_slice(key.as_bytes());
        bytes
    }

    /// Byte prefix matching every key in this namespace that starts with `prefix`.
    pub fn encode_prefix(&self, prefix: &str) -> Vec<u8> {
        self.encode_key(prefix)
    }

    /// Recover the item key from an encoded key.
    ///
    /// Returns `None` if the bytes belong to a different namespace or the key
    /// is not valid UTF-8.
    pub fn decode_key(&self, bytes: &[u8]) -> Option<String> {
        let head = self.encode_key("");
        let rest = bytes.strip_prefix(head.as_slice())?;
        String::from_utf8(rest.to_vec()).ok()
    }
}
