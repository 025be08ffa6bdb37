//! NestCRM Core - Custom Field Types
//!
//! Data types shared by every other crate in the workspace: tenant identity,
//! field categories, custom field definitions, tenant records, the field
//! mapping engine, and the error taxonomy.
//!
//! Nothing in this crate performs I/O.

pub mod entities;
pub mod enums;
pub mod error;
pub mod identity;
pub mod mapping;

pub use entities::{Associations, CustomField, FieldSet, GroupedFields, Record};
pub use enums::{CategoryParseError, FieldCategory, StoreTable};
pub use error::{
    ConfigError, ErrorKind, NestError, NestResult, StorageError, ValidationError,
};
pub use identity::{TenantId, Timestamp};
pub use mapping::{remap_record, remap_records, FieldMapping, PredictionPayload, ReverseIndex};
