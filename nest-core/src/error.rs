//! Error types for NestCRM operations

use crate::FieldCategory;
use thiserror::Error;

/// Storage layer errors.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum StorageError {
    #[error("Storage unavailable: {reason}")]
    Unavailable { reason: String },

    #[error("Corrupt item {key} in {namespace}: {reason}")]
    Corrupt {
        namespace: String,
        key: String,
        reason: String,
    },

    #[error("Storage lock poisoned")]
    LockPoisoned,
}

/// Validation errors.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Required field missing: {field}")]
    RequiredFieldMissing { field: String },

    #[error("Invalid value for {field}: {reason}")]
    InvalidValue { field: String, reason: String },

    #[error("Duplicate field name {name:?} in {category} field set")]
    DuplicateFieldName { category: FieldCategory, name: String },

    #[error("Tenant field {tenant_field:?} is mapped from both {first:?} and {second:?}")]
    DuplicateMappingTarget {
        tenant_field: String,
        first: String,
        second: String,
    },

    #[error("Invalid tenant id {value:?}: {reason}")]
    InvalidTenantId { value: String, reason: String },
}

/// Configuration errors.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("Missing required configuration field: {field}")]
    MissingRequired { field: String },

    #[error("Invalid value for {field}: {value} - {reason}")]
    InvalidValue {
        field: String,
        value: String,
        reason: String,
    },
}

/// Master error type for all NestCRM errors.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum NestError {
    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    #[error("Config error: {0}")]
    Config(#[from] ConfigError),
}

/// Coarse error classification for callers that map errors to responses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// Malformed or missing request data. Raised before any I/O, never retried.
    InvalidInput,
    /// The underlying store failed.
    StorageUnavailable,
    /// Service configuration is invalid.
    Config,
}

impl NestError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            NestError::Validation(_) => ErrorKind::InvalidInput,
            NestError::Storage(_) => ErrorKind::StorageUnavailable,
            NestError::Config(_) => ErrorKind::Config,
        }
    }

    pub fn is_invalid_input(&self) -> bool {
        self.kind() == ErrorKind::InvalidInput
    }
}

/// Result type alias for NestCRM operations.
pub type NestResult<T> = Result<T, NestError>;

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_storage_error_display_unavailable() {
        let err = StorageError::Unavailable {
            reason: "connection reset".to_string(),
        };
        let msg = format!("{}", err);
        assert!(msg.contains("Storage unavailable"));
        assert!(msg.contains("connection reset"));
    }

    #[test]
    fn test_storage_error_display_corrupt() {
        let err = StorageError::Corrupt {
            namespace: "NestCRM-acme-CustomFields".to_string(),
            key: "CustomFieldSet#Order".to_string(),
            reason: "Fields is not an array".to_string(),
        };
        let msg = format!("{}", err);
        assert!(msg.contains("NestCRM-acme-CustomFields"));
        assert!(msg.contains("CustomFieldSet#Order"));
    }

    #[test]
    fn test_validation_error_display_duplicate_field() {
        let err = ValidationError::DuplicateFieldName {
            category: FieldCategory::Payment,
            name: "amount".to_string(),
        };
        let msg = format!("{}", err);
        assert!(msg.contains("Payment"));
        assert!(msg.contains("amount"));
    }

    #[test]
    fn test_config_error_display_invalid_value() {
        let err = ConfigError::InvalidValue {
            field: "NEST_STORE_BACKEND".to_string(),
            value: "redis".to_string(),
            reason: "expected lmdb or memory".to_string(),
        };
        let msg = format!("{}", err);
        assert!(msg.contains("NEST_STORE_BACKEND"));
        assert!(msg.contains("redis"));
    }

    #[test]
    fn test_nest_error_kinds() {
        let storage = NestError::from(StorageError::LockPoisoned);
        assert_eq!(storage.kind(), ErrorKind::StorageUnavailable);

        let validation = NestError::from(ValidationError::RequiredFieldMissing {
            field: "category".to_string(),
        });
        assert_eq!(validation.kind(), ErrorKind::InvalidInput);
        assert!(validation.is_invalid_input());

        let config = NestError::from(ConfigError::MissingRequired {
            field: "NEST_STORE_PATH".to_string(),
        });
        assert_eq!(config.kind(), ErrorKind::Config);
        assert!(!config.is_invalid_input());
    }
}
