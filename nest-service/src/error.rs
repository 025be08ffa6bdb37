//! Service-level errors.
//!
//! Use cases return [`NestResult`](nest_core::NestResult) directly. This type
//! only adds the failures that belong to the process shell: reading input
//! files, writing output, and installing the tracing subscriber.

use std::path::PathBuf;

use nest_core::{ErrorKind, NestError};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ServiceError {
    #[error(transparent)]
    Nest(#[from] NestError),

    #[error("Failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Malformed JSON in {path}: {source}")]
    InputJson {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("Failed to write output: {0}")]
    Output(#[from] serde_json::Error),

    #[error("Failed to initialise tracing: {0}")]
    Telemetry(String),

    #[error("{0}")]
    Usage(String),
}

impl ServiceError {
    /// Error kind for domain failures, `None` for shell failures.
    pub fn kind(&self) -> Option<ErrorKind> {
        match self {
            ServiceError::Nest(e) => Some(e.kind()),
            _ => None,
        }
    }

    pub fn usage(message: impl Into<String>) -> Self {
        ServiceError::Usage(message.into())
    }
}

impl From<nest_core::ConfigError> for ServiceError {
    fn from(e: nest_core::ConfigError) -> Self {
        ServiceError::Nest(e.into())
    }
}

impl From<nest_core::ValidationError> for ServiceError {
    fn from(e: nest_core::ValidationError) -> Self {
        ServiceError::Nest(e.into())
    }
}

pub type ServiceResult<T> = Result<T, ServiceError>;

#[cfg(test)]
mod tests {
    use super::*;
    use nest_core::{ConfigError, StorageError};

    #[test]
    fn test_kind_passes_through_domain_errors() {
        let err = ServiceError::from(NestError::from(StorageError::Unavailable {
            reason: "down".to_string(),
        }));
        assert_eq!(err.kind(), Some(ErrorKind::StorageUnavailable));

        let err = ServiceError::from(ConfigError::MissingRequired {
            field: "NEST_STORE_PATH".to_string(),
        });
        assert_eq!(err.kind(), Some(ErrorKind::Config));
    }

    #[test]
    fn test_shell_errors_have_no_kind() {
        assert_eq!(ServiceError::usage("nestcrm fields <tenant>").kind(), None);
    }
}
