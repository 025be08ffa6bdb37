//! Tracing subscriber setup.

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::LogFormat;
use crate::error::{ServiceError, ServiceResult};

/// Filter used when `RUST_LOG` is unset.
pub const DEFAULT_FILTER: &str = "nest_service=info,nest_storage=info,warn";

/// Install the global tracing subscriber.
///
/// Call once at startup. Logs go to stderr so command output on stdout stays
/// machine-readable.
pub fn init_tracing(format: LogFormat) -> ServiceResult<()> {
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));

    let registry = tracing_subscriber::registry().with(env_filter);
    let result = match format {
        LogFormat::Json => registry
            .with(tracing_subscriber::fmt::layer().json().with_writer(std::io::stderr))
            .try_init(),
        LogFormat::Pretty => registry
            .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
            .try_init(),
    };
    result.map_err(|e| ServiceError::Telemetry(e.to_string()))?;

    tracing::debug!(?format, "Tracing initialized");
    Ok(())
}
