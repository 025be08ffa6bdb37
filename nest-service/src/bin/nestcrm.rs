//! NestCRM command-line entry point.
//!
//! Usage:
//!   nestcrm fields <tenant> [category]
//!   nestcrm payload <tenant>
//!   nestcrm save-fields <tenant> <json-file>
//!   nestcrm customers <tenant>
//!   nestcrm save-customer <tenant> <json-file>
//!
//! The store is selected through `NEST_*` environment variables; see
//! [`ServiceConfig::from_env`].

use std::path::{Path, PathBuf};
use std::process::ExitCode;

use nest_core::{FieldCategory, TenantId, ValidationError};
use nest_service::telemetry::init_tracing;
use nest_service::{ServiceConfig, ServiceError, ServiceResult, Services};
use serde::Serialize;
use serde_json::Value;

const USAGE: &str = "\
Usage:
  nestcrm fields <tenant> [category]
  nestcrm payload <tenant>
  nestcrm save-fields <tenant> <json-file>
  nestcrm customers <tenant>
  nestcrm save-customer <tenant> <json-file>";

enum Command {
    Fields {
        tenant: TenantId,
        category: Option<FieldCategory>,
    },
    Payload {
        tenant: TenantId,
    },
    SaveFields {
        tenant: TenantId,
        path: PathBuf,
    },
    Customers {
        tenant: TenantId,
    },
    SaveCustomer {
        tenant: TenantId,
        path: PathBuf,
    },
}

impl Command {
    fn parse(args: &[String]) -> ServiceResult<Self> {
        let arg = |i: usize| args.get(i).map(String::as_str);
        let tenant = || -> ServiceResult<TenantId> {
            let raw = arg(1).ok_or_else(|| ServiceError::usage(USAGE))?;
            Ok(TenantId::parse(raw)?)
        };
        let path = || -> ServiceResult<PathBuf> {
            arg(2)
                .map(PathBuf::from)
                .ok_or_else(|| ServiceError::usage(USAGE))
        };

        match arg(0) {
            Some("fields") => {
                let category = match arg(2) {
                    Some(raw) => Some(FieldCategory::from_db_str(raw).map_err(|e| {
                        ValidationError::InvalidValue {
                            field: "category".to_string(),
                            reason: e.to_string(),
                        }
                    })?),
                    None => None,
                };
                Ok(Command::Fields {
                    tenant: tenant()?,
                    category,
                })
            }
            Some("payload") => Ok(Command::Payload { tenant: tenant()? }),
            Some("save-fields") => Ok(Command::SaveFields {
                tenant: tenant()?,
                path: path()?,
            }),
            Some("customers") => Ok(Command::Customers { tenant: tenant()? }),
            Some("save-customer") => Ok(Command::SaveCustomer {
                tenant: tenant()?,
                path: path()?,
            }),
            _ => Err(ServiceError::usage(USAGE)),
        }
    }
}

fn read_json(path: &Path) -> ServiceResult<Value> {
    let content = std::fs::read_to_string(path).map_err(|source| ServiceError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    serde_json::from_str(&content).map_err(|source| ServiceError::InputJson {
        path: path.to_path_buf(),
        source,
    })
}

fn print_json<T: Serialize>(value: &T) -> ServiceResult<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

async fn run(command: Command, services: &Services) -> ServiceResult<()> {
    match command {
        Command::Fields {
            tenant,
            category: Some(category),
        } => print_json(&services.custom_fields.get_fields(&tenant, category).await?),
        Command::Fields {
            tenant,
            category: None,
        } => print_json(
            &services
                .custom_fields
                .get_all_fields_grouped_by_category(&tenant)
                .await?,
        ),
        Command::Payload { tenant } => {
            print_json(&services.custom_fields.generate_payload(&tenant).await?)
        }
        Command::SaveFields { tenant, path } => {
            let body = read_json(&path)?;
            services.custom_fields.save_fields_json(&tenant, body).await?;
            tracing::info!(tenant_id = %tenant, "Fields saved successfully");
            Ok(())
        }
        Command::Customers { tenant } => {
            print_json(&services.customers.get_customers(&tenant).await?)
        }
        Command::SaveCustomer { tenant, path } => {
            let body = read_json(&path)?;
            services.customers.save_customer(&tenant, body).await?;
            tracing::info!(tenant_id = %tenant, "Customer created successfully");
            Ok(())
        }
    }
}

async fn try_main(args: &[String]) -> ServiceResult<()> {
    let config = ServiceConfig::from_env()?;
    init_tracing(config.log_format)?;
    let command = Command::parse(args)?;
    let services = Services::from_config(&config)?;
    run(command, &services).await
}

#[tokio::main]
async fn main() -> ExitCode {
    let args: Vec<String> = std::env::args().skip(1).collect();

    match try_main(&args).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(ServiceError::Usage(usage)) => {
            eprintln!("{usage}");
            ExitCode::from(2)
        }
        Err(e) => {
            tracing::error!(error = %e, kind = ?e.kind(), "Command failed");
            eprintln!("error: {e}");
            ExitCode::FAILURE
        }
    }
}
