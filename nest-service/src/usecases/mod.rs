//! Use Case Layer
//!
//! Orchestrators over the repositories. Each use case holds an `Arc` to its
//! repository and takes the tenant on every call.

mod custom_field;
mod customer;

pub use custom_field::CustomFieldUseCase;
pub use customer::CustomerUseCase;
