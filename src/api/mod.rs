//! Typed client for the storefront's backend REST API.

mod client;
mod error;
pub mod types;

pub use client::ApiClient;
pub use error::ApiError;
