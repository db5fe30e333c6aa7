//! Catalog product search.
//!
//! # Architecture
//!
//! - [`CatalogSource`] is the seam between the picker and the transport; the
//!   picker session only ever sees `Result<ProductPage, CatalogError>`
//! - [`CatalogClient`] implements it over HTTP with `reqwest`
//! - One request per fetch: no retries, no timeout, no caching
//!
//! # Endpoint
//!
//! `GET <endpoint>?search=<query>&page=<page>&limit=<limit>` with the API key
//! in an `x-api-key` header. The response body is
//! `{ "products": [ { "name", "variants": [ ... ] } ] }`.
//!
//! # Example
//!
//! ```rust,ignore
//! use variant_picker::catalog::{CatalogClient, CatalogSource, PageRequest};
//!
//! let client = CatalogClient::new(&config.catalog)?;
//! let page = client.fetch(&PageRequest::new("Hat", 1, 10)).await?;
//! ```

mod client;
mod conversions;
pub mod types;

use std::future::Future;

pub use client::CatalogClient;
pub use types::{PageRequest, ProductPage};

use thiserror::Error;

/// Errors that can occur when fetching a catalog page.
#[derive(Debug, Error)]
pub enum CatalogError {
    /// HTTP request failed.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Endpoint returned a non-success status.
    #[error("API error: {status} - {message}")]
    Api { status: u16, message: String },

    /// JSON parsing failed.
    #[error("JSON parse error: {0}")]
    Parse(#[from] serde_json::Error),

    /// Configured API key cannot be sent as a header.
    #[error("Invalid API key: {0}")]
    InvalidApiKey(String),

    /// Response parsed but violates catalog invariants.
    #[error("Invalid payload: {0}")]
    InvalidPayload(String),
}

/// A source of catalog pages.
///
/// Implementations issue a single logical request per call and report
/// failures instead of retrying.
pub trait CatalogSource: Send + Sync + 'static {
    /// Fetch one page of products matching `request`.
    fn fetch(
        &self,
        request: &PageRequest,
    ) -> impl Future<Output = Result<ProductPage, CatalogError>> + Send;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_api_error_display() {
        let err = CatalogError::Api {
            status: 401,
            message: "missing api key".to_string(),
        };
        assert_eq!(err.to_string(), "API error: 401 - missing api key");
    }

    #[test]
    fn test_invalid_payload_display() {
        let err = CatalogError::InvalidPayload("negative price".to_string());
        assert_eq!(err.to_string(), "Invalid payload: negative price");
    }

    #[test]
    fn test_parse_error_from_serde() {
        let serde_err = serde_json::from_str::<serde_json::Value>("{").unwrap_err();
        let err = CatalogError::from(serde_err);
        assert!(err.to_string().starts_with("JSON parse error:"));
    }
}
