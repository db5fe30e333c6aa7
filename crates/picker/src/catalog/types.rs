//! Request, response and wire types for the catalog endpoint.
//!
//! The `Api*` types mirror the JSON payload and are converted into the core
//! domain types by `conversions`.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use variant_picker_core::Product;

// =============================================================================
// Request / Response
// =============================================================================

/// Parameters of a single page fetch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageRequest {
    /// Search text (may be empty).
    pub query: String,
    /// Page number (1-based).
    pub page: u32,
    /// Page size.
    pub limit: u32,
}

impl PageRequest {
    #[must_use]
    pub fn new(query: impl Into<String>, page: u32, limit: u32) -> Self {
        Self {
            query: query.into(),
            page,
            limit,
        }
    }
}

/// One page of products.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductPage {
    /// Products in the order the endpoint returned them.
    pub products: Vec<Product>,
}

// =============================================================================
// Wire Types
// =============================================================================

/// Top-level response body.
#[derive(Debug, Deserialize)]
pub(crate) struct ApiProductPage {
    #[serde(default)]
    pub products: Option<Vec<ApiProduct>>,
}

/// Product as returned by the endpoint.
#[derive(Debug, Deserialize)]
pub(crate) struct ApiProduct {
    #[serde(default)]
    pub id: Option<i64>,
    #[serde(alias = "title")]
    pub name: String,
    #[serde(default)]
    pub image: Option<ApiImage>,
    #[serde(default)]
    pub variants: Option<Vec<ApiVariant>>,
}

/// Product thumbnail.
#[derive(Debug, Deserialize)]
pub(crate) struct ApiImage {
    #[serde(default)]
    pub src: Option<String>,
}

/// Variant as returned by the endpoint.
#[derive(Debug, Deserialize)]
pub(crate) struct ApiVariant {
    #[serde(default)]
    pub id: Option<i64>,
    #[serde(default)]
    pub size: Option<String>,
    #[serde(default)]
    pub color: Option<String>,
    #[serde(default)]
    pub material: Option<String>,
    #[serde(default)]
    pub available: Option<u32>,
    pub price: Decimal,
}
