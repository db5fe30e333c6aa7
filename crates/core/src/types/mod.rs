//! Core types for the variant picker.
//!
//! This module provides type-safe wrappers for catalog and selection concepts.

pub mod id;
pub mod price;
pub mod product;
pub mod status;
pub mod variant_key;

pub use id::*;
pub use price::{Price, PriceError};
pub use product::{Product, Variant};
pub use status::FetchStatus;
pub use variant_key::{VariantKey, VariantKeyError};
