//! Variant Picker Core - Shared domain types.
//!
//! This crate provides the types shared by the picker library and its front
//! ends:
//! - `picker` - Selection state machine, catalog fetcher and session driver
//! - `cli` - Terminal front end
//!
//! # Architecture
//!
//! The core crate contains only types - no I/O, no HTTP clients, no async
//! runtime. This keeps it lightweight and allows it to be used anywhere.
//!
//! # Modules
//!
//! - [`types`] - Catalog types, type-safe IDs, prices and selection keys

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod types;

pub use types::*;
