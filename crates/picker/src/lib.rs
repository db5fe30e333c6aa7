//! Variant picker library.
//!
//! A modal-style picker that fetches one page of products from a catalog
//! search endpoint, lets the caller select individual variants or whole
//! products, and reports the selected variant keys when it is confirmed.
//!
//! - [`picker::Picker`] is the synchronous state machine
//! - [`session::PickerSession`] drives it on Tokio against a
//!   [`catalog::CatalogSource`]
//! - [`config::AppConfig`] loads the endpoint, API key and picker options from
//!   the environment

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod catalog;
pub mod config;
pub mod error;
pub mod fetch;
pub mod modal;
pub mod picker;
pub mod search;
pub mod selection;
pub mod session;

pub use error::{PickerError, Result};
pub use picker::{FetchTicket, Picker, ProductView, VariantView, open_picker};
pub use session::{PickerSession, SessionUpdate};
