//! Picker error type.

use thiserror::Error;

use crate::catalog::CatalogError;

/// Errors returned by picker operations.
///
/// Fetch failures are not reported through this type while a picker is open;
/// they are recorded in the fetch state instead.
#[derive(Debug, Error)]
pub enum PickerError {
    /// An operation referenced a product or variant that is not in the
    /// current product list.
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// The picker has already been confirmed or cancelled.
    #[error("Picker is closed")]
    Closed,

    /// Catalog client could not be constructed.
    #[error("Catalog error: {0}")]
    Catalog(#[from] CatalogError),
}

/// Result type alias for `PickerError`.
pub type Result<T> = std::result::Result<T, PickerError>;
