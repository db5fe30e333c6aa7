//! Catalog fetch lifecycle for one picker.
//!
//! Fetches are numbered. Starting a fetch bumps the generation; only the
//! completion carrying the current generation is applied, so a slow response
//! can never overwrite the result of a request issued after it.

use tracing::{debug, error, info};
use variant_picker_core::{FetchStatus, Product};

use crate::catalog::{CatalogError, ProductPage};

/// Monotonic fetch counter.
pub type FetchGeneration = u64;

/// Result of one fetch as delivered back to the picker.
pub type FetchOutcome = Result<ProductPage, CatalogError>;

/// How a completion was handled.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchApplied {
    /// The completion replaced the product list (or recorded a failure).
    Applied,
    /// A newer fetch was started after this one; the completion was dropped.
    Stale,
    /// The picker was already closed; the completion was dropped.
    Discarded,
}

/// Fetch status and current product list.
#[derive(Debug, Default)]
pub struct FetchState {
    status: FetchStatus,
    products: Vec<Product>,
    last_error: Option<String>,
    generation: FetchGeneration,
}

impl FetchState {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Enter `Loading` with an empty list and return the generation the
    /// completion must carry.
    pub fn begin(&mut self) -> FetchGeneration {
        self.generation += 1;
        self.status = FetchStatus::Loading;
        self.products.clear();
        debug!(generation = self.generation, "fetch started");
        self.generation
    }

    /// Apply the outcome of fetch `generation`.
    ///
    /// Success replaces the product list wholesale. Failure is logged and
    /// recorded in [`last_error`](Self::last_error), leaving the list empty;
    /// it is not returned to the caller.
    pub fn complete(&mut self, generation: FetchGeneration, outcome: FetchOutcome) -> FetchApplied {
        if generation != self.generation {
            debug!(
                generation,
                current = self.generation,
                "ignoring stale fetch completion"
            );
            return FetchApplied::Stale;
        }

        match outcome {
            Ok(page) => {
                info!(generation, products = page.products.len(), "catalog page loaded");
                self.status = FetchStatus::Ready;
                self.products = page.products;
                self.last_error = None;
            }
            Err(e) => {
                error!(generation, error = %e, "Error fetching products");
                self.status = FetchStatus::Failed;
                self.products.clear();
                self.last_error = Some(e.to_string());
            }
        }
        FetchApplied::Applied
    }

    /// Drop the displayed products without touching the status.
    pub fn clear_products(&mut self) {
        self.products.clear();
    }

    /// Invalidate the fetch in flight without starting a new one. Its
    /// completion will report [`FetchApplied::Stale`].
    pub fn supersede(&mut self) {
        self.generation += 1;
        debug!(generation = self.generation, "in-flight fetch superseded");
    }

    #[must_use]
    pub const fn status(&self) -> FetchStatus {
        self.status
    }

    /// Current product list. Empty unless the status is `Ready`, and also
    /// empty after a search edit until the next fetch lands.
    #[must_use]
    pub fn products(&self) -> &[Product] {
        &self.products
    }

    /// Message of the last failed fetch, cleared by the next success.
    #[must_use]
    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }
}
