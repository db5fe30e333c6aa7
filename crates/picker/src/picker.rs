//! The picker aggregate.
//!
//! A [`Picker`] ties together the search text, the fetch state, the selection
//! and the open/closed lifecycle of one picker instance. All of its operations
//! are synchronous; fetching is split into [`Picker::begin_fetch`] and
//! [`Picker::complete_fetch`] so that the await point lives with whoever
//! drives the picker (see [`PickerSession`](crate::session::PickerSession)).
//!
//! # Example
//!
//! ```rust,ignore
//! let mut picker = open_picker(PickerOptions::default(), |keys| {
//!     println!("picked {keys:?}");
//! });
//!
//! let ticket = picker.begin_fetch()?;
//! let outcome = client.fetch(&ticket.request).await;
//! picker.complete_fetch(ticket.generation, outcome);
//!
//! picker.toggle_product("Hat")?;
//! picker.confirm()?;
//! ```

use tracing::debug;
use variant_picker_core::{FetchStatus, Product, Variant, VariantKey};

use crate::catalog::PageRequest;
use crate::config::PickerOptions;
use crate::error::{PickerError, Result};
use crate::fetch::{FetchApplied, FetchGeneration, FetchOutcome, FetchState};
use crate::modal::{Liveness, ModalController, ModalState};
use crate::search::{SearchController, SearchEffect};
use crate::selection::SelectionState;

/// Everything a background task needs to run one fetch and hand the result
/// back.
#[derive(Debug, Clone)]
pub struct FetchTicket {
    /// Generation to pass to [`Picker::complete_fetch`].
    pub generation: FetchGeneration,
    /// What to ask the catalog for.
    pub request: PageRequest,
    /// Revoked when the picker closes.
    pub liveness: Liveness,
}

/// Render-ready view of one product.
#[derive(Debug, Clone)]
pub struct ProductView<'a> {
    pub product: &'a Product,
    /// Every variant selected (vacuously true without variants).
    pub checked: bool,
    /// Some but not all variants selected.
    pub partial: bool,
    pub variants: Vec<VariantView<'a>>,
}

/// Render-ready view of one variant.
#[derive(Debug, Clone)]
pub struct VariantView<'a> {
    pub index: usize,
    pub key: VariantKey,
    pub variant: &'a Variant,
    pub selected: bool,
}

/// One open picker.
#[derive(Debug)]
pub struct Picker {
    search: SearchController,
    fetch: FetchState,
    selection: SelectionState,
    modal: ModalController,
    fetch_query: String,
    page: u32,
    limit: u32,
}

/// Open a picker that reports its result through `on_close`.
///
/// `on_close` runs exactly once: with an empty vector on cancel, or with the
/// selected keys (in no particular order) on confirm.
pub fn open_picker<F>(options: PickerOptions, on_close: F) -> Picker
where
    F: FnOnce(Vec<VariantKey>) + Send + 'static,
{
    Picker::open(options, on_close)
}

impl Picker {
    /// See [`open_picker`].
    pub fn open<F>(options: PickerOptions, on_close: F) -> Self
    where
        F: FnOnce(Vec<VariantKey>) + Send + 'static,
    {
        debug!(options = ?options, "picker opened");
        Self {
            search: SearchController::new(options.search),
            fetch: FetchState::new(),
            selection: SelectionState::new(),
            modal: ModalController::open(Box::new(on_close)),
            fetch_query: options.initial_query,
            page: options.page,
            limit: options.limit,
        }
    }

    // =========================================================================
    // Search
    // =========================================================================

    /// Replace the search text and clear the displayed products.
    ///
    /// The selection is untouched and the next
    /// [`begin_fetch`](Self::begin_fetch) uses the new text. Under a refetch
    /// policy the fetch in flight is superseded, so results for the old text
    /// never land, and the returned effect asks the caller to schedule a
    /// debounced fetch.
    ///
    /// # Errors
    ///
    /// Returns [`PickerError::Closed`] after the picker was resolved.
    pub fn set_query(&mut self, query: impl Into<String>) -> Result<SearchEffect> {
        self.modal.ensure_open()?;
        let effect = self.search.set_query(query);
        self.fetch.clear_products();
        self.fetch_query = self.search.query().to_string();
        if matches!(effect, SearchEffect::Refetch { .. }) {
            self.fetch.supersede();
        }
        Ok(effect)
    }

    // =========================================================================
    // Fetching
    // =========================================================================

    /// Enter `Loading` and describe the fetch to run.
    ///
    /// # Errors
    ///
    /// Returns [`PickerError::Closed`] after the picker was resolved.
    pub fn begin_fetch(&mut self) -> Result<FetchTicket> {
        self.modal.ensure_open()?;
        let generation = self.fetch.begin();
        Ok(FetchTicket {
            generation,
            request: PageRequest::new(self.fetch_query.clone(), self.page, self.limit),
            liveness: self.modal.liveness(),
        })
    }

    /// Apply the outcome of a fetch started by [`begin_fetch`](Self::begin_fetch).
    ///
    /// Completions arriving after the picker closed, or for a fetch that has
    /// since been superseded, are dropped.
    pub fn complete_fetch(
        &mut self,
        generation: FetchGeneration,
        outcome: FetchOutcome,
    ) -> FetchApplied {
        if !self.modal.is_open() {
            debug!(generation, "dropping fetch completion for closed picker");
            return FetchApplied::Discarded;
        }
        self.fetch.complete(generation, outcome)
    }

    // =========================================================================
    // Selection
    // =========================================================================

    /// Toggle one variant of the product named `product_name` in the current
    /// list.
    ///
    /// # Errors
    ///
    /// Returns [`PickerError::InvalidArgument`] if no listed product has that
    /// name or it has no variant at `variant_index`, and
    /// [`PickerError::Closed`] after the picker was resolved.
    pub fn toggle_variant(&mut self, product_name: &str, variant_index: usize) -> Result<()> {
        self.modal.ensure_open()?;
        let product = find_by_name(self.fetch.products(), product_name)?;
        check_variant_index(product, variant_index)?;
        self.selection.toggle_variant(&product.name, variant_index);
        Ok(())
    }

    /// Select or deselect every variant of the product named `product_name`.
    ///
    /// # Errors
    ///
    /// Same as [`toggle_variant`](Self::toggle_variant).
    pub fn toggle_product(&mut self, product_name: &str) -> Result<()> {
        self.modal.ensure_open()?;
        let product = find_by_name(self.fetch.products(), product_name)?;
        self.selection.toggle_product(product);
        Ok(())
    }

    /// Toggle a variant addressed by list position, for front ends that
    /// number the rows they render.
    ///
    /// # Errors
    ///
    /// Same as [`toggle_variant`](Self::toggle_variant).
    pub fn toggle_variant_at(&mut self, product_index: usize, variant_index: usize) -> Result<()> {
        self.modal.ensure_open()?;
        let product = find_by_index(self.fetch.products(), product_index)?;
        check_variant_index(product, variant_index)?;
        self.selection.toggle_variant(&product.name, variant_index);
        Ok(())
    }

    /// Aggregate toggle of the product at `product_index`.
    ///
    /// # Errors
    ///
    /// Same as [`toggle_variant`](Self::toggle_variant).
    pub fn toggle_product_at(&mut self, product_index: usize) -> Result<()> {
        self.modal.ensure_open()?;
        let product = find_by_index(self.fetch.products(), product_index)?;
        self.selection.toggle_product(product);
        Ok(())
    }

    #[must_use]
    pub fn is_product_fully_selected(&self, product: &Product) -> bool {
        self.selection.is_product_fully_selected(product)
    }

    #[must_use]
    pub fn has_partial_selection(&self, product: &Product) -> bool {
        self.selection.has_partial_selection(product)
    }

    #[must_use]
    pub fn is_selected(&self, key: &VariantKey) -> bool {
        self.selection.is_selected(key)
    }

    #[must_use]
    pub fn selection_count(&self) -> usize {
        self.selection.selection_count()
    }

    // =========================================================================
    // Lifecycle
    // =========================================================================

    /// Close, reporting an empty result. The selection is discarded.
    ///
    /// # Errors
    ///
    /// Returns [`PickerError::Closed`] if the picker was already resolved.
    pub fn cancel(&mut self) -> Result<()> {
        self.modal.cancel()?;
        self.selection = SelectionState::new();
        Ok(())
    }

    /// Close, reporting every selected key.
    ///
    /// # Errors
    ///
    /// Returns [`PickerError::Closed`] if the picker was already resolved.
    pub fn confirm(&mut self) -> Result<()> {
        self.modal.ensure_open()?;
        let selection = std::mem::take(&mut self.selection);
        self.modal.confirm(selection.into_keys())
    }

    #[must_use]
    pub const fn state(&self) -> ModalState {
        self.modal.state()
    }

    #[must_use]
    pub const fn is_open(&self) -> bool {
        self.modal.is_open()
    }

    // =========================================================================
    // Projections
    // =========================================================================

    #[must_use]
    pub fn query(&self) -> &str {
        self.search.query()
    }

    #[must_use]
    pub fn products(&self) -> &[Product] {
        self.fetch.products()
    }

    #[must_use]
    pub const fn fetch_status(&self) -> FetchStatus {
        self.fetch.status()
    }

    #[must_use]
    pub fn last_error(&self) -> Option<&str> {
        self.fetch.last_error()
    }

    /// Per-product checkbox state for rendering.
    #[must_use]
    pub fn product_views(&self) -> Vec<ProductView<'_>> {
        self.fetch
            .products()
            .iter()
            .map(|product| ProductView {
                product,
                checked: self.selection.is_product_fully_selected(product),
                partial: self.selection.has_partial_selection(product),
                variants: product
                    .variants
                    .iter()
                    .zip(product.variant_keys())
                    .enumerate()
                    .map(|(index, (variant, key))| VariantView {
                        index,
                        selected: self.selection.is_selected(&key),
                        key,
                        variant,
                    })
                    .collect(),
            })
            .collect()
    }
}

fn find_by_name<'a>(products: &'a [Product], name: &str) -> Result<&'a Product> {
    products
        .iter()
        .find(|product| product.name == name)
        .ok_or_else(|| PickerError::InvalidArgument(format!("no product named {name:?} is listed")))
}

fn find_by_index(products: &[Product], index: usize) -> Result<&Product> {
    products.get(index).ok_or_else(|| {
        PickerError::InvalidArgument(format!(
            "product {index} is out of range ({} listed)",
            products.len()
        ))
    })
}

fn check_variant_index(product: &Product, index: usize) -> Result<()> {
    if index < product.variants.len() {
        Ok(())
    } else {
        Err(PickerError::InvalidArgument(format!(
            "{:?} has no variant {index} ({} variants)",
            product.name,
            product.variants.len()
        )))
    }
}
