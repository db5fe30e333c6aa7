//! Variant selection state.
//!
//! The selection is a flat set of [`VariantKey`]s. Product-level state is
//! derived from it on demand: a product is "fully selected" when every one of
//! its variant keys is in the set. There is no stored per-product flag to keep
//! in sync.
//!
//! Keys are never garbage-collected. A key whose product dropped out of the
//! current product list stays selected and becomes visible again if a later
//! fetch brings the same name and position back.

use std::collections::HashSet;

use tracing::debug;
use variant_picker_core::{Product, VariantKey};

/// Set of selected variants with aggregate per-product toggles.
#[derive(Debug, Clone, Default)]
pub struct SelectionState {
    selected: HashSet<VariantKey>,
}

impl SelectionState {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Flip membership of the variant at `variant_index` of `product_name`.
    pub fn toggle_variant(&mut self, product_name: &str, variant_index: usize) {
        let key = VariantKey::encode(product_name, variant_index);
        if self.selected.remove(&key) {
            debug!(key = %key, "variant deselected");
        } else {
            debug!(key = %key, "variant selected");
            self.selected.insert(key);
        }
    }

    /// Whether every variant of `product` is selected.
    ///
    /// A product without variants is vacuously fully selected.
    #[must_use]
    pub fn is_product_fully_selected(&self, product: &Product) -> bool {
        product.variant_keys().all(|key| self.selected.contains(&key))
    }

    /// Whether some, but not all, variants of `product` are selected.
    #[must_use]
    pub fn has_partial_selection(&self, product: &Product) -> bool {
        let selected = product
            .variant_keys()
            .filter(|key| self.selected.contains(key))
            .count();
        selected > 0 && selected < product.variants.len()
    }

    /// Select every variant of `product`, or deselect all of them if they were
    /// all selected before the call.
    ///
    /// A product without variants is left untouched.
    pub fn toggle_product(&mut self, product: &Product) {
        if self.is_product_fully_selected(product) {
            for key in product.variant_keys() {
                self.selected.remove(&key);
            }
            debug!(product = %product.name, "product deselected");
        } else {
            self.selected.extend(product.variant_keys());
            debug!(product = %product.name, "product selected");
        }
    }

    /// Whether `key` is selected.
    #[must_use]
    pub fn is_selected(&self, key: &VariantKey) -> bool {
        self.selected.contains(key)
    }

    /// Number of selected variants, across all products ever fetched.
    #[must_use]
    pub fn selection_count(&self) -> usize {
        self.selected.len()
    }

    /// Consume the selection, yielding its keys in no particular order.
    #[must_use]
    pub fn into_keys(self) -> Vec<VariantKey> {
        self.selected.into_iter().collect()
    }
}
