//! Catalog products and their purchasable variants.

use serde::{Deserialize, Serialize};

use crate::types::id::{ProductId, VariantId};
use crate::types::price::Price;
use crate::types::variant_key::VariantKey;

/// A purchasable configuration of a product.
///
/// A variant has no selection identity of its own: it is addressed by its
/// position in [`Product::variants`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Variant {
    /// Server-assigned ID, if the catalog reports one.
    pub id: Option<VariantId>,
    /// Size label (e.g., "M").
    pub size: String,
    /// Color label (e.g., "Navy").
    pub color: String,
    /// Material label (e.g., "Wool").
    pub material: String,
    /// Units in stock.
    pub available: u32,
    /// Unit price.
    pub price: Price,
}

impl Variant {
    /// Human-readable option summary, e.g. `M / Navy / Wool`.
    #[must_use]
    pub fn label(&self) -> String {
        format!("{} / {} / {}", self.size, self.color, self.material)
    }
}

/// A catalog product.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Product {
    /// Server-assigned ID, if the catalog reports one.
    pub id: Option<ProductId>,
    /// Display name. Selection keys are derived from it, so two products
    /// sharing a name share their selection keys.
    pub name: String,
    /// Thumbnail URL.
    pub image_url: Option<String>,
    /// Variants in catalog order. The order defines the indices used in
    /// selection keys.
    pub variants: Vec<Variant>,
}

impl Product {
    /// Create a product without server IDs or image.
    #[must_use]
    pub fn new(name: impl Into<String>, variants: Vec<Variant>) -> Self {
        Self {
            id: None,
            name: name.into(),
            image_url: None,
            variants,
        }
    }

    /// Selection key of the variant at `index`, if the product has one there.
    #[must_use]
    pub fn variant_key(&self, index: usize) -> Option<VariantKey> {
        (index < self.variants.len()).then(|| VariantKey::encode(&self.name, index))
    }

    /// Selection keys of every variant, in catalog order.
    pub fn variant_keys(&self) -> impl Iterator<Item = VariantKey> + '_ {
        (0..self.variants.len()).map(|index| VariantKey::encode(&self.name, index))
    }
}
