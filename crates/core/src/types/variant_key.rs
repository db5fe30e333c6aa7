//! Selection key for a single variant of a product.

use core::fmt;
use core::str::FromStr;

use serde::{Deserialize, Serialize};

/// Errors that can occur when decoding a [`VariantKey`].
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum VariantKeyError {
    /// The key is not of the form `{product_name}-{variant_index}`.
    #[error("malformed variant key: {0:?}")]
    Malformed(String),
}

/// Identifier for one variant within one product.
///
/// A key is the product name and the variant's position in the product's
/// variant list joined by a hyphen, e.g. `Hat-0`. Product names may contain
/// hyphens themselves; the index never does, so the key decodes by splitting
/// at the last hyphen. Two variants share a key if and only if they share
/// both product name and position.
///
/// ## Examples
///
/// ```
/// use variant_picker_core::VariantKey;
///
/// let key = VariantKey::encode("Hat", 1);
/// assert_eq!(key.as_str(), "Hat-1");
/// assert_eq!(key.decode().unwrap(), ("Hat", 1));
///
/// let key = VariantKey::encode("T-Shirt", 0);
/// assert_eq!(key.decode().unwrap(), ("T-Shirt", 0));
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(transparent)]
pub struct VariantKey(String);

impl VariantKey {
    /// Build the key for the variant at `variant_index` of `product_name`.
    #[must_use]
    pub fn encode(product_name: &str, variant_index: usize) -> Self {
        Self(format!("{product_name}-{variant_index}"))
    }

    /// Split the key back into product name and variant index.
    ///
    /// # Errors
    ///
    /// Returns [`VariantKeyError::Malformed`] if the key has no hyphen or the
    /// part after the last hyphen is not a decimal index as `encode` writes it
    /// (no sign, no leading zeros).
    pub fn decode(&self) -> Result<(&str, usize), VariantKeyError> {
        let malformed = || VariantKeyError::Malformed(self.0.clone());
        let (name, index) = self.0.rsplit_once('-').ok_or_else(malformed)?;
        let canonical = !index.is_empty()
            && index.bytes().all(|b| b.is_ascii_digit())
            && (index == "0" || !index.starts_with('0'));
        if !canonical {
            return Err(malformed());
        }
        let index = index.parse::<usize>().map_err(|_| malformed())?;
        Ok((name, index))
    }

    /// Get the key as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Convert into the inner string.
    #[must_use]
    pub fn into_inner(self) -> String {
        self.0
    }
}

impl fmt::Display for VariantKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for VariantKey {
    type Err = VariantKeyError;

    /// Parse a key, rejecting strings that would not decode.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let key = Self(s.to_string());
        key.decode()?;
        Ok(key)
    }
}

impl AsRef<str> for VariantKey {
    fn as_ref(&self) -> &str {
        &self.0
    }
}
