//! Newtype IDs for server-assigned catalog identifiers.
//!
//! The catalog endpoint assigns numeric ids to products and variants. Selection
//! does not key on them (see [`VariantKey`](crate::VariantKey)), but they are
//! carried through so front ends can correlate picked variants with the
//! backend.

/// Macro to define a type-safe ID wrapper.
///
/// Creates a newtype wrapper around `i64` with:
/// - `Serialize`/`Deserialize` with `#[serde(transparent)]`
/// - `Debug`, `Clone`, `Copy`, `PartialEq`, `Eq`, `Hash`
/// - Conversion methods: `new()`, `as_i64()`
/// - `From<i64>` and `Into<i64>` implementations
///
/// # Example
///
/// ```rust
/// # use variant_picker_core::define_id;
/// define_id!(ShopId);
/// define_id!(ImageId);
///
/// let shop_id = ShopId::new(1);
/// let image_id = ImageId::new(1);
///
/// // These are different types, so this won't compile:
/// // let _: ShopId = image_id;
/// ```
#[macro_export]
macro_rules! define_id {
    ($name:ident) => {
        #[derive(
            Debug,
            Clone,
            Copy,
            PartialEq,
            Eq,
            Hash,
            ::serde::Serialize,
            ::serde::Deserialize
        )]
        #[serde(transparent)]
        pub struct $name(i64);

        impl $name {
            /// Create a new ID from an i64 value.
            #[must_use]
            pub const fn new(id: i64) -> Self {
                Self(id)
            }

            /// Get the underlying i64 value.
            #[must_use]
            pub const fn as_i64(&self) -> i64 {
                self.0
            }
        }

        impl ::core::fmt::Display for $name {
            fn fmt(&self, f: &mut ::core::fmt::Formatter<'_>) -> ::core::fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl From<i64> for $name {
            fn from(id: i64) -> Self {
                Self(id)
            }
        }

        impl From<$name> for i64 {
            fn from(id: $name) -> Self {
                id.0
            }
        }
    };
}

define_id!(ProductId);
define_id!(VariantId);

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_id_display() {
        assert_eq!(ProductId::new(77).to_string(), "77");
    }

    #[test]
    fn test_id_serde_transparent() {
        let id: VariantId = serde_json::from_str("64").unwrap();
        assert_eq!(id.as_i64(), 64);
        assert_eq!(serde_json::to_string(&id).unwrap(), "64");
    }

    #[test]
    fn test_id_conversions() {
        let id = ProductId::from(12);
        let raw: i64 = id.into();
        assert_eq!(raw, 12);
    }
}
