//! Wire type conversion functions.

use std::collections::HashSet;

use tracing::warn;
use variant_picker_core::{Price, Product, ProductId, Variant, VariantId};

use super::CatalogError;
use super::types::{ApiProduct, ApiProductPage, ApiVariant, ProductPage};

/// Convert a response body into a page of domain products.
///
/// # Errors
///
/// Returns [`CatalogError::InvalidPayload`] if a variant has a negative price.
pub(crate) fn convert_product_page(page: ApiProductPage) -> Result<ProductPage, CatalogError> {
    let products = page
        .products
        .unwrap_or_default()
        .into_iter()
        .map(convert_product)
        .collect::<Result<Vec<_>, _>>()?;

    warn_duplicate_names(&products);

    Ok(ProductPage { products })
}

fn convert_product(product: ApiProduct) -> Result<Product, CatalogError> {
    let variants = product
        .variants
        .unwrap_or_default()
        .into_iter()
        .enumerate()
        .map(|(index, variant)| convert_variant(&product.name, index, variant))
        .collect::<Result<Vec<_>, _>>()?;

    Ok(Product {
        id: product.id.map(ProductId::new),
        name: product.name,
        image_url: product.image.and_then(|image| image.src),
        variants,
    })
}

fn convert_variant(
    product_name: &str,
    index: usize,
    variant: ApiVariant,
) -> Result<Variant, CatalogError> {
    let price = Price::new(variant.price).map_err(|e| {
        CatalogError::InvalidPayload(format!("{product_name} variant {index}: {e}"))
    })?;

    Ok(Variant {
        id: variant.id.map(VariantId::new),
        size: variant.size.unwrap_or_default(),
        color: variant.color.unwrap_or_default(),
        material: variant.material.unwrap_or_default(),
        available: variant.available.unwrap_or_default(),
        price,
    })
}

/// Selection keys are derived from product names, so products sharing a name
/// within one page share selection state.
fn warn_duplicate_names(products: &[Product]) {
    let mut seen = HashSet::new();
    for product in products {
        if !seen.insert(product.name.as_str()) {
            warn!(
                product = %product.name,
                "duplicate product name in catalog page; variant selections will be shared"
            );
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use rust_decimal::Decimal;

    use super::*;

    fn parse(body: &str) -> Result<ProductPage, CatalogError> {
        let page: ApiProductPage = serde_json::from_str(body)?;
        convert_product_page(page)
    }

    #[test]
    fn test_convert_full_payload() {
        let page = parse(
            r#"{
                "products": [{
                    "id": 77,
                    "title": "Fog Linen Chambray Towel",
                    "image": { "id": 266, "product_id": 77, "src": "https://cdn.example.com/towel.jpg" },
                    "variants": [
                        { "id": 1, "size": "S", "color": "Beige", "material": "Linen", "available": 4, "price": "49.00" },
                        { "id": 2, "size": "M", "color": "Beige", "material": "Linen", "available": 0, "price": 55 }
                    ]
                }]
            }"#,
        )
        .unwrap();

        let product = &page.products[0];
        assert_eq!(product.id, Some(ProductId::new(77)));
        assert_eq!(product.name, "Fog Linen Chambray Towel");
        assert_eq!(
            product.image_url.as_deref(),
            Some("https://cdn.example.com/towel.jpg")
        );
        assert_eq!(product.variants.len(), 2);
        assert_eq!(product.variants[0].price.amount(), Decimal::new(4900, 2));
        assert_eq!(product.variants[1].price.amount(), Decimal::new(55, 0));
        assert_eq!(product.variants[1].available, 0);
    }

    #[test]
    fn test_convert_minimal_payload() {
        let page = parse(r#"{ "products": [{ "name": "Hat", "variants": [{ "price": 10 }] }] }"#)
            .unwrap();
        let variant = &page.products[0].variants[0];
        assert_eq!(variant.size, "");
        assert_eq!(variant.available, 0);
        assert_eq!(variant.id, None);
    }

    #[test]
    fn test_convert_missing_or_null_products() {
        assert!(parse("{}").unwrap().products.is_empty());
        assert!(parse(r#"{ "products": null }"#).unwrap().products.is_empty());
    }

    #[test]
    fn test_convert_product_without_variants() {
        let page = parse(r#"{ "products": [{ "name": "Gift Card" }] }"#).unwrap();
        assert!(page.products[0].variants.is_empty());
    }

    #[test]
    fn test_convert_negative_price_rejected() {
        let err = parse(r#"{ "products": [{ "name": "Hat", "variants": [{ "price": "-1" }] }] }"#)
            .unwrap_err();
        assert!(matches!(err, CatalogError::InvalidPayload(ref msg) if msg.contains("Hat variant 0")));
    }

    #[test]
    fn test_convert_duplicate_names_accepted() {
        let page = parse(r#"{ "products": [{ "name": "Hat" }, { "name": "Hat" }] }"#).unwrap();
        assert_eq!(page.products.len(), 2);
    }

    #[test]
    fn test_negative_available_is_parse_error() {
        let err = parse(
            r#"{ "products": [{ "name": "Hat", "variants": [{ "available": -2, "price": 1 }] }] }"#,
        )
        .unwrap_err();
        assert!(matches!(err, CatalogError::Parse(_)));
    }
}
