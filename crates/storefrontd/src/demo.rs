//! Catalogue served by `--mock`

use storefront_commerce::MockCommerce;
use storefront_primitives::money::{Money, PriceRange};
use storefront_primitives::product::{OptionValue, Product, ProductOption, SelectedOption, Variant};

const CURRENCY: &str = "USD";

fn option(name: &str, values: &[&str]) -> ProductOption {
    ProductOption {
        id: format!("gid://shop/ProductOption/{name}"),
        name: name.to_owned(),
        option_values: values
            .iter()
            .map(|value| OptionValue {
                id: format!("gid://shop/ProductOptionValue/{name}-{value}"),
                name: (*value).to_owned(),
            })
            .collect(),
    }
}

fn variant(id: u32, options: &[(&str, &str)], price: &str, available: bool) -> Variant {
    Variant {
        id: format!("gid://shop/ProductVariant/{id}"),
        title: options
            .iter()
            .map(|(_, value)| *value)
            .collect::<Vec<_>>()
            .join(" / "),
        selected_options: options
            .iter()
            .map(|(name, value)| SelectedOption::new(*name, *value))
            .collect(),
        price: Money::new(price, CURRENCY),
        available_for_sale: available,
    }
}

fn product(
    id: u32,
    handle: &str,
    title: &str,
    (min, max): (&str, &str),
    options: Vec<ProductOption>,
    variants: Vec<Variant>,
) -> Product {
    Product {
        id: format!("gid://shop/Product/{id}"),
        handle: handle.to_owned(),
        title: title.to_owned(),
        price_range: PriceRange {
            min_variant_price: Money::new(min, CURRENCY),
            max_variant_price: Money::new(max, CURRENCY),
        },
        options,
        variants,
    }
}

/// Builds an in-memory commerce backend with a couple of products.
pub async fn catalogue() -> MockCommerce {
    let commerce = MockCommerce::new();

    commerce
        .add_product(product(
            1,
            "t-shirt",
            "T-Shirt",
            ("20.0", "22.0"),
            vec![option("Size", &["S", "M", "L"]), option("Color", &["Black", "White"])],
            vec![
                variant(11, &[("Size", "S"), ("Color", "Black")], "20.0", true),
                variant(12, &[("Size", "M"), ("Color", "Black")], "20.0", true),
                variant(13, &[("Size", "L"), ("Color", "Black")], "22.0", false),
                variant(14, &[("Size", "S"), ("Color", "White")], "20.0", true),
                variant(15, &[("Size", "M"), ("Color", "White")], "20.0", true),
                variant(16, &[("Size", "L"), ("Color", "White")], "22.0", true),
            ],
        ))
        .await;

    commerce
        .add_product(product(
            2,
            "sticker",
            "Sticker",
            ("2.5", "2.5"),
            vec![option("Title", &["Default Title"])],
            vec![variant(21, &[("Title", "Default Title")], "2.5", true)],
        ))
        .await;

    commerce
}

#[cfg(test)]
mod tests {
    use storefront_commerce::CommerceApi;

    use super::*;

    #[tokio::test]
    async fn catalogue_has_price_ranges() {
        let commerce = catalogue().await;

        let shirt = commerce.product("t-shirt").await.unwrap().unwrap();
        assert_eq!(shirt.price_range.min_variant_price.amount, "20.0");
        assert_eq!(shirt.price_range.max_variant_price.amount, "22.0");
        assert!(!shirt.has_single_variant());

        let sticker = commerce.product("sticker").await.unwrap().unwrap();
        assert!(sticker.has_single_variant());
        assert!(sticker.price_range.is_single());
    }
}
