//! Option selection for multi-variant products.
//!
//! The selection travels in the `options` query parameter as a JSON object
//! with its keys sorted, so that the same selection always produces the same
//! URL.

use std::collections::BTreeMap;

use storefront_primitives::money::format_price;
use storefront_primitives::product::{Product, Variant};
use url::form_urlencoded;

pub const OPTIONS_PARAM: &str = "options";

/// Option name to option value.
pub type Selection = BTreeMap<String, String>;

#[must_use]
pub fn encode_selection(selection: &Selection) -> String {
    serde_json::to_string(selection).unwrap_or_else(|_| "{}".to_owned())
}

/// Anything that is not a JSON object of strings decodes to an empty
/// selection.
#[must_use]
pub fn decode_selection(encoded: Option<&str>) -> Selection {
    encoded
        .and_then(|encoded| serde_json::from_str(encoded).ok())
        .unwrap_or_default()
}

/// Reads the selection out of a raw query string.
#[must_use]
pub fn selection_from_query(query: Option<&str>) -> Selection {
    let encoded = query.and_then(|query| {
        form_urlencoded::parse(query.as_bytes())
            .find(|(key, _)| key == OPTIONS_PARAM)
            .map(|(_, value)| value.into_owned())
    });

    decode_selection(encoded.as_deref())
}

/// The variant whose options are exactly the selection. Products with fewer
/// than two variants always resolve to their only variant, if any.
#[must_use]
pub fn selected_variant<'a>(product: &'a Product, selection: &Selection) -> Option<&'a Variant> {
    if product.has_single_variant() {
        return product.variants.first();
    }

    product.variants.iter().find(|variant| {
        variant.selected_options.len() == selection.len()
            && variant
                .selected_options
                .iter()
                .all(|option| selection.get(&option.name) == Some(&option.value))
    })
}

/// Location that selects `value` for option `name`, with every other query
/// parameter of the current location kept.
#[must_use]
pub fn selection_location(
    path: &str,
    query: Option<&str>,
    selection: &Selection,
    name: &str,
    value: &str,
) -> (String, Selection) {
    let mut next = selection.clone();
    drop(next.insert(name.to_owned(), value.to_owned()));

    let mut params: Vec<(String, String)> = query
        .map(|query| {
            form_urlencoded::parse(query.as_bytes())
                .into_owned()
                .collect()
        })
        .unwrap_or_default();

    let encoded = encode_selection(&next);
    match params.iter_mut().find(|(key, _)| key == OPTIONS_PARAM) {
        Some((_, existing)) => *existing = encoded,
        None => params.push((OPTIONS_PARAM.to_owned(), encoded)),
    }

    let query = form_urlencoded::Serializer::new(String::new())
        .extend_pairs(&params)
        .finish();

    (format!("{path}?{query}"), next)
}

/// Price of the selected variant, or the product's price range while the
/// selection is incomplete.
#[must_use]
pub fn display_price(product: &Product, selection: &Selection) -> String {
    if let Some(variant) = selected_variant(product, selection) {
        return format_price(&variant.price);
    }

    let range = &product.price_range;
    let min = format_price(&range.min_variant_price);

    if range.is_single() {
        return min;
    }

    format!("{min}\u{a0}\u{2013}\u{a0}{}", format_price(&range.max_variant_price))
}

#[cfg(test)]
mod tests {
    use proptest::collection::btree_map;
    use proptest::prelude::*;
    use storefront_primitives::money::{Money, PriceRange};
    use storefront_primitives::product::{OptionValue, ProductOption, SelectedOption};

    use super::*;

    fn selection(pairs: &[(&str, &str)]) -> Selection {
        pairs
            .iter()
            .map(|(name, value)| ((*name).to_owned(), (*value).to_owned()))
            .collect()
    }

    fn variant(id: &str, size: &str, color: &str, price: &str) -> Variant {
        Variant {
            id: id.to_owned(),
            title: format!("{size} / {color}"),
            selected_options: vec![
                SelectedOption::new("Size", size),
                SelectedOption::new("Color", color),
            ],
            price: Money::new(price, "USD"),
            available_for_sale: true,
        }
    }

    fn option(name: &str, values: &[&str]) -> ProductOption {
        ProductOption {
            id: format!("option-{name}"),
            name: name.to_owned(),
            option_values: values
                .iter()
                .map(|value| OptionValue {
                    id: format!("value-{value}"),
                    name: (*value).to_owned(),
                })
                .collect(),
        }
    }

    fn shirt() -> Product {
        Product {
            id: "gid://shop/Product/1".to_owned(),
            handle: "shirt".to_owned(),
            title: "Shirt".to_owned(),
            price_range: PriceRange {
                min_variant_price: Money::new("20.0", "USD"),
                max_variant_price: Money::new("25.0", "USD"),
            },
            options: vec![option("Size", &["M", "L"]), option("Color", &["Red"])],
            variants: vec![
                variant("v-m-red", "M", "Red", "20.0"),
                variant("v-l-red", "L", "Red", "25.0"),
            ],
        }
    }

    #[test]
    fn encoding_is_order_independent() {
        let mut first = Selection::new();
        drop(first.insert("Size".to_owned(), "M".to_owned()));
        drop(first.insert("Color".to_owned(), "Red".to_owned()));

        let mut second = Selection::new();
        drop(second.insert("Color".to_owned(), "Red".to_owned()));
        drop(second.insert("Size".to_owned(), "M".to_owned()));

        assert_eq!(encode_selection(&first), encode_selection(&second));
        assert_eq!(encode_selection(&first), r#"{"Color":"Red","Size":"M"}"#);
    }

    #[test]
    fn decode_reverses_encode() {
        let original = selection(&[("Size", "M"), ("Color", "Red")]);

        assert_eq!(decode_selection(Some(&encode_selection(&original))), original);
    }

    #[test]
    fn awkward_names_survive_encoding() {
        let original = selection(&[
            ("", ""),
            ("Size \"EU\"", "42\\43"),
            ("Größe", "Ñ"),
            ("颜色", "红"),
            ("Zebra", "emoji \u{1f455}"),
        ]);

        assert_eq!(decode_selection(Some(&encode_selection(&original))), original);
    }

    fn shuffled_pairs() -> impl Strategy<Value = Vec<(String, String)>> {
        btree_map(any::<String>(), any::<String>(), 0..8).prop_flat_map(|selection| {
            Just(selection.into_iter().collect::<Vec<_>>()).prop_shuffle()
        })
    }

    proptest! {
        #[test]
        fn decode_reverses_encode_for_any_selection(
            original in btree_map(any::<String>(), any::<String>(), 0..8)
        ) {
            prop_assert_eq!(decode_selection(Some(&encode_selection(&original))), original);
        }

        #[test]
        fn encoding_ignores_insertion_order(pairs in shuffled_pairs()) {
            let shuffled: Selection = pairs.iter().cloned().collect();

            let mut sorted_pairs = pairs;
            sorted_pairs.sort();
            let sorted: Selection = sorted_pairs.into_iter().collect();

            prop_assert_eq!(encode_selection(&shuffled), encode_selection(&sorted));
        }
    }

    #[test]
    fn invalid_selection_decodes_to_empty() {
        assert!(decode_selection(None).is_empty());
        assert!(decode_selection(Some("not json")).is_empty());
        assert!(decode_selection(Some("[1,2]")).is_empty());
        assert!(decode_selection(Some(r#"{"Size":3}"#)).is_empty());
    }

    #[test]
    fn full_selection_resolves_variant() {
        let product = shirt();

        let variant = selected_variant(&product, &selection(&[("Size", "L"), ("Color", "Red")]));

        assert_eq!(variant.map(|v| v.id.as_str()), Some("v-l-red"));
    }

    #[test]
    fn partial_or_unknown_selection_resolves_nothing() {
        let product = shirt();

        assert!(selected_variant(&product, &selection(&[("Size", "L")])).is_none());
        assert!(selected_variant(&product, &selection(&[("Size", "S"), ("Color", "Red")])).is_none());
        assert!(selected_variant(
            &product,
            &selection(&[("Size", "L"), ("Color", "Red"), ("Fit", "Slim")])
        )
        .is_none());
    }

    #[test]
    fn single_variant_product_ignores_selection() {
        let mut product = shirt();
        product.variants.truncate(1);

        let variant = selected_variant(&product, &Selection::new());

        assert_eq!(variant.map(|v| v.id.as_str()), Some("v-m-red"));
    }

    #[test]
    fn location_keeps_other_parameters() {
        let (location, next) = selection_location(
            "/products/shirt",
            Some("ref=home&options=%7B%22Size%22%3A%22M%22%7D"),
            &selection(&[("Size", "M")]),
            "Color",
            "Red",
        );

        assert_eq!(next, selection(&[("Size", "M"), ("Color", "Red")]));
        assert_eq!(
            location,
            "/products/shirt?ref=home&options=%7B%22Color%22%3A%22Red%22%2C%22Size%22%3A%22M%22%7D"
        );
        assert_eq!(selection_from_query(location.split_once('?').map(|(_, q)| q)), next);
    }

    #[test]
    fn display_price_falls_back_to_range() {
        let product = shirt();

        assert_eq!(
            display_price(&product, &selection(&[("Size", "L"), ("Color", "Red")])),
            "$25.00"
        );
        assert_eq!(
            display_price(&product, &Selection::new()),
            "$20.00\u{a0}\u{2013}\u{a0}$25.00"
        );
    }
}
