//! Reshapes raw Clover catalog payloads into the frontend view models.
//!
//! All functions here are pure: the same provider payload always produces
//! the same output, in provider order.

use std::collections::HashMap;

use crate::models::{
    CatalogItem, Category, CategoryId, CloverCategory, CloverItem, ItemVariation, STANDARD_TYPE,
    Variation,
};

/// Returns the variant names of an item, or `["Standard"]` when it has
/// none.
#[inline]
#[must_use]
pub fn item_types(item: &CloverItem) -> Vec<String> {
    let names: Vec<String> = item
        .variants()
        .iter()
        .map(|variant| variant.name.clone())
        .collect();
    if names.is_empty() {
        vec![STANDARD_TYPE.to_owned()]
    } else {
        names
    }
}

/// Converts raw items into listing items.
///
/// Variants map 1:1 onto variations and prices stay in cents. Items without
/// variants get an empty list.
#[inline]
#[must_use]
pub fn catalog_items(items: Vec<CloverItem>) -> Vec<CatalogItem> {
    items
        .into_iter()
        .map(|item| {
            let variations = item
                .variants()
                .iter()
                .map(|variant| ItemVariation {
                    id: variant.id.clone(),
                    name: variant.name.clone(),
                    price: variant.price,
                })
                .collect();
            CatalogItem {
                id: item.id,
                name: item.name,
                price: item.price,
                variations,
            }
        })
        .collect()
}

/// Expands one item into the variations it contributes to a category.
///
/// One entry per variant named `"{item} ({variant})"`, or a single entry
/// for the item itself when it has no variants. Prices become decimal.
#[must_use]
fn item_variations(item: &CloverItem) -> Vec<Variation> {
    let variants = item.variants();
    if variants.is_empty() {
        return vec![Variation {
            id: item.id.as_inner().to_owned(),
            name: item.name.clone(),
            price: item.price.to_decimal(),
        }];
    }
    variants
        .iter()
        .map(|variant| Variation {
            id: variant.id.clone(),
            name: format!("{} ({})", item.name, variant.name),
            price: variant.price.to_decimal(),
        })
        .collect()
}

/// Groups item variations under the categories they declare.
///
/// Every provider category appears in the output, in provider order, even
/// when nothing lands in it. Items referencing categories that are not in
/// `categories` contribute nothing for those references. Items declaring
/// no category go to a trailing "Uncategorized" bucket, which is only
/// present when non-empty.
#[inline]
#[must_use]
pub fn group_by_category(categories: Vec<CloverCategory>, items: &[CloverItem]) -> Vec<Category> {
    let mut grouped: Vec<Category> = Vec::with_capacity(categories.len().saturating_add(1));
    let mut positions: HashMap<CategoryId, usize> = HashMap::with_capacity(categories.len());
    for category in categories {
        if positions.contains_key(&category.id) {
            tracing::warn!(category = %category.id, "duplicate category in Clover response");
            continue;
        }
        let _previous = positions.insert(category.id.clone(), grouped.len());
        grouped.push(Category::empty(category.id, category.name));
    }

    let mut uncategorized = Category::uncategorized();
    for item in items {
        let refs = item.category_refs();
        if refs.is_empty() {
            uncategorized.variations.extend(item_variations(item));
            continue;
        }
        for category_ref in refs {
            let Some(position) = positions.get(&category_ref.id).copied() else {
                tracing::debug!(item = %item.id, category = %category_ref.id, "unknown category reference");
                continue;
            };
            if let Some(category) = grouped.get_mut(position) {
                category.variations.extend(item_variations(item));
            }
        }
    }

    if !uncategorized.variations.is_empty() {
        grouped.push(uncategorized);
    }
    grouped
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::UNCATEGORIZED_ID;

    fn items(json: serde_json::Value) -> Vec<CloverItem> {
        serde_json::from_value(json).unwrap()
    }

    fn categories(json: serde_json::Value) -> Vec<CloverCategory> {
        serde_json::from_value(json).unwrap()
    }

    #[test]
    fn types_fall_back_to_standard() {
        let item = &items(serde_json::json!([
            {"id": "i1", "name": "Muffin", "price": 300}
        ]))[0];
        assert_eq!(item_types(item), vec!["Standard".to_owned()]);
    }

    #[test]
    fn types_list_variant_names_in_order() {
        let item = &items(serde_json::json!([{
            "id": "i1", "name": "Latte", "price": 400,
            "variants": {"elements": [
                {"id": "v1", "name": "Small", "price": 400},
                {"id": "v2", "name": "Large", "price": 500}
            ]}
        }]))[0];
        assert_eq!(item_types(item), vec!["Small".to_owned(), "Large".to_owned()]);
    }

    #[test]
    fn listing_keeps_cents_and_has_no_placeholder() {
        let listed = catalog_items(items(serde_json::json!([
            {"id": "i1", "name": "Muffin", "price": 300},
            {"id": "i2", "name": "Latte", "price": 400,
             "variants": [{"id": "v1", "name": "Small", "price": 399}]}
        ])));
        assert_eq!(listed.len(), 2);
        assert!(listed[0].variations.is_empty());
        assert_eq!(listed[0].price.as_minor(), 300);
        assert_eq!(listed[1].variations[0].price.as_minor(), 399);
        assert_eq!(listed[1].variations[0].name, "Small");
    }

    #[test]
    fn single_categorized_item_without_variants() {
        let grouped = group_by_category(
            categories(serde_json::json!([{"id": "c1", "name": "Drinks"}])),
            &items(serde_json::json!([{
                "id": "i1", "name": "Coffee", "price": 250, "variants": [],
                "categories": {"elements": [{"id": "c1"}]}
            }])),
        );
        assert_eq!(
            grouped,
            vec![Category {
                id: CategoryId::new("c1".to_owned()),
                name: "Drinks".to_owned(),
                variations: vec![Variation {
                    id: "i1".to_owned(),
                    name: "Coffee".to_owned(),
                    price: 2.5,
                }],
            }]
        );
    }

    #[test]
    fn item_without_categories_goes_to_uncategorized() {
        let grouped = group_by_category(
            categories(serde_json::json!([{"id": "c1", "name": "Drinks"}])),
            &items(serde_json::json!([
                {"id": "i9", "name": "Gift card", "price": 1000}
            ])),
        );
        assert_eq!(grouped.len(), 2);
        assert!(grouped[0].variations.is_empty());
        let bucket = &grouped[1];
        assert_eq!(bucket.id.as_inner(), UNCATEGORIZED_ID);
        assert_eq!(bucket.name, "Uncategorized");
        assert_eq!(bucket.variations.len(), 1);
        assert_eq!(bucket.variations[0].id, "i9");
    }

    #[test]
    fn variants_expand_with_composite_names() {
        let grouped = group_by_category(
            categories(serde_json::json!([
                {"id": "c1", "name": "Drinks"},
                {"id": "c2", "name": "Hot"}
            ])),
            &items(serde_json::json!([{
                "id": "i1", "name": "Latte", "price": 0,
                "variants": {"elements": [
                    {"id": "v1", "name": "Small", "price": 350},
                    {"id": "v2", "name": "Large", "price": 475}
                ]},
                "categories": {"elements": [{"id": "c1"}, {"id": "c2"}]}
            }])),
        );
        assert_eq!(grouped.len(), 2);
        for category in &grouped {
            let names: Vec<&str> = category
                .variations
                .iter()
                .map(|variation| variation.name.as_str())
                .collect();
            assert_eq!(names, vec!["Latte (Small)", "Latte (Large)"]);
        }
        assert!((grouped[0].variations[1].price - 4.75).abs() < 1e-9);
    }

    #[test]
    fn unknown_category_reference_is_dropped() {
        let grouped = group_by_category(
            categories(serde_json::json!([{"id": "c1", "name": "Drinks"}])),
            &items(serde_json::json!([{
                "id": "i1", "name": "Ghost", "price": 100,
                "categories": [{"id": "gone"}]
            }])),
        );
        assert_eq!(grouped.len(), 1);
        assert!(grouped[0].variations.is_empty());
    }

    #[test]
    fn empty_category_envelope_counts_as_uncategorized() {
        let grouped = group_by_category(
            Vec::new(),
            &items(serde_json::json!([{
                "id": "i1", "name": "Loose", "price": 100,
                "categories": {"elements": []}
            }])),
        );
        assert_eq!(grouped.len(), 1);
        assert_eq!(grouped[0].id.as_inner(), UNCATEGORIZED_ID);
    }

    #[test]
    fn grouping_is_deterministic() {
        let raw_categories = serde_json::json!([
            {"id": "c1", "name": "Drinks"},
            {"id": "c2", "name": "Food"}
        ]);
        let raw_items = serde_json::json!([
            {"id": "i1", "name": "Coffee", "price": 250, "categories": [{"id": "c1"}]},
            {"id": "i2", "name": "Bagel", "price": 300, "categories": [{"id": "c2"}]},
            {"id": "i3", "name": "Sticker", "price": 50}
        ]);
        let first = group_by_category(categories(raw_categories.clone()), &items(raw_items.clone()));
        let second = group_by_category(categories(raw_categories), &items(raw_items));
        assert_eq!(first, second);
        assert_eq!(first.len(), 3);
    }

    #[test]
    fn no_items_yields_empty_categories_without_bucket() {
        let grouped = group_by_category(
            categories(serde_json::json!([{"id": "c1", "name": "Drinks"}])),
            &[],
        );
        assert_eq!(grouped.len(), 1);
        assert!(grouped[0].variations.is_empty());
    }
}
