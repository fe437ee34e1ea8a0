//! Catalog browsing helpers for the storefront listing pages.

use crate::api::types::{Category, Product};

/// URL slug for a category name: lowercased, spaces turned into dashes,
/// everything outside ASCII word characters dropped.
pub fn slugify(name: &str) -> String {
    name.to_lowercase()
        .replace(' ', "-")
        .chars()
        .filter(|c| c.is_ascii_alphanumeric() || *c == '-' || *c == '_')
        .collect()
}

pub fn find_category_by_slug<'a>(categories: &'a [Category], slug: &str) -> Option<&'a Category> {
    categories
        .iter()
        .find(|category| slugify(&category.name) == slug)
}

/// Sum of all variant stock; the availability figure shown on listings.
pub fn total_stock(product: &Product) -> u32 {
    product.variants.iter().map(|variant| variant.stock).sum()
}

/// Case-insensitive title/description search combined with an optional
/// category filter.
pub fn filter_products<'a>(
    products: &'a [Product],
    search: &str,
    category_id: Option<i64>,
) -> Vec<&'a Product> {
    let needle = search.to_lowercase();
    products
        .iter()
        .filter(|product| {
            let matches_search = needle.is_empty()
                || product.title.to_lowercase().contains(&needle)
                || product
                    .description
                    .as_deref()
                    .is_some_and(|description| description.to_lowercase().contains(&needle));
            let matches_category =
                category_id.map_or(true, |id| product.category_id == Some(id));
            matches_search && matches_category
        })
        .collect()
}
