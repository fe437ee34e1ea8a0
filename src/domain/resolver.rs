//! Storefront-side variant resolution.
//!
//! Maps the shopper's current (possibly partial) option selection to the
//! uniquely matching variant, per-value selectability and the aggregate
//! stock under the selection. Everything here is recomputed eagerly from
//! the product data on each change; there is no cached state.

use std::collections::BTreeMap;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::api::types::{Product, ProductVariant};
use crate::domain::generator::FALLBACK_OPTION_VALUE;

/// Most units of a single variant one order may carry.
pub const MAX_PER_LINE: u32 = 10;

/// A chosen option value, carrying the option's display label.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SelectedValue {
    pub label: String,
    pub value: String,
}

/// The shopper's current choice of option values, at most one per option.
#[derive(Clone, Debug, Default)]
pub struct Selection {
    choices: BTreeMap<i64, SelectedValue>,
}

impl Selection {
    pub fn new() -> Self {
        Self::default()
    }

    /// Select `value` for the option, replacing any previous choice for it.
    /// Selecting the already-chosen value deselects it instead.
    pub fn toggle(&mut self, option_id: i64, label: &str, value: &str) {
        let already = self
            .choices
            .get(&option_id)
            .is_some_and(|chosen| chosen.value == value);
        if already {
            self.choices.remove(&option_id);
        } else {
            self.choices.insert(
                option_id,
                SelectedValue {
                    label: label.to_string(),
                    value: value.to_string(),
                },
            );
        }
    }

    pub fn chosen(&self, option_id: i64) -> Option<&SelectedValue> {
        self.choices.get(&option_id)
    }

    pub fn is_chosen(&self, option_id: i64, value: &str) -> bool {
        self.chosen(option_id).is_some_and(|chosen| chosen.value == value)
    }

    pub fn len(&self) -> usize {
        self.choices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.choices.is_empty()
    }

    pub fn clear(&mut self) {
        self.choices.clear();
    }

    /// Snapshot of the chosen values, for display and cart lines.
    pub fn values(&self) -> Vec<SelectedValue> {
        self.choices.values().cloned().collect()
    }

    fn iter(&self) -> impl Iterator<Item = (&i64, &SelectedValue)> {
        self.choices.iter()
    }
}

fn variant_has(variant: &ProductVariant, option_id: i64, value: &str) -> bool {
    variant.configurations.iter().any(|config| {
        config.option_value.option.id == option_id && config.option_value.value == value
    })
}

/// Whether the variant agrees with every selected option, optionally
/// ignoring one option axis.
fn compatible_with(variant: &ProductVariant, selection: &Selection, skip: Option<i64>) -> bool {
    selection.iter().all(|(option_id, chosen)| {
        skip == Some(*option_id) || variant_has(variant, *option_id, &chosen.value)
    })
}

/// The uniquely matching variant, defined only once every declared option
/// axis has a choice. Products without options resolve to their single
/// implicit variant.
pub fn resolve_variant<'a>(
    product: &'a Product,
    selection: &Selection,
) -> Option<&'a ProductVariant> {
    if product.options.is_empty() {
        return product.variants.first();
    }
    if selection.len() != product.options.len() {
        return None;
    }
    product.variants.iter().find(|variant| {
        variant.configurations.len() == selection.len()
            && compatible_with(variant, selection, None)
    })
}

/// Whether choosing `value` for the option can still lead to an in-stock
/// variant, given every *other* current choice.
pub fn is_value_selectable(
    product: &Product,
    selection: &Selection,
    option_id: i64,
    value: &str,
) -> bool {
    product.variants.iter().any(|variant| {
        variant_has(variant, option_id, value)
            && compatible_with(variant, selection, Some(option_id))
            && variant.stock > 0
    })
}

/// UI enablement for a value button: the currently chosen value stays
/// clickable even when it fails the selectability test, so it can always be
/// toggled off.
pub fn is_value_enabled(
    product: &Product,
    selection: &Selection,
    option_id: i64,
    value: &str,
) -> bool {
    selection.is_chosen(option_id, value)
        || is_value_selectable(product, selection, option_id, value)
}

/// Aggregate stock under the current selection: the resolved variant's
/// stock once one is resolved (or for option-less products), the sum over
/// all variants when nothing is selected, and the sum over
/// selection-compatible variants for a partial selection.
pub fn available_stock(product: &Product, selection: &Selection) -> u32 {
    if let Some(variant) = resolve_variant(product, selection) {
        return variant.stock;
    }
    if product.options.is_empty() {
        return 0;
    }
    if selection.is_empty() {
        product.variants.iter().map(|variant| variant.stock).sum()
    } else {
        product
            .variants
            .iter()
            .filter(|variant| compatible_with(variant, selection, None))
            .map(|variant| variant.stock)
            .sum()
    }
}

/// Units of the variant still purchasable, given what the cart already
/// holds for it.
pub fn purchase_limit(variant_stock: u32, already_in_cart: u32) -> u32 {
    MAX_PER_LINE.min(variant_stock.saturating_sub(already_in_cart))
}

/// Outcome of a quantity-stepper request.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum QuantityOutcome {
    /// The request fits; the new quantity.
    Changed(u32),
    /// Past the purchasable bound; the quantity is left as it was and the
    /// notice names exactly how many more units fit.
    LimitReached { remaining: u32 },
    /// Below one: a request to drop the line from the cart.
    RemoveFromCart,
}

/// Bound a requested quantity to `[1, limit]` (see [`purchase_limit`]).
pub fn request_quantity(requested: i64, limit: u32) -> QuantityOutcome {
    if requested < 1 {
        return QuantityOutcome::RemoveFromCart;
    }
    if requested > i64::from(limit) {
        return QuantityOutcome::LimitReached { remaining: limit };
    }
    QuantityOutcome::Changed(requested as u32)
}

/// Product-page state: the option choices plus the pending quantity.
///
/// The quantity snaps back to 1 whenever a choice changes, because the
/// resolved variant, and with it the purchasable bound, may have changed.
#[derive(Clone, Debug)]
pub struct PurchaseState {
    selection: Selection,
    quantity: u32,
}

impl PurchaseState {
    pub fn new() -> Self {
        Self {
            selection: Selection::new(),
            quantity: 1,
        }
    }

    pub fn selection(&self) -> &Selection {
        &self.selection
    }

    pub fn quantity(&self) -> u32 {
        self.quantity
    }

    /// Toggle a choice and reset the pending quantity.
    pub fn toggle(&mut self, option_id: i64, label: &str, value: &str) {
        self.selection.toggle(option_id, label, value);
        self.quantity = 1;
    }

    /// Request a new quantity against the purchasable bound. Only a fitting
    /// request changes the stored quantity.
    pub fn request_quantity(&mut self, requested: i64, limit: u32) -> QuantityOutcome {
        let outcome = request_quantity(requested, limit);
        if let QuantityOutcome::Changed(quantity) = outcome {
            self.quantity = quantity;
        }
        outcome
    }
}

impl Default for PurchaseState {
    fn default() -> Self {
        Self::new()
    }
}

/// Why an add-to-cart request was refused.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum AddToCartError {
    /// The product declares options and not all of them are chosen yet.
    #[error("all product options must be selected before adding to cart")]
    OptionsIncomplete,
    /// The product carries no purchasable variant at all.
    #[error("this product has no purchasable variant")]
    NoVariant,
    /// The chosen variant has no stock left.
    #[error("variant \"{variant}\" is out of stock")]
    OutOfStock { variant: String },
    /// Cart plus request would exceed stock; `allowed` is the most that
    /// still fits.
    #[error("only {allowed} more of this variant can be added")]
    ExceedsStock { allowed: u32 },
}

/// Gate an add-to-cart request against the current selection and the
/// quantity of the same variant already in the cart. Returns the variant to
/// add on success.
pub fn check_add_to_cart<'a>(
    product: &'a Product,
    selection: &Selection,
    quantity: u32,
    already_in_cart: u32,
) -> Result<&'a ProductVariant, AddToCartError> {
    let variant = match resolve_variant(product, selection) {
        Some(variant) => variant,
        None if product.options.is_empty() => return Err(AddToCartError::NoVariant),
        None => return Err(AddToCartError::OptionsIncomplete),
    };
    if variant.stock == 0 {
        return Err(AddToCartError::OutOfStock {
            variant: variant_display_name(variant),
        });
    }
    if already_in_cart.saturating_add(quantity) > variant.stock {
        return Err(AddToCartError::ExceedsStock {
            allowed: variant.stock.saturating_sub(already_in_cart),
        });
    }
    Ok(variant)
}

/// "Mavi / XL" style label built from the variant's configuration values.
pub fn variant_display_name(variant: &ProductVariant) -> String {
    if variant.configurations.is_empty() {
        return FALLBACK_OPTION_VALUE.to_string();
    }
    variant
        .configurations
        .iter()
        .map(|config| config.option_value.value.as_str())
        .collect::<Vec<_>>()
        .join(" / ")
}

/// The price one unit sells for: the variant's own price when set, the
/// product's base price otherwise.
pub fn unit_price(product: &Product, variant: &ProductVariant) -> Decimal {
    variant.price.unwrap_or(product.price)
}
