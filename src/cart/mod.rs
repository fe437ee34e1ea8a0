//! Locally persisted shopping cart.
//!
//! An owned store hydrated from a JSON file on open and written back on
//! every mutation, mirroring the browser-local storage the storefront uses.
//! One line per product variant; concurrent writers are last-write-wins with
//! no locking.

use std::fs;
use std::path::PathBuf;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::api::types::{OrderItemRequest, Product, ProductVariant};
use crate::domain::resolver::{self, SelectedValue, Selection, MAX_PER_LINE};

/// One cart line: a denormalized snapshot of the variant at add time.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CartItem {
    pub product_id: i64,
    pub product_variant_id: i64,
    pub title: String,
    pub variant_name: String,
    pub price: Decimal,
    pub image: String,
    pub quantity: u32,
    pub selected_options: Vec<SelectedValue>,
}

impl CartItem {
    /// Snapshot a resolved variant for the cart.
    pub fn from_selection(
        product: &Product,
        variant: &ProductVariant,
        selection: &Selection,
        quantity: u32,
        image: impl Into<String>,
    ) -> Self {
        Self {
            product_id: product.id,
            product_variant_id: variant.id,
            title: product.title.clone(),
            variant_name: resolver::variant_display_name(variant),
            price: resolver::unit_price(product, variant),
            image: image.into(),
            quantity,
            selected_options: selection.values(),
        }
    }

    pub fn line_total(&self) -> Decimal {
        self.price * Decimal::from(self.quantity)
    }
}

#[derive(Debug, Error)]
pub enum CartError {
    #[error("cart storage error: {0}")]
    Io(#[from] std::io::Error),

    #[error("cart serialization error: {0}")]
    Serde(#[from] serde_json::Error),

    #[error("no cart line for that variant")]
    ItemNotFound,
}

/// The cart store. Every mutation persists before returning.
pub struct CartStore {
    path: PathBuf,
    items: Vec<CartItem>,
}

impl CartStore {
    /// Open the cart at `path`, hydrating any previously persisted lines.
    /// A missing file is an empty cart; a corrupt file is logged, removed
    /// and replaced with an empty cart.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self, CartError> {
        let path = path.into();
        let items = match fs::read_to_string(&path) {
            Ok(raw) => match serde_json::from_str(&raw) {
                Ok(items) => items,
                Err(err) => {
                    tracing::warn!(%err, "discarding unreadable cart file");
                    fs::remove_file(&path)?;
                    Vec::new()
                }
            },
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Vec::new(),
            Err(err) => return Err(err.into()),
        };
        Ok(Self { path, items })
    }

    pub fn items(&self) -> &[CartItem] {
        &self.items
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Units of the given variant already in the cart.
    pub fn quantity_of(&self, variant_id: i64) -> u32 {
        self.items
            .iter()
            .find(|item| item.product_variant_id == variant_id)
            .map_or(0, |item| item.quantity)
    }

    /// Add a line, merging into an existing line for the same variant. A
    /// merged line never exceeds [`MAX_PER_LINE`] units.
    pub fn add(&mut self, item: CartItem) -> Result<(), CartError> {
        match self
            .items
            .iter_mut()
            .find(|existing| existing.product_variant_id == item.product_variant_id)
        {
            Some(existing) => {
                existing.quantity = existing
                    .quantity
                    .saturating_add(item.quantity)
                    .min(MAX_PER_LINE);
                tracing::debug!(variant_id = item.product_variant_id, "merged cart line");
            }
            None => {
                tracing::debug!(variant_id = item.product_variant_id, "added cart line");
                self.items.push(item);
            }
        }
        self.persist()
    }

    /// Set a line's quantity; zero removes the line.
    pub fn update_quantity(&mut self, variant_id: i64, quantity: u32) -> Result<(), CartError> {
        if quantity == 0 {
            return self.remove(variant_id);
        }
        let item = self
            .items
            .iter_mut()
            .find(|item| item.product_variant_id == variant_id)
            .ok_or(CartError::ItemNotFound)?;
        item.quantity = quantity.min(MAX_PER_LINE);
        self.persist()
    }

    pub fn remove(&mut self, variant_id: i64) -> Result<(), CartError> {
        let before = self.items.len();
        self.items
            .retain(|item| item.product_variant_id != variant_id);
        if self.items.len() == before {
            return Err(CartError::ItemNotFound);
        }
        self.persist()
    }

    pub fn clear(&mut self) -> Result<(), CartError> {
        self.items.clear();
        self.persist()
    }

    /// Sum of line totals.
    pub fn subtotal(&self) -> Decimal {
        self.items
            .iter()
            .fold(Decimal::ZERO, |acc, item| acc + item.line_total())
    }

    /// Checkout lines in the shape the order endpoint expects.
    pub fn order_items(&self) -> Vec<OrderItemRequest> {
        self.items
            .iter()
            .map(|item| OrderItemRequest {
                product_variant_id: item.product_variant_id,
                quantity: item.quantity,
            })
            .collect()
    }

    fn persist(&self) -> Result<(), CartError> {
        let raw = serde_json::to_string_pretty(&self.items)?;
        fs::write(&self.path, raw)?;
        Ok(())
    }
}
