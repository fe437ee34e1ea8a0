//! Wire shapes exchanged with the backend API.
//!
//! Field names are camelCase on the wire. Prices are decimals serialized as
//! JSON numbers; the backend's ids are plain integers.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::domain::combination::OptionValuePair;
use crate::domain::resolver::SelectedValue;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Category {
    pub id: i64,
    pub name: String,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductImage {
    pub id: i64,
    pub url: String,
    pub product_id: i64,
    pub created_at: DateTime<Utc>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ProductOptionValue {
    pub id: i64,
    pub value: String,
}

/// A declared option axis with all of its admissible values.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ProductOption {
    pub id: i64,
    pub name: String,
    pub values: Vec<ProductOptionValue>,
}

/// Option back-reference carried inside a variant configuration.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct OptionRef {
    pub id: i64,
    pub name: String,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ConfigOptionValue {
    pub id: i64,
    pub value: String,
    pub option: OptionRef,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VariantConfiguration {
    pub id: i64,
    pub option_value: ConfigOptionValue,
}

/// One purchasable unit. A missing price means the product's base price
/// applies.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductVariant {
    pub id: i64,
    pub product_id: i64,
    #[serde(default)]
    pub sku: Option<String>,
    #[serde(default)]
    pub price: Option<Decimal>,
    pub stock: u32,
    pub configurations: Vec<VariantConfiguration>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    pub id: i64,
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    pub price: Decimal,
    pub published: bool,
    pub is_favorite: bool,
    #[serde(default)]
    pub category_id: Option<i64>,
    #[serde(default)]
    pub category: Option<Category>,
    #[serde(default)]
    pub images: Vec<ProductImage>,
    #[serde(default)]
    pub options: Vec<ProductOption>,
    #[serde(default)]
    pub variants: Vec<ProductVariant>,
    pub created_at: DateTime<Utc>,
}

/// Homepage slider entry.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Slider {
    pub id: i64,
    pub title: String,
    pub image_url: String,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderItem {
    pub id: i64,
    pub product_id: i64,
    pub quantity: u32,
    pub price_at_order: Decimal,
    #[serde(default)]
    pub order_item_options: Vec<SelectedValue>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Order {
    pub id: String,
    pub user_id: i64,
    pub amount: Decimal,
    pub payment_status: bool,
    pub created_at: DateTime<Utc>,
    pub address: String,
    pub phone: String,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub order_items: Vec<OrderItem>,
}

/// Option submitted from the admin form. The id is present only for rows
/// that already exist on the server.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct OptionPayload {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<i64>,
    pub name: String,
    pub values: Vec<String>,
}

/// Variant submitted from the admin form. A `None` price is sent as an
/// explicit `null`, telling the backend the base price applies; a missing
/// SKU is omitted entirely.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VariantPayload {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<i64>,
    pub combination: Vec<OptionValuePair>,
    pub stock: u32,
    pub price: Option<Decimal>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sku: Option<String>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductPayload {
    pub title: String,
    pub description: String,
    pub price: Decimal,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category_id: Option<i64>,
    pub published: bool,
    pub is_favorite: bool,
    pub options: Vec<OptionPayload>,
    pub variants: Vec<VariantPayload>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderItemRequest {
    pub product_variant_id: i64,
    pub quantity: u32,
}

/// Checkout request. Delivery fields are checked locally before any call is
/// made.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct OrderRequest {
    #[validate(length(min = 1, message = "the cart is empty"))]
    pub cart_items: Vec<OrderItemRequest>,
    #[validate(length(min = 1))]
    pub address: String,
    #[validate(length(min = 1))]
    pub phone: String,
    #[validate(length(min = 1))]
    pub first_name: String,
    #[validate(length(min = 1))]
    pub last_name: String,
    #[validate(email)]
    pub email: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub order_note: Option<String>,
}

/// Response of order creation: the hosted-payment handoff token when the
/// order was accepted. The payment page itself is external.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct OrderResponse {
    #[serde(default)]
    pub paytr: Option<PaymentToken>,
    #[serde(default)]
    pub message: Option<String>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PaymentToken {
    pub token: String,
}

/// Payload for a new homepage slider. The image is expected to already be
/// hosted; upload handling lives outside this crate.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct SliderPayload {
    #[validate(length(min = 1))]
    pub title: String,
    #[validate(length(min = 1))]
    pub image_url: String,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, Validate)]
pub struct CategoryPayload {
    #[validate(length(min = 1))]
    pub name: String,
}
