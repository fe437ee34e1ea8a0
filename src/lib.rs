//! Kirpik Storefront
//!
//! Client-side core of a beauty-products storefront and its paired admin
//! back-office. The backend is an opaque REST API; this crate owns the
//! pieces that run next to the UI.
//!
//! ## Features
//! - Product option/variant combination engine for admin authoring
//! - Variant resolution for shopper option selections
//! - Locally persisted shopping cart keyed by variant
//! - Typed async client for the product, category, slider and order API
//! - Catalog search and category filtering

pub mod admin;
pub mod api;
pub mod cart;
pub mod config;
pub mod domain;

pub use admin::{FormError, FormFlow, ProductForm};
pub use api::{ApiClient, ApiError};
pub use cart::{CartError, CartItem, CartStore};
pub use config::ApiConfig;
pub use domain::combination::{cartesian_product, CombinationKey, OptionValuePair};
pub use domain::generator::{
    generate_variants, DraftId, GeneratedVariants, OptionInput, OptionWarning, VariantDraft,
};
pub use domain::resolver::{
    available_stock, check_add_to_cart, is_value_enabled, is_value_selectable, purchase_limit,
    request_quantity, resolve_variant, AddToCartError, PurchaseState, QuantityOutcome,
    SelectedValue, Selection,
};
