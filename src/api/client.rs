//! HTTP client for the storefront backend.
//!
//! Wraps `reqwest` with bearer-token attachment and typed responses. One
//! request per call, no retries, no cancellation: a failed call surfaces
//! the backend's `message` body (or a generic notice) and the caller keeps
//! its prior state.

use std::time::Duration;

use reqwest::{Client, Method, RequestBuilder, Url};
use serde::de::DeserializeOwned;
use serde::Serialize;
use validator::Validate;

use crate::api::error::ApiError;
use crate::api::types::{
    Category, CategoryPayload, Order, OrderRequest, OrderResponse, Product, ProductPayload,
    Slider, SliderPayload,
};
use crate::config::ApiConfig;

/// Client for the product/category/slider/order REST API.
///
/// Use [`ApiClient::new`] with configuration for production, or
/// [`ApiClient::with_base_url`] to point at a mock server in tests.
pub struct ApiClient {
    client: Client,
    base_url: Url,
    token: Option<String>,
}

impl ApiClient {
    /// Build a client from configuration.
    ///
    /// # Errors
    ///
    /// [`ApiError::Http`] if the underlying client cannot be constructed,
    /// [`ApiError::BaseUrl`] if the configured URL does not parse.
    pub fn new(config: &ApiConfig) -> Result<Self, ApiError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .connect_timeout(Duration::from_secs(10))
            .user_agent("kirpik-storefront/0.1")
            .build()?;

        // Keep exactly one trailing slash so join() appends to the API root
        // instead of replacing its last path segment.
        let normalised = format!("{}/", config.base_url.trim_end_matches('/'));
        let base_url = Url::parse(&normalised)
            .map_err(|e| ApiError::BaseUrl(format!("{}: {e}", config.base_url)))?;

        Ok(Self {
            client,
            base_url,
            token: config.token.clone(),
        })
    }

    /// Client pointed at a custom base URL, for tests against a mock server.
    pub fn with_base_url(base_url: &str) -> Result<Self, ApiError> {
        Self::new(&ApiConfig {
            base_url: base_url.to_string(),
            ..ApiConfig::default()
        })
    }

    /// Attach the bearer token used by admin and order endpoints. How the
    /// token is obtained is outside this crate.
    #[must_use]
    pub fn with_token(mut self, token: impl Into<String>) -> Self {
        self.token = Some(token.into());
        self
    }

    /// Published products for the storefront listing.
    pub async fn fetch_products(&self) -> Result<Vec<Product>, ApiError> {
        self.get("products").await
    }

    /// Products flagged as favorites, for the homepage strip.
    pub async fn fetch_favorite_products(&self) -> Result<Vec<Product>, ApiError> {
        self.get("products/favorites").await
    }

    /// Every product, drafts included. Admin only.
    pub async fn fetch_products_admin(&self) -> Result<Vec<Product>, ApiError> {
        self.get("products/admin/products").await
    }

    pub async fn fetch_product(&self, id: i64) -> Result<Product, ApiError> {
        self.get(&format!("products/{id}")).await
    }

    pub async fn fetch_product_admin(&self, id: i64) -> Result<Product, ApiError> {
        self.get(&format!("products/admin/products/{id}")).await
    }

    pub async fn create_product(&self, payload: &ProductPayload) -> Result<Product, ApiError> {
        self.send_json(Method::POST, "products", payload).await
    }

    pub async fn update_product(
        &self,
        id: i64,
        payload: &ProductPayload,
    ) -> Result<Product, ApiError> {
        self.send_json(Method::PUT, &format!("products/{id}"), payload)
            .await
    }

    pub async fn delete_product(&self, id: i64) -> Result<(), ApiError> {
        self.delete(&format!("products/{id}")).await
    }

    pub async fn fetch_categories(&self) -> Result<Vec<Category>, ApiError> {
        self.get("categories").await
    }

    pub async fn create_category(&self, payload: &CategoryPayload) -> Result<Category, ApiError> {
        payload.validate()?;
        self.send_json(Method::POST, "categories", payload).await
    }

    pub async fn delete_category(&self, id: i64) -> Result<(), ApiError> {
        self.delete(&format!("categories/{id}")).await
    }

    pub async fn fetch_sliders(&self) -> Result<Vec<Slider>, ApiError> {
        self.get("sliders").await
    }

    pub async fn create_slider(&self, payload: &SliderPayload) -> Result<Slider, ApiError> {
        payload.validate()?;
        self.send_json(Method::POST, "sliders", payload).await
    }

    pub async fn delete_slider(&self, id: i64) -> Result<(), ApiError> {
        self.delete(&format!("sliders/{id}")).await
    }

    /// Place an order for the cart's lines and receive the hosted-payment
    /// handoff. Validates the delivery fields locally first; an invalid
    /// request never reaches the network.
    pub async fn create_order(&self, request: &OrderRequest) -> Result<OrderResponse, ApiError> {
        request.validate()?;
        self.send_json(Method::POST, "orders", request).await
    }

    /// The signed-in user's order history.
    pub async fn fetch_my_orders(&self) -> Result<Vec<Order>, ApiError> {
        self.get("orders/me").await
    }

    /// Every order. Admin only.
    pub async fn fetch_all_orders(&self) -> Result<Vec<Order>, ApiError> {
        self.get("orders").await
    }

    fn endpoint(&self, path: &str) -> Result<Url, ApiError> {
        self.base_url
            .join(path)
            .map_err(|e| ApiError::BaseUrl(format!("{path}: {e}")))
    }

    fn request(&self, method: Method, url: Url) -> RequestBuilder {
        let request = self.client.request(method, url);
        match &self.token {
            Some(token) => request.bearer_auth(token),
            None => request,
        }
    }

    async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T, ApiError> {
        let url = self.endpoint(path)?;
        self.execute(self.request(Method::GET, url), path).await
    }

    async fn send_json<T: DeserializeOwned>(
        &self,
        method: Method,
        path: &str,
        body: &impl Serialize,
    ) -> Result<T, ApiError> {
        let url = self.endpoint(path)?;
        self.execute(self.request(method, url).json(body), path)
            .await
    }

    async fn delete(&self, path: &str) -> Result<(), ApiError> {
        let url = self.endpoint(path)?;
        let response = self.request(Method::DELETE, url).send().await?;
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            tracing::warn!(%status, path, "api call failed");
            return Err(ApiError::Api {
                status: status.as_u16(),
                message: error_message(&body),
            });
        }
        Ok(())
    }

    /// Send, check the status, and decode the response body.
    async fn execute<T: DeserializeOwned>(
        &self,
        request: RequestBuilder,
        context: &str,
    ) -> Result<T, ApiError> {
        let response = request.send().await?;
        let status = response.status();
        let body = response.text().await?;
        if !status.is_success() {
            tracing::warn!(%status, context, "api call failed");
            return Err(ApiError::Api {
                status: status.as_u16(),
                message: error_message(&body),
            });
        }
        serde_json::from_str(&body).map_err(|e| ApiError::Deserialize {
            context: context.to_string(),
            source: e,
        })
    }
}

/// Best-effort extraction of the backend's `{ "message": ... }` error body.
fn error_message(body: &str) -> String {
    serde_json::from_str::<serde_json::Value>(body)
        .ok()
        .and_then(|value| {
            value
                .get("message")
                .and_then(serde_json::Value::as_str)
                .map(str::to_string)
        })
        .unwrap_or_else(|| "request failed".to_string())
}
