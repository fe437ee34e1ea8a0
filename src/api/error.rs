use thiserror::Error;

/// Errors surfaced by the storefront API client.
#[derive(Debug, Error)]
pub enum ApiError {
    /// Network or TLS failure from the underlying HTTP client.
    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),

    /// The backend refused the request; carries its `message` body when one
    /// was present.
    #[error("api error ({status}): {message}")]
    Api { status: u16, message: String },

    /// The response body did not match the expected shape.
    #[error("unexpected response for {context}: {source}")]
    Deserialize {
        context: String,
        #[source]
        source: serde_json::Error,
    },

    /// The request failed local validation; nothing was sent.
    #[error("invalid request: {0}")]
    Validation(#[from] validator::ValidationErrors),

    /// The configured base URL could not be parsed.
    #[error("invalid base URL: {0}")]
    BaseUrl(String),
}
