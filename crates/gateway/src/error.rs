//! Gateway error taxonomy.
//!
//! Display text matters here: the session fault handler classifies
//! failures by substring signature, so the inactive/missing variants carry
//! their signature prefixes and backend rejections keep the raw response
//! body in their message.

/// Errors surfaced by the backend gateway.
#[derive(Debug, thiserror::Error)]
pub enum GatewayError {
    /// The session is deactivated; raised before any network call.
    #[error("API_INACTIVE: credential vault is deactivated; select a key in settings")]
    SessionInactive,

    /// No credential path resolved to a secret; raised before any network
    /// call.
    #[error("API key missing. Open Settings to configure.")]
    CredentialMissing,

    /// The backend returned no parsable payload for a structure call.
    #[error("Response was empty.")]
    EmptyResponse,

    /// No inline image payload in an image-call response.
    #[error("Failed to produce image.")]
    NoImageProduced,

    /// The polled video operation reported an error. Carries the backend's
    /// message verbatim.
    #[error("{0}")]
    OperationFailed(String),

    /// A completed video operation had no result reference.
    #[error("No video returned.")]
    NoVideoReturned,

    /// Fetching the finished video asset failed with this HTTP status.
    #[error("Download failed: {0}")]
    DownloadFailed(u16),

    /// The HTTP request itself failed (network, DNS, TLS, ...).
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// The backend returned a non-2xx status code.
    #[error("Backend error ({status}): {body}")]
    Backend {
        /// HTTP status code.
        status: u16,
        /// Raw response body; carries the backend's error signature.
        body: String,
    },

    /// A response body did not match the expected payload shape.
    #[error("Failed to parse backend payload: {0}")]
    Payload(#[from] serde_json::Error),

    /// Writing the downloaded video asset to local storage failed.
    #[error("Failed to store video asset: {0}")]
    Storage(#[from] std::io::Error),
}
