//! Credential-acquisition surface.

use async_trait::async_trait;

/// The surface through which the user is asked for credentials (a settings
/// modal, a terminal prompt, ...).
///
/// Triggering it is fire-and-forget: the call returns once the surface has
/// been opened, not once the user has acted. Callers that were gated off
/// must abort their pending operation rather than wait.
#[async_trait]
pub trait CredentialPrompt: Send + Sync {
    async fn request_credentials(&self);
}
