//! Session resolver: decides whether backend calls are allowed at all.
//!
//! Authorization is computed fresh on every check from the activation flag
//! plus the three credential paths (manual secret, delegated selection,
//! environment fallback). Nothing is cached between checks, so a forced
//! deactivation or a dismissed key selector takes effect on the very next
//! gate.

use std::sync::Arc;

use crate::prompt::CredentialPrompt;
use crate::store::{CredentialStore, DelegatedCredentials};

/// Environment variable consulted as the fallback credential path.
pub const ENV_SECRET_VAR: &str = "GEMINI_API_KEY";

/// Authorization state for the backend gateway.
///
/// Owns the credential store, the optional host-delegated capability, and
/// the environment fallback captured at construction. Cloneable via `Arc`
/// into every call site; all mutation goes through the explicit methods
/// below.
pub struct Session {
    store: Arc<dyn CredentialStore>,
    delegated: Option<Arc<dyn DelegatedCredentials>>,
    env_secret: Option<String>,
}

impl Session {
    pub fn new(
        store: Arc<dyn CredentialStore>,
        delegated: Option<Arc<dyn DelegatedCredentials>>,
        env_secret: Option<String>,
    ) -> Self {
        Self {
            store,
            delegated,
            env_secret: env_secret.filter(|s| !s.is_empty()),
        }
    }

    /// Build a session whose fallback secret comes from [`ENV_SECRET_VAR`].
    pub fn from_env(
        store: Arc<dyn CredentialStore>,
        delegated: Option<Arc<dyn DelegatedCredentials>>,
    ) -> Self {
        Self::new(store, delegated, std::env::var(ENV_SECRET_VAR).ok())
    }

    // ---- authorization ----

    /// Whether backend calls are currently allowed.
    ///
    /// True iff the session is activated and at least one credential path
    /// resolves: a stored manual secret, a delegated key selection (absent
    /// capability counts as unselected), or the environment fallback.
    pub async fn is_authorized(&self) -> bool {
        if !self.store.is_activated() {
            return false;
        }
        if self.store.has_stored_secret() {
            return true;
        }
        if let Some(delegated) = &self.delegated {
            if delegated.has_selected_key().await {
                return true;
            }
        }
        self.env_secret.is_some()
    }

    /// Gate an operation on authorization.
    ///
    /// Returns true immediately when authorized. Otherwise triggers the
    /// credential-acquisition surface and returns false; the caller must
    /// abort its pending operation and issue no backend calls.
    pub async fn ensure_authorized(&self, prompt: &dyn CredentialPrompt) -> bool {
        if self.is_authorized().await {
            return true;
        }
        tracing::debug!("Session not authorized, opening credential surface");
        prompt.request_credentials().await;
        false
    }

    // ---- credential resolution ----

    /// The secret handed to the backend gateway: the stored manual secret,
    /// else the environment fallback. Delegated keys are ambient on the
    /// host and never readable here.
    pub fn resolved_secret(&self) -> Option<String> {
        self.store.get_secret().or_else(|| self.env_secret.clone())
    }

    pub fn is_activated(&self) -> bool {
        self.store.is_activated()
    }

    // ---- explicit transitions ----

    pub fn activate(&self) {
        self.store.set_activated(true);
    }

    /// Force the session back to unauthenticated.
    ///
    /// Used by the fault handler when the backend signals that the selected
    /// credential entity no longer resolves. The delegated selection is not
    /// cached here, so dropping the activation flag is sufficient to make
    /// every subsequent gate fail until the user re-engages a key.
    pub fn deactivate(&self) {
        tracing::warn!("Session deactivated");
        self.store.set_activated(false);
    }

    pub fn save_secret(&self, secret: &str) {
        self.store.save_secret(secret);
    }

    pub fn clear_secret(&self) {
        self.store.remove_secret();
    }

    /// Open the host's key selector, if the capability is present.
    ///
    /// Fire-and-forget; the next authorization check re-queries the
    /// capability rather than assuming the selection went through.
    pub async fn open_delegated_selector(&self) {
        if let Some(delegated) = &self.delegated {
            delegated.open_key_selector().await;
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
