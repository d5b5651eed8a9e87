//! Credential storage contracts and the in-memory implementation.
//!
//! [`CredentialStore`] is the manually-entered-secret half of the session:
//! a plain get/set/clear key-value capability plus an "activated" flag.
//! [`DelegatedCredentials`] is the host-provided key-selection capability,
//! which may be entirely absent and is queried asynchronously.

use std::sync::Mutex;

use async_trait::async_trait;

// ---------------------------------------------------------------------------
// Manual credential store
// ---------------------------------------------------------------------------

/// Storage for the manually entered secret and the activation flag.
///
/// Implementations must be cheap to call; the resolver consults the store
/// on every authorization check.
pub trait CredentialStore: Send + Sync {
    fn has_stored_secret(&self) -> bool;
    fn get_secret(&self) -> Option<String>;
    fn save_secret(&self, secret: &str);
    fn remove_secret(&self);
    fn is_activated(&self) -> bool;
    fn set_activated(&self, activated: bool);
}

/// Process-lifetime credential store.
///
/// Holds the secret and activation flag behind a mutex. Nothing is
/// persisted; a restart starts from a clean, deactivated state.
#[derive(Default)]
pub struct MemoryCredentialStore {
    inner: Mutex<StoreState>,
}

#[derive(Default)]
struct StoreState {
    secret: Option<String>,
    activated: bool,
}

impl MemoryCredentialStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, StoreState> {
        // Lock poisoning only happens if a holder panicked; the state is a
        // pair of plain values, so recover the inner data either way.
        self.inner.lock().unwrap_or_else(|e| e.into_inner())
    }
}

impl CredentialStore for MemoryCredentialStore {
    fn has_stored_secret(&self) -> bool {
        self.lock().secret.is_some()
    }

    fn get_secret(&self) -> Option<String> {
        self.lock().secret.clone()
    }

    fn save_secret(&self, secret: &str) {
        self.lock().secret = Some(secret.to_string());
    }

    fn remove_secret(&self) {
        self.lock().secret = None;
    }

    fn is_activated(&self) -> bool {
        self.lock().activated
    }

    fn set_activated(&self, activated: bool) {
        self.lock().activated = activated;
    }
}

// ---------------------------------------------------------------------------
// Delegated credential capability
// ---------------------------------------------------------------------------

/// Host-provided key-selection capability.
///
/// The host may not provide this at all; the resolver treats an absent
/// capability as "no key selected" without error. `open_key_selector` is
/// fire-and-forget -- completion carries no confirmation, so callers must
/// re-query [`has_selected_key`](Self::has_selected_key) instead of
/// assuming the selection succeeded.
#[async_trait]
pub trait DelegatedCredentials: Send + Sync {
    async fn has_selected_key(&self) -> bool;
    async fn open_key_selector(&self);
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
