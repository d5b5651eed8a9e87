//! Backend fault classification.
//!
//! The backend signals credential problems through error-message text, not
//! structured codes. This module recognizes the two signatures that drive
//! session transitions: the revocation signature (the previously selected
//! credential entity no longer resolves) and the inactive/missing-key
//! signatures raised before any network call. Matching is substring-based
//! against the error's display text.

use crate::prompt::CredentialPrompt;
use crate::resolver::Session;

// ---------------------------------------------------------------------------
// Signatures
// ---------------------------------------------------------------------------

/// Backend rejection emitted when the selected credential entity no longer
/// resolves. Forces the session back to unauthenticated wherever it shows
/// up.
pub const REVOKED_SIGNATURE: &str = "Requested entity was not found";

/// Prefix of the fail-fast error raised when the session is deactivated.
pub const INACTIVE_SIGNATURE: &str = "API_INACTIVE";

/// Fail-fast error raised when no credential path resolves to a secret.
pub const MISSING_KEY_SIGNATURE: &str = "API key missing";

// ---------------------------------------------------------------------------
// Classification
// ---------------------------------------------------------------------------

/// What a backend failure means for the session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionFault {
    /// The credential entity was revoked; the session must be forced back
    /// to unauthenticated.
    CredentialRevoked,
    /// The session was inactive or no key resolved; re-acquisition is
    /// needed but the activation flag is left alone.
    CredentialInactive,
    /// Anything else -- surfaced to the caller without touching the session.
    Other,
}

/// Classify a backend error message by its signature.
pub fn classify(message: &str) -> SessionFault {
    if message.contains(REVOKED_SIGNATURE) {
        SessionFault::CredentialRevoked
    } else if message.contains(INACTIVE_SIGNATURE) || message.contains(MISSING_KEY_SIGNATURE) {
        SessionFault::CredentialInactive
    } else {
        SessionFault::Other
    }
}

/// Apply the session-level consequence of a backend failure.
///
/// A revoked credential deactivates the session and opens the credential
/// surface; the returned classification lets each call site layer its own
/// additional policy on top (the story and image paths re-prompt on every
/// failure, the video path only on credential faults).
pub async fn handle_fault(
    session: &Session,
    prompt: &dyn CredentialPrompt,
    message: &str,
) -> SessionFault {
    let fault = classify(message);
    if fault == SessionFault::CredentialRevoked {
        tracing::warn!(error = %message, "Credential entity revoked by backend");
        session.deactivate();
        prompt.request_credentials().await;
    }
    fault
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    // -- classification --

    #[test]
    fn revocation_signature_classifies_as_revoked() {
        let message = "400 Bad Request: Requested entity was not found.";
        assert_eq!(classify(message), SessionFault::CredentialRevoked);
    }

    #[test]
    fn inactive_signature_classifies_as_inactive() {
        let message = "API_INACTIVE: credential vault is deactivated";
        assert_eq!(classify(message), SessionFault::CredentialInactive);
    }

    #[test]
    fn missing_key_signature_classifies_as_inactive() {
        let message = "API key missing. Open Settings to configure.";
        assert_eq!(classify(message), SessionFault::CredentialInactive);
    }

    #[test]
    fn unrelated_errors_classify_as_other() {
        assert_eq!(classify("connection reset by peer"), SessionFault::Other);
        assert_eq!(classify(""), SessionFault::Other);
    }

    #[test]
    fn revocation_wins_over_other_signatures() {
        let message = "API_INACTIVE after: Requested entity was not found";
        assert_eq!(classify(message), SessionFault::CredentialRevoked);
    }
}
