//! Credential and session state for the Cineboard client.
//!
//! Every backend call is gated on an authorized session. Authorization is
//! derived -- never cached -- from three credential paths: a manually stored
//! secret, a host-delegated key selection, and an environment fallback.
//! This crate holds the credential store contract, the session resolver
//! that combines the three paths, and the fault classifier that maps
//! backend error signatures onto forced session invalidation.

pub mod fault;
pub mod prompt;
pub mod resolver;
pub mod store;

pub use fault::{classify, SessionFault};
pub use prompt::CredentialPrompt;
pub use resolver::{Session, ENV_SECRET_VAR};
pub use store::{CredentialStore, DelegatedCredentials, MemoryCredentialStore};
