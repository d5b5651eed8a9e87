//! RPC gateway to the generative backend.
//!
//! Wraps the three backend operations -- story structure, scene image, and
//! video render -- behind the [`StoryboardBackend`] trait. [`GeminiClient`]
//! is the real implementation over the Generative Language REST API: it
//! shapes requests (structured-output schema, inline reference images,
//! prompt post-processing), unwraps responses (candidate text, first
//! inline image payload), and drives the long-running video operation to
//! completion by polling.
//!
//! Every operation gates on the session before any network I/O: a
//! deactivated session fails with [`GatewayError::SessionInactive`] and a
//! session with no resolvable secret with
//! [`GatewayError::CredentialMissing`].

pub mod backend;
pub mod client;
pub mod error;
pub mod image;
pub mod story;
pub mod video;
pub mod wire;

pub use backend::{ImageParams, StoryboardBackend, VideoParams};
pub use client::GeminiClient;
pub use error::GatewayError;
pub use video::VideoPollConfig;
