//! Domain types and pure helpers for the Cineboard storyboard client.
//!
//! This crate has no internal dependencies and no I/O. It defines the
//! storyboard data model (scenes, titles, production assets, video jobs),
//! the model-selection enums forwarded to the generative backend, and the
//! deterministic prompt-shaping rules applied to structure-call output.

pub mod error;
pub mod models;
pub mod prompts;
pub mod story;
pub mod types;
pub mod video;
