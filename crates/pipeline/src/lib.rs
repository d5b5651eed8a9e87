//! Generation pipeline orchestration.
//!
//! [`StoryboardController`] drives the whole flow: it gates every
//! operation on the session, issues the single structure call, fans out
//! one concurrent image render per scene, supports independent per-scene
//! retry, and runs the long-poll video job as its own task. Per-scene and
//! per-job completions are correlated by generation token and job id so
//! results from superseded work are discarded instead of corrupting the
//! current storyboard.
//!
//! State changes are observable two ways: snapshots of
//! [`StoryboardState`] and a broadcast stream of [`PipelineEvent`]s.

pub mod controller;
pub mod events;
pub mod state;

pub use controller::{PipelineError, StoryboardController};
pub use events::PipelineEvent;
pub use state::StoryboardState;
