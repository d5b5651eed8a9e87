//! Pipeline events broadcast to observers.
//!
//! These are the high-level state changes a front end cares about. They
//! are emitted after the corresponding state mutation has landed, and
//! carry the generation token or job id so consumers can ignore events
//! from superseded work.

use serde::Serialize;
use uuid::Uuid;

/// A state change in the generation pipeline.
#[derive(Debug, Clone, Serialize)]
pub enum PipelineEvent {
    /// The structure call succeeded and the scene set was installed.
    StructureReady {
        generation: u64,
        scene_count: usize,
    },

    /// One scene's image call produced a payload.
    SceneRendered { generation: u64, index: usize },

    /// One scene's image call failed.
    SceneFailed {
        generation: u64,
        index: usize,
        /// Full backend error text (the scene itself carries only the
        /// short user-facing label).
        error: String,
    },

    /// The title set was wholesale-replaced.
    TitlesReplaced { count: usize },

    /// A video job entered the polling state.
    VideoStarted { job_id: Uuid },

    /// A video job settled with a locally-addressable asset URL.
    VideoReady { job_id: Uuid, url: String },

    /// A video job settled with an error.
    VideoFailed { job_id: Uuid, message: String },

    /// The backend revoked the selected credential; the session was forced
    /// back to unauthenticated.
    SessionInvalidated,
}
