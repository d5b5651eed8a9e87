//! Video render job record.
//!
//! The long-running video render is tracked as a single job record owned by
//! the pipeline. There is at most one current job; a retry replaces the
//! record wholesale rather than merging into it, so completions from a
//! superseded job can be recognized by id and discarded.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::types::Timestamp;

/// Lifecycle of the video render job.
///
/// Absence of a job record is the idle state; a freshly created job starts
/// in `Polling` and settles into exactly one of the terminal variants.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum VideoJobState {
    /// The long-running operation is being polled.
    Polling,
    /// The rendered asset is available at a locally-addressable URL.
    Ready { url: String },
    /// The operation or download failed.
    Failed { message: String },
}

/// One video render job.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VideoJob {
    /// Identity used to discard completions from superseded jobs.
    pub id: Uuid,
    pub state: VideoJobState,
    pub started_at: Timestamp,
}

impl VideoJob {
    /// Create a new job in the polling state.
    pub fn start() -> Self {
        Self {
            id: Uuid::new_v4(),
            state: VideoJobState::Polling,
            started_at: chrono::Utc::now(),
        }
    }

    /// Whether the job reached a terminal state.
    pub fn is_settled(&self) -> bool {
        matches!(
            self.state,
            VideoJobState::Ready { .. } | VideoJobState::Failed { .. }
        )
    }
}
