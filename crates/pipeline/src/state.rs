//! Shared storyboard state.

use cineboard_core::story::{ProductionAssets, Scene, TitlePair};
use cineboard_core::video::VideoJob;
use serde::Serialize;

/// Everything one storyboard generation owns, guarded by a single
/// `RwLock` in the controller.
///
/// The `generation` counter is the arena token for fan-out completions:
/// it is bumped every time a new story generation clears the state, and
/// every in-flight image completion compares its captured value against
/// it before writing. Per-index scene writes never conflict across
/// indices; the token only protects against writes from a superseded
/// generation.
#[derive(Debug, Clone, Default, Serialize)]
pub struct StoryboardState {
    pub scenes: Vec<Scene>,
    pub titles: Vec<TitlePair>,
    pub assets: ProductionAssets,
    /// The current video job, if one was ever triggered. Replaced
    /// wholesale on retry.
    pub video_job: Option<VideoJob>,
    /// Reference image forwarded to image and video dispatches.
    pub reference_image: Option<String>,
    /// Monotonically increasing story-generation token.
    pub generation: u64,
}

impl StoryboardState {
    /// Number of scenes whose render reached a terminal state.
    pub fn settled_scenes(&self) -> usize {
        self.scenes.iter().filter(|s| s.is_settled()).count()
    }
}
