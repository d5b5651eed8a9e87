//! Storyboard data model: scenes, titles, and production assets.
//!
//! A storyboard is born from a single structure call that yields the full
//! scene list plus title suggestions and a music/lyrics pairing. Each
//! scene's render fields then evolve independently as its image call
//! resolves, so the transition methods here are the only way render state
//! is mutated -- they keep the image/error fields consistent with the
//! [`RenderState`] tag.

use serde::{Deserialize, Serialize};

use crate::error::CoreError;

// ---------------------------------------------------------------------------
// Scene-count limits
// ---------------------------------------------------------------------------

/// Scene count used when the caller does not specify one.
pub const DEFAULT_SCENE_COUNT: u32 = 10;

/// Minimum scenes per storyboard.
pub const MIN_SCENE_COUNT: u32 = 1;

/// Maximum scenes per storyboard.
pub const MAX_SCENE_COUNT: u32 = 50;

/// Validate that a requested scene count is within allowed bounds.
pub fn validate_scene_count(count: u32) -> Result<(), CoreError> {
    if !(MIN_SCENE_COUNT..=MAX_SCENE_COUNT).contains(&count) {
        return Err(CoreError::Validation(format!(
            "scene count must be between {MIN_SCENE_COUNT} and {MAX_SCENE_COUNT}, got {count}"
        )));
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Story request
// ---------------------------------------------------------------------------

/// Input bundle for one storyboard generation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoryRequest {
    /// User-supplied topic. An empty topic gates the whole pipeline off.
    pub topic: String,
    /// Optional reference image as a base64 data-URL string.
    pub reference_image: Option<String>,
    /// Number of scenes the structure call must return.
    pub scene_count: u32,
}

impl StoryRequest {
    /// Build a request with the default scene count and no reference image.
    pub fn new(topic: impl Into<String>) -> Self {
        Self {
            topic: topic.into(),
            reference_image: None,
            scene_count: DEFAULT_SCENE_COUNT,
        }
    }

    pub fn with_reference_image(mut self, image: impl Into<String>) -> Self {
        self.reference_image = Some(image.into());
        self
    }

    pub fn with_scene_count(mut self, count: u32) -> Self {
        self.scene_count = count;
        self
    }

    /// Validate the request before dispatch.
    pub fn validate(&self) -> Result<(), CoreError> {
        if self.topic.trim().is_empty() {
            return Err(CoreError::Validation("topic must not be empty".to_string()));
        }
        validate_scene_count(self.scene_count)
    }
}

// ---------------------------------------------------------------------------
// Scene
// ---------------------------------------------------------------------------

/// Render lifecycle of a single scene's image.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RenderState {
    /// Created but not yet dispatched.
    Pending,
    /// An image call is in flight.
    Loading,
    /// The image call produced a payload.
    Ready,
    /// The image call failed.
    Failed,
}

/// One storyboard unit.
///
/// `render == Ready` iff `image_data` is present and `error_label` absent;
/// `render == Failed` iff `error_label` is present. Use the transition
/// methods to keep those fields in lockstep.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Scene {
    /// One-based scene number as assigned by the structure call.
    pub scene_number: i32,
    /// Scene summary text.
    pub description: String,
    /// Prompt for the still-image render (already shaped by the gateway).
    pub image_prompt: String,
    /// Motion directive for a later image-to-video stage.
    pub i2v_prompt: String,
    /// Render lifecycle tag.
    pub render: RenderState,
    /// Rendered image as a base64 data-URL string.
    pub image_data: Option<String>,
    /// Short user-facing failure label.
    pub error_label: Option<String>,
}

impl Scene {
    /// Create a scene with cleared render fields.
    pub fn new(
        scene_number: i32,
        description: impl Into<String>,
        image_prompt: impl Into<String>,
        i2v_prompt: impl Into<String>,
    ) -> Self {
        Self {
            scene_number,
            description: description.into(),
            image_prompt: image_prompt.into(),
            i2v_prompt: i2v_prompt.into(),
            render: RenderState::Pending,
            image_data: None,
            error_label: None,
        }
    }

    /// Mark an image call as in flight, clearing any prior result or error.
    pub fn begin_render(&mut self) {
        self.render = RenderState::Loading;
        self.image_data = None;
        self.error_label = None;
    }

    /// Record a successful render.
    pub fn complete_render(&mut self, image_data: impl Into<String>) {
        self.image_data = Some(image_data.into());
        self.error_label = None;
        self.render = RenderState::Ready;
    }

    /// Record a failed render with a short user-facing label.
    pub fn fail_render(&mut self, label: impl Into<String>) {
        self.image_data = None;
        self.error_label = Some(label.into());
        self.render = RenderState::Failed;
    }

    /// Whether the render reached a terminal state.
    pub fn is_settled(&self) -> bool {
        matches!(self.render, RenderState::Ready | RenderState::Failed)
    }
}

// ---------------------------------------------------------------------------
// Titles and production assets
// ---------------------------------------------------------------------------

/// One bilingual title suggestion.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TitlePair {
    pub english: String,
    pub korean: String,
}

/// Music prompt and lyrics produced alongside the scenes.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ProductionAssets {
    pub music_prompt: Option<String>,
    pub lyrics: Option<String>,
}

// ---------------------------------------------------------------------------
// Structure-call result
// ---------------------------------------------------------------------------

/// Everything a successful structure call yields, installed atomically.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoryStructure {
    pub scenes: Vec<Scene>,
    pub titles: Vec<TitlePair>,
    pub music_prompt: String,
    pub lyrics: String,
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    // -- scene-count validation --

    #[test]
    fn scene_count_bounds_accepted() {
        assert!(validate_scene_count(MIN_SCENE_COUNT).is_ok());
        assert!(validate_scene_count(DEFAULT_SCENE_COUNT).is_ok());
        assert!(validate_scene_count(MAX_SCENE_COUNT).is_ok());
    }

    #[test]
    fn scene_count_zero_rejected() {
        assert!(validate_scene_count(0).is_err());
    }

    #[test]
    fn scene_count_above_max_rejected() {
        assert!(validate_scene_count(MAX_SCENE_COUNT + 1).is_err());
    }

    // -- request validation --

    #[test]
    fn request_defaults_to_ten_scenes() {
        let request = StoryRequest::new("a lonely astronaut");
        assert_eq!(request.scene_count, 10);
        assert!(request.validate().is_ok());
    }

    #[test]
    fn request_with_blank_topic_rejected() {
        assert!(StoryRequest::new("   ").validate().is_err());
    }

    #[test]
    fn request_with_out_of_range_count_rejected() {
        let request = StoryRequest::new("topic").with_scene_count(51);
        assert!(request.validate().is_err());
    }

    // -- scene transitions --

    fn scene() -> Scene {
        Scene::new(1, "desc", "prompt", "motion")
    }

    #[test]
    fn new_scene_is_pending_and_clear() {
        let s = scene();
        assert_eq!(s.render, RenderState::Pending);
        assert!(s.image_data.is_none());
        assert!(s.error_label.is_none());
    }

    #[test]
    fn begin_render_clears_prior_outcome() {
        let mut s = scene();
        s.fail_render("Render Error");
        s.begin_render();
        assert_eq!(s.render, RenderState::Loading);
        assert!(s.image_data.is_none());
        assert!(s.error_label.is_none());
    }

    #[test]
    fn complete_render_sets_image_and_clears_error() {
        let mut s = scene();
        s.begin_render();
        s.complete_render("data:image/png;base64,QUJD");
        assert_eq!(s.render, RenderState::Ready);
        assert!(s.image_data.is_some());
        assert!(s.error_label.is_none());
        assert!(s.is_settled());
    }

    #[test]
    fn fail_render_sets_label_and_clears_image() {
        let mut s = scene();
        s.begin_render();
        s.complete_render("data:image/png;base64,QUJD");
        s.fail_render("Retry Failed");
        assert_eq!(s.render, RenderState::Failed);
        assert!(s.image_data.is_none());
        assert_eq!(s.error_label.as_deref(), Some("Retry Failed"));
        assert!(s.is_settled());
    }

    #[test]
    fn scene_serializes_render_fields() {
        let mut s = scene();
        s.begin_render();
        let json = serde_json::to_value(&s).expect("scene serializes");
        assert_eq!(json["render"], "Loading");
        assert!(json["image_data"].is_null());
    }
}
