//! The backend seam consumed by the generation pipeline.

use async_trait::async_trait;
use cineboard_core::models::{
    ImageAspectRatio, ImageModel, ImageResolution, VideoAspectRatio, VideoModel, VideoResolution,
};
use cineboard_core::story::{StoryRequest, StoryStructure, TitlePair};

use crate::client::GeminiClient;
use crate::error::GatewayError;

/// Parameters for one scene-image render.
#[derive(Debug, Clone)]
pub struct ImageParams {
    pub model: ImageModel,
    pub prompt: String,
    pub aspect_ratio: ImageAspectRatio,
    /// Only forwarded when the model variant supports it.
    pub resolution: ImageResolution,
    pub reference_image: Option<String>,
}

/// Parameters for the long-running video render.
#[derive(Debug, Clone)]
pub struct VideoParams {
    pub model: VideoModel,
    pub prompt: String,
    pub aspect_ratio: VideoAspectRatio,
    pub resolution: VideoResolution,
    pub reference_image: Option<String>,
}

/// The three backend operations plus title regeneration, as the pipeline
/// sees them. The real implementation is [`GeminiClient`]; tests drive the
/// pipeline through scripted fakes of this trait.
#[async_trait]
pub trait StoryboardBackend: Send + Sync {
    /// One structure call: the full scene list, title suggestions, and the
    /// music/lyrics pairing, with prompt shaping already applied.
    async fn generate_story(&self, request: &StoryRequest)
        -> Result<StoryStructure, GatewayError>;

    /// Standalone title regeneration.
    async fn generate_titles(&self, topic: &str) -> Result<Vec<TitlePair>, GatewayError>;

    /// One scene-image render; returns the image as a data-URL string.
    async fn generate_image(&self, params: &ImageParams) -> Result<String, GatewayError>;

    /// The long-running video render, driven to completion; returns a
    /// locally-addressable URL for the downloaded asset.
    async fn generate_video(&self, params: &VideoParams) -> Result<String, GatewayError>;
}

#[async_trait]
impl StoryboardBackend for GeminiClient {
    async fn generate_story(
        &self,
        request: &StoryRequest,
    ) -> Result<StoryStructure, GatewayError> {
        self.generate_story_structure(request).await
    }

    async fn generate_titles(&self, topic: &str) -> Result<Vec<TitlePair>, GatewayError> {
        self.generate_title_set(topic).await
    }

    async fn generate_image(&self, params: &ImageParams) -> Result<String, GatewayError> {
        self.generate_scene_image(params).await
    }

    async fn generate_video(&self, params: &VideoParams) -> Result<String, GatewayError> {
        self.generate_video_render(params).await
    }
}
