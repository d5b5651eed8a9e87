//! Model-selection enums forwarded to the generative backend.
//!
//! Each enum maps a user-facing choice onto the backend model identifier
//! or config string the gateway puts on the wire. Defaults match the
//! cheapest/fastest variant of each family.

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Image generation
// ---------------------------------------------------------------------------

/// Image model family used for per-scene renders.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ImageModel {
    /// Fast flash-tier image model.
    Flash,
    /// Pro-tier image model. The only variant that honors an explicit
    /// output resolution.
    Pro,
}

impl ImageModel {
    /// Backend model identifier for this variant.
    pub fn model_id(self) -> &'static str {
        match self {
            ImageModel::Flash => "gemini-2.5-flash-image",
            ImageModel::Pro => "gemini-3-pro-image-preview",
        }
    }

    /// Whether the resolution parameter is forwarded for this variant.
    pub fn supports_resolution(self) -> bool {
        matches!(self, ImageModel::Pro)
    }
}

impl Default for ImageModel {
    fn default() -> Self {
        ImageModel::Flash
    }
}

/// Aspect ratio for generated scene images.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ImageAspectRatio {
    Wide16x9,
    Tall9x16,
    Square,
}

impl ImageAspectRatio {
    /// Wire value, e.g. `16:9`.
    pub fn as_str(self) -> &'static str {
        match self {
            ImageAspectRatio::Wide16x9 => "16:9",
            ImageAspectRatio::Tall9x16 => "9:16",
            ImageAspectRatio::Square => "1:1",
        }
    }
}

impl Default for ImageAspectRatio {
    fn default() -> Self {
        ImageAspectRatio::Wide16x9
    }
}

/// Output resolution for pro-tier image renders.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ImageResolution {
    OneK,
    TwoK,
    FourK,
}

impl ImageResolution {
    /// Wire value, e.g. `1K`.
    pub fn as_str(self) -> &'static str {
        match self {
            ImageResolution::OneK => "1K",
            ImageResolution::TwoK => "2K",
            ImageResolution::FourK => "4K",
        }
    }
}

impl Default for ImageResolution {
    fn default() -> Self {
        ImageResolution::OneK
    }
}

// ---------------------------------------------------------------------------
// Video generation
// ---------------------------------------------------------------------------

/// Video model used for the long-running render job.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum VideoModel {
    /// Fast preview-quality variant.
    Fast,
    /// Full-quality variant.
    Quality,
}

impl VideoModel {
    /// Backend model identifier for this variant.
    pub fn model_id(self) -> &'static str {
        match self {
            VideoModel::Fast => "veo-3.1-fast-generate-preview",
            VideoModel::Quality => "veo-3.1-generate-preview",
        }
    }
}

impl Default for VideoModel {
    fn default() -> Self {
        VideoModel::Fast
    }
}

/// Aspect ratio for the video render.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum VideoAspectRatio {
    Wide16x9,
    Tall9x16,
}

impl VideoAspectRatio {
    pub fn as_str(self) -> &'static str {
        match self {
            VideoAspectRatio::Wide16x9 => "16:9",
            VideoAspectRatio::Tall9x16 => "9:16",
        }
    }
}

impl Default for VideoAspectRatio {
    fn default() -> Self {
        VideoAspectRatio::Wide16x9
    }
}

/// Output resolution for the video render.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum VideoResolution {
    Hd720,
    Hd1080,
}

impl VideoResolution {
    pub fn as_str(self) -> &'static str {
        match self {
            VideoResolution::Hd720 => "720p",
            VideoResolution::Hd1080 => "1080p",
        }
    }
}

impl Default for VideoResolution {
    fn default() -> Self {
        VideoResolution::Hd720
    }
}

// ---------------------------------------------------------------------------
// Settings bundle
// ---------------------------------------------------------------------------

/// The currently selected render options, carried into every image and
/// video dispatch.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct RenderSettings {
    pub image_model: ImageModel,
    pub image_aspect_ratio: ImageAspectRatio,
    pub image_resolution: ImageResolution,
    pub video_model: VideoModel,
    pub video_aspect_ratio: VideoAspectRatio,
    pub video_resolution: VideoResolution,
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
