//! Scene-image operation.
//!
//! One request per scene. The resolution parameter is only forwarded for
//! model variants that honor it; the response is scanned for the first
//! inline image payload.

use serde_json::{json, Value};

use crate::backend::ImageParams;
use crate::client::GeminiClient;
use crate::error::GatewayError;
use crate::wire::content_parts;

/// Request body for one image render.
pub(crate) fn build_image_body(params: &ImageParams) -> Value {
    let mut image_config = json!({ "aspectRatio": params.aspect_ratio.as_str() });
    if params.model.supports_resolution() {
        image_config["imageSize"] = json!(params.resolution.as_str());
    }

    let parts = content_parts(params.reference_image.as_deref(), &params.prompt);
    json!({
        "contents": [{ "parts": parts }],
        "generationConfig": { "imageConfig": image_config },
    })
}

impl GeminiClient {
    /// Render one scene image; returns a base64 data-URL string.
    pub async fn generate_scene_image(
        &self,
        params: &ImageParams,
    ) -> Result<String, GatewayError> {
        let secret = self.resolve_credential()?;
        let body = build_image_body(params);

        let response = self
            .post_generate_content(params.model.model_id(), &secret, &body)
            .await?;
        response
            .first_inline_image()
            .ok_or(GatewayError::NoImageProduced)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
