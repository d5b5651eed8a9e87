//! Wire types for the Generative Language REST API.
//!
//! Request bodies are built with `serde_json::json!`; the typed structs
//! here cover the response side plus the content-part helpers shared by
//! the structure, image, and video operations.

use serde::Deserialize;
use serde_json::{json, Value};

// ---------------------------------------------------------------------------
// Request helpers
// ---------------------------------------------------------------------------

/// Strip a `data:<mime>;base64,` prefix, leaving the raw base64 payload.
///
/// Inputs that are already bare base64 pass through unchanged.
pub fn strip_data_url(data: &str) -> &str {
    match data.split_once(',') {
        Some((_, rest)) if !rest.is_empty() => rest,
        _ => data,
    }
}

/// Build the content parts for a call: an optional inline JPEG reference
/// image followed by the text prompt. Part order matters -- the image must
/// precede the text so the model treats it as visual context.
pub fn content_parts(reference_image: Option<&str>, text: &str) -> Vec<Value> {
    let mut parts = Vec::new();
    if let Some(image) = reference_image {
        parts.push(json!({
            "inlineData": {
                "mimeType": "image/jpeg",
                "data": strip_data_url(image),
            }
        }));
    }
    parts.push(json!({ "text": text }));
    parts
}

// ---------------------------------------------------------------------------
// generateContent response
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
pub struct GenerateContentResponse {
    #[serde(default)]
    pub candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
pub struct Candidate {
    pub content: Option<Content>,
}

#[derive(Debug, Deserialize)]
pub struct Content {
    #[serde(default)]
    pub parts: Vec<Part>,
}

/// One content part. Text and inline data are mutually exclusive in
/// practice but both optional on the wire.
#[derive(Debug, Deserialize)]
pub struct Part {
    pub text: Option<String>,
    #[serde(rename = "inlineData")]
    pub inline_data: Option<InlineData>,
}

#[derive(Debug, Deserialize)]
pub struct InlineData {
    #[serde(rename = "mimeType", default)]
    pub mime_type: String,
    #[serde(default)]
    pub data: String,
}

impl GenerateContentResponse {
    /// Concatenated text of the first candidate's parts, or `None` when
    /// the response carries no text at all.
    pub fn first_text(&self) -> Option<String> {
        let content = self.candidates.first()?.content.as_ref()?;
        let text: String = content
            .parts
            .iter()
            .filter_map(|p| p.text.as_deref())
            .collect();
        if text.is_empty() {
            None
        } else {
            Some(text)
        }
    }

    /// The first non-empty inline image payload of the first candidate,
    /// wrapped as a PNG data-URL string.
    pub fn first_inline_image(&self) -> Option<String> {
        let content = self.candidates.first()?.content.as_ref()?;
        content
            .parts
            .iter()
            .filter_map(|p| p.inline_data.as_ref())
            .find(|d| !d.data.is_empty())
            .map(|d| format!("data:image/png;base64,{}", d.data))
    }
}

// ---------------------------------------------------------------------------
// Long-running video operation
// ---------------------------------------------------------------------------

/// Handle plus state of a long-running video operation.
#[derive(Debug, Deserialize)]
pub struct VideoOperation {
    /// Server-assigned operation name, used for the poll endpoint.
    pub name: String,
    #[serde(default)]
    pub done: bool,
    pub error: Option<OperationError>,
    pub response: Option<VideoOperationResponse>,
}

#[derive(Debug, Deserialize)]
pub struct OperationError {
    pub message: Option<String>,
    pub code: Option<i32>,
}

#[derive(Debug, Deserialize)]
pub struct VideoOperationResponse {
    #[serde(rename = "generatedVideos", default)]
    pub generated_videos: Vec<GeneratedVideo>,
}

#[derive(Debug, Deserialize)]
pub struct GeneratedVideo {
    pub video: Option<VideoRef>,
}

#[derive(Debug, Deserialize)]
pub struct VideoRef {
    pub uri: Option<String>,
}

impl VideoOperation {
    /// Result asset URI of a completed operation, if any.
    pub fn video_uri(&self) -> Option<&str> {
        self.response
            .as_ref()?
            .generated_videos
            .first()?
            .video
            .as_ref()?
            .uri
            .as_deref()
    }
}

/// Append the credential as a query parameter, respecting an existing
/// query string.
pub fn append_key_param(uri: &str, key: &str) -> String {
    let sep = if uri.contains('?') { '&' } else { '?' };
    format!("{uri}{sep}key={key}")
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
