//! Structure and title operations.
//!
//! The structure call is the single request that produces the whole
//! storyboard: scene list, title suggestions, music prompt, and lyrics.
//! It pins the backend to a structured-output schema demanding exactly
//! the requested number of scenes, then applies the deterministic prompt
//! shaping from [`cineboard_core::prompts`] to every scene -- once, here,
//! and nowhere else.

use cineboard_core::prompts;
use cineboard_core::story::{Scene, StoryRequest, StoryStructure, TitlePair};
use serde::Deserialize;
use serde_json::{json, Value};

use crate::client::GeminiClient;
use crate::error::GatewayError;
use crate::wire::content_parts;

/// Model used for the structure call.
pub const STORY_MODEL_ID: &str = "gemini-3-pro-preview";

/// Model used for standalone title regeneration.
pub const TITLES_MODEL_ID: &str = "gemini-3-flash-preview";

/// Sampling temperature for the structure call.
const STORY_TEMPERATURE: f64 = 0.7;

// ---------------------------------------------------------------------------
// Request shaping
// ---------------------------------------------------------------------------

/// Structured-output schema for the structure call.
///
/// The scene array's description names the exact count; the per-scene
/// required fields make every scene installable without defaulting.
pub(crate) fn story_schema(scene_count: u32) -> Value {
    json!({
        "type": "OBJECT",
        "properties": {
            "scenes": {
                "type": "ARRAY",
                "description": format!("Exactly {scene_count} narrative scenes."),
                "items": {
                    "type": "OBJECT",
                    "properties": {
                        "sceneNumber": { "type": "INTEGER" },
                        "description": { "type": "STRING" },
                        "imagePrompt": { "type": "STRING" },
                        "i2vPrompt": { "type": "STRING" },
                    },
                    "required": ["sceneNumber", "description", "imagePrompt", "i2vPrompt"],
                },
            },
            "titles": {
                "type": "ARRAY",
                "items": {
                    "type": "OBJECT",
                    "properties": {
                        "english": { "type": "STRING" },
                        "korean": { "type": "STRING" },
                    },
                    "required": ["english", "korean"],
                },
            },
            "musicPrompt": { "type": "STRING" },
            "lyrics": { "type": "STRING" },
        },
        "required": ["scenes", "titles", "musicPrompt", "lyrics"],
    })
}

fn system_instruction(scene_count: u32) -> String {
    format!(
        "You are an expert storyboard director and a seasoned music producer.\n\
         Create a compelling story in exactly {scene_count} scenes.\n\
         \n\
         Guidelines:\n\
         1. 'description': scene summary in Korean.\n\
         2. 'imagePrompt': visual details in English. Preserve subjects from reference images exactly.\n\
         3. 'i2vPrompt': technical camera motion in English. ALWAYS end with: \"There is no slow motion, and the scene unfolds quickly.\"\n\
         4. 'musicPrompt': a detailed chart-ready music prompt in English.\n\
         5. 'lyrics': full song lyrics with structure markers [Verse 1], [Chorus], etc."
    )
}

/// Full request body for the structure call.
pub(crate) fn build_story_body(request: &StoryRequest) -> Value {
    let parts = content_parts(
        request.reference_image.as_deref(),
        &format!(
            "Analyze this topic and create a story+music production: {}",
            request.topic
        ),
    );
    json!({
        "contents": [{ "parts": parts }],
        "systemInstruction": { "parts": [{ "text": system_instruction(request.scene_count) }] },
        "generationConfig": {
            "responseMimeType": "application/json",
            "responseSchema": story_schema(request.scene_count),
            "temperature": STORY_TEMPERATURE,
        },
    })
}

fn titles_schema() -> Value {
    json!({
        "type": "OBJECT",
        "properties": {
            "titles": {
                "type": "ARRAY",
                "items": {
                    "type": "OBJECT",
                    "properties": {
                        "english": { "type": "STRING" },
                        "korean": { "type": "STRING" },
                    },
                    "required": ["english", "korean"],
                },
            },
        },
        "required": ["titles"],
    })
}

// ---------------------------------------------------------------------------
// Response unwrapping
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
struct StoryPayload {
    scenes: Vec<ScenePayload>,
    #[serde(default)]
    titles: Vec<TitlePair>,
    #[serde(rename = "musicPrompt", default)]
    music_prompt: String,
    #[serde(default)]
    lyrics: String,
}

#[derive(Debug, Deserialize)]
struct ScenePayload {
    #[serde(rename = "sceneNumber")]
    scene_number: i32,
    description: String,
    #[serde(rename = "imagePrompt")]
    image_prompt: String,
    #[serde(rename = "i2vPrompt")]
    i2v_prompt: String,
}

#[derive(Debug, Deserialize)]
struct TitlesPayload {
    #[serde(default)]
    titles: Vec<TitlePair>,
}

/// Parse the structure call's JSON text and apply prompt shaping.
pub(crate) fn unwrap_story_payload(text: &str) -> Result<StoryStructure, GatewayError> {
    let payload: StoryPayload = serde_json::from_str(text)?;
    let scenes = payload
        .scenes
        .into_iter()
        .map(|s| {
            Scene::new(
                s.scene_number,
                s.description,
                prompts::shape_image_prompt(&s.image_prompt),
                prompts::shape_i2v_prompt(&s.i2v_prompt),
            )
        })
        .collect();
    Ok(StoryStructure {
        scenes,
        titles: payload.titles,
        music_prompt: payload.music_prompt,
        lyrics: payload.lyrics,
    })
}

// ---------------------------------------------------------------------------
// Operations
// ---------------------------------------------------------------------------

impl GeminiClient {
    /// Issue the structure call.
    pub async fn generate_story_structure(
        &self,
        request: &StoryRequest,
    ) -> Result<StoryStructure, GatewayError> {
        let secret = self.resolve_credential()?;
        let body = build_story_body(request);

        let response = self
            .post_generate_content(STORY_MODEL_ID, &secret, &body)
            .await?;
        let text = response.first_text().ok_or(GatewayError::EmptyResponse)?;
        let structure = unwrap_story_payload(&text)?;

        tracing::info!(
            scenes = structure.scenes.len(),
            titles = structure.titles.len(),
            "Story structure generated",
        );
        Ok(structure)
    }

    /// Regenerate title suggestions for a topic.
    ///
    /// An empty backend response yields an empty set rather than an error.
    pub async fn generate_title_set(&self, topic: &str) -> Result<Vec<TitlePair>, GatewayError> {
        let secret = self.resolve_credential()?;
        let body = json!({
            "contents": [{ "parts": [{
                "text": format!("Generate 10 viral YouTube titles for: \"{topic}\" as JSON."),
            }] }],
            "generationConfig": {
                "responseMimeType": "application/json",
                "responseSchema": titles_schema(),
            },
        });

        let response = self
            .post_generate_content(TITLES_MODEL_ID, &secret, &body)
            .await?;
        match response.first_text() {
            Some(text) => {
                let payload: TitlesPayload = serde_json::from_str(&text)?;
                Ok(payload.titles)
            }
            None => Ok(Vec::new()),
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
