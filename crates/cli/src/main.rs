//! `cineboard` -- headless storyboard generation driver.
//!
//! Runs one storyboard generation for the topic given as the first
//! argument, follows the pipeline events until every scene settles, and
//! writes the rendered images plus a full state snapshot to the output
//! directory.
//!
//! # Environment variables
//!
//! | Variable         | Required | Default      | Description                          |
//! |------------------|----------|--------------|--------------------------------------|
//! | `GEMINI_API_KEY` | yes      | --           | Backend credential (env fallback path) |
//! | `SCENE_COUNT`    | no       | `10`         | Scenes per storyboard (1-50)         |
//! | `OUTPUT_DIR`     | no       | `storyboard` | Where images and the snapshot land   |

use std::path::Path;
use std::sync::Arc;

use async_trait::async_trait;
use base64::Engine;
use cineboard_core::story::{RenderState, StoryRequest, DEFAULT_SCENE_COUNT};
use cineboard_gateway::GeminiClient;
use cineboard_pipeline::{PipelineEvent, StoryboardController};
use cineboard_session::{CredentialPrompt, MemoryCredentialStore, Session};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Headless credential surface: there is no settings modal to open, so
/// point the operator at the environment variable instead.
struct LogPrompt;

#[async_trait]
impl CredentialPrompt for LogPrompt {
    async fn request_credentials(&self) {
        tracing::error!(
            "No usable credential. Set {} and re-run.",
            cineboard_session::ENV_SECRET_VAR
        );
    }
}

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "cineboard=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let topic = std::env::args().nth(1).unwrap_or_else(|| {
        eprintln!("usage: cineboard <topic>");
        std::process::exit(2);
    });

    let scene_count: u32 = std::env::var("SCENE_COUNT")
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(DEFAULT_SCENE_COUNT);

    let output_dir = std::env::var("OUTPUT_DIR").unwrap_or_else(|_| "storyboard".into());

    let session = Arc::new(Session::from_env(
        Arc::new(MemoryCredentialStore::new()),
        None,
    ));
    // Headless runs have no settings surface; engage the environment
    // credential path directly.
    session.activate();

    let backend = Arc::new(GeminiClient::new(session.clone()));
    let controller = StoryboardController::new(backend, session, Arc::new(LogPrompt));

    tracing::info!(topic = %topic, scene_count, "Starting storyboard generation");

    let mut events = controller.subscribe();
    let request = StoryRequest::new(&topic).with_scene_count(scene_count);
    if let Err(e) = controller.generate_storyboard(request).await {
        tracing::error!(error = %e, "Story generation failed");
        std::process::exit(1);
    }

    let total = controller.snapshot().await.scenes.len();
    if total == 0 {
        // The gate declined (unauthorized session); LogPrompt already
        // said why.
        std::process::exit(1);
    }

    // Follow the fan-out until every scene settles.
    while controller.snapshot().await.settled_scenes() < total {
        match events.recv().await {
            Ok(PipelineEvent::SceneRendered { index, .. }) => {
                tracing::info!(scene = index + 1, "Scene rendered");
            }
            Ok(PipelineEvent::SceneFailed { index, error, .. }) => {
                tracing::warn!(scene = index + 1, error = %error, "Scene failed");
            }
            Ok(_) => {}
            Err(e) => {
                tracing::error!(error = %e, "Event stream closed");
                break;
            }
        }
    }

    let state = controller.snapshot().await;
    if let Err(e) = write_outputs(Path::new(&output_dir), &state) {
        tracing::error!(error = %e, "Failed to write outputs");
        std::process::exit(1);
    }

    let ready = state
        .scenes
        .iter()
        .filter(|s| s.render == RenderState::Ready)
        .count();
    tracing::info!(
        ready,
        failed = total - ready,
        titles = state.titles.len(),
        output_dir = %output_dir,
        "Storyboard complete",
    );
}

/// Write rendered scene images and the full state snapshot.
fn write_outputs(
    dir: &Path,
    state: &cineboard_pipeline::StoryboardState,
) -> std::io::Result<()> {
    std::fs::create_dir_all(dir)?;

    for scene in &state.scenes {
        let Some(data_url) = scene.image_data.as_deref() else {
            continue;
        };
        let payload = data_url.split_once(',').map_or(data_url, |(_, rest)| rest);
        match base64::engine::general_purpose::STANDARD.decode(payload) {
            Ok(bytes) => {
                let path = dir.join(format!("scene-{:02}.png", scene.scene_number));
                std::fs::write(path, bytes)?;
            }
            Err(e) => {
                tracing::warn!(scene = scene.scene_number, error = %e, "Undecodable image payload");
            }
        }
    }

    let snapshot = serde_json::to_vec_pretty(state).expect("state serializes");
    std::fs::write(dir.join("storyboard.json"), snapshot)?;
    Ok(())
}
