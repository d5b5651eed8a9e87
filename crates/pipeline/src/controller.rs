//! The storyboard controller.
//!
//! Owns the shared [`StoryboardState`], the backend seam, and the session,
//! and exposes the user-facing triggers: story generation, per-scene
//! retry, video render (with retry), title regeneration, and the
//! credential-settings surface.
//!
//! Concurrency model: the structure call strictly precedes the image
//! fan-out (the prompts come from its output); the N image calls are
//! spawned as independent tasks with no ordering between them, each
//! writing only its own scene index; the video job is its own task
//! sharing nothing but the session. Completions carry the generation
//! token (scenes) or job id (video) captured at dispatch and are
//! discarded when the state has been superseded.

use std::sync::Arc;

use cineboard_core::error::CoreError;
use cineboard_core::models::RenderSettings;
use cineboard_core::story::{ProductionAssets, StoryRequest};
use cineboard_core::video::{VideoJob, VideoJobState};
use cineboard_gateway::{GatewayError, ImageParams, StoryboardBackend, VideoParams};
use cineboard_session::{fault, CredentialPrompt, Session, SessionFault};
use tokio::sync::{broadcast, RwLock};
use tokio_util::sync::CancellationToken;
use uuid::Uuid;

use crate::events::PipelineEvent;
use crate::state::StoryboardState;

/// Broadcast channel capacity for pipeline events.
const EVENT_CHANNEL_CAPACITY: usize = 256;

/// Short user-facing label for a failed fan-out render.
const RENDER_ERROR_LABEL: &str = "Render Error";

/// Short user-facing label for a failed retry render.
const RETRY_ERROR_LABEL: &str = "Retry Failed";

/// Errors surfaced by controller operations.
#[derive(Debug, thiserror::Error)]
pub enum PipelineError {
    #[error(transparent)]
    Gateway(#[from] GatewayError),

    #[error(transparent)]
    Invalid(#[from] CoreError),
}

/// Orchestrates storyboard generation against one backend and session.
///
/// Created once via [`StoryboardController::new`]; the returned `Arc` is
/// cheap to clone into whatever surface drives it.
pub struct StoryboardController {
    state: Arc<RwLock<StoryboardState>>,
    backend: Arc<dyn StoryboardBackend>,
    session: Arc<Session>,
    prompt: Arc<dyn CredentialPrompt>,
    settings: RwLock<RenderSettings>,
    event_tx: broadcast::Sender<PipelineEvent>,
    /// Master cancellation token -- cancelled during shutdown.
    cancel: CancellationToken,
}

impl StoryboardController {
    pub fn new(
        backend: Arc<dyn StoryboardBackend>,
        session: Arc<Session>,
        prompt: Arc<dyn CredentialPrompt>,
    ) -> Arc<Self> {
        let (event_tx, _) = broadcast::channel(EVENT_CHANNEL_CAPACITY);
        Arc::new(Self {
            state: Arc::new(RwLock::new(StoryboardState::default())),
            backend,
            session,
            prompt,
            settings: RwLock::new(RenderSettings::default()),
            event_tx,
            cancel: CancellationToken::new(),
        })
    }

    /// Subscribe to pipeline events.
    pub fn subscribe(&self) -> broadcast::Receiver<PipelineEvent> {
        self.event_tx.subscribe()
    }

    /// Clone of the current state.
    pub async fn snapshot(&self) -> StoryboardState {
        self.state.read().await.clone()
    }

    pub async fn render_settings(&self) -> RenderSettings {
        *self.settings.read().await
    }

    pub async fn set_render_settings(&self, settings: RenderSettings) {
        *self.settings.write().await = settings;
    }

    /// Set or clear the reference image used by subsequent dispatches.
    pub async fn set_reference_image(&self, image: Option<String>) {
        self.state.write().await.reference_image = image;
    }

    /// Open the credential-settings surface.
    pub async fn open_credential_settings(&self) {
        self.prompt.request_credentials().await;
    }

    /// Cancel background tasks. In-flight scene completions settle on
    /// their own and are discarded by the generation guard.
    pub fn shutdown(&self) {
        tracing::info!("Shutting down storyboard controller");
        self.cancel.cancel();
    }

    // ------------------------------------------------------------------
    // Story generation
    // ------------------------------------------------------------------

    /// Run one storyboard generation: structure call, then concurrent
    /// image fan-out.
    ///
    /// Returns without error when the gate declines (unauthorized session
    /// or empty topic). A structure failure leaves the state cleared,
    /// re-triggers the credential-acquisition flow, and is returned to
    /// the caller. Fan-out runs in background tasks; follow
    /// [`subscribe`](Self::subscribe) or poll
    /// [`snapshot`](Self::snapshot) for per-scene outcomes.
    pub async fn generate_storyboard(
        self: &Arc<Self>,
        request: StoryRequest,
    ) -> Result<(), PipelineError> {
        if !self.session.ensure_authorized(self.prompt.as_ref()).await {
            return Ok(());
        }
        if request.topic.trim().is_empty() {
            tracing::debug!("Empty topic, skipping generation");
            return Ok(());
        }
        request.validate()?;

        // Clear prior results and claim a fresh generation token. Image
        // completions still in flight from the previous generation will
        // see a stale token and discard themselves.
        let generation = {
            let mut state = self.state.write().await;
            state.generation += 1;
            state.scenes.clear();
            state.titles.clear();
            state.assets = ProductionAssets::default();
            state.reference_image = request.reference_image.clone();
            state.generation
        };

        tracing::info!(generation, topic = %request.topic, scene_count = request.scene_count, "Starting story generation");

        let structure = match self.backend.generate_story(&request).await {
            Ok(structure) => structure,
            Err(e) => {
                tracing::error!(generation, error = %e, "Structure call failed");
                let handled = fault::handle_fault(
                    self.session.as_ref(),
                    self.prompt.as_ref(),
                    &e.to_string(),
                )
                .await;
                if handled == SessionFault::CredentialRevoked {
                    self.emit(PipelineEvent::SessionInvalidated);
                } else {
                    // Any structure failure re-opens the credential
                    // surface; the revoked branch already did.
                    self.prompt.request_credentials().await;
                }
                return Err(e.into());
            }
        };

        // Install atomically: every scene enters Loading, titles and
        // production assets land in the same write.
        let scene_prompts: Vec<String> = {
            let mut state = self.state.write().await;
            if state.generation != generation {
                tracing::debug!(generation, "Generation superseded during structure call");
                return Ok(());
            }
            state.scenes = structure.scenes;
            for scene in &mut state.scenes {
                scene.begin_render();
            }
            state.titles = structure.titles;
            state.assets = ProductionAssets {
                music_prompt: Some(structure.music_prompt),
                lyrics: Some(structure.lyrics),
            };
            state.scenes.iter().map(|s| s.image_prompt.clone()).collect()
        };

        self.emit(PipelineEvent::StructureReady {
            generation,
            scene_count: scene_prompts.len(),
        });

        // Fan-out: one independent task per scene, no ordering between
        // them and no aggregate completion signal.
        let settings = self.render_settings().await;
        let reference_image = request.reference_image;
        for (index, prompt) in scene_prompts.into_iter().enumerate() {
            let this = Arc::clone(self);
            let params = ImageParams {
                model: settings.image_model,
                prompt,
                aspect_ratio: settings.image_aspect_ratio,
                resolution: settings.image_resolution,
                reference_image: reference_image.clone(),
            };
            tokio::spawn(async move {
                this.render_scene(generation, index, params, RENDER_ERROR_LABEL)
                    .await;
            });
        }

        Ok(())
    }

    /// Retry a single scene with a (possibly edited) prompt.
    ///
    /// The prompt is used verbatim -- shaping happened once when the
    /// structure response was unwrapped, and edits must not be
    /// re-shaped. The scene is reset to loading (prior image and error
    /// cleared) before the call, and has settled by the time this
    /// returns. Other scenes are untouched.
    pub async fn retry_scene(self: &Arc<Self>, index: usize, new_prompt: impl Into<String>) {
        if !self.session.ensure_authorized(self.prompt.as_ref()).await {
            return;
        }
        let new_prompt = new_prompt.into();

        let (generation, reference_image) = {
            let mut state = self.state.write().await;
            let Some(scene) = state.scenes.get_mut(index) else {
                tracing::warn!(index, "Retry requested for unknown scene index");
                return;
            };
            scene.image_prompt = new_prompt.clone();
            scene.begin_render();
            (state.generation, state.reference_image.clone())
        };

        let settings = self.render_settings().await;
        let params = ImageParams {
            model: settings.image_model,
            prompt: new_prompt,
            aspect_ratio: settings.image_aspect_ratio,
            resolution: settings.image_resolution,
            reference_image,
        };
        self.render_scene(generation, index, params, RETRY_ERROR_LABEL)
            .await;
    }

    /// Resolve one image call and write the outcome into its scene.
    ///
    /// Writes are guarded by the generation token captured at dispatch;
    /// a completion whose generation was superseded is discarded. Fault
    /// handling still runs for discarded failures -- a revocation signal
    /// is about the session, not the storyboard it arrived with.
    async fn render_scene(
        &self,
        generation: u64,
        index: usize,
        params: ImageParams,
        failure_label: &'static str,
    ) {
        match self.backend.generate_image(&params).await {
            Ok(image) => {
                let mut state = self.state.write().await;
                if state.generation != generation {
                    tracing::debug!(generation, index, "Discarding stale image completion");
                    return;
                }
                if let Some(scene) = state.scenes.get_mut(index) {
                    scene.complete_render(image);
                }
                drop(state);
                self.emit(PipelineEvent::SceneRendered { generation, index });
            }
            Err(e) => {
                let message = e.to_string();
                tracing::warn!(generation, index, error = %message, "Scene render failed");
                let stale = {
                    let mut state = self.state.write().await;
                    if state.generation == generation {
                        if let Some(scene) = state.scenes.get_mut(index) {
                            scene.fail_render(failure_label);
                        }
                        false
                    } else {
                        true
                    }
                };

                let handled =
                    fault::handle_fault(self.session.as_ref(), self.prompt.as_ref(), &message)
                        .await;
                if handled == SessionFault::CredentialRevoked {
                    self.emit(PipelineEvent::SessionInvalidated);
                }
                if !stale {
                    self.emit(PipelineEvent::SceneFailed {
                        generation,
                        index,
                        error: message,
                    });
                }
            }
        }
    }

    // ------------------------------------------------------------------
    // Video job
    // ------------------------------------------------------------------

    /// Start the long-running video render as an independent task.
    ///
    /// Replaces any existing job record wholesale; a completion from the
    /// replaced job is discarded by id. Gated like story generation.
    pub async fn trigger_video(self: &Arc<Self>, topic: &str) {
        if !self.session.ensure_authorized(self.prompt.as_ref()).await {
            return;
        }
        if topic.trim().is_empty() {
            tracing::debug!("Empty topic, skipping video generation");
            return;
        }

        let job = VideoJob::start();
        let job_id = job.id;
        let reference_image = {
            let mut state = self.state.write().await;
            state.video_job = Some(job);
            state.reference_image.clone()
        };
        self.emit(PipelineEvent::VideoStarted { job_id });

        let settings = self.render_settings().await;
        let params = VideoParams {
            model: settings.video_model,
            prompt: topic.to_string(),
            aspect_ratio: settings.video_aspect_ratio,
            resolution: settings.video_resolution,
            reference_image,
        };

        let this = Arc::clone(self);
        let cancel = self.cancel.child_token();
        tokio::spawn(async move {
            this.run_video_job(job_id, params, cancel).await;
        });
    }

    /// Retry the video render, fully discarding the previous job record.
    pub async fn retry_video(self: &Arc<Self>, topic: &str) {
        self.trigger_video(topic).await;
    }

    async fn run_video_job(&self, job_id: Uuid, params: VideoParams, cancel: CancellationToken) {
        tracing::info!(%job_id, "Video job started");
        let result = tokio::select! {
            _ = cancel.cancelled() => {
                tracing::info!(%job_id, "Video job cancelled");
                return;
            }
            result = self.backend.generate_video(&params) => result,
        };

        match result {
            Ok(url) => {
                let mut state = self.state.write().await;
                let current = state.video_job.as_mut().filter(|job| job.id == job_id);
                let Some(job) = current else {
                    tracing::debug!(%job_id, "Discarding superseded video completion");
                    return;
                };
                job.state = VideoJobState::Ready { url: url.clone() };
                drop(state);
                self.emit(PipelineEvent::VideoReady { job_id, url });
            }
            Err(e) => {
                let message = e.to_string();
                tracing::warn!(%job_id, error = %message, "Video job failed");
                let stale = {
                    let mut state = self.state.write().await;
                    match state.video_job.as_mut().filter(|job| job.id == job_id) {
                        Some(job) => {
                            job.state = VideoJobState::Failed {
                                message: message.clone(),
                            };
                            false
                        }
                        None => true,
                    }
                };

                let handled =
                    fault::handle_fault(self.session.as_ref(), self.prompt.as_ref(), &message)
                        .await;
                match handled {
                    SessionFault::CredentialRevoked => {
                        self.emit(PipelineEvent::SessionInvalidated);
                    }
                    SessionFault::CredentialInactive => {
                        // Re-acquisition without forcing deactivation.
                        self.prompt.request_credentials().await;
                    }
                    SessionFault::Other => {}
                }
                if !stale {
                    self.emit(PipelineEvent::VideoFailed { job_id, message });
                }
            }
        }
    }

    // ------------------------------------------------------------------
    // Titles
    // ------------------------------------------------------------------

    /// Regenerate the title set for a topic.
    ///
    /// Replaces the set wholesale on success. Failures leave the existing
    /// titles untouched and are not surfaced; the gateway's own session
    /// gate is the only credential check on this path.
    pub async fn regenerate_titles(&self, topic: &str) {
        match self.backend.generate_titles(topic).await {
            Ok(titles) => {
                let count = titles.len();
                self.state.write().await.titles = titles;
                self.emit(PipelineEvent::TitlesReplaced { count });
            }
            Err(e) => {
                tracing::debug!(error = %e, "Title regeneration failed, keeping existing titles");
            }
        }
    }

    // ---- private helpers ----

    fn emit(&self, event: PipelineEvent) {
        let _ = self.event_tx.send(event);
    }
}
