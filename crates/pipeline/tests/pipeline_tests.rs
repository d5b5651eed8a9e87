//! Behavior tests for the storyboard controller.
//!
//! Drives the pipeline against a scripted mock backend whose per-call
//! outcomes can either resolve immediately or be parked and released by
//! the test in an arbitrary order, which is how the fan-out interleaving
//! and stale-completion guarantees are exercised.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use assert_matches::assert_matches;
use async_trait::async_trait;
use cineboard_core::story::{RenderState, Scene, StoryRequest, StoryStructure, TitlePair};
use cineboard_core::video::VideoJobState;
use cineboard_gateway::{GatewayError, ImageParams, StoryboardBackend, VideoParams};
use cineboard_pipeline::{PipelineError, StoryboardController, StoryboardState};
use cineboard_session::{CredentialPrompt, MemoryCredentialStore, Session};
use tokio::sync::oneshot;

// ---------------------------------------------------------------------------
// Scripted mock backend
// ---------------------------------------------------------------------------

struct PendingImage {
    prompt: String,
    respond: oneshot::Sender<Result<String, GatewayError>>,
}

struct PendingVideo {
    respond: oneshot::Sender<Result<String, GatewayError>>,
}

/// Backend fake with scripted per-call outcomes.
///
/// Immediate mode pops queued results (images default to a success
/// payload when the queue is empty). Deferred mode parks each call on a
/// oneshot so the test controls completion order.
#[derive(Default)]
struct MockBackend {
    story_results: Mutex<VecDeque<Result<StoryStructure, GatewayError>>>,
    title_results: Mutex<VecDeque<Result<Vec<TitlePair>, GatewayError>>>,
    image_results: Mutex<VecDeque<Result<String, GatewayError>>>,
    video_results: Mutex<VecDeque<Result<String, GatewayError>>>,
    defer_images: bool,
    defer_videos: bool,
    pending_images: Mutex<Vec<PendingImage>>,
    pending_videos: Mutex<Vec<PendingVideo>>,
    story_calls: AtomicUsize,
    image_calls: AtomicUsize,
    video_calls: AtomicUsize,
    title_calls: AtomicUsize,
    image_prompts: Mutex<Vec<String>>,
}

impl MockBackend {
    fn new() -> Self {
        Self::default()
    }

    fn deferred_images() -> Self {
        Self {
            defer_images: true,
            ..Self::default()
        }
    }

    fn deferred_videos() -> Self {
        Self {
            defer_videos: true,
            ..Self::default()
        }
    }

    fn push_story(&self, result: Result<StoryStructure, GatewayError>) {
        self.story_results.lock().unwrap().push_back(result);
    }

    fn push_titles(&self, result: Result<Vec<TitlePair>, GatewayError>) {
        self.title_results.lock().unwrap().push_back(result);
    }

    fn push_image(&self, result: Result<String, GatewayError>) {
        self.image_results.lock().unwrap().push_back(result);
    }

    fn push_video(&self, result: Result<String, GatewayError>) {
        self.video_results.lock().unwrap().push_back(result);
    }

    /// Release a parked image call whose prompt contains `needle`.
    fn resolve_image(&self, needle: &str, result: Result<String, GatewayError>) {
        let mut pending = self.pending_images.lock().unwrap();
        let pos = pending
            .iter()
            .position(|p| p.prompt.contains(needle))
            .unwrap_or_else(|| panic!("no pending image call matching {needle:?}"));
        let entry = pending.remove(pos);
        let _ = entry.respond.send(result);
    }

    /// Release the oldest parked video call.
    fn resolve_next_video(&self, result: Result<String, GatewayError>) {
        let entry = self.pending_videos.lock().unwrap().remove(0);
        let _ = entry.respond.send(result);
    }

    fn pending_image_count(&self) -> usize {
        self.pending_images.lock().unwrap().len()
    }

    fn pending_video_count(&self) -> usize {
        self.pending_videos.lock().unwrap().len()
    }
}

#[async_trait]
impl StoryboardBackend for MockBackend {
    async fn generate_story(
        &self,
        _request: &StoryRequest,
    ) -> Result<StoryStructure, GatewayError> {
        self.story_calls.fetch_add(1, Ordering::SeqCst);
        self.story_results
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or(Err(GatewayError::EmptyResponse))
    }

    async fn generate_titles(&self, _topic: &str) -> Result<Vec<TitlePair>, GatewayError> {
        self.title_calls.fetch_add(1, Ordering::SeqCst);
        self.title_results
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or(Ok(Vec::new()))
    }

    async fn generate_image(&self, params: &ImageParams) -> Result<String, GatewayError> {
        let call = self.image_calls.fetch_add(1, Ordering::SeqCst);
        self.image_prompts.lock().unwrap().push(params.prompt.clone());

        if self.defer_images {
            let (tx, rx) = oneshot::channel();
            self.pending_images.lock().unwrap().push(PendingImage {
                prompt: params.prompt.clone(),
                respond: tx,
            });
            return rx.await.unwrap_or(Err(GatewayError::NoImageProduced));
        }

        self.image_results
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Ok(format!("data:image/png;base64,IMG{call}")))
    }

    async fn generate_video(&self, _params: &VideoParams) -> Result<String, GatewayError> {
        self.video_calls.fetch_add(1, Ordering::SeqCst);

        if self.defer_videos {
            let (tx, rx) = oneshot::channel();
            self.pending_videos
                .lock()
                .unwrap()
                .push(PendingVideo { respond: tx });
            return rx.await.unwrap_or(Err(GatewayError::NoVideoReturned));
        }

        self.video_results
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or(Err(GatewayError::NoVideoReturned))
    }
}

// ---------------------------------------------------------------------------
// Fixtures
// ---------------------------------------------------------------------------

struct CountingPrompt {
    calls: AtomicUsize,
}

impl CountingPrompt {
    fn new() -> Self {
        Self {
            calls: AtomicUsize::new(0),
        }
    }

    fn count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl CredentialPrompt for CountingPrompt {
    async fn request_credentials(&self) {
        self.calls.fetch_add(1, Ordering::SeqCst);
    }
}

fn authorized_session() -> Arc<Session> {
    let session = Session::new(Arc::new(MemoryCredentialStore::new()), None, None);
    session.activate();
    session.save_secret("TESTKEY");
    Arc::new(session)
}

fn unauthorized_session() -> Arc<Session> {
    Arc::new(Session::new(
        Arc::new(MemoryCredentialStore::new()),
        None,
        None,
    ))
}

struct Harness {
    controller: Arc<StoryboardController>,
    backend: Arc<MockBackend>,
    session: Arc<Session>,
    prompt: Arc<CountingPrompt>,
}

fn harness(backend: MockBackend, session: Arc<Session>) -> Harness {
    let backend = Arc::new(backend);
    let prompt = Arc::new(CountingPrompt::new());
    let controller =
        StoryboardController::new(backend.clone(), session.clone(), prompt.clone());
    Harness {
        controller,
        backend,
        session,
        prompt,
    }
}

/// A structure-call result with distinct prompts per scene and five
/// title suggestions.
fn structure(prefix: &str, scene_count: usize) -> StoryStructure {
    StoryStructure {
        scenes: (1..=scene_count)
            .map(|i| {
                Scene::new(
                    i as i32,
                    format!("{prefix} scene {i}"),
                    format!("{prefix} prompt {i}"),
                    format!("{prefix} motion {i}"),
                )
            })
            .collect(),
        titles: (1..=5)
            .map(|i| TitlePair {
                english: format!("Title {i}"),
                korean: format!("제목 {i}"),
            })
            .collect(),
        music_prompt: "ambient synth ballad".to_string(),
        lyrics: "[Verse 1] dust and silence".to_string(),
    }
}

fn revoked_error() -> GatewayError {
    GatewayError::Backend {
        status: 400,
        body: "Requested entity was not found.".to_string(),
    }
}

/// Poll the controller snapshot until the predicate holds.
async fn wait_until<F>(controller: &Arc<StoryboardController>, predicate: F)
where
    F: Fn(&StoryboardState) -> bool,
{
    tokio::time::timeout(Duration::from_secs(5), async {
        loop {
            if predicate(&controller.snapshot().await) {
                return;
            }
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
    })
    .await
    .expect("condition not reached within timeout");
}

async fn wait_for_pending_images(backend: &Arc<MockBackend>, count: usize) {
    tokio::time::timeout(Duration::from_secs(5), async {
        while backend.pending_image_count() < count {
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
    })
    .await
    .expect("pending image calls did not arrive");
}

async fn wait_for_pending_videos(backend: &Arc<MockBackend>, count: usize) {
    tokio::time::timeout(Duration::from_secs(5), async {
        while backend.pending_video_count() < count {
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
    })
    .await
    .expect("pending video calls did not arrive");
}

// ---------------------------------------------------------------------------
// Story generation
// ---------------------------------------------------------------------------

#[tokio::test]
async fn authorized_generation_renders_every_scene() {
    let h = harness(MockBackend::new(), authorized_session());
    h.backend.push_story(Ok(structure("astro", 3)));

    h.controller
        .generate_storyboard(StoryRequest::new("a lonely astronaut").with_scene_count(3))
        .await
        .expect("generation starts");

    wait_until(&h.controller, |s| {
        s.scenes.len() == 3 && s.scenes.iter().all(|sc| sc.render == RenderState::Ready)
    })
    .await;

    let state = h.controller.snapshot().await;
    assert_eq!(state.titles.len(), 5);
    assert_eq!(
        state.assets.music_prompt.as_deref(),
        Some("ambient synth ballad")
    );
    assert!(state.assets.lyrics.is_some());
    assert!(state.scenes.iter().all(|sc| sc.image_data.is_some()));

    assert_eq!(h.backend.story_calls.load(Ordering::SeqCst), 1);
    assert_eq!(h.backend.image_calls.load(Ordering::SeqCst), 3);
    assert_eq!(h.prompt.count(), 0);
}

#[tokio::test]
async fn structure_installs_exactly_the_requested_scene_count() {
    for count in [1usize, 10, 50] {
        let h = harness(MockBackend::deferred_images(), authorized_session());
        h.backend.push_story(Ok(structure("bulk", count)));

        h.controller
            .generate_storyboard(StoryRequest::new("topic").with_scene_count(count as u32))
            .await
            .expect("generation starts");
        wait_for_pending_images(&h.backend, count).await;

        let state = h.controller.snapshot().await;
        assert_eq!(state.scenes.len(), count);
        assert!(state.scenes.iter().all(|s| {
            s.render == RenderState::Loading && s.image_data.is_none() && s.error_label.is_none()
        }));
    }
}

#[tokio::test]
async fn event_stream_reports_per_scene_outcomes() {
    let h = harness(MockBackend::new(), authorized_session());
    h.backend.push_story(Ok(structure("story", 2)));
    h.backend
        .push_image(Ok("data:image/png;base64,ONE".to_string()));
    h.backend.push_image(Err(GatewayError::NoImageProduced));

    let mut events = h.controller.subscribe();
    h.controller
        .generate_storyboard(StoryRequest::new("topic").with_scene_count(2))
        .await
        .expect("generation starts");

    let mut saw_structure = false;
    let mut rendered = 0;
    let mut failed = 0;
    while rendered + failed < 2 {
        let event = tokio::time::timeout(Duration::from_secs(5), events.recv())
            .await
            .expect("event arrives")
            .expect("stream open");
        match event {
            cineboard_pipeline::PipelineEvent::StructureReady { scene_count, .. } => {
                assert_eq!(scene_count, 2);
                saw_structure = true;
            }
            cineboard_pipeline::PipelineEvent::SceneRendered { .. } => rendered += 1,
            cineboard_pipeline::PipelineEvent::SceneFailed { .. } => failed += 1,
            _ => {}
        }
    }
    assert!(saw_structure);
    assert_eq!(rendered, 1);
    assert_eq!(failed, 1);
}

#[tokio::test]
async fn unauthorized_generation_makes_no_backend_calls() {
    let h = harness(MockBackend::new(), unauthorized_session());

    h.controller
        .generate_storyboard(StoryRequest::new("a lonely astronaut"))
        .await
        .expect("gated generation is not an error");

    assert_eq!(h.backend.story_calls.load(Ordering::SeqCst), 0);
    assert_eq!(h.backend.image_calls.load(Ordering::SeqCst), 0);
    assert_eq!(h.prompt.count(), 1);
    let state = h.controller.snapshot().await;
    assert!(state.scenes.is_empty());
    assert!(state.titles.is_empty());
}

#[tokio::test]
async fn empty_topic_is_ignored() {
    let h = harness(MockBackend::new(), authorized_session());

    h.controller
        .generate_storyboard(StoryRequest::new("   "))
        .await
        .expect("empty topic is silently ignored");

    assert_eq!(h.backend.story_calls.load(Ordering::SeqCst), 0);
    assert_eq!(h.prompt.count(), 0);
}

#[tokio::test]
async fn out_of_range_scene_count_is_rejected_before_dispatch() {
    let h = harness(MockBackend::new(), authorized_session());

    let result = h
        .controller
        .generate_storyboard(StoryRequest::new("topic").with_scene_count(51))
        .await;

    assert_matches!(result, Err(PipelineError::Invalid(_)));
    assert_eq!(h.backend.story_calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn structure_failure_leaves_state_cleared_and_reprompts() {
    let h = harness(MockBackend::new(), authorized_session());
    h.backend.push_story(Err(GatewayError::Backend {
        status: 500,
        body: "backend exploded".to_string(),
    }));

    let result = h
        .controller
        .generate_storyboard(StoryRequest::new("topic"))
        .await;

    assert_matches!(result, Err(PipelineError::Gateway(_)));
    let state = h.controller.snapshot().await;
    assert!(state.scenes.is_empty());
    assert!(state.titles.is_empty());
    // Re-acquisition is triggered on any structure failure.
    assert_eq!(h.prompt.count(), 1);
    // A non-revocation failure leaves the session alone.
    assert!(h.session.is_authorized().await);
}

#[tokio::test]
async fn structure_revocation_deactivates_and_prompts_exactly_once() {
    let h = harness(MockBackend::new(), authorized_session());
    h.backend.push_story(Err(revoked_error()));

    let result = h
        .controller
        .generate_storyboard(StoryRequest::new("topic"))
        .await;

    assert_matches!(result, Err(PipelineError::Gateway(_)));
    assert!(!h.session.is_authorized().await);
    assert_eq!(h.prompt.count(), 1);
}

// ---------------------------------------------------------------------------
// Fan-out interleaving
// ---------------------------------------------------------------------------

#[tokio::test]
async fn completions_in_arbitrary_order_write_only_their_own_scene() {
    let h = harness(MockBackend::deferred_images(), authorized_session());
    h.backend.push_story(Ok(structure("story", 3)));

    h.controller
        .generate_storyboard(StoryRequest::new("topic").with_scene_count(3))
        .await
        .expect("generation starts");
    wait_for_pending_images(&h.backend, 3).await;

    // Resolve out of dispatch order: scene 3, then scene 1 (failure),
    // then scene 2.
    h.backend
        .resolve_image("prompt 3", Ok("data:image/png;base64,THREE".to_string()));
    h.backend
        .resolve_image("prompt 1", Err(GatewayError::NoImageProduced));
    h.backend
        .resolve_image("prompt 2", Ok("data:image/png;base64,TWO".to_string()));

    wait_until(&h.controller, |s| s.settled_scenes() == 3).await;

    let state = h.controller.snapshot().await;
    assert_eq!(state.scenes[0].render, RenderState::Failed);
    assert_eq!(state.scenes[0].error_label.as_deref(), Some("Render Error"));
    assert_eq!(
        state.scenes[1].image_data.as_deref(),
        Some("data:image/png;base64,TWO")
    );
    assert_eq!(
        state.scenes[2].image_data.as_deref(),
        Some("data:image/png;base64,THREE")
    );
}

#[tokio::test]
async fn stale_completions_from_superseded_generation_are_discarded() {
    let h = harness(MockBackend::deferred_images(), authorized_session());
    h.backend.push_story(Ok(structure("old", 2)));
    h.backend.push_story(Ok(structure("new", 2)));

    h.controller
        .generate_storyboard(StoryRequest::new("first").with_scene_count(2))
        .await
        .expect("first generation starts");
    wait_for_pending_images(&h.backend, 2).await;

    // Supersede while the first generation's renders are still parked.
    h.controller
        .generate_storyboard(StoryRequest::new("second").with_scene_count(2))
        .await
        .expect("second generation starts");
    wait_for_pending_images(&h.backend, 4).await;

    // Resolving the superseded generation must not touch current state.
    h.backend
        .resolve_image("old prompt 1", Ok("data:image/png;base64,STALE".to_string()));
    h.backend
        .resolve_image("old prompt 2", Ok("data:image/png;base64,STALE".to_string()));
    tokio::time::sleep(Duration::from_millis(50)).await;

    let state = h.controller.snapshot().await;
    assert!(state
        .scenes
        .iter()
        .all(|s| s.render == RenderState::Loading && s.image_data.is_none()));

    h.backend
        .resolve_image("new prompt 1", Ok("data:image/png;base64,F1".to_string()));
    h.backend
        .resolve_image("new prompt 2", Ok("data:image/png;base64,F2".to_string()));
    wait_until(&h.controller, |s| s.settled_scenes() == 2).await;

    let state = h.controller.snapshot().await;
    assert_eq!(
        state.scenes[0].image_data.as_deref(),
        Some("data:image/png;base64,F1")
    );
    assert_eq!(
        state.scenes[1].image_data.as_deref(),
        Some("data:image/png;base64,F2")
    );
}

// ---------------------------------------------------------------------------
// Per-scene retry
// ---------------------------------------------------------------------------

#[tokio::test]
async fn retry_carries_the_edited_prompt_verbatim() {
    let h = harness(MockBackend::new(), authorized_session());
    h.backend.push_story(Ok(structure("story", 2)));

    h.controller
        .generate_storyboard(StoryRequest::new("topic").with_scene_count(2))
        .await
        .expect("generation starts");
    wait_until(&h.controller, |s| s.settled_scenes() == 2).await;
    let original_first = h.controller.snapshot().await.scenes[0].image_data.clone();

    // Failed retry: scene settles as Failed with the retry label.
    h.backend.push_image(Err(GatewayError::NoImageProduced));
    h.controller.retry_scene(1, "hand-edited prompt").await;

    let state = h.controller.snapshot().await;
    assert_eq!(state.scenes[1].render, RenderState::Failed);
    assert_eq!(state.scenes[1].error_label.as_deref(), Some("Retry Failed"));
    assert_eq!(state.scenes[1].image_prompt, "hand-edited prompt");
    assert!(state.scenes[1].image_data.is_none());

    // The dispatched prompt is the edit, unshaped.
    let last_prompt = h.backend.image_prompts.lock().unwrap().last().cloned();
    assert_eq!(last_prompt.as_deref(), Some("hand-edited prompt"));

    // Successful retry settles Ready and leaves other scenes untouched.
    h.backend
        .push_image(Ok("data:image/png;base64,RETRIED".to_string()));
    h.controller.retry_scene(1, "second edit").await;

    let state = h.controller.snapshot().await;
    assert_eq!(state.scenes[1].render, RenderState::Ready);
    assert_eq!(
        state.scenes[1].image_data.as_deref(),
        Some("data:image/png;base64,RETRIED")
    );
    assert_eq!(state.scenes[0].image_data, original_first);
}

#[tokio::test]
async fn retry_for_unknown_index_is_ignored() {
    let h = harness(MockBackend::new(), authorized_session());
    h.backend.push_story(Ok(structure("story", 1)));

    h.controller
        .generate_storyboard(StoryRequest::new("topic").with_scene_count(1))
        .await
        .expect("generation starts");
    wait_until(&h.controller, |s| s.settled_scenes() == 1).await;

    let before = h.backend.image_calls.load(Ordering::SeqCst);
    h.controller.retry_scene(9, "whatever").await;
    assert_eq!(h.backend.image_calls.load(Ordering::SeqCst), before);
}

#[tokio::test]
async fn image_revocation_deactivates_session() {
    let h = harness(MockBackend::new(), authorized_session());
    h.backend.push_story(Ok(structure("story", 1)));
    h.backend.push_image(Err(revoked_error()));

    h.controller
        .generate_storyboard(StoryRequest::new("topic").with_scene_count(1))
        .await
        .expect("generation starts");
    wait_until(&h.controller, |s| s.settled_scenes() == 1).await;

    let state = h.controller.snapshot().await;
    assert_eq!(state.scenes[0].render, RenderState::Failed);
    assert!(!h.session.is_authorized().await);
    assert_eq!(h.prompt.count(), 1);
}

// ---------------------------------------------------------------------------
// Video job
// ---------------------------------------------------------------------------

#[tokio::test]
async fn video_job_polls_then_settles_ready() {
    let h = harness(MockBackend::deferred_videos(), authorized_session());

    h.controller.trigger_video("a lonely astronaut").await;
    wait_for_pending_videos(&h.backend, 1).await;

    let state = h.controller.snapshot().await;
    let job = state.video_job.as_ref().expect("job record installed");
    assert_eq!(job.state, VideoJobState::Polling);

    h.backend.resolve_next_video(Ok("/tmp/cineboard-video.mp4".to_string()));
    wait_until(&h.controller, |s| {
        s.video_job.as_ref().is_some_and(|j| j.is_settled())
    })
    .await;

    let state = h.controller.snapshot().await;
    assert_eq!(
        state.video_job.unwrap().state,
        VideoJobState::Ready {
            url: "/tmp/cineboard-video.mp4".to_string()
        }
    );
    assert_eq!(h.backend.video_calls.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn video_failure_records_message_without_touching_session() {
    let h = harness(MockBackend::new(), authorized_session());
    h.backend
        .push_video(Err(GatewayError::OperationFailed("render exploded".to_string())));

    h.controller.trigger_video("topic").await;
    wait_until(&h.controller, |s| {
        s.video_job.as_ref().is_some_and(|j| j.is_settled())
    })
    .await;

    let state = h.controller.snapshot().await;
    assert_matches!(
        &state.video_job.unwrap().state,
        VideoJobState::Failed { message } if message.contains("render exploded")
    );
    assert!(h.session.is_authorized().await);
    assert_eq!(h.prompt.count(), 0);
}

#[tokio::test]
async fn video_missing_credential_prompts_without_deactivation() {
    let h = harness(MockBackend::new(), authorized_session());
    h.backend.push_video(Err(GatewayError::SessionInactive));

    h.controller.trigger_video("topic").await;
    wait_until(&h.controller, |s| {
        s.video_job.as_ref().is_some_and(|j| j.is_settled())
    })
    .await;

    assert_eq!(h.prompt.count(), 1);
    assert!(h.session.is_authorized().await);
}

#[tokio::test]
async fn video_revocation_deactivates_session() {
    let h = harness(MockBackend::new(), authorized_session());
    h.backend.push_video(Err(revoked_error()));

    h.controller.trigger_video("topic").await;
    wait_until(&h.controller, |s| {
        s.video_job.as_ref().is_some_and(|j| j.is_settled())
    })
    .await;

    assert!(!h.session.is_authorized().await);
    assert_eq!(h.prompt.count(), 1);
}

#[tokio::test]
async fn video_retry_discards_the_previous_job() {
    let h = harness(MockBackend::deferred_videos(), authorized_session());

    h.controller.trigger_video("topic").await;
    wait_for_pending_videos(&h.backend, 1).await;
    let first_id = h.controller.snapshot().await.video_job.unwrap().id;

    h.controller.retry_video("topic").await;
    wait_for_pending_videos(&h.backend, 2).await;
    let second_id = h.controller.snapshot().await.video_job.unwrap().id;
    assert_ne!(first_id, second_id);

    // The superseded job's completion must not overwrite the new record.
    h.backend.resolve_next_video(Ok("/tmp/old.mp4".to_string()));
    tokio::time::sleep(Duration::from_millis(50)).await;

    let state = h.controller.snapshot().await;
    let job = state.video_job.as_ref().unwrap();
    assert_eq!(job.id, second_id);
    assert_eq!(job.state, VideoJobState::Polling);

    h.backend.resolve_next_video(Ok("/tmp/new.mp4".to_string()));
    wait_until(&h.controller, |s| {
        s.video_job.as_ref().is_some_and(|j| j.is_settled())
    })
    .await;

    let state = h.controller.snapshot().await;
    assert_eq!(
        state.video_job.unwrap().state,
        VideoJobState::Ready {
            url: "/tmp/new.mp4".to_string()
        }
    );
}

#[tokio::test]
async fn unauthorized_video_trigger_is_gated() {
    let h = harness(MockBackend::new(), unauthorized_session());

    h.controller.trigger_video("topic").await;

    assert_eq!(h.backend.video_calls.load(Ordering::SeqCst), 0);
    assert_eq!(h.prompt.count(), 1);
    assert!(h.controller.snapshot().await.video_job.is_none());
}

// ---------------------------------------------------------------------------
// Titles
// ---------------------------------------------------------------------------

#[tokio::test]
async fn title_regeneration_replaces_the_set_wholesale() {
    let h = harness(MockBackend::new(), authorized_session());
    h.backend.push_titles(Ok(vec![
        TitlePair {
            english: "New One".to_string(),
            korean: "새 제목 하나".to_string(),
        },
        TitlePair {
            english: "New Two".to_string(),
            korean: "새 제목 둘".to_string(),
        },
    ]));

    h.controller.regenerate_titles("topic").await;

    let state = h.controller.snapshot().await;
    assert_eq!(state.titles.len(), 2);
    assert_eq!(state.titles[0].english, "New One");
    assert_eq!(h.backend.title_calls.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn title_regeneration_failure_keeps_existing_titles() {
    let h = harness(MockBackend::new(), authorized_session());
    h.backend.push_titles(Ok(vec![TitlePair {
        english: "Keeper".to_string(),
        korean: "지킴이".to_string(),
    }]));
    h.controller.regenerate_titles("topic").await;

    h.backend.push_titles(Err(GatewayError::Backend {
        status: 500,
        body: "backend exploded".to_string(),
    }));
    h.controller.regenerate_titles("topic").await;

    let state = h.controller.snapshot().await;
    assert_eq!(state.titles.len(), 1);
    assert_eq!(state.titles[0].english, "Keeper");
    assert_eq!(h.prompt.count(), 0);
}
