//! Long-running video render operation.
//!
//! The initial call returns an operation handle; the gateway polls it on a
//! fixed interval until the backend reports completion or an error, then
//! fetches the result asset (credential appended as a query parameter) and
//! materializes it as a local file. The whole sequence runs inside one
//! pipeline task, so a hung backend blocks only that task.

use std::time::Duration;

use serde_json::{json, Value};

use crate::backend::VideoParams;
use crate::client::GeminiClient;
use crate::error::GatewayError;
use crate::wire::{append_key_param, strip_data_url, VideoOperation};

/// Nominal delay between poll attempts.
pub const DEFAULT_POLL_INTERVAL_SECS: u64 = 10;

/// Tunable parameters for operation polling.
#[derive(Debug, Clone)]
pub struct VideoPollConfig {
    /// Delay between poll attempts.
    pub interval: Duration,
}

impl Default for VideoPollConfig {
    fn default() -> Self {
        Self {
            interval: Duration::from_secs(DEFAULT_POLL_INTERVAL_SECS),
        }
    }
}

/// Poll an operation until it settles.
///
/// Sleeps `interval` between attempts, re-fetching the operation by name
/// through `fetch`. Stops as soon as the operation is done or reports an
/// error; an operation error becomes [`GatewayError::OperationFailed`]
/// carrying the backend's message.
pub(crate) async fn drive_operation<F, Fut>(
    mut operation: VideoOperation,
    interval: Duration,
    mut fetch: F,
) -> Result<VideoOperation, GatewayError>
where
    F: FnMut(String) -> Fut,
    Fut: std::future::Future<Output = Result<VideoOperation, GatewayError>>,
{
    while !operation.done {
        tokio::time::sleep(interval).await;
        operation = fetch(operation.name.clone()).await?;
        if operation.error.is_some() {
            break;
        }
    }

    if let Some(error) = operation.error {
        return Err(GatewayError::OperationFailed(
            error.message.unwrap_or_else(|| "Operation failed.".to_string()),
        ));
    }
    Ok(operation)
}

/// Request body for starting the video operation.
pub(crate) fn build_video_body(params: &VideoParams) -> Value {
    let mut instance = json!({ "prompt": params.prompt });
    if let Some(image) = params.reference_image.as_deref() {
        instance["image"] = json!({
            "bytesBase64Encoded": strip_data_url(image),
            "mimeType": "image/jpeg",
        });
    }
    json!({
        "instances": [instance],
        "parameters": {
            "numberOfVideos": 1,
            "resolution": params.resolution.as_str(),
            "aspectRatio": params.aspect_ratio.as_str(),
        },
    })
}

impl GeminiClient {
    /// Drive one video render to completion.
    ///
    /// Returns the local path of the downloaded asset. Fails with
    /// [`GatewayError::OperationFailed`] when the polled operation reports
    /// an error, [`GatewayError::NoVideoReturned`] when a completed
    /// operation lacks a result reference, and
    /// [`GatewayError::DownloadFailed`] when asset retrieval fails.
    pub async fn generate_video_render(
        &self,
        params: &VideoParams,
    ) -> Result<String, GatewayError> {
        let secret = self.resolve_credential()?;

        let operation = self.start_video_operation(params, &secret).await?;
        tracing::info!(operation = %operation.name, "Video operation started");

        let operation = drive_operation(operation, self.poll.interval, |name| {
            self.poll_video_operation(name, &secret)
        })
        .await?;

        let uri = operation.video_uri().ok_or(GatewayError::NoVideoReturned)?;
        self.download_video_asset(uri, &secret).await
    }

    // ---- private helpers ----

    async fn start_video_operation(
        &self,
        params: &VideoParams,
        secret: &str,
    ) -> Result<VideoOperation, GatewayError> {
        let url = format!(
            "{}/models/{}:predictLongRunning",
            self.base_url,
            params.model.model_id()
        );
        let response = self
            .http
            .post(url)
            .header("x-goog-api-key", secret)
            .json(&build_video_body(params))
            .send()
            .await?;
        Self::parse_response(response).await
    }

    async fn poll_video_operation(
        &self,
        name: String,
        secret: &str,
    ) -> Result<VideoOperation, GatewayError> {
        let url = format!("{}/{}", self.base_url, name);
        let response = self
            .http
            .get(url)
            .header("x-goog-api-key", secret)
            .send()
            .await?;
        Self::parse_response(response).await
    }

    /// Fetch the finished asset and write it to a local temp file.
    async fn download_video_asset(
        &self,
        uri: &str,
        secret: &str,
    ) -> Result<String, GatewayError> {
        let url = append_key_param(uri, secret);
        let response = self.http.get(url).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(GatewayError::DownloadFailed(status.as_u16()));
        }

        let bytes = response.bytes().await?;
        let path = std::env::temp_dir().join(format!("cineboard-video-{}.mp4", uuid::Uuid::new_v4()));
        std::fs::write(&path, &bytes)?;

        tracing::info!(bytes = bytes.len(), path = %path.display(), "Video asset downloaded");
        Ok(path.to_string_lossy().into_owned())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
