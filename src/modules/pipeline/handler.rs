use axum::{body::Bytes, extract::State, http::StatusCode, response::IntoResponse};
use tracing::{info, warn};

use super::dto::{ProcessedVideoResponse, unwrap_payload};
use super::job::JobDescriptor;
use super::service::PipelineOutcome;
use crate::common::response::{ApiError, ApiResponse, ApiSuccess};
use crate::state::AppState;

/// Process an uploaded raw video
///
/// Accepts a push envelope whose base64 `data` is a storage notification, or
/// the notification JSON itself.
#[utoipa::path(
    post,
    path = "/process-video",
    request_body = super::dto::PushEnvelope,
    responses(
        (status = 200, description = "Video transcoded and published", body = ApiResponse<ProcessedVideoResponse>),
        (status = 400, description = "Bad Request"),
        (status = 500, description = "Internal Server Error")
    ),
    tag = "Processing"
)]
pub async fn process_video(State(state): State<AppState>, body: Bytes) -> impl IntoResponse {
    info!("📦 Received processing request");

    let job = match unwrap_payload(&body).and_then(|payload| JobDescriptor::from_payload(&payload)) {
        Ok(job) => job,
        Err(e) => {
            warn!("Rejected job: {}", e);
            return ApiError::bad_request(e).into_response();
        }
    };

    // Detached so a client disconnect cannot abandon the job before cleanup.
    match state.pipeline.clone().run_detached(job.clone()).await {
        PipelineOutcome::Completed => ApiSuccess(
            ApiResponse::success(
                ProcessedVideoResponse::from(&job),
                "Video processing finished successfully.",
            ),
            StatusCode::OK,
        )
        .into_response(),
        PipelineOutcome::Rejected(reason) => ApiError::bad_request(reason).into_response(),
        PipelineOutcome::Failed(reason) => ApiError::internal(reason).into_response(),
    }
}
