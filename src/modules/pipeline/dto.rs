use base64::{Engine as _, engine::general_purpose::STANDARD};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::error::PipelineError;
use super::job::JobDescriptor;

/// Push-subscription envelope wrapping a storage notification.
#[derive(Debug, Deserialize, ToSchema)]
pub struct PushEnvelope {
    pub message: PushMessage,
    pub subscription: Option<String>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct PushMessage {
    /// Base64 encoded JSON job, e.g. `{"name": "clip.mp4"}`.
    pub data: String,
    #[serde(rename = "messageId", alias = "message_id")]
    pub message_id: Option<String>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ProcessedVideoResponse {
    pub object_name: String,
    pub output_object_name: String,
}

impl From<&JobDescriptor> for ProcessedVideoResponse {
    fn from(job: &JobDescriptor) -> Self {
        Self {
            object_name: job.object_name.clone(),
            output_object_name: job.output_object_name(),
        }
    }
}

/// Extracts the job payload from a request body. Bodies that are not an
/// envelope are treated as the job itself.
pub fn unwrap_payload(body: &[u8]) -> Result<Vec<u8>, PipelineError> {
    match serde_json::from_slice::<PushEnvelope>(body) {
        Ok(envelope) => STANDARD
            .decode(envelope.message.data.trim())
            .map_err(|e| PipelineError::Validation(format!("message data is not base64: {}", e))),
        Err(_) => Ok(body.to_vec()),
    }
}
