use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

use super::error::PipelineError;

pub const PROCESSED_PREFIX: &str = "processed-";

/// One raw video object to process. Decoded from a storage notification,
/// which names the object in its `name` field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Validate, ToSchema)]
pub struct JobDescriptor {
    #[serde(rename = "name", alias = "objectName")]
    #[validate(length(min = 1, message = "object name must not be empty"))]
    pub object_name: String,
}

impl JobDescriptor {
    pub fn new(object_name: impl Into<String>) -> Result<Self, PipelineError> {
        let job = Self {
            object_name: object_name.into(),
        };
        job.validate()
            .map_err(|e| PipelineError::Validation(describe(&e)))?;
        Ok(job)
    }

    pub fn from_payload(payload: &[u8]) -> Result<Self, PipelineError> {
        let job: Self = serde_json::from_slice(payload)
            .map_err(|e| PipelineError::Validation(format!("malformed job payload: {}", e)))?;
        job.validate()
            .map_err(|e| PipelineError::Validation(describe(&e)))?;
        Ok(job)
    }

    pub fn output_object_name(&self) -> String {
        format!("{}{}", PROCESSED_PREFIX, self.object_name)
    }
}

fn describe(errors: &validator::ValidationErrors) -> String {
    errors
        .field_errors()
        .values()
        .flat_map(|errs| errs.iter())
        .map(|e| {
            e.message
                .as_ref()
                .map(|m| m.to_string())
                .unwrap_or_else(|| e.code.to_string())
        })
        .collect::<Vec<_>>()
        .join(", ")
}
