use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use utoipa::ToSchema;

#[derive(Serialize, ToSchema)]
pub struct ApiResponse<T> {
    pub status: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
}

impl<T> ApiResponse<T>
where
    T: Serialize,
{
    pub fn success(data: T, message: &str) -> Self {
        Self {
            status: "success".to_string(),
            message: message.to_string(),
            data: Some(data),
        }
    }
}

pub struct ApiSuccess<T>(pub T, pub StatusCode);

impl<T> IntoResponse for ApiSuccess<ApiResponse<T>>
where
    T: Serialize,
{
    fn into_response(self) -> Response {
        (self.1, Json(self.0)).into_response()
    }
}

/// Error body with the status code the front door maps a job outcome to.
pub struct ApiError(pub String, pub StatusCode);

impl ApiError {
    /// Caller fault. Nothing was processed.
    pub fn bad_request(reason: impl std::fmt::Display) -> Self {
        Self(format!("Bad Request: {}", reason), StatusCode::BAD_REQUEST)
    }

    /// Processing fault after the job was accepted.
    pub fn internal(reason: impl std::fmt::Display) -> Self {
        Self(
            format!("Internal Server Error: {}", reason),
            StatusCode::INTERNAL_SERVER_ERROR,
        )
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (message, status) = (self.0, self.1);
        let response = ApiResponse::<()> {
            status: "error".to_string(),
            message,
            data: None,
        };
        (status, Json(response)).into_response()
    }
}
