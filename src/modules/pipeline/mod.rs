use axum::Router;
use axum::routing::post;
use crate::state::AppState;

pub mod dto;
pub mod error;
pub mod gateway;
pub mod handler;
pub mod job;
pub mod service;
pub mod transcoder;

pub fn router() -> Router<AppState> {
    Router::new().route("/process-video", post(handler::process_video))
}
