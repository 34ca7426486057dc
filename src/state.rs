use std::sync::Arc;

use crate::modules::pipeline::service::PipelineService;

#[derive(Clone)]
pub struct AppState {
    pub pipeline: Arc<PipelineService>,
}

impl AppState {
    pub fn new(pipeline: PipelineService) -> Self {
        Self {
            pipeline: Arc::new(pipeline),
        }
    }
}
