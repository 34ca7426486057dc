use utoipa::OpenApi;

#[derive(OpenApi)]
#[openapi(
    paths(
        crate::modules::pipeline::handler::process_video,
    ),
    components(
        schemas(
            crate::modules::pipeline::dto::PushEnvelope,
            crate::modules::pipeline::dto::PushMessage,
            crate::modules::pipeline::dto::ProcessedVideoResponse,
            crate::modules::pipeline::job::JobDescriptor,
        )
    ),
    tags(
        (name = "Processing", description = "Raw video transcoding")
    )
)]
pub struct ApiDoc;
