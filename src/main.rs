use anyhow::Context;
use dotenvy::dotenv;
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::EnvFilter;

use video_processing_service::app;
use video_processing_service::config::settings::AppConfig;
use video_processing_service::infrastructure::media::ffmpeg::FfmpegTranscoder;
use video_processing_service::infrastructure::queue::rabbitmq::RabbitMqService;
use video_processing_service::infrastructure::storage::s3::StorageService;
use video_processing_service::infrastructure::workspace::Workspace;
use video_processing_service::modules::pipeline::gateway::StoreGateway;
use video_processing_service::modules::pipeline::service::PipelineService;
use video_processing_service::state::AppState;
use video_processing_service::workers::job_consumer::start_job_consumer;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv().ok();

    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    info!("Starting video processing service...");

    let config = AppConfig::new().context("Missing required environment variable")?;

    let workspace = Workspace::new(&config.local_raw_dir, &config.local_processed_dir);
    workspace
        .ensure()
        .await
        .context("Failed to prepare local staging directories")?;

    let storage = StorageService::new(
        config.s3_endpoint.as_deref(),
        &config.s3_region,
        &config.s3_access_key,
        &config.s3_secret_key,
    );
    let gateway = StoreGateway::new(
        Arc::new(storage),
        config.raw_bucket.clone(),
        config.processed_bucket.clone(),
    );
    let transcoder = FfmpegTranscoder::new(config.ffmpeg_path.clone(), config.transcode_timeout());

    let pipeline = PipelineService::new(workspace, gateway, Arc::new(transcoder));

    if let Some(amqp_url) = config.amqp_url.as_deref() {
        let queue = RabbitMqService::new(amqp_url).await?;
        tokio::spawn(start_job_consumer(
            queue,
            config.job_queue.clone(),
            pipeline.clone(),
        ));
    }

    let app = app::create_app(AppState::new(pipeline));

    let addr = format!("0.0.0.0:{}", config.server_port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;
    info!("Video processing service listening on http://{}", addr);

    axum::serve(listener, app).await?;
    Ok(())
}
