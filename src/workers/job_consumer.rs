use futures_util::StreamExt;
use lapin::message::Delivery;
use lapin::options::{BasicAckOptions, BasicNackOptions};
use std::time::Duration;
use tracing::{error, info, warn};

use crate::infrastructure::queue::rabbitmq::RabbitMqService;
use crate::modules::pipeline::service::{PipelineOutcome, PipelineService};

const CONSUMER_TAG: &str = "video_processing_worker";
const RECONNECT_DELAY: Duration = Duration::from_secs(5);

/// Consumes storage notifications from `queue_name` and runs one job at a time.
pub async fn start_job_consumer(queue: RabbitMqService, queue_name: String, pipeline: PipelineService) {
    info!("🎥 Starting job consumer...");

    loop {
        let mut consumer = match queue.consume(&queue_name, CONSUMER_TAG).await {
            Ok(consumer) => consumer,
            Err(e) => {
                error!("❌ {}", e);
                reconnect(&queue).await;
                continue;
            }
        };

        info!("🎥 Job consumer listening on '{}'", queue_name);

        while let Some(delivery) = consumer.next().await {
            match delivery {
                Ok(delivery) => handle_delivery(&pipeline, delivery).await,
                Err(e) => {
                    error!("Consumer error: {}", e);
                    break;
                }
            }
        }

        warn!("Job consumer stream ended");
        reconnect(&queue).await;
    }
}

async fn reconnect(queue: &RabbitMqService) {
    tokio::time::sleep(RECONNECT_DELAY).await;
    if let Err(e) = queue.reconnect().await {
        error!("❌ {}", e);
    }
}

/// Completed and rejected jobs are acked. Failed jobs are nacked without
/// requeue so the broker's dead-letter policy decides on redelivery.
async fn handle_delivery(pipeline: &PipelineService, delivery: Delivery) {
    info!("📦 Received processing job");

    let outcome = pipeline.handle(&delivery.data).await;

    let settled = if should_ack(&outcome) {
        delivery.ack(BasicAckOptions::default()).await
    } else {
        delivery
            .nack(BasicNackOptions {
                requeue: false,
                ..BasicNackOptions::default()
            })
            .await
    };

    if let Err(e) = settled {
        error!("Failed to settle message: {}", e);
    }
}

fn should_ack(outcome: &PipelineOutcome) -> bool {
    !matches!(outcome, PipelineOutcome::Failed(_))
}
