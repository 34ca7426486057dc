pub mod job_consumer;
