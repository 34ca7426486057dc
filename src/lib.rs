//! Message-triggered video transcoding worker.
//!
//! A job names a raw object in storage. The pipeline downloads it into a
//! local staging directory, scales it to 360p with ffmpeg, publishes the
//! result as `processed-<name>` and removes the staged files on every path.

pub mod app;
pub mod common;
pub mod config;
pub mod docs;
pub mod infrastructure;
pub mod modules;
pub mod routes;
pub mod state;
pub mod workers;
