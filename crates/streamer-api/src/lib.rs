//! Streamer HTTP gateway
//!
//! Turns multipart uploads into framed upload streams for the ingestion pipeline.

pub mod error;
pub mod handlers;
pub mod setup;
pub mod state;
pub mod telemetry;
