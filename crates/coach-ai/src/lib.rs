//! Core engine for the VIP business-coaching platform: the diagnosis survey,
//! the six-axis health index, and the gated quest progression built on top of
//! both. HTTP and CLI surfaces live in the `coach-ai-api` service crate.

pub mod config;
pub mod error;
pub mod telemetry;
pub mod workflows;
