//! Market Data Service
//!
//! Generates synthetic price ticks and publishes each one to the event
//! stream on a best-effort basis:
//!
//! ```text
//!  GET /tick ──► RequestTracker ──► TickService
//!                                      │
//!                               ┌──────┴──────┐
//!                               │             │
//!                          RandomWalk     Publisher ──► Kafka (fire-and-forget)
//! ```
//!
//! A broken event pipeline never fails or slows a tick request: the
//! publisher connects once, caches the outcome, and sends on a detached task.

pub mod config;
pub mod error;
pub mod kafka;
pub mod publisher;
pub mod routes;
pub mod service;
pub mod walk;
