//! Menagerie introspection endpoint.
//!
//! A passive, read-only HTTP surface over the probe counters. It never
//! touches the animals; it only reads atomics the driver's behaviors write.

#![forbid(unsafe_code)]
#![forbid(clippy::unwrap_used)]
#![forbid(clippy::panic)]
#![deny(clippy::expect_used)]

use axum::{Router, routing::get};
use menagerie_core::Probes;
use std::sync::Arc;
use tower_http::trace::TraceLayer;

mod error;
pub mod memory;
pub mod profiles;
pub mod routes;
mod server;

pub use error::{IntrospectError, ProblemDetails, Result};
pub use memory::{MemoryError, ProcessMemory};
pub use server::{bind, serve};

/// State shared by every handler: read-only access to the probes.
#[derive(Debug, Clone)]
pub struct IntrospectState {
    probes: Arc<Probes>,
}

impl IntrospectState {
    #[must_use]
    pub const fn new(probes: Arc<Probes>) -> Self {
        Self { probes }
    }
}

/// Create the introspection router.
pub fn create_router(probes: Arc<Probes>) -> Router {
    Router::new()
        .route("/health", get(routes::health))
        .route("/debug/probes", get(routes::index))
        .route("/debug/probes/", get(routes::index))
        .route("/debug/probes/cpu", get(routes::cpu))
        .route("/debug/probes/heap", get(routes::heap))
        .route("/debug/probes/tasks", get(routes::tasks))
        .route("/debug/probes/mutex", get(routes::mutex))
        .route("/debug/probes/block", get(routes::block))
        .route("/debug/probes/lifecycle", get(routes::lifecycle))
        .fallback(routes::not_found)
        .layer(TraceLayer::new_for_http())
        .with_state(IntrospectState::new(probes))
}
