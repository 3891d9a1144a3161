//! Handlers for the read-only probe routes.
//!
//! - `GET /health` - liveness
//! - `GET /debug/probes/` - profile index
//! - `GET /debug/probes/cpu?seconds=N` - busy time over a window
//! - `GET /debug/probes/heap` - allocations and process memory
//! - `GET /debug/probes/tasks` - detached helper tasks
//! - `GET /debug/probes/mutex` - lock contention
//! - `GET /debug/probes/block` - blocking waits
//! - `GET /debug/probes/lifecycle` - cycles and lives per animal
//!
//! Anything else gets a 404 problem document.

use axum::{
    Json,
    extract::{Query, State, rejection::QueryRejection},
    http::Uri,
};
use serde::Deserialize;
use std::time::Duration;

use crate::IntrospectState;
use crate::error::{IntrospectError, Result};
use crate::memory::ProcessMemory;
use crate::profiles::{
    BlockProfile, CpuProfile, HeapProfile, IndexResponse, LifecycleProfile, MutexProfile,
    TaskProfile,
};

pub const DEFAULT_CPU_WINDOW_SECS: u64 = 5;
pub const MIN_CPU_WINDOW_SECS: u64 = 1;
pub const MAX_CPU_WINDOW_SECS: u64 = 60;

#[derive(Debug, Deserialize)]
pub struct CpuQuery {
    seconds: Option<u64>,
}

pub async fn health() -> &'static str {
    "OK"
}

pub async fn index(State(state): State<IntrospectState>) -> Json<IndexResponse> {
    Json(IndexResponse::from_snapshot(&state.probes.snapshot()))
}

/// Sleeps through the window, then reports busy time gained during it.
pub async fn cpu(
    State(state): State<IntrospectState>,
    query: std::result::Result<Query<CpuQuery>, QueryRejection>,
) -> Result<Json<CpuProfile>> {
    let Query(query) =
        query.map_err(|rejection| IntrospectError::InvalidQuery(rejection.body_text()))?;
    let seconds = query.seconds.unwrap_or(DEFAULT_CPU_WINDOW_SECS);
    if !(MIN_CPU_WINDOW_SECS..=MAX_CPU_WINDOW_SECS).contains(&seconds) {
        return Err(IntrospectError::InvalidWindow {
            got: seconds,
            min: MIN_CPU_WINDOW_SECS,
            max: MAX_CPU_WINDOW_SECS,
        });
    }

    let window = Duration::from_secs(seconds);
    let before = state.probes.snapshot();
    tokio::time::sleep(window).await;
    let after = state.probes.snapshot();

    Ok(Json(CpuProfile::between(&before, &after, window)))
}

pub async fn heap(State(state): State<IntrospectState>) -> Json<HeapProfile> {
    let process = ProcessMemory::read_self()
        .inspect_err(|e| tracing::debug!(error = %e, "process memory unavailable"))
        .ok();
    Json(HeapProfile::from_snapshot(&state.probes.snapshot(), process))
}

pub async fn tasks(State(state): State<IntrospectState>) -> Json<TaskProfile> {
    Json(TaskProfile::from_snapshot(&state.probes.snapshot()))
}

pub async fn mutex(State(state): State<IntrospectState>) -> Json<MutexProfile> {
    Json(MutexProfile::from_snapshot(&state.probes.snapshot()))
}

pub async fn block(State(state): State<IntrospectState>) -> Json<BlockProfile> {
    Json(BlockProfile::from_snapshot(&state.probes.snapshot()))
}

pub async fn lifecycle(State(state): State<IntrospectState>) -> Json<LifecycleProfile> {
    Json(LifecycleProfile::from_snapshot(&state.probes.snapshot()))
}

pub async fn not_found(uri: Uri) -> IntrospectError {
    IntrospectError::NotFound(uri.path().to_string())
}
