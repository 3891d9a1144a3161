//! Response bodies for each profile, derived from probe snapshots.

use chrono::{DateTime, Utc};
use menagerie_core::{EntitySnapshot, ProbeSnapshot};
use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::memory::ProcessMemory;

/// One entry in the profile index.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProfileSummary {
    pub name: String,
    pub path: String,
    /// Total recorded events of this kind so far
    pub events: u64,
}

/// Body of `GET /debug/probes/`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IndexResponse {
    pub started_at: DateTime<Utc>,
    pub uptime_secs: u64,
    pub cycles: u64,
    pub animals: Vec<String>,
    pub profiles: Vec<ProfileSummary>,
}

fn total(snapshot: &ProbeSnapshot, counter: impl Fn(&EntitySnapshot) -> u64) -> u64 {
    snapshot
        .all_entities()
        .map(counter)
        .fold(0, u64::saturating_add)
}

impl IndexResponse {
    #[must_use]
    pub fn from_snapshot(snapshot: &ProbeSnapshot) -> Self {
        let profiles = [
            ("cpu", total(snapshot, |e| e.busy_nanos)),
            ("heap", total(snapshot, |e| e.alloc_objects)),
            ("tasks", total(snapshot, |e| e.tasks_spawned)),
            ("mutex", total(snapshot, |e| e.contentions)),
            ("block", total(snapshot, |e| e.block_events)),
            ("lifecycle", total(snapshot, |e| e.lives)),
        ]
        .into_iter()
        .map(|(name, events)| ProfileSummary {
            name: name.to_string(),
            path: format!("/debug/probes/{name}"),
            events,
        })
        .collect();

        Self {
            started_at: snapshot.started_at,
            uptime_secs: snapshot.uptime_secs,
            cycles: snapshot.cycles,
            animals: snapshot.entities.iter().map(|e| e.name.clone()).collect(),
            profiles,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CpuSample {
    pub name: String,
    pub busy_nanos: u64,
    /// Fraction of the window this animal spent busy
    pub busy_share: f64,
}

/// Body of `GET /debug/probes/cpu`: busy time gained over a window.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CpuProfile {
    pub window_secs: u64,
    pub taken_at: DateTime<Utc>,
    pub total_busy_nanos: u64,
    pub entities: Vec<CpuSample>,
}

impl CpuProfile {
    /// Busy time accrued between two snapshots of the same probes.
    #[must_use]
    #[allow(clippy::cast_precision_loss)] // shares are for display
    pub fn between(before: &ProbeSnapshot, after: &ProbeSnapshot, window: Duration) -> Self {
        let window_nanos = window.as_nanos() as f64;
        let entities: Vec<CpuSample> = after
            .all_entities()
            .zip(before.all_entities())
            .map(|(later, earlier)| {
                let busy_nanos = later.busy_nanos.saturating_sub(earlier.busy_nanos);
                CpuSample {
                    name: later.name.clone(),
                    busy_nanos,
                    busy_share: if window_nanos > 0.0 {
                        busy_nanos as f64 / window_nanos
                    } else {
                        0.0
                    },
                }
            })
            .collect();

        Self {
            window_secs: window.as_secs(),
            taken_at: after.taken_at,
            total_busy_nanos: entities
                .iter()
                .map(|s| s.busy_nanos)
                .fold(0, u64::saturating_add),
            entities,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HeapSample {
    pub name: String,
    pub alloc_bytes: u64,
    pub alloc_objects: u64,
    pub retained_bytes: u64,
}

/// Body of `GET /debug/probes/heap`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HeapProfile {
    pub taken_at: DateTime<Utc>,
    pub entities: Vec<HeapSample>,
    /// Absent where `/proc` is unavailable
    pub process: Option<ProcessMemory>,
}

impl HeapProfile {
    #[must_use]
    pub fn from_snapshot(snapshot: &ProbeSnapshot, process: Option<ProcessMemory>) -> Self {
        Self {
            taken_at: snapshot.taken_at,
            entities: snapshot
                .all_entities()
                .map(|e| HeapSample {
                    name: e.name.clone(),
                    alloc_bytes: e.alloc_bytes,
                    alloc_objects: e.alloc_objects,
                    retained_bytes: e.retained_bytes,
                })
                .collect(),
            process,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskSample {
    pub name: String,
    pub spawned: u64,
    pub live: u64,
}

/// Body of `GET /debug/probes/tasks`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskProfile {
    pub taken_at: DateTime<Utc>,
    pub total_live: u64,
    pub entities: Vec<TaskSample>,
}

impl TaskProfile {
    #[must_use]
    pub fn from_snapshot(snapshot: &ProbeSnapshot) -> Self {
        Self {
            taken_at: snapshot.taken_at,
            total_live: total(snapshot, |e| e.tasks_live),
            entities: snapshot
                .all_entities()
                .map(|e| TaskSample {
                    name: e.name.clone(),
                    spawned: e.tasks_spawned,
                    live: e.tasks_live,
                })
                .collect(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContentionSample {
    pub name: String,
    pub contentions: u64,
    pub wait_nanos: u64,
}

/// Body of `GET /debug/probes/mutex`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MutexProfile {
    pub taken_at: DateTime<Utc>,
    pub sampling_fraction: u32,
    pub entities: Vec<ContentionSample>,
}

impl MutexProfile {
    #[must_use]
    pub fn from_snapshot(snapshot: &ProbeSnapshot) -> Self {
        Self {
            taken_at: snapshot.taken_at,
            sampling_fraction: snapshot.sampling.mutex_fraction,
            entities: snapshot
                .all_entities()
                .map(|e| ContentionSample {
                    name: e.name.clone(),
                    contentions: e.contentions,
                    wait_nanos: e.contention_nanos,
                })
                .collect(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BlockSample {
    pub name: String,
    pub events: u64,
    pub blocked_nanos: u64,
}

/// Body of `GET /debug/probes/block`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BlockProfile {
    pub taken_at: DateTime<Utc>,
    pub sampling_rate_nanos: u64,
    pub entities: Vec<BlockSample>,
}

impl BlockProfile {
    #[must_use]
    pub fn from_snapshot(snapshot: &ProbeSnapshot) -> Self {
        Self {
            taken_at: snapshot.taken_at,
            sampling_rate_nanos: snapshot.sampling.block_rate_nanos,
            entities: snapshot
                .all_entities()
                .map(|e| BlockSample {
                    name: e.name.clone(),
                    events: e.block_events,
                    blocked_nanos: e.blocked_nanos,
                })
                .collect(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LifeSample {
    pub name: String,
    pub lives: u64,
}

/// Body of `GET /debug/probes/lifecycle`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LifecycleProfile {
    pub taken_at: DateTime<Utc>,
    pub uptime_secs: u64,
    pub cycles: u64,
    pub entities: Vec<LifeSample>,
}

impl LifecycleProfile {
    #[must_use]
    pub fn from_snapshot(snapshot: &ProbeSnapshot) -> Self {
        Self {
            taken_at: snapshot.taken_at,
            uptime_secs: snapshot.uptime_secs,
            cycles: snapshot.cycles,
            entities: snapshot
                .entities
                .iter()
                .map(|e| LifeSample {
                    name: e.name.clone(),
                    lives: e.lives,
                })
                .collect(),
        }
    }
}
