//! Process-wide probe counters.
//!
//! Behaviors record what they did here, attributed to the animal that did
//! it. Cumulative counters only ever grow; the two gauges (`tasks_live`,
//! `retained_bytes`) move both ways. Membership is fixed at construction so
//! lookups never lock.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, Instant};

use crate::registry::Registry;

/// Name used for events recorded by animals that are not registered.
pub const UNATTRIBUTED: &str = "unattributed";

/// Which contention and blocking events get recorded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Sampling {
    /// Record one in every N lock contentions (0 disables, 1 records all)
    pub mutex_fraction: u32,

    /// Record blocking events at least this many nanoseconds long
    /// (0 disables, 1 records all)
    pub block_rate_nanos: u64,
}

impl Sampling {
    #[must_use]
    pub const fn new(mutex_fraction: u32, block_rate_nanos: u64) -> Self {
        Self {
            mutex_fraction,
            block_rate_nanos,
        }
    }

    /// Sample every contention and every blocking event.
    #[must_use]
    pub const fn record_all() -> Self {
        Self::new(1, 1)
    }

    fn admits_contention(self, sequence: u64) -> bool {
        match sequence.checked_rem(u64::from(self.mutex_fraction)) {
            Some(rem) => rem == 0,
            None => false,
        }
    }

    const fn admits_block(self, blocked_nanos: u64) -> bool {
        self.block_rate_nanos != 0 && blocked_nanos >= self.block_rate_nanos
    }
}

fn nanos(duration: Duration) -> u64 {
    u64::try_from(duration.as_nanos()).unwrap_or(u64::MAX)
}

fn bytes(len: usize) -> u64 {
    u64::try_from(len).unwrap_or(u64::MAX)
}

/// Counters attributed to a single animal.
#[derive(Debug, Default)]
pub struct EntityProbe {
    lives: AtomicU64,
    busy_nanos: AtomicU64,
    alloc_bytes: AtomicU64,
    alloc_objects: AtomicU64,
    retained_bytes: AtomicU64,
    tasks_spawned: AtomicU64,
    tasks_live: AtomicU64,
    contention_seq: AtomicU64,
    contentions: AtomicU64,
    contention_nanos: AtomicU64,
    block_events: AtomicU64,
    blocked_nanos: AtomicU64,
}

impl EntityProbe {
    pub fn record_life(&self) {
        self.lives.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_busy(&self, elapsed: Duration) {
        self.busy_nanos.fetch_add(nanos(elapsed), Ordering::Relaxed);
    }

    pub fn record_alloc(&self, len: usize) {
        self.alloc_bytes.fetch_add(bytes(len), Ordering::Relaxed);
        self.alloc_objects.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_retained(&self, len: usize) {
        self.retained_bytes.fetch_add(bytes(len), Ordering::Relaxed);
    }

    pub fn release_retained(&self, len: usize) {
        let len = bytes(len);
        // Gauge: saturate instead of wrapping if accounting ever drifts.
        let _ = self
            .retained_bytes
            .fetch_update(Ordering::Relaxed, Ordering::Relaxed, |held| {
                Some(held.saturating_sub(len))
            });
    }

    pub fn task_started(&self) {
        self.tasks_spawned.fetch_add(1, Ordering::Relaxed);
        self.tasks_live.fetch_add(1, Ordering::Relaxed);
    }

    pub fn task_finished(&self) {
        let _ = self
            .tasks_live
            .fetch_update(Ordering::Relaxed, Ordering::Relaxed, |live| {
                Some(live.saturating_sub(1))
            });
    }

    /// Record a lock wait, subject to the mutex sampling fraction.
    pub fn record_contention(&self, sampling: Sampling, waited: Duration) {
        let sequence = self.contention_seq.fetch_add(1, Ordering::Relaxed);
        if sampling.admits_contention(sequence) {
            self.contentions.fetch_add(1, Ordering::Relaxed);
            self.contention_nanos
                .fetch_add(nanos(waited), Ordering::Relaxed);
        }
    }

    /// Record a blocking wait, subject to the block sampling rate.
    pub fn record_block(&self, sampling: Sampling, blocked: Duration) {
        let blocked = nanos(blocked);
        if sampling.admits_block(blocked) {
            self.block_events.fetch_add(1, Ordering::Relaxed);
            self.blocked_nanos.fetch_add(blocked, Ordering::Relaxed);
        }
    }

    fn snapshot(&self, name: &str) -> EntitySnapshot {
        EntitySnapshot {
            name: name.to_string(),
            lives: self.lives.load(Ordering::Relaxed),
            busy_nanos: self.busy_nanos.load(Ordering::Relaxed),
            alloc_bytes: self.alloc_bytes.load(Ordering::Relaxed),
            alloc_objects: self.alloc_objects.load(Ordering::Relaxed),
            retained_bytes: self.retained_bytes.load(Ordering::Relaxed),
            tasks_spawned: self.tasks_spawned.load(Ordering::Relaxed),
            tasks_live: self.tasks_live.load(Ordering::Relaxed),
            contentions: self.contentions.load(Ordering::Relaxed),
            contention_nanos: self.contention_nanos.load(Ordering::Relaxed),
            block_events: self.block_events.load(Ordering::Relaxed),
            blocked_nanos: self.blocked_nanos.load(Ordering::Relaxed),
        }
    }
}

/// All probes for a running harness.
#[derive(Debug)]
pub struct Probes {
    entities: Vec<(&'static str, EntityProbe)>,
    unattributed: EntityProbe,
    cycles: AtomicU64,
    sampling: Sampling,
    started: Instant,
    started_at: DateTime<Utc>,
}

impl Probes {
    /// Create probes for a fixed set of animal names, in display order.
    #[must_use]
    pub fn new(names: impl IntoIterator<Item = &'static str>, sampling: Sampling) -> Self {
        Self {
            entities: names
                .into_iter()
                .map(|name| (name, EntityProbe::default()))
                .collect(),
            unattributed: EntityProbe::default(),
            cycles: AtomicU64::new(0),
            sampling,
            started: Instant::now(),
            started_at: Utc::now(),
        }
    }

    /// Create probes for every animal in a registry, in registry order.
    #[must_use]
    pub fn for_registry(registry: &Registry, sampling: Sampling) -> Self {
        Self::new(registry.names(), sampling)
    }

    /// The probe for `name`, or the shared unattributed probe.
    #[must_use]
    pub fn probe(&self, name: &str) -> &EntityProbe {
        self.entities
            .iter()
            .find(|(registered, _)| *registered == name)
            .map_or(&self.unattributed, |(_, probe)| probe)
    }

    pub fn record_cycle(&self) {
        self.cycles.fetch_add(1, Ordering::Relaxed);
    }

    #[must_use]
    pub fn cycles(&self) -> u64 {
        self.cycles.load(Ordering::Relaxed)
    }

    #[must_use]
    pub const fn sampling(&self) -> Sampling {
        self.sampling
    }

    #[must_use]
    pub fn uptime(&self) -> Duration {
        self.started.elapsed()
    }

    /// Point-in-time copy of every counter.
    #[must_use]
    pub fn snapshot(&self) -> ProbeSnapshot {
        ProbeSnapshot {
            taken_at: Utc::now(),
            started_at: self.started_at,
            uptime_secs: self.uptime().as_secs(),
            cycles: self.cycles(),
            sampling: self.sampling,
            entities: self
                .entities
                .iter()
                .map(|(name, probe)| probe.snapshot(name))
                .collect(),
            unattributed: self.unattributed.snapshot(UNATTRIBUTED),
        }
    }
}

/// Serializable copy of one animal's counters.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntitySnapshot {
    pub name: String,
    pub lives: u64,
    pub busy_nanos: u64,
    pub alloc_bytes: u64,
    pub alloc_objects: u64,
    pub retained_bytes: u64,
    pub tasks_spawned: u64,
    pub tasks_live: u64,
    pub contentions: u64,
    pub contention_nanos: u64,
    pub block_events: u64,
    pub blocked_nanos: u64,
}

impl EntitySnapshot {
    /// True when every cumulative counter is at least its value in `earlier`.
    #[must_use]
    pub const fn dominates(&self, earlier: &Self) -> bool {
        self.lives >= earlier.lives
            && self.busy_nanos >= earlier.busy_nanos
            && self.alloc_bytes >= earlier.alloc_bytes
            && self.alloc_objects >= earlier.alloc_objects
            && self.tasks_spawned >= earlier.tasks_spawned
            && self.contentions >= earlier.contentions
            && self.contention_nanos >= earlier.contention_nanos
            && self.block_events >= earlier.block_events
            && self.blocked_nanos >= earlier.blocked_nanos
    }
}

/// Serializable copy of all probes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProbeSnapshot {
    pub taken_at: DateTime<Utc>,
    pub started_at: DateTime<Utc>,
    pub uptime_secs: u64,
    pub cycles: u64,
    pub sampling: Sampling,
    pub entities: Vec<EntitySnapshot>,
    pub unattributed: EntitySnapshot,
}

impl ProbeSnapshot {
    #[must_use]
    pub fn entity(&self, name: &str) -> Option<&EntitySnapshot> {
        self.entities.iter().find(|entity| entity.name == name)
    }

    /// Registered animals followed by the unattributed bucket.
    pub fn all_entities(&self) -> impl Iterator<Item = &EntitySnapshot> {
        self.entities.iter().chain(std::iter::once(&self.unattributed))
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]

    use super::*;

    fn probes() -> Probes {
        Probes::new(["dog", "cat"], Sampling::record_all())
    }

    #[test]
    fn test_snapshot_keeps_registration_order() {
        let snapshot = probes().snapshot();
        let names: Vec<_> = snapshot.entities.iter().map(|e| e.name.as_str()).collect();
        assert_eq!(names, ["dog", "cat"]);
        assert_eq!(snapshot.unattributed.name, UNATTRIBUTED);
    }

    #[test]
    fn test_unknown_name_lands_in_unattributed() {
        let probes = probes();
        probes.probe("ghost").record_life();

        let snapshot = probes.snapshot();
        assert_eq!(snapshot.unattributed.lives, 1);
        assert!(snapshot.entities.iter().all(|e| e.lives == 0));
    }

    #[test]
    fn test_alloc_counts_bytes_and_objects() {
        let probes = probes();
        probes.probe("dog").record_alloc(1024);
        probes.probe("dog").record_alloc(512);

        let snapshot = probes.snapshot();
        let dog = snapshot.entity("dog").unwrap();
        assert_eq!(dog.alloc_bytes, 1536);
        assert_eq!(dog.alloc_objects, 2);
    }

    #[test]
    fn test_retained_gauge_saturates_at_zero() {
        let probes = probes();
        let cat = probes.probe("cat");
        cat.record_retained(100);
        cat.release_retained(40);
        assert_eq!(probes.snapshot().entity("cat").unwrap().retained_bytes, 60);

        cat.release_retained(1_000);
        assert_eq!(probes.snapshot().entity("cat").unwrap().retained_bytes, 0);
    }

    #[test]
    fn test_task_gauge_tracks_live_helpers() {
        let probes = probes();
        let dog = probes.probe("dog");
        dog.task_started();
        dog.task_started();
        dog.task_finished();

        let snapshot = probes.snapshot();
        let dog = snapshot.entity("dog").unwrap();
        assert_eq!(dog.tasks_spawned, 2);
        assert_eq!(dog.tasks_live, 1);
    }

    #[test]
    fn test_mutex_fraction_samples_every_nth_event() {
        let probes = Probes::new(["wolf"], Sampling::new(3, 1));
        let wolf = probes.probe("wolf");
        for _ in 0..7 {
            wolf.record_contention(probes.sampling(), Duration::from_millis(1));
        }

        let snapshot = probes.snapshot();
        let wolf = snapshot.entity("wolf").unwrap();
        // Sequence numbers 0, 3 and 6 are admitted.
        assert_eq!(wolf.contentions, 3);
        assert_eq!(wolf.contention_nanos, 3_000_000);
    }

    #[test]
    fn test_zero_mutex_fraction_disables_sampling() {
        let probes = Probes::new(["wolf"], Sampling::new(0, 1));
        probes
            .probe("wolf")
            .record_contention(probes.sampling(), Duration::from_millis(1));
        assert_eq!(probes.snapshot().entity("wolf").unwrap().contentions, 0);
    }

    #[test]
    fn test_block_rate_is_a_threshold() {
        let probes = Probes::new(["cat"], Sampling::new(1, 1_000));
        let cat = probes.probe("cat");
        cat.record_block(probes.sampling(), Duration::from_nanos(999));
        cat.record_block(probes.sampling(), Duration::from_nanos(1_000));

        let snapshot = probes.snapshot();
        let cat = snapshot.entity("cat").unwrap();
        assert_eq!(cat.block_events, 1);
        assert_eq!(cat.blocked_nanos, 1_000);
    }

    #[test]
    fn test_snapshots_are_monotonic() {
        let probes = probes();
        let before = probes.snapshot();
        probes.probe("dog").record_busy(Duration::from_micros(5));
        probes.probe("dog").record_life();
        probes.record_cycle();
        let after = probes.snapshot();

        assert!(after.cycles > before.cycles);
        for (later, earlier) in after.all_entities().zip(before.all_entities()) {
            assert!(later.dominates(earlier), "{} went backwards", later.name);
        }
    }

    #[test]
    fn test_snapshot_serializes_to_json() {
        let json = serde_json::to_value(probes().snapshot()).unwrap();
        assert_eq!(json["sampling"]["mutex_fraction"], 1);
        assert_eq!(json["entities"][1]["name"], "cat");
    }
}
