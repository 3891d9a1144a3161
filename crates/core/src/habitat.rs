//! The context every lifecycle call receives.
//!
//! Animals carry no state of their own. Anything that has to outlive a
//! single call, such as the contended den or the larder of hoarded chunks,
//! lives here, and every helper records what it did into the probes under
//! the calling animal's name.

use std::collections::VecDeque;
use std::hint::black_box;
use std::sync::mpsc;
use std::sync::{Arc, Mutex, PoisonError};
use std::thread;
use std::time::Instant;

use crate::config::BehaviorConfig;
use crate::error::{LifeError, LifeResult};
use crate::probes::Probes;

/// Chunks kept alive by hoarding animals, oldest first.
#[derive(Debug, Default)]
struct Larder {
    chunks: VecDeque<(&'static str, Vec<u8>)>,
    bytes: usize,
}

/// Shared context for lifecycle behaviors.
#[derive(Debug)]
pub struct Habitat {
    probes: Arc<Probes>,
    behavior: BehaviorConfig,
    den: Arc<Mutex<()>>,
    larder: Mutex<Larder>,
}

/// Marks a detached helper as live until it is dropped.
struct TaskGuard {
    probes: Arc<Probes>,
    owner: &'static str,
}

impl TaskGuard {
    fn start(probes: &Arc<Probes>, owner: &'static str) -> Self {
        probes.probe(owner).task_started();
        Self {
            probes: Arc::clone(probes),
            owner,
        }
    }
}

impl Drop for TaskGuard {
    fn drop(&mut self) {
        self.probes.probe(self.owner).task_finished();
    }
}

impl Habitat {
    #[must_use]
    pub fn new(probes: Arc<Probes>, behavior: BehaviorConfig) -> Self {
        Self {
            probes,
            behavior,
            den: Arc::new(Mutex::new(())),
            larder: Mutex::new(Larder::default()),
        }
    }

    #[must_use]
    pub const fn probes(&self) -> &Arc<Probes> {
        &self.probes
    }

    /// A behavior with no measurable cost.
    ///
    /// # Errors
    ///
    /// Never fails; returns a result so it composes with the other helpers.
    pub fn idle(&self, who: &'static str, action: &'static str) -> LifeResult {
        tracing::trace!(animal = who, action, "idle");
        Ok(())
    }

    /// CPU-bound loop; shows up as busy time.
    ///
    /// # Errors
    ///
    /// Never fails.
    pub fn spin(&self, who: &'static str) -> LifeResult {
        let started = Instant::now();
        let mut acc = 0_u64;
        for i in 0..self.behavior.spin_iterations {
            acc = black_box(acc.wrapping_add(i));
        }
        black_box(acc);

        let elapsed = started.elapsed();
        self.probes.probe(who).record_busy(elapsed);
        tracing::debug!(animal = who, ?elapsed, "spin");
        Ok(())
    }

    /// Allocate a buffer and drop it straight away.
    ///
    /// # Errors
    ///
    /// Never fails.
    pub fn churn(&self, who: &'static str) -> LifeResult {
        let len = self.behavior.churn_bytes;
        let buffer = vec![0_u8; len];
        black_box(&buffer);
        drop(buffer);

        self.probes.probe(who).record_alloc(len);
        tracing::debug!(animal = who, bytes = len, "churn");
        Ok(())
    }

    /// Keep a chunk in the larder, evicting the oldest ones past the cap.
    ///
    /// # Errors
    ///
    /// Returns `LifeError::Poisoned` if a previous hoarder panicked while
    /// holding the larder.
    pub fn hoard(&self, who: &'static str) -> LifeResult {
        let len = self.behavior.hoard_chunk_bytes;
        let chunk = vec![0_u8; len];
        let probe = self.probes.probe(who);
        probe.record_alloc(len);

        let mut larder = self
            .larder
            .lock()
            .map_err(|_| LifeError::Poisoned("larder"))?;
        larder.chunks.push_back((who, chunk));
        larder.bytes = larder.bytes.saturating_add(len);
        probe.record_retained(len);

        while larder.bytes > self.behavior.hoard_cap_bytes {
            let Some((owner, evicted)) = larder.chunks.pop_front() else {
                break;
            };
            larder.bytes = larder.bytes.saturating_sub(evicted.len());
            self.probes.probe(owner).release_retained(evicted.len());
        }

        tracing::debug!(animal = who, held = larder.bytes, "hoard");
        Ok(())
    }

    /// Spawn detached helpers that sleep and exit on their own.
    ///
    /// # Errors
    ///
    /// Returns `LifeError::Spawn` if the OS refuses a new thread.
    pub fn scatter(&self, who: &'static str) -> LifeResult {
        let lifetime = self.behavior.scatter_lifetime;
        for index in 0..self.behavior.scatter_tasks {
            let guard = TaskGuard::start(&self.probes, who);
            thread::Builder::new()
                .name(format!("{who}-scatter-{index}"))
                .spawn(move || {
                    let _guard = guard;
                    thread::sleep(lifetime);
                })?;
        }
        tracing::debug!(animal = who, tasks = self.behavior.scatter_tasks, "scatter");
        Ok(())
    }

    /// Wait for the den while a helper holds it.
    ///
    /// # Errors
    ///
    /// Returns `LifeError::Spawn` if the holder cannot be started,
    /// `LifeError::Disconnected` if it exits before taking the den, and
    /// `LifeError::Poisoned` if the den is poisoned.
    pub fn contend(&self, who: &'static str) -> LifeResult {
        let (ready_tx, ready_rx) = mpsc::sync_channel::<()>(0);
        let den = Arc::clone(&self.den);
        let hold = self.behavior.den_hold;
        let guard = TaskGuard::start(&self.probes, who);

        thread::Builder::new()
            .name(format!("{who}-den"))
            .spawn(move || {
                let _guard = guard;
                let _held = den.lock().unwrap_or_else(PoisonError::into_inner);
                if ready_tx.send(()).is_ok() {
                    thread::sleep(hold);
                }
            })?;

        ready_rx.recv().map_err(|_| LifeError::Disconnected)?;

        let waiting = Instant::now();
        let _held = self.den.lock().map_err(|_| LifeError::Poisoned("den"))?;
        let waited = waiting.elapsed();

        self.probes
            .probe(who)
            .record_contention(self.probes.sampling(), waited);
        tracing::debug!(animal = who, ?waited, "contend");
        Ok(())
    }

    /// Block on a rendezvous channel until a helper signals.
    ///
    /// # Errors
    ///
    /// Returns `LifeError::Spawn` if the partner cannot be started and
    /// `LifeError::Disconnected` if it exits without signalling.
    pub fn rendezvous(&self, who: &'static str) -> LifeResult {
        let (tx, rx) = mpsc::sync_channel::<()>(0);
        let wait = self.behavior.rendezvous_wait;
        let guard = TaskGuard::start(&self.probes, who);
        let blocking = Instant::now();

        thread::Builder::new()
            .name(format!("{who}-rendezvous"))
            .spawn(move || {
                let _guard = guard;
                thread::sleep(wait);
                let _ = tx.send(());
            })?;

        rx.recv().map_err(|_| LifeError::Disconnected)?;
        let blocked = blocking.elapsed();

        self.probes
            .probe(who)
            .record_block(self.probes.sampling(), blocked);
        tracing::debug!(animal = who, ?blocked, "rendezvous");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]

    use super::*;
    use crate::probes::Sampling;
    use std::time::Duration;

    fn habitat(behavior: BehaviorConfig) -> Habitat {
        let probes = Arc::new(Probes::new(["dog", "mouse", "rat"], Sampling::record_all()));
        Habitat::new(probes, behavior)
    }

    #[test]
    fn test_spin_records_busy_time() {
        let habitat = habitat(BehaviorConfig::quiet());
        habitat.spin("dog").unwrap();
        // Even a tiny loop takes measurable time; zero would mean nothing was recorded.
        let snapshot = habitat.probes().snapshot();
        assert!(snapshot.entity("dog").unwrap().busy_nanos > 0);
    }

    #[test]
    fn test_churn_counts_allocation_without_retaining() {
        let habitat = habitat(BehaviorConfig::quiet());
        habitat.churn("dog").unwrap();
        habitat.churn("dog").unwrap();

        let snapshot = habitat.probes().snapshot();
        let dog = snapshot.entity("dog").unwrap();
        assert_eq!(dog.alloc_bytes, 128);
        assert_eq!(dog.alloc_objects, 2);
        assert_eq!(dog.retained_bytes, 0);
    }

    #[test]
    fn test_hoard_is_bounded_by_cap() {
        let habitat = habitat(BehaviorConfig {
            hoard_chunk_bytes: 100,
            hoard_cap_bytes: 250,
            ..BehaviorConfig::quiet()
        });
        for _ in 0..5 {
            habitat.hoard("mouse").unwrap();
        }

        let snapshot = habitat.probes().snapshot();
        let mouse = snapshot.entity("mouse").unwrap();
        assert_eq!(mouse.alloc_bytes, 500);
        assert_eq!(mouse.retained_bytes, 200);
    }

    #[test]
    fn test_eviction_releases_the_original_owner() {
        let habitat = habitat(BehaviorConfig {
            hoard_chunk_bytes: 100,
            hoard_cap_bytes: 100,
            ..BehaviorConfig::quiet()
        });
        habitat.hoard("mouse").unwrap();
        habitat.hoard("rat").unwrap();

        let snapshot = habitat.probes().snapshot();
        assert_eq!(snapshot.entity("mouse").unwrap().retained_bytes, 0);
        assert_eq!(snapshot.entity("rat").unwrap().retained_bytes, 100);
    }

    #[test]
    fn test_scatter_helpers_finish_on_their_own() {
        let habitat = habitat(BehaviorConfig {
            scatter_tasks: 3,
            scatter_lifetime: Duration::from_millis(10),
            ..BehaviorConfig::quiet()
        });
        habitat.scatter("dog").unwrap();
        assert_eq!(habitat.probes().snapshot().entity("dog").unwrap().tasks_spawned, 3);

        let deadline = Instant::now() + Duration::from_secs(5);
        while habitat.probes().snapshot().entity("dog").unwrap().tasks_live > 0 {
            assert!(Instant::now() < deadline, "scatter helpers never exited");
            thread::sleep(Duration::from_millis(5));
        }
    }

    #[test]
    fn test_contend_waits_for_the_holder() {
        let habitat = habitat(BehaviorConfig {
            den_hold: Duration::from_millis(30),
            ..BehaviorConfig::quiet()
        });
        habitat.contend("dog").unwrap();

        let snapshot = habitat.probes().snapshot();
        let dog = snapshot.entity("dog").unwrap();
        assert_eq!(dog.contentions, 1);
        assert!(dog.contention_nanos >= 20_000_000);
    }

    #[test]
    fn test_rendezvous_blocks_until_signalled() {
        let habitat = habitat(BehaviorConfig {
            rendezvous_wait: Duration::from_millis(20),
            ..BehaviorConfig::quiet()
        });
        habitat.rendezvous("dog").unwrap();

        let snapshot = habitat.probes().snapshot();
        let dog = snapshot.entity("dog").unwrap();
        assert_eq!(dog.block_events, 1);
        assert!(dog.blocked_nanos >= 20_000_000);
    }
}
