//! The driver loop.
//!
//! One state, running: walk the registry in order, then sleep for the tick.
//! The sleep is added after the work, so a slow cycle pushes every later
//! cycle back. The first lifecycle failure ends the loop.

use std::convert::Infallible;
use std::thread;
use std::time::Duration;

use tracing::{debug, debug_span, info};

use crate::error::{Error, Result};
use crate::habitat::Habitat;
use crate::registry::Registry;

/// Drives every registered animal once per tick.
#[derive(Debug)]
pub struct Driver {
    registry: Registry,
    habitat: Habitat,
    tick_interval: Duration,
}

impl Driver {
    #[must_use]
    pub const fn new(registry: Registry, habitat: Habitat, tick_interval: Duration) -> Self {
        Self {
            registry,
            habitat,
            tick_interval,
        }
    }

    #[must_use]
    pub const fn habitat(&self) -> &Habitat {
        &self.habitat
    }

    /// Run every animal's lifecycle once, in registry order.
    ///
    /// # Errors
    ///
    /// Returns `Error::Life` for the first animal whose lifecycle fails;
    /// animals after it are not run this cycle.
    pub fn run_cycle(&self) -> Result<()> {
        let probes = self.habitat.probes();
        let cycle = probes.cycles().saturating_add(1);

        for animal in &self.registry {
            let name = animal.name();
            let span = debug_span!("live", cycle, animal = name);
            let _entered = span.enter();

            probes.probe(name).record_life();
            animal
                .live(&self.habitat)
                .map_err(|source| Error::life(name, source))?;
        }

        probes.record_cycle();
        debug!(cycle, "cycle complete");
        Ok(())
    }

    /// Run `cycles` cycles, sleeping the tick after each.
    ///
    /// # Errors
    ///
    /// Stops at and returns the first lifecycle failure.
    pub fn run_cycles(&self, cycles: u64) -> Result<()> {
        for _ in 0..cycles {
            self.run_cycle()?;
            thread::sleep(self.tick_interval);
        }
        Ok(())
    }

    /// Run forever.
    ///
    /// # Errors
    ///
    /// Only ever returns with the lifecycle failure that stopped it.
    pub fn run(&self) -> Result<Infallible> {
        info!(
            animals = ?self.registry.names(),
            tick = ?self.tick_interval,
            "driver running"
        );
        loop {
            self.run_cycle()?;
            thread::sleep(self.tick_interval);
        }
    }
}
