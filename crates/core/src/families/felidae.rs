//! Cats and tigers.

use crate::animal::{Animal, live_basics};
use crate::error::LifeResult;
use crate::habitat::Habitat;

pub trait Felidae: Animal {
    fn climb(&self, habitat: &Habitat) -> LifeResult;

    fn sneak(&self, habitat: &Habitat) -> LifeResult;

    /// Climb, then sneak.
    ///
    /// # Errors
    ///
    /// Returns the first behavior failure.
    fn roam(&self, habitat: &Habitat) -> LifeResult {
        self.climb(habitat)?;
        self.sneak(habitat)
    }
}

/// Blocks on a rendezvous whenever it relieves itself.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Cat;

impl Animal for Cat {
    fn name(&self) -> &'static str {
        "cat"
    }

    fn eat(&self, habitat: &Habitat) -> LifeResult {
        habitat.idle(self.name(), "eat")
    }

    fn drink(&self, habitat: &Habitat) -> LifeResult {
        habitat.idle(self.name(), "drink")
    }

    fn excrete_solid(&self, habitat: &Habitat) -> LifeResult {
        habitat.idle(self.name(), "excrete_solid")
    }

    fn excrete_liquid(&self, habitat: &Habitat) -> LifeResult {
        habitat.rendezvous(self.name())
    }

    fn live(&self, habitat: &Habitat) -> LifeResult {
        live_basics(self, habitat)?;
        self.roam(habitat)
    }
}

impl Felidae for Cat {
    fn climb(&self, habitat: &Habitat) -> LifeResult {
        habitat.idle(self.name(), "climb")
    }

    fn sneak(&self, habitat: &Habitat) -> LifeResult {
        habitat.idle(self.name(), "sneak")
    }
}

/// Eats with a CPU-bound loop.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Tiger;

impl Animal for Tiger {
    fn name(&self) -> &'static str {
        "tiger"
    }

    fn eat(&self, habitat: &Habitat) -> LifeResult {
        habitat.spin(self.name())
    }

    fn drink(&self, habitat: &Habitat) -> LifeResult {
        habitat.idle(self.name(), "drink")
    }

    fn excrete_solid(&self, habitat: &Habitat) -> LifeResult {
        habitat.idle(self.name(), "excrete_solid")
    }

    fn excrete_liquid(&self, habitat: &Habitat) -> LifeResult {
        habitat.idle(self.name(), "excrete_liquid")
    }

    fn live(&self, habitat: &Habitat) -> LifeResult {
        live_basics(self, habitat)?;
        self.roam(habitat)
    }
}

impl Felidae for Tiger {
    fn climb(&self, habitat: &Habitat) -> LifeResult {
        habitat.idle(self.name(), "climb")
    }

    fn sneak(&self, habitat: &Habitat) -> LifeResult {
        habitat.idle(self.name(), "sneak")
    }
}
