//! Mice.

use crate::animal::{Animal, live_basics};
use crate::error::LifeResult;
use crate::habitat::Habitat;

pub trait Muridae: Animal {
    fn hole(&self, habitat: &Habitat) -> LifeResult;

    fn steal(&self, habitat: &Habitat) -> LifeResult;

    /// Dig, then steal.
    ///
    /// # Errors
    ///
    /// Returns the first behavior failure.
    fn roam(&self, habitat: &Habitat) -> LifeResult {
        self.hole(habitat)?;
        self.steal(habitat)
    }
}

/// Steals into the larder and keeps what it took.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Mouse;

impl Animal for Mouse {
    fn name(&self) -> &'static str {
        "mouse"
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
        habitat.idle(self.name(), "excrete_liquid")
    }

    fn live(&self, habitat: &Habitat) -> LifeResult {
        live_basics(self, habitat)?;
        self.roam(habitat)
    }
}

impl Muridae for Mouse {
    fn hole(&self, habitat: &Habitat) -> LifeResult {
        habitat.idle(self.name(), "hole")
    }

    fn steal(&self, habitat: &Habitat) -> LifeResult {
        habitat.hoard(self.name())
    }
}
