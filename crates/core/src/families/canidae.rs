//! Dogs and wolves.

use crate::animal::{Animal, live_basics};
use crate::error::LifeResult;
use crate::habitat::Habitat;

pub trait Canidae: Animal {
    fn run(&self, habitat: &Habitat) -> LifeResult;

    fn howl(&self, habitat: &Habitat) -> LifeResult;

    /// Run, then howl.
    ///
    /// # Errors
    ///
    /// Returns the first behavior failure.
    fn roam(&self, habitat: &Habitat) -> LifeResult {
        self.run(habitat)?;
        self.howl(habitat)
    }
}

/// Runs by churning through short-lived allocations.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Dog;

impl Animal for Dog {
    fn name(&self) -> &'static str {
        "dog"
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

impl Canidae for Dog {
    fn run(&self, habitat: &Habitat) -> LifeResult {
        habitat.churn(self.name())
    }

    fn howl(&self, habitat: &Habitat) -> LifeResult {
        habitat.idle(self.name(), "howl")
    }
}

/// Drinks by leaving helpers behind and howls over a contended den.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Wolf;

impl Animal for Wolf {
    fn name(&self) -> &'static str {
        "wolf"
    }

    fn eat(&self, habitat: &Habitat) -> LifeResult {
        habitat.idle(self.name(), "eat")
    }

    fn drink(&self, habitat: &Habitat) -> LifeResult {
        habitat.scatter(self.name())
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

impl Canidae for Wolf {
    fn run(&self, habitat: &Habitat) -> LifeResult {
        habitat.idle(self.name(), "run")
    }

    fn howl(&self, habitat: &Habitat) -> LifeResult {
        habitat.contend(self.name())
    }
}
