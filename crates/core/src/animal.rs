//! The capability set every animal exposes.

use crate::error::LifeResult;
use crate::habitat::Habitat;

/// An actor driven once per cycle.
///
/// Implementors are stateless; everything a behavior needs comes from the
/// [`Habitat`].
pub trait Animal: Send + Sync {
    fn name(&self) -> &'static str;

    fn eat(&self, habitat: &Habitat) -> LifeResult;

    fn drink(&self, habitat: &Habitat) -> LifeResult;

    fn excrete_solid(&self, habitat: &Habitat) -> LifeResult;

    fn excrete_liquid(&self, habitat: &Habitat) -> LifeResult;

    /// One full lifecycle. Families extend this with their own behaviors.
    ///
    /// # Errors
    ///
    /// Returns the first behavior failure; later behaviors are skipped.
    fn live(&self, habitat: &Habitat) -> LifeResult {
        live_basics(self, habitat)
    }
}

/// Eat, drink, then excrete, in that order.
///
/// # Errors
///
/// Returns the first behavior failure.
pub fn live_basics<A: Animal + ?Sized>(animal: &A, habitat: &Habitat) -> LifeResult {
    animal.eat(habitat)?;
    animal.drink(habitat)?;
    animal.excrete_solid(habitat)?;
    animal.excrete_liquid(habitat)
}
