//! The fixed, ordered set of animals the driver walks.

use crate::animal::Animal;
use crate::families::{Cat, Dog, Mouse, Tiger, Wolf};

/// Ordered animals, fixed at construction.
///
/// There is no way to add or remove an animal once the registry exists.
pub struct Registry {
    animals: Vec<Box<dyn Animal>>,
}

impl Registry {
    #[must_use]
    pub fn new(animals: Vec<Box<dyn Animal>>) -> Self {
        Self { animals }
    }

    /// The canonical menagerie: dog, wolf, cat, tiger, mouse.
    #[must_use]
    pub fn all_animals() -> Self {
        Self::new(vec![
            Box::new(Dog),
            Box::new(Wolf),
            Box::new(Cat),
            Box::new(Tiger),
            Box::new(Mouse),
        ])
    }

    pub fn iter(&self) -> impl Iterator<Item = &dyn Animal> {
        self.animals.iter().map(|animal| &**animal)
    }

    #[must_use]
    pub fn get(&self, index: usize) -> Option<&dyn Animal> {
        self.animals.get(index).map(|animal| &**animal)
    }

    #[must_use]
    pub fn names(&self) -> Vec<&'static str> {
        self.iter().map(Animal::name).collect()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.animals.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.animals.is_empty()
    }
}

impl std::fmt::Debug for Registry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Registry")
            .field("animals", &self.names())
            .finish()
    }
}

impl<'a> IntoIterator for &'a Registry {
    type Item = &'a dyn Animal;
    type IntoIter = Box<dyn Iterator<Item = &'a dyn Animal> + 'a>;

    fn into_iter(self) -> Self::IntoIter {
        Box::new(self.iter())
    }
}
