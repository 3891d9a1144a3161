//! Family capability sets layered over [`Animal`](crate::animal::Animal).
//!
//! Each family adds two behaviors and a `roam` step that runs them; a family
//! member's lifecycle is the basic one followed by `roam`.

pub mod canidae;
pub mod felidae;
pub mod muridae;

pub use canidae::{Canidae, Dog, Wolf};
pub use felidae::{Cat, Felidae, Tiger};
pub use muridae::{Mouse, Muridae};
