//! Menagerie core.
//!
//! A fixed registry of stateless animals, the habitat their lifecycles run
//! in, the probes that attribute each behavior's cost to the animal that
//! paid it, and the driver loop that walks the registry once per tick.

#![forbid(unsafe_code)]
#![forbid(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![forbid(clippy::panic)]

pub mod animal;
pub mod config;
pub mod driver;
pub mod error;
pub mod families;
pub mod habitat;
pub mod probes;
pub mod registry;

pub use animal::{Animal, live_basics};
pub use config::{BehaviorConfig, CONFIG_ENV_VAR, RuntimeConfig};
pub use driver::Driver;
pub use error::{ConfigError, Error, LifeError, LifeResult, Result};
pub use families::{Canidae, Cat, Dog, Felidae, Mouse, Muridae, Tiger, Wolf};
pub use habitat::Habitat;
pub use probes::{EntityProbe, EntitySnapshot, ProbeSnapshot, Probes, Sampling, UNATTRIBUTED};
pub use registry::Registry;
