//! Physical consequences of a near-Earth object impact or close approach.
//!
//! The engine crates are re-exported here so front-ends (CLI, services,
//! notebooks) depend on a single library. Configuration and feed records are
//! turned into engine values by [`scenario`].

pub mod scenario;

pub use neo_atmosphere as atmosphere;
pub use neo_config as config;
pub use neo_core::{ErrorKind, constants, geometry, is_non_negative_finite, is_positive_finite, units};
pub use neo_effects as effects;
pub use neo_energy as energy;
pub use neo_entry as entry;
pub use neo_feed as feed;

/// Returns the version of the library.
pub fn version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
