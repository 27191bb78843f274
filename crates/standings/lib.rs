//! Race result loading and the standings computed from it.
//!
//! Every function takes the loaded results frame by reference and returns a
//! fresh frame or plain values; the source table is never mutated.

pub mod championship;
pub mod constructors;
pub mod drivers;
pub mod error;
mod frame;
pub mod loader;
pub mod stats;

pub use drivers::{DriverCode, DriverInfo, DriverRoster};
pub use error::StandingsError;

pub type Result<T> = std::result::Result<T, StandingsError>;

#[cfg(test)]
pub(crate) mod testing;
