//! Common types and utilities shared across the emcpy crates.

pub mod error;
pub mod extent;
pub mod filter;
pub mod time;
pub mod utils;

pub use error::{EmcError, EmcResult};
pub use extent::Extent;
pub use filter::{filter_obs, FilterBounds, Hemisphere, ObsColumns};
pub use utils::{float10_power, round_number, Timer};
