//! Unit conversions and wind vector helpers.

pub mod units;
pub mod wind;

pub use units::*;
pub use wind::{spddir_to_uv, uv_to_spddir};
