//! Application configuration.
//!
//! Split into environment-derived settings and compile-time constants.

pub mod constants;
pub mod settings;

pub use constants::*;
pub use settings::Config;
