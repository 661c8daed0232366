//! Dataset sources other than the user's own CSV.

pub mod sample;

pub use sample::*;
