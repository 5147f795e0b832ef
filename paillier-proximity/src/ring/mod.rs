//! # Ring Module
//!
//! Provides the [`Ring`] struct for representing finite rings Z_m over arbitrary-precision
//! integers, plus uniform sampling helpers driven by a caller-supplied secure RNG.

pub mod helper;
pub mod math;

pub use helper::{random_below, random_bits, random_unit};
pub use math::Ring;
