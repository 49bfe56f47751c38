//! Shared primitives: frame/time types, colors, the crate error type, and small math helpers.

pub(crate) mod color;
pub(crate) mod core;
pub(crate) mod error;
pub(crate) mod math;
