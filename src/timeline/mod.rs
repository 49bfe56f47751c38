//! Derived timeline: a leading thumbnail slice followed by one interval per segment.
//!
//! The timeline is never stored. It is rebuilt from the project on every render request and
//! answers "what is active at time `t`" for the compositor.

/// Intervals, phases and time resolution.
pub mod model;

pub use model::{Interval, Phase, Resolved, Timeline};
