//! Placement math shared by the editor preview and the rendered output.

/// Percent/pixel conversion and contain fitting.
pub mod coords;
/// Greedy word wrap and centered line stacking.
pub mod text;

pub use coords::{CoordinateMapper, fit_contain, to_pixel};
pub use text::{MonospaceMeasure, PlacedLine, TextMeasure, stack_lines, wrap};
