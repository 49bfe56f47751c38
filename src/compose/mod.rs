//! Frame composition: which overlays are drawn, where, and in what order.

/// Per-render scene layout and per-frame composition.
pub mod compositor;
/// Draw steps handed to a render backend.
pub mod plan;

pub use compositor::Scene;
pub use plan::{DrawOp, FramePlan, Outline, TextBlock};
