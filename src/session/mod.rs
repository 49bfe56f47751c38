//! Rendering a project into a video: the frame loop and its async driver.

/// Async render entry point that reports through the project store.
pub mod driver;
/// Frame loop over a laid-out scene, and the rendered video handle.
pub mod job;

pub use driver::{RenderRequest, RenderTools, render};
pub use job::{RenderJob, RenderedVideo, SoundtrackFile, write_soundtrack};
