//! shortreel assembles short vertical videos from a script.
//!
//! A script is split into segments, each with its own subtitle, optional image and synthesized
//! speech. A leading thumbnail slice carries a title and cover image. The crate derives a timeline
//! from segment audio lengths, lays out every overlay once with a coordinate mapper shared with
//! the editor preview, composes one draw plan per frame, rasterizes it on the CPU, and streams the
//! frames into `ffmpeg`.
//!
//! - Edit a [`ProjectState`] through [`Action`]s, usually via a [`ProjectStore`]
//! - Derive a [`Timeline`] and a [`Scene`] from it
//! - [`render`] the project into a [`RenderedVideo`]
#![forbid(unsafe_code)]
#![deny(missing_docs)]

mod foundation;

/// Image, font and audio inputs.
pub mod assets;
/// Speech soundtrack layout and mixing.
pub mod audio;
/// Per-frame composition.
pub mod compose;
/// Frame sinks and the `ffmpeg` encoder.
pub mod encode;
/// Coordinate mapping and text layout.
pub mod layout;
/// Project model, reducer and gestures.
pub mod project;
/// Frame rasterization.
pub mod render;
/// Speech and script collaborators.
pub mod services;
/// Render jobs and the async render driver.
pub mod session;
/// Derived timeline.
pub mod timeline;

pub use crate::foundation::color::Color;
pub use crate::foundation::core::{
    Affine, Canvas, Fps, FrameIndex, FrameRange, Point, Rect, Rgba8Premul, Size, Vec2,
};
pub use crate::foundation::error::{ShortreelError, ShortreelResult};

pub use crate::assets::{ParleyMeasure, PreparedAssetStore, PreparedFont, TextLayoutEngine};
pub use crate::compose::{FramePlan, Scene};
pub use crate::encode::{
    AudioInputConfig, Container, FfmpegSink, FfmpegSinkOpts, FrameSink, InMemorySink, SinkConfig,
};
pub use crate::layout::{CoordinateMapper, MonospaceMeasure, TextMeasure};
pub use crate::project::model::{
    AudioRef, ImagePlacement, ImageRef, ImageSource, PctPoint, Segment, SegmentId, SpeechClip,
    ThumbnailOverlay, Voice,
};
pub use crate::project::settings::{ProjectSettings, TitleMode};
pub use crate::project::state::{Action, ProjectState, ProjectStore, RenderStatus};
pub use crate::render::{CpuBackend, CpuBackendOpts, FrameRGBA, RenderBackend};
pub use crate::services::{
    MockSpeech, OpenAiScriptGenerator, PiperSpeech, ScriptService, SpeechSynthesizer,
};
pub use crate::session::{RenderJob, RenderRequest, RenderTools, RenderedVideo, render};
pub use crate::timeline::{Phase, Timeline};
