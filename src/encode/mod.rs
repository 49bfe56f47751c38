//! Frame sinks: where rendered frames go.

/// `ffmpeg` subprocess sink.
pub mod ffmpeg;
/// Sink trait, container kinds and the in-memory sink.
pub mod sink;

pub use ffmpeg::{FfmpegSink, FfmpegSinkOpts, ensure_parent_dir, is_ffmpeg_on_path};
pub use sink::{AudioInputConfig, Container, FrameSink, InMemorySink, SinkConfig};
