use std::path::{Path, PathBuf};

use serde::Serialize;

use crate::assets::media::{MIX_SAMPLE_RATE, decode_audio_f32_stereo};
use crate::assets::source::resolve_audio_input;
use crate::assets::store::PreparedAssetStore;
use crate::audio::manifest::build_soundtrack;
use crate::audio::mix::{mix_manifest, write_mix_to_f32le_file};
use crate::compose::compositor::Scene;
use crate::encode::sink::{AudioInputConfig, Container, FrameSink, SinkConfig};
use crate::foundation::core::{Fps, FrameIndex};
use crate::foundation::error::{ShortreelError, ShortreelResult};
use crate::project::state::ProjectState;
use crate::render::backend::RenderBackend;
use crate::timeline::Timeline;

/// Handle to a finished render.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct RenderedVideo {
    /// Location of the encoded file.
    pub path: PathBuf,
    /// Container the file was encoded in.
    pub container: Container,
    /// File name offered when the video is downloaded.
    pub suggested_file_name: String,
    /// Frames encoded.
    pub frames: u64,
    /// Encoded length in seconds.
    pub duration_secs: f64,
    /// Whether segment speech was muxed in.
    pub has_audio: bool,
}

impl RenderedVideo {
    /// Describe a file produced by a completed job.
    pub fn new(path: impl Into<PathBuf>, container: Container, frames: u64, fps: Fps) -> Self {
        Self {
            path: path.into(),
            container,
            suggested_file_name: container.suggested_file_name(),
            frames,
            duration_secs: fps.frames_to_secs(frames),
            has_audio: false,
        }
    }

    /// Mark whether the video carries a soundtrack.
    pub fn with_audio(mut self, has_audio: bool) -> Self {
        self.has_audio = has_audio;
        self
    }
}

/// Frame loop over a laid-out [`Scene`].
///
/// Frames `0..floor(total * fps)` are rendered in order, one per [`RenderJob::step`], so a caller
/// can interleave other work between frames.
pub struct RenderJob {
    scene: Scene,
    fps: Fps,
    next: u64,
    total: u64,
}

impl RenderJob {
    /// Create a job. A project shorter than one frame cannot be rendered.
    pub fn new(scene: Scene, fps: Fps) -> ShortreelResult<Self> {
        let fps = Fps::new(fps.num, fps.den)?;
        let total = scene.timeline().frame_count(fps);
        if total == 0 {
            return Err(ShortreelError::validation(
                "project is shorter than a single frame",
            ));
        }
        Ok(Self {
            scene,
            fps,
            next: 0,
            total,
        })
    }

    /// Frames the job will emit.
    pub fn total_frames(&self) -> u64 {
        self.total
    }

    /// Frames emitted so far.
    pub fn rendered_frames(&self) -> u64 {
        self.next
    }

    /// All frames have been emitted.
    pub fn is_done(&self) -> bool {
        self.next >= self.total
    }

    /// Frame rate of the job.
    pub fn fps(&self) -> Fps {
        self.fps
    }

    /// Scene being rendered.
    pub fn scene(&self) -> &Scene {
        &self.scene
    }

    /// Sink configuration matching the scene canvas.
    pub fn sink_config(&self, audio: Option<AudioInputConfig>) -> SinkConfig {
        let canvas = self.scene.canvas();
        SinkConfig {
            width: canvas.width,
            height: canvas.height,
            fps: self.fps,
            audio,
        }
    }

    /// Render the next frame and push it to `sink`. Returns `false` once the job is done.
    pub fn step(
        &mut self,
        backend: &mut dyn RenderBackend,
        assets: &PreparedAssetStore,
        sink: &mut dyn FrameSink,
    ) -> ShortreelResult<bool> {
        if self.is_done() {
            return Ok(false);
        }
        let idx = FrameIndex(self.next);
        let plan = self.scene.compose_index(idx, self.fps);
        let frame = backend.render_plan(&plan, assets)?;
        sink.push_frame(idx, &frame)?;
        self.next += 1;
        Ok(true)
    }

    /// Drive the whole loop synchronously: `begin`, every frame, `end`.
    ///
    /// On failure the sink is aborted and the error returned.
    pub fn run(
        &mut self,
        backend: &mut dyn RenderBackend,
        assets: &PreparedAssetStore,
        sink: &mut dyn FrameSink,
        audio: Option<AudioInputConfig>,
    ) -> ShortreelResult<u64> {
        sink.begin(self.sink_config(audio))?;
        if let Err(e) = self.drain(backend, assets, sink) {
            sink.abort();
            return Err(e);
        }
        Ok(self.next)
    }

    fn drain(
        &mut self,
        backend: &mut dyn RenderBackend,
        assets: &PreparedAssetStore,
        sink: &mut dyn FrameSink,
    ) -> ShortreelResult<()> {
        while self.step(backend, assets, sink)? {}
        sink.end()
    }
}

/// Mixed soundtrack written to a temporary raw PCM file, removed on drop.
#[derive(Debug)]
pub struct SoundtrackFile {
    path: PathBuf,
    sample_rate: u32,
    channels: u16,
}

impl SoundtrackFile {
    /// Audio input description for a [`SinkConfig`].
    pub fn input_config(&self) -> AudioInputConfig {
        AudioInputConfig {
            path: self.path.clone(),
            sample_rate: self.sample_rate,
            channels: self.channels,
        }
    }
}

impl Drop for SoundtrackFile {
    fn drop(&mut self) {
        let _ = std::fs::remove_file(&self.path);
    }
}

/// Decode every segment's speech, mix it at segment offsets, and write it for the encoder.
///
/// Relative speech paths resolve against `assets_root`, like image paths. Returns `None` when no
/// segment has audio.
pub fn write_soundtrack(
    state: &ProjectState,
    timeline: &Timeline,
    fps: Fps,
    assets_root: &Path,
) -> ShortreelResult<Option<SoundtrackFile>> {
    let manifest = build_soundtrack(state, timeline, fps, MIX_SAMPLE_RATE, |audio| {
        let input = resolve_audio_input(audio.as_str(), assets_root)?;
        decode_audio_f32_stereo(&input, MIX_SAMPLE_RATE)
    })?;
    if manifest.is_silent() {
        return Ok(None);
    }

    let mixed = mix_manifest(&manifest);
    let path = std::env::temp_dir().join(format!(
        "shortreel_audio_mix_{}_{}.f32le",
        std::process::id(),
        std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .map(|d| d.as_nanos())
            .unwrap_or(0)
    ));
    let file = SoundtrackFile {
        path,
        sample_rate: manifest.sample_rate,
        channels: manifest.channels,
    };
    write_mix_to_f32le_file(&mixed, &file.path)?;
    Ok(Some(file))
}

#[cfg(test)]
#[path = "../../tests/unit/session/job.rs"]
mod tests;
