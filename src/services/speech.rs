use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use tokio::io::AsyncWriteExt as _;

use crate::assets::media::{MIX_SAMPLE_RATE, wav_duration_secs, write_silent_wav};
use crate::foundation::error::{ShortreelError, ShortreelResult};
use crate::project::model::{AudioRef, SpeechClip, Voice};
use crate::project::state::{Action, ProjectStore};

/// Turns segment text into a speech clip.
#[async_trait]
pub trait SpeechSynthesizer: Send + Sync {
    /// Synthesize `text` with `voice`.
    async fn synthesize(&self, text: &str, voice: Voice) -> ShortreelResult<SpeechClip>;
}

/// Stand-in synthesizer: waits, then writes a silent local WAV of fixed length for any text.
#[derive(Debug)]
pub struct MockSpeech {
    delay: Duration,
    duration_secs: f64,
    out_dir: PathBuf,
    counter: AtomicU64,
}

impl MockSpeech {
    /// Clip length used unless [`MockSpeech::with_duration`] says otherwise.
    pub const DEFAULT_DURATION_SECS: f64 = 2.0;

    /// Mock writing its clips into `out_dir`, answering after three seconds.
    pub fn new(out_dir: impl Into<PathBuf>) -> Self {
        Self {
            delay: Duration::from_secs(3),
            duration_secs: Self::DEFAULT_DURATION_SECS,
            out_dir: out_dir.into(),
            counter: AtomicU64::new(0),
        }
    }

    /// Same clips, different delay.
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    /// Clip length in seconds.
    pub fn with_duration(mut self, duration_secs: f64) -> Self {
        self.duration_secs = duration_secs;
        self
    }
}

#[async_trait]
impl SpeechSynthesizer for MockSpeech {
    async fn synthesize(&self, text: &str, voice: Voice) -> ShortreelResult<SpeechClip> {
        tracing::debug!(voice = voice.id(), chars = text.len(), "mock speech request");
        tokio::time::sleep(self.delay).await;

        create_out_dir(&self.out_dir).await?;
        let out = clip_path(&self.out_dir, "mock", voice, &self.counter);
        let duration_secs = self.duration_secs;
        let path = out.clone();
        tokio::task::spawn_blocking(move || {
            write_silent_wav(&path, duration_secs, MIX_SAMPLE_RATE)
        })
        .await
        .map_err(|e| ShortreelError::service(format!("mock speech task failed: {e}")))??;

        Ok(SpeechClip {
            audio: AudioRef(out.to_string_lossy().into_owned()),
            duration_secs,
        })
    }
}

fn clip_path(out_dir: &Path, prefix: &str, voice: Voice, counter: &AtomicU64) -> PathBuf {
    let n = counter.fetch_add(1, Ordering::Relaxed);
    out_dir.join(format!("{prefix}_{}_{}_{n}.wav", std::process::id(), voice.id()))
}

async fn create_out_dir(dir: &Path) -> ShortreelResult<()> {
    tokio::fs::create_dir_all(dir).await.map_err(|e| {
        ShortreelError::service(format!(
            "failed to create speech output dir '{}': {e}",
            dir.display()
        ))
    })
}

/// Local synthesizer running the `piper` binary.
///
/// Each voice maps to `<model_dir>/<voice id>.onnx`. Clips are written as WAV files into
/// `out_dir` and their length is read from the WAV header.
#[derive(Debug)]
pub struct PiperSpeech {
    binary: PathBuf,
    model_dir: PathBuf,
    out_dir: PathBuf,
    counter: AtomicU64,
}

impl PiperSpeech {
    /// Synthesizer using `piper` from `PATH`.
    pub fn new(model_dir: impl Into<PathBuf>, out_dir: impl Into<PathBuf>) -> Self {
        Self {
            binary: PathBuf::from("piper"),
            model_dir: model_dir.into(),
            out_dir: out_dir.into(),
            counter: AtomicU64::new(0),
        }
    }

    /// Use a specific `piper` executable.
    pub fn with_binary(mut self, binary: impl Into<PathBuf>) -> Self {
        self.binary = binary.into();
        self
    }

    /// Model file used for `voice`.
    pub fn model_for(&self, voice: Voice) -> PathBuf {
        self.model_dir.join(format!("{}.onnx", voice.id()))
    }
}

#[async_trait]
impl SpeechSynthesizer for PiperSpeech {
    async fn synthesize(&self, text: &str, voice: Voice) -> ShortreelResult<SpeechClip> {
        let model = self.model_for(voice);
        if !model.is_file() {
            return Err(ShortreelError::service(format!(
                "no piper model for voice '{}' at '{}'",
                voice.id(),
                model.display()
            )));
        }
        create_out_dir(&self.out_dir).await?;
        let out = clip_path(&self.out_dir, "speech", voice, &self.counter);

        let mut child = tokio::process::Command::new(&self.binary)
            .arg("--model")
            .arg(&model)
            .arg("--output_file")
            .arg(&out)
            .stdin(std::process::Stdio::piped())
            .stdout(std::process::Stdio::null())
            .stderr(std::process::Stdio::piped())
            .spawn()
            .map_err(|e| {
                ShortreelError::service(format!(
                    "failed to spawn '{}' (is piper installed?): {e}",
                    self.binary.display()
                ))
            })?;

        let mut stdin = child
            .stdin
            .take()
            .ok_or_else(|| ShortreelError::service("failed to open piper stdin"))?;
        stdin
            .write_all(text.as_bytes())
            .await
            .map_err(|e| ShortreelError::service(format!("failed to send text to piper: {e}")))?;
        drop(stdin);

        let output = child
            .wait_with_output()
            .await
            .map_err(|e| ShortreelError::service(format!("failed to wait for piper: {e}")))?;
        if !output.status.success() {
            return Err(ShortreelError::service(format!(
                "piper exited with status {}: {}",
                output.status,
                String::from_utf8_lossy(&output.stderr).trim()
            )));
        }

        let duration_secs = clip_duration(&out).await?;
        tracing::debug!(voice = voice.id(), duration_secs, out = %out.display(), "piper speech ready");
        Ok(SpeechClip {
            audio: AudioRef(out.to_string_lossy().into_owned()),
            duration_secs,
        })
    }
}

async fn clip_duration(path: &Path) -> ShortreelResult<f64> {
    let path = path.to_path_buf();
    tokio::task::spawn_blocking(move || wav_duration_secs(&path))
        .await
        .map_err(|e| ShortreelError::service(format!("duration probe task failed: {e}")))?
}

/// Request speech for every segment that has none, one request at a time.
///
/// Each segment is marked as generating before its request and updated when it completes.
/// A failed request leaves the segment without new audio and moves on. Segments deleted or
/// edited while their request was in flight are left untouched by the completion. Returns the
/// number of clips attached.
#[tracing::instrument(skip_all)]
pub async fn synthesize_missing(
    store: &mut ProjectStore,
    synth: &dyn SpeechSynthesizer,
) -> ShortreelResult<usize> {
    let voice = store.state().voice;
    let mut attached = 0;
    for id in store.state().segments_missing_audio() {
        let Some(text) = store.state().segment(id).map(|s| s.text.clone()) else {
            continue;
        };
        store.dispatch(Action::SpeechStarted(id))?;
        let outcome = synth
            .synthesize(&text, voice)
            .await
            .and_then(|clip| store.dispatch(Action::SpeechCompleted { id, text, clip }));
        match outcome {
            Ok(()) => {
                if store.state().segment(id).is_some_and(|s| s.audio.is_some()) {
                    attached += 1;
                    tracing::info!(segment = %id, "speech ready");
                }
            }
            Err(e) => {
                tracing::warn!(segment = %id, error = %e, "speech request failed");
                store.dispatch(Action::SpeechFailed(id))?;
            }
        }
    }
    Ok(attached)
}

#[cfg(test)]
#[path = "../../tests/unit/services/speech.rs"]
mod tests;
