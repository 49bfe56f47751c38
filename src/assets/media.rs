use std::path::Path;
use std::process::{Command, Stdio};

use crate::foundation::error::{ShortreelError, ShortreelResult};

/// Internal audio mixing sample rate used across decode/mix/encode pipeline.
pub const MIX_SAMPLE_RATE: u32 = 48_000;

/// Decoded interleaved floating-point PCM.
#[derive(Clone, Debug)]
pub struct AudioPcm {
    /// Sample rate in Hz.
    pub sample_rate: u32,
    /// Channel count.
    pub channels: u16,
    /// Interleaved `f32` PCM samples.
    pub interleaved_f32: Vec<f32>,
}

impl AudioPcm {
    /// Length in seconds.
    pub fn duration_secs(&self) -> f64 {
        if self.sample_rate == 0 || self.channels == 0 {
            return 0.0;
        }
        let frames = self.interleaved_f32.len() / usize::from(self.channels);
        frames as f64 / f64::from(self.sample_rate)
    }
}

/// Return `true` when `ffprobe` can be invoked from `PATH`.
pub fn is_ffprobe_on_path() -> bool {
    Command::new("ffprobe")
        .arg("-version")
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .status()
        .map(|s| s.success())
        .unwrap_or(false)
}

/// Probe the duration of an audio resource (file path or URL) through `ffprobe`.
pub fn probe_duration_secs(input: &str) -> ShortreelResult<f64> {
    #[derive(serde::Deserialize)]
    struct ProbeFormat {
        duration: Option<String>,
    }
    #[derive(serde::Deserialize)]
    struct ProbeOut {
        format: ProbeFormat,
    }

    let out = Command::new("ffprobe")
        .args(["-v", "error", "-print_format", "json", "-show_format"])
        .arg(input)
        .output()
        .map_err(|e| ShortreelError::asset(format!("failed to run ffprobe: {e}")))?;
    if !out.status.success() {
        return Err(ShortreelError::asset(format!(
            "ffprobe failed for '{input}': {}",
            String::from_utf8_lossy(&out.stderr).trim()
        )));
    }

    let parsed: ProbeOut = serde_json::from_slice(&out.stdout)
        .map_err(|e| ShortreelError::asset(format!("ffprobe json parse failed: {e}")))?;
    let secs = parsed
        .format
        .duration
        .as_deref()
        .and_then(|d| d.parse::<f64>().ok())
        .filter(|d| d.is_finite() && *d >= 0.0)
        .ok_or_else(|| ShortreelError::asset(format!("ffprobe reported no duration for '{input}'")))?;
    Ok(secs)
}

/// Duration of a WAV file read from its header.
pub fn wav_duration_secs(path: &Path) -> ShortreelResult<f64> {
    let reader = hound::WavReader::open(path).map_err(|e| {
        ShortreelError::asset(format!("failed to read wav '{}': {e}", path.display()))
    })?;
    let spec = reader.spec();
    if spec.sample_rate == 0 {
        return Err(ShortreelError::asset(format!(
            "wav '{}' has a zero sample rate",
            path.display()
        )));
    }
    Ok(f64::from(reader.duration()) / f64::from(spec.sample_rate))
}

/// Write `duration_secs` of stereo silence as a 16-bit WAV file.
pub fn write_silent_wav(path: &Path, duration_secs: f64, sample_rate: u32) -> ShortreelResult<()> {
    if !duration_secs.is_finite() || duration_secs < 0.0 || sample_rate == 0 {
        return Err(ShortreelError::validation(
            "silent clip needs a non-negative duration and a non-zero sample rate",
        ));
    }
    let spec = hound::WavSpec {
        channels: 2,
        sample_rate,
        bits_per_sample: 16,
        sample_format: hound::SampleFormat::Int,
    };
    let frames = (duration_secs * f64::from(sample_rate)).round() as u32;
    let wav_err = |e: hound::Error| {
        ShortreelError::asset(format!("failed to write wav '{}': {e}", path.display()))
    };
    let mut w = hound::WavWriter::create(path, spec).map_err(wav_err)?;
    for _ in 0..u64::from(frames) * 2 {
        w.write_sample(0i16).map_err(wav_err)?;
    }
    w.finalize().map_err(wav_err)
}

/// Read a local PCM WAV that already has the target rate, without `ffmpeg`.
///
/// Returns `None` when the file needs resampling or a format `hound` cannot read, so the caller
/// can fall back to `ffmpeg`.
fn read_wav_f32_stereo(path: &Path, sample_rate: u32) -> Option<AudioPcm> {
    let reader = hound::WavReader::open(path).ok()?;
    let spec = reader.spec();
    if spec.sample_rate != sample_rate || !(1..=2).contains(&spec.channels) {
        return None;
    }
    let samples: Vec<f32> = match spec.sample_format {
        hound::SampleFormat::Float => {
            reader.into_samples::<f32>().collect::<Result<_, _>>().ok()?
        }
        hound::SampleFormat::Int => {
            let bits = u32::from(spec.bits_per_sample);
            if !(1..=32).contains(&bits) {
                return None;
            }
            let scale = (1u64 << (bits - 1)) as f32;
            reader
                .into_samples::<i32>()
                .map(|s| s.map(|v| v as f32 / scale))
                .collect::<Result<_, _>>()
                .ok()?
        }
    };
    let interleaved_f32 = if spec.channels == 1 {
        samples.iter().flat_map(|&s| [s, s]).collect()
    } else {
        samples
    };
    Some(AudioPcm {
        sample_rate,
        channels: 2,
        interleaved_f32,
    })
}

/// Decode audio from a file path or URL to stereo interleaved `f32` PCM.
///
/// Local WAV files at `sample_rate` are read directly; everything else goes through `ffmpeg`.
pub fn decode_audio_f32_stereo(input: &str, sample_rate: u32) -> ShortreelResult<AudioPcm> {
    let local = Path::new(input);
    let is_wav = local
        .extension()
        .is_some_and(|e| e.eq_ignore_ascii_case("wav"));
    if is_wav
        && local.is_file()
        && let Some(pcm) = read_wav_f32_stereo(local, sample_rate)
    {
        return Ok(pcm);
    }

    let out = Command::new("ffmpeg")
        .args(["-v", "error", "-i", input])
        .args([
            "-vn",
            "-f",
            "f32le",
            "-acodec",
            "pcm_f32le",
            "-ac",
            "2",
            "-ar",
            &sample_rate.to_string(),
            "pipe:1",
        ])
        .output()
        .map_err(|e| {
            ShortreelError::asset(format!("failed to run ffmpeg for audio decode: {e}"))
        })?;

    if !out.status.success() {
        return Err(ShortreelError::asset(format!(
            "ffmpeg audio decode failed for '{input}': {}",
            String::from_utf8_lossy(&out.stderr).trim()
        )));
    }

    if !out.stdout.len().is_multiple_of(4) {
        return Err(ShortreelError::asset(
            "decoded audio byte length is not aligned to f32 samples",
        ));
    }
    let interleaved_f32 = out
        .stdout
        .chunks_exact(4)
        .map(|c| f32::from_le_bytes([c[0], c[1], c[2], c[3]]))
        .collect();

    Ok(AudioPcm {
        sample_rate,
        channels: 2,
        interleaved_f32,
    })
}

#[cfg(test)]
#[path = "../../tests/unit/assets/media.rs"]
mod tests;
