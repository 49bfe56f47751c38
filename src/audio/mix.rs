use std::path::Path;

use anyhow::Context as _;

use crate::audio::manifest::{PlacedClip, SoundtrackManifest};
use crate::foundation::core::Fps;
use crate::foundation::error::ShortreelResult;

/// Mix all clips into interleaved output PCM, clamped to `[-1, 1]`.
pub fn mix_manifest(manifest: &SoundtrackManifest) -> Vec<f32> {
    let frames = manifest.total_samples as usize;
    let mut out = vec![0.0f32; frames * usize::from(manifest.channels)];

    for clip in &manifest.clips {
        mix_clip(&mut out, manifest.channels, clip);
    }

    for s in &mut out {
        *s = s.clamp(-1.0, 1.0);
    }
    out
}

fn mix_clip(out: &mut [f32], out_channels: u16, clip: &PlacedClip) {
    let src_channels = usize::from(clip.pcm.channels);
    if src_channels == 0 || out_channels == 0 {
        return;
    }
    let src = clip.pcm.interleaved_f32.as_slice();
    let src_frames = src.len() / src_channels;
    let out_channels = usize::from(out_channels);

    for (rel, dst_sample) in (clip.start_sample..clip.end_sample).enumerate() {
        if rel >= src_frames {
            break;
        }
        let dst_idx = dst_sample as usize * out_channels;
        if dst_idx + out_channels > out.len() {
            break;
        }
        let i = rel * src_channels;
        let l = src[i];
        let r = if src_channels > 1 { src[i + 1] } else { l };

        out[dst_idx] += l;
        if out_channels > 1 {
            out[dst_idx + 1] += r;
        }
    }
}

/// Write interleaved `f32` PCM samples to a raw little-endian `.f32le` file.
pub fn write_mix_to_f32le_file(samples_interleaved: &[f32], out_path: &Path) -> ShortreelResult<()> {
    if let Some(parent) = out_path.parent()
        && !parent.as_os_str().is_empty()
    {
        std::fs::create_dir_all(parent).with_context(|| {
            format!(
                "failed to create audio mix output directory '{}'",
                parent.display()
            )
        })?;
    }

    let mut bytes = Vec::<u8>::with_capacity(samples_interleaved.len() * 4);
    for &sample in samples_interleaved {
        bytes.extend_from_slice(&sample.to_le_bytes());
    }
    std::fs::write(out_path, bytes)
        .with_context(|| format!("failed to write mixed audio file '{}'", out_path.display()))?;
    Ok(())
}

/// Convert a frame count to the nearest sample index at `sample_rate`.
pub fn frame_to_sample(frames: u64, fps: Fps, sample_rate: u32) -> u64 {
    let num = u128::from(frames) * u128::from(sample_rate) * u128::from(fps.den);
    let den = u128::from(fps.num.max(1));
    ((num + (den / 2)) / den) as u64
}

/// Convert seconds to the nearest sample index at `sample_rate`. Negative or non-finite input maps to 0.
pub fn secs_to_sample(secs: f64, sample_rate: u32) -> u64 {
    if !secs.is_finite() || secs <= 0.0 {
        return 0;
    }
    (secs * f64::from(sample_rate)).round() as u64
}

#[cfg(test)]
#[path = "../../tests/unit/audio/mix.rs"]
mod tests;
