use std::collections::HashMap;
use std::sync::Arc;

use crate::assets::media::AudioPcm;
use crate::audio::mix::{frame_to_sample, secs_to_sample};
use crate::foundation::core::Fps;
use crate::foundation::error::{ShortreelError, ShortreelResult};
use crate::project::model::AudioRef;
use crate::project::state::ProjectState;
use crate::timeline::Timeline;

/// One speech clip positioned on the output timeline.
#[derive(Clone, Debug)]
pub struct PlacedClip {
    /// First output sample (inclusive).
    pub start_sample: u64,
    /// Last output sample (exclusive). Clips never spill into the next segment.
    pub end_sample: u64,
    /// Decoded source audio at the manifest sample rate.
    pub pcm: Arc<AudioPcm>,
}

/// Soundtrack of a whole render, aligned to the video frame count.
#[derive(Clone, Debug)]
pub struct SoundtrackManifest {
    /// Output sample rate in Hz.
    pub sample_rate: u32,
    /// Output channel count.
    pub channels: u16,
    /// Length of the soundtrack in sample frames.
    pub total_samples: u64,
    /// Clips in timeline order.
    pub clips: Vec<PlacedClip>,
}

impl SoundtrackManifest {
    /// `true` when no segment contributes audio.
    pub fn is_silent(&self) -> bool {
        self.clips.is_empty()
    }
}

/// Lay out every segment's speech at its segment start offset.
///
/// `decode` turns an audio handle into PCM at `sample_rate`; identical handles are decoded once.
/// Segments without audio stay silent. A decode failure aborts the whole soundtrack.
pub fn build_soundtrack<F>(
    state: &ProjectState,
    timeline: &Timeline,
    fps: Fps,
    sample_rate: u32,
    mut decode: F,
) -> ShortreelResult<SoundtrackManifest>
where
    F: FnMut(&AudioRef) -> ShortreelResult<AudioPcm>,
{
    if sample_rate == 0 {
        return Err(ShortreelError::validation("soundtrack sample rate must be > 0"));
    }
    if timeline.segment_count() != state.segments.len() {
        return Err(ShortreelError::evaluation(
            "timeline does not match the project's segments",
        ));
    }

    let total_samples = frame_to_sample(timeline.frame_count(fps), fps, sample_rate);
    let mut decoded: HashMap<&AudioRef, Arc<AudioPcm>> = HashMap::new();
    let mut clips = Vec::new();

    for (index, segment) in state.segments.iter().enumerate() {
        let (Some(audio), Some(interval)) = (segment.audio.as_ref(), timeline.segment_interval(index))
        else {
            continue;
        };
        let start_sample = secs_to_sample(interval.start, sample_rate).min(total_samples);
        let end_sample = secs_to_sample(interval.end, sample_rate).min(total_samples);
        if end_sample <= start_sample {
            continue;
        }

        let pcm = match decoded.get(audio) {
            Some(pcm) => Arc::clone(pcm),
            None => {
                let pcm = decode(audio).map_err(|e| {
                    ShortreelError::asset(format!(
                        "failed to decode speech for {}: {e}",
                        segment.id
                    ))
                })?;
                if pcm.sample_rate != sample_rate {
                    return Err(ShortreelError::asset(format!(
                        "speech for {} decoded at {} Hz, expected {sample_rate} Hz",
                        segment.id, pcm.sample_rate
                    )));
                }
                let pcm = Arc::new(pcm);
                decoded.insert(audio, Arc::clone(&pcm));
                pcm
            }
        };

        clips.push(PlacedClip {
            start_sample,
            end_sample,
            pcm,
        });
    }

    tracing::debug!(clips = clips.len(), total_samples, "soundtrack laid out");
    Ok(SoundtrackManifest {
        sample_rate,
        channels: 2,
        total_samples,
        clips,
    })
}

#[cfg(test)]
#[path = "../../tests/unit/audio/manifest.rs"]
mod tests;
