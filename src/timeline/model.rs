use crate::foundation::core::Fps;
use crate::foundation::error::{ShortreelError, ShortreelResult};
use crate::project::state::ProjectState;

/// Half-open span `[start, end)` in seconds.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Interval {
    /// Inclusive start.
    pub start: f64,
    /// Exclusive end.
    pub end: f64,
}

impl Interval {
    /// Length in seconds.
    pub fn duration(self) -> f64 {
        self.end - self.start
    }

    /// Whether `t` falls inside `[start, end)`.
    pub fn contains(self, t: f64) -> bool {
        self.start <= t && t < self.end
    }
}

/// Which part of the video is on screen.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Phase {
    /// Leading cover slice.
    Thumbnail,
    /// Segment at `index` in playback order.
    Segment {
        /// Index into the ordered segment list.
        index: usize,
    },
}

/// Result of [`Timeline::resolve`].
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Resolved {
    /// Active phase.
    pub phase: Phase,
    /// Seconds since the active phase began.
    pub local_offset: f64,
}

/// Contiguous, non-overlapping intervals covering `[0, total_duration)`.
#[derive(Clone, Debug, PartialEq)]
pub struct Timeline {
    thumbnail: Interval,
    segments: Vec<Interval>,
}

impl Timeline {
    /// Build from a thumbnail slice length and per-segment durations in playback order.
    pub fn new(
        thumbnail_secs: f64,
        segment_secs: impl IntoIterator<Item = f64>,
    ) -> ShortreelResult<Self> {
        check_secs(thumbnail_secs, "thumbnail duration")?;
        let thumbnail = Interval {
            start: 0.0,
            end: thumbnail_secs,
        };

        let mut cursor = thumbnail_secs;
        let mut segments = Vec::new();
        for (i, secs) in segment_secs.into_iter().enumerate() {
            check_secs(secs, &format!("segment {i} duration"))?;
            segments.push(Interval {
                start: cursor,
                end: cursor + secs,
            });
            cursor += secs;
        }
        Ok(Self {
            thumbnail,
            segments,
        })
    }

    /// Derive the timeline of a project. Segments without audio use the configured fallback.
    pub fn from_project(state: &ProjectState) -> ShortreelResult<Self> {
        let fallback = state.settings.fallback_segment_secs;
        Self::new(
            state.thumbnail.duration_secs,
            state.segments.iter().map(|s| s.duration_secs(fallback)),
        )
    }

    /// Length of the thumbnail slice.
    pub fn thumbnail_secs(&self) -> f64 {
        self.thumbnail.end
    }

    /// Number of segment intervals.
    pub fn segment_count(&self) -> usize {
        self.segments.len()
    }

    /// Interval of the segment at `index`.
    pub fn segment_interval(&self, index: usize) -> Option<Interval> {
        self.segments.get(index).copied()
    }

    /// All intervals in order, thumbnail first.
    pub fn intervals(&self) -> impl Iterator<Item = (Phase, Interval)> + '_ {
        std::iter::once((Phase::Thumbnail, self.thumbnail)).chain(
            self.segments
                .iter()
                .enumerate()
                .map(|(index, iv)| (Phase::Segment { index }, *iv)),
        )
    }

    /// Thumbnail slice plus every segment duration.
    pub fn total_duration(&self) -> f64 {
        self.segments
            .last()
            .map_or(self.thumbnail.end, |last| last.end)
    }

    /// Number of frames the render loop emits: `floor(total * fps)`.
    pub fn frame_count(&self, fps: Fps) -> u64 {
        fps.secs_to_frames_floor(self.total_duration())
    }

    /// Resolve the active phase at `t` seconds.
    ///
    /// Times at or past the end resolve to the last segment, even when it has zero length; the
    /// render loop only samples `t < total`, where every time lands in a non-empty interval. With
    /// no segments every time resolves to the thumbnail. Negative or NaN times are treated as `0`.
    pub fn resolve(&self, t: f64) -> Resolved {
        let t = if t.is_nan() { 0.0 } else { t.max(0.0) };
        if t < self.thumbnail.end || self.segments.is_empty() {
            return Resolved {
                phase: Phase::Thumbnail,
                local_offset: t,
            };
        }

        let index = self
            .segments
            .iter()
            .position(|iv| iv.contains(t))
            .unwrap_or(self.segments.len() - 1);
        Resolved {
            phase: Phase::Segment { index },
            local_offset: t - self.segments[index].start,
        }
    }
}

fn check_secs(secs: f64, what: &str) -> ShortreelResult<()> {
    if !secs.is_finite() || secs < 0.0 {
        return Err(ShortreelError::validation(format!(
            "{what} must be finite and >= 0, got {secs}"
        )));
    }
    Ok(())
}

#[cfg(test)]
#[path = "../../tests/unit/timeline/model.rs"]
mod tests;
