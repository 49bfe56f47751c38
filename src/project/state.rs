use std::ops::RangeInclusive;
use std::path::Path;
use std::sync::Arc;

use anyhow::Context as _;
use serde::{Deserialize, Serialize};

use crate::foundation::color::Color;
use crate::foundation::error::{ShortreelError, ShortreelResult};
use crate::project::model::{
    ImagePlacement, ImageRef, PctPoint, Segment, SegmentId, SpeechClip, ThumbnailOverlay, Voice,
};
use crate::project::script::split_script;
use crate::project::settings::{
    IMAGE_SCALE_RANGE, ProjectSettings, SUBTITLE_TEXT_SIZE_RANGE, THUMBNAIL_DURATION_RANGE,
    THUMBNAIL_TEXT_SIZE_RANGE,
};
use crate::session::job::RenderedVideo;

/// Lifecycle of the (single) render a project can have in flight.
#[derive(Clone, Debug, Default, PartialEq)]
pub enum RenderStatus {
    /// No render has been requested.
    #[default]
    Idle,
    /// A render is running; further render requests are rejected.
    InProgress,
    /// The last render finished.
    Ready(RenderedVideo),
    /// The last render failed; a retry is allowed.
    Failed(String),
}

/// Every state transition a project supports.
#[derive(Clone, Debug, PartialEq)]
pub enum Action {
    /// Replace the script-generation topic.
    SetTopic(String),
    /// Replace the script text.
    SetScript(String),
    /// Replace all segments with one segment per non-empty script line.
    SplitScript,
    /// Replace a segment's text; different text drops its audio.
    EditSegmentText {
        /// Target segment.
        id: SegmentId,
        /// New text, must not be blank.
        text: String,
    },
    /// Remove a segment.
    DeleteSegment(SegmentId),
    /// Move the segment at `from` so it ends up at index `to`.
    MoveSegment {
        /// Source index.
        from: usize,
        /// Destination index.
        to: usize,
    },
    /// Exchange the segments at two indices.
    SwapSegments {
        /// First index.
        a: usize,
        /// Second index.
        b: usize,
    },
    /// Attach (or with `None`, detach) a segment image. Attaching resets placement defaults.
    SetSegmentImage {
        /// Target segment.
        id: SegmentId,
        /// New image.
        image: Option<ImageRef>,
    },
    /// Attach images, in order, to the segments that have none yet. Extra images are ignored.
    AssignImages(Vec<ImageRef>),
    /// Move or scale a segment image.
    SetImagePlacement {
        /// Target segment.
        id: SegmentId,
        /// New placement.
        placement: ImagePlacement,
    },
    /// Move a segment subtitle.
    SetSubtitlePosition {
        /// Target segment.
        id: SegmentId,
        /// New anchor.
        position: PctPoint,
    },
    /// Set subtitle color on one segment, or on all when "apply to all" is on.
    SetTextColor {
        /// Target segment.
        id: SegmentId,
        /// New color.
        color: Color,
    },
    /// Set subtitle size on one segment, or on all when "apply to all" is on.
    SetTextSize {
        /// Target segment.
        id: SegmentId,
        /// New size in preview pixels.
        size: f64,
    },
    /// Toggle whether per-segment style edits apply to every segment.
    SetApplyStyleToAll(bool),
    /// Replace the thumbnail title.
    SetThumbnailText(String),
    /// Move the thumbnail title.
    SetThumbnailPosition(PctPoint),
    /// Attach or detach the thumbnail image.
    SetThumbnailImage(Option<ImageRef>),
    /// Move or scale the thumbnail image.
    SetThumbnailImagePlacement(ImagePlacement),
    /// Show or hide the thumbnail title.
    SetThumbnailVisible(bool),
    /// Set the cover slice length in seconds.
    SetThumbnailDuration(f64),
    /// Set the title color and sync it to every segment.
    SetThumbnailTextColor(Color),
    /// Set the title size and sync it to every segment.
    SetThumbnailTextSize(f64),
    /// Attach or detach the global background image.
    SetBackground(Option<ImageRef>),
    /// Change the selected segment. Unknown ids are ignored.
    SelectSegment(Option<SegmentId>),
    /// Change the voice used for new speech requests.
    SetVoice(Voice),
    /// A speech request for the segment was issued.
    SpeechStarted(SegmentId),
    /// A speech request finished. Audio is attached only if the segment still has `text`.
    SpeechCompleted {
        /// Target segment.
        id: SegmentId,
        /// Text the clip was synthesized from.
        text: String,
        /// Synthesized clip.
        clip: SpeechClip,
    },
    /// A speech request failed.
    SpeechFailed(SegmentId),
    /// Refine a segment's audio duration after reading the clip's metadata.
    SetAudioDuration {
        /// Target segment.
        id: SegmentId,
        /// Measured duration in seconds.
        secs: f64,
    },
    /// A render was requested.
    RenderStarted,
    /// The render finished.
    RenderFinished(RenderedVideo),
    /// The render failed.
    RenderFailed(String),
}

impl Action {
    /// Short variant name, safe to log (no payloads such as data URLs).
    pub fn name(&self) -> &'static str {
        match self {
            Action::SetTopic(_) => "set_topic",
            Action::SetScript(_) => "set_script",
            Action::SplitScript => "split_script",
            Action::EditSegmentText { .. } => "edit_segment_text",
            Action::DeleteSegment(_) => "delete_segment",
            Action::MoveSegment { .. } => "move_segment",
            Action::SwapSegments { .. } => "swap_segments",
            Action::SetSegmentImage { .. } => "set_segment_image",
            Action::AssignImages(_) => "assign_images",
            Action::SetImagePlacement { .. } => "set_image_placement",
            Action::SetSubtitlePosition { .. } => "set_subtitle_position",
            Action::SetTextColor { .. } => "set_text_color",
            Action::SetTextSize { .. } => "set_text_size",
            Action::SetApplyStyleToAll(_) => "set_apply_style_to_all",
            Action::SetThumbnailText(_) => "set_thumbnail_text",
            Action::SetThumbnailPosition(_) => "set_thumbnail_position",
            Action::SetThumbnailImage(_) => "set_thumbnail_image",
            Action::SetThumbnailImagePlacement(_) => "set_thumbnail_image_placement",
            Action::SetThumbnailVisible(_) => "set_thumbnail_visible",
            Action::SetThumbnailDuration(_) => "set_thumbnail_duration",
            Action::SetThumbnailTextColor(_) => "set_thumbnail_text_color",
            Action::SetThumbnailTextSize(_) => "set_thumbnail_text_size",
            Action::SetBackground(_) => "set_background",
            Action::SelectSegment(_) => "select_segment",
            Action::SetVoice(_) => "set_voice",
            Action::SpeechStarted(_) => "speech_started",
            Action::SpeechCompleted { .. } => "speech_completed",
            Action::SpeechFailed(_) => "speech_failed",
            Action::SetAudioDuration { .. } => "set_audio_duration",
            Action::RenderStarted => "render_started",
            Action::RenderFinished(_) => "render_finished",
            Action::RenderFailed(_) => "render_failed",
        }
    }
}

/// The whole editable project.
///
/// Never mutated in place by callers: [`ProjectState::reduce`] derives a new state from an
/// [`Action`], replacing the segment collection wholesale.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProjectState {
    /// Topic used for script generation.
    pub topic: String,
    /// Script text, split into segments on demand.
    pub script: String,
    /// Segments in playback order.
    pub segments: Vec<Segment>,
    /// Title/cover overlay.
    pub thumbnail: ThumbnailOverlay,
    /// Image stretched behind every frame.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub background: Option<ImageRef>,
    /// Voice for new speech requests.
    pub voice: Voice,
    /// Segment currently being edited.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub selected: Option<SegmentId>,
    /// Per-segment style edits apply to every segment.
    pub apply_style_to_all: bool,
    /// Render and style configuration.
    pub settings: ProjectSettings,
    /// Render lifecycle; not persisted.
    #[serde(skip)]
    pub render: RenderStatus,
    next_segment_id: u64,
}

impl ProjectState {
    /// Empty project with the given settings.
    pub fn new(settings: ProjectSettings) -> Self {
        Self {
            settings,
            ..Self::default()
        }
    }

    /// Parse a project from JSON, repairing ordering and id allocation.
    pub fn from_json(s: &str) -> ShortreelResult<Self> {
        let mut state: ProjectState = serde_json::from_str(s)?;
        state.segments = renumber(state.segments);
        let max_id = state.segments.iter().map(|s| s.id.0).max();
        if let Some(max_id) = max_id {
            state.next_segment_id = state.next_segment_id.max(max_id + 1);
        }
        state.ensure_selection();
        Ok(state)
    }

    /// Serialize as pretty-printed JSON.
    pub fn to_json_pretty(&self) -> ShortreelResult<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Read a project file.
    pub fn load(path: &Path) -> ShortreelResult<Self> {
        let s = std::fs::read_to_string(path)
            .with_context(|| format!("read project '{}'", path.display()))?;
        Self::from_json(&s)
    }

    /// Write a project file.
    pub fn save(&self, path: &Path) -> ShortreelResult<()> {
        let s = self.to_json_pretty()?;
        std::fs::write(path, s).with_context(|| format!("write project '{}'", path.display()))?;
        Ok(())
    }

    /// Look up a segment by id.
    pub fn segment(&self, id: SegmentId) -> Option<&Segment> {
        self.segments.iter().find(|s| s.id == id)
    }

    /// Position of a segment in playback order.
    pub fn segment_index(&self, id: SegmentId) -> Option<usize> {
        self.segments.iter().position(|s| s.id == id)
    }

    /// Ids of segments that have no synthesized audio yet, in playback order.
    pub fn segments_missing_audio(&self) -> Vec<SegmentId> {
        self.segments
            .iter()
            .filter(|s| s.audio.is_none())
            .map(|s| s.id)
            .collect()
    }

    /// Derive the next state. On error the receiver is the state to keep.
    pub fn reduce(&self, action: Action) -> ShortreelResult<ProjectState> {
        let mut next = self.clone();
        match action {
            Action::SetTopic(topic) => next.topic = topic,
            Action::SetScript(script) => next.script = script,
            Action::SplitScript => {
                let lines = split_script(&self.script);
                if lines.is_empty() {
                    return Err(ShortreelError::validation("script has no non-empty lines"));
                }
                let mut segments = Vec::with_capacity(lines.len());
                for (i, text) in lines.into_iter().enumerate() {
                    let id = next.allocate_id();
                    segments.push(Segment {
                        id,
                        text,
                        audio: None,
                        audio_duration: None,
                        generating: false,
                        image: None,
                        image_placement: self.settings.default_image_placement,
                        subtitle_position: self.settings.default_subtitle_position,
                        text_color: None,
                        text_size: None,
                        order: (i + 1) as u32,
                    });
                }
                next.segments = segments;
                next.selected = None;
            }
            Action::EditSegmentText { id, text } => {
                if text.trim().is_empty() {
                    return Err(ShortreelError::validation("segment text must not be empty"));
                }
                next.segments = map_segment(&self.segments, id, |s| s.with_text(&text));
            }
            Action::DeleteSegment(id) => {
                next.segments = renumber(
                    self.segments
                        .iter()
                        .filter(|s| s.id != id)
                        .cloned()
                        .collect(),
                );
            }
            Action::MoveSegment { from, to } => {
                self.check_index(from)?;
                self.check_index(to)?;
                if from != to {
                    let mut segments = self.segments.clone();
                    let moved = segments.remove(from);
                    segments.insert(to, moved);
                    next.segments = renumber(segments);
                }
            }
            Action::SwapSegments { a, b } => {
                self.check_index(a)?;
                self.check_index(b)?;
                let mut segments = self.segments.clone();
                segments.swap(a, b);
                next.segments = renumber(segments);
            }
            Action::SetSegmentImage { id, image } => {
                next.segments = map_segment(&self.segments, id, |s| self.attach_image(s, &image));
            }
            Action::AssignImages(images) => {
                let mut pending = images.into_iter();
                next.segments = self
                    .segments
                    .iter()
                    .map(|s| {
                        if s.image.is_some() {
                            return s.clone();
                        }
                        match pending.next() {
                            Some(img) => self.attach_image(s, &Some(img)),
                            None => s.clone(),
                        }
                    })
                    .collect();
            }
            Action::SetImagePlacement { id, placement } => {
                check_placement(placement)?;
                next.segments = map_segment(&self.segments, id, |s| Segment {
                    image_placement: placement,
                    ..s.clone()
                });
            }
            Action::SetSubtitlePosition { id, position } => {
                check_pct(position, "subtitle position")?;
                next.segments = map_segment(&self.segments, id, |s| Segment {
                    subtitle_position: position,
                    ..s.clone()
                });
            }
            Action::SetTextColor { id, color } => {
                let restyle = |s: &Segment| Segment {
                    text_color: Some(color),
                    ..s.clone()
                };
                next.segments = if self.apply_style_to_all {
                    self.segments.iter().map(restyle).collect()
                } else {
                    map_segment(&self.segments, id, restyle)
                };
            }
            Action::SetTextSize { id, size } => {
                check_in(&SUBTITLE_TEXT_SIZE_RANGE, size, "subtitle size")?;
                let restyle = |s: &Segment| Segment {
                    text_size: Some(size),
                    ..s.clone()
                };
                next.segments = if self.apply_style_to_all {
                    self.segments.iter().map(restyle).collect()
                } else {
                    map_segment(&self.segments, id, restyle)
                };
            }
            Action::SetApplyStyleToAll(on) => next.apply_style_to_all = on,
            Action::SetThumbnailText(text) => next.thumbnail.text = text,
            Action::SetThumbnailPosition(position) => {
                check_pct(position, "thumbnail position")?;
                next.thumbnail.position = position;
            }
            Action::SetThumbnailImage(image) => next.thumbnail.image = image,
            Action::SetThumbnailImagePlacement(placement) => {
                check_placement(placement)?;
                next.thumbnail.image_placement = placement;
            }
            Action::SetThumbnailVisible(visible) => next.thumbnail.visible = visible,
            Action::SetThumbnailDuration(secs) => {
                check_in(&THUMBNAIL_DURATION_RANGE, secs, "thumbnail duration")?;
                next.thumbnail.duration_secs = secs;
            }
            Action::SetThumbnailTextColor(color) => {
                next.thumbnail.text_color = color;
                next.segments = self
                    .segments
                    .iter()
                    .map(|s| Segment {
                        text_color: Some(color),
                        ..s.clone()
                    })
                    .collect();
            }
            Action::SetThumbnailTextSize(size) => {
                check_in(&THUMBNAIL_TEXT_SIZE_RANGE, size, "thumbnail text size")?;
                next.thumbnail.text_size = size;
                next.segments = self
                    .segments
                    .iter()
                    .map(|s| Segment {
                        text_size: Some(size),
                        ..s.clone()
                    })
                    .collect();
            }
            Action::SetBackground(image) => next.background = image,
            Action::SelectSegment(id) => {
                if id.is_none_or(|id| self.segment(id).is_some()) {
                    next.selected = id;
                }
            }
            Action::SetVoice(voice) => next.voice = voice,
            Action::SpeechStarted(id) => {
                next.segments = map_segment(&self.segments, id, |s| Segment {
                    generating: true,
                    ..s.clone()
                });
            }
            Action::SpeechCompleted { id, text, clip } => {
                check_duration(clip.duration_secs)?;
                next.segments = map_segment(&self.segments, id, |s| {
                    if s.text != text {
                        // Synthesized from text that has since been edited.
                        return Segment {
                            generating: false,
                            ..s.clone()
                        };
                    }
                    Segment {
                        audio: Some(clip.audio.clone()),
                        audio_duration: Some(clip.duration_secs),
                        generating: false,
                        ..s.clone()
                    }
                });
            }
            Action::SpeechFailed(id) => {
                next.segments = map_segment(&self.segments, id, |s| Segment {
                    generating: false,
                    ..s.clone()
                });
            }
            Action::SetAudioDuration { id, secs } => {
                check_duration(secs)?;
                next.segments = map_segment(&self.segments, id, |s| {
                    if s.audio.is_none() {
                        return s.clone();
                    }
                    Segment {
                        audio_duration: Some(secs),
                        ..s.clone()
                    }
                });
            }
            Action::RenderStarted => {
                if self.render == RenderStatus::InProgress {
                    return Err(ShortreelError::validation("a render is already in progress"));
                }
                next.render = RenderStatus::InProgress;
            }
            Action::RenderFinished(video) => next.render = RenderStatus::Ready(video),
            Action::RenderFailed(message) => next.render = RenderStatus::Failed(message),
        }
        next.ensure_selection();
        Ok(next)
    }

    fn allocate_id(&mut self) -> SegmentId {
        let id = SegmentId(self.next_segment_id);
        self.next_segment_id += 1;
        id
    }

    fn attach_image(&self, s: &Segment, image: &Option<ImageRef>) -> Segment {
        match image {
            Some(img) => Segment {
                image: Some(img.clone()),
                image_placement: self.settings.default_image_placement,
                subtitle_position: self.settings.image_subtitle_position,
                ..s.clone()
            },
            None => Segment {
                image: None,
                ..s.clone()
            },
        }
    }

    fn check_index(&self, index: usize) -> ShortreelResult<()> {
        if index >= self.segments.len() {
            return Err(ShortreelError::validation(format!(
                "segment index {index} out of range (have {})",
                self.segments.len()
            )));
        }
        Ok(())
    }

    fn ensure_selection(&mut self) {
        if let Some(id) = self.selected
            && self.segment(id).is_none()
        {
            self.selected = None;
        }
        if self.selected.is_none() {
            self.selected = self.segments.first().map(|s| s.id);
        }
    }
}

/// Map over the collection, replacing only the segment with `id`. Unknown ids leave every
/// segment untouched.
fn map_segment(
    segments: &[Segment],
    id: SegmentId,
    f: impl Fn(&Segment) -> Segment,
) -> Vec<Segment> {
    segments
        .iter()
        .map(|s| if s.id == id { f(s) } else { s.clone() })
        .collect()
}

fn renumber(segments: Vec<Segment>) -> Vec<Segment> {
    segments
        .into_iter()
        .enumerate()
        .map(|(i, s)| Segment {
            order: (i + 1) as u32,
            ..s
        })
        .collect()
}

fn check_in(range: &RangeInclusive<f64>, v: f64, what: &str) -> ShortreelResult<()> {
    if !v.is_finite() || !range.contains(&v) {
        return Err(ShortreelError::validation(format!(
            "{what} must be within {}..={}, got {v}",
            range.start(),
            range.end()
        )));
    }
    Ok(())
}

fn check_pct(p: PctPoint, what: &str) -> ShortreelResult<()> {
    if !p.is_within_surface() {
        return Err(ShortreelError::validation(format!(
            "{what} must be within 0..=100 percent, got ({}, {})",
            p.x, p.y
        )));
    }
    Ok(())
}

fn check_placement(p: ImagePlacement) -> ShortreelResult<()> {
    check_pct(p.anchor(), "image position")?;
    check_in(&IMAGE_SCALE_RANGE, p.scale, "image scale")
}

fn check_duration(secs: f64) -> ShortreelResult<()> {
    if !secs.is_finite() || secs < 0.0 {
        return Err(ShortreelError::service(format!(
            "audio duration must be finite and >= 0, got {secs}"
        )));
    }
    Ok(())
}

/// Copy-on-write holder of the current [`ProjectState`].
///
/// Each dispatch swaps in a whole new state; snapshots taken earlier (for example by a running
/// render) keep observing the state they were taken from.
#[derive(Clone, Debug, Default)]
pub struct ProjectStore {
    current: Arc<ProjectState>,
}

impl ProjectStore {
    /// Wrap an initial state.
    pub fn new(state: ProjectState) -> Self {
        Self {
            current: Arc::new(state),
        }
    }

    /// Borrow the current state.
    pub fn state(&self) -> &ProjectState {
        &self.current
    }

    /// Cheap shared handle to the current state.
    pub fn snapshot(&self) -> Arc<ProjectState> {
        Arc::clone(&self.current)
    }

    /// Apply an action. On error the current state is left unchanged.
    pub fn dispatch(&mut self, action: Action) -> ShortreelResult<()> {
        let name = action.name();
        match self.current.reduce(action) {
            Ok(next) => {
                tracing::debug!(action = name, segments = next.segments.len(), "dispatch");
                self.current = Arc::new(next);
                Ok(())
            }
            Err(e) => {
                tracing::debug!(action = name, error = %e, "dispatch rejected");
                Err(e)
            }
        }
    }

    /// Take the current state out of the store.
    pub fn into_state(self) -> ProjectState {
        Arc::unwrap_or_clone(self.current)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/project/state.rs"]
mod tests;
