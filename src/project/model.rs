use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::foundation::color::Color;

/// Stable identifier of a segment, unique for the lifetime of a project.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct SegmentId(pub u64);

impl std::fmt::Display for SegmentId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "segment-{}", self.0)
    }
}

/// A point expressed in percent of the surface it lives on (`0..=100` on both axes).
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct PctPoint {
    /// Horizontal position in percent of the surface width.
    pub x: f64,
    /// Vertical position in percent of the surface height.
    pub y: f64,
}

impl PctPoint {
    /// Construct a percentage point.
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Surface center.
    pub const CENTER: Self = Self::new(50.0, 50.0);

    pub(crate) fn is_within_surface(self) -> bool {
        (0.0..=100.0).contains(&self.x) && (0.0..=100.0).contains(&self.y)
    }
}

/// Image anchor (center) in percent plus a uniform scale relative to the base footprint.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct ImagePlacement {
    /// Horizontal center in percent of the surface width.
    pub x: f64,
    /// Vertical center in percent of the surface height.
    pub y: f64,
    /// Uniform scale applied to the base footprint.
    pub scale: f64,
}

impl ImagePlacement {
    /// Construct a placement.
    pub const fn new(x: f64, y: f64, scale: f64) -> Self {
        Self { x, y, scale }
    }

    /// Anchor point of the placement.
    pub fn anchor(self) -> PctPoint {
        PctPoint::new(self.x, self.y)
    }

    /// Same scale, new anchor.
    pub fn with_anchor(self, anchor: PctPoint) -> Self {
        Self {
            x: anchor.x,
            y: anchor.y,
            scale: self.scale,
        }
    }
}

/// Where the bytes of an image live.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ImageSource {
    /// Filesystem path; relative paths resolve against the project root.
    Path(PathBuf),
    /// Inline `data:<mime>;base64,<payload>` URL as produced by the image store.
    DataUrl(String),
}

/// A user-supplied image attached to a segment, the thumbnail, or the background.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ImageRef {
    /// Image bytes location.
    pub source: ImageSource,
    /// Original file name, for display only.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

impl ImageRef {
    /// Reference an image on disk.
    pub fn path(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned());
        Self {
            source: ImageSource::Path(path),
            name,
        }
    }
}

/// Handle to a synthesized speech resource: a file path or a URL `ffmpeg` can read.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AudioRef(pub String);

impl AudioRef {
    /// Borrow the location string.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Output of a speech synthesis request.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SpeechClip {
    /// Synthesized audio.
    pub audio: AudioRef,
    /// Clip length in seconds.
    pub duration_secs: f64,
}

/// Closed set of voice presets passed opaquely to the speech collaborator.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Voice {
    /// First female preset.
    #[default]
    Female1,
    /// Second female preset.
    Female2,
    /// First male preset.
    Male1,
    /// Second male preset.
    Male2,
}

impl Voice {
    /// Every preset, in display order.
    pub const ALL: [Voice; 4] = [Voice::Female1, Voice::Female2, Voice::Male1, Voice::Male2];

    /// Stable identifier handed to synthesizers.
    pub fn id(self) -> &'static str {
        match self {
            Voice::Female1 => "female1",
            Voice::Female2 => "female2",
            Voice::Male1 => "male1",
            Voice::Male2 => "male2",
        }
    }

    /// Human-readable label.
    pub fn label(self) -> &'static str {
        match self {
            Voice::Female1 => "Female voice 1",
            Voice::Female2 => "Female voice 2",
            Voice::Male1 => "Male voice 1",
            Voice::Male2 => "Male voice 2",
        }
    }
}

impl std::str::FromStr for Voice {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Voice::ALL
            .into_iter()
            .find(|v| v.id() == s)
            .ok_or_else(|| format!("unknown voice '{s}' (expected female1, female2, male1, male2)"))
    }
}

/// One spoken/subtitle unit of the final video.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Segment {
    /// Stable identifier.
    pub id: SegmentId,
    /// Subtitle and spoken text.
    pub text: String,
    /// Synthesized speech for `text`, cleared whenever `text` changes.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub audio: Option<AudioRef>,
    /// Length of `audio` in seconds.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub audio_duration: Option<f64>,
    /// A speech request for this segment is in flight.
    #[serde(default)]
    pub generating: bool,
    /// Segment image.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<ImageRef>,
    /// Image anchor and scale.
    pub image_placement: ImagePlacement,
    /// Subtitle anchor.
    pub subtitle_position: PctPoint,
    /// Subtitle color override.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text_color: Option<Color>,
    /// Subtitle size override in preview pixels.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text_size: Option<f64>,
    /// 1-based display and playback rank; always equals array position + 1.
    pub order: u32,
}

impl Segment {
    /// Seconds this segment occupies on the timeline.
    pub fn duration_secs(&self, fallback_secs: f64) -> f64 {
        self.audio_duration.unwrap_or(fallback_secs)
    }

    /// Return a copy with `text` replaced, dropping audio when the text actually changes.
    pub(crate) fn with_text(&self, text: &str) -> Segment {
        if self.text == text {
            return self.clone();
        }
        Segment {
            text: text.to_owned(),
            audio: None,
            audio_duration: None,
            ..self.clone()
        }
    }
}

/// Global title/cover overlay shown from t=0.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ThumbnailOverlay {
    /// Title text.
    pub text: String,
    /// Title anchor.
    pub position: PctPoint,
    /// Title color.
    pub text_color: Color,
    /// Title size in preview pixels.
    pub text_size: f64,
    /// Length of the leading cover slice in seconds.
    pub duration_secs: f64,
    /// Cover image.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image: Option<ImageRef>,
    /// Cover image anchor and scale.
    pub image_placement: ImagePlacement,
    /// Whether the title text is drawn at all.
    pub visible: bool,
}

impl Default for ThumbnailOverlay {
    fn default() -> Self {
        Self {
            text: "Enter a thumbnail title".to_owned(),
            position: PctPoint::new(50.0, 30.0),
            text_color: Color::WHITE,
            text_size: 32.0,
            duration_secs: 1.0,
            image: None,
            image_placement: ImagePlacement::new(50.0, 50.0, 1.0),
            visible: true,
        }
    }
}
