use std::ops::RangeInclusive;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::foundation::color::Color;
use crate::foundation::core::{Canvas, Fps};
use crate::project::model::{ImagePlacement, PctPoint};

/// Allowed thumbnail cover durations in seconds.
pub const THUMBNAIL_DURATION_RANGE: RangeInclusive<f64> = 0.5..=5.0;
/// Allowed image scales.
pub const IMAGE_SCALE_RANGE: RangeInclusive<f64> = 0.5..=2.0;
/// Allowed thumbnail title sizes in preview pixels.
pub const THUMBNAIL_TEXT_SIZE_RANGE: RangeInclusive<f64> = 16.0..=64.0;
/// Allowed subtitle sizes in preview pixels.
pub const SUBTITLE_TEXT_SIZE_RANGE: RangeInclusive<f64> = 16.0..=48.0;
/// Drag gestures keep anchors inside this percentage band.
pub const DRAG_PCT_RANGE: RangeInclusive<f64> = 10.0..=90.0;

/// Whether the thumbnail title stays on screen after the cover slice ends.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TitleMode {
    /// Title is drawn on every frame of the video, acting as a running title.
    #[default]
    Persistent,
    /// Title is drawn only during the thumbnail slice.
    CoverOnly,
}

/// Text outline drawn under every glyph run.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct OutlineStyle {
    /// Outline color.
    pub color: Color,
    /// Stroke width in preview pixels; `0` disables the outline.
    pub width: f64,
}

impl Default for OutlineStyle {
    fn default() -> Self {
        Self {
            color: Color::BLACK,
            width: 2.0,
        }
    }
}

/// Render and styling configuration carried by a project.
///
/// Lengths named "preview pixels" are measured on the editor surface, which is
/// `preview_height` pixels tall, and scaled to the output canvas by the coordinate mapper.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProjectSettings {
    /// Output resolution.
    pub canvas: Canvas,
    /// Output frame rate.
    pub fps: Fps,
    /// Height of the editor preview surface in pixels.
    pub preview_height: f64,
    /// Image footprint at scale 1, in preview pixels.
    pub base_image_width: f64,
    /// Image footprint at scale 1, in preview pixels.
    pub base_image_height: f64,
    /// Placement assigned to newly attached segment images.
    pub default_image_placement: ImagePlacement,
    /// Subtitle anchor for freshly split segments.
    pub default_subtitle_position: PctPoint,
    /// Subtitle anchor applied when an image is attached to a segment.
    pub image_subtitle_position: PctPoint,
    /// Fraction of the canvas width a wrapped line may occupy.
    pub wrap_ratio: f64,
    /// Subtitle color when a segment has no override.
    pub subtitle_color: Color,
    /// Subtitle size in preview pixels when a segment has no override.
    pub subtitle_size: f64,
    /// Minimum distance between wrapped lines in preview pixels. Text larger than this
    /// stride uses 1.2 times its size instead.
    pub line_height: f64,
    /// Outline drawn under all overlay text.
    pub outline: OutlineStyle,
    /// Fill used when no background image is set.
    pub background_color: Color,
    /// Thumbnail title persistence.
    pub title_mode: TitleMode,
    /// Seconds assumed for a segment without synthesized audio.
    pub fallback_segment_secs: f64,
    /// Font file used for all overlay text; system sans-serif bold when unset.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub font_path: Option<PathBuf>,
}

impl ProjectSettings {
    /// Line stride in preview pixels for text of `size` preview pixels.
    pub fn line_stride(&self, size: f64) -> f64 {
        self.line_height.max(size * 1.2)
    }
}

impl Default for ProjectSettings {
    fn default() -> Self {
        Self {
            canvas: Canvas::default(),
            fps: Fps::default(),
            preview_height: 640.0,
            base_image_width: 150.0,
            base_image_height: 100.0,
            default_image_placement: ImagePlacement::new(50.0, 50.0, 1.5),
            default_subtitle_position: PctPoint::new(50.0, 75.0),
            image_subtitle_position: PctPoint::new(50.0, 80.0),
            wrap_ratio: 0.8,
            subtitle_color: Color::WHITE,
            subtitle_size: 24.0,
            line_height: 30.0,
            outline: OutlineStyle::default(),
            background_color: Color::BLACK,
            title_mode: TitleMode::Persistent,
            fallback_segment_secs: 2.0,
            font_path: None,
        }
    }
}
