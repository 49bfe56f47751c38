use kurbo::{Point, Rect};

use crate::assets::store::{AssetId, PreparedAssetStore};
use crate::compose::plan::{DrawOp, FramePlan, Outline, TextBlock};
use crate::foundation::color::Color;
use crate::foundation::core::{Canvas, Fps, FrameIndex};
use crate::foundation::error::{ShortreelError, ShortreelResult};
use crate::layout::coords::CoordinateMapper;
use crate::layout::text::{TextMeasure, stack_lines, wrap};
use crate::project::model::{ImagePlacement, ImageRef, PctPoint};
use crate::project::settings::{ProjectSettings, TitleMode};
use crate::project::state::ProjectState;
use crate::timeline::{Phase, Timeline};

#[derive(Clone, Debug, PartialEq)]
struct SegmentLayer {
    image: Option<DrawOp>,
    subtitle: Option<TextBlock>,
}

/// Render-ready snapshot of a project.
///
/// Building a scene does all placement work once (timeline, contain fitting, word wrap);
/// [`Scene::compose_frame`] then only selects and orders precomputed draw steps.
#[derive(Clone, Debug, PartialEq)]
pub struct Scene {
    canvas: Canvas,
    timeline: Timeline,
    title_mode: TitleMode,
    background: DrawOp,
    thumbnail_image: Option<DrawOp>,
    thumbnail_text: Option<TextBlock>,
    segments: Vec<SegmentLayer>,
}

impl Scene {
    /// Lay out every overlay of `state` for the output canvas.
    ///
    /// Every image the project references must already be in `assets`.
    #[tracing::instrument(skip_all, fields(segments = state.segments.len()))]
    pub fn build(
        state: &ProjectState,
        assets: &PreparedAssetStore,
        measure: &mut dyn TextMeasure,
    ) -> ShortreelResult<Self> {
        let settings = &state.settings;
        let mapper = CoordinateMapper::for_output(settings)?;
        let timeline = Timeline::from_project(state)?;
        let mut text = TextPlacer {
            settings,
            mapper: &mapper,
            measure,
        };

        let background = match &state.background {
            Some(img) => DrawOp::Image {
                asset: asset_id(assets, img)?,
                dest: Rect::from_origin_size(Point::ZERO, mapper.surface()),
            },
            None => DrawOp::Fill(settings.background_color),
        };

        let thumb = &state.thumbnail;
        let thumbnail_image = thumb
            .image
            .as_ref()
            .map(|img| place_image(assets, &mapper, img, thumb.image_placement))
            .transpose()?
            .flatten();
        let thumbnail_text = if thumb.visible {
            text.block(&thumb.text, thumb.position, thumb.text_size, thumb.text_color)?
        } else {
            None
        };

        let mut segments = Vec::with_capacity(state.segments.len());
        for seg in &state.segments {
            let image = seg
                .image
                .as_ref()
                .map(|img| place_image(assets, &mapper, img, seg.image_placement))
                .transpose()?
                .flatten();
            let subtitle = text.block(
                &seg.text,
                seg.subtitle_position,
                seg.text_size.unwrap_or(settings.subtitle_size),
                seg.text_color.unwrap_or(settings.subtitle_color),
            )?;
            segments.push(SegmentLayer { image, subtitle });
        }

        Ok(Self {
            canvas: settings.canvas,
            timeline,
            title_mode: settings.title_mode,
            background,
            thumbnail_image,
            thumbnail_text,
            segments,
        })
    }

    /// Output surface.
    pub fn canvas(&self) -> Canvas {
        self.canvas
    }

    /// Timeline the scene was built with.
    pub fn timeline(&self) -> &Timeline {
        &self.timeline
    }

    /// Draw steps for the frame at `t` seconds.
    ///
    /// Order: background, then either the thumbnail image and title (thumbnail phase) or the
    /// title (unless the title is cover-only), segment image and subtitle (segment phase).
    /// Absent optional overlays are skipped.
    pub fn compose_frame(&self, t: f64) -> FramePlan {
        let resolved = self.timeline.resolve(t);
        let mut ops = vec![self.background.clone()];
        match resolved.phase {
            Phase::Thumbnail => {
                ops.extend(self.thumbnail_image.clone());
                ops.extend(self.thumbnail_text.clone().map(DrawOp::Text));
            }
            Phase::Segment { index } => {
                if self.title_mode == TitleMode::Persistent {
                    ops.extend(self.thumbnail_text.clone().map(DrawOp::Text));
                }
                if let Some(layer) = self.segments.get(index) {
                    ops.extend(layer.image.clone());
                    ops.extend(layer.subtitle.clone().map(DrawOp::Text));
                }
            }
        }
        FramePlan {
            canvas: self.canvas,
            t,
            phase: resolved.phase,
            ops,
        }
    }

    /// Draw steps for frame `idx` at `fps` (`t = idx / fps`).
    pub fn compose_index(&self, idx: FrameIndex, fps: Fps) -> FramePlan {
        self.compose_frame(fps.frames_to_secs(idx.0))
    }
}

struct TextPlacer<'a> {
    settings: &'a ProjectSettings,
    mapper: &'a CoordinateMapper,
    measure: &'a mut dyn TextMeasure,
}

impl TextPlacer<'_> {
    fn block(
        &mut self,
        text: &str,
        anchor: PctPoint,
        size_preview: f64,
        fill: Color,
    ) -> ShortreelResult<Option<TextBlock>> {
        if text.trim().is_empty() {
            return Ok(None);
        }
        if !size_preview.is_finite() || size_preview <= 0.0 {
            return Err(ShortreelError::validation(format!(
                "text size must be > 0, got {size_preview}"
            )));
        }

        let size_px = self.mapper.scale_len(size_preview);
        let limit = self.mapper.surface().width * self.settings.wrap_ratio;
        let stride = self
            .mapper
            .scale_len(self.settings.line_stride(size_preview));
        let measure = &mut *self.measure;
        let lines = wrap(text, limit, |s| measure.measure(s, size_px));
        let lines = stack_lines(&lines, self.mapper.to_pixel(anchor), stride, |s| {
            measure.measure(s, size_px)
        });

        let outline = self.settings.outline;
        let outline = (outline.width > 0.0).then(|| Outline {
            color: outline.color,
            width_px: self.mapper.scale_len(outline.width),
        });
        Ok(Some(TextBlock {
            lines,
            size_px,
            fill,
            outline,
        }))
    }
}

fn asset_id(assets: &PreparedAssetStore, img: &ImageRef) -> ShortreelResult<AssetId> {
    assets.image_for(img).map(|(id, _)| id).ok_or_else(|| {
        ShortreelError::evaluation(format!(
            "image {:?} was not prepared before composing",
            img.name
        ))
    })
}

fn place_image(
    assets: &PreparedAssetStore,
    mapper: &CoordinateMapper,
    img: &ImageRef,
    placement: ImagePlacement,
) -> ShortreelResult<Option<DrawOp>> {
    let id = asset_id(assets, img)?;
    let prepared = assets.image(id)?;
    Ok(mapper
        .place_image(prepared.natural_size(), placement)
        .map(|dest| DrawOp::Image { asset: id, dest }))
}

#[cfg(test)]
#[path = "../../tests/unit/compose/compositor.rs"]
mod tests;
