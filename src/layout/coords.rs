use kurbo::{Point, Rect, Size};

use crate::foundation::core::Canvas;
use crate::foundation::error::{ShortreelError, ShortreelResult};
use crate::project::model::{ImagePlacement, PctPoint};
use crate::project::settings::ProjectSettings;

/// Linear percent to pixel conversion: `pixel = pct / 100 * dimension`.
pub fn to_pixel(pct: PctPoint, surface: Size) -> Point {
    Point::new(pct.x / 100.0 * surface.width, pct.y / 100.0 * surface.height)
}

/// Fit an image of `natural` size inside `base * scale`, preserving its aspect ratio.
///
/// The relatively larger dimension is clamped to its bound and the other is derived from the
/// aspect ratio. Returns `None` for non-positive or non-finite inputs.
pub fn fit_contain(natural: Size, base: Size, scale: f64) -> Option<Size> {
    let positive = |v: f64| v.is_finite() && v > 0.0;
    if !(positive(natural.width)
        && positive(natural.height)
        && positive(base.width)
        && positive(base.height)
        && positive(scale))
    {
        return None;
    }

    let bound = Size::new(base.width * scale, base.height * scale);
    let aspect = natural.width / natural.height;
    if aspect > bound.width / bound.height {
        Some(Size::new(bound.width, bound.width / aspect))
    } else {
        Some(Size::new(bound.height * aspect, bound.height))
    }
}

/// Maps editor coordinates (percent anchors, lengths in preview pixels) onto one surface.
///
/// The preview and the encoded output each get a mapper over the same settings, so both place
/// overlays with identical math and differ only by `unit`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CoordinateMapper {
    surface: Size,
    unit: f64,
    base: Size,
}

impl CoordinateMapper {
    /// Mapper over `surface`, where one preview pixel spans `unit` surface pixels and `base`
    /// is the image footprint at scale 1 in preview pixels.
    pub fn new(surface: Size, unit: f64, base: Size) -> ShortreelResult<Self> {
        let positive = |v: f64| v.is_finite() && v > 0.0;
        if !(positive(surface.width) && positive(surface.height)) {
            return Err(ShortreelError::validation("mapper surface must be positive"));
        }
        if !positive(unit) {
            return Err(ShortreelError::validation("mapper unit must be positive"));
        }
        if !(positive(base.width) && positive(base.height)) {
            return Err(ShortreelError::validation(
                "base image footprint must be positive",
            ));
        }
        Ok(Self {
            surface,
            unit,
            base,
        })
    }

    /// Mapper for the encoded output canvas.
    pub fn for_output(settings: &ProjectSettings) -> ShortreelResult<Self> {
        settings.canvas.validate()?;
        let canvas = settings.canvas.size();
        Self::new(
            canvas,
            preview_ratio(settings.canvas, settings.preview_height)?,
            base_size(settings),
        )
    }

    /// Mapper for the editor preview surface (`preview_height` tall, canvas aspect).
    pub fn for_preview(settings: &ProjectSettings) -> ShortreelResult<Self> {
        settings.canvas.validate()?;
        let ratio = preview_ratio(settings.canvas, settings.preview_height)?;
        let canvas = settings.canvas.size();
        Self::new(
            Size::new(canvas.width / ratio, canvas.height / ratio),
            1.0,
            base_size(settings),
        )
    }

    /// Surface size in pixels.
    pub fn surface(&self) -> Size {
        self.surface
    }

    /// Surface pixels per preview pixel.
    pub fn preview_scale(&self) -> f64 {
        self.unit
    }

    /// Convert a length in preview pixels to surface pixels.
    pub fn scale_len(&self, preview_px: f64) -> f64 {
        preview_px * self.unit
    }

    /// Percent anchor to surface pixels.
    pub fn to_pixel(&self, pct: PctPoint) -> Point {
        to_pixel(pct, self.surface)
    }

    /// Surface pixels to percent anchor (inverse of [`Self::to_pixel`]).
    pub fn to_percent(&self, p: Point) -> PctPoint {
        PctPoint::new(
            p.x / self.surface.width * 100.0,
            p.y / self.surface.height * 100.0,
        )
    }

    /// Image footprint at scale 1 in surface pixels.
    pub fn base_size(&self) -> Size {
        Size::new(self.scale_len(self.base.width), self.scale_len(self.base.height))
    }

    /// Destination rectangle of an image with `natural` size, contain-fitted and centered on the
    /// placement anchor.
    pub fn place_image(&self, natural: Size, placement: ImagePlacement) -> Option<Rect> {
        let size = fit_contain(natural, self.base_size(), placement.scale)?;
        let center = self.to_pixel(placement.anchor());
        Some(Rect::from_center_size(center, size))
    }
}

fn base_size(settings: &ProjectSettings) -> Size {
    Size::new(settings.base_image_width, settings.base_image_height)
}

fn preview_ratio(canvas: Canvas, preview_height: f64) -> ShortreelResult<f64> {
    if !preview_height.is_finite() || preview_height <= 0.0 {
        return Err(ShortreelError::validation("preview_height must be positive"));
    }
    Ok(f64::from(canvas.height) / preview_height)
}

#[cfg(test)]
#[path = "../../tests/unit/layout/coords.rs"]
mod tests;
