use kurbo::Rect;

use crate::assets::store::AssetId;
use crate::foundation::color::Color;
use crate::foundation::core::Canvas;
use crate::layout::text::PlacedLine;
use crate::timeline::Phase;

/// Outline stroked under text glyphs.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Outline {
    /// Stroke color.
    pub color: Color,
    /// Stroke width in output pixels.
    pub width_px: f64,
}

/// Wrapped, positioned text drawn stroke first, then fill.
#[derive(Clone, Debug, PartialEq)]
pub struct TextBlock {
    /// Lines in top-to-bottom order.
    pub lines: Vec<PlacedLine>,
    /// Font size in output pixels.
    pub size_px: f64,
    /// Fill color.
    pub fill: Color,
    /// Optional outline.
    pub outline: Option<Outline>,
}

/// One backend-agnostic drawing step.
#[derive(Clone, Debug, PartialEq)]
pub enum DrawOp {
    /// Fill the whole canvas.
    Fill(Color),
    /// Draw a prepared image scaled into `dest`.
    Image {
        /// Prepared image.
        asset: AssetId,
        /// Destination rectangle in output pixels.
        dest: Rect,
    },
    /// Draw a text block.
    Text(TextBlock),
}

/// Everything drawn for one frame, in painter's order.
#[derive(Clone, Debug, PartialEq)]
pub struct FramePlan {
    /// Output surface.
    pub canvas: Canvas,
    /// Time the frame was composed for.
    pub t: f64,
    /// Phase active at `t`.
    pub phase: Phase,
    /// Draw steps, back to front.
    pub ops: Vec<DrawOp>,
}
