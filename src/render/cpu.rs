use std::collections::HashMap;
use std::sync::Arc;

use crate::assets::decode::PreparedImage;
use crate::assets::font::{PreparedFont, TextBrushRgba8, TextLayoutEngine};
use crate::assets::store::{AssetId, PreparedAssetStore};
use crate::compose::plan::{DrawOp, FramePlan, TextBlock};
use crate::foundation::color::Color;
use crate::foundation::error::{ShortreelError, ShortreelResult};
use crate::layout::text::PlacedLine;
use crate::render::backend::{FrameRGBA, RenderBackend};

const LAYOUT_CACHE_LIMIT: usize = 256;

/// Options for the CPU backend.
#[derive(Clone, Debug, Default)]
pub struct CpuBackendOpts {
    /// Font used for text steps. Plans containing text fail without one.
    pub font: Option<PreparedFont>,
}

impl CpuBackendOpts {
    /// Return options with `font` configured.
    pub fn with_font(mut self, font: PreparedFont) -> Self {
        self.font = Some(font);
        self
    }
}

#[derive(Clone)]
struct ImagePaint {
    paint: vello_cpu::Image,
    w: u32,
    h: u32,
}

#[derive(Clone, Debug, PartialEq, Eq, Hash)]
struct LayoutKey {
    text: String,
    size_bits: u32,
}

/// CPU raster backend powered by `vello_cpu`.
pub struct CpuBackend {
    ctx: Option<vello_cpu::RenderContext>,
    font: Option<(PreparedFont, vello_cpu::peniko::FontData)>,
    text_engine: TextLayoutEngine,
    image_cache: HashMap<AssetId, ImagePaint>,
    layout_cache: HashMap<LayoutKey, Arc<parley::Layout<TextBrushRgba8>>>,
}

impl CpuBackend {
    /// Create a backend.
    pub fn new(opts: CpuBackendOpts) -> Self {
        Self {
            ctx: None,
            font: opts.font.map(|f| {
                let data = f.font_data();
                (f, data)
            }),
            text_engine: TextLayoutEngine::new(),
            image_cache: HashMap::new(),
            layout_cache: HashMap::new(),
        }
    }

    fn with_ctx_mut<R>(
        &mut self,
        width: u16,
        height: u16,
        f: impl FnOnce(&mut Self, &mut vello_cpu::RenderContext) -> ShortreelResult<R>,
    ) -> ShortreelResult<R> {
        let mut ctx = match self.ctx.take() {
            Some(ctx) if ctx.width() == width && ctx.height() == height => ctx,
            _ => vello_cpu::RenderContext::new(width, height),
        };
        ctx.reset();
        let out = f(self, &mut ctx);
        self.ctx = Some(ctx);
        out
    }

    fn image_paint_for(
        &mut self,
        assets: &PreparedAssetStore,
        id: AssetId,
    ) -> ShortreelResult<ImagePaint> {
        if let Some(p) = self.image_cache.get(&id) {
            return Ok(p.clone());
        }
        let prepared = assets.image(id)?;
        let out = ImagePaint {
            paint: image_from_prepared(prepared)?,
            w: prepared.width,
            h: prepared.height,
        };
        self.image_cache.insert(id, out.clone());
        Ok(out)
    }

    fn layout_for(
        &mut self,
        text: &str,
        size_px: f32,
    ) -> ShortreelResult<Arc<parley::Layout<TextBrushRgba8>>> {
        let key = LayoutKey {
            text: text.to_owned(),
            size_bits: size_px.to_bits(),
        };
        if let Some(layout) = self.layout_cache.get(&key) {
            return Ok(Arc::clone(layout));
        }
        let (font, _) = self
            .font
            .as_ref()
            .ok_or_else(|| ShortreelError::evaluation("text drawing requires a font"))?;
        let layout = Arc::new(self.text_engine.layout_line(
            text,
            font,
            size_px,
            TextBrushRgba8::default(),
        )?);
        if self.layout_cache.len() >= LAYOUT_CACHE_LIMIT {
            self.layout_cache.clear();
        }
        self.layout_cache.insert(key, Arc::clone(&layout));
        Ok(layout)
    }

    fn draw_op(
        &mut self,
        op: &DrawOp,
        assets: &PreparedAssetStore,
        canvas: (f64, f64),
        ctx: &mut vello_cpu::RenderContext,
    ) -> ShortreelResult<()> {
        ctx.set_paint_transform(vello_cpu::kurbo::Affine::IDENTITY);
        match op {
            DrawOp::Fill(c) => {
                ctx.set_transform(vello_cpu::kurbo::Affine::IDENTITY);
                ctx.set_paint(paint_color(*c));
                ctx.fill_rect(&vello_cpu::kurbo::Rect::new(0.0, 0.0, canvas.0, canvas.1));
            }
            DrawOp::Image { asset, dest } => {
                let p = self.image_paint_for(assets, *asset)?;
                if dest.width() <= 0.0 || dest.height() <= 0.0 {
                    return Ok(());
                }
                let sx = dest.width() / f64::from(p.w);
                let sy = dest.height() / f64::from(p.h);
                ctx.set_transform(
                    vello_cpu::kurbo::Affine::translate((dest.x0, dest.y0))
                        * vello_cpu::kurbo::Affine::scale_non_uniform(sx, sy),
                );
                ctx.set_paint(p.paint);
                ctx.fill_rect(&vello_cpu::kurbo::Rect::new(
                    0.0,
                    0.0,
                    f64::from(p.w),
                    f64::from(p.h),
                ));
            }
            DrawOp::Text(block) => {
                for line in &block.lines {
                    self.draw_line(block, line, ctx)?;
                }
            }
        }
        Ok(())
    }

    fn draw_line(
        &mut self,
        block: &TextBlock,
        line: &PlacedLine,
        ctx: &mut vello_cpu::RenderContext,
    ) -> ShortreelResult<()> {
        if line.text.is_empty() {
            return Ok(());
        }
        let layout = self.layout_for(&line.text, block.size_px as f32)?;
        let Some((_, font)) = self.font.as_ref() else {
            return Err(ShortreelError::evaluation("text drawing requires a font"));
        };

        // Center the shaped line box inside its stride.
        let x = line.origin.x + (line.width - f64::from(layout.width())) / 2.0;
        let y = line.origin.y + (line.height - f64::from(layout.height())) / 2.0;
        ctx.set_transform(vello_cpu::kurbo::Affine::translate((x, y)));

        // Outline first so the fill sits on top of it.
        if let Some(outline) = block.outline {
            ctx.set_stroke(vello_cpu::kurbo::Stroke::new(outline.width_px));
            ctx.set_paint(paint_color(outline.color));
            for_each_glyph_run(&layout, |size, glyphs| {
                ctx.glyph_run(font).font_size(size).stroke_glyphs(glyphs);
            });
        }
        ctx.set_paint(paint_color(block.fill));
        for_each_glyph_run(&layout, |size, glyphs| {
            ctx.glyph_run(font).font_size(size).fill_glyphs(glyphs);
        });
        Ok(())
    }
}

impl RenderBackend for CpuBackend {
    fn render_plan(
        &mut self,
        plan: &FramePlan,
        assets: &PreparedAssetStore,
    ) -> ShortreelResult<FrameRGBA> {
        plan.canvas.validate()?;
        let width = plan.canvas.width as u16;
        let height = plan.canvas.height as u16;
        let canvas = (f64::from(width), f64::from(height));

        let data = self.with_ctx_mut(width, height, |this, ctx| {
            for op in &plan.ops {
                this.draw_op(op, assets, canvas, ctx)?;
            }
            ctx.flush();
            let mut pixmap = vello_cpu::Pixmap::new(width, height);
            ctx.render_to_pixmap(&mut pixmap);
            Ok(pixmap.data_as_u8_slice().to_vec())
        })?;

        Ok(FrameRGBA {
            width: plan.canvas.width,
            height: plan.canvas.height,
            data,
            premultiplied: true,
        })
    }
}

fn for_each_glyph_run(
    layout: &parley::Layout<TextBrushRgba8>,
    mut f: impl FnMut(f32, &mut dyn Iterator<Item = vello_cpu::Glyph>),
) {
    for line in layout.lines() {
        for item in line.items() {
            let parley::layout::PositionedLayoutItem::GlyphRun(run) = item else {
                continue;
            };
            let mut glyphs = run.positioned_glyphs().map(|g| vello_cpu::Glyph {
                id: g.id,
                x: g.x,
                y: g.y,
            });
            f(run.run().font_size(), &mut glyphs);
        }
    }
}

fn paint_color(c: Color) -> vello_cpu::peniko::Color {
    vello_cpu::peniko::Color::from_rgba8(c.r, c.g, c.b, c.a)
}

fn image_from_prepared(prepared: &PreparedImage) -> ShortreelResult<vello_cpu::Image> {
    let pixmap = pixmap_from_premul_bytes(&prepared.rgba8_premul, prepared.width, prepared.height)?;
    Ok(vello_cpu::Image {
        image: vello_cpu::ImageSource::Pixmap(Arc::new(pixmap)),
        sampler: vello_cpu::peniko::ImageSampler::default(),
    })
}

fn pixmap_from_premul_bytes(
    bytes: &[u8],
    width: u32,
    height: u32,
) -> ShortreelResult<vello_cpu::Pixmap> {
    let w: u16 = width
        .try_into()
        .map_err(|_| ShortreelError::asset("image width exceeds u16"))?;
    let h: u16 = height
        .try_into()
        .map_err(|_| ShortreelError::asset("image height exceeds u16"))?;
    if bytes.len()
        != (width as usize)
            .saturating_mul(height as usize)
            .saturating_mul(4)
    {
        return Err(ShortreelError::asset("image byte len mismatch"));
    }
    let pixels = bytes
        .chunks_exact(4)
        .map(|px| vello_cpu::peniko::color::PremulRgba8::from_u8_array([px[0], px[1], px[2], px[3]]))
        .collect();
    Ok(vello_cpu::Pixmap::from_parts_with_opacity(pixels, w, h, true))
}

#[cfg(test)]
#[path = "../../tests/unit/render/cpu.rs"]
mod tests;
