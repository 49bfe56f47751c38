use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;

use anyhow::Context as _;

use crate::foundation::error::{ShortreelError, ShortreelResult};
use crate::layout::text::TextMeasure;

/// RGBA8 brush color used by Parley text layout.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct TextBrushRgba8 {
    /// Red channel.
    pub r: u8,
    /// Green channel.
    pub g: u8,
    /// Blue channel.
    pub b: u8,
    /// Alpha channel.
    pub a: u8,
}

/// Font face used for every overlay, loaded once per render.
#[derive(Clone)]
pub struct PreparedFont {
    bytes: Arc<Vec<u8>>,
    index: u32,
}

impl std::fmt::Debug for PreparedFont {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PreparedFont")
            .field("bytes_len", &self.bytes.len())
            .field("index", &self.index)
            .finish()
    }
}

impl PreparedFont {
    /// Wrap raw font file bytes (`index` selects a face inside collections).
    pub fn from_bytes(bytes: Vec<u8>, index: u32) -> ShortreelResult<Self> {
        if bytes.is_empty() {
            return Err(ShortreelError::asset("font data is empty"));
        }
        Ok(Self {
            bytes: Arc::new(bytes),
            index,
        })
    }

    /// Load the first face of a font file.
    pub fn load(path: &Path) -> ShortreelResult<Self> {
        let bytes =
            std::fs::read(path).with_context(|| format!("read font '{}'", path.display()))?;
        Self::from_bytes(bytes, 0)
    }

    /// Find a bold sans-serif face among the installed system fonts.
    pub fn system_bold_sans() -> ShortreelResult<Self> {
        use usvg::fontdb::{Database, Family, Query, Stretch, Style, Weight};

        let mut db = Database::new();
        db.load_system_fonts();
        let query = Query {
            families: &[Family::SansSerif],
            weight: Weight::BOLD,
            stretch: Stretch::Normal,
            style: Style::Normal,
        };
        let id = db
            .query(&query)
            .or_else(|| db.faces().next().map(|face| face.id))
            .ok_or_else(|| ShortreelError::asset("no system fonts found; set a font path"))?;
        let (bytes, index) = db
            .with_face_data(id, |data, index| (data.to_vec(), index))
            .ok_or_else(|| ShortreelError::asset("failed to read system font data"))?;
        tracing::debug!(face_index = index, bytes = bytes.len(), "resolved system font");
        Self::from_bytes(bytes, index)
    }

    /// Explicit font file when given, otherwise the system bold sans-serif face.
    pub fn resolve(explicit: Option<&Path>) -> ShortreelResult<Self> {
        match explicit {
            Some(path) => Self::load(path),
            None => Self::system_bold_sans(),
        }
    }

    /// Raw font bytes.
    pub fn bytes(&self) -> &Arc<Vec<u8>> {
        &self.bytes
    }

    /// Face index inside the font file.
    pub fn index(&self) -> u32 {
        self.index
    }

    /// Font data handle for the rasterizer.
    pub(crate) fn font_data(&self) -> vello_cpu::peniko::FontData {
        vello_cpu::peniko::FontData::new(
            vello_cpu::peniko::Blob::from(self.bytes.as_ref().clone()),
            self.index,
        )
    }

    fn key(&self) -> usize {
        Arc::as_ptr(&self.bytes) as usize
    }
}

/// Stateful helper for building Parley layouts from a [`PreparedFont`].
pub struct TextLayoutEngine {
    font_ctx: parley::FontContext,
    layout_ctx: parley::LayoutContext<TextBrushRgba8>,
    families: HashMap<usize, String>,
}

impl Default for TextLayoutEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl TextLayoutEngine {
    /// Construct a new layout engine with fresh Parley contexts.
    pub fn new() -> Self {
        Self {
            font_ctx: parley::FontContext::default(),
            layout_ctx: parley::LayoutContext::new(),
            families: HashMap::new(),
        }
    }

    fn family_for(&mut self, font: &PreparedFont) -> ShortreelResult<String> {
        if let Some(name) = self.families.get(&font.key()) {
            return Ok(name.clone());
        }

        let families = self.font_ctx.collection.register_fonts(
            parley::fontique::Blob::from(font.bytes.as_ref().clone()),
            None,
        );
        let family_id = families.first().map(|(id, _)| *id).ok_or_else(|| {
            ShortreelError::asset("no font families registered from font bytes")
        })?;
        let family_name = self
            .font_ctx
            .collection
            .family_name(family_id)
            .ok_or_else(|| ShortreelError::asset("registered font family has no name"))?
            .to_string();
        self.families.insert(font.key(), family_name.clone());
        Ok(family_name)
    }

    /// Shape a single unwrapped line of text.
    pub fn layout_line(
        &mut self,
        text: &str,
        font: &PreparedFont,
        size_px: f32,
        brush: TextBrushRgba8,
    ) -> ShortreelResult<parley::Layout<TextBrushRgba8>> {
        if !size_px.is_finite() || size_px <= 0.0 {
            return Err(ShortreelError::validation(
                "text size_px must be finite and > 0",
            ));
        }
        let family_name = self.family_for(font)?;

        let mut builder = self
            .layout_ctx
            .ranged_builder(&mut self.font_ctx, text, 1.0, true);
        builder.push_default(parley::style::StyleProperty::FontStack(
            parley::style::FontStack::Source(std::borrow::Cow::Owned(family_name)),
        ));
        builder.push_default(parley::style::StyleProperty::FontSize(size_px));
        builder.push_default(parley::style::StyleProperty::Brush(brush));

        let mut layout: parley::Layout<TextBrushRgba8> = builder.build(text);
        layout.break_all_lines(None);
        Ok(layout)
    }
}

/// [`TextMeasure`] backed by real glyph advances.
pub struct ParleyMeasure<'a> {
    engine: &'a mut TextLayoutEngine,
    font: &'a PreparedFont,
}

impl<'a> ParleyMeasure<'a> {
    /// Measure with `font`, registering it with `engine` up front.
    pub fn new(engine: &'a mut TextLayoutEngine, font: &'a PreparedFont) -> ShortreelResult<Self> {
        engine.family_for(font)?;
        Ok(Self { engine, font })
    }
}

impl TextMeasure for ParleyMeasure<'_> {
    fn measure(&mut self, text: &str, size_px: f64) -> f64 {
        match self
            .engine
            .layout_line(text, self.font, size_px as f32, TextBrushRgba8::default())
        {
            Ok(layout) => f64::from(layout.width()),
            Err(e) => {
                tracing::warn!(error = %e, "text measurement failed");
                0.0
            }
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/assets/font.rs"]
mod tests;
