use crate::assets::store::PreparedAssetStore;
use crate::compose::plan::FramePlan;
use crate::foundation::error::ShortreelResult;

/// A rendered frame as RGBA8 pixels.
#[derive(Clone, Debug, PartialEq)]
pub struct FrameRGBA {
    /// Frame width in pixels.
    pub width: u32,
    /// Frame height in pixels.
    pub height: u32,
    /// RGBA8 bytes, tightly packed, row-major.
    pub data: Vec<u8>,
    /// Whether the `data` is premultiplied alpha.
    pub premultiplied: bool,
}

impl FrameRGBA {
    /// RGBA bytes of the pixel at `(x, y)`.
    pub fn pixel(&self, x: u32, y: u32) -> Option<[u8; 4]> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let i = ((y as usize) * (self.width as usize) + (x as usize)) * 4;
        self.data
            .get(i..i + 4)
            .map(|px| [px[0], px[1], px[2], px[3]])
    }
}

/// A renderer that rasterizes a [`FramePlan`] into a [`FrameRGBA`].
pub trait RenderBackend {
    /// Execute every draw step of `plan` and read back the final frame.
    fn render_plan(
        &mut self,
        plan: &FramePlan,
        assets: &PreparedAssetStore,
    ) -> ShortreelResult<FrameRGBA>;
}
