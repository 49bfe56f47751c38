//! Image, font and audio inputs, prepared ahead of the frame loop.

/// Image decoding to premultiplied RGBA8.
pub mod decode;
/// Font resolution, shaping and measuring.
pub mod font;
/// Audio probing and decoding through `ffprobe`/`ffmpeg`.
pub mod media;
/// Image references: paths and `data:` URLs.
pub mod source;
/// Preloaded image store keyed by stable ids.
pub mod store;

pub use decode::{PreparedImage, decode_image};
pub use font::{ParleyMeasure, PreparedFont, TextLayoutEngine};
pub use source::{import_image_bytes, import_image_file};
pub use store::{AssetId, PreparedAssetStore};
