//! Soundtrack assembly: segment speech clips laid out on the timeline and mixed to PCM.

/// Soundtrack layout in sample space.
pub mod manifest;
/// PCM mixing and raw output.
pub mod mix;

pub use manifest::{PlacedClip, SoundtrackManifest, build_soundtrack};
pub use mix::{frame_to_sample, mix_manifest, secs_to_sample, write_mix_to_f32le_file};
