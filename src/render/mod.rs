/// Frame buffer type and backend trait.
pub mod backend;
/// `vello_cpu` raster backend.
pub mod cpu;

pub use backend::{FrameRGBA, RenderBackend};
pub use cpu::{CpuBackend, CpuBackendOpts};
