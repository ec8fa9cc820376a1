//! GPU device + surface management.
//!
//! Owns the wgpu Instance/Adapter/Device/Queue for one window and hands out
//! per-frame encoders. Stroke meshes are uploaded through `render::stroke`,
//! never through this module directly.

mod context;
mod error;
mod frame;
mod init;
mod surface;

pub use context::Gpu;
pub use error::SurfaceErrorAction;
pub use frame::GpuFrame;
pub use init::GpuInit;
