//! Stroke rendering.
//!
//! The input side talks to this module only through [`RenderCommand`]s. The
//! render side drains them into a [`StrokeStore`], which owns every mesh and
//! plans each frame; [`StrokeRenderer`] turns a plan into one wgpu pass.
//!
//! Convention:
//! - Meshes are in page units (top-left origin, +Y down).
//! - The vertex shader applies zoom and pan, then converts to NDC against
//!   the logical viewport.

mod command;
mod ctx;
mod mesh;
mod mode;
mod overlay;
mod renderer;
mod store;

pub use command::{render_queue, RenderCommand, RenderInbox, RenderQueue};
pub use ctx::{RenderCtx, RenderTarget};
pub use mesh::{GpuMesh, GpuMeshAllocator, MeshAllocator, MeshBuffer, MeshRecord, MeshUsage};
pub use mode::RedrawMode;
pub use overlay::{HoverPreview, OverlayState};
pub use renderer::StrokeRenderer;
pub use store::{DrawBatch, DrawLayer, FramePlan, FrameUniform, StoreConfig, StrokeStore};
