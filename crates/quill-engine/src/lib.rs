//! Quill ink engine.
//!
//! Pointer classification, gesture routing, stroke geometry, spatial queries,
//! GPU stroke rendering, tile caching, and the winit/wgpu runtime that hosts
//! them.

pub mod classify;
pub mod coords;
pub mod core;
pub mod device;
pub mod edit;
pub mod geometry;
pub mod ink;
pub mod input;
pub mod logging;
pub mod paint;
pub mod render;
pub mod router;
pub mod spatial;
pub mod tile;
pub mod time;
pub mod window;
