//! `wgpu` backend for render sessions.
//!
//! - `context` owns the instance, surface, device and queue, and reconfigures
//!   the swapchain when the surface resizes.
//! - `pipeline` compiles a program's GLSL into a render pipeline with a single
//!   uniform bind group.
//! - `state` holds the quad and uniform buffers and implements
//!   [`RenderBackend`](crate::backend::RenderBackend).

mod context;
mod pipeline;
mod state;

pub use state::WgpuBackend;
