//! Render sessions for procedural nebula, starry-night and black-hole shaders.
//!
//! A [`RenderSession`] is mounted on a [`Host`] surface and owns one GPU
//! context through a [`RenderBackend`]. Every frame it drains its event inbox,
//! feeds the [`UniformStore`] from its three producers and draws a full-screen
//! quad:
//!
//! ```text
//!   WindowHost (winit) ──events──▶ Inbox ─┐
//!          ▲                              ▼
//!          │ request_frame      RenderSession::tick
//!          │                    ├─ ViewportTracker ─▶ resolution, camera
//!          │                    ├─ InteractionMachine ─▶ intensity
//!          │                    ├─ TimeSource ─▶ time
//!          └────────────────────┴─ RenderBackend::draw(&UniformBlock)
//! ```
//!
//! Each [`ProgramVariant`] also has a CPU evaluator, used by
//! [`still::render_still`] to export frames without a GPU.

mod backend;
mod compile;
mod error;
mod gpu;
mod host;
mod inbox;
mod interaction;
mod program;
pub mod runtime;
mod session;
pub mod still;
mod types;
pub mod uniforms;
mod viewport;
mod window;

pub use backend::RenderBackend;
pub use error::SessionError;
pub use gpu::WgpuBackend;
pub use host::{FrameRequest, Host, ListenerId};
pub use inbox::{Inbox, InboxSender, SessionEvent};
pub use interaction::{InteractionEvent, InteractionMachine, InteractionState};
pub use session::{FrameReport, RenderSession, SessionState};
pub use types::{
    GpuOptions, GpuPowerPreference, InteractionRates, ProgramVariant, SessionOptions, Viewport,
};
pub use uniforms::{UniformBlock, UniformStore, UniformValue};
pub use viewport::{Camera, ViewportTracker};
pub use window::{run_window, PreviewConfig, WindowHost};
