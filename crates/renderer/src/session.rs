//! One render session per host surface.
//!
//! ```text
//!   host events ──▶ Inbox ──┐
//!                           ▼
//!   tick() ─▶ drain ─▶ viewport / pointer / interaction ─▶ UniformStore
//!                                                              │
//!                       clock ─▶ time ─────────────────────────┤
//!                                                              ▼
//!                                   RenderBackend::draw(&UniformBlock)
//! ```
//!
//! All mutation happens inside [`RenderSession::tick`], so events pushed
//! between frames become visible on the next frame and never mid-frame.

use std::fmt;
use std::time::Instant;

use crate::backend::RenderBackend;
use crate::error::SessionError;
use crate::host::{FrameRequest, Host, ListenerId};
use crate::inbox::{Inbox, InboxSender, SessionEvent};
use crate::interaction::InteractionMachine;
use crate::runtime::{BoxedTimeSource, FrameStats, SystemTimeSource, TimeSource};
use crate::types::{ProgramVariant, SessionOptions, Viewport};
use crate::uniforms::{UniformStore, UniformValue, INTENSITY, POINTER, RESOLUTION, TIME};
use crate::viewport::{Camera, ViewportTracker};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Uninitialized,
    Running,
    /// Terminal. A new session must be constructed to render again.
    Disposed,
}

impl fmt::Display for SessionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SessionState::Uninitialized => f.write_str("uninitialized"),
            SessionState::Running => f.write_str("running"),
            SessionState::Disposed => f.write_str("disposed"),
        }
    }
}

/// What a rendered frame was drawn with.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FrameReport {
    pub frame_index: u64,
    pub time: f32,
    pub intensity: f32,
    pub resolution: [f32; 2],
}

pub struct RenderSession<H: Host, B: RenderBackend> {
    state: SessionState,
    variant: ProgramVariant,
    host: H,
    backend: Option<B>,
    attached: bool,
    listener: Option<ListenerId>,
    pending_frame: Option<FrameRequest>,
    inbox: Inbox,
    tracker: ViewportTracker,
    camera: Camera,
    uniforms: UniformStore,
    interaction: InteractionMachine,
    clock: BoxedTimeSource,
    stats: FrameStats,
    frames: u64,
}

impl<H: Host, B: RenderBackend> RenderSession<H, B> {
    /// Reads the host size and declares the program's uniforms. Session-scoped
    /// values such as the random seed are sampled here, once.
    pub fn new(host: H, options: SessionOptions) -> Self {
        let viewport = host.surface_size();
        let variant = options.variant;
        Self {
            state: SessionState::Uninitialized,
            variant,
            tracker: ViewportTracker::new(viewport),
            camera: Camera::for_variant(variant, viewport),
            uniforms: UniformStore::for_variant(variant, viewport, options.seed),
            interaction: InteractionMachine::new(options.rates),
            clock: Box::new(SystemTimeSource::new()),
            stats: FrameStats::new(Instant::now()),
            host,
            backend: None,
            attached: false,
            listener: None,
            pending_frame: None,
            inbox: Inbox::new(),
            frames: 0,
        }
    }

    /// Replaces the default monotonic clock.
    pub fn with_time_source(mut self, clock: impl TimeSource + 'static) -> Self {
        self.clock = Box::new(clock);
        self
    }

    /// Acquires the GPU context, compiles the program, creates the quad and
    /// schedules the first frame.
    ///
    /// When acquisition fails nothing on the host has been touched. When a
    /// later step fails the partially built backend is released. Either way the
    /// session ends up disposed and the error is returned.
    pub fn start<F>(&mut self, acquire: F) -> Result<(), SessionError>
    where
        F: FnOnce(&H, Viewport) -> Result<B, SessionError>,
    {
        if self.state != SessionState::Uninitialized {
            return Err(SessionError::Lifecycle(self.state));
        }

        let backend = match acquire(&self.host, self.tracker.current()) {
            Ok(backend) => backend,
            Err(err) => {
                tracing::warn!(variant = %self.variant, error = %err, "render session failed to start");
                self.state = SessionState::Disposed;
                return Err(err);
            }
        };
        self.backend = Some(backend);

        let framebuffer = match self.prepare_backend() {
            Ok(framebuffer) => framebuffer,
            Err(err) => {
                tracing::warn!(variant = %self.variant, error = %err, "render session failed to start");
                self.dispose();
                return Err(err);
            }
        };

        self.host.attach_target();
        self.attached = true;
        self.listener = Some(self.host.add_listener(self.inbox.sender()));
        self.clock.reset();
        self.stats = FrameStats::new(Instant::now());
        self.state = SessionState::Running;
        self.pending_frame = Some(self.host.request_frame());

        tracing::debug!(variant = %self.variant, size = %framebuffer, "render session running");
        Ok(())
    }

    /// Compiles the program, creates the quad and adopts the backend's
    /// framebuffer size.
    fn prepare_backend(&mut self) -> Result<Viewport, SessionError> {
        let backend = self
            .backend
            .as_mut()
            .ok_or(SessionError::ResourceMissing("context"))?;
        backend.compile_program(self.variant)?;
        backend.create_buffers()?;
        let framebuffer = backend.framebuffer_size();
        self.apply_framebuffer(framebuffer)?;
        Ok(framebuffer)
    }

    /// Renders one frame. Called by the host when the pending frame fires.
    ///
    /// Any failure is fatal: the session is disposed before the error is
    /// returned, so no further frame is ever scheduled.
    pub fn tick(&mut self) -> Result<FrameReport, SessionError> {
        if self.state != SessionState::Running {
            return Err(SessionError::Lifecycle(self.state));
        }
        self.pending_frame = None;

        match self.render_frame() {
            Ok(report) => {
                self.pending_frame = Some(self.host.request_frame());
                Ok(report)
            }
            Err(err) => {
                tracing::error!(variant = %self.variant, error = %err, "frame failed; stopping session");
                self.dispose();
                Err(err)
            }
        }
    }

    fn render_frame(&mut self) -> Result<FrameReport, SessionError> {
        for event in self.inbox.drain() {
            self.apply_event(event)?;
        }

        let intensity = self.interaction.step();
        self.uniforms
            .set_if_declared(INTENSITY, UniformValue::Float(intensity))?;

        let sample = self.clock.sample();
        self.uniforms.set(TIME, UniformValue::Float(sample.seconds))?;

        let block = self.uniforms.pack();
        self.backend
            .as_mut()
            .ok_or(SessionError::ResourceMissing("context"))?
            .draw(&block)?;

        if let Some(fps) = self.stats.record(Instant::now()) {
            tracing::debug!(variant = %self.variant, "render stats: {fps:.1} fps");
        }

        let report = FrameReport {
            frame_index: self.frames,
            time: sample.seconds,
            intensity,
            resolution: block.resolution,
        };
        self.frames += 1;
        Ok(report)
    }

    fn apply_event(&mut self, event: SessionEvent) -> Result<(), SessionError> {
        match event {
            SessionEvent::Resize(viewport) => {
                if let Some(viewport) = self.tracker.observe(viewport) {
                    let backend = self
                        .backend
                        .as_mut()
                        .ok_or(SessionError::ResourceMissing("context"))?;
                    backend.resize(viewport);
                    let framebuffer = backend.framebuffer_size();
                    self.apply_framebuffer(framebuffer)?;
                    tracing::debug!(size = %framebuffer, "surface resized");
                }
            }
            SessionEvent::PointerMoved { x, y } => {
                let [_, height] = self.uniforms.resolution();
                self.uniforms
                    .set_if_declared(POINTER, UniformValue::Vec2([x, height - y]))?;
            }
            SessionEvent::Interaction(event) => self.interaction.handle(event),
        }
        Ok(())
    }

    /// The framebuffer, not the requested size, is authoritative for the
    /// resolution uniform and the camera.
    fn apply_framebuffer(&mut self, framebuffer: Viewport) -> Result<(), SessionError> {
        self.camera.set_viewport(framebuffer);
        self.uniforms
            .set(RESOLUTION, UniformValue::Vec2(framebuffer.as_uniform()))
    }

    /// Tears the session down: cancel the pending frame, remove the listener,
    /// release buffers, program and context, then detach the target.
    ///
    /// Safe to call any number of times and from any state.
    pub fn dispose(&mut self) {
        if let Some(request) = self.pending_frame.take() {
            self.host.cancel_frame(request);
        }
        if let Some(listener) = self.listener.take() {
            self.host.remove_listener(listener);
        }
        if let Some(mut backend) = self.backend.take() {
            backend.release_buffers();
            backend.release_program();
            backend.release_context();
        }
        if self.attached {
            self.host.detach_target();
            self.attached = false;
        }
        if self.state != SessionState::Disposed {
            tracing::debug!(variant = %self.variant, frames = self.frames, "render session disposed");
            self.state = SessionState::Disposed;
        }
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn variant(&self) -> ProgramVariant {
        self.variant
    }

    pub fn viewport(&self) -> Viewport {
        self.tracker.current()
    }

    pub fn camera(&self) -> &Camera {
        &self.camera
    }

    pub fn uniforms(&self) -> &UniformStore {
        &self.uniforms
    }

    pub fn intensity(&self) -> f32 {
        self.interaction.intensity()
    }

    pub fn frame_count(&self) -> u64 {
        self.frames
    }

    pub fn pending_frame(&self) -> Option<FrameRequest> {
        self.pending_frame
    }

    /// Producer handle for pushing events directly, bypassing the host.
    pub fn sender(&self) -> InboxSender {
        self.inbox.sender()
    }

    pub fn host(&self) -> &H {
        &self.host
    }

    pub fn host_mut(&mut self) -> &mut H {
        &mut self.host
    }

    pub fn backend(&self) -> Option<&B> {
        self.backend.as_ref()
    }
}

impl<H: Host, B: RenderBackend> Drop for RenderSession<H, B> {
    fn drop(&mut self) {
        self.dispose();
    }
}
