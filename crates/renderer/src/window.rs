//! Native preview host: a `winit` window that owns one render session.
//!
//! Window events are translated into [`SessionEvent`]s and broadcast to the
//! registered listeners; `RedrawRequested` is the frame callback.

use std::sync::Arc;

use anyhow::{anyhow, Context, Result};
use winit::dpi::PhysicalSize;
use winit::event::{Event, TouchPhase, WindowEvent};
use winit::event_loop::{ControlFlow, EventLoopBuilder};
use winit::window::{Window, WindowBuilder};

use crate::gpu::WgpuBackend;
use crate::host::{FrameRequest, Host, ListenerId};
use crate::inbox::{InboxSender, SessionEvent};
use crate::interaction::InteractionEvent;
use crate::session::RenderSession;
use crate::types::{GpuOptions, SessionOptions, Viewport};

/// Everything needed to open the preview window.
#[derive(Debug, Clone)]
pub struct PreviewConfig {
    pub title: String,
    pub size: Viewport,
    pub session: SessionOptions,
    pub gpu: GpuOptions,
}

/// Registered session listeners.
#[derive(Debug, Default)]
struct Listeners {
    next_id: u64,
    entries: Vec<(ListenerId, InboxSender)>,
}

impl Listeners {
    fn add(&mut self, sender: InboxSender) -> ListenerId {
        let id = ListenerId(self.next_id);
        self.next_id += 1;
        self.entries.push((id, sender));
        id
    }

    fn remove(&mut self, id: ListenerId) {
        self.entries.retain(|(entry, _)| *entry != id);
    }

    /// Delivers `event` to every listener, forgetting those whose inbox is
    /// gone.
    fn broadcast(&mut self, event: SessionEvent) {
        self.entries.retain(|(_, sender)| sender.send(event));
    }

    #[cfg(test)]
    fn len(&self) -> usize {
        self.entries.len()
    }
}

/// [`Host`] backed by a `winit` window.
pub struct WindowHost {
    window: Arc<Window>,
    listeners: Listeners,
    next_frame: u64,
    pending: Option<FrameRequest>,
}

impl WindowHost {
    pub fn new(window: Arc<Window>) -> Self {
        Self {
            window,
            listeners: Listeners::default(),
            next_frame: 0,
            pending: None,
        }
    }

    pub fn window(&self) -> &Arc<Window> {
        &self.window
    }

    pub fn broadcast(&mut self, event: SessionEvent) {
        self.listeners.broadcast(event);
    }

    /// Consumes the pending frame when the window delivers a redraw. Returns
    /// `None` for redraws nobody asked for (expose events, cancelled frames).
    pub fn take_pending_frame(&mut self) -> Option<FrameRequest> {
        self.pending.take()
    }
}

impl Host for WindowHost {
    fn surface_size(&self) -> Viewport {
        self.window.inner_size().into()
    }

    fn request_frame(&mut self) -> FrameRequest {
        let request = FrameRequest(self.next_frame);
        self.next_frame += 1;
        self.pending = Some(request);
        self.window.request_redraw();
        request
    }

    fn cancel_frame(&mut self, request: FrameRequest) {
        if self.pending == Some(request) {
            self.pending = None;
        }
    }

    fn add_listener(&mut self, sender: InboxSender) -> ListenerId {
        self.listeners.add(sender)
    }

    fn remove_listener(&mut self, id: ListenerId) {
        self.listeners.remove(id);
    }

    fn attach_target(&mut self) {
        self.window.set_visible(true);
    }

    fn detach_target(&mut self) {
        self.window.set_visible(false);
    }
}

/// Maps a window event to the session event it stands for, if any.
fn translate(event: &WindowEvent) -> Vec<SessionEvent> {
    match event {
        WindowEvent::Resized(size) => vec![SessionEvent::Resize((*size).into())],
        WindowEvent::CursorEntered { .. } => {
            vec![SessionEvent::Interaction(InteractionEvent::PointerEnter)]
        }
        WindowEvent::CursorLeft { .. } => {
            vec![SessionEvent::Interaction(InteractionEvent::PointerLeave)]
        }
        WindowEvent::CursorMoved { position, .. } => vec![SessionEvent::PointerMoved {
            x: position.x as f32,
            y: position.y as f32,
        }],
        WindowEvent::Touch(touch) => {
            let moved = SessionEvent::PointerMoved {
                x: touch.location.x as f32,
                y: touch.location.y as f32,
            };
            match touch.phase {
                TouchPhase::Started => vec![
                    moved,
                    SessionEvent::Interaction(InteractionEvent::TouchStart),
                ],
                TouchPhase::Moved => vec![moved],
                TouchPhase::Ended | TouchPhase::Cancelled => {
                    vec![SessionEvent::Interaction(InteractionEvent::TouchEnd)]
                }
            }
        }
        _ => Vec::new(),
    }
}

/// Opens the preview window and renders until it is closed.
///
/// A session failure (construction or any frame) closes the window and is
/// returned to the caller.
pub fn run_window(config: PreviewConfig) -> Result<()> {
    let event_loop = EventLoopBuilder::new()
        .build()
        .map_err(|err| anyhow!("failed to create event loop: {err}"))?;

    let window = WindowBuilder::new()
        .with_title(config.title.as_str())
        .with_inner_size(PhysicalSize::from(config.size))
        .with_transparent(config.gpu.transparent)
        .with_visible(false)
        .build(&event_loop)
        .map_err(|err| anyhow!("failed to create preview window: {err}"))?;
    let window = Arc::new(window);
    let window_id = window.id();

    let mut session: RenderSession<WindowHost, WgpuBackend> =
        RenderSession::new(WindowHost::new(window), config.session.clone());
    let gpu = config.gpu;
    session
        .start(|host, viewport| WgpuBackend::new(host.window().clone(), viewport, gpu))
        .with_context(|| format!("failed to start {} session", config.session.variant))?;

    tracing::info!(variant = %session.variant(), size = %session.viewport(), "preview running");

    let mut failure = None;
    event_loop
        .run(|event, elwt| {
            elwt.set_control_flow(ControlFlow::Wait);
            let Event::WindowEvent { window_id: id, event } = event else {
                return;
            };
            if id != window_id {
                return;
            }
            match event {
                WindowEvent::CloseRequested | WindowEvent::Destroyed => {
                    session.dispose();
                    elwt.exit();
                }
                WindowEvent::RedrawRequested => {
                    if session.host_mut().take_pending_frame().is_none() {
                        return;
                    }
                    if let Err(err) = session.tick() {
                        failure = Some(err);
                        elwt.exit();
                    }
                }
                other => {
                    for translated in translate(&other) {
                        session.host_mut().broadcast(translated);
                    }
                }
            }
        })
        .map_err(|err| anyhow!("window event loop error: {err}"))?;

    session.dispose();
    match failure {
        Some(err) => Err(err).context("render session stopped"),
        None => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::inbox::Inbox;

    #[test]
    fn listeners_receive_broadcasts_until_removed() {
        let mut listeners = Listeners::default();
        let first = Inbox::new();
        let second = Inbox::new();
        let first_id = listeners.add(first.sender());
        listeners.add(second.sender());

        listeners.broadcast(SessionEvent::Resize(Viewport::new(3, 4)));
        listeners.remove(first_id);
        listeners.broadcast(SessionEvent::Resize(Viewport::new(5, 6)));

        assert_eq!(first.drain().len(), 1);
        assert_eq!(second.drain().len(), 2);
        assert_eq!(listeners.len(), 1);
    }

    #[test]
    fn broadcast_forgets_dropped_inboxes() {
        let mut listeners = Listeners::default();
        let inbox = Inbox::new();
        listeners.add(inbox.sender());
        drop(inbox);
        listeners.broadcast(SessionEvent::Interaction(InteractionEvent::PointerEnter));
        assert_eq!(listeners.len(), 0);
    }

    #[test]
    fn resize_and_cursor_events_translate() {
        let resized = WindowEvent::Resized(PhysicalSize::new(800, 600));
        assert_eq!(
            translate(&resized),
            vec![SessionEvent::Resize(Viewport::new(800, 600))]
        );
        assert!(translate(&WindowEvent::Focused(true)).is_empty());
    }
}
