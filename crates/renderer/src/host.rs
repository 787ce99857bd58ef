use crate::inbox::InboxSender;
use crate::types::Viewport;

/// Handle for a frame callback scheduled with [`Host::request_frame`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FrameRequest(pub u64);

/// Handle for a listener registered with [`Host::add_listener`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ListenerId(pub u64);

/// The surface a render session is mounted on.
///
/// The host owns frame pacing and input: it schedules at most one pending
/// frame per request and forwards resize and engagement signals to every
/// registered listener.
pub trait Host {
    /// Current size of the drawable area in physical pixels.
    fn surface_size(&self) -> Viewport;

    /// Schedules the next frame callback (one per display refresh).
    fn request_frame(&mut self) -> FrameRequest;

    /// Cancels a pending frame. Unknown or already-fired requests are ignored.
    fn cancel_frame(&mut self, request: FrameRequest);

    fn add_listener(&mut self, sender: InboxSender) -> ListenerId;

    fn remove_listener(&mut self, id: ListenerId);

    /// Makes the render target part of the host's visual tree.
    fn attach_target(&mut self);

    fn detach_target(&mut self);
}
