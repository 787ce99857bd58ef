use crossbeam_channel::{unbounded, Receiver, Sender};

use crate::interaction::InteractionEvent;
use crate::types::Viewport;

/// Host signals queued for the next frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SessionEvent {
    Resize(Viewport),
    /// Pointer position in host pixels with a top-left origin.
    PointerMoved { x: f32, y: f32 },
    Interaction(InteractionEvent),
}

/// Cloneable producer side of a session inbox, handed to the host as the
/// session's event listener.
#[derive(Debug, Clone)]
pub struct InboxSender {
    sender: Sender<SessionEvent>,
}

impl InboxSender {
    /// Queues `event`; returns false once the owning session is gone.
    pub fn send(&self, event: SessionEvent) -> bool {
        self.sender.send(event).is_ok()
    }
}

/// Per-session event queue, drained once at the start of every frame.
#[derive(Debug)]
pub struct Inbox {
    sender: Sender<SessionEvent>,
    receiver: Receiver<SessionEvent>,
}

impl Inbox {
    pub fn new() -> Self {
        let (sender, receiver) = unbounded();
        Self { sender, receiver }
    }

    pub fn sender(&self) -> InboxSender {
        InboxSender {
            sender: self.sender.clone(),
        }
    }

    /// Takes everything queued so far. Events pushed while draining are left
    /// for the next frame.
    pub fn drain(&self) -> Vec<SessionEvent> {
        let pending = self.receiver.len();
        self.receiver.try_iter().take(pending).collect()
    }

    pub fn is_empty(&self) -> bool {
        self.receiver.is_empty()
    }
}

impl Default for Inbox {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn drain_preserves_order() {
        let inbox = Inbox::new();
        let sender = inbox.sender();
        sender.send(SessionEvent::Interaction(InteractionEvent::PointerEnter));
        sender.send(SessionEvent::Resize(Viewport::new(10, 20)));
        sender.send(SessionEvent::PointerMoved { x: 1.0, y: 2.0 });

        assert_eq!(
            inbox.drain(),
            vec![
                SessionEvent::Interaction(InteractionEvent::PointerEnter),
                SessionEvent::Resize(Viewport::new(10, 20)),
                SessionEvent::PointerMoved { x: 1.0, y: 2.0 },
            ]
        );
        assert!(inbox.is_empty());
    }

    #[test]
    fn sends_fail_after_inbox_dropped() {
        let inbox = Inbox::new();
        let sender = inbox.sender();
        drop(inbox);
        assert!(!sender.send(SessionEvent::Resize(Viewport::new(1, 1))));
    }
}
