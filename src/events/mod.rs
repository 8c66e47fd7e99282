//! Domain events and their outbound queue.
//!
//! Handlers publish fire-and-forget events; the dispatcher drains the
//! queue and turns each event into an email job. Keeping the publisher
//! a trait lets tests assert "event X was enqueued" without a real
//! notification backend.

mod dispatcher;

pub use dispatcher::spawn_dispatcher;

use tokio::sync::mpsc;

use crate::domain::User;

/// Kinds of account lifecycle events.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UserEventKind {
    AccountConfirmation,
    PasswordResetRequest,
    PasswordResetComplete,
}

/// A typed notification about a user, published at most once per
/// successful transition.
#[derive(Debug, Clone)]
pub struct UserEvent {
    pub kind: UserEventKind,
    pub user: User,
}

/// Outbound event boundary the handlers write to.
pub trait UserEventPublisher: Send + Sync {
    /// Enqueue an event. Must not fail the surrounding request:
    /// delivery problems are the dispatcher's concern.
    fn publish(&self, kind: UserEventKind, user: &User);
}

/// In-process event queue backed by an unbounded channel.
pub struct EventQueue {
    sender: mpsc::UnboundedSender<UserEvent>,
}

impl EventQueue {
    /// Create the queue and the receiver half for the dispatcher.
    pub fn channel() -> (Self, mpsc::UnboundedReceiver<UserEvent>) {
        let (sender, receiver) = mpsc::unbounded_channel();
        (Self { sender }, receiver)
    }
}

impl UserEventPublisher for EventQueue {
    fn publish(&self, kind: UserEventKind, user: &User) {
        let event = UserEvent {
            kind,
            user: user.clone(),
        };
        if self.sender.send(event).is_err() {
            // Receiver gone, most likely during shutdown
            tracing::warn!(?kind, "event dropped: dispatcher is not running");
        }
    }
}
