//! Session registry and publish loop

use std::collections::HashSet;
use std::sync::Arc;

use dashmap::DashMap;
use shared::message::{ChannelKey, NotifyEvent};
use tokio::sync::mpsc;
use uuid::Uuid;

/// Opaque session handle
pub type SessionId = Uuid;

/// One connected subscriber: its outbox and joined channels
#[derive(Debug)]
struct Session {
    tx: mpsc::Sender<Arc<NotifyEvent>>,
    channels: HashSet<ChannelKey>,
}

/// Publish/subscribe bus over per-session outboxes
///
/// Channel membership is session-local and lost on disconnect; nothing is
/// persisted or replayed. The router is always an injected instance,
/// never ambient state.
#[derive(Debug)]
pub struct NotificationRouter {
    sessions: DashMap<SessionId, Session>,
    /// Outbox capacity per session
    buffer: usize,
}

impl NotificationRouter {
    pub fn new(buffer: usize) -> Self {
        Self {
            sessions: DashMap::new(),
            buffer: buffer.max(1),
        }
    }

    /// Register a session; the receiver is the session's event feed
    pub fn connect(&self) -> (SessionId, mpsc::Receiver<Arc<NotifyEvent>>) {
        let id = Uuid::new_v4();
        let (tx, rx) = mpsc::channel(self.buffer);
        self.sessions.insert(
            id,
            Session {
                tx,
                channels: HashSet::new(),
            },
        );
        tracing::debug!(session = %id, "session connected");
        (id, rx)
    }

    /// Join a channel; returns false for unknown sessions
    pub fn join(&self, session: SessionId, channel: ChannelKey) -> bool {
        match self.sessions.get_mut(&session) {
            Some(mut entry) => {
                entry.channels.insert(channel);
                tracing::debug!(session = %session, channel = %channel, "joined channel");
                true
            }
            None => false,
        }
    }

    /// Leave a channel; returns false for unknown sessions
    pub fn leave(&self, session: SessionId, channel: ChannelKey) -> bool {
        match self.sessions.get_mut(&session) {
            Some(mut entry) => {
                entry.channels.remove(&channel);
                true
            }
            None => false,
        }
    }

    /// Drop the session and all its memberships
    pub fn disconnect(&self, session: SessionId) {
        if self.sessions.remove(&session).is_some() {
            tracing::debug!(session = %session, "session disconnected");
        }
    }

    pub fn session_count(&self) -> usize {
        self.sessions.len()
    }

    /// Deliver `event` to every session joined to any of `channels`
    ///
    /// Snapshot-then-iterate: membership is read once up front, so
    /// concurrent joins/leaves during delivery are safe. Full outboxes
    /// drop the event for that session only; closed outboxes are reaped.
    /// Returns the number of sessions the event was handed to.
    pub fn publish(&self, event: NotifyEvent, channels: &[ChannelKey]) -> usize {
        let event = Arc::new(event);

        let targets: Vec<(SessionId, mpsc::Sender<Arc<NotifyEvent>>)> = self
            .sessions
            .iter()
            .filter(|entry| channels.iter().any(|c| entry.value().channels.contains(c)))
            .map(|entry| (*entry.key(), entry.value().tx.clone()))
            .collect();

        let mut delivered = 0;
        for (id, tx) in targets {
            match tx.try_send(Arc::clone(&event)) {
                Ok(()) => delivered += 1,
                Err(mpsc::error::TrySendError::Full(_)) => {
                    tracing::warn!(
                        session = %id,
                        event = event.name(),
                        "session outbox full, event dropped"
                    );
                }
                Err(mpsc::error::TrySendError::Closed(_)) => {
                    tracing::debug!(session = %id, "session outbox closed, reaping");
                    self.disconnect(id);
                }
            }
        }

        tracing::debug!(event = event.name(), delivered, "event published");
        delivered
    }
}

impl Default for NotificationRouter {
    fn default() -> Self {
        Self::new(64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use shared::models::OrderStatus;

    fn state_changed(order_id: i64, table_id: i64) -> NotifyEvent {
        NotifyEvent::OrderStateChanged {
            order_id,
            table_id,
            status: OrderStatus::Ready,
        }
    }

    #[tokio::test]
    async fn delivers_only_to_joined_sessions() {
        let router = NotificationRouter::new(8);

        let (kitchen, mut kitchen_rx) = router.connect();
        router.join(kitchen, ChannelKey::Kitchen);
        let (other_waiter, mut other_rx) = router.connect();
        router.join(other_waiter, ChannelKey::Staff(7));

        let delivered = router.publish(
            state_changed(1, 5),
            &[ChannelKey::Kitchen, ChannelKey::Table(5)],
        );
        assert_eq!(delivered, 1);
        assert!(kitchen_rx.try_recv().is_ok());
        assert!(other_rx.try_recv().is_err());
    }

    #[tokio::test]
    async fn one_membership_means_one_delivery() {
        let router = NotificationRouter::new(8);

        let (dashboard, mut rx) = router.connect();
        router.join(dashboard, ChannelKey::Kitchen);
        router.join(dashboard, ChannelKey::Admin);

        // Session matches two target channels but gets the event once
        let delivered = router.publish(
            state_changed(1, 5),
            &[ChannelKey::Kitchen, ChannelKey::Admin],
        );
        assert_eq!(delivered, 1);
        assert!(rx.try_recv().is_ok());
        assert!(rx.try_recv().is_err());
    }

    #[tokio::test]
    async fn leave_and_disconnect_stop_delivery() {
        let router = NotificationRouter::new(8);

        let (session, mut rx) = router.connect();
        router.join(session, ChannelKey::Table(5));
        router.leave(session, ChannelKey::Table(5));

        assert_eq!(router.publish(state_changed(1, 5), &[ChannelKey::Table(5)]), 0);
        assert!(rx.try_recv().is_err());

        router.disconnect(session);
        assert_eq!(router.session_count(), 0);
        assert!(!router.join(session, ChannelKey::Kitchen));
    }

    #[tokio::test]
    async fn slow_subscriber_never_blocks_others() {
        let router = NotificationRouter::new(1);

        let (slow, _slow_rx) = router.connect();
        router.join(slow, ChannelKey::Kitchen);
        let (healthy, mut healthy_rx) = router.connect();
        router.join(healthy, ChannelKey::Kitchen);

        // First event fills the slow session's outbox (buffer = 1)
        router.publish(state_changed(1, 5), &[ChannelKey::Kitchen]);
        // Second event is dropped for the slow session, delivered to the
        // healthy one
        let delivered = router.publish(state_changed(2, 5), &[ChannelKey::Kitchen]);
        assert_eq!(delivered, 1);

        assert!(healthy_rx.try_recv().is_ok());
        assert!(healthy_rx.try_recv().is_ok());
    }

    #[tokio::test]
    async fn closed_sessions_are_reaped_on_publish() {
        let router = NotificationRouter::new(8);

        let (session, rx) = router.connect();
        router.join(session, ChannelKey::Admin);
        drop(rx);

        assert_eq!(router.publish(state_changed(1, 5), &[ChannelKey::Admin]), 0);
        assert_eq!(router.session_count(), 0);
    }
}
