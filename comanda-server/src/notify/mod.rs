//! Notification fan-out
//!
//! ```text
//! Coordinator (post-commit)
//!        │ publish(event, channels)
//!        ▼
//! NotificationRouter ── DashMap<SessionId, Session>
//!        │ snapshot matching sessions, then try_send
//!        ├── mpsc ──► kitchen display
//!        ├── mpsc ──► admin dashboard
//!        ├── mpsc ──► staff:{id} device
//!        └── mpsc ──► table:{id} device
//! ```
//!
//! Delivery is best-effort and non-blocking: a slow subscriber drops its
//! own events, never anyone else's, and never blocks the command path.

pub mod router;

pub use router::{NotificationRouter, SessionId};

use shared::message::ChannelKey;

/// Audience of an order lifecycle event
///
/// Kitchen and admin always listen; the table's devices and, when a
/// waiter is responsible, that waiter's devices. The waiter comes from
/// the table's current assignment first so reassignment redirects events,
/// falling back to the waiter captured on the order.
pub fn order_audience(table_id: i64, staff_id: Option<i64>) -> Vec<ChannelKey> {
    let mut channels = vec![
        ChannelKey::Kitchen,
        ChannelKey::Admin,
        ChannelKey::Table(table_id),
    ];
    if let Some(id) = staff_id {
        channels.push(ChannelKey::Staff(id));
    }
    channels
}
