//! Notification event payloads

use serde::{Deserialize, Serialize};

use crate::models::order::{ItemStatus, OrderDetail, OrderStatus};

/// Lifecycle event pushed to subscribed sessions
///
/// Delivery is best-effort to currently connected sessions only; a client
/// that misses an event recovers by re-fetching state over HTTP.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "snake_case", tag = "event", content = "data")]
pub enum NotifyEvent {
    /// A new order was committed, with its full detail for the kitchen
    OrderCreated { order: OrderDetail },
    /// An order moved to a new lifecycle state
    OrderStateChanged {
        order_id: i64,
        table_id: i64,
        status: OrderStatus,
    },
    /// A line item moved to a new preparation state
    ItemStateChanged {
        order_id: i64,
        table_id: i64,
        item_id: i64,
        status: ItemStatus,
    },
}

impl NotifyEvent {
    /// Short name for logging
    pub fn name(&self) -> &'static str {
        match self {
            NotifyEvent::OrderCreated { .. } => "order_created",
            NotifyEvent::OrderStateChanged { .. } => "order_state_changed",
            NotifyEvent::ItemStateChanged { .. } => "item_state_changed",
        }
    }
}
