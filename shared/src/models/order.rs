//! Order and line item models with their state machines
//!
//! Both state machines are fixed and monotonic:
//!
//! ```text
//! Order: pending → in_preparation → ready → delivered
//!          └──────────┴──────────────┘ → cancelled
//! Item:  pending → in_preparation → ready
//! ```
//!
//! Cancellation is order-level only; individual items are never cancelled.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Lifecycle state of an order
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum OrderStatus {
    #[default]
    Pending,
    InPreparation,
    Ready,
    Delivered,
    Cancelled,
}

impl OrderStatus {
    /// Terminal states admit no further transitions
    pub fn is_terminal(&self) -> bool {
        matches!(self, OrderStatus::Delivered | OrderStatus::Cancelled)
    }

    /// Whether `self → next` is a legal transition
    pub fn can_transition_to(&self, next: OrderStatus) -> bool {
        use OrderStatus::*;
        matches!(
            (self, next),
            (Pending, InPreparation)
                | (InPreparation, Ready)
                | (Ready, Delivered)
                | (Pending, Cancelled)
                | (InPreparation, Cancelled)
                | (Ready, Cancelled)
        )
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            OrderStatus::Pending => "pending",
            OrderStatus::InPreparation => "in_preparation",
            OrderStatus::Ready => "ready",
            OrderStatus::Delivered => "delivered",
            OrderStatus::Cancelled => "cancelled",
        }
    }
}

impl std::fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Preparation state of a single line item
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum ItemStatus {
    #[default]
    Pending,
    InPreparation,
    Ready,
}

impl ItemStatus {
    /// Strict step-by-step advance, no skipping
    pub fn can_transition_to(&self, next: ItemStatus) -> bool {
        use ItemStatus::*;
        matches!(
            (self, next),
            (Pending, InPreparation) | (InPreparation, Ready)
        )
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ItemStatus::Pending => "pending",
            ItemStatus::InPreparation => "in_preparation",
            ItemStatus::Ready => "ready",
        }
    }
}

impl std::fmt::Display for ItemStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Order entity: one submitted cart against one table
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Order {
    pub id: i64,
    pub table_id: i64,
    /// Waiter responsible for the order, if any
    pub staff_id: Option<i64>,
    /// Derived from line items at commit time, never client-supplied
    pub total: Decimal,
    pub note: Option<String>,
    pub status: OrderStatus,
    /// Epoch milliseconds
    pub created_at: i64,
    pub updated_at: i64,
}

impl Order {
    /// Active means the order still needs kitchen or waiter attention
    pub fn is_active(&self) -> bool {
        !self.status.is_terminal()
    }
}

/// One quantity of one catalog item within an order
///
/// `unit_price` is a snapshot taken at order creation; later catalog price
/// changes never affect persisted items.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct OrderItem {
    pub id: i64,
    pub order_id: i64,
    pub catalog_item_id: i64,
    pub quantity: u32,
    pub unit_price: Decimal,
    pub subtotal: Decimal,
    /// Special instruction for the kitchen ("no onions")
    pub note: Option<String>,
    pub status: ItemStatus,
}

/// Order together with its line items
///
/// Composed from two explicit reads (order row, then item rows); items are
/// kept as a plain field rather than any storage-side aggregation.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct OrderDetail {
    #[serde(flatten)]
    pub order: Order,
    pub items: Vec<OrderItem>,
}

/// Line item input for order creation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderItemInput {
    pub catalog_item_id: i64,
    pub quantity: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
}
