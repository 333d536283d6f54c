//! Shared types for the comanda order system
//!
//! Pure data crate: domain models, state machines, notification payloads
//! and actor identity. No I/O lives here so both the server and any
//! in-process client can depend on it.

pub mod actor;
pub mod message;
pub mod models;
pub mod util;

// Re-export common types
pub use actor::{Actor, Role};
pub use message::{ChannelKey, NotifyEvent};
pub use models::dining_table::{DiningTable, DiningTableCreate, DiningTableUpdate, TableStatus};
pub use models::order::{
    ItemStatus, Order, OrderDetail, OrderItem, OrderItemInput, OrderStatus,
};
pub use util::now_millis;
