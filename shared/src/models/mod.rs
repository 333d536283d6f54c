//! Domain models

pub mod dining_table;
pub mod order;

pub use dining_table::{DiningTable, DiningTableCreate, DiningTableUpdate, TableStatus};
pub use order::{ItemStatus, Order, OrderDetail, OrderItem, OrderItemInput, OrderStatus};
