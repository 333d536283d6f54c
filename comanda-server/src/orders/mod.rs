//! Order Ledger
//!
//! Owns order and line item rows: atomic creation with derived totals,
//! both state machines, and the read projections. Every mutation runs
//! against an open [`crate::store::StoreTx`]; the coordinator decides when
//! to commit.

pub mod error;
pub mod ledger;

pub use error::{FlowError, FlowResult};
pub use ledger::{CreateOrder, ItemAdvance, OrderFilter, OrderLedger};
