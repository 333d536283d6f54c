//! API routing
//!
//! # Structure
//!
//! - [`health`] - health check
//! - [`orders`] - order placement and lifecycle
//! - [`tables`] - dining table management
//! - [`events`] - WebSocket event feed

pub mod actor;
pub mod events;
pub mod health;
pub mod orders;
pub mod tables;

use axum::Router;

use crate::core::ServerState;

// Re-export common types for handlers
pub use crate::utils::{AppResponse, AppResult};
pub use actor::CurrentActor;

/// Full API surface (state not yet applied)
pub fn router() -> Router<ServerState> {
    Router::new()
        .merge(health::router())
        .merge(orders::router())
        .merge(tables::router())
        .merge(events::router())
}
