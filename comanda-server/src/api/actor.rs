//! Actor extractor
//!
//! Authentication happens at the gateway in front of this service; it
//! forwards the verified identity as `x-actor-id` / `x-actor-role`
//! headers. Requests without a role header are walk-in customers on a
//! table device.

use axum::{extract::FromRequestParts, http::request::Parts};
use shared::actor::{Actor, Role};

use crate::core::ServerState;
use crate::utils::AppError;

/// Acting party of the current request
#[derive(Debug, Clone, Copy)]
pub struct CurrentActor(pub Actor);

impl FromRequestParts<ServerState> for CurrentActor {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        _state: &ServerState,
    ) -> Result<Self, Self::Rejection> {
        let role = match header_str(parts, "x-actor-role") {
            Some(raw) => raw
                .parse::<Role>()
                .map_err(|e| AppError::invalid(format!("Bad x-actor-role header: {}", e)))?,
            None => Role::Customer,
        };

        let id = match header_str(parts, "x-actor-id") {
            Some(raw) => raw
                .parse::<i64>()
                .map_err(|_| AppError::invalid("Bad x-actor-id header"))?,
            None => 0,
        };

        Ok(CurrentActor(Actor::new(id, role)))
    }
}

fn header_str<'a>(parts: &'a Parts, name: &str) -> Option<&'a str> {
    parts.headers.get(name).and_then(|h| h.to_str().ok())
}
