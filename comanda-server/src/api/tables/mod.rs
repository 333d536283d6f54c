//! Dining table API module

mod handler;

use axum::{
    Router,
    routing::{get, post, put},
};

use crate::core::ServerState;

pub fn router() -> Router<ServerState> {
    Router::new().nest("/api/tables", routes())
}

fn routes() -> Router<ServerState> {
    Router::new()
        .route("/", get(handler::list).post(handler::create))
        .route(
            "/{id}",
            get(handler::get_by_id)
                .put(handler::update)
                .delete(handler::deactivate),
        )
        .route("/{id}/status", put(handler::set_status))
        .route("/{id}/staff", put(handler::assign_staff))
        .route("/{id}/release", post(handler::release))
        .route("/{id}/orders", get(handler::orders))
}
