//! Order API handlers

use axum::{
    Json,
    extract::{Path, Query, State},
};
use serde::Deserialize;
use shared::models::{ItemStatus, Order, OrderDetail, OrderItemInput, OrderStatus};
use validator::Validate;

use crate::api::actor::CurrentActor;
use crate::core::ServerState;
use crate::orders::{CreateOrder, ItemAdvance, OrderFilter};
use crate::utils::{AppError, AppResult};

#[derive(Debug, Deserialize, Validate)]
pub struct CreateOrderRequest {
    pub table_id: i64,
    pub staff_id: Option<i64>,
    #[validate(length(min = 1, message = "order needs at least one item"), nested)]
    pub items: Vec<OrderItemRequest>,
    pub note: Option<String>,
}

#[derive(Debug, Deserialize, serde::Serialize, Validate)]
pub struct OrderItemRequest {
    pub catalog_item_id: i64,
    #[validate(range(min = 1, message = "quantity must be at least 1"))]
    pub quantity: u32,
    pub note: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct OrderListQuery {
    pub status: Option<OrderStatus>,
    pub table_id: Option<i64>,
}

#[derive(Debug, Deserialize)]
pub struct StatusBody {
    pub status: OrderStatus,
}

#[derive(Debug, Deserialize)]
pub struct ItemStatusBody {
    pub status: ItemStatus,
}

/// POST /api/orders - place an order
pub async fn create(
    State(state): State<ServerState>,
    CurrentActor(actor): CurrentActor,
    Json(payload): Json<CreateOrderRequest>,
) -> AppResult<Json<OrderDetail>> {
    payload
        .validate()
        .map_err(|e| AppError::validation(e.to_string()))?;

    let input = CreateOrder {
        table_id: payload.table_id,
        staff_id: payload.staff_id,
        items: payload
            .items
            .into_iter()
            .map(|i| OrderItemInput {
                catalog_item_id: i.catalog_item_id,
                quantity: i.quantity,
                note: i.note,
            })
            .collect(),
        note: payload.note,
    };
    let detail = state.coordinator.place_order(actor, input).await?;
    Ok(Json(detail))
}

/// GET /api/orders - list orders, optionally filtered by status/table
pub async fn list(
    State(state): State<ServerState>,
    CurrentActor(actor): CurrentActor,
    Query(query): Query<OrderListQuery>,
) -> AppResult<Json<Vec<Order>>> {
    let filter = OrderFilter {
        status: query.status,
        table_id: query.table_id,
    };
    let orders = state.coordinator.list_orders(actor, filter).await?;
    Ok(Json(orders))
}

/// GET /api/orders/kitchen - open orders with their items, oldest first
pub async fn kitchen(
    State(state): State<ServerState>,
    CurrentActor(actor): CurrentActor,
) -> AppResult<Json<Vec<OrderDetail>>> {
    let orders = state.coordinator.kitchen_view(actor).await?;
    Ok(Json(orders))
}

/// GET /api/orders/:id - one order with its items
pub async fn get_by_id(
    State(state): State<ServerState>,
    Path(id): Path<i64>,
) -> AppResult<Json<OrderDetail>> {
    let detail = state.coordinator.order_detail(id).await?;
    Ok(Json(detail))
}

/// PUT /api/orders/:id/status - advance the order state machine
pub async fn set_status(
    State(state): State<ServerState>,
    CurrentActor(actor): CurrentActor,
    Path(id): Path<i64>,
    Json(body): Json<StatusBody>,
) -> AppResult<Json<Order>> {
    let order = state.coordinator.advance_order(actor, id, body.status).await?;
    Ok(Json(order))
}

/// POST /api/orders/:id/cancel - cancel from any non-terminal state
pub async fn cancel(
    State(state): State<ServerState>,
    CurrentActor(actor): CurrentActor,
    Path(id): Path<i64>,
) -> AppResult<Json<Order>> {
    let order = state.coordinator.cancel_order(actor, id).await?;
    Ok(Json(order))
}

/// PUT /api/orders/items/:id/status - advance one line item
pub async fn set_item_status(
    State(state): State<ServerState>,
    CurrentActor(actor): CurrentActor,
    Path(id): Path<i64>,
    Json(body): Json<ItemStatusBody>,
) -> AppResult<Json<ItemAdvance>> {
    let advance = state.coordinator.advance_item(actor, id, body.status).await?;
    Ok(Json(advance))
}
