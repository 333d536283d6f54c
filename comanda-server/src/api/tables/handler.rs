//! Dining table API handlers

use axum::{
    Json,
    extract::{Path, State},
};
use serde::Deserialize;
use shared::models::{
    DiningTable, DiningTableCreate, DiningTableUpdate, OrderDetail, TableStatus,
};

use crate::api::actor::CurrentActor;
use crate::core::ServerState;
use crate::utils::AppResult;

#[derive(Debug, Deserialize)]
pub struct TableStatusBody {
    pub status: TableStatus,
}

#[derive(Debug, Deserialize)]
pub struct AssignStaffBody {
    pub staff_id: Option<i64>,
}

/// GET /api/tables - active tables by display number
pub async fn list(
    State(state): State<ServerState>,
    CurrentActor(actor): CurrentActor,
) -> AppResult<Json<Vec<DiningTable>>> {
    let tables = state.coordinator.list_tables(actor).await?;
    Ok(Json(tables))
}

/// GET /api/tables/:id - one table
pub async fn get_by_id(
    State(state): State<ServerState>,
    CurrentActor(actor): CurrentActor,
    Path(id): Path<i64>,
) -> AppResult<Json<DiningTable>> {
    let table = state.coordinator.get_table(actor, id).await?;
    Ok(Json(table))
}

/// POST /api/tables - create a table
pub async fn create(
    State(state): State<ServerState>,
    CurrentActor(actor): CurrentActor,
    Json(payload): Json<DiningTableCreate>,
) -> AppResult<Json<DiningTable>> {
    let table = state.coordinator.create_table(actor, payload).await?;
    Ok(Json(table))
}

/// PUT /api/tables/:id - update number/capacity/active flag
pub async fn update(
    State(state): State<ServerState>,
    CurrentActor(actor): CurrentActor,
    Path(id): Path<i64>,
    Json(payload): Json<DiningTableUpdate>,
) -> AppResult<Json<DiningTable>> {
    let table = state.coordinator.update_table(actor, id, payload).await?;
    Ok(Json(table))
}

/// PUT /api/tables/:id/status - occupancy override
pub async fn set_status(
    State(state): State<ServerState>,
    CurrentActor(actor): CurrentActor,
    Path(id): Path<i64>,
    Json(body): Json<TableStatusBody>,
) -> AppResult<Json<DiningTable>> {
    let table = state
        .coordinator
        .set_table_occupancy(actor, id, body.status)
        .await?;
    Ok(Json(table))
}

/// PUT /api/tables/:id/staff - reassign the responsible waiter
pub async fn assign_staff(
    State(state): State<ServerState>,
    CurrentActor(actor): CurrentActor,
    Path(id): Path<i64>,
    Json(body): Json<AssignStaffBody>,
) -> AppResult<Json<DiningTable>> {
    let table = state
        .coordinator
        .assign_staff(actor, id, body.staff_id)
        .await?;
    Ok(Json(table))
}

/// POST /api/tables/:id/release - back to available, guarded
pub async fn release(
    State(state): State<ServerState>,
    CurrentActor(actor): CurrentActor,
    Path(id): Path<i64>,
) -> AppResult<Json<DiningTable>> {
    let table = state.coordinator.release_table(actor, id).await?;
    Ok(Json(table))
}

/// GET /api/tables/:id/orders - the table's non-cancelled orders
pub async fn orders(
    State(state): State<ServerState>,
    Path(id): Path<i64>,
) -> AppResult<Json<Vec<OrderDetail>>> {
    Ok(Json(state.coordinator.table_orders(id).await))
}

/// DELETE /api/tables/:id - soft delete
pub async fn deactivate(
    State(state): State<ServerState>,
    CurrentActor(actor): CurrentActor,
    Path(id): Path<i64>,
) -> AppResult<Json<DiningTable>> {
    let table = state.coordinator.deactivate_table(actor, id).await?;
    Ok(Json(table))
}
