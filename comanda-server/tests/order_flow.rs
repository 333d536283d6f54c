//! End-to-end order flow through the HTTP API.
//!
//! The Axum router is driven in-process via `tower::ServiceExt::oneshot`,
//! no sockets involved. Identity arrives the same way the gateway sends
//! it: `x-actor-id` / `x-actor-role` headers.

use std::sync::Arc;

use axum::body::Body;
use axum::http::{Request, StatusCode, header};
use http_body_util::BodyExt;
use rust_decimal_macros::dec;
use serde_json::{Value, json};
use tower::ServiceExt;

use comanda_server::{
    Config, Coordinator, MemoryStore, NotificationRouter, ServerState, StaticCatalog, api,
};

fn make_state() -> ServerState {
    let catalog = Arc::new(StaticCatalog::new());
    catalog.insert(1, dec!(10.00), true);
    catalog.insert(2, dec!(5.00), true);
    catalog.insert(66, dec!(12.00), false);

    let router = Arc::new(NotificationRouter::new(16));
    let lookup: Arc<dyn comanda_server::CatalogLookup> = catalog.clone();
    let coordinator = Arc::new(Coordinator::new(
        MemoryStore::new(),
        lookup,
        Arc::clone(&router),
    ));

    ServerState {
        config: Config {
            http_port: 0,
            menu_path: None,
            log_dir: None,
            event_buffer: 16,
            request_timeout_ms: 1000,
            environment: "test".into(),
        },
        catalog,
        coordinator,
        router,
    }
}

fn app(state: &ServerState) -> axum::Router {
    api::router().with_state(state.clone())
}

/// One request against a fresh router clone; returns (status, json body)
async fn call(
    state: &ServerState,
    method: &str,
    uri: &str,
    role: Option<(&str, i64)>,
    body: Option<Value>,
) -> (StatusCode, Value) {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some((role, id)) = role {
        builder = builder
            .header("x-actor-role", role)
            .header("x-actor-id", id.to_string());
    }
    let request = match body {
        Some(value) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(value.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    let response = app(state).oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, value)
}

const ADMIN: Option<(&str, i64)> = Some(("admin", 1));
const KITCHEN: Option<(&str, i64)> = Some(("kitchen", 2));
const WAITER: Option<(&str, i64)> = Some(("waiter", 9));

async fn create_table(state: &ServerState, number: i32) -> i64 {
    let (status, body) = call(
        state,
        "POST",
        "/api/tables",
        ADMIN,
        Some(json!({"number": number, "capacity": 4})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    body["id"].as_i64().unwrap()
}

async fn place_order(state: &ServerState, table_id: i64) -> Value {
    let (status, body) = call(
        state,
        "POST",
        "/api/orders",
        None,
        Some(json!({
            "table_id": table_id,
            "items": [
                {"catalog_item_id": 1, "quantity": 2},
                {"catalog_item_id": 2, "quantity": 1}
            ]
        })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    body
}

#[tokio::test]
async fn health_reports_ok() {
    let state = make_state();
    let (status, body) = call(&state, "GET", "/api/health", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
    assert_eq!(body["catalog_items"], 3);
}

#[tokio::test]
async fn placing_an_order_snapshots_prices_and_occupies_the_table() {
    let state = make_state();
    let table_id = create_table(&state, 5).await;

    let order = place_order(&state, table_id).await;
    assert_eq!(order["total"], 25.0);
    assert_eq!(order["status"], "pending");
    assert_eq!(order["items"].as_array().unwrap().len(), 2);
    assert_eq!(order["items"][0]["subtotal"], 20.0);

    let (status, table) = call(
        &state,
        "GET",
        &format!("/api/tables/{table_id}"),
        ADMIN,
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(table["status"], "occupied");
}

#[tokio::test]
async fn unavailable_item_rejects_the_whole_order() {
    let state = make_state();
    let table_id = create_table(&state, 5).await;

    let (status, body) = call(
        &state,
        "POST",
        "/api/orders",
        None,
        Some(json!({
            "table_id": table_id,
            "items": [
                {"catalog_item_id": 1, "quantity": 1},
                {"catalog_item_id": 66, "quantity": 1}
            ]
        })),
    )
    .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["code"], "E0005");

    // nothing persisted, table still free
    let (_, table) = call(
        &state,
        "GET",
        &format!("/api/tables/{table_id}"),
        ADMIN,
        None,
    )
    .await;
    assert_eq!(table["status"], "available");
    let (_, orders) = call(
        &state,
        "GET",
        &format!("/api/tables/{table_id}/orders"),
        None,
        None,
    )
    .await;
    assert!(orders.as_array().unwrap().is_empty());
}

#[tokio::test]
async fn empty_order_fails_validation() {
    let state = make_state();
    let table_id = create_table(&state, 5).await;

    let (status, body) = call(
        &state,
        "POST",
        "/api/orders",
        None,
        Some(json!({"table_id": table_id, "items": []})),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "E0002");
}

#[tokio::test]
async fn kitchen_drives_items_until_the_order_is_ready() {
    let state = make_state();
    let table_id = create_table(&state, 5).await;
    let order = place_order(&state, table_id).await;
    let order_id = order["id"].as_i64().unwrap();
    let item_ids: Vec<i64> = order["items"]
        .as_array()
        .unwrap()
        .iter()
        .map(|i| i["id"].as_i64().unwrap())
        .collect();

    for id in &item_ids {
        let (status, _) = call(
            &state,
            "PUT",
            &format!("/api/orders/items/{id}/status"),
            KITCHEN,
            Some(json!({"status": "in_preparation"})),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
    }

    let (_, advance) = call(
        &state,
        "PUT",
        &format!("/api/orders/items/{}/status", item_ids[0]),
        KITCHEN,
        Some(json!({"status": "ready"})),
    )
    .await;
    assert!(advance["order_ready"].is_null());

    let (_, advance) = call(
        &state,
        "PUT",
        &format!("/api/orders/items/{}/status", item_ids[1]),
        KITCHEN,
        Some(json!({"status": "ready"})),
    )
    .await;
    assert_eq!(advance["order_ready"]["status"], "ready");

    // release refused while the order is still open
    let (status, body) = call(
        &state,
        "POST",
        &format!("/api/tables/{table_id}/release"),
        WAITER,
        None,
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["code"], "E0004");

    // deliver, then release succeeds
    let (status, _) = call(
        &state,
        "PUT",
        &format!("/api/orders/{order_id}/status"),
        WAITER,
        Some(json!({"status": "delivered"})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (status, table) = call(
        &state,
        "POST",
        &format!("/api/tables/{table_id}/release"),
        WAITER,
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(table["status"], "available");
}

#[tokio::test]
async fn illegal_transition_is_a_business_rule_error() {
    let state = make_state();
    let table_id = create_table(&state, 5).await;
    let order = place_order(&state, table_id).await;
    let order_id = order["id"].as_i64().unwrap();

    let (status, body) = call(
        &state,
        "PUT",
        &format!("/api/orders/{order_id}/status"),
        WAITER,
        Some(json!({"status": "delivered"})),
    )
    .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["code"], "E0005");

    // state unchanged
    let (_, detail) = call(&state, "GET", &format!("/api/orders/{order_id}"), None, None).await;
    assert_eq!(detail["status"], "pending");
}

#[tokio::test]
async fn role_policy_applies_at_the_http_surface() {
    let state = make_state();
    let table_id = create_table(&state, 5).await;
    let order = place_order(&state, table_id).await;
    let order_id = order["id"].as_i64().unwrap();
    let item_id = order["items"][0]["id"].as_i64().unwrap();

    // customers cannot advance orders
    let (status, body) = call(
        &state,
        "PUT",
        &format!("/api/orders/{order_id}/status"),
        None,
        Some(json!({"status": "in_preparation"})),
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["code"], "E2001");

    // waiters cannot mark dishes
    let (status, _) = call(
        &state,
        "PUT",
        &format!("/api/orders/items/{item_id}/status"),
        WAITER,
        Some(json!({"status": "in_preparation"})),
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    // the kitchen cannot cancel
    let (status, _) = call(
        &state,
        "POST",
        &format!("/api/orders/{order_id}/cancel"),
        KITCHEN,
        None,
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    // only admins manage tables
    let (status, _) = call(
        &state,
        "POST",
        "/api/tables",
        WAITER,
        Some(json!({"number": 7})),
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    // bad role header is rejected outright
    let (status, body) = call(
        &state,
        "GET",
        "/api/orders",
        Some(("chef", 3)),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "E0006");
}

#[tokio::test]
async fn unknown_resources_return_not_found() {
    let state = make_state();

    let (status, body) = call(&state, "GET", "/api/orders/999", None, None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["code"], "E0003");

    let (status, _) = call(&state, "GET", "/api/tables/999", ADMIN, None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn order_listing_filters_by_status_and_table() {
    let state = make_state();
    let table_a = create_table(&state, 1).await;
    let table_b = create_table(&state, 2).await;
    let order = place_order(&state, table_a).await;
    place_order(&state, table_b).await;

    let order_id = order["id"].as_i64().unwrap();
    call(
        &state,
        "POST",
        &format!("/api/orders/{order_id}/cancel"),
        WAITER,
        None,
    )
    .await;

    let (status, orders) = call(&state, "GET", "/api/orders?status=cancelled", ADMIN, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(orders.as_array().unwrap().len(), 1);
    assert_eq!(orders[0]["id"], order_id);

    let (_, orders) = call(
        &state,
        "GET",
        &format!("/api/orders?table_id={table_b}"),
        ADMIN,
        None,
    )
    .await;
    assert_eq!(orders.as_array().unwrap().len(), 1);

    // kitchen view only shows open orders
    let (_, view) = call(&state, "GET", "/api/orders/kitchen", KITCHEN, None).await;
    assert_eq!(view.as_array().unwrap().len(), 1);
    assert_eq!(view[0]["table_id"].as_i64().unwrap(), table_b);
}
