//! Coordinator - transactional glue between ledger, registry and router
//!
//! The only component allowed to mutate order rows and table rows in one
//! logical operation. Every command here:
//!
//! 1. checks the role policy,
//! 2. opens one store transaction,
//! 3. runs ledger/registry mutations against it,
//! 4. commits (or rolls back on the first error),
//! 5. publishes events strictly after the commit.
//!
//! Publishing after commit means subscribers never hear about a state
//! that was rolled back; the cost is that a crash between commit and
//! publish loses the event, which clients recover from by re-fetching.

use std::sync::Arc;

use shared::actor::{Actor, Role};
use shared::message::NotifyEvent;
use shared::models::{
    DiningTable, DiningTableCreate, DiningTableUpdate, ItemStatus, Order, OrderDetail,
    OrderStatus, TableStatus,
};

use crate::catalog::CatalogLookup;
use crate::notify::{NotificationRouter, order_audience};
use crate::orders::{CreateOrder, FlowError, FlowResult, ItemAdvance, OrderFilter, OrderLedger};
use crate::store::{MemoryStore, StoreState};
use crate::tables::TableRegistry;

/// Role sets per command, taken from the route guards of the transport
/// layer this replaces
const ORDER_STATE_ROLES: &[Role] = &[Role::Kitchen, Role::Waiter, Role::Admin];
const CANCEL_ROLES: &[Role] = &[Role::Waiter, Role::Admin];
const ITEM_STATE_ROLES: &[Role] = &[Role::Kitchen, Role::Admin];
const KITCHEN_VIEW_ROLES: &[Role] = &[Role::Kitchen, Role::Admin];
const TABLE_STATE_ROLES: &[Role] = &[Role::Waiter, Role::Admin];
const TABLE_MANAGE_ROLES: &[Role] = &[Role::Admin];

/// Coordinator over one store
pub struct Coordinator {
    store: MemoryStore,
    ledger: OrderLedger,
    registry: TableRegistry,
    router: Arc<NotificationRouter>,
}

impl Coordinator {
    /// The router is injected here; no handler reaches for a global
    pub fn new(
        store: MemoryStore,
        catalog: Arc<dyn CatalogLookup>,
        router: Arc<NotificationRouter>,
    ) -> Self {
        Self {
            store,
            ledger: OrderLedger::new(catalog),
            registry: TableRegistry::new(),
            router,
        }
    }

    pub fn router(&self) -> &Arc<NotificationRouter> {
        &self.router
    }

    // ========== Order commands ==========

    /// Place an order: order + items + table occupancy, all-or-nothing
    ///
    /// Any actor may order; walk-in customers order straight from the
    /// table device.
    pub async fn place_order(&self, actor: Actor, input: CreateOrder) -> FlowResult<OrderDetail> {
        let mut tx = self.store.begin().await;
        let detail = self.ledger.create_order(&mut tx, input).await?;
        self.registry
            .set_occupancy(&mut tx, detail.order.table_id, TableStatus::Occupied)?;
        let channels = self.audience(tx.state(), &detail.order);
        tx.commit();

        tracing::info!(
            order_id = detail.order.id,
            table_id = detail.order.table_id,
            actor_id = actor.id,
            total = %detail.order.total,
            "order placed"
        );
        self.router.publish(
            NotifyEvent::OrderCreated {
                order: detail.clone(),
            },
            &channels,
        );
        Ok(detail)
    }

    /// Advance an order along its state machine
    pub async fn advance_order(
        &self,
        actor: Actor,
        order_id: i64,
        next: OrderStatus,
    ) -> FlowResult<Order> {
        let allowed = if next == OrderStatus::Cancelled {
            CANCEL_ROLES
        } else {
            ORDER_STATE_ROLES
        };
        self.authorize(actor, allowed, "update order state")?;

        let mut tx = self.store.begin().await;
        let order = self.ledger.set_order_state(&mut tx, order_id, next)?;
        let channels = self.audience(tx.state(), &order);
        tx.commit();

        tracing::info!(order_id, status = %order.status, actor_id = actor.id, "order state changed");
        self.router.publish(
            NotifyEvent::OrderStateChanged {
                order_id: order.id,
                table_id: order.table_id,
                status: order.status,
            },
            &channels,
        );
        Ok(order)
    }

    /// Cancel an order (reachable from any non-terminal state)
    pub async fn cancel_order(&self, actor: Actor, order_id: i64) -> FlowResult<Order> {
        self.advance_order(actor, order_id, OrderStatus::Cancelled)
            .await
    }

    /// Advance a line item; a triggered auto-ready is published as its
    /// own order event after the same commit
    pub async fn advance_item(
        &self,
        actor: Actor,
        item_id: i64,
        next: ItemStatus,
    ) -> FlowResult<ItemAdvance> {
        self.authorize(actor, ITEM_STATE_ROLES, "update item state")?;

        let mut tx = self.store.begin().await;
        let advance = self.ledger.set_item_state(&mut tx, item_id, next)?;
        let order = tx
            .state()
            .orders
            .get(&advance.item.order_id)
            .cloned()
            .ok_or_else(|| FlowError::not_found(format!("Order {}", advance.item.order_id)))?;
        let channels = self.audience(tx.state(), &order);
        tx.commit();

        tracing::info!(
            item_id,
            order_id = order.id,
            status = %advance.item.status,
            actor_id = actor.id,
            "item state changed"
        );
        self.router.publish(
            NotifyEvent::ItemStateChanged {
                order_id: order.id,
                table_id: order.table_id,
                item_id: advance.item.id,
                status: advance.item.status,
            },
            &channels,
        );
        if let Some(ready) = &advance.order_ready {
            tracing::info!(order_id = ready.id, "all items ready, order ready");
            self.router.publish(
                NotifyEvent::OrderStateChanged {
                    order_id: ready.id,
                    table_id: ready.table_id,
                    status: ready.status,
                },
                &channels,
            );
        }
        Ok(advance)
    }

    // ========== Table commands ==========

    /// Release a table back to `available`
    ///
    /// The active-order check runs inside the same transaction as the
    /// occupancy write; a concurrent `place_order` serializes behind the
    /// writer lock, so check and release cannot interleave.
    pub async fn release_table(&self, actor: Actor, table_id: i64) -> FlowResult<DiningTable> {
        self.authorize(actor, TABLE_STATE_ROLES, "release table")?;

        let mut tx = self.store.begin().await;
        self.registry.get(tx.state(), table_id)?;
        let active = self.ledger.active_count_for_table(tx.state(), table_id);
        if active > 0 {
            return Err(FlowError::TableHasActiveOrders(table_id));
        }
        let table = self
            .registry
            .set_occupancy(&mut tx, table_id, TableStatus::Available)?;
        tx.commit();

        tracing::info!(table_id, actor_id = actor.id, "table released");
        Ok(table)
    }

    /// Direct occupancy override; `-> available` takes the release guard
    pub async fn set_table_occupancy(
        &self,
        actor: Actor,
        table_id: i64,
        status: TableStatus,
    ) -> FlowResult<DiningTable> {
        if status == TableStatus::Available {
            return self.release_table(actor, table_id).await;
        }
        self.authorize(actor, TABLE_STATE_ROLES, "change table state")?;

        let mut tx = self.store.begin().await;
        let table = self.registry.set_occupancy(&mut tx, table_id, status)?;
        tx.commit();
        tracing::info!(table_id, status = %table.status, "table occupancy changed");
        Ok(table)
    }

    pub async fn assign_staff(
        &self,
        actor: Actor,
        table_id: i64,
        staff_id: Option<i64>,
    ) -> FlowResult<DiningTable> {
        self.authorize(actor, TABLE_MANAGE_ROLES, "assign staff")?;

        let mut tx = self.store.begin().await;
        let table = self.registry.assign_staff(&mut tx, table_id, staff_id)?;
        tx.commit();
        Ok(table)
    }

    pub async fn create_table(
        &self,
        actor: Actor,
        input: DiningTableCreate,
    ) -> FlowResult<DiningTable> {
        self.authorize(actor, TABLE_MANAGE_ROLES, "create table")?;

        let mut tx = self.store.begin().await;
        let table = self.registry.create(&mut tx, input)?;
        tx.commit();
        tracing::info!(table_id = table.id, number = table.number, "table created");
        Ok(table)
    }

    pub async fn update_table(
        &self,
        actor: Actor,
        table_id: i64,
        input: DiningTableUpdate,
    ) -> FlowResult<DiningTable> {
        self.authorize(actor, TABLE_MANAGE_ROLES, "update table")?;

        let mut tx = self.store.begin().await;
        let table = self.registry.update(&mut tx, table_id, input)?;
        tx.commit();
        Ok(table)
    }

    /// Soft delete; refused while the table still has active orders
    pub async fn deactivate_table(&self, actor: Actor, table_id: i64) -> FlowResult<DiningTable> {
        self.authorize(actor, TABLE_MANAGE_ROLES, "deactivate table")?;

        let mut tx = self.store.begin().await;
        if self.ledger.active_count_for_table(tx.state(), table_id) > 0 {
            return Err(FlowError::TableHasActiveOrders(table_id));
        }
        let table = self.registry.deactivate(&mut tx, table_id)?;
        tx.commit();
        Ok(table)
    }

    // ========== Read projections ==========

    pub async fn order_detail(&self, order_id: i64) -> FlowResult<OrderDetail> {
        let snapshot = self.store.snapshot().await;
        self.ledger.order_detail(&snapshot, order_id)
    }

    pub async fn list_orders(&self, actor: Actor, filter: OrderFilter) -> FlowResult<Vec<Order>> {
        self.require_staff(actor, "list orders")?;
        let snapshot = self.store.snapshot().await;
        Ok(self.ledger.list_orders(&snapshot, &filter))
    }

    pub async fn kitchen_view(&self, actor: Actor) -> FlowResult<Vec<OrderDetail>> {
        self.authorize(actor, KITCHEN_VIEW_ROLES, "kitchen view")?;
        let snapshot = self.store.snapshot().await;
        Ok(self.ledger.kitchen_view(&snapshot))
    }

    /// Public: table devices poll this without authenticating
    pub async fn table_orders(&self, table_id: i64) -> Vec<OrderDetail> {
        let snapshot = self.store.snapshot().await;
        self.ledger.table_orders(&snapshot, table_id)
    }

    pub async fn list_tables(&self, actor: Actor) -> FlowResult<Vec<DiningTable>> {
        self.require_staff(actor, "list tables")?;
        let snapshot = self.store.snapshot().await;
        Ok(self.registry.list(&snapshot))
    }

    pub async fn get_table(&self, actor: Actor, table_id: i64) -> FlowResult<DiningTable> {
        self.require_staff(actor, "read table")?;
        let snapshot = self.store.snapshot().await;
        self.registry.get(&snapshot, table_id)
    }

    // ========== Authorization predicate ==========

    /// Explicit role check, decoupled from any transport middleware
    fn authorize(&self, actor: Actor, allowed: &[Role], action: &str) -> FlowResult<()> {
        if actor.has_any_role(allowed) {
            Ok(())
        } else {
            Err(FlowError::Forbidden(format!(
                "role {} may not {}",
                actor.role, action
            )))
        }
    }

    fn require_staff(&self, actor: Actor, action: &str) -> FlowResult<()> {
        if actor.is_staff() {
            Ok(())
        } else {
            Err(FlowError::Forbidden(format!(
                "role {} may not {}",
                actor.role, action
            )))
        }
    }

    /// Audience recomputed from the order's current table and waiter:
    /// reassigning a table's waiter redirects subsequent events
    fn audience(&self, state: &StoreState, order: &Order) -> Vec<shared::message::ChannelKey> {
        let staff_id = state
            .tables
            .get(&order.table_id)
            .and_then(|table| table.staff_id)
            .or(order.staff_id);
        order_audience(order.table_id, staff_id)
    }
}
