//! Order Ledger operations
//!
//! # Auto-ready rule
//!
//! "The order is ready when every dish is ready": after each item state
//! update the ledger re-checks the parent order inside the same
//! transaction, so two items racing to `ready` can never both observe an
//! unfinished order and leave it stuck.

use rust_decimal::Decimal;
use serde::Serialize;
use shared::models::{
    ItemStatus, Order, OrderDetail, OrderItem, OrderItemInput, OrderStatus,
};
use shared::now_millis;
use std::sync::Arc;

use super::{FlowError, FlowResult};
use crate::catalog::CatalogLookup;
use crate::store::{StoreState, StoreTx};

/// Order creation command
#[derive(Debug, Clone)]
pub struct CreateOrder {
    pub table_id: i64,
    pub staff_id: Option<i64>,
    pub items: Vec<OrderItemInput>,
    pub note: Option<String>,
}

/// Result of an item state update
///
/// `order_ready` carries the parent order when the update triggered the
/// automatic advance to `ready`; the coordinator publishes it as its own
/// event.
#[derive(Debug, Clone, Serialize)]
pub struct ItemAdvance {
    pub item: OrderItem,
    pub order_ready: Option<Order>,
}

/// Read filter for order listings
#[derive(Debug, Clone, Default)]
pub struct OrderFilter {
    pub status: Option<OrderStatus>,
    pub table_id: Option<i64>,
}

/// Order Ledger: exclusive owner of order and line item rows
pub struct OrderLedger {
    catalog: Arc<dyn CatalogLookup>,
}

impl OrderLedger {
    pub fn new(catalog: Arc<dyn CatalogLookup>) -> Self {
        Self { catalog }
    }

    /// Create an order together with its line items and derived total
    ///
    /// Prices are snapshotted from the catalog at call time and rounded to
    /// 2 decimal places; the total is the exact sum of the subtotals. Any
    /// unknown or unavailable item aborts the whole operation, leaving the
    /// transaction untouched by this call.
    pub async fn create_order(
        &self,
        tx: &mut StoreTx<'_>,
        input: CreateOrder,
    ) -> FlowResult<OrderDetail> {
        if input.items.is_empty() {
            return Err(FlowError::Validation(
                "order must contain at least one item".into(),
            ));
        }
        if input.items.iter().any(|item| item.quantity == 0) {
            return Err(FlowError::Validation(
                "item quantity must be at least 1".into(),
            ));
        }

        let table = tx
            .state()
            .tables
            .get(&input.table_id)
            .filter(|t| t.is_active)
            .ok_or_else(|| FlowError::not_found(format!("Table {}", input.table_id)))?;
        let table_id = table.id;

        // Resolve every price before touching state, so a late failure
        // cannot leave partial items staged
        let mut priced = Vec::with_capacity(input.items.len());
        for item in &input.items {
            let price = self
                .catalog
                .price_of(item.catalog_item_id)
                .await?
                .filter(|p| p.available)
                .ok_or(FlowError::ItemUnavailable(item.catalog_item_id))?;
            priced.push((item, price.unit_price.round_dp(2)));
        }

        let now = now_millis();
        let state = tx.state_mut();
        let order_id = state.alloc_order_id();

        let mut items = Vec::with_capacity(priced.len());
        let mut total = Decimal::ZERO;
        for (input_item, unit_price) in priced {
            let subtotal = (unit_price * Decimal::from(input_item.quantity)).round_dp(2);
            total += subtotal;
            let item = OrderItem {
                id: state.alloc_item_id(),
                order_id,
                catalog_item_id: input_item.catalog_item_id,
                quantity: input_item.quantity,
                unit_price,
                subtotal,
                note: input_item.note.clone(),
                status: ItemStatus::Pending,
            };
            state.items.insert(item.id, item.clone());
            items.push(item);
        }

        let order = Order {
            id: order_id,
            table_id,
            staff_id: input.staff_id,
            total,
            note: input.note,
            status: OrderStatus::Pending,
            created_at: now,
            updated_at: now,
        };
        state.orders.insert(order_id, order.clone());

        Ok(OrderDetail { order, items })
    }

    /// Advance an order along its state machine
    pub fn set_order_state(
        &self,
        tx: &mut StoreTx<'_>,
        order_id: i64,
        next: OrderStatus,
    ) -> FlowResult<Order> {
        let order = tx
            .state_mut()
            .orders
            .get_mut(&order_id)
            .ok_or_else(|| FlowError::not_found(format!("Order {}", order_id)))?;

        if !order.status.can_transition_to(next) {
            return Err(FlowError::invalid_transition(order.status, next));
        }

        order.status = next;
        order.updated_at = now_millis();
        Ok(order.clone())
    }

    /// Advance a line item, auto-advancing the parent order to `ready`
    /// when this was the last unfinished item
    pub fn set_item_state(
        &self,
        tx: &mut StoreTx<'_>,
        item_id: i64,
        next: ItemStatus,
    ) -> FlowResult<ItemAdvance> {
        let state = tx.state_mut();

        let item = state
            .items
            .get(&item_id)
            .ok_or_else(|| FlowError::not_found(format!("Item {}", item_id)))?;
        let order_id = item.order_id;

        let order_status = state
            .orders
            .get(&order_id)
            .map(|order| order.status)
            .ok_or_else(|| FlowError::not_found(format!("Order {}", order_id)))?;
        if order_status.is_terminal() {
            return Err(FlowError::Validation(format!(
                "cannot update items of a {} order",
                order_status
            )));
        }

        if !item.status.can_transition_to(next) {
            return Err(FlowError::invalid_transition(item.status, next));
        }

        let item = state
            .items
            .get_mut(&item_id)
            .ok_or_else(|| FlowError::not_found(format!("Item {}", item_id)))?;
        item.status = next;
        let item = item.clone();

        // Evaluated under the same transaction as the item update; a
        // concurrent writer cannot interleave between the two
        let mut order_ready = None;
        if next == ItemStatus::Ready {
            let all_ready = state
                .items
                .values()
                .filter(|i| i.order_id == order_id)
                .all(|i| i.status == ItemStatus::Ready);
            if all_ready
                && let Some(order) = state.orders.get_mut(&order_id)
                // The order may still be pending when the kitchen races
                // ahead of the waiter; the business rule wins over the
                // step-by-step machine here
                && matches!(
                    order.status,
                    OrderStatus::Pending | OrderStatus::InPreparation
                )
            {
                order.status = OrderStatus::Ready;
                order.updated_at = now_millis();
                order_ready = Some(order.clone());
            }
        }

        Ok(ItemAdvance { item, order_ready })
    }

    /// Order with its items, composed from two explicit reads
    pub fn order_detail(&self, state: &StoreState, order_id: i64) -> FlowResult<OrderDetail> {
        let order = state
            .orders
            .get(&order_id)
            .cloned()
            .ok_or_else(|| FlowError::not_found(format!("Order {}", order_id)))?;
        let items = state.items_for_order(order_id);
        Ok(OrderDetail { order, items })
    }

    /// All orders matching the filter, newest first
    pub fn list_orders(&self, state: &StoreState, filter: &OrderFilter) -> Vec<Order> {
        let mut orders: Vec<Order> = state
            .orders
            .values()
            .filter(|order| filter.status.is_none_or(|s| order.status == s))
            .filter(|order| filter.table_id.is_none_or(|t| order.table_id == t))
            .cloned()
            .collect();
        orders.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));
        orders
    }

    /// Active (non-terminal) orders with items, oldest first
    pub fn list_active(&self, state: &StoreState) -> Vec<OrderDetail> {
        let mut orders: Vec<&Order> = state
            .orders
            .values()
            .filter(|order| order.is_active())
            .collect();
        orders.sort_by(|a, b| a.created_at.cmp(&b.created_at).then(a.id.cmp(&b.id)));
        orders
            .into_iter()
            .map(|order| OrderDetail {
                order: order.clone(),
                items: state.items_for_order(order.id),
            })
            .collect()
    }

    /// Kitchen projection: orders still being cooked, oldest first
    pub fn kitchen_view(&self, state: &StoreState) -> Vec<OrderDetail> {
        self.list_active(state)
            .into_iter()
            .filter(|detail| {
                matches!(
                    detail.order.status,
                    OrderStatus::Pending | OrderStatus::InPreparation
                )
            })
            .collect()
    }

    /// Orders shown on a table device: everything but cancelled, newest first
    pub fn table_orders(&self, state: &StoreState, table_id: i64) -> Vec<OrderDetail> {
        let mut orders: Vec<&Order> = state
            .orders
            .values()
            .filter(|order| {
                order.table_id == table_id && order.status != OrderStatus::Cancelled
            })
            .collect();
        orders.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));
        orders
            .into_iter()
            .map(|order| OrderDetail {
                order: order.clone(),
                items: state.items_for_order(order.id),
            })
            .collect()
    }

    /// Number of non-terminal orders referencing the table
    pub fn active_count_for_table(&self, state: &StoreState, table_id: i64) -> usize {
        state.active_orders_for_table(table_id).len()
    }
}
