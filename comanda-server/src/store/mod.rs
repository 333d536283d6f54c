//! Transactional in-process store
//!
//! The storage collaborator realized as an embedded, single-writer store.
//! A write transaction takes the writer lock, mutates a working copy of
//! the state and swaps it in atomically on [`StoreTx::commit`]; dropping
//! the transaction without committing discards every staged change.
//!
//! # Concurrency
//!
//! ```text
//! begin() ──► MutexGuard (one writer at a time)
//!    │
//!    ├─ state()/state_mut() ──► working copy (staged writes)
//!    │
//!    ├─ commit() ──► *guard = working   (all-or-nothing)
//!    └─ drop    ──► rollback            (working copy discarded)
//! ```
//!
//! Holding the guard for the whole transaction serializes writers, which
//! is what closes the race between releasing a table and placing an order
//! against it. Read-only projections clone a snapshot and never block
//! writers for longer than the clone.

use std::collections::HashMap;
use std::sync::Arc;

use shared::models::{DiningTable, Order, OrderItem};
use tokio::sync::{Mutex, MutexGuard};

/// Full relational state: one map per entity plus id counters
#[derive(Debug, Clone, Default)]
pub struct StoreState {
    pub tables: HashMap<i64, DiningTable>,
    pub orders: HashMap<i64, Order>,
    pub items: HashMap<i64, OrderItem>,
    next_table_id: i64,
    next_order_id: i64,
    next_item_id: i64,
}

impl StoreState {
    pub fn alloc_table_id(&mut self) -> i64 {
        self.next_table_id += 1;
        self.next_table_id
    }

    pub fn alloc_order_id(&mut self) -> i64 {
        self.next_order_id += 1;
        self.next_order_id
    }

    pub fn alloc_item_id(&mut self) -> i64 {
        self.next_item_id += 1;
        self.next_item_id
    }

    /// Line items of one order, in insertion order
    pub fn items_for_order(&self, order_id: i64) -> Vec<OrderItem> {
        let mut items: Vec<OrderItem> = self
            .items
            .values()
            .filter(|item| item.order_id == order_id)
            .cloned()
            .collect();
        items.sort_by_key(|item| item.id);
        items
    }

    /// Orders still in a non-terminal state referencing the table
    pub fn active_orders_for_table(&self, table_id: i64) -> Vec<&Order> {
        self.orders
            .values()
            .filter(|order| order.table_id == table_id && order.is_active())
            .collect()
    }
}

/// Single-writer transactional store
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    state: Arc<Mutex<StoreState>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Begin a write transaction
    ///
    /// Blocks until any in-flight transaction commits or rolls back.
    pub async fn begin(&self) -> StoreTx<'_> {
        let guard = self.state.lock().await;
        let working = guard.clone();
        StoreTx { guard, working }
    }

    /// Consistent point-in-time snapshot for read-only projections
    pub async fn snapshot(&self) -> StoreState {
        self.state.lock().await.clone()
    }
}

/// An open write transaction
pub struct StoreTx<'a> {
    guard: MutexGuard<'a, StoreState>,
    working: StoreState,
}

impl StoreTx<'_> {
    /// Staged state, including uncommitted writes of this transaction
    pub fn state(&self) -> &StoreState {
        &self.working
    }

    pub fn state_mut(&mut self) -> &mut StoreState {
        &mut self.working
    }

    /// Commit every staged write atomically
    pub fn commit(mut self) {
        *self.guard = std::mem::take(&mut self.working);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal::Decimal;
    use shared::models::{OrderStatus, TableStatus};
    use std::time::Duration;

    fn sample_table(id: i64) -> DiningTable {
        DiningTable {
            id,
            number: id as i32,
            capacity: 4,
            status: TableStatus::Available,
            staff_id: None,
            is_active: true,
        }
    }

    fn sample_order(id: i64, table_id: i64) -> Order {
        Order {
            id,
            table_id,
            staff_id: None,
            total: Decimal::ZERO,
            note: None,
            status: OrderStatus::Pending,
            created_at: 0,
            updated_at: 0,
        }
    }

    #[tokio::test]
    async fn commit_persists_staged_writes() {
        let store = MemoryStore::new();

        let mut tx = store.begin().await;
        let id = tx.state_mut().alloc_table_id();
        tx.state_mut().tables.insert(id, sample_table(id));
        tx.commit();

        let snapshot = store.snapshot().await;
        assert_eq!(snapshot.tables.len(), 1);
    }

    #[tokio::test]
    async fn dropping_tx_rolls_back() {
        let store = MemoryStore::new();

        {
            let mut tx = store.begin().await;
            let id = tx.state_mut().alloc_table_id();
            tx.state_mut().tables.insert(id, sample_table(id));
            // dropped without commit
        }

        let snapshot = store.snapshot().await;
        assert!(snapshot.tables.is_empty());
        // id counter rolled back as well
        let mut tx = store.begin().await;
        assert_eq!(tx.state_mut().alloc_table_id(), 1);
    }

    #[tokio::test]
    async fn writers_are_serialized() {
        let store = MemoryStore::new();
        let tx = store.begin().await;

        let store2 = store.clone();
        let second = tokio::spawn(async move {
            let mut tx = store2.begin().await;
            let id = tx.state_mut().alloc_order_id();
            tx.state_mut().orders.insert(id, sample_order(id, 1));
            tx.commit();
        });

        // Second writer must wait for the open transaction
        tokio::time::sleep(Duration::from_millis(20)).await;
        assert!(!second.is_finished());

        drop(tx);
        second.await.unwrap();
        assert_eq!(store.snapshot().await.orders.len(), 1);
    }

    #[tokio::test]
    async fn active_orders_ignore_terminal_states() {
        let store = MemoryStore::new();
        let mut tx = store.begin().await;
        let state = tx.state_mut();

        let mut delivered = sample_order(1, 5);
        delivered.status = OrderStatus::Delivered;
        let mut cancelled = sample_order(2, 5);
        cancelled.status = OrderStatus::Cancelled;
        state.orders.insert(1, delivered);
        state.orders.insert(2, cancelled);
        state.orders.insert(3, sample_order(3, 5));
        state.orders.insert(4, sample_order(4, 6));

        assert_eq!(state.active_orders_for_table(5).len(), 1);
        assert_eq!(state.active_orders_for_table(6).len(), 1);
        assert!(state.active_orders_for_table(7).is_empty());
    }
}
