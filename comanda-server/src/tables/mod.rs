//! Table Registry
//!
//! Exclusive owner of dining table rows. Occupancy mutation is plain here;
//! the guard that a table with active orders cannot return to `available`
//! lives in the coordinator, where it runs inside the same transaction as
//! the release itself.

use shared::models::{DiningTable, DiningTableCreate, DiningTableUpdate, TableStatus};

use crate::orders::{FlowError, FlowResult};
use crate::store::{StoreState, StoreTx};

const DEFAULT_CAPACITY: i32 = 4;

/// Table Registry operations
#[derive(Debug, Clone, Copy, Default)]
pub struct TableRegistry;

impl TableRegistry {
    pub fn new() -> Self {
        Self
    }

    /// Create a table; display numbers are unique among active tables
    pub fn create(&self, tx: &mut StoreTx<'_>, input: DiningTableCreate) -> FlowResult<DiningTable> {
        let duplicate = tx
            .state()
            .tables
            .values()
            .any(|t| t.is_active && t.number == input.number);
        if duplicate {
            return Err(FlowError::Conflict(format!(
                "Table {} already exists",
                input.number
            )));
        }

        let state = tx.state_mut();
        let table = DiningTable {
            id: state.alloc_table_id(),
            number: input.number,
            capacity: input.capacity.unwrap_or(DEFAULT_CAPACITY),
            status: TableStatus::Available,
            staff_id: None,
            is_active: true,
        };
        state.tables.insert(table.id, table.clone());
        Ok(table)
    }

    /// Update number/capacity/active flag
    pub fn update(
        &self,
        tx: &mut StoreTx<'_>,
        table_id: i64,
        input: DiningTableUpdate,
    ) -> FlowResult<DiningTable> {
        if let Some(number) = input.number {
            let duplicate = tx
                .state()
                .tables
                .values()
                .any(|t| t.is_active && t.number == number && t.id != table_id);
            if duplicate {
                return Err(FlowError::Conflict(format!(
                    "Table {} already exists",
                    number
                )));
            }
        }

        let table = self.get_mut(tx, table_id)?;
        if let Some(number) = input.number {
            table.number = number;
        }
        if let Some(capacity) = input.capacity {
            table.capacity = capacity;
        }
        if let Some(is_active) = input.is_active {
            table.is_active = is_active;
        }
        Ok(table.clone())
    }

    /// Direct occupancy override
    pub fn set_occupancy(
        &self,
        tx: &mut StoreTx<'_>,
        table_id: i64,
        status: TableStatus,
    ) -> FlowResult<DiningTable> {
        let table = self.get_mut(tx, table_id)?;
        table.status = status;
        Ok(table.clone())
    }

    /// Reassign the responsible waiter (or clear with `None`)
    pub fn assign_staff(
        &self,
        tx: &mut StoreTx<'_>,
        table_id: i64,
        staff_id: Option<i64>,
    ) -> FlowResult<DiningTable> {
        let table = self.get_mut(tx, table_id)?;
        table.staff_id = staff_id;
        Ok(table.clone())
    }

    /// Soft delete: historical orders keep referencing the row
    pub fn deactivate(&self, tx: &mut StoreTx<'_>, table_id: i64) -> FlowResult<DiningTable> {
        let table = self.get_mut(tx, table_id)?;
        table.is_active = false;
        Ok(table.clone())
    }

    pub fn get(&self, state: &StoreState, table_id: i64) -> FlowResult<DiningTable> {
        state
            .tables
            .get(&table_id)
            .cloned()
            .ok_or_else(|| FlowError::not_found(format!("Table {}", table_id)))
    }

    /// Active tables ordered by display number
    pub fn list(&self, state: &StoreState) -> Vec<DiningTable> {
        let mut tables: Vec<DiningTable> = state
            .tables
            .values()
            .filter(|t| t.is_active)
            .cloned()
            .collect();
        tables.sort_by_key(|t| t.number);
        tables
    }

    fn get_mut<'a>(
        &self,
        tx: &'a mut StoreTx<'_>,
        table_id: i64,
    ) -> FlowResult<&'a mut DiningTable> {
        tx.state_mut()
            .tables
            .get_mut(&table_id)
            .ok_or_else(|| FlowError::not_found(format!("Table {}", table_id)))
    }
}
