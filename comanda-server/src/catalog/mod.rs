//! Catalog lookup seam
//!
//! Menu management lives outside the core; the ledger only needs a price
//! and availability check at order-creation time. [`CatalogLookup`] is the
//! pluggable seam, [`StaticCatalog`] the in-process implementation used
//! for wiring and tests.

use std::path::Path;
use std::sync::Arc;

use async_trait::async_trait;
use dashmap::DashMap;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::orders::{FlowError, FlowResult};

/// Price and availability at lookup time
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CatalogPrice {
    pub unit_price: Decimal,
    pub available: bool,
}

/// External catalog collaborator
///
/// Must be callable while an order-creation transaction is open; the
/// result reflects availability at submission time.
#[async_trait]
pub trait CatalogLookup: Send + Sync {
    /// Price of one catalog item, `None` for unknown ids
    async fn price_of(&self, item_id: i64) -> FlowResult<Option<CatalogPrice>>;
}

/// Catalog entry as loaded from the menu file
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CatalogEntry {
    pub id: i64,
    pub unit_price: Decimal,
    #[serde(default = "default_available")]
    pub available: bool,
}

fn default_available() -> bool {
    true
}

/// In-process catalog backed by a concurrent map
#[derive(Debug, Default)]
pub struct StaticCatalog {
    entries: DashMap<i64, CatalogPrice>,
}

impl StaticCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Load entries from a JSON array of [`CatalogEntry`]
    pub fn from_json_file(path: impl AsRef<Path>) -> FlowResult<Self> {
        let raw = std::fs::read_to_string(path.as_ref())
            .map_err(|e| FlowError::Storage(format!("cannot read menu file: {}", e)))?;
        let entries: Vec<CatalogEntry> = serde_json::from_str(&raw)
            .map_err(|e| FlowError::Storage(format!("malformed menu file: {}", e)))?;

        let catalog = Self::new();
        for entry in entries {
            catalog.insert(entry.id, entry.unit_price, entry.available);
        }
        tracing::info!(items = catalog.entries.len(), "catalog loaded");
        Ok(catalog)
    }

    pub fn insert(&self, item_id: i64, unit_price: Decimal, available: bool) {
        self.entries
            .insert(item_id, CatalogPrice { unit_price, available });
    }

    /// Flip availability without touching the price
    pub fn set_available(&self, item_id: i64, available: bool) {
        if let Some(mut entry) = self.entries.get_mut(&item_id) {
            entry.available = available;
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[async_trait]
impl CatalogLookup for StaticCatalog {
    async fn price_of(&self, item_id: i64) -> FlowResult<Option<CatalogPrice>> {
        Ok(self.entries.get(&item_id).map(|entry| entry.clone()))
    }
}

#[async_trait]
impl<T: CatalogLookup + ?Sized> CatalogLookup for Arc<T> {
    async fn price_of(&self, item_id: i64) -> FlowResult<Option<CatalogPrice>> {
        (**self).price_of(item_id).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[tokio::test]
    async fn lookup_returns_price_and_availability() {
        let catalog = StaticCatalog::new();
        catalog.insert(1, dec!(10.00), true);
        catalog.insert(2, dec!(5.50), false);

        let price = catalog.price_of(1).await.unwrap().unwrap();
        assert_eq!(price.unit_price, dec!(10.00));
        assert!(price.available);

        let price = catalog.price_of(2).await.unwrap().unwrap();
        assert!(!price.available);

        assert!(catalog.price_of(99).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn availability_can_be_flipped() {
        let catalog = StaticCatalog::new();
        catalog.insert(1, dec!(3.25), true);
        catalog.set_available(1, false);

        let price = catalog.price_of(1).await.unwrap().unwrap();
        assert!(!price.available);
        assert_eq!(price.unit_price, dec!(3.25));
    }
}
