use std::sync::Arc;

use crate::catalog::StaticCatalog;
use crate::coordinator::Coordinator;
use crate::core::Config;
use crate::notify::NotificationRouter;
use crate::store::MemoryStore;

/// Shared server state, one `Arc` per component
///
/// Cloning is shallow; every handler gets the same coordinator, catalog
/// and router instances.
#[derive(Clone)]
pub struct ServerState {
    pub config: Config,
    pub catalog: Arc<StaticCatalog>,
    pub coordinator: Arc<Coordinator>,
    pub router: Arc<NotificationRouter>,
}

impl ServerState {
    /// Build the full component graph from configuration
    ///
    /// Order: catalog (from MENU_PATH or empty), notification router,
    /// store, coordinator. Fails only when a configured menu file cannot
    /// be read or parsed.
    pub async fn initialize(config: &Config) -> anyhow::Result<Self> {
        let catalog = match &config.menu_path {
            Some(path) => Arc::new(
                StaticCatalog::from_json_file(path)
                    .map_err(|e| anyhow::anyhow!("menu load failed: {}", e))?,
            ),
            None => {
                tracing::warn!("MENU_PATH not set, starting with an empty catalog");
                Arc::new(StaticCatalog::new())
            }
        };

        let router = Arc::new(NotificationRouter::new(config.event_buffer));
        let lookup: Arc<dyn crate::catalog::CatalogLookup> = catalog.clone();
        let coordinator = Arc::new(Coordinator::new(
            MemoryStore::new(),
            lookup,
            Arc::clone(&router),
        ));

        Ok(Self {
            config: config.clone(),
            catalog,
            coordinator,
            router,
        })
    }
}
