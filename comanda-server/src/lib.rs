//! Comanda Server - restaurant order lifecycle and real-time notifications
//!
//! # Architecture
//!
//! Orders, their line items and dining tables live in one in-memory
//! store mutated through single-writer transactions. The coordinator is
//! the only component that combines order and table mutations; committed
//! changes fan out to attached sessions through the notification router.
//!
//! # Module structure
//!
//! ```text
//! comanda-server/src/
//! ├── core/          # config, shared state, server lifecycle
//! ├── api/           # HTTP routes, handlers, WebSocket event feed
//! ├── coordinator/   # transactional command layer + role policy
//! ├── orders/        # order ledger (totals, state machines)
//! ├── tables/        # table registry
//! ├── notify/        # notification router (fan-out)
//! ├── catalog/       # catalog lookup seam
//! ├── store/         # transactional in-memory store
//! └── utils/         # errors, logging
//! ```

pub mod api;
pub mod catalog;
pub mod coordinator;
pub mod core;
pub mod notify;
pub mod orders;
pub mod store;
pub mod tables;
pub mod utils;

// Re-export public types
pub use catalog::{CatalogLookup, CatalogPrice, StaticCatalog};
pub use coordinator::Coordinator;
pub use core::{Config, Server, ServerState};
pub use notify::{NotificationRouter, SessionId};
pub use orders::{CreateOrder, FlowError, FlowResult, ItemAdvance, OrderFilter, OrderLedger};
pub use store::MemoryStore;
pub use tables::TableRegistry;
pub use utils::{AppError, AppResponse, AppResult};

// Re-export logger functions
pub use utils::logger::{init_logger, init_logger_with_file};

/// Load `.env` and initialize logging from LOG_LEVEL / LOG_DIR
pub fn setup_environment() -> Result<(), Box<dyn std::error::Error>> {
    dotenv::dotenv().ok();

    let log_level = std::env::var("LOG_LEVEL").ok();
    let log_dir = std::env::var("LOG_DIR").ok();
    init_logger_with_file(log_level.as_deref(), log_dir.as_deref());

    Ok(())
}

pub fn print_banner() {
    println!(
        r#"
   ______                                 __
  / ____/___  ____ ___  ____ _____  ____/ /___ _
 / /   / __ \/ __ `__ \/ __ `/ __ \/ __  / __ `/
/ /___/ /_/ / / / / / / /_/ / / / / /_/ / /_/ /
\____/\____/_/ /_/ /_/\__,_/_/ /_/\__,_/\__,_/
    "#
    );
}
