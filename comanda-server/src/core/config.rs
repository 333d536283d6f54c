/// Server configuration
///
/// # Environment variables
///
/// | Variable | Default | Meaning |
/// |----------|---------|---------|
/// | HTTP_PORT | 3000 | HTTP API port |
/// | MENU_PATH | (none) | JSON menu file for the static catalog |
/// | LOG_DIR | (none) | daily rolling log directory; stdout only when unset |
/// | EVENT_BUFFER | 64 | per-session notification outbox capacity |
/// | REQUEST_TIMEOUT_MS | 30000 | request timeout in milliseconds |
/// | ENVIRONMENT | development | development \| staging \| production |
///
/// # Example
///
/// ```ignore
/// HTTP_PORT=8080 MENU_PATH=menu.json cargo run
/// ```
#[derive(Debug, Clone)]
pub struct Config {
    /// HTTP API port
    pub http_port: u16,
    /// Path to the JSON menu the static catalog loads on boot
    pub menu_path: Option<String>,
    /// Log directory; `None` logs to stdout only
    pub log_dir: Option<String>,
    /// Per-session outbox capacity of the notification router
    pub event_buffer: usize,
    /// Request timeout (milliseconds)
    pub request_timeout_ms: u64,
    /// development | staging | production
    pub environment: String,
}

impl Config {
    /// Load configuration from environment variables, with defaults
    pub fn from_env() -> Self {
        Self {
            http_port: std::env::var("HTTP_PORT")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(3000),
            menu_path: std::env::var("MENU_PATH").ok(),
            log_dir: std::env::var("LOG_DIR").ok(),
            event_buffer: std::env::var("EVENT_BUFFER")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(64),
            request_timeout_ms: std::env::var("REQUEST_TIMEOUT_MS")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(30000),
            environment: std::env::var("ENVIRONMENT").unwrap_or_else(|_| "development".into()),
        }
    }

    pub fn is_production(&self) -> bool {
        self.environment == "production"
    }

    pub fn is_development(&self) -> bool {
        self.environment == "development"
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::from_env()
    }
}
