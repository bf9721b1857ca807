use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use crate::config::ServerConfig;

/// Shared application state available to all Axum handlers via `State<AppState>`.
///
/// This is cheaply cloneable (inner data is behind `Arc` or is already `Clone`).
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool.
    pub pool: bosssec_db::DbPool,
    /// Server configuration.
    pub config: Arc<ServerConfig>,
    /// Set when rules changed since the dialplan was last applied.
    pub reload: Arc<ReloadFlag>,
}

impl AppState {
    pub fn new(pool: bosssec_db::DbPool, config: ServerConfig) -> Self {
        Self {
            pool,
            config: Arc::new(config),
            reload: Arc::new(ReloadFlag::default()),
        }
    }
}

/// Tracks whether the generated dialplan is out of date.
#[derive(Debug, Default)]
pub struct ReloadFlag(AtomicBool);

impl ReloadFlag {
    /// Record that the rule store changed.
    pub fn mark(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    /// Clear the flag and return whether it was set.
    ///
    /// Changes marked after this call stay pending even if a rebuild based on
    /// an earlier snapshot completes later.
    pub fn take(&self) -> bool {
        self.0.swap(false, Ordering::SeqCst)
    }

    pub fn is_pending(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}
