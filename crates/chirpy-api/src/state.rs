//! Application state management

use crate::auth::SessionService;
use chirpy_core::config::AppConfig;
use chirpy_core::{ChirpStore, MemoryStore, RefreshTokenStore, UserStore};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

/// Application state shared across handlers
pub struct AppState {
    /// Application configuration
    pub config: AppConfig,
    /// Requests served by the `/app` file server
    pub fileserver_hits: AtomicU64,
    /// Login, refresh, revoke and bearer authorization
    pub sessions: SessionService,
    pub users: Arc<dyn UserStore>,
    pub chirps: Arc<dyn ChirpStore>,
    pub refresh_tokens: Arc<dyn RefreshTokenStore>,
}

impl AppState {
    /// Create state over the given stores
    pub fn new(
        config: AppConfig,
        users: Arc<dyn UserStore>,
        chirps: Arc<dyn ChirpStore>,
        refresh_tokens: Arc<dyn RefreshTokenStore>,
    ) -> Self {
        let sessions = SessionService::new(users.clone(), refresh_tokens.clone(), &config.auth);

        Self {
            config,
            fileserver_hits: AtomicU64::new(0),
            sessions,
            users,
            chirps,
            refresh_tokens,
        }
    }

    /// State backed entirely by one [`MemoryStore`]
    pub fn in_memory(config: AppConfig) -> Self {
        let store = Arc::new(MemoryStore::new());
        Self::new(config, store.clone(), store.clone(), store)
    }

    /// Replace the session service (tests swap in cheap password hashing)
    pub fn with_sessions(mut self, sessions: SessionService) -> Self {
        self.sessions = sessions;
        self
    }

    /// Increment the file server hit counter, returning the previous value
    pub fn record_hit(&self) -> u64 {
        self.fileserver_hits.fetch_add(1, Ordering::SeqCst)
    }

    pub fn hits(&self) -> u64 {
        self.fileserver_hits.load(Ordering::SeqCst)
    }

    pub fn reset_hits(&self) {
        self.fileserver_hits.store(0, Ordering::SeqCst);
    }
}

impl Default for AppState {
    fn default() -> Self {
        Self::in_memory(AppConfig::default())
    }
}
