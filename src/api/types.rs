//! Shared types for the HTTP layer.

use std::sync::Arc;

use crate::config::AppConfig;
use crate::db::SharedStore;
use crate::session::SessionGate;

/// Shared context for all routes and middleware.
#[derive(Clone)]
pub struct ApiContext {
    pub store: SharedStore,
    pub sessions: Arc<SessionGate>,
}

impl ApiContext {
    pub fn new(store: SharedStore, sessions: SessionGate) -> Self {
        Self {
            store,
            sessions: Arc::new(sessions),
        }
    }

    pub fn from_config(config: &AppConfig, store: SharedStore) -> Self {
        Self::new(
            store,
            SessionGate::new(
                &config.session_secret,
                &config.login_password,
                config.session_ttl_secs,
            ),
        )
    }
}
