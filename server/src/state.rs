use std::sync::Arc;

use chrono::Duration;

use crate::auth::SessionKeys;
use crate::config::Config;
use crate::store::Store;

#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn Store>,
    pub sessions: SessionKeys,
    pub config: Arc<Config>,
}

impl AppState {
    pub fn new(store: Arc<dyn Store>, config: Config) -> Self {
        let sessions = SessionKeys::new(
            &config.jwt_secret,
            Duration::hours(config.session_ttl_hours),
        );
        Self {
            store,
            sessions,
            config: Arc::new(config),
        }
    }
}
