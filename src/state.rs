use std::sync::Arc;

use sqlx::PgPool;

use crate::auth::{PasswordHasher, TokenService};
use crate::config::AppConfig;
use crate::database::DatabaseManager;

/// Shared by every handler and middleware.
#[derive(Clone)]
pub struct AppState {
    pub pool: PgPool,
    pub tokens: Arc<TokenService>,
    pub hasher: PasswordHasher,
}

impl AppState {
    pub fn new(pool: PgPool, tokens: TokenService, hasher: PasswordHasher) -> Self {
        Self {
            pool,
            tokens: Arc::new(tokens),
            hasher,
        }
    }

    /// Builds the lazy pool, token service and hasher from configuration.
    pub fn from_config(config: &AppConfig) -> anyhow::Result<Self> {
        let pool = DatabaseManager::connect_lazy(&config.database)?;
        let tokens = TokenService::from_config(&config.security)?;
        let hasher = PasswordHasher::new(config.security.password_work_factor)?;
        Ok(Self::new(pool, tokens, hasher))
    }
}
