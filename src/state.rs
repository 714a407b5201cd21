use crate::config::{AppConfig, StoreKind};
use crate::db;
use crate::users::{
    memory::MemoryUserRepository,
    password::Hasher,
    repo::{PgUserRepository, UserRepository},
};
use std::sync::Arc;

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub users: Arc<dyn UserRepository>,
    pub hasher: Hasher,
}

impl AppState {
    pub async fn init(config: AppConfig) -> anyhow::Result<Self> {
        let config = Arc::new(config);
        let hasher = Hasher::new(&config.hash)?;

        let users = match config.store {
            StoreKind::Postgres => {
                let pool = db::connect(&config).await?;
                if config.run_migrations {
                    db::migrate(&pool).await?;
                }
                Arc::new(PgUserRepository::new(pool)) as Arc<dyn UserRepository>
            }
            StoreKind::Memory => {
                tracing::warn!("using in-memory user store; data is lost on exit");
                Arc::new(MemoryUserRepository::new()) as Arc<dyn UserRepository>
            }
        };

        Ok(Self::from_parts(config, users, hasher))
    }

    pub fn from_parts(config: Arc<AppConfig>, users: Arc<dyn UserRepository>, hasher: Hasher) -> Self {
        Self {
            config,
            users,
            hasher,
        }
    }

    /// Empty in-memory store with cheap hashing.
    pub fn in_memory() -> anyhow::Result<Self> {
        let config = Arc::new(AppConfig::in_memory());
        let hasher = Hasher::new(&config.hash)?;
        let users = Arc::new(MemoryUserRepository::new()) as Arc<dyn UserRepository>;
        Ok(Self::from_parts(config, users, hasher))
    }
}
