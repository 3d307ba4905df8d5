use pizzeria_core::config::{AppConfig, StoreBackend};
use thiserror::Error;

use crate::fixtures::{CatalogFixture, SeedResult};
use crate::repositories::RepositoryError;
use crate::service::PizzeriaService;
use crate::{connect_with_config, migrations, DbPool};

/// A ready service plus whatever was set up on the way. `pool` is only
/// present for the SQLite backend.
pub struct OpenedService {
    pub service: PizzeriaService,
    pub pool: Option<DbPool>,
    pub seeded: Option<SeedResult>,
}

#[derive(Debug, Error)]
pub enum BootstrapError {
    #[error("database connection failed: {0}")]
    DatabaseConnect(#[source] sqlx::Error),
    #[error("database migration failed: {0}")]
    Migration(#[source] sqlx::migrate::MigrateError),
    #[error("catalog seeding failed: {0}")]
    Seed(#[source] RepositoryError),
}

pub async fn open_service(config: &AppConfig) -> Result<OpenedService, BootstrapError> {
    let (service, pool) = match config.store.backend {
        StoreBackend::Memory => (PizzeriaService::in_memory(), None),
        StoreBackend::Sqlite => {
            let pool = connect_with_config(&config.database)
                .await
                .map_err(BootstrapError::DatabaseConnect)?;
            migrations::run_pending(&pool).await.map_err(BootstrapError::Migration)?;
            (PizzeriaService::sql(pool.clone()), Some(pool))
        }
    };

    let seeded = if config.store.seed_catalog {
        let result =
            CatalogFixture::load(service.pizza_repository(), service.topping_repository())
                .await
                .map_err(BootstrapError::Seed)?;
        Some(result)
    } else {
        None
    };

    Ok(OpenedService { service, pool, seeded })
}
