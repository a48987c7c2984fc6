use std::sync::Arc;

use anyhow::Context;
use sqlx::postgres::PgPoolOptions;

use kidstock_infra::{
    config::{AppConfig, StoreBackend},
    services::{GroupService, StockService},
    store::{EntityStore, InMemoryEntityStore, PostgresEntityStore},
};
use kidstock_inventory::default_catalog;

/// Type-erased store shared by every service.
pub type SharedStore = Arc<dyn EntityStore>;

#[derive(Clone)]
pub struct AppServices {
    pub groups: GroupService<SharedStore>,
    pub stock: StockService<SharedStore>,
}

impl AppServices {
    pub fn from_store(store: SharedStore) -> Self {
        Self {
            groups: GroupService::new(store.clone()),
            stock: StockService::new(store),
        }
    }

    /// In-memory services with the default catalog seeded (tests, local dev).
    pub async fn in_memory() -> anyhow::Result<Self> {
        let services = Self::from_store(Arc::new(InMemoryEntityStore::new()));
        services.groups.seed_categories(default_catalog()).await?;
        Ok(services)
    }
}

/// Wire the store selected by `config`, migrating and seeding as configured.
pub async fn build_services(config: &AppConfig) -> anyhow::Result<AppServices> {
    let store: SharedStore = match &config.store {
        StoreBackend::Memory => {
            tracing::info!("using in-memory entity store");
            Arc::new(InMemoryEntityStore::new())
        }
        StoreBackend::Postgres {
            database_url,
            max_connections,
        } => {
            tracing::info!(max_connections, "using postgres entity store");
            let pool = PgPoolOptions::new()
                .max_connections(*max_connections)
                .connect(database_url)
                .await
                .context("failed to connect to postgres")?;
            let store = PostgresEntityStore::new(pool);
            store.migrate().await.context("failed to migrate schema")?;
            Arc::new(store)
        }
    };

    let services = AppServices::from_store(store);
    if config.seed_categories {
        services
            .groups
            .seed_categories(default_catalog())
            .await
            .context("failed to seed clothing categories")?;
    }
    Ok(services)
}
