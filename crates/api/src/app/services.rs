use std::sync::Arc;

use stockroom_infra::{
    AppConfig, CatalogManager, InMemoryInventoryStore, OrderManager, PostgresInventoryStore,
    SharedStore, db,
};

/// Managers shared by every request handler.
#[derive(Clone)]
pub struct AppServices {
    pub catalog: CatalogManager<SharedStore>,
    pub orders: OrderManager<SharedStore>,
}

impl AppServices {
    pub fn new(store: SharedStore) -> Self {
        Self {
            catalog: CatalogManager::new(store.clone()),
            orders: OrderManager::new(store),
        }
    }

    pub fn in_memory(store: InMemoryInventoryStore) -> Self {
        Self::new(Arc::new(store))
    }
}

/// Pick the storage backend from configuration and wire the managers over it.
pub async fn build_services(config: &AppConfig) -> anyhow::Result<AppServices> {
    match &config.postgres {
        Some(pg) => {
            let pool = db::connect(pg).await?;
            tracing::info!(max_connections = pg.max_connections, "connected to postgres");
            Ok(AppServices::new(Arc::new(PostgresInventoryStore::new(pool))))
        }
        None => {
            tracing::warn!("no postgres section configured; using in-memory demo catalog");
            Ok(AppServices::in_memory(InMemoryInventoryStore::demo()?))
        }
    }
}
