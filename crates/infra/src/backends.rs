//! Storage wiring: Postgres when a database URL is configured, in-memory
//! otherwise.

use std::sync::Arc;

use sqlx::postgres::PgPoolOptions;

use crate::config::AppConfig;
use crate::directory::{EmployeeDirectory, InMemoryEmployeeDirectory, PostgresEmployeeDirectory};
use crate::store::postgres::map_sqlx_error;
use crate::store::{InMemoryNetworkStore, NetworkStore, PostgresNetworkStore, StoreError};

#[derive(Clone)]
pub struct Backends {
    pub network: Arc<dyn NetworkStore>,
    pub employees: Arc<dyn EmployeeDirectory>,
}

impl Backends {
    pub fn in_memory() -> Self {
        Self {
            network: Arc::new(InMemoryNetworkStore::new()),
            employees: Arc::new(InMemoryEmployeeDirectory::new()),
        }
    }

    pub async fn connect(config: &AppConfig) -> Result<Self, StoreError> {
        let Some(url) = config.database_url.as_deref() else {
            tracing::info!("DATABASE_URL not set; using in-memory stores");
            return Ok(Self::in_memory());
        };

        let pool = PgPoolOptions::new()
            .max_connections(config.database_max_connections)
            .connect(url)
            .await
            .map_err(|e| map_sqlx_error("connect", e))?;

        let network = PostgresNetworkStore::new(pool.clone());
        network.migrate().await?;
        tracing::info!(max_connections = config.database_max_connections, "connected to postgres");

        Ok(Self {
            network: Arc::new(network),
            employees: Arc::new(PostgresEmployeeDirectory::new(pool)),
        })
    }
}
