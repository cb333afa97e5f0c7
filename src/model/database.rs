use std::path::Path;

use sqlx::PgPool;
use sqlx::migrate::Migrator;

use crate::model::error::StoreResult;

#[derive(Debug, Clone)]
pub struct DbConnection {
    pool: PgPool, // cloning is cheap, pool is just a wrapper around Arc<>
}

impl DbConnection {
    pub fn connect(connection_str: &str) -> StoreResult<Self> {
        let pool = PgPool::connect_lazy(connection_str)?;
        Ok(Self { pool })
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    pub fn from_pool(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Applies the SQL files of `dir` that were not applied yet.
    pub async fn migrate(&self, dir: &Path) -> StoreResult<()> {
        let migrator = Migrator::new(dir).await?;
        tracing::debug!("applying migrations from {}...", dir.display());
        migrator.run(&self.pool).await?;
        Ok(())
    }
}
