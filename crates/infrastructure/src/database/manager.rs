use std::time::Duration;

use matcher_config::DatabaseConfig;
use matcher_errors::{MatchingError, MatchingResult};
use sqlx::sqlite::SqlitePoolOptions;
use sqlx::SqlitePool;
use tracing::{info, warn};

use super::schema::run_migrations;
use super::sqlite::{SqliteFleetRepository, SqliteMatchingStore};

/// SQLite 连接池管理
pub struct DatabaseManager {
    pool: SqlitePool,
}

impl DatabaseManager {
    pub async fn new(config: &DatabaseConfig) -> MatchingResult<Self> {
        let mut options = SqlitePoolOptions::new()
            .max_connections(config.max_connections)
            .min_connections(config.min_connections)
            .acquire_timeout(Duration::from_secs(config.connection_timeout_seconds));

        // 内存数据库随连接关闭而消失，连接不能被回收；
        // 每个连接各自打开一个独立的空库，因此只能使用单个连接
        if is_in_memory(&config.url) {
            if config.max_connections > 1 {
                warn!(
                    "内存数据库只能使用单个连接，忽略 max_connections = {}",
                    config.max_connections
                );
            }
            options = options
                .max_connections(1)
                .min_connections(1)
                .idle_timeout(None)
                .max_lifetime(None);
        } else {
            options = options
                .idle_timeout(Duration::from_secs(config.idle_timeout_seconds))
                .max_lifetime(Duration::from_secs(1800));
        }

        let pool = options
            .connect(&config.url)
            .await
            .map_err(MatchingError::Database)?;

        info!("已连接数据库: {}", config.url);
        Ok(Self { pool })
    }

    pub fn from_pool(pool: SqlitePool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    pub async fn migrate(&self) -> MatchingResult<()> {
        run_migrations(&self.pool).await
    }

    pub async fn health_check(&self) -> MatchingResult<()> {
        sqlx::query("SELECT 1")
            .execute(&self.pool)
            .await
            .map_err(MatchingError::Database)?;
        Ok(())
    }

    pub async fn close(&self) {
        self.pool.close().await;
    }

    pub fn matching_store(&self, terminal_status_count: u32) -> SqliteMatchingStore {
        SqliteMatchingStore::new(self.pool.clone(), terminal_status_count)
    }

    pub fn fleet_repository(&self) -> SqliteFleetRepository {
        SqliteFleetRepository::new(self.pool.clone())
    }
}

fn is_in_memory(url: &str) -> bool {
    url.contains(":memory:") || url.contains("mode=memory")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn memory_config() -> DatabaseConfig {
        DatabaseConfig {
            url: "sqlite::memory:".to_string(),
            max_connections: 1,
            min_connections: 1,
            connection_timeout_seconds: 5,
            idle_timeout_seconds: 60,
            run_migrations: true,
        }
    }

    #[test]
    fn test_in_memory_detection() {
        assert!(is_in_memory("sqlite::memory:"));
        assert!(is_in_memory("sqlite://rides?mode=memory&cache=shared"));
        assert!(!is_in_memory("sqlite://matcher.db?mode=rwc"));
    }

    #[tokio::test]
    async fn test_sqlite_database_manager() {
        let db_manager = DatabaseManager::new(&memory_config()).await.unwrap();

        assert!(db_manager.health_check().await.is_ok());
        db_manager.migrate().await.unwrap();
        // migrations are idempotent
        db_manager.migrate().await.unwrap();

        let _store = db_manager.matching_store(6);
        let _fleet = db_manager.fleet_repository();

        db_manager.close().await;
    }

    #[tokio::test]
    async fn test_in_memory_pool_shares_one_database() {
        let config = DatabaseConfig {
            max_connections: 4,
            ..memory_config()
        };
        let db_manager = DatabaseManager::new(&config).await.unwrap();
        db_manager.migrate().await.unwrap();

        let count = |pool: SqlitePool| async move {
            sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM rides")
                .fetch_one(&pool)
                .await
        };
        let pool = db_manager.pool().clone();
        let (a, b, c) = tokio::join!(count(pool.clone()), count(pool.clone()), count(pool));

        assert_eq!(a.unwrap(), 0);
        assert_eq!(b.unwrap(), 0);
        assert_eq!(c.unwrap(), 0);
        assert_eq!(db_manager.pool().options().get_max_connections(), 1);

        db_manager.close().await;
    }
}
