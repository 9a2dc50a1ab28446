use matcher_errors::{MatchingError, MatchingResult};
use sqlx::SqlitePool;
use tracing::debug;

/// 匹配所需的表结构，全部使用 `IF NOT EXISTS`，可重复执行
pub const SCHEMA_STATEMENTS: [&str; 7] = [
    r#"
    CREATE TABLE IF NOT EXISTS chair_models (
        name TEXT PRIMARY KEY,
        speed INTEGER NOT NULL
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS chairs (
        id TEXT PRIMARY KEY,
        owner_id TEXT NOT NULL,
        name TEXT NOT NULL,
        model TEXT NOT NULL,
        is_active BOOLEAN NOT NULL DEFAULT FALSE,
        created_at DATETIME NOT NULL,
        updated_at DATETIME NOT NULL
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS chair_locations (
        chair_id TEXT PRIMARY KEY,
        latitude INTEGER NOT NULL,
        longitude INTEGER NOT NULL,
        created_at DATETIME NOT NULL
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS rides (
        id TEXT PRIMARY KEY,
        user_id TEXT NOT NULL,
        chair_id TEXT,
        pickup_latitude INTEGER NOT NULL,
        pickup_longitude INTEGER NOT NULL,
        destination_latitude INTEGER NOT NULL,
        destination_longitude INTEGER NOT NULL,
        created_at DATETIME NOT NULL,
        updated_at DATETIME NOT NULL
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS ride_statuses (
        id TEXT PRIMARY KEY,
        ride_id TEXT NOT NULL,
        status TEXT NOT NULL,
        created_at DATETIME NOT NULL,
        chair_sent_at DATETIME
    )
    "#,
    "CREATE INDEX IF NOT EXISTS idx_rides_unmatched ON rides (chair_id, created_at)",
    "CREATE INDEX IF NOT EXISTS idx_ride_statuses_ride ON ride_statuses (ride_id)",
];

pub async fn run_migrations(pool: &SqlitePool) -> MatchingResult<()> {
    for statement in SCHEMA_STATEMENTS {
        sqlx::query(statement)
            .execute(pool)
            .await
            .map_err(MatchingError::Database)?;
    }
    debug!("数据库表结构已就绪");
    Ok(())
}
