use chrono::Utc;
use matcher_domain::{Chair, ChairModel, Coordinate, Ride, RideStatus, RideStatusEvent};
use matcher_errors::{MatchingError, MatchingResult};
use sqlx::{Row, SqlitePool};
use tracing::debug;
use uuid::Uuid;

/// 车队与行程数据的写入端
///
/// 匹配核心只读取这些数据；行程创建、椅子上报位置、状态确认
/// 由外部系统驱动，这里提供给模拟器和测试使用。
pub struct SqliteFleetRepository {
    pool: SqlitePool,
}

impl SqliteFleetRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    pub async fn insert_chair_model(&self, model: &ChairModel) -> MatchingResult<()> {
        sqlx::query(
            r#"
            INSERT INTO chair_models (name, speed) VALUES ($1, $2)
            ON CONFLICT(name) DO UPDATE SET speed = excluded.speed
            "#,
        )
        .bind(&model.name)
        .bind(model.speed)
        .execute(&self.pool)
        .await
        .map_err(MatchingError::Database)?;

        debug!("写入椅子型号: {} (速度 {})", model.name, model.speed);
        Ok(())
    }

    pub async fn insert_chair(&self, chair: &Chair) -> MatchingResult<()> {
        sqlx::query(
            r#"
            INSERT INTO chairs (id, owner_id, name, model, is_active, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            ON CONFLICT(id) DO UPDATE SET
                name = excluded.name,
                model = excluded.model,
                is_active = excluded.is_active,
                updated_at = excluded.updated_at
            "#,
        )
        .bind(&chair.id)
        .bind(&chair.owner_id)
        .bind(&chair.name)
        .bind(&chair.model)
        .bind(chair.is_active)
        .bind(chair.created_at)
        .bind(chair.updated_at)
        .execute(&self.pool)
        .await
        .map_err(MatchingError::Database)?;

        debug!("写入椅子: {}", chair.id);
        Ok(())
    }

    /// 覆盖椅子的最新位置
    pub async fn update_chair_location(&self, chair_id: &str, at: Coordinate) -> MatchingResult<()> {
        sqlx::query(
            r#"
            INSERT INTO chair_locations (chair_id, latitude, longitude, created_at)
            VALUES ($1, $2, $3, $4)
            ON CONFLICT(chair_id) DO UPDATE SET
                latitude = excluded.latitude,
                longitude = excluded.longitude,
                created_at = excluded.created_at
            "#,
        )
        .bind(chair_id)
        .bind(at.latitude)
        .bind(at.longitude)
        .bind(Utc::now())
        .execute(&self.pool)
        .await
        .map_err(MatchingError::Database)?;

        Ok(())
    }

    pub async fn insert_ride(&self, ride: &Ride) -> MatchingResult<()> {
        sqlx::query(
            r#"
            INSERT INTO rides (id, user_id, chair_id, pickup_latitude, pickup_longitude,
                               destination_latitude, destination_longitude, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            "#,
        )
        .bind(&ride.id)
        .bind(&ride.user_id)
        .bind(&ride.chair_id)
        .bind(ride.pickup.latitude)
        .bind(ride.pickup.longitude)
        .bind(ride.destination.latitude)
        .bind(ride.destination.longitude)
        .bind(ride.created_at)
        .bind(ride.updated_at)
        .execute(&self.pool)
        .await
        .map_err(MatchingError::Database)?;

        debug!("写入行程: {}", ride.id);
        Ok(())
    }

    /// 行程当前匹配到的椅子，行程不存在时返回 `RideNotFound`
    pub async fn ride_chair(&self, ride_id: &str) -> MatchingResult<Option<String>> {
        let chair_id: Option<Option<String>> =
            sqlx::query_scalar("SELECT chair_id FROM rides WHERE id = $1")
                .bind(ride_id)
                .fetch_optional(&self.pool)
                .await
                .map_err(MatchingError::Database)?;

        chair_id.ok_or_else(|| MatchingError::ride_not_found(ride_id))
    }

    /// 追加一条状态事件，返回事件ID
    pub async fn append_ride_status(
        &self,
        ride_id: &str,
        status: RideStatus,
        acknowledged: bool,
    ) -> MatchingResult<String> {
        let now = Utc::now();
        let event_id = Uuid::new_v4().to_string();

        sqlx::query(
            "INSERT INTO ride_statuses (id, ride_id, status, created_at, chair_sent_at) VALUES ($1, $2, $3, $4, $5)",
        )
        .bind(&event_id)
        .bind(ride_id)
        .bind(status)
        .bind(now)
        .bind(acknowledged.then_some(now))
        .execute(&self.pool)
        .await
        .map_err(MatchingError::Database)?;

        Ok(event_id)
    }

    /// 记录椅子已确认某个状态事件
    pub async fn acknowledge_status(&self, status_id: &str) -> MatchingResult<()> {
        let result = sqlx::query(
            "UPDATE ride_statuses SET chair_sent_at = $1 WHERE id = $2 AND chair_sent_at IS NULL",
        )
        .bind(Utc::now())
        .bind(status_id)
        .execute(&self.pool)
        .await
        .map_err(MatchingError::Database)?;

        if result.rows_affected() == 0 {
            debug!("状态事件 {} 不存在或已确认", status_id);
        }
        Ok(())
    }

    /// 行程的状态历史，按发生顺序排列
    pub async fn status_history(&self, ride_id: &str) -> MatchingResult<Vec<RideStatusEvent>> {
        let rows = sqlx::query(
            r#"
            SELECT id, ride_id, status, created_at, chair_sent_at
            FROM ride_statuses
            WHERE ride_id = $1
            ORDER BY created_at, rowid
            "#,
        )
        .bind(ride_id)
        .fetch_all(&self.pool)
        .await
        .map_err(MatchingError::Database)?;

        rows.iter()
            .map(|row| -> MatchingResult<RideStatusEvent> {
                Ok(RideStatusEvent {
                    id: row.try_get("id")?,
                    ride_id: row.try_get("ride_id")?,
                    status: row.try_get("status")?,
                    created_at: row.try_get("created_at")?,
                    chair_sent_at: row.try_get("chair_sent_at")?,
                })
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::schema::run_migrations;
    use sqlx::sqlite::SqlitePoolOptions;

    async fn setup_test_db() -> SqlitePool {
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect("sqlite::memory:")
            .await
            .unwrap();
        run_migrations(&pool).await.unwrap();
        pool
    }

    #[tokio::test]
    async fn test_ride_chair_follows_assignment() {
        let pool = setup_test_db().await;
        let fleet = SqliteFleetRepository::new(pool.clone());
        let now = Utc::now();
        fleet
            .insert_ride(&Ride {
                id: "r1".to_string(),
                user_id: "u1".to_string(),
                pickup: Coordinate::new(0, 0),
                destination: Coordinate::new(3, 4),
                chair_id: None,
                created_at: now,
                updated_at: now,
            })
            .await
            .unwrap();

        assert_eq!(fleet.ride_chair("r1").await.unwrap(), None);

        sqlx::query("UPDATE rides SET chair_id = 'c1' WHERE id = 'r1'")
            .execute(&pool)
            .await
            .unwrap();
        assert_eq!(fleet.ride_chair("r1").await.unwrap().as_deref(), Some("c1"));
    }

    #[tokio::test]
    async fn test_ride_chair_for_unknown_ride() {
        let fleet = SqliteFleetRepository::new(setup_test_db().await);

        let err = fleet.ride_chair("missing").await.unwrap_err();
        assert!(matches!(err, MatchingError::RideNotFound { ref id } if id == "missing"));
    }
}
