use async_trait::async_trait;
use chrono::Utc;
use matcher_domain::{
    AssignmentOutcome, ChairCandidate, Coordinate, MatchingStore, Ride,
};
use matcher_errors::{MatchingError, MatchingResult};
use sqlx::{Row, SqlitePool};
use tracing::debug;

pub struct SqliteMatchingStore {
    pool: SqlitePool,
    terminal_status_count: u32,
}

impl SqliteMatchingStore {
    pub fn new(pool: SqlitePool, terminal_status_count: u32) -> Self {
        Self {
            pool,
            terminal_status_count,
        }
    }

    fn row_to_ride(row: &sqlx::sqlite::SqliteRow) -> MatchingResult<Ride> {
        Ok(Ride {
            id: row.try_get("id")?,
            user_id: row.try_get("user_id")?,
            pickup: Coordinate::new(
                row.try_get("pickup_latitude")?,
                row.try_get("pickup_longitude")?,
            ),
            destination: Coordinate::new(
                row.try_get("destination_latitude")?,
                row.try_get("destination_longitude")?,
            ),
            chair_id: row.try_get("chair_id")?,
            created_at: row.try_get("created_at")?,
            updated_at: row.try_get("updated_at")?,
        })
    }

    fn row_to_candidate(row: &sqlx::sqlite::SqliteRow) -> MatchingResult<ChairCandidate> {
        let candidate = ChairCandidate {
            chair_id: row.try_get("chair_id")?,
            model: row.try_get("model")?,
            speed: row.try_get("speed")?,
            distance: row.try_get("distance")?,
        };
        candidate.validate()?;
        Ok(candidate)
    }
}

#[async_trait]
impl MatchingStore for SqliteMatchingStore {
    async fn fetch_unmatched_rides(&self, limit: u32) -> MatchingResult<Vec<Ride>> {
        let rows = sqlx::query(
            r#"
            SELECT id, user_id, chair_id, pickup_latitude, pickup_longitude,
                   destination_latitude, destination_longitude, created_at, updated_at
            FROM rides
            WHERE chair_id IS NULL
            ORDER BY created_at, id
            LIMIT $1
            "#,
        )
        .bind(i64::from(limit))
        .fetch_all(&self.pool)
        .await
        .map_err(MatchingError::Database)?;

        rows.iter().map(Self::row_to_ride).collect()
    }

    async fn fetch_active_candidates(&self, pickup: Coordinate) -> MatchingResult<Vec<ChairCandidate>> {
        // 没有位置记录的椅子无法计算距离，不参与匹配
        let rows = sqlx::query(
            r#"
            SELECT chairs.id AS chair_id,
                   chairs.model AS model,
                   chair_models.speed AS speed,
                   CAST(ABS(chair_locations.latitude - $1) + ABS(chair_locations.longitude - $2) AS REAL) AS distance
            FROM chairs
            JOIN chair_locations ON chairs.id = chair_locations.chair_id
            JOIN chair_models ON chairs.model = chair_models.name
            WHERE chairs.is_active = TRUE
            ORDER BY distance, chairs.created_at, chairs.id
            "#,
        )
        .bind(pickup.latitude)
        .bind(pickup.longitude)
        .fetch_all(&self.pool)
        .await
        .map_err(MatchingError::Database)?;

        rows.iter().map(Self::row_to_candidate).collect()
    }

    async fn chair_has_active_ride(&self, chair_id: &str) -> MatchingResult<bool> {
        let row = sqlx::query(
            r#"
            SELECT COUNT(*) AS unfinished
            FROM (
                SELECT rides.id, COUNT(ride_statuses.chair_sent_at) AS acknowledged
                FROM rides
                LEFT JOIN ride_statuses ON ride_statuses.ride_id = rides.id
                WHERE rides.chair_id = $1
                GROUP BY rides.id
            ) progress
            WHERE acknowledged < $2
            "#,
        )
        .bind(chair_id)
        .bind(i64::from(self.terminal_status_count))
        .fetch_one(&self.pool)
        .await
        .map_err(MatchingError::Database)?;

        let unfinished: i64 = row.try_get("unfinished")?;
        Ok(unfinished > 0)
    }

    async fn distance_between(&self, from: Coordinate, to: Coordinate) -> MatchingResult<f64> {
        Ok(from.distance_to(&to))
    }

    async fn assign_chair(&self, ride_id: &str, chair_id: &str) -> MatchingResult<AssignmentOutcome> {
        let result = sqlx::query(
            "UPDATE rides SET chair_id = $1, updated_at = $2 WHERE id = $3 AND chair_id IS NULL",
        )
        .bind(chair_id)
        .bind(Utc::now())
        .bind(ride_id)
        .execute(&self.pool)
        .await
        .map_err(MatchingError::Database)?;

        if result.rows_affected() == 1 {
            debug!("行程 {} 已分配给椅子 {}", ride_id, chair_id);
            return Ok(AssignmentOutcome::Assigned);
        }

        let current_chair: Option<Option<String>> =
            sqlx::query_scalar("SELECT chair_id FROM rides WHERE id = $1")
                .bind(ride_id)
                .fetch_optional(&self.pool)
                .await
                .map_err(MatchingError::Database)?;

        Ok(AssignmentOutcome::Conflict {
            current_chair: current_chair.flatten(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::schema::run_migrations;
    use crate::database::sqlite::SqliteFleetRepository;
    use chrono::Duration;
    use matcher_domain::{Chair, ChairModel, RideProgress, RideStatus};
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

    fn ride(id: &str, pickup: Coordinate, destination: Coordinate, age_secs: i64) -> Ride {
        let created_at = Utc::now() - Duration::seconds(age_secs);
        Ride {
            id: id.to_string(),
            user_id: "user-1".to_string(),
            pickup,
            destination,
            chair_id: None,
            created_at,
            updated_at: created_at,
        }
    }

    fn chair(id: &str, model: &str, is_active: bool) -> Chair {
        let now = Utc::now();
        Chair {
            id: id.to_string(),
            owner_id: "owner-1".to_string(),
            name: id.to_string(),
            model: model.to_string(),
            is_active,
            created_at: now,
            updated_at: now,
        }
    }

    async fn seed_chair(fleet: &SqliteFleetRepository, id: &str, model: &str, at: Coordinate) {
        fleet.insert_chair(&chair(id, model, true)).await.unwrap();
        fleet.update_chair_location(id, at).await.unwrap();
    }

    #[tokio::test]
    async fn test_fetch_unmatched_rides_oldest_first_with_limit() {
        let pool = setup_test_db().await;
        let fleet = SqliteFleetRepository::new(pool.clone());
        let store = SqliteMatchingStore::new(pool, 6);

        let origin = Coordinate::new(0, 0);
        fleet.insert_ride(&ride("newest", origin, origin, 10)).await.unwrap();
        fleet.insert_ride(&ride("oldest", origin, origin, 300)).await.unwrap();
        fleet.insert_ride(&ride("middle", origin, origin, 100)).await.unwrap();
        let mut matched = ride("matched", origin, origin, 500);
        matched.chair_id = Some("chair-x".to_string());
        fleet.insert_ride(&matched).await.unwrap();

        let rides = store.fetch_unmatched_rides(2).await.unwrap();
        let ids: Vec<&str> = rides.iter().map(|r| r.id.as_str()).collect();
        assert_eq!(ids, vec!["oldest", "middle"]);
    }

    #[tokio::test]
    async fn test_candidates_sorted_by_distance_with_speed() {
        let pool = setup_test_db().await;
        let fleet = SqliteFleetRepository::new(pool.clone());
        let store = SqliteMatchingStore::new(pool, 6);

        fleet
            .insert_chair_model(&ChairModel { name: "slow".to_string(), speed: 2 })
            .await
            .unwrap();
        fleet
            .insert_chair_model(&ChairModel { name: "fast".to_string(), speed: 7 })
            .await
            .unwrap();

        seed_chair(&fleet, "far", "fast", Coordinate::new(10, 10)).await;
        seed_chair(&fleet, "near", "slow", Coordinate::new(1, 1)).await;
        // inactive chairs and chairs without a location are not candidates
        fleet.insert_chair(&chair("inactive", "slow", false)).await.unwrap();
        fleet
            .update_chair_location("inactive", Coordinate::new(0, 0))
            .await
            .unwrap();
        fleet.insert_chair(&chair("nowhere", "slow", true)).await.unwrap();

        let candidates = store
            .fetch_active_candidates(Coordinate::new(0, 0))
            .await
            .unwrap();

        assert_eq!(candidates.len(), 2);
        assert_eq!(candidates[0].chair_id, "near");
        assert_eq!(candidates[0].distance, 2.0);
        assert_eq!(candidates[0].speed, 2);
        assert_eq!(candidates[1].chair_id, "far");
        assert_eq!(candidates[1].distance, 20.0);
        assert_eq!(candidates[1].speed, 7);
    }

    #[tokio::test]
    async fn test_zero_speed_model_is_invalid_data() {
        let pool = setup_test_db().await;
        let fleet = SqliteFleetRepository::new(pool.clone());
        let store = SqliteMatchingStore::new(pool, 6);

        fleet
            .insert_chair_model(&ChairModel { name: "broken".to_string(), speed: 0 })
            .await
            .unwrap();
        seed_chair(&fleet, "c1", "broken", Coordinate::new(0, 0)).await;

        let result = store.fetch_active_candidates(Coordinate::new(0, 0)).await;
        assert!(matches!(result, Err(MatchingError::InvalidData(_))));
    }

    #[tokio::test]
    async fn test_chair_busy_until_six_acknowledged_events() {
        let pool = setup_test_db().await;
        let fleet = SqliteFleetRepository::new(pool.clone());
        let store = SqliteMatchingStore::new(pool, 6);

        assert!(!store.chair_has_active_ride("c1").await.unwrap());

        let origin = Coordinate::new(0, 0);
        let mut prior = ride("prior", origin, origin, 600);
        prior.chair_id = Some("c1".to_string());
        fleet.insert_ride(&prior).await.unwrap();

        // matched but no status yet: busy
        assert!(store.chair_has_active_ride("c1").await.unwrap());

        for status in &RideStatus::LIFECYCLE[..5] {
            fleet
                .append_ride_status("prior", *status, true)
                .await
                .unwrap();
        }
        assert!(store.chair_has_active_ride("c1").await.unwrap());

        // unacknowledged terminal status does not count
        let completed_id = fleet
            .append_ride_status("prior", RideStatus::Completed, false)
            .await
            .unwrap();
        assert!(store.chair_has_active_ride("c1").await.unwrap());

        fleet.acknowledge_status(&completed_id).await.unwrap();
        assert!(!store.chair_has_active_ride("c1").await.unwrap());

        let history = fleet.status_history("prior").await.unwrap();
        let statuses: Vec<RideStatus> = history.iter().map(|event| event.status).collect();
        assert_eq!(statuses, RideStatus::LIFECYCLE.to_vec());
        assert!(RideProgress::from_events(&history).is_complete(6));
    }

    #[tokio::test]
    async fn test_assign_chair_is_conditional() {
        let pool = setup_test_db().await;
        let fleet = SqliteFleetRepository::new(pool.clone());
        let store = SqliteMatchingStore::new(pool, 6);

        let origin = Coordinate::new(0, 0);
        fleet.insert_ride(&ride("r1", origin, origin, 10)).await.unwrap();

        let first = store.assign_chair("r1", "c1").await.unwrap();
        assert_eq!(first, AssignmentOutcome::Assigned);

        let second = store.assign_chair("r1", "c2").await.unwrap();
        assert_eq!(
            second,
            AssignmentOutcome::Conflict {
                current_chair: Some("c1".to_string())
            }
        );

        let missing = store.assign_chair("ghost", "c2").await.unwrap();
        assert_eq!(missing, AssignmentOutcome::Conflict { current_chair: None });

        assert!(store.fetch_unmatched_rides(10).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_distance_is_manhattan() {
        let pool = setup_test_db().await;
        let store = SqliteMatchingStore::new(pool, 6);

        let distance = store
            .distance_between(Coordinate::new(1, 2), Coordinate::new(4, -2))
            .await
            .unwrap();
        assert_eq!(distance, 7.0);
    }
}
