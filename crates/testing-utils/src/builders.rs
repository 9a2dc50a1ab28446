//! Test data builders for creating matcher entities
//!
//! Builders start from sensible defaults; override only what a test cares
//! about.

use chrono::{DateTime, Duration, Utc};
use matcher_domain::{Chair, ChairModel, Coordinate, Ride};

/// Builder for creating test Ride entities
pub struct RideBuilder {
    ride: Ride,
}

impl RideBuilder {
    pub fn new() -> Self {
        let now = Utc::now();
        Self {
            ride: Ride {
                id: "ride-1".to_string(),
                user_id: "user-1".to_string(),
                pickup: Coordinate::new(0, 0),
                destination: Coordinate::new(0, 0),
                chair_id: None,
                created_at: now,
                updated_at: now,
            },
        }
    }

    pub fn with_id(mut self, id: &str) -> Self {
        self.ride.id = id.to_string();
        self
    }

    pub fn with_user_id(mut self, user_id: &str) -> Self {
        self.ride.user_id = user_id.to_string();
        self
    }

    pub fn with_pickup(mut self, pickup: Coordinate) -> Self {
        self.ride.pickup = pickup;
        self
    }

    pub fn with_destination(mut self, destination: Coordinate) -> Self {
        self.ride.destination = destination;
        self
    }

    pub fn with_created_at(mut self, created_at: DateTime<Utc>) -> Self {
        self.ride.created_at = created_at;
        self.ride.updated_at = created_at;
        self
    }

    /// Backdate creation so rides can be ordered by age
    pub fn created_secs_ago(self, seconds: i64) -> Self {
        self.with_created_at(Utc::now() - Duration::seconds(seconds))
    }

    pub fn matched_to(mut self, chair_id: &str) -> Self {
        self.ride.chair_id = Some(chair_id.to_string());
        self
    }

    pub fn build(self) -> Ride {
        self.ride
    }
}

impl Default for RideBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Builder for creating test Chair entities
pub struct ChairBuilder {
    chair: Chair,
}

impl ChairBuilder {
    pub fn new() -> Self {
        let now = Utc::now();
        Self {
            chair: Chair {
                id: "chair-1".to_string(),
                owner_id: "owner-1".to_string(),
                name: "chair-1".to_string(),
                model: "standard".to_string(),
                is_active: true,
                created_at: now,
                updated_at: now,
            },
        }
    }

    pub fn with_id(mut self, id: &str) -> Self {
        self.chair.id = id.to_string();
        self.chair.name = id.to_string();
        self
    }

    pub fn with_owner_id(mut self, owner_id: &str) -> Self {
        self.chair.owner_id = owner_id.to_string();
        self
    }

    pub fn with_model(mut self, model: &str) -> Self {
        self.chair.model = model.to_string();
        self
    }

    pub fn inactive(mut self) -> Self {
        self.chair.is_active = false;
        self
    }

    pub fn build(self) -> Chair {
        self.chair
    }
}

impl Default for ChairBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Builder for creating test ChairModel entities
pub struct ChairModelBuilder {
    model: ChairModel,
}

impl ChairModelBuilder {
    pub fn new() -> Self {
        Self {
            model: ChairModel {
                name: "standard".to_string(),
                speed: 1,
            },
        }
    }

    pub fn with_name(mut self, name: &str) -> Self {
        self.model.name = name.to_string();
        self
    }

    pub fn with_speed(mut self, speed: i64) -> Self {
        self.model.speed = speed;
        self
    }

    pub fn build(self) -> ChairModel {
        self.model
    }
}

impl Default for ChairModelBuilder {
    fn default() -> Self {
        Self::new()
    }
}
