use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::value_objects::{Coordinate, RideAssignment};

/// 乘客发起的行程请求
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Ride {
    pub id: String,
    pub user_id: String,
    pub pickup: Coordinate,
    pub destination: Coordinate,
    pub chair_id: Option<String>, // None 表示尚未匹配
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Ride {
    pub fn is_matched(&self) -> bool {
        self.chair_id.is_some()
    }

    pub fn assignment(&self) -> RideAssignment {
        match &self.chair_id {
            Some(chair_id) => RideAssignment::Matched(chair_id.clone()),
            None => RideAssignment::Unmatched,
        }
    }
}

/// 行程状态生命周期
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum RideStatus {
    #[serde(rename = "MATCHING")]
    Matching,
    #[serde(rename = "ENROUTE")]
    Enroute,
    #[serde(rename = "PICKUP")]
    Pickup,
    #[serde(rename = "CARRYING")]
    Carrying,
    #[serde(rename = "ARRIVED")]
    Arrived,
    #[serde(rename = "COMPLETED")]
    Completed,
}

impl RideStatus {
    /// 完整生命周期，按发生顺序排列
    pub const LIFECYCLE: [RideStatus; 6] = [
        RideStatus::Matching,
        RideStatus::Enroute,
        RideStatus::Pickup,
        RideStatus::Carrying,
        RideStatus::Arrived,
        RideStatus::Completed,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            RideStatus::Matching => "MATCHING",
            RideStatus::Enroute => "ENROUTE",
            RideStatus::Pickup => "PICKUP",
            RideStatus::Carrying => "CARRYING",
            RideStatus::Arrived => "ARRIVED",
            RideStatus::Completed => "COMPLETED",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        Self::LIFECYCLE.into_iter().find(|status| status.as_str() == s)
    }
}

impl sqlx::Type<sqlx::Sqlite> for RideStatus {
    fn type_info() -> sqlx::sqlite::SqliteTypeInfo {
        <str as sqlx::Type<sqlx::Sqlite>>::type_info()
    }
}

impl<'r> sqlx::Decode<'r, sqlx::Sqlite> for RideStatus {
    fn decode(value: sqlx::sqlite::SqliteValueRef<'r>) -> Result<Self, sqlx::error::BoxDynError> {
        let s = <&str as sqlx::Decode<sqlx::Sqlite>>::decode(value)?;
        RideStatus::parse(s).ok_or_else(|| format!("Invalid ride status: {s}").into())
    }
}

impl<'q> sqlx::Encode<'q, sqlx::Sqlite> for RideStatus {
    fn encode_by_ref(
        &self,
        buf: &mut Vec<sqlx::sqlite::SqliteArgumentValue<'q>>,
    ) -> Result<sqlx::encode::IsNull, Box<dyn std::error::Error + Send + Sync>> {
        <&str as sqlx::Encode<sqlx::Sqlite>>::encode(self.as_str(), buf)
    }
}

/// 行程状态历史中的一条事件
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RideStatusEvent {
    pub id: String,
    pub ride_id: String,
    pub status: RideStatus,
    pub created_at: DateTime<Utc>,
    /// 椅子确认收到该状态的时间，只有确认过的事件计入生命周期进度
    pub chair_sent_at: Option<DateTime<Utc>>,
}

impl RideStatusEvent {
    pub fn is_acknowledged(&self) -> bool {
        self.chair_sent_at.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ride_status_round_trips_through_str() {
        for status in RideStatus::LIFECYCLE {
            assert_eq!(RideStatus::parse(status.as_str()), Some(status));
        }
        assert_eq!(RideStatus::parse("CANCELED"), None);
    }

    #[test]
    fn test_ride_assignment_projection() {
        let now = Utc::now();
        let mut ride = Ride {
            id: "ride-1".to_string(),
            user_id: "user-1".to_string(),
            pickup: Coordinate::new(0, 0),
            destination: Coordinate::new(10, 0),
            chair_id: None,
            created_at: now,
            updated_at: now,
        };
        assert!(!ride.is_matched());
        assert_eq!(ride.assignment(), RideAssignment::Unmatched);

        ride.chair_id = Some("chair-1".to_string());
        assert!(ride.is_matched());
        assert_eq!(
            ride.assignment(),
            RideAssignment::Matched("chair-1".to_string())
        );
    }
}
