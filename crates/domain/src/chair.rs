use chrono::{DateTime, Utc};
use matcher_errors::{MatchingError, MatchingResult};
use serde::{Deserialize, Serialize};

/// 提供运输服务的椅子
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Chair {
    pub id: String,
    pub owner_id: String,
    pub name: String,
    pub model: String,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// 椅子型号，速度是评分公式中的除数
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ChairModel {
    pub name: String,
    pub speed: i64,
}

impl ChairModel {
    pub fn validate(&self) -> MatchingResult<()> {
        if self.speed <= 0 {
            return Err(MatchingError::invalid_data(format!(
                "椅子型号 {} 的速度必须为正数，实际为 {}",
                self.name, self.speed
            )));
        }
        Ok(())
    }
}

/// 某次匹配中某把椅子到接客点的快照
///
/// 距离只在本轮匹配内有效，不是椅子的静态属性。
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ChairCandidate {
    pub chair_id: String,
    pub model: String,
    pub speed: i64,
    pub distance: f64,
}

impl ChairCandidate {
    pub fn new(chair_id: impl Into<String>, model: impl Into<String>, speed: i64, distance: f64) -> Self {
        Self {
            chair_id: chair_id.into(),
            model: model.into(),
            speed,
            distance,
        }
    }

    pub fn validate(&self) -> MatchingResult<()> {
        if self.speed <= 0 {
            return Err(MatchingError::invalid_data(format!(
                "椅子 {} (型号 {}) 的速度必须为正数，实际为 {}",
                self.chair_id, self.model, self.speed
            )));
        }
        if !self.distance.is_finite() || self.distance < 0.0 {
            return Err(MatchingError::invalid_data(format!(
                "椅子 {} 的距离无效: {}",
                self.chair_id, self.distance
            )));
        }
        Ok(())
    }
}
