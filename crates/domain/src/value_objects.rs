use matcher_errors::{MatchingError, MatchingResult};
use serde::{Deserialize, Serialize};

use crate::ride::RideStatusEvent;

/// 默认的终态事件数：MATCHING → ENROUTE → PICKUP → CARRYING → ARRIVED → COMPLETED
pub const DEFAULT_TERMINAL_STATUS_COUNT: u32 = 6;

/// 整数网格上的地理坐标
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub struct Coordinate {
    pub latitude: i64,
    pub longitude: i64,
}

impl Coordinate {
    pub fn new(latitude: i64, longitude: i64) -> Self {
        Self {
            latitude,
            longitude,
        }
    }

    /// 曼哈顿距离
    pub fn distance_to(&self, other: &Coordinate) -> f64 {
        ((self.latitude - other.latitude).abs() + (self.longitude - other.longitude).abs()) as f64
    }
}

/// 行程的匹配状态，只允许 Unmatched → Matched 一次
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RideAssignment {
    Unmatched,
    Matched(String),
}

impl RideAssignment {
    pub fn assign(self, chair_id: &str) -> MatchingResult<Self> {
        match self {
            RideAssignment::Unmatched => Ok(RideAssignment::Matched(chair_id.to_string())),
            RideAssignment::Matched(current) => Err(MatchingError::Internal(format!(
                "行程已匹配到椅子 {current}，不能重新分配给 {chair_id}"
            ))),
        }
    }

    pub fn chair_id(&self) -> Option<&str> {
        match self {
            RideAssignment::Unmatched => None,
            RideAssignment::Matched(chair_id) => Some(chair_id),
        }
    }
}

/// 椅子在一轮匹配中的可用状态，只允许 Free → Busy
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ChairAvailability {
    Free,
    Busy,
}

impl ChairAvailability {
    pub fn is_free(&self) -> bool {
        matches!(self, ChairAvailability::Free)
    }

    pub fn claim(self) -> MatchingResult<Self> {
        match self {
            ChairAvailability::Free => Ok(ChairAvailability::Busy),
            ChairAvailability::Busy => Err(MatchingError::Internal(
                "椅子已处于忙碌状态，不能再次占用".to_string(),
            )),
        }
    }
}

/// 单个行程的生命周期进度（已确认的状态事件数）
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RideProgress {
    pub acknowledged_events: u32,
}

impl RideProgress {
    pub fn new(acknowledged_events: u32) -> Self {
        Self {
            acknowledged_events,
        }
    }

    /// 只统计椅子已确认的事件
    pub fn from_events(events: &[RideStatusEvent]) -> Self {
        let acknowledged = events.iter().filter(|event| event.is_acknowledged()).count();
        Self::new(acknowledged as u32)
    }

    pub fn is_complete(&self, terminal_status_count: u32) -> bool {
        self.acknowledged_events >= terminal_status_count
    }
}

/// 椅子是否忙碌：存在任意未到终态的行程即为忙碌
pub fn chair_is_busy<I>(rides: I, terminal_status_count: u32) -> bool
where
    I: IntoIterator<Item = RideProgress>,
{
    rides
        .into_iter()
        .any(|progress| !progress.is_complete(terminal_status_count))
}

/// 条件分配的结果
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AssignmentOutcome {
    Assigned,
    /// 行程已被其他写入者匹配；`current_chair` 为 None 表示行程已不存在
    Conflict { current_chair: Option<String> },
}
