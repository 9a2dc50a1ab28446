//! 匹配核心依赖的存储抽象
//!
//! 匹配逻辑只通过 `MatchingStore` 访问数据，具体的加锁策略
//! （进程内互斥、分布式锁、乐观版本号）由实现方决定。

use async_trait::async_trait;
use matcher_errors::MatchingResult;

use crate::chair::ChairCandidate;
use crate::ride::Ride;
use crate::value_objects::{AssignmentOutcome, Coordinate};

#[async_trait]
pub trait MatchingStore: Send + Sync {
    /// 按创建时间升序获取最多 `limit` 个未匹配的行程
    async fn fetch_unmatched_rides(&self, limit: u32) -> MatchingResult<Vec<Ride>>;

    /// 获取所有活跃椅子及其到 `pickup` 的距离和型号速度，按距离升序
    async fn fetch_active_candidates(&self, pickup: Coordinate) -> MatchingResult<Vec<ChairCandidate>>;

    /// 椅子是否拥有尚未到达终态的行程
    async fn chair_has_active_ride(&self, chair_id: &str) -> MatchingResult<bool>;

    /// 两点之间的距离
    async fn distance_between(&self, from: Coordinate, to: Coordinate) -> MatchingResult<f64>;

    /// 仅当行程仍未匹配时写入椅子
    async fn assign_chair(&self, ride_id: &str, chair_id: &str) -> MatchingResult<AssignmentOutcome>;
}
