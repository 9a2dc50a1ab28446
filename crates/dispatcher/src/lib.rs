//! 行程与椅子的批量匹配
//!
//! 候选构建、空闲过滤、评分、分配四个步骤由 [`MatchingService`] 串联，
//! [`MatchingPoller`] 负责周期性触发。

pub mod assigner;
pub mod availability;
pub mod candidates;
pub mod matcher;
pub mod poller;
pub mod scoring;

pub use assigner::Assigner;
pub use availability::{AvailabilityFilter, DEFAULT_CANDIDATE_CAP};
pub use candidates::CandidateBuilder;
pub use matcher::{Assignment, MatchOutcome, MatchingService, PassSummary, TriggerStatus};
pub use poller::MatchingPoller;
pub use scoring::{ScoredCandidate, Scorer};
