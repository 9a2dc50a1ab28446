use std::sync::Arc;
use std::time::Instant;

use matcher_config::{ExhaustionPolicy, MatchingConfig};
use matcher_domain::{AssignmentOutcome, ChairLedger, MatchingStore, Ride, RideAssignment};
use matcher_errors::{MatchingResult, MatchingStep, StepContext};
use matcher_infrastructure::{MetricsCollector, StructuredLogger};
use tokio::sync::Mutex;
use tracing::{debug, info, info_span, Instrument};

use crate::assigner::Assigner;
use crate::availability::AvailabilityFilter;
use crate::candidates::CandidateBuilder;
use crate::scoring::Scorer;

/// 本轮提交的一次分配
#[derive(Debug, Clone, PartialEq)]
pub struct Assignment {
    pub ride_id: String,
    pub chair_id: String,
    pub score: f64,
}

/// 一轮匹配的汇总
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PassSummary {
    pub rides_fetched: usize,
    pub rides_processed: usize,
    /// 按提交顺序排列
    pub assignments: Vec<Assignment>,
    pub conflicts: Vec<String>,
    pub unmatched: Vec<String>,
    pub stopped_early: bool,
}

impl PassSummary {
    pub fn assigned_chair(&self, ride_id: &str) -> Option<&str> {
        self.assignments
            .iter()
            .find(|a| a.ride_id == ride_id)
            .map(|a| a.chair_id.as_str())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum MatchOutcome {
    /// 没有待匹配的行程
    NoRides,
    Completed(PassSummary),
}

/// 触发方看到的结果，对应 HTTP 204 / 500，不带响应体
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TriggerStatus {
    NoContent,
    InternalError,
}

impl TriggerStatus {
    pub fn from_result(result: &MatchingResult<MatchOutcome>) -> Self {
        match result {
            Ok(_) => TriggerStatus::NoContent,
            Err(_) => TriggerStatus::InternalError,
        }
    }

    pub fn http_status(&self) -> u16 {
        match self {
            TriggerStatus::NoContent => 204,
            TriggerStatus::InternalError => 500,
        }
    }

    pub fn exit_code(&self) -> i32 {
        match self {
            TriggerStatus::NoContent => 0,
            TriggerStatus::InternalError => 1,
        }
    }
}

enum RideOutcome {
    Matched {
        chair_id: String,
        score: f64,
        free_candidates: usize,
    },
    Conflict {
        chair_id: String,
        current_chair: Option<String>,
    },
    AlreadyMatched {
        current_chair: String,
    },
    Unmatched {
        active_chairs: usize,
    },
}

/// 批量匹配编排
///
/// 每轮取最早的一批待匹配行程，按创建顺序逐个处理：
/// 构建候选 → 过滤忙碌椅子 → 评分 → 提交最优分配。
/// 整轮持有 `pass_lock`，重叠触发的匹配会排队执行，不会交错读写椅子状态。
pub struct MatchingService {
    store: Arc<dyn MatchingStore>,
    filter: AvailabilityFilter,
    ride_batch_size: u32,
    exhaustion_policy: ExhaustionPolicy,
    metrics: Arc<MetricsCollector>,
    pass_lock: Mutex<()>,
}

impl MatchingService {
    pub fn new(
        store: Arc<dyn MatchingStore>,
        config: &MatchingConfig,
        metrics: Arc<MetricsCollector>,
    ) -> Self {
        Self {
            store,
            filter: AvailabilityFilter::new(config.candidate_cap),
            ride_batch_size: config.ride_batch_size,
            exhaustion_policy: config.exhaustion_policy,
            metrics,
            pass_lock: Mutex::new(()),
        }
    }

    /// 执行一轮匹配
    ///
    /// 任何存储错误都会中止本轮并原样返回，已提交的分配保持有效。
    pub async fn run_pass(&self) -> MatchingResult<MatchOutcome> {
        let _pass = self.pass_lock.lock().await;
        let start = Instant::now();

        let span = info_span!("matching_pass", batch_size = self.ride_batch_size);
        let result = self.execute_pass().instrument(span).await;
        let elapsed = start.elapsed();

        match &result {
            Ok(MatchOutcome::NoRides) => {
                self.metrics.record_pass(elapsed.as_secs_f64());
            }
            Ok(MatchOutcome::Completed(summary)) => {
                self.metrics.record_pass(elapsed.as_secs_f64());
                StructuredLogger::log_pass_completed(
                    summary.rides_processed,
                    summary.assignments.len(),
                    summary.conflicts.len(),
                    summary.unmatched.len(),
                    elapsed.as_millis() as u64,
                );
            }
            Err(e) => {
                self.metrics.record_pass_failure(elapsed.as_secs_f64());
                StructuredLogger::log_pass_failed(e);
            }
        }

        result
    }

    /// 触发一轮匹配，只返回两种结果
    pub async fn trigger(&self) -> TriggerStatus {
        TriggerStatus::from_result(&self.run_pass().await)
    }

    async fn execute_pass(&self) -> MatchingResult<MatchOutcome> {
        let rides = self
            .store
            .fetch_unmatched_rides(self.ride_batch_size)
            .await
            .at_step(MatchingStep::FetchRides)?;

        if rides.is_empty() {
            debug!("没有待匹配的行程");
            return Ok(MatchOutcome::NoRides);
        }
        info!("本轮待匹配行程数: {}", rides.len());

        let mut ledger = ChairLedger::new();
        let mut summary = PassSummary {
            rides_fetched: rides.len(),
            ..Default::default()
        };

        for (index, ride) in rides.iter().enumerate() {
            let span = info_span!("match_ride", ride.id = %ride.id);
            let outcome = self.match_ride(ride, &mut ledger).instrument(span).await?;
            summary.rides_processed += 1;

            match outcome {
                RideOutcome::Matched {
                    chair_id,
                    score,
                    free_candidates,
                } => {
                    StructuredLogger::log_ride_matched(&ride.id, &chair_id, score, free_candidates);
                    self.metrics.record_assignment();
                    summary.assignments.push(Assignment {
                        ride_id: ride.id.clone(),
                        chair_id,
                        score,
                    });
                }
                RideOutcome::Conflict {
                    chair_id,
                    current_chair,
                } => {
                    StructuredLogger::log_assignment_conflict(
                        &ride.id,
                        &chair_id,
                        current_chair.as_deref(),
                    );
                    self.metrics.record_conflict();
                    summary.conflicts.push(ride.id.clone());
                }
                RideOutcome::AlreadyMatched { current_chair } => {
                    debug!("行程 {} 已匹配到椅子 {}，跳过", ride.id, current_chair);
                    self.metrics.record_conflict();
                    summary.conflicts.push(ride.id.clone());
                }
                RideOutcome::Unmatched { active_chairs } => {
                    StructuredLogger::log_ride_unmatched(&ride.id, active_chairs);
                    self.metrics.record_unmatched();
                    summary.unmatched.push(ride.id.clone());

                    let remaining = rides.len() - index - 1;
                    if self.exhaustion_policy == ExhaustionPolicy::StopPass && remaining > 0 {
                        StructuredLogger::log_pass_stopped_early(&ride.id, remaining);
                        summary.stopped_early = true;
                        break;
                    }
                }
            }
        }

        Ok(MatchOutcome::Completed(summary))
    }

    async fn match_ride(&self, ride: &Ride, ledger: &mut ChairLedger) -> MatchingResult<RideOutcome> {
        if let RideAssignment::Matched(current_chair) = ride.assignment() {
            return Ok(RideOutcome::AlreadyMatched { current_chair });
        }

        let chairs = self
            .store
            .fetch_active_candidates(ride.pickup)
            .await
            .at_step(MatchingStep::BuildCandidates)?;
        let active_chairs = chairs.len();
        let ordered = CandidateBuilder::build(chairs);

        let free = self
            .filter
            .filter(self.store.as_ref(), ledger, ordered)
            .await
            .at_step(MatchingStep::FilterAvailability)?;
        let free_candidates = free.len();
        self.metrics.record_candidates(free_candidates);

        if free.is_empty() {
            return Ok(RideOutcome::Unmatched { active_chairs });
        }

        let ride_distance = self
            .store
            .distance_between(ride.pickup, ride.destination)
            .await
            .at_step(MatchingStep::MeasureRide)?;

        let Some(best) = Scorer::best(ride_distance, free).at_step(MatchingStep::Score)? else {
            return Ok(RideOutcome::Unmatched { active_chairs });
        };
        debug!(
            "最优椅子 {} (分数 {:.3}, 距离 {})",
            best.candidate.chair_id, best.score, best.candidate.distance
        );

        let chair_id = best.candidate.chair_id;
        let outcome = Assigner::commit(self.store.as_ref(), ledger, ride, &chair_id)
            .await
            .at_step(MatchingStep::Assign)?;

        Ok(match outcome {
            AssignmentOutcome::Assigned => RideOutcome::Matched {
                chair_id,
                score: best.score,
                free_candidates,
            },
            AssignmentOutcome::Conflict { current_chair } => RideOutcome::Conflict {
                chair_id,
                current_chair,
            },
        })
    }
}
