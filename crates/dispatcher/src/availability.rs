use matcher_domain::{ChairCandidate, ChairLedger, MatchingStore};
use matcher_errors::MatchingResult;
use tracing::debug;

/// 默认最多保留的空闲候选数
pub const DEFAULT_CANDIDATE_CAP: usize = 30;

/// 过滤忙碌椅子，只保留距离最近的前 `cap` 把空闲椅子
///
/// 按候选顺序逐个判断，凑满上限后立即停止，之后的椅子不会被查询。
/// 本轮已占用的椅子直接跳过，其余椅子每次都向存储重新询问。
#[derive(Debug, Clone, Copy)]
pub struct AvailabilityFilter {
    cap: usize,
}

impl AvailabilityFilter {
    pub fn new(cap: usize) -> Self {
        Self { cap }
    }

    pub async fn filter(
        &self,
        store: &dyn MatchingStore,
        ledger: &mut ChairLedger,
        candidates: Vec<ChairCandidate>,
    ) -> MatchingResult<Vec<ChairCandidate>> {
        let mut free = Vec::with_capacity(self.cap.min(candidates.len()));

        for candidate in candidates {
            if free.len() >= self.cap {
                break;
            }

            if ledger.is_held(&candidate.chair_id) {
                debug!("椅子 {} 本轮已被占用，跳过", candidate.chair_id);
                continue;
            }

            if store.chair_has_active_ride(&candidate.chair_id).await? {
                debug!("椅子 {} 忙碌，跳过", candidate.chair_id);
            } else {
                free.push(candidate);
            }
        }

        Ok(free)
    }
}

impl Default for AvailabilityFilter {
    fn default() -> Self {
        Self::new(DEFAULT_CANDIDATE_CAP)
    }
}
