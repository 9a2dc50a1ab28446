use matcher_domain::{AssignmentOutcome, ChairLedger, MatchingStore, Ride};
use matcher_errors::MatchingResult;
use tracing::debug;

/// 提交行程 → 椅子的分配
///
/// 先在行程状态机上完成 Unmatched → Matched，再交给存储做条件更新，
/// 存储保证行程只会被匹配一次。提交成功后在账本中占用椅子；冲突时
/// 其他写入者拿到的椅子同样记为忙碌，本轮后续行程都不会再选它。
pub struct Assigner;

impl Assigner {
    pub async fn commit(
        store: &dyn MatchingStore,
        ledger: &mut ChairLedger,
        ride: &Ride,
        chair_id: &str,
    ) -> MatchingResult<AssignmentOutcome> {
        let next = ride.assignment().assign(chair_id)?;
        let outcome = store.assign_chair(&ride.id, chair_id).await?;

        match &outcome {
            AssignmentOutcome::Assigned => {
                ledger.claim(chair_id)?;
                debug!("行程 {} 已提交到椅子 {:?}", ride.id, next.chair_id());
            }
            AssignmentOutcome::Conflict { current_chair } => {
                debug!(
                    "行程 {} 已不再处于待匹配状态 (当前椅子: {:?})",
                    ride.id, current_chair
                );
                if let Some(current) = current_chair {
                    ledger.mark_busy(current);
                }
            }
        }

        Ok(outcome)
    }
}
