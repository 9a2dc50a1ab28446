//! 单轮匹配内的椅子占用账本
//!
//! 椅子是否忙碌每个行程都重新向存储询问，账本只记录本轮自己知道的占用：
//! 分配成功时由分配器把椅子从 `Free` 切换到 `Busy`，分配冲突时把
//! 其他写入者拿走的椅子标记为忙碌。后续行程先查账本，账本中被占用的
//! 椅子不再询问存储。

use std::collections::HashMap;

use matcher_errors::{MatchingError, MatchingResult};

use crate::value_objects::ChairAvailability;

#[derive(Debug, Default, Clone)]
pub struct ChairLedger {
    held: HashMap<String, ChairAvailability>,
    claimed: Vec<String>,
}

impl ChairLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// 账本视角下的状态；没有记录的椅子视为 `Free`，仍需存储确认
    pub fn state(&self, chair_id: &str) -> ChairAvailability {
        self.held
            .get(chair_id)
            .copied()
            .unwrap_or(ChairAvailability::Free)
    }

    pub fn is_held(&self, chair_id: &str) -> bool {
        !self.state(chair_id).is_free()
    }

    /// 分配成功后占用椅子
    pub fn claim(&mut self, chair_id: &str) -> MatchingResult<()> {
        let next = self.state(chair_id).claim().map_err(|_| {
            MatchingError::Internal(format!("椅子 {chair_id} 在本轮已被占用"))
        })?;
        self.held.insert(chair_id.to_string(), next);
        self.claimed.push(chair_id.to_string());
        Ok(())
    }

    /// 椅子被其他写入者拿走，本轮剩余行程不再考虑它
    pub fn mark_busy(&mut self, chair_id: &str) {
        self.held
            .insert(chair_id.to_string(), ChairAvailability::Busy);
    }

    /// 本轮按顺序占用的椅子
    pub fn claimed(&self) -> &[String] {
        &self.claimed
    }

    pub fn held_chairs(&self) -> usize {
        self.held.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unknown_chair_is_free() {
        let ledger = ChairLedger::new();
        assert_eq!(ledger.state("c1"), ChairAvailability::Free);
        assert!(!ledger.is_held("c1"));
        assert_eq!(ledger.held_chairs(), 0);
    }

    #[test]
    fn test_claim_flips_free_to_busy_once() {
        let mut ledger = ChairLedger::new();

        ledger.claim("c1").unwrap();
        assert_eq!(ledger.state("c1"), ChairAvailability::Busy);
        assert_eq!(ledger.claimed(), &["c1".to_string()]);

        assert!(ledger.claim("c1").is_err());
        assert_eq!(ledger.claimed().len(), 1);
    }

    #[test]
    fn test_mark_busy_is_not_a_claim() {
        let mut ledger = ChairLedger::new();
        ledger.mark_busy("c2");

        assert!(ledger.is_held("c2"));
        assert!(!ledger.is_held("c3"));
        assert!(ledger.claimed().is_empty());
        // a chair taken by another writer cannot be claimed either
        assert!(ledger.claim("c2").is_err());
    }
}
