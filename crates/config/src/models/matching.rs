use serde::{Deserialize, Serialize};

/// 某个行程找不到空闲椅子时本轮的处理方式
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum ExhaustionPolicy {
    /// 立即结束本轮，跳过剩余行程
    #[default]
    StopPass,
    /// 跳过该行程，继续处理下一个
    Continue,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MatchingConfig {
    pub enabled: bool,
    pub poll_interval_ms: u64,
    pub ride_batch_size: u32,
    pub candidate_cap: usize,
    pub exhaustion_policy: ExhaustionPolicy,
    pub terminal_status_count: u32,
}

impl Default for MatchingConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            poll_interval_ms: 500,
            ride_batch_size: 100,
            candidate_cap: 30,
            exhaustion_policy: ExhaustionPolicy::StopPass,
            terminal_status_count: 6,
        }
    }
}

impl MatchingConfig {
    pub fn validate(&self) -> anyhow::Result<()> {
        if self.poll_interval_ms == 0 {
            return Err(anyhow::anyhow!("匹配轮询间隔必须大于0"));
        }

        if self.ride_batch_size == 0 {
            return Err(anyhow::anyhow!("每轮行程批量大小必须大于0"));
        }

        if self.candidate_cap == 0 {
            return Err(anyhow::anyhow!("候选椅子上限必须大于0"));
        }

        if self.terminal_status_count == 0 {
            return Err(anyhow::anyhow!("终态事件数必须大于0"));
        }

        Ok(())
    }
}
