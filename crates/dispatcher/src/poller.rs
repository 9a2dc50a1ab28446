use std::sync::Arc;
use std::time::Duration;

use tokio::sync::broadcast;
use tokio::time::MissedTickBehavior;
use tracing::{error, info};

use crate::matcher::MatchingService;

/// 按固定间隔触发匹配，直到收到关闭信号
///
/// 单轮失败只记录日志，下一个间隔照常重试。
pub struct MatchingPoller {
    service: Arc<MatchingService>,
    interval: Duration,
}

impl MatchingPoller {
    pub fn new(service: Arc<MatchingService>, interval: Duration) -> Self {
        Self { service, interval }
    }

    /// 返回已执行的轮数
    pub async fn run(&self, mut shutdown_rx: broadcast::Receiver<()>) -> u64 {
        let mut ticker = tokio::time::interval(self.interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        let mut passes = 0u64;

        info!("匹配轮询已启动，间隔 {:?}", self.interval);
        loop {
            tokio::select! {
                _ = ticker.tick() => {
                    passes += 1;
                    if let Err(e) = self.service.run_pass().await {
                        error!("匹配失败: {}", e);
                    }
                }
                _ = shutdown_rx.recv() => {
                    info!("匹配轮询收到关闭信号");
                    break;
                }
            }
        }

        passes
    }
}
