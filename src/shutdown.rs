use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{broadcast, RwLock};
use tokio::time::timeout;
use tracing::{debug, info, warn};

/// 优雅关闭管理器
#[derive(Clone)]
pub struct ShutdownManager {
    /// 关闭信号发送器
    shutdown_tx: Arc<RwLock<Option<broadcast::Sender<()>>>>,
    is_shutdown: Arc<RwLock<bool>>,
}

impl ShutdownManager {
    pub fn new() -> Self {
        let (shutdown_tx, _) = broadcast::channel(16);

        Self {
            shutdown_tx: Arc::new(RwLock::new(Some(shutdown_tx))),
            is_shutdown: Arc::new(RwLock::new(false)),
        }
    }

    /// 订阅关闭信号
    pub async fn subscribe(&self) -> broadcast::Receiver<()> {
        let shutdown_tx = self.shutdown_tx.read().await;
        if let Some(ref tx) = *shutdown_tx {
            tx.subscribe()
        } else {
            // 已经关闭，返回一个立即触发的接收器
            let (tx, rx) = broadcast::channel(1);
            let _ = tx.send(());
            rx
        }
    }

    /// 触发关闭
    pub async fn shutdown(&self) {
        let mut is_shutdown = self.is_shutdown.write().await;
        if *is_shutdown {
            debug!("关闭管理器已经触发过关闭");
            return;
        }

        info!("触发系统关闭");
        *is_shutdown = true;

        let mut shutdown_tx = self.shutdown_tx.write().await;
        if let Some(tx) = shutdown_tx.take() {
            debug!("发送关闭信号给 {} 个订阅者", tx.receiver_count());
            // 没有接收者时发送会失败，可以忽略
            let _ = tx.send(());
        }
    }

    pub async fn is_shutdown(&self) -> bool {
        *self.is_shutdown.read().await
    }

    /// 发送关闭信号，并在超时时间内等待 `task` 结束
    ///
    /// 返回 `false` 表示等待超时。
    pub async fn drain<F>(&self, task: F, grace_period: Duration) -> bool
    where
        F: Future,
    {
        self.shutdown().await;

        match timeout(grace_period, task).await {
            Ok(_) => {
                info!("所有组件已退出");
                true
            }
            Err(_) => {
                warn!("等待组件退出超时（{:?}），强制退出", grace_period);
                false
            }
        }
    }
}

impl Default for ShutdownManager {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::time::sleep;

    #[tokio::test]
    async fn test_shutdown_manager_basic() {
        let manager = ShutdownManager::new();
        assert!(!manager.is_shutdown().await);

        let mut rx = manager.subscribe().await;
        manager.shutdown().await;

        let result = timeout(Duration::from_millis(100), rx.recv()).await;
        assert!(result.is_ok());
        assert!(manager.is_shutdown().await);
    }

    #[tokio::test]
    async fn test_multiple_subscribers() {
        let manager = ShutdownManager::new();

        let mut rx1 = manager.subscribe().await;
        let mut rx2 = manager.subscribe().await;

        manager.shutdown().await;

        assert!(timeout(Duration::from_millis(100), rx1.recv()).await.is_ok());
        assert!(timeout(Duration::from_millis(100), rx2.recv()).await.is_ok());
    }

    #[tokio::test]
    async fn test_subscribe_after_shutdown() {
        let manager = ShutdownManager::new();
        manager.shutdown().await;

        // 关闭后订阅应该立即收到信号
        let mut rx = manager.subscribe().await;
        let result = timeout(Duration::from_millis(100), rx.recv()).await;
        assert!(result.is_ok());
    }

    #[tokio::test]
    async fn test_double_shutdown() {
        let manager = ShutdownManager::new();

        manager.shutdown().await;
        manager.shutdown().await;
        assert!(manager.is_shutdown().await);
    }

    #[tokio::test]
    async fn test_drain_waits_for_task() {
        let manager = ShutdownManager::new();
        let mut rx = manager.subscribe().await;

        let task = tokio::spawn(async move {
            let _ = rx.recv().await;
        });

        assert!(manager.drain(task, Duration::from_millis(500)).await);
    }

    #[tokio::test]
    async fn test_drain_times_out() {
        let manager = ShutdownManager::new();

        let stuck = async {
            sleep(Duration::from_secs(5)).await;
        };

        assert!(!manager.drain(stuck, Duration::from_millis(20)).await);
        assert!(manager.is_shutdown().await);
    }
}
