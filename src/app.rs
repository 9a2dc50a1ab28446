use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use matcher_config::AppConfig;
use matcher_dispatcher::{MatchingPoller, MatchingService, TriggerStatus};
use matcher_infrastructure::{init_metrics_exporter, DatabaseManager, MetricsCollector};
use tokio::sync::broadcast;
use tracing::info;

/// 主应用程序
pub struct Application {
    config: AppConfig,
    database: DatabaseManager,
    service: Arc<MatchingService>,
}

impl Application {
    /// 创建新的应用实例
    pub async fn new(config: AppConfig) -> Result<Self> {
        info!("初始化应用程序");

        let database = DatabaseManager::new(&config.database)
            .await
            .with_context(|| format!("连接数据库失败: {}", config.database.url))?;

        if config.database.run_migrations {
            database.migrate().await.context("初始化数据库表结构失败")?;
        }

        if config.observability.metrics_enabled {
            let address = config.observability.metrics_socket_addr()?;
            init_metrics_exporter(address).context("启动指标导出失败")?;
        }

        let metrics = Arc::new(MetricsCollector::new().context("创建指标收集器失败")?);
        let store = Arc::new(database.matching_store(config.matching.terminal_status_count));
        let service = Arc::new(MatchingService::new(store, &config.matching, metrics));

        info!(
            "匹配参数: 批量 {}，候选上限 {}，无候选策略 {:?}",
            config.matching.ride_batch_size,
            config.matching.candidate_cap,
            config.matching.exhaustion_policy
        );

        Ok(Self {
            config,
            database,
            service,
        })
    }

    pub fn database(&self) -> &DatabaseManager {
        &self.database
    }

    pub fn service(&self) -> Arc<MatchingService> {
        Arc::clone(&self.service)
    }

    /// 只执行一轮匹配
    pub async fn run_once(&self) -> TriggerStatus {
        self.service.trigger().await
    }

    /// 周期性匹配，直到收到关闭信号
    pub async fn run(&self, mut shutdown_rx: broadcast::Receiver<()>) -> Result<()> {
        if !self.config.matching.enabled {
            info!("匹配已在配置中禁用，等待关闭信号");
            let _ = shutdown_rx.recv().await;
            return Ok(());
        }

        let poller = MatchingPoller::new(
            self.service(),
            Duration::from_millis(self.config.matching.poll_interval_ms),
        );
        let passes = poller.run(shutdown_rx).await;

        info!("匹配服务停止，共执行 {} 轮", passes);
        Ok(())
    }

    pub async fn close(&self) {
        self.database.close().await;
    }
}
