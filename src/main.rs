use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use chair_matcher::{Application, ShutdownManager};
use clap::{Arg, ArgAction, Command};
use matcher_config::AppConfig;
use tokio::signal;
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[tokio::main]
async fn main() -> Result<()> {
    let matches = Command::new("chair-matcher")
        .version("1.0.0")
        .about("行程与椅子的批量匹配服务")
        .arg(
            Arg::new("config")
                .short('c')
                .long("config")
                .value_name("FILE")
                .help("配置文件路径（默认依次查找 config/matcher.toml、matcher.toml）"),
        )
        .arg(
            Arg::new("log-level")
                .short('l')
                .long("log-level")
                .value_name("LEVEL")
                .help("日志级别，覆盖配置文件")
                .value_parser(["trace", "debug", "info", "warn", "error"]),
        )
        .arg(
            Arg::new("log-format")
                .long("log-format")
                .value_name("FORMAT")
                .help("日志格式，覆盖配置文件")
                .value_parser(["json", "pretty"]),
        )
        .arg(
            Arg::new("once")
                .long("once")
                .help("只执行一轮匹配后退出")
                .action(ArgAction::SetTrue),
        )
        .get_matches();

    let config_path = matches.get_one::<String>("config");
    let once = matches.get_flag("once");

    let mut config = AppConfig::load(config_path.map(String::as_str)).with_context(|| {
        format!(
            "加载配置失败: {}",
            config_path.map(String::as_str).unwrap_or("<默认路径>")
        )
    })?;

    if let Some(level) = matches.get_one::<String>("log-level") {
        config.observability.log_level = level.clone();
    }
    if let Some(format) = matches.get_one::<String>("log-format") {
        config.observability.log_format = format.clone();
    }

    init_logging(&config.observability.log_level, &config.observability.log_format)?;

    info!("启动椅子匹配服务");
    let app = Application::new(config).await?;

    if once {
        let status = app.run_once().await;
        app.close().await;
        std::process::exit(status.exit_code());
    }

    let shutdown_manager = ShutdownManager::new();
    let app = Arc::new(app);

    let app_handle = {
        let shutdown_rx = shutdown_manager.subscribe().await;
        let app = Arc::clone(&app);

        tokio::spawn(async move {
            if let Err(e) = app.run(shutdown_rx).await {
                error!("应用运行失败: {e}");
            }
        })
    };

    wait_for_shutdown_signal().await;
    info!("收到关闭信号，开始优雅关闭...");

    if shutdown_manager
        .drain(app_handle, Duration::from_secs(30))
        .await
    {
        info!("应用已优雅关闭");
    }
    app.close().await;

    info!("椅子匹配服务已退出");
    Ok(())
}

/// 初始化日志系统
fn init_logging(log_level: &str, log_format: &str) -> Result<()> {
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(log_level));

    let registry = tracing_subscriber::registry().with(env_filter);

    match log_format {
        "json" => {
            registry
                .with(tracing_subscriber::fmt::layer().json())
                .try_init()
                .context("初始化JSON日志格式失败")?;
        }
        "pretty" => {
            registry
                .with(tracing_subscriber::fmt::layer().pretty())
                .try_init()
                .context("初始化Pretty日志格式失败")?;
        }
        _ => {
            return Err(anyhow::anyhow!("不支持的日志格式: {log_format}"));
        }
    }

    Ok(())
}

/// 等待 Ctrl+C 或 SIGTERM
async fn wait_for_shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            error!("安装Ctrl+C信号处理器失败: {e}");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                error!("安装SIGTERM信号处理器失败: {e}");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("收到Ctrl+C信号");
        },
        _ = terminate => {
            info!("收到SIGTERM信号");
        },
    }
}
