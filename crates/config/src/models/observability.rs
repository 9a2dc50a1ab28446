use std::net::SocketAddr;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ObservabilityConfig {
    pub log_level: String,
    pub log_format: String, // "json", "pretty"
    pub metrics_enabled: bool,
    pub metrics_listen_address: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            log_format: "pretty".to_string(),
            metrics_enabled: false,
            metrics_listen_address: "127.0.0.1:9100".to_string(),
        }
    }
}

impl ObservabilityConfig {
    pub fn validate(&self) -> anyhow::Result<()> {
        let valid_levels = ["trace", "debug", "info", "warn", "error"];
        if !valid_levels.contains(&self.log_level.to_lowercase().as_str()) {
            return Err(anyhow::anyhow!(
                "无效的日志级别: {}，支持的级别: {:?}",
                self.log_level,
                valid_levels
            ));
        }

        let valid_formats = ["json", "pretty"];
        if !valid_formats.contains(&self.log_format.as_str()) {
            return Err(anyhow::anyhow!(
                "无效的日志格式: {}，支持的格式: {:?}",
                self.log_format,
                valid_formats
            ));
        }

        if self.metrics_enabled {
            self.metrics_socket_addr()?;
        }

        Ok(())
    }

    pub fn metrics_socket_addr(&self) -> anyhow::Result<SocketAddr> {
        self.metrics_listen_address.parse().map_err(|e| {
            anyhow::anyhow!(
                "无效的指标监听地址 {}: {e}",
                self.metrics_listen_address
            )
        })
    }
}
