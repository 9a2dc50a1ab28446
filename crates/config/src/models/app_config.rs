use anyhow::{Context, Result};
use config::{Config as ConfigBuilder, Environment, File, FileFormat};
use serde::{Deserialize, Serialize};
use std::path::Path;

use super::{database::DatabaseConfig, matching::MatchingConfig, observability::ObservabilityConfig};

/// Default config file locations, checked in order when no path is given
pub const DEFAULT_CONFIG_PATHS: [&str; 3] = [
    "config/matcher.toml",
    "matcher.toml",
    "/etc/matcher/config.toml",
];

/// System configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    pub database: DatabaseConfig,
    pub matching: MatchingConfig,
    pub observability: ObservabilityConfig,
}

impl AppConfig {
    /// Load configuration from config file and environment variables
    ///
    /// Load order:
    /// 1. Default configuration
    /// 2. Config file (TOML format)
    /// 3. Environment variable overrides (prefix: MATCHER_, nesting: `__`)
    ///
    /// An explicit `config_path` must exist; the default locations are optional.
    pub fn load(config_path: Option<&str>) -> Result<Self> {
        let defaults = ConfigBuilder::try_from(&AppConfig::default()).context("构建默认配置失败")?;
        let mut builder = ConfigBuilder::builder().add_source(defaults);

        // 1. Config file
        if let Some(path) = config_path {
            if !Path::new(path).exists() {
                return Err(anyhow::anyhow!("配置文件不存在: {}", path));
            }
            builder = builder.add_source(File::new(path, FileFormat::Toml));
        } else if let Some(path) = DEFAULT_CONFIG_PATHS
            .iter()
            .find(|path| Path::new(path).exists())
        {
            builder = builder.add_source(File::new(path, FileFormat::Toml));
        }

        // 2. Environment variable overrides - highest priority
        builder = builder.add_source(
            Environment::with_prefix("MATCHER")
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true),
        );

        let config: AppConfig = builder
            .build()
            .context("构建配置失败")?
            .try_deserialize()
            .context("反序列化配置失败")?;

        config.validate()?;

        Ok(config)
    }

    /// Load configuration from TOML string
    pub fn from_toml(toml_str: &str) -> Result<Self> {
        let config: AppConfig = toml::from_str(toml_str).context("解析TOML配置失败")?;

        config.validate()?;
        Ok(config)
    }

    /// Serialize configuration to TOML string
    pub fn to_toml(&self) -> Result<String> {
        toml::to_string_pretty(self).context("序列化配置为TOML失败")
    }

    /// Validate configuration effectiveness
    pub fn validate(&self) -> Result<()> {
        self.database.validate().context("数据库配置验证失败")?;

        self.matching.validate().context("匹配配置验证失败")?;

        self.observability
            .validate()
            .context("可观测性配置验证失败")?;

        Ok(())
    }
}
