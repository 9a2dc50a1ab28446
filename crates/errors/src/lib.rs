use std::fmt;

use thiserror::Error;

/// 匹配流程中的步骤，用于给错误打上来源标记
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MatchingStep {
    FetchRides,
    BuildCandidates,
    FilterAvailability,
    MeasureRide,
    Score,
    Assign,
}

impl MatchingStep {
    pub fn as_str(&self) -> &'static str {
        match self {
            MatchingStep::FetchRides => "fetch_rides",
            MatchingStep::BuildCandidates => "build_candidates",
            MatchingStep::FilterAvailability => "filter_availability",
            MatchingStep::MeasureRide => "measure_ride",
            MatchingStep::Score => "score",
            MatchingStep::Assign => "assign",
        }
    }
}

impl fmt::Display for MatchingStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Error)]
pub enum MatchingError {
    #[error("数据库错误: {0}")]
    Database(#[from] sqlx::Error),
    #[error("数据库操作错误: {0}")]
    DatabaseOperation(String),
    #[error("存储返回了无效数据: {0}")]
    InvalidData(String),
    #[error("行程未找到: {id}")]
    RideNotFound { id: String },
    #[error("配置错误: {0}")]
    Configuration(String),
    #[error("内部错误: {0}")]
    Internal(String),
    #[error("{step} 阶段失败: {source}")]
    Step {
        step: MatchingStep,
        #[source]
        source: Box<MatchingError>,
    },
}

pub type MatchingResult<T> = Result<T, MatchingError>;

impl MatchingError {
    pub fn database_error<S: Into<String>>(msg: S) -> Self {
        Self::DatabaseOperation(msg.into())
    }
    pub fn invalid_data<S: Into<String>>(msg: S) -> Self {
        Self::InvalidData(msg.into())
    }
    pub fn ride_not_found<S: Into<String>>(id: S) -> Self {
        Self::RideNotFound { id: id.into() }
    }
    pub fn config_error<S: Into<String>>(msg: S) -> Self {
        Self::Configuration(msg.into())
    }

    /// 给错误打上步骤标记，已标记的错误保持原样
    pub fn at(self, step: MatchingStep) -> Self {
        match self {
            tagged @ MatchingError::Step { .. } => tagged,
            other => MatchingError::Step {
                step,
                source: Box::new(other),
            },
        }
    }

    pub fn step(&self) -> Option<MatchingStep> {
        match self {
            MatchingError::Step { step, .. } => Some(*step),
            _ => None,
        }
    }

    /// 去掉步骤标记后的根错误
    pub fn root(&self) -> &MatchingError {
        match self {
            MatchingError::Step { source, .. } => source.root(),
            other => other,
        }
    }

    pub fn is_infrastructure(&self) -> bool {
        matches!(
            self.root(),
            MatchingError::Database(_)
                | MatchingError::DatabaseOperation(_)
                | MatchingError::InvalidData(_)
        )
    }
}

impl From<anyhow::Error> for MatchingError {
    fn from(err: anyhow::Error) -> Self {
        MatchingError::Internal(err.to_string())
    }
}

/// 为 `Result` 附加步骤标记
pub trait StepContext<T> {
    fn at_step(self, step: MatchingStep) -> MatchingResult<T>;
}

impl<T> StepContext<T> for MatchingResult<T> {
    fn at_step(self, step: MatchingStep) -> MatchingResult<T> {
        self.map_err(|e| e.at(step))
    }
}
