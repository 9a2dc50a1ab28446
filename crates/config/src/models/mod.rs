pub mod app_config;
pub mod database;
pub mod matching;
pub mod observability;

pub use app_config::AppConfig;
pub use database::DatabaseConfig;
pub use matching::{ExhaustionPolicy, MatchingConfig};
pub use observability::ObservabilityConfig;
