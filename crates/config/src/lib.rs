pub mod models;

pub use models::{
    AppConfig, DatabaseConfig, ExhaustionPolicy, MatchingConfig, ObservabilityConfig,
};

#[cfg(test)]
mod tests;
