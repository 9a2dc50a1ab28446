pub mod manager;
pub mod schema;
pub mod sqlite;

pub use manager::DatabaseManager;
pub use schema::run_migrations;
pub use sqlite::{SqliteFleetRepository, SqliteMatchingStore};
