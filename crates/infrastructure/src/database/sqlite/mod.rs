pub mod sqlite_fleet_repository;
pub mod sqlite_matching_store;

pub use sqlite_fleet_repository::SqliteFleetRepository;
pub use sqlite_matching_store::SqliteMatchingStore;
