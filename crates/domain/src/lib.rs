pub mod chair;
pub mod ledger;
pub mod repositories;
pub mod ride;
pub mod value_objects;

pub use chair::*;
pub use ledger::*;
pub use matcher_errors::{MatchingError, MatchingResult, MatchingStep};
pub use repositories::*;
pub use ride::*;
pub use value_objects::*;
