//! # Matcher Testing Utils
//!
//! Shared testing utilities for the chair matcher workspace: an in-memory
//! `MatchingStore`, entity builders and async test helpers.
//!
//! Add this crate as a dev-dependency:
//!
//! ```toml
//! [dev-dependencies]
//! matcher-testing-utils = { path = "../testing-utils" }
//! ```

pub mod builders;
pub mod helpers;
pub mod mocks;

pub use builders::*;
pub use helpers::*;
pub use mocks::*;
