//! Database module: entity models and SQL repositories.
//!
//! - `model`: rows returned by repositories.
//! - `repo`: SQL-only functions over the SQLite pool.
//!
//! Callers import from `release_watchbot::db`; the repository API is
//! re-exported here.

pub mod model;
pub mod repo;

pub use repo::*;

pub use model::SeenRelease;
