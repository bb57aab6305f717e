//! Watches GitHub repositories for new releases and announces them in a
//! Telegram chat.
//!
//! A pass ([`batch::BatchRunner::run_cycle`]) walks the configured
//! repositories in order. For each one the [`engine::AttemptEngine`] fetches
//! the release listing, picks the newest stable release, compares it with the
//! stored seen marker and announces it if it is new. Repositories that could
//! not be processed are summarized in a single report at the end of the pass.

pub mod batch;
pub mod config;
pub mod db;
pub mod engine;
pub mod github;
pub mod model;
pub mod notifier;
pub mod report;
pub mod seen;
pub mod selector;
pub mod timestamp;
