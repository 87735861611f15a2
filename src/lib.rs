// src/lib.rs
// Database recommendations: live checks, analysis sync, notifications

#![warn(clippy::unwrap_used)]
#![warn(clippy::expect_used)]
#![cfg_attr(test, allow(clippy::unwrap_used, clippy::expect_used))]

pub mod config;
pub mod db;
pub mod error;
pub mod notifications;
pub mod recommendation;

pub use error::{RecommendationError, Result};
