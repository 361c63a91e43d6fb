//! Advice Runner Library
//!
//! Headless infinite-runner loop: a scrolling platform pool, stars and lives,
//! bouncing hazards, a compounding difficulty ramp, and a banner of bad advice
//! fetched from a local text-generation endpoint.
//!
//! # Features
//!
//! - `advice` - HTTP advice client for the banner (enabled by default). Without it the
//!   banner cycles through canned lines.

pub mod config;
pub mod util;
pub mod game;
pub mod advice;
