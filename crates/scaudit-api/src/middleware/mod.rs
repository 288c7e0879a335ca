//! # Middleware
//!
//! - `metrics`: request counters recorded through the `metrics` facade.

pub mod metrics;
