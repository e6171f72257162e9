//! Laptop catalog lookup, constraint matching, and content-based recommendations.

pub mod api;
pub mod assistant;
pub mod catalog;
pub mod config;
pub mod error;
pub mod recommend;
pub mod telemetry;
