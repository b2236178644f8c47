//! Scrollkeeper: per-view scroll position persistence and layout-shift
//! resistant scroll restoration for content sites.
//!
//! This library crate exposes all modules for use by the binary and integration tests.

pub mod app;
pub mod database;
pub mod managers;
pub mod platform;
pub mod services;
pub mod types;
