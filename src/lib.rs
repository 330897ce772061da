//! embedproxy - Reverse proxy for third-party video embed providers
//!
//! This library crate exposes the core functionality for integration testing.

pub mod config;
pub mod error;
pub mod providers;
pub mod proxy;
pub mod sanitize;
pub mod server;
