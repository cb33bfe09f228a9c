//! kit-hooks: event hooks for the K.I.T. trading assistant
//!
//! This library provides:
//! - The hook contract and a concurrent dispatcher
//! - Command logging and session memory
//! - Price target alerts
//! - Spread and correlation monitoring
//! - Trade journaling, position warnings and signal sizing
//! - JSON Lines logs and JSON snapshot state
//! - Logging and metrics

pub mod cli;
pub mod config;
pub mod event;
pub mod hook;
pub mod hooks;
pub mod stats;
pub mod store;
pub mod telemetry;
