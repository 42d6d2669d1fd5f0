//! Shared domain types for the power button daemon.
//!
//! This crate holds everything the hardware and daemon crates agree on:
//! the two terminal [`PowerAction`]s, the button and power state model,
//! default constants and the [`PowerSwitchConfig`] loaded at startup.

pub mod config;
pub mod constants;
pub mod error;
pub mod types;

pub use config::{ButtonConfig, IndicatorConfig, PowerSwitchConfig};
pub use error::{Error, Result};
pub use types::*;

/// Version info
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
