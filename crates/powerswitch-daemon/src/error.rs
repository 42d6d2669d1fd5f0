//! Daemon error type.

use powerswitch_hardware::HardwareError;
use thiserror::Error;

/// Errors surfaced by the daemon.
///
/// All of them are fatal: configuration and hardware failures at startup
/// stop the process before the watch loop is entered.
#[derive(Debug, Error)]
pub enum DaemonError {
    /// Configuration could not be loaded or is invalid.
    #[error(transparent)]
    Config(#[from] powerswitch_core::Error),

    /// A hardware device failed.
    #[error(transparent)]
    Hardware(#[from] HardwareError),

    /// The hold timer thread could not be started.
    #[error("Failed to start hold timer: {0}")]
    TimerSpawn(#[source] std::io::Error),

    /// The hold timer deadline cannot be represented.
    #[error("Hold time {0:?} is out of range")]
    HoldTimeOutOfRange(std::time::Duration),
}

/// Result type alias for daemon operations.
pub type Result<T> = std::result::Result<T, DaemonError>;
