//! Default values for the power button daemon.
//!
//! Every constant here is the fallback used when the corresponding key is
//! absent from the configuration file.
//!
//! # Usage
//!
//! ```
//! use powerswitch_core::constants::*;
//! use std::time::Duration;
//!
//! let hold = Duration::from_secs_f64(DEFAULT_HOLD_TIME_SECS);
//! assert_eq!(hold, Duration::from_secs(3));
//! ```

// ============================================================================
// Timing
// ============================================================================

/// Seconds the button must be held before the press means "shut down".
///
/// Shorter presses reboot the device.
pub const DEFAULT_HOLD_TIME_SECS: f64 = 3.0;

/// Longest accepted hold time, in seconds.
pub const MAX_HOLD_TIME_SECS: f64 = 3600.0;

/// Minimum interval between the press edge and a release edge, in
/// milliseconds. Release edges arriving earlier are contact bounce.
///
/// A value of `0` disables the filter.
pub const DEFAULT_DEBOUNCE_MS: u64 = 20;

// ============================================================================
// GPIO
// ============================================================================

/// GPIO character device holding the button line.
pub const DEFAULT_GPIO_CHIP: &str = "/dev/gpiochip0";

/// Line offset of the power button (BCM 3, header pin 5).
pub const DEFAULT_BUTTON_LINE: u32 = 3;

/// Consumer label reported to the kernel for lines we request.
pub const GPIO_CONSUMER: &str = "powerswitchd";

// ============================================================================
// Process
// ============================================================================

/// Command run to reboot the device.
pub const DEFAULT_REBOOT_COMMAND: &str = "reboot";

/// Command run to power the device off.
pub const DEFAULT_POWEROFF_COMMAND: &str = "poweroff";

/// Configuration file read when `POWERSWITCH_CONFIG` is not set.
pub const DEFAULT_CONFIG_PATH: &str = "/etc/powerswitch.toml";

/// Environment variable naming an explicit configuration file.
pub const CONFIG_PATH_ENV: &str = "POWERSWITCH_CONFIG";

/// Log filter used when `RUST_LOG` is unset.
pub const DEFAULT_LOG_LEVEL: &str = "info";
