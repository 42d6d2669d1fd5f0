//! Hardware abstraction layer for the power button daemon.
//!
//! This crate provides trait-based abstractions for the three things the
//! daemon touches outside its own memory: the button input line, the
//! optional indicator LED, and the operating system's reboot and
//! power-off facilities.
//!
//! # Capability Traits
//!
//! - [`EdgeSource`]: blocking waits for falling (press) and rising
//!   (release) edges on an active-low button.
//! - [`LineRelease`]: gives the button line back while another thread
//!   may still be blocked on it.
//! - [`Indicator`]: the power indicator LED.
//! - [`PowerControl`]: OS reboot and power-off.
//!
//! # Implementations
//!
//! - [`gpio`] (Linux only): `GpioButton` and `GpioIndicator` on the GPIO
//!   character device through `gpio-cdev`.
//! - [`system`]: `CommandPower`, which runs `reboot`/`poweroff`.
//! - [`mock`]: scriptable doubles that record side effects in an
//!   [`OperationLog`](mock::OperationLog).
//!
//! ```
//! use powerswitch_hardware::mock::{MockButton, MockPower, OperationLog};
//! use powerswitch_hardware::traits::{EdgeSource, PowerControl};
//! use powerswitch_core::PowerAction;
//!
//! let log = OperationLog::new();
//! let power = MockPower::new(log.clone());
//! let (mut button, handle) = MockButton::new();
//!
//! handle.press().unwrap();
//! button.wait_for_falling_edge().unwrap();
//! power.perform(PowerAction::Reboot).unwrap();
//!
//! assert_eq!(log.power_actions(), vec![PowerAction::Reboot]);
//! ```
//!
//! [`EdgeSource`]: traits::EdgeSource
//! [`LineRelease`]: traits::LineRelease
//! [`Indicator`]: traits::Indicator
//! [`PowerControl`]: traits::PowerControl

pub mod error;
#[cfg(target_os = "linux")]
pub mod gpio;
pub mod mock;
pub mod system;
pub mod traits;

// Re-export commonly used types for convenience
pub use error::{HardwareError, Result};
#[cfg(target_os = "linux")]
pub use gpio::{GpioButton, GpioIndicator};
pub use system::CommandPower;
pub use traits::{EdgeEvent, EdgeSource, Indicator, LineRelease, PowerControl};
