//! Hardware capability traits.
//!
//! These traits are the seam between the daemon's decision logic and the
//! physical board. The GPIO and OS-command implementations live in
//! [`gpio`](crate::gpio) and [`system`](crate::system); scripted doubles
//! live in [`mock`](crate::mock).
//!
//! All operations are synchronous. The edge watcher owns its thread and
//! suspends inside [`EdgeSource::wait_for_edge`] until the kernel reports
//! a transition, so no async runtime is involved.

use std::sync::Arc;
use std::time::Instant;

use powerswitch_core::{Edge, PowerAction};

use crate::error::Result;

/// A transition observed on the button line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EdgeEvent {
    /// Direction of the transition.
    pub edge: Edge,

    /// Monotonic time at which the transition was observed.
    pub timestamp: Instant,
}

impl EdgeEvent {
    /// Create an event stamped with the current time.
    pub fn now(edge: Edge) -> Self {
        Self {
            edge,
            timestamp: Instant::now(),
        }
    }
}

/// Source of edge events for an active-low button.
///
/// Implementations must block the calling thread until the requested
/// transition happens. Busy polling is not acceptable on the target
/// hardware.
///
/// # Examples
///
/// ```no_run
/// use powerswitch_hardware::traits::EdgeSource;
/// use powerswitch_hardware::Result;
///
/// fn hold_duration<S: EdgeSource>(button: &mut S) -> Result<std::time::Duration> {
///     let pressed = button.wait_for_falling_edge()?;
///     let released = button.wait_for_rising_edge()?;
///     Ok(released.timestamp.duration_since(pressed.timestamp))
/// }
/// ```
pub trait EdgeSource: Send {
    /// Block until a transition in direction `edge` is observed.
    ///
    /// Transitions in the other direction seen while waiting are discarded.
    ///
    /// # Errors
    ///
    /// Returns an error if the line can no longer be read, including after
    /// it was given back through its [`LineRelease`] handle.
    fn wait_for_edge(&mut self, edge: Edge) -> Result<EdgeEvent>;

    /// Handle that gives this source's line back to the kernel.
    ///
    /// The handle may be used from another thread while this source is
    /// blocked in [`wait_for_edge`](Self::wait_for_edge); the blocked call
    /// then returns [`HardwareError::Disconnected`](crate::HardwareError::Disconnected).
    fn release_handle(&self) -> Arc<dyn LineRelease>;

    /// Block until the button is pressed.
    fn wait_for_falling_edge(&mut self) -> Result<EdgeEvent> {
        self.wait_for_edge(Edge::Falling)
    }

    /// Block until the button is released.
    fn wait_for_rising_edge(&mut self) -> Result<EdgeEvent> {
        self.wait_for_edge(Edge::Rising)
    }
}

/// Releases an acquired input line from any thread.
pub trait LineRelease: Send + Sync {
    /// Give the line back. Releasing twice is a no-op.
    fn release(&self) -> Result<()>;
}

/// Power indicator LED.
pub trait Indicator: Send {
    /// Drive the LED on or off.
    fn set(&mut self, on: bool) -> Result<()>;

    /// Give the output line back to the kernel.
    ///
    /// Calling `set` after `release` is an error.
    fn release(&mut self) -> Result<()>;
}

/// Operating system power facilities.
///
/// Both operations are terminal on real hardware: a successful call is
/// followed by the kernel taking the process down.
pub trait PowerControl: Send + Sync {
    /// Restart the system.
    fn reboot(&self) -> Result<()>;

    /// Power the system off.
    fn power_off(&self) -> Result<()>;

    /// Dispatch `action` to the matching facility.
    fn perform(&self, action: PowerAction) -> Result<()> {
        match action {
            PowerAction::Reboot => self.reboot(),
            PowerAction::Shutdown => self.power_off(),
        }
    }
}
