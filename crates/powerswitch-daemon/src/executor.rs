//! System action executor.
//!
//! Runs the terminal power action once the gate has picked one. Cleanup
//! always comes first: the indicator LED is driven low and its line is
//! released, the button line is released, then the OS facility is
//! invoked. A cleanup failure is logged and does not prevent the power
//! action.

use std::sync::{Arc, Mutex};

use tracing::{error, info, warn};

use powerswitch_core::PowerAction;
use powerswitch_hardware::{Indicator, LineRelease, PowerControl, Result};

/// Something that carries out a claimed power action.
///
/// The [`ActionGate`](crate::gate::ActionGate) calls this at most once per
/// process lifetime.
pub trait ActionExecutor: Send + Sync {
    /// Perform `action`. On real hardware this does not return on success.
    fn execute(&self, action: PowerAction) -> Result<()>;
}

/// Executor that cleans up GPIO resources, then calls the OS.
pub struct SystemActionExecutor<P: PowerControl> {
    indicator: Mutex<Option<Box<dyn Indicator>>>,
    button: Option<Arc<dyn LineRelease>>,
    power: P,
}

impl<P: PowerControl> SystemActionExecutor<P> {
    /// Create an executor around `power`, optionally owning an indicator.
    pub fn new(power: P, indicator: Option<Box<dyn Indicator>>) -> Self {
        Self {
            indicator: Mutex::new(indicator),
            button: None,
            power,
        }
    }

    /// Also release the button line during cleanup.
    pub fn with_button_line(mut self, button: Arc<dyn LineRelease>) -> Self {
        self.button = Some(button);
        self
    }

    /// The underlying power control.
    pub fn power(&self) -> &P {
        &self.power
    }

    fn cleanup(&self) {
        let mut slot = self.indicator.lock().unwrap_or_else(|e| e.into_inner());

        if let Some(mut indicator) = slot.take() {
            if let Err(e) = indicator.set(false) {
                warn!("Failed to turn indicator off: {}", e);
            }
            if let Err(e) = indicator.release() {
                warn!("Failed to release indicator line: {}", e);
            }
        }

        if let Some(button) = &self.button
            && let Err(e) = button.release()
        {
            warn!("Failed to release button line: {}", e);
        }
    }
}

impl<P: PowerControl> ActionExecutor for SystemActionExecutor<P> {
    fn execute(&self, action: PowerAction) -> Result<()> {
        info!("Executing {}", action);
        self.cleanup();

        self.power.perform(action).inspect_err(|e| {
            error!("{} did not complete: {}", action, e);
        })
    }
}
