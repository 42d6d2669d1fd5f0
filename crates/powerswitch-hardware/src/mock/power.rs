//! Mock OS power control.
//!
//! Records the requested action and returns instead of halting, so the
//! daemon's choice of action can be observed.

use std::sync::atomic::{AtomicBool, Ordering};

use powerswitch_core::PowerAction;

use crate::error::{HardwareError, Result};
use crate::mock::log::{Operation, OperationLog};
use crate::traits::PowerControl;

/// Power control that records instead of acting.
///
/// # Examples
///
/// ```
/// use powerswitch_core::PowerAction;
/// use powerswitch_hardware::mock::{MockPower, OperationLog};
/// use powerswitch_hardware::traits::PowerControl;
///
/// let log = OperationLog::new();
/// let power = MockPower::new(log.clone());
///
/// power.reboot().unwrap();
/// assert_eq!(log.power_actions(), vec![PowerAction::Reboot]);
/// ```
#[derive(Debug)]
pub struct MockPower {
    log: OperationLog,
    fail: AtomicBool,
}

impl MockPower {
    /// Create a power control writing to `log`.
    pub fn new(log: OperationLog) -> Self {
        Self {
            log,
            fail: AtomicBool::new(false),
        }
    }

    /// Create a power control whose actions are recorded but then fail.
    pub fn failing(log: OperationLog) -> Self {
        Self {
            log,
            fail: AtomicBool::new(true),
        }
    }

    /// Make subsequent actions fail (or succeed again).
    pub fn set_failing(&self, fail: bool) {
        self.fail.store(fail, Ordering::SeqCst);
    }

    fn record(&self, action: PowerAction) -> Result<()> {
        self.log.record(Operation::Power(action));
        if self.fail.load(Ordering::SeqCst) {
            return Err(HardwareError::action_failed(action, "mock failure"));
        }
        Ok(())
    }
}

impl PowerControl for MockPower {
    fn reboot(&self) -> Result<()> {
        self.record(PowerAction::Reboot)
    }

    fn power_off(&self) -> Result<()> {
        self.record(PowerAction::Shutdown)
    }
}
