//! Mock indicator LED.

use crate::error::{HardwareError, Result};
use crate::mock::log::{Operation, OperationLog};
use crate::traits::Indicator;

/// Indicator LED that records every change.
#[derive(Debug, Clone)]
pub struct MockIndicator {
    log: OperationLog,
    lit: bool,
    released: bool,
}

impl MockIndicator {
    /// Create an indicator writing to `log`. It starts off.
    pub fn new(log: OperationLog) -> Self {
        Self {
            log,
            lit: false,
            released: false,
        }
    }

    /// Current LED state.
    pub fn is_lit(&self) -> bool {
        self.lit
    }

    /// Whether the line has been released.
    pub fn is_released(&self) -> bool {
        self.released
    }
}

impl Indicator for MockIndicator {
    fn set(&mut self, on: bool) -> Result<()> {
        if self.released {
            return Err(HardwareError::disconnected("mock indicator"));
        }
        self.lit = on;
        self.log.record(Operation::IndicatorSet(on));
        Ok(())
    }

    fn release(&mut self) -> Result<()> {
        self.released = true;
        self.log.record(Operation::IndicatorReleased);
        Ok(())
    }
}
