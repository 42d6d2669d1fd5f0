//! Ordered record of hardware side effects.

use std::sync::{Arc, Mutex};

use powerswitch_core::PowerAction;

/// A side effect performed by a mock device.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    /// Indicator driven on or off.
    IndicatorSet(bool),

    /// Indicator line given back.
    IndicatorReleased,

    /// Button line given back.
    ButtonReleased,

    /// OS power action invoked.
    Power(PowerAction),
}

/// Shared, append-only operation log.
///
/// Clones refer to the same log.
#[derive(Debug, Clone, Default)]
pub struct OperationLog {
    entries: Arc<Mutex<Vec<Operation>>>,
}

impl OperationLog {
    /// Create an empty log.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append an operation.
    pub fn record(&self, operation: Operation) {
        self.entries
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push(operation);
    }

    /// Snapshot of all operations so far.
    pub fn entries(&self) -> Vec<Operation> {
        self.entries
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
    }

    /// Power actions recorded so far, in order.
    pub fn power_actions(&self) -> Vec<PowerAction> {
        self.entries()
            .into_iter()
            .filter_map(|op| match op {
                Operation::Power(action) => Some(action),
                _ => None,
            })
            .collect()
    }

    /// Position of the first occurrence of `operation`.
    pub fn position(&self, operation: Operation) -> Option<usize> {
        self.entries().iter().position(|op| *op == operation)
    }
}
