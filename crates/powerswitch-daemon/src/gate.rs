//! Action gate.
//!
//! The gate is the single decision point shared by the edge watcher and
//! the hold timer. It is claimed with one compare-and-swap, so any number
//! of concurrent attempts resolve to exactly one winner. The gate is never
//! reopened: after a claim the only sensible continuation is process exit.
//!
//! ```
//! use std::sync::Arc;
//! use powerswitch_core::PowerAction;
//! use powerswitch_daemon::gate::ActionGate;
//! use powerswitch_daemon::executor::SystemActionExecutor;
//! use powerswitch_hardware::mock::{MockPower, OperationLog};
//!
//! let log = OperationLog::new();
//! let gate = ActionGate::new(Arc::new(SystemActionExecutor::new(MockPower::new(log.clone()), None)));
//!
//! assert!(gate.attempt(PowerAction::Shutdown));
//! assert!(!gate.attempt(PowerAction::Reboot));
//! assert_eq!(gate.winner(), Some(PowerAction::Shutdown));
//! assert_eq!(log.power_actions(), vec![PowerAction::Shutdown]);
//! ```

use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicU8, Ordering};

use tracing::{debug, error, info};

use powerswitch_core::PowerAction;

use crate::executor::ActionExecutor;

const OPEN: u8 = 0;
const REBOOT: u8 = 1;
const SHUTDOWN: u8 = 2;

fn encode(action: PowerAction) -> u8 {
    match action {
        PowerAction::Reboot => REBOOT,
        PowerAction::Shutdown => SHUTDOWN,
    }
}

fn decode(value: u8) -> Option<PowerAction> {
    match value {
        REBOOT => Some(PowerAction::Reboot),
        SHUTDOWN => Some(PowerAction::Shutdown),
        _ => None,
    }
}

/// Single-acquire guard selecting exactly one power action.
pub struct ActionGate {
    claimed: AtomicU8,
    degraded: AtomicBool,
    executor: Arc<dyn ActionExecutor>,
}

impl ActionGate {
    /// Create an open gate that hands the winning action to `executor`.
    pub fn new(executor: Arc<dyn ActionExecutor>) -> Self {
        Self {
            claimed: AtomicU8::new(OPEN),
            degraded: AtomicBool::new(false),
            executor,
        }
    }

    /// Try to claim the gate for `action` and execute it.
    ///
    /// Returns `true` if this call claimed the gate. The executor runs on
    /// the calling thread before this returns (on real hardware it never
    /// returns). Returns `false` without blocking if the gate was already
    /// claimed.
    pub fn attempt(&self, action: PowerAction) -> bool {
        if self
            .claimed
            .compare_exchange(OPEN, encode(action), Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            debug!(
                "Gate already claimed for {:?}; dropping {}",
                self.winner(),
                action
            );
            return false;
        }

        info!("Gate claimed for {}", action);
        if let Err(e) = self.executor.execute(action) {
            error!("Power action failed, device left running: {}", e);
            self.degraded.store(true, Ordering::SeqCst);
        }
        true
    }

    /// The action that claimed the gate, if any.
    pub fn winner(&self) -> Option<PowerAction> {
        decode(self.claimed.load(Ordering::Acquire))
    }

    /// Whether any action has claimed the gate.
    pub fn is_claimed(&self) -> bool {
        self.winner().is_some()
    }

    /// Whether the claimed action failed to take the system down.
    pub fn is_degraded(&self) -> bool {
        self.degraded.load(Ordering::SeqCst)
    }
}

impl fmt::Debug for ActionGate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ActionGate")
            .field("winner", &self.winner())
            .field("degraded", &self.is_degraded())
            .finish_non_exhaustive()
    }
}
