//! Hold timer.
//!
//! A one-shot deferred attempt on the [`ActionGate`]. The timer runs on
//! its own thread and cannot be cancelled: if the button is released
//! first, the watcher has already claimed the gate and the timer's attempt
//! is a no-op.

use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use tracing::debug;

use powerswitch_core::PowerAction;

use crate::error::{DaemonError, Result};
use crate::gate::ActionGate;

/// Handle to a scheduled gate attempt.
#[derive(Debug)]
pub struct HoldTimer {
    action: PowerAction,
    scheduled_at: Instant,
    deadline: Instant,
    handle: Option<JoinHandle<bool>>,
    claimed: Option<bool>,
}

impl HoldTimer {
    /// Attempt `action` on `gate` once `duration` has elapsed.
    ///
    /// The duration is measured from this call. Returns immediately.
    ///
    /// # Errors
    ///
    /// Returns [`DaemonError::HoldTimeOutOfRange`] if the deadline overflows
    /// the clock, or [`DaemonError::TimerSpawn`] if the timer thread cannot
    /// be created.
    pub fn schedule(duration: Duration, action: PowerAction, gate: Arc<ActionGate>) -> Result<Self> {
        let scheduled_at = Instant::now();
        let deadline = scheduled_at
            .checked_add(duration)
            .ok_or(DaemonError::HoldTimeOutOfRange(duration))?;

        let handle = thread::Builder::new()
            .name("hold-timer".to_string())
            .spawn(move || {
                // sleep() may wake early on some platforms
                let mut now = Instant::now();
                while now < deadline {
                    thread::sleep(deadline - now);
                    now = Instant::now();
                }
                debug!("Hold timer fired for {}", action);
                gate.attempt(action)
            })
            .map_err(DaemonError::TimerSpawn)?;

        debug!("Hold timer armed for {} in {:?}", action, duration);
        Ok(Self {
            action,
            scheduled_at,
            deadline,
            handle: Some(handle),
            claimed: None,
        })
    }

    /// Action this timer attempts.
    pub fn action(&self) -> PowerAction {
        self.action
    }

    /// When the timer was scheduled.
    pub fn scheduled_at(&self) -> Instant {
        self.scheduled_at
    }

    /// When the timer fires.
    pub fn deadline(&self) -> Instant {
        self.deadline
    }

    /// Whether the timer thread has finished its attempt.
    pub fn is_finished(&self) -> bool {
        self.handle.as_ref().is_none_or(JoinHandle::is_finished)
    }

    /// Block until the timer has fired.
    ///
    /// Returns whether its attempt claimed the gate. Safe to call more
    /// than once.
    pub fn wait(&mut self) -> bool {
        if let Some(handle) = self.handle.take() {
            // a panicking executor counts as a failed claim
            self.claimed = Some(handle.join().unwrap_or(false));
        }
        self.claimed.unwrap_or(false)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::executor::SystemActionExecutor;
    use powerswitch_hardware::mock::{MockPower, OperationLog};

    fn gate(log: &OperationLog) -> Arc<ActionGate> {
        Arc::new(ActionGate::new(Arc::new(SystemActionExecutor::new(
            MockPower::new(log.clone()),
            None,
        ))))
    }

    #[test]
    fn test_timer_fires_after_duration() {
        let log = OperationLog::new();
        let gate = gate(&log);
        let duration = Duration::from_millis(50);

        let start = Instant::now();
        let mut timer = HoldTimer::schedule(duration, PowerAction::Shutdown, gate.clone()).unwrap();
        assert!(start.elapsed() < duration, "schedule must not block");
        assert_eq!(timer.action(), PowerAction::Shutdown);
        assert_eq!(timer.deadline() - timer.scheduled_at(), duration);

        assert!(timer.wait());
        assert!(start.elapsed() >= duration);
        assert!(timer.is_finished());
        assert_eq!(gate.winner(), Some(PowerAction::Shutdown));
        assert_eq!(log.power_actions(), vec![PowerAction::Shutdown]);
    }

    #[test]
    fn test_timer_is_noop_after_claim() {
        let log = OperationLog::new();
        let gate = gate(&log);

        let mut timer =
            HoldTimer::schedule(Duration::from_millis(30), PowerAction::Shutdown, gate.clone())
                .unwrap();
        assert!(gate.attempt(PowerAction::Reboot));

        assert!(!timer.wait());
        assert!(!timer.wait());
        assert_eq!(log.power_actions(), vec![PowerAction::Reboot]);
    }

    #[test]
    fn test_unrepresentable_deadline_is_an_error() {
        let log = OperationLog::new();
        let gate = gate(&log);

        let result = HoldTimer::schedule(Duration::MAX, PowerAction::Shutdown, gate.clone());

        assert!(matches!(
            result,
            Err(DaemonError::HoldTimeOutOfRange(d)) if d == Duration::MAX
        ));
        assert!(!gate.is_claimed());
        assert!(log.entries().is_empty());
    }

    #[test]
    fn test_zero_duration_fires_immediately() {
        let log = OperationLog::new();
        let mut timer =
            HoldTimer::schedule(Duration::ZERO, PowerAction::Shutdown, gate(&log)).unwrap();
        assert!(timer.wait());
    }
}
