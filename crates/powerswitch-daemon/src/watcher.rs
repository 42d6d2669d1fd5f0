//! Edge watcher.
//!
//! Owns the button line and drives a press cycle:
//!
//! 1. Block until the falling edge (press).
//! 2. Arm a [`HoldTimer`] bound to [`PowerAction::Shutdown`].
//! 3. Block until the rising edge (release), skipping bounce.
//! 4. Attempt [`PowerAction::Reboot`] on the gate.
//!
//! A press held for at least the hold time (release timestamp minus press
//! timestamp) is a long press even when the release is seen first: the
//! watcher waits for the timer to fire before attempting, so Shutdown wins
//! and the Reboot attempt is refused.

use std::sync::Arc;
use std::time::{Duration, Instant};

use tracing::{debug, info, warn};

use powerswitch_core::{ButtonState, PowerAction, PowerState};
use powerswitch_hardware::{EdgeEvent, EdgeSource};

use crate::error::Result;
use crate::gate::ActionGate;
use crate::timer::HoldTimer;

/// Outcome of one press/release cycle.
#[derive(Debug)]
pub struct PressCycle {
    /// The press edge.
    pub pressed: EdgeEvent,

    /// The release edge that ended the press.
    pub released: EdgeEvent,

    /// Whether the watcher's Reboot attempt claimed the gate.
    pub reboot_claimed: bool,

    /// The timer armed for this press. It may still be pending.
    pub timer: HoldTimer,
}

impl PressCycle {
    /// How long the button was held.
    pub fn held(&self) -> Duration {
        self.released
            .timestamp
            .saturating_duration_since(self.pressed.timestamp)
    }
}

/// Watches an [`EdgeSource`] and feeds press decisions into the gate.
#[derive(Debug)]
pub struct EdgeWatcher<S: EdgeSource> {
    source: S,
    gate: Arc<ActionGate>,
    hold_time: Duration,
    debounce: Duration,
    button: ButtonState,
}

impl<S: EdgeSource> EdgeWatcher<S> {
    /// Create a watcher with the given hold threshold and no debounce.
    pub fn new(source: S, gate: Arc<ActionGate>, hold_time: Duration) -> Self {
        Self {
            source,
            gate,
            hold_time,
            debounce: Duration::ZERO,
            button: ButtonState::Idle,
        }
    }

    /// Ignore release edges closer than `debounce` to the press.
    pub fn with_debounce(mut self, debounce: Duration) -> Self {
        self.debounce = debounce;
        self
    }

    /// Hold threshold separating reboot from shutdown.
    pub fn hold_time(&self) -> Duration {
        self.hold_time
    }

    /// The gate this watcher attempts on.
    pub fn gate(&self) -> &Arc<ActionGate> {
        &self.gate
    }

    /// Current button state as last observed.
    pub fn button_state(&self) -> ButtonState {
        self.button
    }

    /// Current power state.
    ///
    /// A claimed gate is terminal regardless of the button.
    pub fn power_state(&self) -> PowerState {
        match (self.gate.winner(), self.button) {
            (Some(action), _) => action.terminal_state(),
            (None, ButtonState::Pressed) => PowerState::Pressed,
            (None, ButtonState::Idle) => PowerState::Idle,
        }
    }

    /// Watch presses until a claimed action ends the watch.
    ///
    /// On real hardware a claim ends the process, so this only returns
    /// with a mock power control or after a failed power action. It
    /// returns the claimed action when the watcher itself claims the gate,
    /// or when the line is lost after the hold timer claimed it (cleanup
    /// releases the button line). Cycles lost to the hold timer with the
    /// line still held loop back to waiting for the next press.
    ///
    /// # Errors
    ///
    /// Returns an error if the button line can no longer be read while the
    /// gate is still open.
    pub fn run(&mut self) -> Result<PowerAction> {
        loop {
            match self.run_cycle() {
                Ok(cycle) if cycle.reboot_claimed => return Ok(PowerAction::Reboot),
                Ok(cycle) => warn!(
                    "Release after {:?} ignored; gate held by {:?}",
                    cycle.held(),
                    self.gate.winner()
                ),
                Err(e) => {
                    return match self.gate.winner() {
                        Some(action) => {
                            debug!("Button line closed after {} was claimed: {}", action, e);
                            Ok(action)
                        }
                        None => Err(e),
                    };
                }
            }
        }
    }

    /// Run a single press/release cycle.
    pub fn run_cycle(&mut self) -> Result<PressCycle> {
        let pressed = self.source.wait_for_falling_edge()?;
        let before = self.power_state();
        self.button = ButtonState::after(pressed.edge);
        self.log_transition(before);
        info!("Power button pressed");

        let mut timer = HoldTimer::schedule(
            self.hold_time,
            PowerAction::Shutdown,
            Arc::clone(&self.gate),
        )?;

        let released = self.wait_for_release(pressed.timestamp)?;
        let before = self.power_state();
        self.button = ButtonState::after(released.edge);
        let held = released.timestamp.saturating_duration_since(pressed.timestamp);
        info!("Power button released after {:?}", held);

        if held >= self.hold_time {
            debug!("Held past threshold; letting shutdown win");
            timer.wait();
        }

        let reboot_claimed = self.gate.attempt(PowerAction::Reboot);
        self.log_transition(before);

        Ok(PressCycle {
            pressed,
            released,
            reboot_claimed,
            timer,
        })
    }

    fn log_transition(&self, before: PowerState) {
        let after = self.power_state();
        if before == after {
            return;
        }
        if before.can_transition_to(&after) {
            debug!("Power state {} -> {}", before, after);
        } else {
            warn!("Unexpected power state change {} -> {}", before, after);
        }
    }

    fn wait_for_release(&mut self, pressed_at: Instant) -> Result<EdgeEvent> {
        loop {
            let event = self.source.wait_for_rising_edge()?;
            let since_press = event.timestamp.saturating_duration_since(pressed_at);
            if since_press >= self.debounce {
                return Ok(event);
            }
            debug!("Ignoring bounce {:?} after press", since_press);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::executor::SystemActionExecutor;
    use powerswitch_hardware::mock::{
        MockButton, MockButtonHandle, MockPower, Operation, OperationLog,
    };
    use std::thread;

    fn watcher(
        log: &OperationLog,
        hold_time: Duration,
    ) -> (EdgeWatcher<MockButton>, MockButtonHandle) {
        let gate = Arc::new(ActionGate::new(Arc::new(SystemActionExecutor::new(
            MockPower::new(log.clone()),
            None,
        ))));
        let (button, handle) = MockButton::new();
        (EdgeWatcher::new(button, gate, hold_time), handle)
    }

    #[test]
    fn test_initial_state() {
        let (watcher, _handle) = watcher(&OperationLog::new(), Duration::from_secs(3));
        assert_eq!(watcher.button_state(), ButtonState::Idle);
        assert_eq!(watcher.power_state(), PowerState::Idle);
        assert_eq!(watcher.hold_time(), Duration::from_secs(3));
    }

    #[test]
    fn test_short_press_reboots() {
        let log = OperationLog::new();
        let (mut watcher, handle) = watcher(&log, Duration::from_millis(200));

        handle.press().unwrap();
        handle.release().unwrap();

        let mut cycle = watcher.run_cycle().unwrap();
        assert!(cycle.reboot_claimed);
        assert_eq!(watcher.power_state(), PowerState::Rebooting);
        assert_eq!(watcher.button_state(), ButtonState::Idle);

        assert!(!cycle.timer.wait());
        assert_eq!(log.power_actions(), vec![PowerAction::Reboot]);
    }

    #[test]
    fn test_long_press_shuts_down() {
        let log = OperationLog::new();
        let (mut watcher, handle) = watcher(&log, Duration::from_millis(50));

        let driver = thread::spawn(move || {
            handle.press().unwrap();
            thread::sleep(Duration::from_millis(80));
            handle.release().unwrap();
        });

        let mut cycle = watcher.run_cycle().unwrap();
        driver.join().unwrap();

        assert!(!cycle.reboot_claimed);
        assert!(cycle.timer.wait());
        assert_eq!(watcher.power_state(), PowerState::ShuttingDown);
        assert_eq!(log.power_actions(), vec![PowerAction::Shutdown]);
    }

    #[test]
    fn test_run_returns_timer_claim_once_line_released() {
        let log = OperationLog::new();
        let (button, handle) = MockButton::with_log(log.clone());
        let executor = SystemActionExecutor::new(MockPower::new(log.clone()), None)
            .with_button_line(button.release_handle());
        let gate = Arc::new(ActionGate::new(Arc::new(executor)));
        let mut watcher = EdgeWatcher::new(button, gate, Duration::from_millis(50));

        // never released: the timer's cleanup ends the wait
        handle.press().unwrap();
        let action = watcher.run().unwrap();
        for _ in 0..200 {
            if !log.power_actions().is_empty() {
                break;
            }
            thread::sleep(Duration::from_millis(5));
        }

        assert_eq!(action, PowerAction::Shutdown);
        assert_eq!(watcher.power_state(), PowerState::ShuttingDown);
        assert_eq!(
            log.entries(),
            vec![
                Operation::ButtonReleased,
                Operation::Power(PowerAction::Shutdown)
            ]
        );
    }

    #[test]
    fn test_disconnect_ends_run() {
        let (mut watcher, handle) = watcher(&OperationLog::new(), Duration::from_secs(3));
        drop(handle);
        assert!(watcher.run().is_err());
    }
}
