//! Shared fixtures for daemon integration tests.

#![allow(dead_code)]

use std::thread;
use std::time::{Duration, Instant};

use powerswitch_core::{PowerAction, PowerSwitchConfig};
use powerswitch_daemon::Daemon;
use powerswitch_hardware::Indicator;
use powerswitch_hardware::mock::{MockButton, MockButtonHandle, MockIndicator, MockPower, OperationLog};

/// Hold threshold used by the scenario tests, scaled down from 3.0s.
pub const HOLD: Duration = Duration::from_millis(300);

/// A daemon wired entirely to mocks.
pub struct Harness {
    pub daemon: Daemon<MockButton>,
    pub button: MockButtonHandle,
    pub log: OperationLog,
}

/// Configuration with the scaled hold time and the given debounce.
pub fn config(hold: Duration, debounce_ms: u64) -> PowerSwitchConfig {
    PowerSwitchConfig {
        hold_time_secs: hold.as_secs_f64(),
        debounce_ms,
        ..PowerSwitchConfig::default()
    }
}

/// Start a daemon with a mock button, indicator and power control.
pub fn harness(config: &PowerSwitchConfig) -> Harness {
    harness_with_power(config, MockPower::new)
}

/// Start a daemon with a custom mock power control.
pub fn harness_with_power(
    config: &PowerSwitchConfig,
    power: impl FnOnce(OperationLog) -> MockPower,
) -> Harness {
    let log = OperationLog::new();
    let (button, handle) = MockButton::with_log(log.clone());
    let indicator: Box<dyn Indicator> = Box::new(MockIndicator::new(log.clone()));

    let daemon = Daemon::start(config, |_| Ok(button), Some(indicator), power(log.clone()))
        .expect("daemon should start with mock hardware");

    Harness {
        daemon,
        button: handle,
        log,
    }
}

/// Wait until a power action has been recorded.
///
/// A claim by the hold timer executes on the timer thread, which may still
/// be running when the watcher returns.
pub fn recorded_action(log: &OperationLog) -> Option<PowerAction> {
    let deadline = Instant::now() + Duration::from_secs(2);
    while Instant::now() < deadline {
        if let Some(action) = log.power_actions().first() {
            return Some(*action);
        }
        thread::sleep(Duration::from_millis(5));
    }
    None
}
