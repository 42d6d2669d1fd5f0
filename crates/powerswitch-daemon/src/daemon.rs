//! Daemon startup and wiring.
//!
//! Startup order:
//!
//! 1. Validate the configuration.
//! 2. Acquire the button line. Failure here is fatal and happens before
//!    any LED or power operation.
//! 3. Light the indicator, if one is configured.
//! 4. Build the executor, the gate and the watcher. The executor gets a
//!    release handle for the button line so cleanup can give it back.

use std::sync::Arc;

use tracing::info;

use powerswitch_core::{ButtonConfig, PowerAction, PowerSwitchConfig};
use powerswitch_hardware::{EdgeSource, Indicator, PowerControl};

use crate::error::Result;
use crate::executor::SystemActionExecutor;
use crate::gate::ActionGate;
use crate::watcher::EdgeWatcher;

/// A started power button daemon.
#[derive(Debug)]
pub struct Daemon<S: EdgeSource> {
    watcher: EdgeWatcher<S>,
}

impl<S: EdgeSource> Daemon<S> {
    /// Acquire hardware and prepare the watch loop.
    ///
    /// `open_button` is called once with the button configuration.
    ///
    /// # Errors
    ///
    /// Returns an error, without touching the indicator or the power
    /// control, if the configuration is invalid or the button cannot be
    /// acquired. Returns an error if the indicator cannot be lit.
    ///
    /// # Examples
    ///
    /// ```
    /// use powerswitch_core::PowerSwitchConfig;
    /// use powerswitch_daemon::Daemon;
    /// use powerswitch_hardware::mock::{MockButton, MockPower, OperationLog};
    ///
    /// let log = OperationLog::new();
    /// let (button, _handle) = MockButton::new();
    ///
    /// let daemon = Daemon::start(
    ///     &PowerSwitchConfig::default(),
    ///     |_| Ok(button),
    ///     None,
    ///     MockPower::new(log.clone()),
    /// )
    /// .unwrap();
    /// assert!(!daemon.gate().is_claimed());
    /// ```
    pub fn start<F, P>(
        config: &PowerSwitchConfig,
        open_button: F,
        indicator: Option<Box<dyn Indicator>>,
        power: P,
    ) -> Result<Self>
    where
        F: FnOnce(&ButtonConfig) -> powerswitch_hardware::Result<S>,
        P: PowerControl + 'static,
    {
        config.validate()?;

        let button = open_button(&config.button)?;

        let indicator = match indicator {
            Some(mut led) => {
                led.set(true)?;
                Some(led)
            }
            None => None,
        };

        let executor = Arc::new(
            SystemActionExecutor::new(power, indicator).with_button_line(button.release_handle()),
        );
        let gate = Arc::new(ActionGate::new(executor));
        let watcher = EdgeWatcher::new(button, gate, config.hold_time())
            .with_debounce(config.debounce());

        info!(
            "Power button daemon ready: hold {:?} to shut down, debounce {:?}",
            config.hold_time(),
            config.debounce()
        );
        Ok(Self { watcher })
    }

    /// The gate shared by the watcher and its timers.
    pub fn gate(&self) -> &Arc<ActionGate> {
        self.watcher.gate()
    }

    /// The edge watcher.
    pub fn watcher_mut(&mut self) -> &mut EdgeWatcher<S> {
        &mut self.watcher
    }

    /// Enter the watch loop. See [`EdgeWatcher::run`].
    pub fn run(&mut self) -> Result<PowerAction> {
        self.watcher.run()
    }
}
