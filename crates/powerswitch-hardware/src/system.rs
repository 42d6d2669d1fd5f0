//! OS power control through external commands.
//!
//! Rebooting through the init system's `reboot`/`poweroff` programs lets
//! services stop cleanly and filesystems sync before the kernel halts.

use std::process::Command;

use tracing::{error, info};

use powerswitch_core::{PowerAction, PowerSwitchConfig};

use crate::error::{HardwareError, Result};
use crate::traits::PowerControl;

/// [`PowerControl`] that runs a configured program for each action.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandPower {
    reboot: Vec<String>,
    power_off: Vec<String>,
}

impl CommandPower {
    /// Create from explicit program-and-arguments vectors.
    ///
    /// # Errors
    ///
    /// Returns a configuration error if either command is empty.
    pub fn new(reboot: Vec<String>, power_off: Vec<String>) -> Result<Self> {
        if reboot.is_empty() || power_off.is_empty() {
            return Err(HardwareError::configuration("power commands must not be empty"));
        }
        Ok(Self { reboot, power_off })
    }

    /// Create from the daemon configuration.
    pub fn from_config(config: &PowerSwitchConfig) -> Result<Self> {
        Self::new(
            config.reboot_command.clone(),
            config.poweroff_command.clone(),
        )
    }

    fn run(&self, action: PowerAction) -> Result<()> {
        let argv = match action {
            PowerAction::Reboot => &self.reboot,
            PowerAction::Shutdown => &self.power_off,
        };
        let (program, args) = argv
            .split_first()
            .ok_or_else(|| HardwareError::configuration("power commands must not be empty"))?;

        info!("Invoking {}: {}", action, argv.join(" "));

        let status = Command::new(program).args(args).status().map_err(|e| {
            error!("Failed to spawn {}: {}", program, e);
            HardwareError::action_failed(action, format!("cannot run {}: {}", program, e))
        })?;

        if status.success() {
            Ok(())
        } else {
            Err(HardwareError::action_failed(
                action,
                format!("{} exited with {}", program, status),
            ))
        }
    }
}

impl Default for CommandPower {
    fn default() -> Self {
        let config = PowerSwitchConfig::default();
        Self {
            reboot: config.reboot_command,
            power_off: config.poweroff_command,
        }
    }
}

impl PowerControl for CommandPower {
    fn reboot(&self) -> Result<()> {
        self.run(PowerAction::Reboot)
    }

    fn power_off(&self) -> Result<()> {
        self.run(PowerAction::Shutdown)
    }
}
