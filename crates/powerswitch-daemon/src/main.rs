//! `powerswitchd`: power button daemon.
//!
//! Hold the button for the configured hold time to power off; release it
//! sooner to reboot. Meant to be started once per boot by the init system.

use anyhow::{Context, Result};
use tracing::error;
use tracing_subscriber::EnvFilter;

use powerswitch_core::PowerSwitchConfig;

fn init_tracing(config: &PowerSwitchConfig) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&config.log_level));
    tracing_subscriber::fmt().with_env_filter(filter).init();
}

#[cfg(target_os = "linux")]
fn main() -> Result<()> {
    use powerswitch_daemon::Daemon;
    use powerswitch_hardware::{CommandPower, GpioButton, GpioIndicator, Indicator};
    use tracing::info;

    let config = PowerSwitchConfig::load().context("failed to load configuration")?;
    init_tracing(&config);
    info!("powerswitchd {}", powerswitch_core::VERSION);

    let power = CommandPower::from_config(&config)?;
    let indicator = config
        .indicator
        .as_ref()
        .map(|cfg| GpioIndicator::open(cfg).map(|led| Box::new(led) as Box<dyn Indicator>))
        .transpose()
        .context("failed to acquire indicator line")?;

    let mut daemon = Daemon::start(&config, GpioButton::open, indicator, power)
        .context("failed to acquire power button")?;

    let action = daemon.run().context("power button watch failed")?;

    if daemon.gate().is_degraded() {
        error!("{} failed; waiting for manual intervention", action);
    } else {
        info!("{} in progress", action);
    }

    // The kernel or a human ends this process from here.
    loop {
        std::thread::park();
    }
}

#[cfg(not(target_os = "linux"))]
fn main() -> Result<()> {
    let config = PowerSwitchConfig::load().context("failed to load configuration")?;
    init_tracing(&config);
    error!("powerswitchd requires the Linux GPIO character device");
    anyhow::bail!("unsupported platform")
}
