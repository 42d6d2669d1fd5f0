//! Daemon configuration.
//!
//! Configuration is read once at startup from a TOML file. Every key is
//! optional; missing keys fall back to the values in
//! [`constants`](crate::constants).
//!
//! ```toml
//! hold_time_secs = 3.0
//! debounce_ms = 20
//! reboot_command = ["reboot"]
//! poweroff_command = ["poweroff"]
//!
//! [button]
//! chip = "/dev/gpiochip0"
//! line = 3
//!
//! [indicator]
//! chip = "/dev/gpiochip0"
//! line = 17
//! ```
//!
//! The file is located through the `POWERSWITCH_CONFIG` environment
//! variable, falling back to `/etc/powerswitch.toml`. A missing fallback
//! file is not an error; a missing explicit file is.

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::constants::{
    CONFIG_PATH_ENV, DEFAULT_BUTTON_LINE, DEFAULT_CONFIG_PATH, DEFAULT_DEBOUNCE_MS,
    DEFAULT_GPIO_CHIP, DEFAULT_HOLD_TIME_SECS, DEFAULT_LOG_LEVEL, DEFAULT_POWEROFF_COMMAND,
    DEFAULT_REBOOT_COMMAND, MAX_HOLD_TIME_SECS,
};
use crate::{Error, Result};

/// Input line wired to the power button.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ButtonConfig {
    /// GPIO character device path.
    pub chip: String,

    /// Line offset on the chip.
    pub line: u32,
}

impl Default for ButtonConfig {
    fn default() -> Self {
        Self {
            chip: DEFAULT_GPIO_CHIP.to_string(),
            line: DEFAULT_BUTTON_LINE,
        }
    }
}

/// Output line driving the power indicator LED.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IndicatorConfig {
    /// GPIO character device path.
    #[serde(default = "default_chip")]
    pub chip: String,

    /// Line offset on the chip.
    pub line: u32,
}

fn default_chip() -> String {
    DEFAULT_GPIO_CHIP.to_string()
}

/// Complete daemon configuration.
///
/// # Examples
///
/// ```
/// use powerswitch_core::PowerSwitchConfig;
/// use std::time::Duration;
///
/// let config = PowerSwitchConfig::from_toml_str("hold_time_secs = 5.0").unwrap();
/// assert_eq!(config.hold_time(), Duration::from_secs(5));
/// assert!(config.indicator.is_none());
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PowerSwitchConfig {
    /// Hold duration separating a reboot press from a shutdown press.
    pub hold_time_secs: f64,

    /// Release edges closer than this to the press are ignored.
    pub debounce_ms: u64,

    /// Button input line.
    pub button: ButtonConfig,

    /// Optional indicator LED line.
    pub indicator: Option<IndicatorConfig>,

    /// Program and arguments used to reboot.
    pub reboot_command: Vec<String>,

    /// Program and arguments used to power off.
    pub poweroff_command: Vec<String>,

    /// Log filter used when `RUST_LOG` is unset.
    pub log_level: String,
}

impl Default for PowerSwitchConfig {
    fn default() -> Self {
        Self {
            hold_time_secs: DEFAULT_HOLD_TIME_SECS,
            debounce_ms: DEFAULT_DEBOUNCE_MS,
            button: ButtonConfig::default(),
            indicator: None,
            reboot_command: vec![DEFAULT_REBOOT_COMMAND.to_string()],
            poweroff_command: vec![DEFAULT_POWEROFF_COMMAND.to_string()],
            log_level: DEFAULT_LOG_LEVEL.to_string(),
        }
    }
}

impl PowerSwitchConfig {
    /// Load the configuration for this process.
    ///
    /// Reads the file named by `POWERSWITCH_CONFIG`, or the default path.
    ///
    /// # Errors
    ///
    /// Returns an error if an explicitly named file cannot be read, or if
    /// any file found fails to parse or validate.
    pub fn load() -> Result<Self> {
        let explicit = std::env::var_os(CONFIG_PATH_ENV).map(PathBuf::from);
        Self::resolve(explicit.as_deref(), Path::new(DEFAULT_CONFIG_PATH))
    }

    /// Load from `explicit` if given, otherwise from `fallback` when it exists.
    pub fn resolve(explicit: Option<&Path>, fallback: &Path) -> Result<Self> {
        match explicit {
            Some(path) => Self::from_path(path),
            None if fallback.exists() => Self::from_path(fallback),
            None => Ok(Self::default()),
        }
    }

    /// Read and validate a TOML configuration file.
    pub fn from_path(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        Self::from_toml_str(&contents).map_err(|e| match e {
            Error::ConfigParse { message, .. } => Error::ConfigParse {
                path: path.display().to_string(),
                message,
            },
            other => other,
        })
    }

    /// Parse and validate TOML configuration text.
    pub fn from_toml_str(contents: &str) -> Result<Self> {
        let config: Self = toml::from_str(contents).map_err(|e| Error::ConfigParse {
            path: "<inline>".to_string(),
            message: e.message().to_string(),
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Check that every value is usable.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidConfig`] naming the first offending key.
    pub fn validate(&self) -> Result<()> {
        if !(self.hold_time_secs > 0.0 && self.hold_time_secs <= MAX_HOLD_TIME_SECS) {
            return Err(Error::invalid_config(
                "hold_time_secs",
                format!(
                    "must be above 0 and at most {}, got {}",
                    MAX_HOLD_TIME_SECS, self.hold_time_secs
                ),
            ));
        }

        if self.button.chip.is_empty() {
            return Err(Error::invalid_config("button.chip", "must not be empty"));
        }

        if let Some(indicator) = &self.indicator {
            if indicator.chip.is_empty() {
                return Err(Error::invalid_config("indicator.chip", "must not be empty"));
            }
            if indicator.chip == self.button.chip && indicator.line == self.button.line {
                return Err(Error::invalid_config(
                    "indicator.line",
                    "must differ from the button line",
                ));
            }
        }

        if self.reboot_command.first().is_none_or(|p| p.is_empty()) {
            return Err(Error::invalid_config("reboot_command", "must name a program"));
        }

        if self.poweroff_command.first().is_none_or(|p| p.is_empty()) {
            return Err(Error::invalid_config(
                "poweroff_command",
                "must name a program",
            ));
        }

        Ok(())
    }

    /// Hold threshold as a [`Duration`].
    ///
    /// Out-of-range values are clamped to `0..=MAX_HOLD_TIME_SECS` and NaN
    /// maps to zero; [`validate`](Self::validate) rejects both.
    pub fn hold_time(&self) -> Duration {
        Duration::try_from_secs_f64(self.hold_time_secs.clamp(0.0, MAX_HOLD_TIME_SECS))
            .unwrap_or(Duration::ZERO)
    }

    /// Debounce interval as a [`Duration`].
    pub fn debounce(&self) -> Duration {
        Duration::from_millis(self.debounce_ms)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[test]
    fn test_defaults() {
        let config = PowerSwitchConfig::default();
        assert_eq!(config.hold_time(), Duration::from_secs(3));
        assert_eq!(config.debounce(), Duration::from_millis(20));
        assert_eq!(config.button.chip, "/dev/gpiochip0");
        assert_eq!(config.reboot_command, vec!["reboot"]);
        assert_eq!(config.poweroff_command, vec!["poweroff"]);
        assert!(config.indicator.is_none());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_empty_document_is_default() {
        let config = PowerSwitchConfig::from_toml_str("").unwrap();
        assert_eq!(config, PowerSwitchConfig::default());
    }

    #[test]
    fn test_full_document() {
        let config = PowerSwitchConfig::from_toml_str(
            r#"
            hold_time_secs = 2.5
            debounce_ms = 0
            reboot_command = ["systemctl", "reboot"]
            poweroff_command = ["systemctl", "poweroff"]
            log_level = "debug"

            [button]
            chip = "/dev/gpiochip1"
            line = 5

            [indicator]
            line = 11
            "#,
        )
        .unwrap();

        assert_eq!(config.hold_time(), Duration::from_millis(2500));
        assert_eq!(config.debounce(), Duration::ZERO);
        assert_eq!(config.button.chip, "/dev/gpiochip1");
        assert_eq!(config.button.line, 5);
        let indicator = config.indicator.unwrap();
        assert_eq!(indicator.chip, "/dev/gpiochip0");
        assert_eq!(indicator.line, 11);
        assert_eq!(config.reboot_command, vec!["systemctl", "reboot"]);
        assert_eq!(config.log_level, "debug");
    }

    #[rstest]
    #[case("hold_time_secs = 0.0", "hold_time_secs")]
    #[case("hold_time_secs = -1.0", "hold_time_secs")]
    #[case("hold_time_secs = inf", "hold_time_secs")]
    #[case("hold_time_secs = nan", "hold_time_secs")]
    #[case("hold_time_secs = 3600.5", "hold_time_secs")]
    #[case("hold_time_secs = 1e19", "hold_time_secs")]
    #[case("hold_time_secs = 1e30", "hold_time_secs")]
    #[case("reboot_command = []", "reboot_command")]
    #[case("poweroff_command = [\"\"]", "poweroff_command")]
    #[case("[button]\nchip = \"\"", "button.chip")]
    #[case("[indicator]\nline = 3", "indicator.line")]
    fn test_invalid_values(#[case] toml: &str, #[case] key: &str) {
        match PowerSwitchConfig::from_toml_str(toml) {
            Err(Error::InvalidConfig { key: k, .. }) => assert_eq!(k, key),
            other => panic!("expected invalid {}, got {:?}", key, other),
        }
    }

    #[test]
    fn test_longest_hold_time_is_accepted() {
        let config = PowerSwitchConfig::from_toml_str("hold_time_secs = 3600.0").unwrap();
        assert_eq!(config.hold_time(), Duration::from_secs(3600));
    }

    #[rstest]
    #[case(1e30, Duration::from_secs(3600))]
    #[case(-2.0, Duration::ZERO)]
    #[case(f64::NAN, Duration::ZERO)]
    fn test_hold_time_never_panics(#[case] secs: f64, #[case] expected: Duration) {
        let config = PowerSwitchConfig {
            hold_time_secs: secs,
            ..PowerSwitchConfig::default()
        };
        assert_eq!(config.hold_time(), expected);
    }

    #[test]
    fn test_parse_error() {
        let result = PowerSwitchConfig::from_toml_str("hold_time_secs = \"long\"");
        assert!(matches!(result, Err(Error::ConfigParse { .. })));
    }
}
