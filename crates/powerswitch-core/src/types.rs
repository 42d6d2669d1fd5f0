//! Core domain types.
//!
//! A press cycle moves through [`PowerState`]:
//!
//! ```text
//! Idle --(falling edge)--> Pressed
//! Pressed --(release before deadline)--> Rebooting
//! Pressed --(deadline before release)--> ShuttingDown
//! ```
//!
//! Both terminal states end the process through the action executor.

use serde::{Deserialize, Serialize};
use std::fmt;

/// One of the two terminal actions a press can trigger.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PowerAction {
    /// Short press: restart the system.
    Reboot,

    /// Long press: power the system off.
    Shutdown,
}

impl PowerAction {
    /// Terminal power state entered when this action wins.
    pub fn terminal_state(&self) -> PowerState {
        match self {
            Self::Reboot => PowerState::Rebooting,
            Self::Shutdown => PowerState::ShuttingDown,
        }
    }
}

impl fmt::Display for PowerAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Reboot => write!(f, "reboot"),
            Self::Shutdown => write!(f, "shutdown"),
        }
    }
}

/// Direction of a transition on the button line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Edge {
    /// High to low. With the pull-up this is a press.
    Falling,

    /// Low to high. With the pull-up this is a release.
    Rising,
}

impl fmt::Display for Edge {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Falling => write!(f, "falling"),
            Self::Rising => write!(f, "rising"),
        }
    }
}

/// Physical button state as seen by the edge watcher.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ButtonState {
    /// Not pressed; the line idles high.
    #[default]
    Idle,

    /// Held down; the line is low.
    Pressed,
}

impl ButtonState {
    /// Button state reached after observing `edge`.
    ///
    /// Active-low wiring: falling presses, rising releases.
    pub fn after(edge: Edge) -> Self {
        match edge {
            Edge::Falling => Self::Pressed,
            Edge::Rising => Self::Idle,
        }
    }
}

/// Daemon-wide power state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PowerState {
    /// Waiting for a press.
    #[default]
    Idle,

    /// Button held, hold timer armed.
    Pressed,

    /// Reboot claimed. Terminal.
    Rebooting,

    /// Shutdown claimed. Terminal.
    ShuttingDown,
}

impl PowerState {
    /// Check if moving to `target` is a valid transition.
    ///
    /// # Examples
    ///
    /// ```
    /// use powerswitch_core::PowerState;
    ///
    /// assert!(PowerState::Idle.can_transition_to(&PowerState::Pressed));
    /// assert!(!PowerState::Idle.can_transition_to(&PowerState::Rebooting));
    /// assert!(!PowerState::Rebooting.can_transition_to(&PowerState::ShuttingDown));
    /// ```
    pub fn can_transition_to(&self, target: &PowerState) -> bool {
        matches!(
            (self, target),
            (PowerState::Idle, PowerState::Pressed)
                | (
                    PowerState::Pressed,
                    PowerState::Rebooting | PowerState::ShuttingDown
                )
        )
    }

    /// Terminal states are never left.
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Rebooting | Self::ShuttingDown)
    }
}

impl fmt::Display for PowerState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state_str = match self {
            PowerState::Idle => "Idle",
            PowerState::Pressed => "Pressed",
            PowerState::Rebooting => "Rebooting",
            PowerState::ShuttingDown => "ShuttingDown",
        };
        write!(f, "{}", state_str)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(PowerState::Idle, PowerState::Pressed, true)]
    #[case(PowerState::Pressed, PowerState::Rebooting, true)]
    #[case(PowerState::Pressed, PowerState::ShuttingDown, true)]
    #[case(PowerState::Idle, PowerState::Rebooting, false)]
    #[case(PowerState::Idle, PowerState::ShuttingDown, false)]
    #[case(PowerState::Pressed, PowerState::Idle, false)]
    #[case(PowerState::Rebooting, PowerState::ShuttingDown, false)]
    #[case(PowerState::ShuttingDown, PowerState::Rebooting, false)]
    #[case(PowerState::Rebooting, PowerState::Idle, false)]
    fn test_power_state_transitions(
        #[case] from: PowerState,
        #[case] to: PowerState,
        #[case] valid: bool,
    ) {
        assert_eq!(from.can_transition_to(&to), valid);
    }

    #[test]
    fn test_terminal_states() {
        assert!(PowerAction::Reboot.terminal_state().is_terminal());
        assert!(PowerAction::Shutdown.terminal_state().is_terminal());
        assert!(!PowerState::Idle.is_terminal());
        assert!(!PowerState::Pressed.is_terminal());
    }

    #[test]
    fn test_button_state_after_edge() {
        assert_eq!(ButtonState::after(Edge::Falling), ButtonState::Pressed);
        assert_eq!(ButtonState::after(Edge::Rising), ButtonState::Idle);
        assert_eq!(ButtonState::default(), ButtonState::Idle);
    }

    #[test]
    fn test_display() {
        assert_eq!(PowerAction::Reboot.to_string(), "reboot");
        assert_eq!(PowerAction::Shutdown.to_string(), "shutdown");
        assert_eq!(Edge::Falling.to_string(), "falling");
        assert_eq!(PowerState::ShuttingDown.to_string(), "ShuttingDown");
    }

    #[test]
    fn test_power_action_serialization() {
        let json = serde_json::to_string(&PowerAction::Shutdown).unwrap();
        assert_eq!(json, "\"shutdown\"");
        let action: PowerAction = serde_json::from_str("\"reboot\"").unwrap();
        assert_eq!(action, PowerAction::Reboot);
    }
}
