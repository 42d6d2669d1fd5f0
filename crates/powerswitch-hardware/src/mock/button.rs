//! Mock power button for testing and development.
//!
//! The button receives edge events through a channel. Tests drive it
//! from another thread with a [`MockButtonHandle`], which makes press
//! timing fully scriptable.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, mpsc};
use std::thread;
use std::time::{Duration, Instant};

use tracing::{debug, trace};

use powerswitch_core::Edge;

use crate::error::{HardwareError, Result};
use crate::mock::log::{Operation, OperationLog};
use crate::traits::{EdgeEvent, EdgeSource, LineRelease};

/// How often a blocked wait checks whether its line was released.
const RELEASE_POLL_INTERVAL: Duration = Duration::from_millis(5);

/// Ownership state of the mock button line.
#[derive(Debug)]
struct MockLine {
    name: String,
    released: AtomicBool,
    log: Option<OperationLog>,
}

impl MockLine {
    fn is_released(&self) -> bool {
        self.released.load(Ordering::Acquire)
    }
}

impl LineRelease for MockLine {
    fn release(&self) -> Result<()> {
        if !self.released.swap(true, Ordering::AcqRel) {
            debug!("{}: line released", self.name);
            if let Some(log) = &self.log {
                log.record(Operation::ButtonReleased);
            }
        }
        Ok(())
    }
}

/// Mock power button.
///
/// # Examples
///
/// ```
/// use powerswitch_hardware::mock::MockButton;
/// use powerswitch_hardware::traits::EdgeSource;
/// use std::time::Duration;
///
/// let (mut button, handle) = MockButton::new();
///
/// std::thread::spawn(move || {
///     handle.press_for(Duration::from_millis(50)).unwrap();
/// });
///
/// let pressed = button.wait_for_falling_edge().unwrap();
/// let released = button.wait_for_rising_edge().unwrap();
/// assert!(released.timestamp.duration_since(pressed.timestamp) >= Duration::from_millis(50));
/// ```
#[derive(Debug)]
pub struct MockButton {
    /// Channel receiver for simulated edges
    edge_rx: mpsc::Receiver<EdgeEvent>,

    /// Line ownership, shared with release handles
    line: Arc<MockLine>,
}

impl MockButton {
    /// Create a new mock button with the default name.
    ///
    /// Returns the button and a handle used to simulate presses.
    pub fn new() -> (Self, MockButtonHandle) {
        Self::with_name("Mock Button".to_string())
    }

    /// Create a new mock button with a custom name.
    pub fn with_name(name: String) -> (Self, MockButtonHandle) {
        Self::build(name, None)
    }

    /// Create a mock button that records its line release in `log`.
    pub fn with_log(log: OperationLog) -> (Self, MockButtonHandle) {
        Self::build("Mock Button".to_string(), Some(log))
    }

    fn build(name: String, log: Option<OperationLog>) -> (Self, MockButtonHandle) {
        let (edge_tx, edge_rx) = mpsc::channel();

        let line = Arc::new(MockLine {
            name: name.clone(),
            released: AtomicBool::new(false),
            log,
        });
        let button = Self { edge_rx, line };

        let handle = MockButtonHandle { edge_tx, name };

        (button, handle)
    }

    /// Device name.
    pub fn name(&self) -> &str {
        &self.line.name
    }

    /// Whether the line has been released.
    pub fn is_released(&self) -> bool {
        self.line.is_released()
    }

    fn disconnected(&self) -> HardwareError {
        HardwareError::disconnected(self.line.name.clone())
    }
}

impl EdgeSource for MockButton {
    fn wait_for_edge(&mut self, edge: Edge) -> Result<EdgeEvent> {
        loop {
            if self.line.is_released() {
                return Err(self.disconnected());
            }

            let event = match self.edge_rx.recv_timeout(RELEASE_POLL_INTERVAL) {
                Ok(event) => event,
                Err(mpsc::RecvTimeoutError::Timeout) => continue,
                Err(mpsc::RecvTimeoutError::Disconnected) => return Err(self.disconnected()),
            };

            if event.edge == edge {
                return Ok(event);
            }
            trace!("{}: skipping {} edge", self.line.name, event.edge);
        }
    }

    fn release_handle(&self) -> Arc<dyn LineRelease> {
        self.line.clone()
    }
}

/// Handle for driving a mock button.
///
/// Dropping every handle disconnects the button; a blocked
/// `wait_for_edge` then returns [`HardwareError::Disconnected`].
#[derive(Debug, Clone)]
pub struct MockButtonHandle {
    /// Channel sender for simulated edges
    edge_tx: mpsc::Sender<EdgeEvent>,

    /// Device name
    name: String,
}

impl MockButtonHandle {
    /// Deliver an edge event with an explicit timestamp.
    ///
    /// # Errors
    ///
    /// Returns an error if the button has been dropped.
    pub fn send_event(&self, event: EdgeEvent) -> Result<()> {
        self.edge_tx
            .send(event)
            .map_err(|_| HardwareError::disconnected(self.name.clone()))
    }

    /// Deliver an edge stamped with the current time.
    pub fn send_edge(&self, edge: Edge) -> Result<()> {
        self.send_event(EdgeEvent::now(edge))
    }

    /// Simulate pressing the button.
    pub fn press(&self) -> Result<()> {
        self.send_edge(Edge::Falling)
    }

    /// Simulate releasing the button.
    pub fn release(&self) -> Result<()> {
        self.send_edge(Edge::Rising)
    }

    /// Press, hold for `duration`, then release. Blocks the caller.
    pub fn press_for(&self, duration: Duration) -> Result<()> {
        self.press()?;
        thread::sleep(duration);
        self.release()
    }

    /// Simulate contact bounce right after a press.
    ///
    /// Sends `count` rising/falling pairs spaced `interval` apart, each
    /// stamped relative to `pressed_at`.
    pub fn bounce(&self, pressed_at: Instant, count: u32, interval: Duration) -> Result<()> {
        for i in 1..=count {
            let at = pressed_at + interval * (2 * i - 1);
            self.send_event(EdgeEvent {
                edge: Edge::Rising,
                timestamp: at,
            })?;
            self.send_event(EdgeEvent {
                edge: Edge::Falling,
                timestamp: at + interval,
            })?;
        }
        Ok(())
    }

    /// Get the device name.
    pub fn name(&self) -> &str {
        &self.name
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mock_button_press_release() {
        let (mut button, handle) = MockButton::new();

        handle.press().unwrap();
        handle.release().unwrap();

        assert_eq!(button.wait_for_falling_edge().unwrap().edge, Edge::Falling);
        assert_eq!(button.wait_for_rising_edge().unwrap().edge, Edge::Rising);
    }

    #[test]
    fn test_mock_button_skips_unwanted_edges() {
        let (mut button, handle) = MockButton::new();

        handle.release().unwrap();
        handle.release().unwrap();
        handle.press().unwrap();

        let event = button.wait_for_falling_edge().unwrap();
        assert_eq!(event.edge, Edge::Falling);
    }

    #[test]
    fn test_mock_button_blocks_until_edge() {
        let (mut button, handle) = MockButton::new();
        let delay = Duration::from_millis(50);

        let start = Instant::now();
        thread::spawn(move || {
            thread::sleep(delay);
            handle.press().unwrap();
        });

        button.wait_for_falling_edge().unwrap();
        assert!(start.elapsed() >= delay);
    }

    #[test]
    fn test_mock_button_bounce_timestamps() {
        let (mut button, handle) = MockButton::new();
        let pressed_at = Instant::now();
        let interval = Duration::from_millis(2);

        handle.bounce(pressed_at, 2, interval).unwrap();

        let first = button.wait_for_rising_edge().unwrap();
        assert_eq!(first.timestamp, pressed_at + interval);
        let second = button.wait_for_rising_edge().unwrap();
        assert_eq!(second.timestamp, pressed_at + interval * 3);
    }

    #[test]
    fn test_mock_button_disconnected() {
        let (mut button, handle) = MockButton::with_name("Test Button".to_string());
        assert_eq!(button.name(), "Test Button");
        assert_eq!(handle.name(), "Test Button");

        drop(handle);

        let result = button.wait_for_falling_edge();
        assert!(matches!(result, Err(HardwareError::Disconnected { .. })));
    }

    #[test]
    fn test_release_wakes_blocked_wait() {
        let log = OperationLog::new();
        let (mut button, _handle) = MockButton::with_log(log.clone());
        let release = button.release_handle();

        let waiter = thread::spawn(move || {
            let result = button.wait_for_falling_edge();
            (result, button)
        });
        thread::sleep(Duration::from_millis(30));
        release.release().unwrap();
        release.release().unwrap();

        let (result, button) = waiter.join().unwrap();
        assert!(matches!(result, Err(HardwareError::Disconnected { .. })));
        assert!(button.is_released());
        assert_eq!(log.entries(), vec![Operation::ButtonReleased]);
    }

    #[test]
    fn test_released_line_drops_queued_edges() {
        let (mut button, handle) = MockButton::new();

        handle.press().unwrap();
        button.release_handle().release().unwrap();

        assert!(button.wait_for_falling_edge().is_err());
    }

    #[test]
    fn test_mock_button_send_after_drop_fails() {
        let (button, handle) = MockButton::new();
        drop(button);
        assert!(handle.press().is_err());
    }
}
