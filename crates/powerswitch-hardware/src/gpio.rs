//! Linux GPIO character device implementations.
//!
//! The button line is requested for both-edge events. The watcher thread
//! sleeps in `poll(2)` on the line event descriptor between transitions,
//! together with an eventfd so the executor can release the line while
//! the watcher is still waiting on it.
//!
//! Bias is not requested here. The character device v1 interface has no
//! pull-up flag; the button line must idle high through the board (BCM 3
//! carries a fixed pull-up on Raspberry Pi boards) or the device tree.

use std::io;
use std::os::fd::{AsRawFd, FromRawFd, OwnedFd, RawFd};
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::{Duration, Instant};

use gpio_cdev::{Chip, EventRequestFlags, EventType, LineEventHandle, LineHandle, LineRequestFlags};
use tracing::{debug, info, warn};

use powerswitch_core::constants::GPIO_CONSUMER;
use powerswitch_core::{ButtonConfig, Edge, IndicatorConfig};

use crate::error::{HardwareError, Result};
use crate::traits::{EdgeEvent, EdgeSource, Indicator, LineRelease};

/// Kernel timestamps older than this are not trusted as monotonic.
///
/// Kernels before 5.7 stamp line events with `CLOCK_REALTIME`.
const MAX_EVENT_AGE: Duration = Duration::from_secs(60);

fn gpio_error(context: &str, e: gpio_cdev::Error) -> HardwareError {
    HardwareError::initialization_failed(format!("{}: {}", context, e))
}

fn monotonic_now() -> Option<Duration> {
    let mut ts = libc::timespec {
        tv_sec: 0,
        tv_nsec: 0,
    };
    // SAFETY: ts is a valid, writable timespec
    if unsafe { libc::clock_gettime(libc::CLOCK_MONOTONIC, &mut ts) } != 0 {
        return None;
    }
    Some(Duration::new(
        u64::try_from(ts.tv_sec).ok()?,
        u32::try_from(ts.tv_nsec).ok()?,
    ))
}

/// Map a kernel event timestamp (nanoseconds) onto [`Instant`].
///
/// `Instant` is `CLOCK_MONOTONIC` on Linux, so the event age is measured
/// against that clock and subtracted from now. Queued edges keep their
/// spacing this way. Falls back to the read time when the stamp is not
/// a recent monotonic time.
fn event_instant(kernel_ns: u64) -> Instant {
    let now = Instant::now();
    let age = monotonic_now().and_then(|mono| mono.checked_sub(Duration::from_nanos(kernel_ns)));
    match age {
        Some(age) if age <= MAX_EVENT_AGE => now.checked_sub(age).unwrap_or(now),
        _ => now,
    }
}

/// Button line shared between the watcher and the executor.
///
/// The event handle is never held locked across a blocking wait; the
/// watcher polls the line together with an eventfd that `release` signals.
#[derive(Debug)]
struct ButtonLine {
    name: String,
    events: Mutex<Option<LineEventHandle>>,
    wake: OwnedFd,
}

impl ButtonLine {
    fn new(name: String, events: LineEventHandle) -> Result<Self> {
        // SAFETY: eventfd takes no pointers
        let raw = unsafe { libc::eventfd(0, libc::EFD_CLOEXEC) };
        if raw < 0 {
            return Err(HardwareError::initialization_failed(format!(
                "{}: eventfd: {}",
                name,
                io::Error::last_os_error()
            )));
        }
        // SAFETY: raw is a fresh descriptor owned by nothing else
        let wake = unsafe { OwnedFd::from_raw_fd(raw) };

        Ok(Self {
            name,
            events: Mutex::new(Some(events)),
            wake,
        })
    }

    fn lock(&self) -> MutexGuard<'_, Option<LineEventHandle>> {
        self.events.lock().unwrap_or_else(|e| e.into_inner())
    }

    fn disconnected(&self) -> HardwareError {
        HardwareError::disconnected(self.name.clone())
    }

    /// Block until `fd` is readable or the line is released.
    fn wait_readable(&self, fd: RawFd) -> Result<()> {
        let mut fds = [
            libc::pollfd {
                fd: self.wake.as_raw_fd(),
                events: libc::POLLIN,
                revents: 0,
            },
            libc::pollfd {
                fd,
                events: libc::POLLIN,
                revents: 0,
            },
        ];

        loop {
            // SAFETY: fds points to two initialized pollfd entries
            let n = unsafe { libc::poll(fds.as_mut_ptr(), fds.len() as libc::nfds_t, -1) };
            if n >= 0 {
                break;
            }
            let err = io::Error::last_os_error();
            if err.kind() != io::ErrorKind::Interrupted {
                return Err(err.into());
            }
        }

        if fds[0].revents != 0 {
            return Err(self.disconnected());
        }
        Ok(())
    }
}

impl LineRelease for ButtonLine {
    fn release(&self) -> Result<()> {
        // wake the watcher first; it may be blocked in poll on the line
        let one: u64 = 1;
        // SAFETY: wake is an open eventfd and the buffer is 8 bytes
        let n = unsafe {
            libc::write(
                self.wake.as_raw_fd(),
                (&one as *const u64).cast(),
                std::mem::size_of::<u64>(),
            )
        };
        if n < 0 {
            return Err(io::Error::last_os_error().into());
        }

        if self.lock().take().is_some() {
            debug!("Released {}", self.name);
        }
        Ok(())
    }
}

/// Power button on a GPIO input line.
#[derive(Debug)]
pub struct GpioButton {
    line: Arc<ButtonLine>,
}

impl GpioButton {
    /// Request the configured line for edge events.
    ///
    /// # Errors
    ///
    /// Returns [`HardwareError::InitializationFailed`] if the chip cannot be
    /// opened or the line is unavailable.
    pub fn open(config: &ButtonConfig) -> Result<Self> {
        let name = format!("{} line {}", config.chip, config.line);

        let mut chip = Chip::new(&config.chip).map_err(|e| gpio_error(&name, e))?;
        let line = chip
            .get_line(config.line)
            .map_err(|e| gpio_error(&name, e))?;
        let events = line
            .events(
                LineRequestFlags::INPUT,
                EventRequestFlags::BOTH_EDGES,
                GPIO_CONSUMER,
            )
            .map_err(|e| gpio_error(&name, e))?;

        match events.get_value() {
            Ok(0) => warn!("Button {} reads low at startup; is it held or unpulled?", name),
            Ok(_) => debug!("Button {} idles high", name),
            Err(e) => return Err(gpio_error(&name, e)),
        }

        info!("Watching power button on {}", name);
        Ok(Self {
            line: Arc::new(ButtonLine::new(name, events)?),
        })
    }
}

impl EdgeSource for GpioButton {
    fn wait_for_edge(&mut self, edge: Edge) -> Result<EdgeEvent> {
        loop {
            let fd = self
                .line
                .lock()
                .as_ref()
                .map(AsRawFd::as_raw_fd)
                .ok_or_else(|| self.line.disconnected())?;
            self.line.wait_readable(fd)?;

            let event = {
                let mut guard = self.line.lock();
                let handle = guard.as_mut().ok_or_else(|| self.line.disconnected())?;
                handle.get_event().map_err(|e| {
                    HardwareError::communication(format!("{}: {}", self.line.name, e))
                })?
            };

            let observed = match event.event_type() {
                EventType::FallingEdge => Edge::Falling,
                EventType::RisingEdge => Edge::Rising,
            };

            if observed == edge {
                return Ok(EdgeEvent {
                    edge: observed,
                    timestamp: event_instant(event.timestamp()),
                });
            }
            debug!("Skipping {} edge while waiting for {}", observed, edge);
        }
    }

    fn release_handle(&self) -> Arc<dyn LineRelease> {
        self.line.clone()
    }
}

/// Indicator LED on a GPIO output line.
#[derive(Debug)]
pub struct GpioIndicator {
    handle: Option<LineHandle>,
    name: String,
}

impl GpioIndicator {
    /// Request the configured line as an output, initially low.
    ///
    /// The LED is lit later, once the button line is held.
    pub fn open(config: &IndicatorConfig) -> Result<Self> {
        let name = format!("{} line {}", config.chip, config.line);

        let mut chip = Chip::new(&config.chip).map_err(|e| gpio_error(&name, e))?;
        let handle = chip
            .get_line(config.line)
            .and_then(|line| line.request(LineRequestFlags::OUTPUT, 0, GPIO_CONSUMER))
            .map_err(|e| gpio_error(&name, e))?;

        info!("Power indicator on {}", name);
        Ok(Self {
            handle: Some(handle),
            name,
        })
    }
}

impl Indicator for GpioIndicator {
    fn set(&mut self, on: bool) -> Result<()> {
        let handle = self
            .handle
            .as_ref()
            .ok_or_else(|| HardwareError::disconnected(self.name.clone()))?;
        handle
            .set_value(u8::from(on))
            .map_err(|e| HardwareError::communication(format!("{}: {}", self.name, e)))
    }

    fn release(&mut self) -> Result<()> {
        if self.handle.take().is_some() {
            debug!("Released {}", self.name);
        }
        Ok(())
    }
}
