//! Power button daemon.
//!
//! Distinguishes a short press (reboot) from a long press (shutdown) on a
//! single GPIO button and guarantees exactly one of the two actions runs.
//!
//! Two threads of control share one [`ActionGate`]:
//!
//! ```text
//!  EdgeWatcher (main thread)           HoldTimer (spawned on press)
//!  ─────────────────────────           ───────────────────────────
//!  wait falling edge ──── schedule ──► sleep(hold_time)
//!  wait rising edge                    │
//!  │                                   ▼
//!  ▼                              attempt(Shutdown)
//!  attempt(Reboot)                     │
//!  │            ┌──────────────┐       │
//!  └──────────► │  ActionGate  │ ◄─────┘
//!               │  (one CAS)   │
//!               └──────┬───────┘
//!                      ▼
//!            SystemActionExecutor
//!        (LED off, release, OS call)
//! ```
//!
//! Whichever attempt reaches the gate first wins; the other returns
//! `false` and does nothing.

pub mod daemon;
pub mod error;
pub mod executor;
pub mod gate;
pub mod timer;
pub mod watcher;

pub use daemon::Daemon;
pub use error::{DaemonError, Result};
pub use executor::{ActionExecutor, SystemActionExecutor};
pub use gate::ActionGate;
pub use timer::HoldTimer;
pub use watcher::{EdgeWatcher, PressCycle};
