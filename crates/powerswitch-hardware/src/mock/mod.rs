//! Mock device implementations for testing and development.
//!
//! This module provides simulated devices that can be driven
//! programmatically without a board. All mocks can share one
//! [`OperationLog`], which records hardware side effects in the order
//! they happened.

pub mod button;
pub mod indicator;
pub mod log;
pub mod power;

// Re-export commonly used types
pub use button::{MockButton, MockButtonHandle};
pub use indicator::MockIndicator;
pub use log::{Operation, OperationLog};
pub use power::MockPower;
