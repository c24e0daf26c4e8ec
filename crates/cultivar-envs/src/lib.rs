//! Built-in environments for Cultivar.
//!
//! Provides simple environments for testing and benchmarking:
//! - `Setpoint` - drive a level vector onto a random setpoint

mod setpoint;

pub use setpoint::Setpoint;
