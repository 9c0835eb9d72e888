//! Board-support layer for a small wheeled line-following robot.
//!
//! The robot's motor controller boards sit on a shared two-wire bus and speak
//! a tiny 3-byte command / 2-byte status protocol; line position comes from
//! two photoreflectors sampled differentially against ambient light. This
//! crate provides those primitives - the control loop that wires offset
//! readings back into steering belongs to the caller (see the `line_follow`
//! demo for a simulated one).
//!
//! Everything is synchronous and blocking; the only latencies are the settle
//! delay after each motor command and the multi-sample averaging in the line
//! estimator. Hardware access goes through narrow traits ([`bus::BusTransport`],
//! [`sensor::AnalogInput`], [`sensor::LedPair`], [`servo::PwmOutput`]) so every
//! algorithm runs against scripted collaborators in tests; the real I2C
//! transport is behind the `hardware` feature.

pub mod bus;
pub mod config;
pub mod motor;
pub mod power;
pub mod sensor;
pub mod servo;

pub use bus::{BusError, BusTransport};
pub use motor::{DriveStatus, Drivetrain, DualMotors, DualStatus, Motor};
pub use sensor::{Calibration, LineSensor};
