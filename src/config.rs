// Bus addresses, scale factors, timing defaults
//
// Everything here is a default: clients and the line estimator take these at
// construction and can be overridden (tests run with zero delays).

use std::time::Duration;

// Peripheral bus addresses as flashed in the controller firmware
pub const DRIVETRAIN_ADDR: u8 = 4;
pub const DUAL_MOTORS_ADDR: u8 = 5;

// Drivetrain units are cm/s and cm/s2, scaled on the wire
pub const DRIVE_SCALE: i32 = 20;
pub const DRIVE_SPEED_MAX: i16 = 100; // cm/s
pub const DRIVE_ACCEL_MAX: i16 = 250; // cm/s2, firmware tops out at 500

// Dual controller units are deg/s and deg/s2, scaled 10/9 on the wire
pub const DUAL_ACCEL_MAX: i16 = 10_000; // deg/s2

// Pause after every command frame so the peripheral can consume it
pub const SETTLE_DELAY: Duration = Duration::from_millis(1);

// Line sensor sampling
pub const LINE_AVERAGING: u32 = 10;
pub const LINE_SAMPLE_GAP: Duration = Duration::from_micros(100);
pub const LINE_PHASE_PAUSE: Duration = Duration::from_millis(1);
