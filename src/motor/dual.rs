// Client for the dual independent-motor controller board
//
// Same codec and status-read pattern as the drivetrain client, but a disjoint
// command vocabulary addressing two logical motors, and a status word that is
// a bitmask of running motors instead of a step count.

use std::thread;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::bus::BusTransport;
use crate::config::{DUAL_ACCEL_MAX, SETTLE_DELAY};
use crate::motor::protocol::{self, DualCommand};

/// Logical motor selector on the dual controller
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Motor {
    A,
    B,
}

/// Status word of the dual controller: 0 = both idle, bit 0 = motor A
/// running, bit 1 = motor B running. Not a step count; see
/// [`DriveStatus`](crate::motor::DriveStatus) for that semantics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DualStatus(i16);

impl DualStatus {
    pub fn raw(self) -> i16 {
        self.0
    }

    /// False when the word is an error sentinel rather than a reading
    pub fn is_valid(self) -> bool {
        self.0 >= 0
    }

    pub fn both_idle(self) -> bool {
        self.0 == 0
    }

    pub fn is_running(self, motor: Motor) -> bool {
        let bit = match motor {
            Motor::A => 0b01,
            Motor::B => 0b10,
        };
        self.is_valid() && self.0 & bit != 0
    }
}

/// Client for one dual-motor controller board
pub struct DualMotors<B: BusTransport> {
    bus: B,
    address: u8,
    settle: Duration,
}

impl<B: BusTransport> DualMotors<B> {
    pub fn new(bus: B, address: u8) -> Self {
        Self {
            bus,
            address,
            settle: SETTLE_DELAY,
        }
    }

    /// Override the post-command settle delay (zero disables the pause)
    pub fn with_settle(mut self, settle: Duration) -> Self {
        self.settle = settle;
        self
    }

    fn settle(&self) {
        if !self.settle.is_zero() {
            thread::sleep(self.settle);
        }
    }

    fn send(&mut self, command: DualCommand, value: i16) {
        let frame = protocol::encode_frame(command as u8, value);
        debug!(
            "DualMotors 0x{:02X}: {:?} value={}",
            self.address, command, value
        );
        if let Err(e) = self.bus.write(self.address, &frame) {
            warn!("Command write to 0x{:02X} failed: {}", self.address, e);
        }
        self.settle();
    }

    /// Set acceleration and deceleration for one motor in deg/s2
    pub fn set_accelerations(&mut self, motor: Motor, accel: i16, decel: i16) {
        let (acc_cmd, dec_cmd) = match motor {
            Motor::A => (DualCommand::AccelA, DualCommand::DecelA),
            Motor::B => (DualCommand::AccelB, DualCommand::DecelB),
        };
        self.send(acc_cmd, scale_abs(accel));
        self.send(dec_cmd, scale_abs(decel));
    }

    /// Apply default accelerations to both motors: half the shared ceiling
    /// each, split between them
    pub fn set_default_accelerations(&mut self) {
        self.set_accelerations(Motor::A, DUAL_ACCEL_MAX / 2, DUAL_ACCEL_MAX / 2);
        self.set_accelerations(Motor::B, DUAL_ACCEL_MAX / 2, DUAL_ACCEL_MAX / 2);
    }

    /// Set the speed of one motor in deg/s
    pub fn set_speed(&mut self, motor: Motor, speed: i16) {
        let cmd = match motor {
            Motor::A => DualCommand::SpeedA,
            Motor::B => DualCommand::SpeedB,
        };
        self.send(cmd, scale(speed));
    }

    /// Set one motor's steps to the target
    pub fn set_target_steps(&mut self, motor: Motor, steps: i16) {
        let cmd = match motor {
            Motor::A => DualCommand::TargetA,
            Motor::B => DualCommand::TargetB,
        };
        self.send(cmd, steps);
    }

    /// Start one motor. The first status read after GO is known to be
    /// unreliable, so one read is performed here and discarded.
    pub fn go(&mut self, motor: Motor) {
        let cmd = match motor {
            Motor::A => DualCommand::GoA,
            Motor::B => DualCommand::GoB,
        };
        self.send(cmd, 0);
        self.settle();
        let _ = protocol::read_status(&mut self.bus, self.address);
    }

    /// Stop one motor with its configured deceleration
    pub fn stop(&mut self, motor: Motor) {
        let cmd = match motor {
            Motor::A => DualCommand::StopA,
            Motor::B => DualCommand::StopB,
        };
        self.send(cmd, 0);
    }

    /// Brake mode: motors hold position, drawing current
    pub fn brake(&mut self, motor: Motor) {
        let cmd = match motor {
            Motor::A => DualCommand::BrakeA,
            Motor::B => DualCommand::BrakeB,
        };
        self.send(cmd, 0);
    }

    /// Coast mode: motors switched off, free-wheeling
    pub fn coast(&mut self, motor: Motor) {
        let cmd = match motor {
            Motor::A => DualCommand::CoastA,
            Motor::B => DualCommand::CoastB,
        };
        self.send(cmd, 0);
    }

    /// Read the running-motors bitmask, or an error sentinel
    pub fn status(&mut self) -> DualStatus {
        DualStatus(protocol::read_status(&mut self.bus, self.address))
    }
}

// Dual controller wire units are 10/9 of the caller units
fn scale(value: i16) -> i16 {
    (value as i32 * 10 / 9) as i16
}

fn scale_abs(value: i16) -> i16 {
    (value as i32 * 10 / 9).abs() as i16
}
