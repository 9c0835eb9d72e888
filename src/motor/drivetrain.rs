// Client for the drivetrain controller board (steering + speed model)
//
// Stateful proxy for one physical controller: translates motion intents into
// command frames and interprets the status word. Commands are fire-and-forget;
// a failed write is logged and execution continues, the caller notices
// downstream through a stalled status.

use std::thread;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::bus::BusTransport;
use crate::config::{DRIVE_ACCEL_MAX, DRIVE_SCALE, SETTLE_DELAY};
use crate::motor::protocol::{self, DriveCommand, STATUS_IDLE};

/// Status word of the drivetrain controller: steps left to the target, or a
/// sentinel. Distinct from [`DualStatus`](crate::motor::DualStatus), whose
/// bits mean something else entirely.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DriveStatus(i16);

impl DriveStatus {
    pub fn raw(self) -> i16 {
        self.0
    }

    /// Motion complete, controller idle
    pub fn is_idle(self) -> bool {
        self.0 == STATUS_IDLE
    }

    /// Steps remaining to the target, if the read was valid and running
    pub fn steps_remaining(self) -> Option<i16> {
        (self.0 >= 0).then_some(self.0)
    }

    /// False when the word is an error sentinel rather than a reading
    pub fn is_valid(self) -> bool {
        self.0 >= STATUS_IDLE
    }
}

/// Client for one drivetrain controller board
pub struct Drivetrain<B: BusTransport> {
    bus: B,
    address: u8,
    settle: Duration,
    accel: i16,
    decel: i16,
}

impl<B: BusTransport> Drivetrain<B> {
    pub fn new(bus: B, address: u8) -> Self {
        Self {
            bus,
            address,
            settle: SETTLE_DELAY,
            accel: 0,
            decel: 0,
        }
    }

    /// Override the post-command settle delay (zero disables the pause)
    pub fn with_settle(mut self, settle: Duration) -> Self {
        self.settle = settle;
        self
    }

    /// Last accelerations handed to `set_accelerations`, in cm/s2
    pub fn accelerations(&self) -> (i16, i16) {
        (self.accel, self.decel)
    }

    fn settle(&self) {
        if !self.settle.is_zero() {
            thread::sleep(self.settle);
        }
    }

    /// Send one command frame, then pause so the peripheral can consume it.
    /// Callers must not pipeline commands faster than the settle delay.
    fn send(&mut self, command: DriveCommand, value: i16) {
        let frame = protocol::encode_frame(command as u8, value);
        debug!(
            "Drivetrain 0x{:02X}: {:?} value={}",
            self.address, command, value
        );
        if let Err(e) = self.bus.write(self.address, &frame) {
            warn!("Command write to 0x{:02X} failed: {}", self.address, e);
        }
        self.settle();
    }

    /// Set acceleration and deceleration in cm/s2
    pub fn set_accelerations(&mut self, accel: i16, decel: i16) {
        self.send(DriveCommand::Accel, scale_abs(accel));
        self.send(DriveCommand::Decel, scale_abs(decel));
        self.accel = accel;
        self.decel = decel;
    }

    /// Apply the maximum symmetric acceleration and deceleration
    pub fn set_default_accelerations(&mut self) {
        self.set_accelerations(DRIVE_ACCEL_MAX, DRIVE_ACCEL_MAX);
    }

    /// Set the cruise speed in cm/s
    pub fn set_speed(&mut self, speed: i16) {
        self.send(DriveCommand::Speed, scale(speed));
    }

    /// Set the steering parameter; out-of-range requests clamp to -100..=100
    pub fn set_steering(&mut self, steering: i16) {
        self.send(DriveCommand::Steering, steering.clamp(-100, 100));
    }

    /// Set motor steps to the target
    pub fn set_target_steps(&mut self, steps: i16) {
        self.send(DriveCommand::Target, steps);
    }

    /// Start the motors. The first status read after GO is known to be
    /// unreliable, so one read is performed here and discarded.
    pub fn go(&mut self) {
        self.send(DriveCommand::Go, 0);
        self.settle();
        let _ = protocol::read_status(&mut self.bus, self.address);
    }

    /// Stop the motors with the configured deceleration
    pub fn stop(&mut self) {
        self.send(DriveCommand::Stop, 0);
    }

    /// Brake mode: motors hold position, drawing current
    pub fn brake(&mut self) {
        self.send(DriveCommand::Brake, 0);
    }

    /// Coast mode: motors switched off, free-wheeling
    pub fn coast(&mut self) {
        self.send(DriveCommand::Coast, 0);
    }

    /// Read the status word: steps left, -1 when stopped, or an error sentinel
    pub fn status(&mut self) -> DriveStatus {
        DriveStatus(protocol::read_status(&mut self.bus, self.address))
    }
}

fn scale(value: i16) -> i16 {
    (value as i32 * DRIVE_SCALE).clamp(i16::MIN as i32, i16::MAX as i32) as i16
}

fn scale_abs(value: i16) -> i16 {
    (value as i32 * DRIVE_SCALE)
        .abs()
        .clamp(0, i16::MAX as i32) as i16
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bus::testing::ScriptedBus;
    use crate::motor::protocol::{decode_frame, STATUS_SHORT_READ};

    fn client(bus: &mut ScriptedBus) -> Drivetrain<&mut ScriptedBus> {
        Drivetrain::new(bus, 4).with_settle(Duration::ZERO)
    }

    fn decoded(bus: &ScriptedBus) -> Vec<(u8, i16)> {
        bus.frames_to(4)
            .iter()
            .map(|f| decode_frame([f[0], f[1], f[2]]))
            .collect()
    }

    #[test]
    fn test_speed_scaled_times_20() {
        let mut bus = ScriptedBus::new();
        client(&mut bus).set_speed(50);
        assert_eq!(decoded(&bus), vec![(DriveCommand::Speed as u8, 1000)]);
    }

    #[test]
    fn test_accelerations_scaled_absolute() {
        let mut bus = ScriptedBus::new();
        let mut drive = client(&mut bus);
        drive.set_accelerations(-30, 40);
        assert_eq!(drive.accelerations(), (-30, 40));
        drop(drive);
        assert_eq!(
            decoded(&bus),
            vec![
                (DriveCommand::Accel as u8, 600),
                (DriveCommand::Decel as u8, 800),
            ]
        );
    }

    #[test]
    fn test_default_accelerations_use_ceiling() {
        let mut bus = ScriptedBus::new();
        let mut drive = client(&mut bus);
        drive.set_default_accelerations();
        assert_eq!(drive.accelerations(), (DRIVE_ACCEL_MAX, DRIVE_ACCEL_MAX));
        drop(drive);
        assert_eq!(
            decoded(&bus),
            vec![
                (DriveCommand::Accel as u8, 5000),
                (DriveCommand::Decel as u8, 5000),
            ]
        );
    }

    #[test]
    fn test_steering_clamped() {
        let mut bus = ScriptedBus::new();
        let mut drive = client(&mut bus);
        drive.set_steering(150);
        drive.set_steering(-250);
        drive.set_steering(42);
        drop(drive);
        assert_eq!(
            decoded(&bus),
            vec![
                (DriveCommand::Steering as u8, 100),
                (DriveCommand::Steering as u8, -100),
                (DriveCommand::Steering as u8, 42),
            ]
        );
    }

    #[test]
    fn test_go_discards_first_status_read() {
        let mut bus = ScriptedBus::new();
        bus.queue_read(&[0x05, 0x00]); // transient garbage after GO
        let mut drive = client(&mut bus);
        drive.go();
        drop(drive);
        assert_eq!(decoded(&bus), vec![(DriveCommand::Go as u8, 0)]);
        assert!(bus.reads.is_empty(), "go() must consume its status read");
    }

    #[test]
    fn test_consecutive_go_calls_are_independent() {
        let mut bus = ScriptedBus::new();
        bus.queue_read(&[0xFF, 0xFF]);
        bus.queue_read(&[0x01, 0x00]);
        let mut drive = client(&mut bus);
        drive.go();
        drive.go();
        drop(drive);
        // Each go() re-issues GO and eats exactly one status read
        assert_eq!(
            decoded(&bus),
            vec![(DriveCommand::Go as u8, 0), (DriveCommand::Go as u8, 0)]
        );
        assert!(bus.reads.is_empty());
    }

    #[test]
    fn test_write_failure_is_swallowed() {
        let mut bus = ScriptedBus::new();
        bus.fail_writes = true;
        let mut drive = client(&mut bus);
        drive.set_speed(10); // must not panic or abort
        drive.stop();
    }

    #[test]
    fn test_status_semantics() {
        let mut bus = ScriptedBus::new();
        bus.queue_read(&42i16.to_le_bytes());
        bus.queue_read(&(-1i16).to_le_bytes());
        bus.queue_read(&[0x07]); // short read
        let mut drive = client(&mut bus);

        let running = drive.status();
        assert_eq!(running.steps_remaining(), Some(42));
        assert!(!running.is_idle());

        let idle = drive.status();
        assert!(idle.is_idle());
        assert!(idle.is_valid());

        let bad = drive.status();
        assert_eq!(bad.raw(), STATUS_SHORT_READ);
        assert!(!bad.is_valid());
        assert_eq!(bad.steps_remaining(), None);
    }
}
