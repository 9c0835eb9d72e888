// Command/status protocol shared by the motor controller boards
//
// Every command travels as a fixed 3-byte frame: [code, value-low, value-high]
// with a little-endian signed 16-bit value. Status is read back as exactly
// 2 bytes, little-endian signed.

use tracing::warn;

use crate::bus::BusTransport;

/// Command set of the drivetrain controller. Wire values, do not renumber.
#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DriveCommand {
    None = 0,
    Go = 1,
    Stop = 2,
    Speed = 3,
    Steering = 4,
    Accel = 5,
    Decel = 6,
    Target = 7,
    Coast = 8,
    Brake = 9,
}

/// Command set of the dual-motor controller. Wire values, do not renumber.
#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DualCommand {
    None = 0,
    GoA = 1,
    StopA = 2,
    SpeedA = 3,
    AccelA = 4,
    DecelA = 5,
    TargetA = 6,
    CoastA = 7,
    BrakeA = 8,
    GoB = 9,
    StopB = 10,
    SpeedB = 11,
    AccelB = 12,
    DecelB = 13,
    TargetB = 14,
    CoastB = 15,
    BrakeB = 16,
}

/// Peripheral reports stopped/idle
pub const STATUS_IDLE: i16 = -1;
/// Status read came back with fewer bytes than expected
pub const STATUS_SHORT_READ: i16 = -9;
/// Status read transaction never completed
pub const STATUS_READ_FAILED: i16 = -99;

/// Build the 3-byte command frame. Command codes are transmitted as-is;
/// out-of-range codes are a caller error, not validated here.
pub fn encode_frame(command: u8, value: i16) -> [u8; 3] {
    let [lo, hi] = value.to_le_bytes();
    [command, lo, hi]
}

/// Recover (command, value) from a frame, for tooling and tests
pub fn decode_frame(frame: [u8; 3]) -> (u8, i16) {
    (frame[0], i16::from_le_bytes([frame[1], frame[2]]))
}

/// Reconstruct a status word from a 2-byte little-endian read
pub fn decode_status(lo: u8, hi: u8) -> i16 {
    i16::from_le_bytes([lo, hi])
}

/// Read one status word from a peripheral.
///
/// Degrades to a sentinel instead of failing: callers must check for negative
/// sentinel values before treating the result as a step count or bitmask.
pub(crate) fn read_status(bus: &mut impl BusTransport, address: u8) -> i16 {
    let mut buf = [0u8; 2];
    match bus.read(address, &mut buf) {
        Ok(2) => decode_status(buf[0], buf[1]),
        Ok(n) => {
            warn!("Peripheral 0x{:02X} returned {} of 2 status bytes", address, n);
            STATUS_SHORT_READ
        }
        Err(e) => {
            warn!("Status read from 0x{:02X} failed: {}", address, e);
            STATUS_READ_FAILED
        }
    }
}
