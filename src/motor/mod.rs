// Motor controller clients for the shared peripheral bus
//
// Provides:
// - Command frame codec and status-word protocol
// - Drivetrain client (steering + speed model, one motor pair)
// - Dual-motor client (two independent motors A and B)
// - Trapezoidal traversal-time estimation

mod drivetrain;
mod dual;
pub mod profile;
pub mod protocol;

pub use drivetrain::{DriveStatus, Drivetrain};
pub use dual::{DualMotors, DualStatus, Motor};
pub use profile::estimate_travel_ms;
pub use protocol::{DriveCommand, DualCommand, STATUS_IDLE, STATUS_READ_FAILED, STATUS_SHORT_READ};
