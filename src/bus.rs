// Shared two-wire command/response bus
//
// Peripherals are addressed by a small integer. Only one exchange is ever in
// flight: every client follows the same write, settle, optionally-read
// sequence, so the bus needs no locking in this single-threaded model.

#[cfg(feature = "hardware")]
use tracing::debug;

/// Error types for bus transactions
#[derive(Debug, thiserror::Error)]
pub enum BusError {
    #[error("transaction with peripheral 0x{address:02X} failed")]
    Transaction { address: u8 },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[cfg(feature = "hardware")]
    #[error("I2C error: {0}")]
    I2c(#[from] rppal::i2c::Error),
}

pub type Result<T> = std::result::Result<T, BusError>;

/// Raw transaction provider consumed by the motor controller clients.
///
/// `read` fills `buf` with up to `buf.len()` bytes and reports how many
/// actually arrived; a short count signals a peripheral-side problem and is
/// treated by callers as a completed-but-invalid read, not a failure.
pub trait BusTransport {
    fn write(&mut self, address: u8, bytes: &[u8]) -> Result<()>;
    fn read(&mut self, address: u8, buf: &mut [u8]) -> Result<usize>;
}

// Reborrowed buses let two clients share one physical bus.
impl<T: BusTransport + ?Sized> BusTransport for &mut T {
    fn write(&mut self, address: u8, bytes: &[u8]) -> Result<()> {
        (**self).write(address, bytes)
    }

    fn read(&mut self, address: u8, buf: &mut [u8]) -> Result<usize> {
        (**self).read(address, buf)
    }
}

/// I2C bus on the Raspberry Pi
#[cfg(feature = "hardware")]
pub struct RpiI2cBus {
    i2c: rppal::i2c::I2c,
}

#[cfg(feature = "hardware")]
impl RpiI2cBus {
    /// Open the default I2C bus for the board
    pub fn open() -> Result<Self> {
        let i2c = rppal::i2c::I2c::new()?;
        debug!("Opened I2C bus {}", i2c.bus());
        Ok(Self { i2c })
    }

    /// Open a specific I2C bus (e.g. 1 for /dev/i2c-1)
    pub fn open_bus(bus: u8) -> Result<Self> {
        let i2c = rppal::i2c::I2c::with_bus(bus)?;
        Ok(Self { i2c })
    }
}

#[cfg(feature = "hardware")]
impl BusTransport for RpiI2cBus {
    fn write(&mut self, address: u8, bytes: &[u8]) -> Result<()> {
        self.i2c.set_slave_address(address as u16)?;
        self.i2c.write(bytes)?;
        Ok(())
    }

    fn read(&mut self, address: u8, buf: &mut [u8]) -> Result<usize> {
        self.i2c.set_slave_address(address as u16)?;
        Ok(self.i2c.read(buf)?)
    }
}

#[cfg(test)]
pub(crate) mod testing {
    //! Scripted bus for exercising the clients without hardware.

    use super::{BusError, BusTransport, Result};
    use std::collections::VecDeque;

    pub(crate) enum ReadOutcome {
        /// Peripheral answers with these bytes (possibly fewer than asked for)
        Bytes(Vec<u8>),
        /// Transaction never completes
        Fail,
    }

    #[derive(Default)]
    pub(crate) struct ScriptedBus {
        pub writes: Vec<(u8, Vec<u8>)>,
        pub reads: VecDeque<ReadOutcome>,
        pub fail_writes: bool,
    }

    impl ScriptedBus {
        pub fn new() -> Self {
            Self::default()
        }

        pub fn queue_read(&mut self, bytes: &[u8]) {
            self.reads.push_back(ReadOutcome::Bytes(bytes.to_vec()));
        }

        pub fn queue_read_failure(&mut self) {
            self.reads.push_back(ReadOutcome::Fail);
        }

        /// Payloads written to one address, in order
        pub fn frames_to(&self, address: u8) -> Vec<Vec<u8>> {
            self.writes
                .iter()
                .filter(|(a, _)| *a == address)
                .map(|(_, b)| b.clone())
                .collect()
        }
    }

    impl BusTransport for ScriptedBus {
        fn write(&mut self, address: u8, bytes: &[u8]) -> Result<()> {
            if self.fail_writes {
                return Err(BusError::Transaction { address });
            }
            self.writes.push((address, bytes.to_vec()));
            Ok(())
        }

        fn read(&mut self, address: u8, buf: &mut [u8]) -> Result<usize> {
            match self.reads.pop_front() {
                Some(ReadOutcome::Bytes(bytes)) => {
                    let n = bytes.len().min(buf.len());
                    buf[..n].copy_from_slice(&bytes[..n]);
                    Ok(n)
                }
                Some(ReadOutcome::Fail) => Err(BusError::Transaction { address }),
                // Nothing scripted: peripheral stays silent
                None => Ok(0),
            }
        }
    }
}
