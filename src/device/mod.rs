//! Byte-level access to the Tympan's USB serial link

use std::time::Duration;

mod line_device;
pub use line_device::LineDevice;

mod serial_comm;
pub use serial_comm::SerialComm;

#[cfg(feature = "serialport_comm")]
mod serialport_comm;
#[cfg(feature = "serialport_comm")]
pub use serialport_comm::SerialPort;

#[cfg(test)]
pub(crate) mod mock;

type Result<T> = std::result::Result<T, Error>;

/// A device that can exchange ASCII lines and raw bytes with a Tympan
pub trait TympanBaseDevice {
    /// Discard any data already received but not yet read
    fn flush(&mut self) -> Result<()>;

    /// Send `text` terminated by a newline
    fn send_text(&mut self, text: &str) -> Result<()>;

    /// Read up to and including the next `\n`
    ///
    /// If `timeout` elapses first, whatever partial line arrived is returned; this is empty when
    /// the device said nothing.
    fn get_line(&mut self, timeout: Duration) -> Result<Vec<u8>>;

    /// Read between one and `max_len` raw bytes
    ///
    /// Fails with [Error::Timeout] when nothing arrives within `timeout`.
    fn read_chunk(&mut self, max_len: usize, timeout: Duration) -> Result<Vec<u8>>;
}

#[derive(thiserror::Error, Debug)]
pub enum Error {
    #[cfg(feature = "serialport_comm")]
    #[error("Could not open port: `{0}`")]
    Open(serialport::Error),
    #[error("IO error: `{0:?}`")]
    IO(std::io::Error),
    #[error("Timed out: `{0}`")]
    Timeout(String),
    #[error("Communication error: `{0}`")]
    Communication(String),
}

#[cfg(feature = "serialport_comm")]
impl From<serialport::Error> for Error {
    fn from(e: serialport::Error) -> Self {
        Error::Open(e)
    }
}

impl From<std::io::Error> for Error {
    fn from(e: std::io::Error) -> Self {
        Error::IO(e)
    }
}
