use super::serial_comm::SerialComm;
use super::Result;
use crate::config::PortConfig;
use log::{debug, info};
use std::io::{self, Read, Write};
use std::time::Duration;

/// Poll interval of the underlying port; line and reply timeouts are enforced above this
const POLL_TIMEOUT: Duration = Duration::from_millis(10);

/// Communicate with a serial device using the
/// serialport library
///
/// /dev/tty* or similar on unix-like systems
/// COM devices on Windows systems
///
/// The port is closed when this value is dropped.
pub struct SerialPort {
    device: Box<dyn serialport::SerialPort>,
    path: String,
}

impl SerialPort {
    /// Opens the port described by `config`
    pub fn new(config: &PortConfig) -> Result<Self> {
        info!(
            "Opening serial port {} at {} baud",
            config.path, config.baud_rate
        );
        let device = serialport::new(config.path.as_str(), config.baud_rate)
            .timeout(POLL_TIMEOUT)
            .parity(serialport::Parity::None)
            .data_bits(serialport::DataBits::Eight)
            .stop_bits(serialport::StopBits::One)
            .open()?;

        Ok(Self {
            device,
            path: config.path.clone(),
        })
    }
}

impl SerialComm for SerialPort {
    fn write_all(&mut self, data: &[u8]) -> Result<()> {
        self.device.write_all(data)?;
        Ok(self.device.flush()?)
    }

    fn read(&mut self, data: &mut [u8]) -> Result<usize> {
        match self.device.read(data) {
            Ok(len) => Ok(len),
            Err(e) if e.kind() == io::ErrorKind::TimedOut => Ok(0),
            Err(e) => Err(e.into()),
        }
    }

    fn purge_buffers(&mut self) -> Result<()> {
        Ok(self.device.clear(serialport::ClearBuffer::All)?)
    }
}

impl Drop for SerialPort {
    fn drop(&mut self) {
        debug!("Closing serial port {}", self.path);
    }
}
