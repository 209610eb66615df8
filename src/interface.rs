use log::{debug, info, trace, warn};
use std::{
    io::{self, Write},
    thread,
    time::{Duration, Instant},
};

use super::{
    config::ReplyTiming,
    device::TympanBaseDevice,
    Result, TympanDevice,
};

/// Largest raw read requested while receiving a file
const CHUNK_LEN: usize = 4096;

/// A connection to a Tympan
///
/// Wraps an implementer of [TympanBaseDevice] and owns it for the whole session, so the serial
/// port is released whenever this value goes away, including on error paths.
pub struct Tympan<T: TympanBaseDevice> {
    device: T,
    read_timeout: Duration,
    echo: Box<dyn Write>,
}

#[cfg(feature = "serialport_comm")]
impl Tympan<crate::device::LineDevice<crate::device::SerialPort>> {
    /// Open the serial port described by `config`
    pub fn open(config: &crate::config::PortConfig) -> Result<Self> {
        let port = crate::device::SerialPort::new(config)?;
        Ok(Self::new(
            crate::device::LineDevice::new(port),
            config.read_timeout,
        ))
    }
}

impl<T: TympanBaseDevice> Tympan<T> {
    /// Wrap `device`, waiting at most `read_timeout` for any single line
    ///
    /// Echoed replies go to stdout until [with_echo](Self::with_echo) says otherwise.
    pub fn new(device: T, read_timeout: Duration) -> Self {
        Self {
            device,
            read_timeout,
            echo: Box::new(io::stdout()),
        }
    }

    /// Send echoed reply text to `sink` instead of stdout
    pub fn with_echo(mut self, sink: impl Write + 'static) -> Self {
        self.echo = Box::new(sink);
        self
    }

    /// Collect everything the device says until it has been quiet for `quiet_period`
    ///
    /// There is no end-of-reply marker, so the end is inferred: one read bounded by the read
    /// timeout, then further reads until `quiet_period` passes without new bytes. A device that
    /// pauses longer than `quiet_period` mid-reply is cut short. Each non-empty chunk is copied to
    /// `echo` as it arrives.
    pub fn get_reply(
        &mut self,
        quiet_period: Duration,
        echo: Option<&mut dyn Write>,
    ) -> Result<String> {
        let reply = aggregate_reply(&mut self.device, self.read_timeout, quiet_period, echo)?;
        Ok(String::from_utf8(reply)?)
    }

    /// Discard whatever the device is still sending
    pub fn clear_reply_buffer(&mut self) -> Result<()> {
        let stale = aggregate_reply(
            &mut self.device,
            self.read_timeout,
            Duration::from_secs(1),
            None,
        )?;
        trace!(
            "clear_reply_buffer: discarded {:?}",
            String::from_utf8_lossy(&stale)
        );
        self.device.flush()?;
        Ok(())
    }

    /// Release the port
    pub fn close(self) {
        drop(self);
    }
}

impl<T: TympanBaseDevice> Drop for Tympan<T> {
    fn drop(&mut self) {
        info!("Closing connection to Tympan");
    }
}

impl<T: TympanBaseDevice> TympanDevice for Tympan<T> {
    fn send(&mut self, command: &str) -> Result<()> {
        debug!("Sending command {:?}", command);
        Ok(self.device.send_text(command)?)
    }

    fn read_reply(&mut self, timing: ReplyTiming) -> Result<String> {
        thread::sleep(timing.settle);
        let echo: Option<&mut dyn Write> = if timing.echo {
            Some(&mut *self.echo)
        } else {
            None
        };
        let reply = aggregate_reply(
            &mut self.device,
            self.read_timeout,
            timing.quiet_period,
            echo,
        )?;
        Ok(String::from_utf8(reply)?)
    }

    fn read_line(&mut self) -> Result<String> {
        let line = self.device.get_line(self.read_timeout)?;
        Ok(String::from_utf8(line)?)
    }

    fn receive_bytes(&mut self, len: u64, sink: &mut dyn Write) -> Result<u64> {
        let mut remaining = len;
        while remaining > 0 {
            let want = usize::try_from(remaining).map_or(CHUNK_LEN, |r| r.min(CHUNK_LEN));
            let chunk = self.device.read_chunk(want, self.read_timeout)?;
            sink.write_all(&chunk)?;
            remaining -= chunk.len() as u64;
            trace!("receive_bytes: {} of {} bytes left", remaining, len);
        }
        sink.flush()?;
        Ok(len)
    }
}

fn aggregate_reply<T: TympanBaseDevice>(
    device: &mut T,
    read_timeout: Duration,
    quiet_period: Duration,
    mut echo: Option<&mut dyn Write>,
) -> Result<Vec<u8>> {
    let mut reply = device.get_line(read_timeout)?;
    if !reply.is_empty() {
        echo_chunk(&mut echo, &reply);
    }

    let mut last_activity = Instant::now();
    while last_activity.elapsed() < quiet_period {
        // never block past the end of the quiet period
        let remaining = quiet_period.saturating_sub(last_activity.elapsed());
        let chunk = device.get_line(read_timeout.min(remaining))?;
        if !chunk.is_empty() {
            last_activity = Instant::now();
            echo_chunk(&mut echo, &chunk);
            reply.extend_from_slice(&chunk);
        }
    }

    debug!("get_reply: {} bytes", reply.len());
    Ok(reply)
}

fn echo_chunk(echo: &mut Option<&mut dyn Write>, chunk: &[u8]) {
    if let Some(sink) = echo {
        if let Err(e) = sink.write_all(chunk).and_then(|_| sink.flush()) {
            warn!("Could not echo reply text: {}", e);
        }
    }
}
