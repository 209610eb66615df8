use std::io::Write;

use crate::{config::ReplyTiming, Result};

/// A higher-level API for a Tympan
///
/// Commands are short ASCII strings, usually a single character, sent as one line. Replies are
/// free text whose end is only known by the device falling silent.
pub trait TympanDevice {
    /// Send `command` followed by a newline
    fn send(&mut self, command: &str) -> Result<()>;

    /// Wait `timing.settle`, then collect the reply until it has been quiet for
    /// `timing.quiet_period`
    fn read_reply(&mut self, timing: ReplyTiming) -> Result<String>;

    /// Read one line, or whatever part of it arrives before the read timeout
    fn read_line(&mut self) -> Result<String>;

    /// Copy exactly `len` raw bytes from the device to `sink`
    ///
    /// Fails with a timeout if the device stops sending early.
    fn receive_bytes(&mut self, len: u64, sink: &mut dyn Write) -> Result<u64>;

    /// Send `command` and collect the whole reply
    fn command(&mut self, command: &str, timing: ReplyTiming) -> Result<String> {
        self.send(command)?;
        self.read_reply(timing)
    }

    /// Send `command` and read a single line of reply
    fn command_line(&mut self, command: &str) -> Result<String> {
        self.send(command)?;
        self.read_line()
    }
}
