use super::Result;

/// An API to communicate with a serial device
pub trait SerialComm {
    fn write_all(&mut self, data: &[u8]) -> Result<()>;

    /// Read whatever is available, waiting at most the port's own poll timeout
    ///
    /// Returns `Ok(0)` when the timeout elapses without data; at this layer silence is not an
    /// error.
    fn read(&mut self, data: &mut [u8]) -> Result<usize>;

    fn purge_buffers(&mut self) -> Result<()>;
}
