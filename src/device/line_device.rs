use log::trace;
use std::{
    collections::VecDeque,
    time::{Duration, Instant},
};

use super::{Error, Result, SerialComm, TympanBaseDevice};

/// Most bytes pulled from the port per read
const READ_LEN: usize = 1024;

/// Line-oriented reader over a [SerialComm]
///
/// The Tympan answers single-character commands with free-form text and never marks the end of a
/// reply, so everything here is bounded by timeouts instead of terminators. Bytes read past the
/// end of a line stay queued for the next call.
pub struct LineDevice<C: SerialComm> {
    comm: C,
    buffer: VecDeque<u8>,
}

impl<C: SerialComm> LineDevice<C> {
    pub fn new(comm: C) -> Self {
        Self {
            comm,
            buffer: VecDeque::new(),
        }
    }

    /// Give back the underlying transport
    pub fn into_inner(self) -> C {
        self.comm
    }

    /// One bounded read from the port; callers re-check their deadline between reads
    fn read_into_queue(&mut self, max_len: usize) -> Result<usize> {
        let mut buf = [0u8; READ_LEN];
        let len = self.comm.read(&mut buf[..max_len.clamp(1, READ_LEN)])?;
        if len > 0 {
            self.buffer.extend(&buf[0..len]);
            trace!(
                "read_into_queue: values {:?}",
                String::from_utf8_lossy(&buf[0..len])
            );
        }
        Ok(len)
    }
}

impl<C: SerialComm> TympanBaseDevice for LineDevice<C> {
    fn flush(&mut self) -> Result<()> {
        self.comm.purge_buffers()?;
        self.buffer.clear();
        Ok(())
    }

    fn send_text(&mut self, text: &str) -> Result<()> {
        trace!("send_text: sending {:?}", text);
        self.comm.write_all(text.as_bytes())?;
        self.comm.write_all(b"\n")
    }

    fn get_line(&mut self, timeout: Duration) -> Result<Vec<u8>> {
        let mut line = Vec::new();
        let start = Instant::now();
        loop {
            while let Some(b) = self.buffer.pop_front() {
                if b == b'\0' {
                    continue;
                }
                line.push(b);
                if b == b'\n' {
                    trace!("get_line: got {:?}", String::from_utf8_lossy(&line));
                    return Ok(line);
                }
            }
            if start.elapsed() >= timeout {
                break;
            }
            self.read_into_queue(READ_LEN)?;
        }

        trace!(
            "get_line: timed out with {:?}",
            String::from_utf8_lossy(&line)
        );
        Ok(line)
    }

    fn read_chunk(&mut self, max_len: usize, timeout: Duration) -> Result<Vec<u8>> {
        let start = Instant::now();
        while self.buffer.is_empty() {
            if start.elapsed() >= timeout {
                return Err(Error::Timeout(format!(
                    "no data received within {:?}",
                    timeout
                )));
            }
            self.read_into_queue(max_len)?;
        }

        let len = max_len.min(self.buffer.len());
        Ok(self.buffer.drain(..len).collect())
    }
}
