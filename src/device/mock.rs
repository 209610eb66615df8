//! Scripted transport for exercising the reader without hardware

use std::{
    cell::RefCell,
    collections::VecDeque,
    rc::Rc,
    thread,
    time::{Duration, Instant},
};

use super::{Result, SerialComm};

const POLL: Duration = Duration::from_millis(2);

/// Replays byte chunks at fixed delays, either from construction or from a matching write
pub struct MockComm {
    pending: Vec<(Instant, Vec<u8>)>,
    responses: VecDeque<(Vec<u8>, Vec<(u64, Vec<u8>)>)>,
    written: Rc<RefCell<Vec<u8>>>,
}

impl MockComm {
    pub fn new() -> Self {
        Self {
            pending: Vec::new(),
            responses: VecDeque::new(),
            written: Rc::new(RefCell::new(Vec::new())),
        }
    }

    /// Deliver `data` `delay_ms` milliseconds from now
    pub fn chunk_after(mut self, delay_ms: u64, data: impl AsRef<[u8]>) -> Self {
        self.schedule(Instant::now(), delay_ms, data.as_ref().to_vec());
        self
    }

    /// When exactly `written` is next written, deliver each chunk at its delay after that write
    pub fn on_write(mut self, written: impl AsRef<[u8]>, chunks: &[(u64, &[u8])]) -> Self {
        self.responses.push_back((
            written.as_ref().to_vec(),
            chunks.iter().map(|(d, c)| (*d, c.to_vec())).collect(),
        ));
        self
    }

    /// Everything written to the port so far
    pub fn written(&self) -> Rc<RefCell<Vec<u8>>> {
        Rc::clone(&self.written)
    }

    fn schedule(&mut self, from: Instant, delay_ms: u64, data: Vec<u8>) {
        self.pending
            .push((from + Duration::from_millis(delay_ms), data));
        self.pending.sort_by_key(|(due, _)| *due);
    }
}

impl SerialComm for MockComm {
    fn write_all(&mut self, data: &[u8]) -> Result<()> {
        self.written.borrow_mut().extend_from_slice(data);

        let matched = self
            .responses
            .front()
            .is_some_and(|(expected, _)| expected == data);
        if matched {
            if let Some((_, chunks)) = self.responses.pop_front() {
                let now = Instant::now();
                for (delay_ms, chunk) in chunks {
                    self.schedule(now, delay_ms, chunk);
                }
            }
        }
        Ok(())
    }

    fn read(&mut self, data: &mut [u8]) -> Result<usize> {
        let now = Instant::now();
        let mut len = 0;
        while len < data.len() {
            let Some((due, chunk)) = self.pending.first_mut() else {
                break;
            };
            if *due > now {
                break;
            }
            let n = chunk.len().min(data.len() - len);
            data[len..len + n].copy_from_slice(&chunk[..n]);
            chunk.drain(..n);
            len += n;
            if chunk.is_empty() {
                self.pending.remove(0);
            }
        }

        if len == 0 {
            thread::sleep(POLL);
        }
        Ok(len)
    }

    fn purge_buffers(&mut self) -> Result<()> {
        let now = Instant::now();
        self.pending.retain(|(due, _)| *due > now);
        Ok(())
    }
}
