//! Shared utilities for integration testing.

use request_trace::Logger;
use std::io::Write;
use std::sync::{Arc, Mutex};

/// An in-memory sink shared between a logger and the test.
#[derive(Clone, Default)]
pub struct SharedBuffer(Arc<Mutex<Vec<u8>>>);

impl SharedBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Everything written so far, as UTF-8 text.
    pub fn contents(&self) -> String {
        String::from_utf8(self.0.lock().unwrap().clone()).unwrap()
    }

    /// Complete lines written so far.
    pub fn lines(&self) -> Vec<String> {
        self.contents().lines().map(str::to_owned).collect()
    }
}

impl Write for SharedBuffer {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        self.0.lock().unwrap().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> std::io::Result<()> {
        Ok(())
    }
}

/// A logger writing into the returned buffer instead of stderr.
pub fn buffered_logger() -> (Logger, SharedBuffer) {
    let buffer = SharedBuffer::new();
    let logger = Logger::new();
    logger.set_output(buffer.clone());
    (logger, buffer)
}
