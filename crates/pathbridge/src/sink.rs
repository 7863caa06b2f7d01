//! Response output

use std::io::Write;

use crate::error::BridgeError;
use crate::protocol::Response;

/// Destination for responses.
///
/// Handlers push every response here as soon as it is produced, so a
/// streaming operation never holds more than one record.
pub trait ResponseSink {
    /// Deliver one response.
    fn send(&mut self, response: &Response) -> Result<(), BridgeError>;
}

impl ResponseSink for Vec<Response> {
    fn send(&mut self, response: &Response) -> Result<(), BridgeError> {
        self.push(response.clone());
        Ok(())
    }
}

/// Writes each response as one JSON line and flushes it.
#[derive(Debug)]
pub struct JsonSink<W: Write> {
    writer: W,
    written: u64,
}

impl<W: Write> JsonSink<W> {
    /// Wrap a writer.
    pub fn new(writer: W) -> Self {
        Self { writer, written: 0 }
    }

    /// Number of responses written so far.
    pub fn written(&self) -> u64 {
        self.written
    }

    /// Recover the underlying writer.
    pub fn into_inner(self) -> W {
        self.writer
    }
}

impl<W: Write> ResponseSink for JsonSink<W> {
    fn send(&mut self, response: &Response) -> Result<(), BridgeError> {
        serde_json::to_writer(&mut self.writer, response).map_err(|e| {
            if e.is_io() {
                BridgeError::Io(e.into())
            } else {
                BridgeError::Encode(e)
            }
        })?;
        self.writer.write_all(b"\n")?;
        self.writer.flush()?;
        self.written += 1;
        Ok(())
    }
}
