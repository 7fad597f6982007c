//! Incremental reassembly of bare concatenated JSON values.
//!
//! The backend writes JSON values back to back with no framing, and the
//! operating system hands them to us in arbitrary chunks. [`FrameDecoder`]
//! buffers bytes until at least one complete value is available, emits every
//! complete value at the front of the buffer, and keeps the rest.

use serde_json::Value;
use tracing::{debug, warn};

/// Stateful decoder for one output stream.
///
/// Each connection owns its own decoder; the pending buffer is never shared.
#[derive(Debug, Default)]
pub struct FrameDecoder {
    pending: Vec<u8>,
    malformed: bool,
}

impl FrameDecoder {
    /// Create a decoder with an empty buffer.
    pub fn new() -> Self {
        Self::default()
    }

    /// Feed one chunk of output and collect every value it completes.
    ///
    /// Incomplete data is kept for the next call. Data that does not parse at
    /// all is kept as well; it is never silently discarded.
    ///
    /// A top-level number has no closing delimiter, so a bare number that ends
    /// exactly at a chunk boundary is emitted as it stands: `12` followed by
    /// `3` decodes as two values. Objects, arrays and strings are never
    /// emitted early. gcl only sends objects, so this does not arise on the
    /// wire.
    pub fn feed(&mut self, chunk: &[u8]) -> Vec<Value> {
        self.pending.extend_from_slice(chunk);

        let mut values = Vec::new();
        let mut consumed = 0;
        let mut broken = None;
        let mut stream = serde_json::Deserializer::from_slice(&self.pending).into_iter::<Value>();
        loop {
            match stream.next() {
                Some(Ok(value)) => {
                    consumed = stream.byte_offset();
                    values.push(value);
                }
                Some(Err(e)) if e.is_eof() => break,
                Some(Err(e)) => {
                    broken = Some(e);
                    break;
                }
                None => {
                    consumed = self.pending.len();
                    break;
                }
            }
        }

        self.pending.drain(..consumed);
        match broken {
            Some(e) => {
                if !self.malformed {
                    warn!(error = %e, pending = self.pending.len(), "Unparseable output from gcl, buffering");
                }
                self.malformed = true;
            }
            None => self.malformed = false,
        }
        if !values.is_empty() {
            debug!(count = values.len(), pending = self.pending.len(), "Decoded frames");
        }
        values
    }

    /// Whether bytes are waiting for the rest of a value.
    pub fn has_pending(&self) -> bool {
        !self.pending.is_empty()
    }

    /// The buffered, not yet decodable bytes.
    pub fn pending(&self) -> &[u8] {
        &self.pending
    }

    /// Drop any buffered bytes.
    pub fn reset(&mut self) {
        self.pending.clear();
        self.malformed = false;
    }
}
