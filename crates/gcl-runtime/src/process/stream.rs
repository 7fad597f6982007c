//! Async stream readers for the child's output pipes.
//!
//! gcl may emit non-UTF8 bytes on stderr, and `BufReader::lines()` terminates
//! on invalid UTF-8, so stderr is read as bytes and decoded lossily. Standard
//! output carries the JSON wire and is forwarded as raw chunks.

use gcl_core::{ChannelEvent, ProcessError};
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, AsyncRead, AsyncReadExt, BufReader};
use tokio::sync::mpsc;
use tracing::{debug, warn};

/// Size of the buffer used for each stdout read.
pub const READ_CHUNK_SIZE: usize = 8 * 1024;

/// Forward raw stdout chunks as [`ChannelEvent::Output`] until EOF.
///
/// A read failure is reported as [`ProcessError::ReadFailed`] and ends the reader.
pub fn spawn_output_reader(
    mut stream: impl AsyncRead + Unpin + Send + 'static,
    events: mpsc::UnboundedSender<ChannelEvent>,
) {
    tokio::spawn(async move {
        let mut buf = vec![0u8; READ_CHUNK_SIZE];
        loop {
            match stream.read(&mut buf).await {
                Ok(0) => break, // EOF
                Ok(n) => {
                    debug!(bytes = n, "stdout chunk from gcl");
                    if events.send(ChannelEvent::Output(buf[..n].to_vec())).is_err() {
                        // Nobody is listening any more
                        break;
                    }
                }
                Err(e) => {
                    debug!(error = %e, "stdout reader exiting due to read error");
                    let _ = events.send(ChannelEvent::Error(ProcessError::ReadFailed(e.to_string())));
                    break;
                }
            }
        }

        debug!("stdout reader task exiting");
    });
}

/// Whether a stderr line reports a problem rather than progress.
fn is_error_line(line: &str) -> bool {
    let lower = line.to_ascii_lowercase();
    lower.contains("error") || lower.contains("panic") || lower.contains("fatal")
}

/// Stream stderr lines into `tracing`.
///
/// Lines mentioning errors are logged at `warn`, everything else at `debug`.
pub fn spawn_log_reader(stream: impl AsyncRead + Unpin + Send + 'static, path: Arc<str>) {
    tokio::spawn(async move {
        let mut segments = BufReader::new(stream).split(b'\n');
        loop {
            match segments.next_segment().await {
                Ok(Some(segment)) => {
                    let segment = segment.strip_suffix(b"\r").unwrap_or(segment.as_slice());
                    let line = String::from_utf8_lossy(segment);
                    if is_error_line(&line) {
                        warn!(path = %path, "gcl stderr: {line}");
                    } else {
                        debug!(path = %path, "gcl stderr: {line}");
                    }
                }
                Ok(None) => break,
                Err(e) => {
                    debug!(path = %path, error = %e, "Stopped reading gcl stderr");
                    break;
                }
            }
        }
    });
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_output_reader_forwards_bytes_then_closes() {
        let (tx, mut rx) = mpsc::unbounded_channel();
        spawn_output_reader(&br#"{"a":1}"#[..], tx);

        let mut received = Vec::new();
        while let Some(event) = rx.recv().await {
            match event {
                ChannelEvent::Output(bytes) => received.extend(bytes),
                ChannelEvent::Error(e) => panic!("unexpected error {e}"),
            }
        }
        assert_eq!(received, br#"{"a":1}"#);
    }

    #[test]
    fn test_error_lines_are_recognised() {
        assert!(is_error_line("Error: unbound variable x"));
        assert!(is_error_line("thread 'main' panicked at src/main.rs"));
        assert!(is_error_line("FATAL: out of memory"));
        assert!(!is_error_line("loading main.gcl"));
    }

    #[tokio::test]
    async fn test_output_reader_splits_large_output() {
        let data = vec![b' '; READ_CHUNK_SIZE * 2 + 10];
        let (tx, mut rx) = mpsc::unbounded_channel();
        spawn_output_reader(std::io::Cursor::new(data.clone()), tx);

        let mut chunks = 0;
        let mut total = 0;
        while let Some(ChannelEvent::Output(bytes)) = rx.recv().await {
            assert!(bytes.len() <= READ_CHUNK_SIZE);
            chunks += 1;
            total += bytes.len();
        }
        assert!(chunks >= 3);
        assert_eq!(total, data.len());
    }
}
