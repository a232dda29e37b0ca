//! Line-delimited JSON connection to the helper process.
//!
//! This module owns the TCP stream for the lifetime of a session: opened
//! once at session start, closed once at session end. Messages are single
//! JSON objects, one per line, terminated by `\n`.
//!
//! # Deadlines
//!
//! Every read is a buffered line read bounded by an explicit deadline; no
//! call may block longer than its timeout. Writes go through `write_all`,
//! so a partial write surfaces as an IO error rather than a silent
//! half-message.

// ============================================================================
// Imports
// ============================================================================

use std::time::Duration;

use serde::Serialize;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::net::TcpStream;
use tokio::net::tcp::{OwnedReadHalf, OwnedWriteHalf};
use tokio::time::timeout;
use tracing::{debug, info};

use crate::error::{Error, Result};
use crate::protocol::command::Request;
use crate::protocol::notice::{Notice, preview};

// ============================================================================
// Connection
// ============================================================================

/// Exclusively-owned, ordered, bidirectional byte stream to the helper.
///
/// The connection has a single owner for its entire lifetime; there are no
/// concurrent readers or writers.
pub struct Connection {
    /// Buffered read half.
    reader: BufReader<OwnedReadHalf>,
    /// Write half.
    writer: OwnedWriteHalf,
}

impl Connection {
    /// Opens a stream socket to the given address.
    ///
    /// There is no retry; a smoke harness surfaces failure immediately.
    ///
    /// # Errors
    ///
    /// - [`Error::ConnectionTimeout`] if the endpoint does not accept in time
    /// - [`Error::Connection`] if the endpoint refuses
    pub async fn open(host: &str, port: u16, connect_timeout: Duration) -> Result<Self> {
        let address = format!("{host}:{port}");

        let stream = timeout(connect_timeout, TcpStream::connect(&address))
            .await
            .map_err(|_| Error::connection_timeout(connect_timeout.as_millis() as u64))?
            .map_err(|e| Error::connection(format!("{address}: {e}")))?;

        let _ = stream.set_nodelay(true);
        let (read_half, write_half) = stream.into_split();

        debug!(%address, "connection open");

        Ok(Self {
            reader: BufReader::new(read_half),
            writer: write_half,
        })
    }

    /// Serializes `request` to a single line and writes it to the stream.
    ///
    /// # Errors
    ///
    /// - [`Error::Json`] if serialization fails
    /// - [`Error::Io`] on a failed or partial write
    pub async fn send(&mut self, request: &Request) -> Result<()> {
        let value = serde_json::to_value(request)?;
        let line = encode_line(&value)?;

        self.writer.write_all(line.as_bytes()).await?;
        self.writer.flush().await?;

        info!("sent: {}", preview(&value));
        Ok(())
    }

    /// Reads one message line, bounded by `wait`.
    ///
    /// An empty line is a quiet delimiter with no payload and yields
    /// `Ok(None)`.
    ///
    /// # Errors
    ///
    /// - [`Error::Timeout`] if no delimiter arrives within `wait`
    /// - [`Error::ConnectionClosed`] if the helper closed the stream
    /// - [`Error::Protocol`] if the message body cannot be decoded
    /// - [`Error::Io`] on any other read failure
    pub async fn recv(&mut self, wait: Duration) -> Result<Option<Notice>> {
        let mut line = String::new();

        let read = timeout(wait, self.reader.read_line(&mut line))
            .await
            .map_err(|_| Error::timeout("receive", wait.as_millis() as u64))??;

        if read == 0 {
            return Err(Error::ConnectionClosed);
        }

        let body = line.trim_end_matches(['\r', '\n']);
        if body.is_empty() {
            return Ok(None);
        }

        let notice: Notice = serde_json::from_str(body)
            .map_err(|e| Error::protocol(format!("undecodable message: {e}")))?;

        info!("recv: {}", notice.preview());
        Ok(Some(notice))
    }

    /// Shuts the stream down.
    pub async fn close(mut self) {
        let _ = self.writer.shutdown().await;
        debug!("connection closed");
    }
}

// ============================================================================
// Line Encoding
// ============================================================================

/// Encodes a message as one compact JSON line with a trailing delimiter.
///
/// JSON string escaping guarantees the body contains no raw newline, so
/// the only `\n` in the result is the final delimiter.
pub(crate) fn encode_line<T: Serialize>(message: &T) -> Result<String> {
    let mut line = serde_json::to_string(message)?;
    line.push('\n');
    Ok(line)
}

// ============================================================================
// Tests
// ============================================================================
