//! Session driver and state machine.
//!
//! The [`Session`] owns one connection and drives the fixed exchange
//! sequence against the helper: handshake, browser creation, bounded frame
//! collection, teardown. Progress is tracked in an explicit
//! [`SessionState`] with guarded transitions, so misordered calls fail with
//! [`Error::State`] instead of confusing the peer.
//!
//! # Sequence
//!
//! ```text
//! Disconnected --connect--> Handshaking --initBrowser--> BrowserActive
//!                                                              |
//!                                 Disposed <--disposeBrowser---+
//! ```
//!
//! The connection is closed on every exit path, including fatal errors.

// ============================================================================
// Imports
// ============================================================================

use std::fmt;
use std::time::Duration;

use tokio::time::Instant;
use tracing::{debug, info};

use crate::error::{Error, Result};
use crate::protocol::command::Request;
use crate::protocol::notice::ParsedNotice;
use crate::transport::Connection;

use super::config::SessionConfig;

// ============================================================================
// SessionState
// ============================================================================

/// Explicit session state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    /// No connection yet, or connection torn down.
    Disconnected,
    /// Connected; session not yet past the handshake/creation steps.
    Handshaking,
    /// Browser instance created; frames may arrive.
    BrowserActive,
    /// Teardown requested. Terminal.
    Disposed,
}

impl SessionState {
    /// Returns the lowercase state name.
    #[inline]
    #[must_use]
    pub fn name(&self) -> &'static str {
        match self {
            Self::Disconnected => "disconnected",
            Self::Handshaking => "handshaking",
            Self::BrowserActive => "browser active",
            Self::Disposed => "disposed",
        }
    }
}

impl fmt::Display for SessionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

// ============================================================================
// StopReason
// ============================================================================

/// Why the frame-collection loop stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopReason {
    /// The target frame count was reached.
    Target,
    /// The wall-clock budget ran out.
    Budget,
    /// A receive timed out; no more frames are coming soon.
    ///
    /// This is an expected end state, not a defect.
    Quiet,
}

// ============================================================================
// SessionReport
// ============================================================================

/// Outcome of the frame-collection loop.
#[derive(Debug, Clone)]
pub struct SessionReport {
    /// Total frames observed.
    pub frames: u32,
    /// Why collection stopped.
    pub stop: StopReason,
    /// Wall-clock time spent collecting.
    pub elapsed: Duration,
}

// ============================================================================
// Session
// ============================================================================

/// Protocol session driver.
///
/// Owns the connection for one connect-to-dispose lifecycle.
///
/// # Example
///
/// ```no_run
/// use helper_harness::{Result, Session, SessionConfig};
///
/// #[tokio::main]
/// async fn main() -> Result<()> {
///     let report = Session::new(SessionConfig::new())?.run().await?;
///     println!("Total frames: {}", report.frames);
///     Ok(())
/// }
/// ```
pub struct Session {
    /// Injected configuration.
    config: SessionConfig,
    /// Current state.
    state: SessionState,
    /// Connection, present between connect and close.
    conn: Option<Connection>,
}

// ============================================================================
// Session - Construction
// ============================================================================

impl Session {
    /// Creates a session from the given configuration.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`] if the token or browser id is empty.
    pub fn new(config: SessionConfig) -> Result<Self> {
        if config.token.is_empty() {
            return Err(Error::config("token must not be empty"));
        }
        if config.browser_id.is_empty() {
            return Err(Error::config("browser id must not be empty"));
        }

        Ok(Self {
            config,
            state: SessionState::Disconnected,
            conn: None,
        })
    }

    /// Returns the current session state.
    #[inline]
    #[must_use]
    pub fn state(&self) -> SessionState {
        self.state
    }

    /// Returns the session configuration.
    #[inline]
    #[must_use]
    pub fn config(&self) -> &SessionConfig {
        &self.config
    }
}

// ============================================================================
// Session - Orchestration
// ============================================================================

impl Session {
    /// Runs one full connect-to-dispose lifecycle.
    ///
    /// The connection is closed before returning, on success and on every
    /// fatal error path.
    ///
    /// # Errors
    ///
    /// Propagates any fatal error from the individual steps. A receive
    /// timeout during frame collection is absorbed as [`StopReason::Quiet`]
    /// rather than propagated.
    pub async fn run(mut self) -> Result<SessionReport> {
        let outcome = self.drive().await;
        self.close().await;
        outcome
    }

    /// The fixed exchange sequence.
    async fn drive(&mut self) -> Result<SessionReport> {
        self.connect().await?;
        self.handshake().await?;
        self.init_browser().await?;
        let report = self.collect_frames().await?;
        self.dispose().await?;

        info!(
            frames = report.frames,
            stop = ?report.stop,
            elapsed_ms = report.elapsed.as_millis() as u64,
            "session complete"
        );
        Ok(report)
    }

    /// Opens the connection to the helper.
    ///
    /// # Errors
    ///
    /// - [`Error::State`] unless the session is disconnected
    /// - [`Error::Connection`] / [`Error::ConnectionTimeout`] from the dial
    pub async fn connect(&mut self) -> Result<()> {
        self.guard("connect", SessionState::Disconnected)?;

        let conn = Connection::open(
            &self.config.host,
            self.config.port,
            self.config.call_timeout,
        )
        .await?;

        info!(
            host = %self.config.host,
            port = self.config.port,
            "connected to helper"
        );

        self.conn = Some(conn);
        self.state = SessionState::Handshaking;
        Ok(())
    }

    /// Performs the authenticated handshake.
    ///
    /// The acknowledgment is logged but not validated beyond a successful
    /// parse.
    ///
    /// # Errors
    ///
    /// - [`Error::State`] unless the session is handshaking
    /// - Any fatal transport or protocol error
    pub async fn handshake(&mut self) -> Result<()> {
        self.guard("handshake", SessionState::Handshaking)?;

        let request = Request::handshake(&self.config.token);
        let wait = self.config.call_timeout;

        let conn = self.conn_mut()?;
        conn.send(&request).await?;

        if conn.recv(wait).await?.is_none() {
            debug!("handshake acknowledgment carried no payload");
        }
        Ok(())
    }

    /// Requests creation of the off-screen browser instance.
    ///
    /// The creation acknowledgment is recorded in the log for human
    /// inspection; it is not schema-validated.
    ///
    /// # Errors
    ///
    /// - [`Error::State`] unless the session is handshaking
    /// - Any fatal transport or protocol error
    pub async fn init_browser(&mut self) -> Result<()> {
        self.guard("initBrowser", SessionState::Handshaking)?;

        let request = Request::init_browser(
            &self.config.token,
            &self.config.browser_id,
            &self.config.page_url,
            self.config.width,
            self.config.height,
        );
        let wait = self.config.call_timeout;

        let conn = self.conn_mut()?;
        conn.send(&request).await?;

        match conn.recv(wait).await? {
            Some(ack) => info!(response = %ack.preview(), "browser created"),
            None => info!("browser created, empty acknowledgment"),
        }

        self.state = SessionState::BrowserActive;
        Ok(())
    }

    /// Collects pushed `frameReady` notifications.
    ///
    /// Runs until the target frame count is reached, the wall-clock budget
    /// is exhausted, or a receive times out. The count is checked before
    /// every receive, so no receive is issued once the target is met. A
    /// timeout means the helper went quiet and ends the loop immediately;
    /// unknown message types and bare delimiters are skipped.
    ///
    /// # Errors
    ///
    /// - [`Error::State`] unless the browser is active
    /// - Any fatal transport or protocol error other than a receive timeout
    pub async fn collect_frames(&mut self) -> Result<SessionReport> {
        self.guard("collect frames", SessionState::BrowserActive)?;

        let wait = self.config.call_timeout;
        let budget = self.config.session_budget;
        let target = self.config.target_frames;

        info!(
            target,
            budget_ms = budget.as_millis() as u64,
            "waiting for frames"
        );

        let started = Instant::now();
        let mut frames = 0u32;

        let stop = loop {
            if frames >= target {
                break StopReason::Target;
            }
            if started.elapsed() >= budget {
                break StopReason::Budget;
            }

            match self.conn_mut()?.recv(wait).await {
                Ok(Some(notice)) => match notice.parse() {
                    ParsedNotice::FrameReady {
                        width,
                        height,
                        data_len,
                    } => {
                        frames += 1;
                        info!(frame = frames, width, height, data_len, "frame ready");
                    }
                    ParsedNotice::Unknown { kind } => {
                        debug!(kind = %kind, "skipping message");
                    }
                },

                // Bare delimiter with no payload.
                Ok(None) => {}

                Err(e) if e.is_timeout() => {
                    info!("helper went quiet, ending collection");
                    break StopReason::Quiet;
                }

                Err(e) => return Err(e),
            }
        };

        Ok(SessionReport {
            frames,
            stop,
            elapsed: started.elapsed(),
        })
    }

    /// Requests browser teardown.
    ///
    /// Sent unconditionally after collection, even when the loop exited via
    /// timeout. No response is awaited.
    ///
    /// # Errors
    ///
    /// - [`Error::State`] unless the browser is active
    /// - Any fatal transport error from the write
    pub async fn dispose(&mut self) -> Result<()> {
        self.guard("disposeBrowser", SessionState::BrowserActive)?;

        let request = Request::dispose_browser(&self.config.token, &self.config.browser_id);
        self.conn_mut()?.send(&request).await?;

        debug!(id = %self.config.browser_id, "browser disposed");
        self.state = SessionState::Disposed;
        Ok(())
    }

    /// Closes the connection if one is open.
    ///
    /// Safe to call in any state and on any error path.
    pub async fn close(&mut self) {
        if let Some(conn) = self.conn.take() {
            conn.close().await;
        }
    }
}

// ============================================================================
// Session - Guards
// ============================================================================

impl Session {
    /// Rejects `operation` unless the session is in `expected` state.
    fn guard(&self, operation: &str, expected: SessionState) -> Result<()> {
        if self.state != expected {
            return Err(Error::state(operation, self.state.name()));
        }
        Ok(())
    }

    /// Borrows the connection, failing if it was never opened or was closed.
    fn conn_mut(&mut self) -> Result<&mut Connection> {
        self.conn.as_mut().ok_or(Error::ConnectionClosed)
    }
}

// ============================================================================
// Tests
// ============================================================================
