//! Helper Harness - Smoke-test client for an off-screen browser rendering helper.
//!
//! This crate exercises a local browser-rendering helper process from the
//! outside, over its wire protocol: it opens a TCP connection, performs a
//! token-authenticated handshake, requests creation of an off-screen browser
//! instance, waits for a bounded number of rendered-frame notifications, and
//! tears the browser down.
//!
//! # Architecture
//!
//! The harness follows a client-server model:
//!
//! - **Local End (Rust)**: Sends authenticated commands, receives
//!   acknowledgments and pushed frame notifications over TCP
//! - **Remote End (Helper)**: Renders pages off-screen, pushes `frameReady`
//!   notifications
//!
//! Key design principles:
//!
//! - One [`Session`] owns one connection for its entire lifecycle
//! - Explicit state machine with guarded transitions
//! - Every wait is bounded by a per-call deadline; the frame-collection loop
//!   is additionally bounded by a wall-clock budget
//! - The connection is closed on every exit path, including fatal errors
//!
//! # Quick Start
//!
//! ```no_run
//! use helper_harness::{Result, Session, SessionConfig};
//!
//! #[tokio::main]
//! async fn main() -> Result<()> {
//!     let config = SessionConfig::new();
//!     let report = Session::new(config)?.run().await?;
//!
//!     println!("Total frames: {}", report.frames);
//!     Ok(())
//! }
//! ```
//!
//! # Modules
//!
//! | Module | Description |
//! |--------|-------------|
//! | [`error`] | Error types and [`Result`] alias |
//! | [`protocol`] | Wire message types (outbound commands, inbound notices) |
//! | [`session`] | Session driver, state machine, configuration |
//! | [`transport`] | Line-delimited JSON TCP transport |

// ============================================================================
// Modules
// ============================================================================

/// Error types and result aliases.
///
/// All fallible operations return [`Result<T>`] which uses [`Error`].
pub mod error;

/// Wire protocol message types.
///
/// Outbound [`Request`]/[`Command`] and inbound [`Notice`] structures.
pub mod protocol;

/// Protocol session driver.
///
/// Use [`Session::new`] with a [`SessionConfig`] to drive one lifecycle.
pub mod session;

/// TCP transport layer.
///
/// Line-delimited JSON connection handling with per-call deadlines.
pub mod transport;

// ============================================================================
// Re-exports
// ============================================================================

// Error types
pub use error::{Error, Result};

// Protocol types
pub use protocol::{Command, Notice, ParsedNotice, Request};

// Session types
pub use session::{Session, SessionConfig, SessionReport, SessionState, StopReason};

// Transport types
pub use transport::Connection;
