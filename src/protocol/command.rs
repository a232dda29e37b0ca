//! Outbound Request and Command message types.
//!
//! Defines the message format for commands sent from the harness to the
//! browser rendering helper.

// ============================================================================
// Imports
// ============================================================================

use serde::Serialize;

// ============================================================================
// Request
// ============================================================================

/// An authenticated command from the harness to the helper.
///
/// Every outbound message carries the pre-shared `token`; wrapping each
/// [`Command`] in a `Request` makes the invariant structural rather than
/// something each call site has to remember.
///
/// # Format
///
/// ```json
/// {
///   "type": "initBrowser",
///   "token": "helper-smoke",
///   "id": "...",
///   "url": "...",
///   "width": 800,
///   "height": 600
/// }
/// ```
#[derive(Debug, Clone, Serialize)]
pub struct Request {
    /// Pre-shared authentication token.
    pub token: String,

    /// Command with `type` discriminator and parameters.
    #[serde(flatten)]
    pub command: Command,
}

impl Request {
    /// Creates a new request wrapping the given command.
    #[inline]
    #[must_use]
    pub fn new(token: impl Into<String>, command: Command) -> Self {
        Self {
            token: token.into(),
            command,
        }
    }

    /// Creates a handshake request.
    #[inline]
    #[must_use]
    pub fn handshake(token: impl Into<String>) -> Self {
        Self::new(token, Command::Handshake)
    }

    /// Creates a browser creation request for a target page and viewport.
    #[inline]
    #[must_use]
    pub fn init_browser(
        token: impl Into<String>,
        id: impl Into<String>,
        url: impl Into<String>,
        width: u32,
        height: u32,
    ) -> Self {
        Self::new(
            token,
            Command::InitBrowser {
                id: id.into(),
                url: url.into(),
                width,
                height,
            },
        )
    }

    /// Creates a browser teardown request.
    #[inline]
    #[must_use]
    pub fn dispose_browser(token: impl Into<String>, id: impl Into<String>) -> Self {
        Self::new(token, Command::DisposeBrowser { id: id.into() })
    }
}

// ============================================================================
// Command
// ============================================================================

/// Command variants, discriminated by the wire `type` field.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type")]
pub enum Command {
    /// Opens the session.
    #[serde(rename = "handshake")]
    Handshake,

    /// Creates an off-screen browser instance.
    #[serde(rename = "initBrowser")]
    InitBrowser {
        /// Browser instance identifier.
        id: String,
        /// Target page URL.
        url: String,
        /// Viewport width in pixels.
        width: u32,
        /// Viewport height in pixels.
        height: u32,
    },

    /// Terminates a browser instance.
    #[serde(rename = "disposeBrowser")]
    DisposeBrowser {
        /// Browser instance identifier.
        id: String,
    },
}

impl Command {
    /// Returns the wire name of this command.
    #[inline]
    #[must_use]
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Handshake => "handshake",
            Self::InitBrowser { .. } => "initBrowser",
            Self::DisposeBrowser { .. } => "disposeBrowser",
        }
    }
}

// ============================================================================
// Tests
// ============================================================================
