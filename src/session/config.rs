//! Session configuration.
//!
//! Provides a type-safe interface for configuring a smoke session: helper
//! endpoint, authentication token, timeouts, and the target page.
//!
//! # Example
//!
//! ```ignore
//! use std::time::Duration;
//! use helper_harness::SessionConfig;
//!
//! let config = SessionConfig::new()
//!     .with_port(4900)
//!     .with_call_timeout(Duration::from_secs(5))
//!     .with_target_frames(10);
//! ```

// ============================================================================
// Imports
// ============================================================================

use std::time::Duration;

use uuid::Uuid;

// ============================================================================
// Constants
// ============================================================================

/// Default helper host.
pub const DEFAULT_HOST: &str = "127.0.0.1";

/// Default helper port.
pub const DEFAULT_PORT: u16 = 4777;

/// Default pre-shared authentication token.
pub const DEFAULT_TOKEN: &str = "helper-smoke";

/// Default timeout for protocol calls (connect, send/receive).
pub const DEFAULT_CALL_TIMEOUT: Duration = Duration::from_secs(15);

/// Default wall-clock budget for the frame-collection loop.
pub const DEFAULT_SESSION_BUDGET: Duration = Duration::from_secs(10);

/// Default number of frames to collect before stopping.
pub const DEFAULT_TARGET_FRAMES: u32 = 3;

/// Default smoke page rendered by the helper.
pub const DEFAULT_PAGE_URL: &str = "data:text/html,<h1>Smoke</h1>";

/// Default viewport width in pixels.
pub const DEFAULT_WIDTH: u32 = 800;

/// Default viewport height in pixels.
pub const DEFAULT_HEIGHT: u32 = 600;

// ============================================================================
// SessionConfig
// ============================================================================

/// Smoke session configuration.
///
/// Every field is defaulted for the local helper on its standard port, and
/// overridable so the harness is reusable against other helper instances
/// (and against mock helpers in tests).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionConfig {
    /// Helper host.
    pub host: String,

    /// Helper port.
    pub port: u16,

    /// Pre-shared authentication token presented in every outbound message.
    pub token: String,

    /// Timeout for individual protocol calls.
    pub call_timeout: Duration,

    /// Wall-clock budget for the frame-collection loop.
    pub session_budget: Duration,

    /// Number of frames to collect before stopping.
    pub target_frames: u32,

    /// Browser instance identifier sent with `initBrowser`.
    pub browser_id: String,

    /// Target page URL.
    pub page_url: String,

    /// Viewport width in pixels.
    pub width: u32,

    /// Viewport height in pixels.
    pub height: u32,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self::new()
    }
}

// ============================================================================
// Constructors
// ============================================================================

impl SessionConfig {
    /// Creates a configuration with default settings and a fresh browser id.
    ///
    /// The helper keys browser instances by id; a generated id keeps
    /// repeated harness runs from colliding on a shared helper.
    #[must_use]
    pub fn new() -> Self {
        Self {
            host: DEFAULT_HOST.to_string(),
            port: DEFAULT_PORT,
            token: DEFAULT_TOKEN.to_string(),
            call_timeout: DEFAULT_CALL_TIMEOUT,
            session_budget: DEFAULT_SESSION_BUDGET,
            target_frames: DEFAULT_TARGET_FRAMES,
            browser_id: Uuid::new_v4().to_string(),
            page_url: DEFAULT_PAGE_URL.to_string(),
            width: DEFAULT_WIDTH,
            height: DEFAULT_HEIGHT,
        }
    }
}

// ============================================================================
// Builder Methods
// ============================================================================

impl SessionConfig {
    /// Sets the helper host.
    #[inline]
    #[must_use]
    pub fn with_host(mut self, host: impl Into<String>) -> Self {
        self.host = host.into();
        self
    }

    /// Sets the helper port.
    #[inline]
    #[must_use]
    pub fn with_port(mut self, port: u16) -> Self {
        self.port = port;
        self
    }

    /// Sets the authentication token.
    #[inline]
    #[must_use]
    pub fn with_token(mut self, token: impl Into<String>) -> Self {
        self.token = token.into();
        self
    }

    /// Sets the timeout for individual protocol calls.
    #[inline]
    #[must_use]
    pub fn with_call_timeout(mut self, call_timeout: Duration) -> Self {
        self.call_timeout = call_timeout;
        self
    }

    /// Sets the wall-clock budget for the frame-collection loop.
    #[inline]
    #[must_use]
    pub fn with_session_budget(mut self, session_budget: Duration) -> Self {
        self.session_budget = session_budget;
        self
    }

    /// Sets the number of frames to collect before stopping.
    #[inline]
    #[must_use]
    pub fn with_target_frames(mut self, target_frames: u32) -> Self {
        self.target_frames = target_frames;
        self
    }

    /// Sets the browser instance identifier.
    #[inline]
    #[must_use]
    pub fn with_browser_id(mut self, browser_id: impl Into<String>) -> Self {
        self.browser_id = browser_id.into();
        self
    }

    /// Sets the target page URL.
    #[inline]
    #[must_use]
    pub fn with_page_url(mut self, page_url: impl Into<String>) -> Self {
        self.page_url = page_url.into();
        self
    }

    /// Sets the viewport size in pixels.
    #[inline]
    #[must_use]
    pub fn with_viewport(mut self, width: u32, height: u32) -> Self {
        self.width = width;
        self.height = height;
        self
    }
}

// ============================================================================
// Tests
// ============================================================================
