//! TCP transport layer.
//!
//! Handles the line-delimited JSON connection to the helper process.

// ============================================================================
// Submodules
// ============================================================================

/// Line-delimited JSON connection with per-call deadlines.
pub mod connection;

// ============================================================================
// Re-exports
// ============================================================================

pub use connection::Connection;
