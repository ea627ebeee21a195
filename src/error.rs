//! Shared error classification.
//!
//! Every module owns its own `thiserror` enum; this trait gives them a
//! common grepable code and a retry hint so log lines and CLI output stay
//! uniform across chat, admin and config failures.

/// Grepable error code and retryable flag attached to crate errors.
pub trait ErrorCode: std::fmt::Display {
    fn error_code(&self) -> &'static str;

    fn retryable(&self) -> bool {
        false
    }
}
