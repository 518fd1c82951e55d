//! Utility modules.

/// Log sanitization: response-body truncation and secret masking.
pub mod log_sanitizer;
