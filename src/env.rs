//! Environment variable names read by [`HandlerOptions::from_env`] and
//! [`init`](crate::init).
//!
//! These are purely helpers; handlers themselves never touch the
//! environment.
//!
//! [`HandlerOptions::from_env`]: crate::handler::HandlerOptions::from_env

/// Minimum level for the built-in handlers, e.g. `debug` or `warn`.
pub const LEVEL_ENV: &str = "CONTEXT_ATTRS_LEVEL";

/// `true`/`1`/`yes` to include the call site in every record.
pub const ADD_SOURCE_ENV: &str = "CONTEXT_ATTRS_ADD_SOURCE";

/// Output format used by [`init_from_env`](crate::init::init_from_env):
/// `json` (default) or `text`.
pub const FORMAT_ENV: &str = "CONTEXT_ATTRS_FORMAT";

/// Read an environment variable or fall back to a provided default.
pub fn env_or(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}
