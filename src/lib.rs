//! Log handler decorator that adds attributes computed from the calling
//! [`Context`](context::Context) to every record it lets through.
//!
//! [`ContextHandler`](context_handler::ContextHandler) wraps any
//! [`Handler`](handler::Handler) and leaves level filtering, formatting
//! and output to it. [`global::info`] logs through the process-wide
//! default logger with the caller's source location.

pub mod level;
pub mod value;
pub mod context;
pub mod record;
pub mod error;
pub mod handler;
pub mod buffer;
pub mod json;
pub mod text;
pub mod discard;
pub mod context_handler;
pub mod logger;
pub mod global;
pub mod env;
pub mod init;

#[cfg(feature = "bridge")]
pub mod bridge;

pub use context::Context;
pub use context_handler::{extractor, ContextHandler, Extractor};
pub use handler::{Handler, HandlerOptions};
pub use level::Level;
pub use logger::Logger;
pub use record::{Record, Source};
pub use value::{Attr, Value};
