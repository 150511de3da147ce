//! Process-wide default [`Logger`] and free logging functions that use it.
//!
//! The slot starts out holding a [`TextHandler`] on stderr at `INFO`.
//! Prefer passing a [`Logger`] explicitly; the slot exists for code that
//! cannot thread one through.

use crate::context::Context;
use crate::handler::HandlerOptions;
use crate::level::Level;
use crate::logger::Logger;
use crate::text::TextHandler;
use crate::value::Attr;
use lazy_static::lazy_static;
use parking_lot::RwLock;
use std::sync::Arc;

lazy_static! {
    static ref DEFAULT: RwLock<Logger> =
        RwLock::new(Logger::new(Arc::new(TextHandler::stderr(HandlerOptions::default()))));
}

/// Replace the default logger. Affects every later call in the process.
pub fn set_default(logger: Logger) {
    *DEFAULT.write() = logger;
    tracing::debug!(target: "context_attrs", "default logger replaced");
}

/// The logger currently installed, read at call time.
pub fn default_logger() -> Logger {
    DEFAULT.read().clone()
}

/// Log at `INFO` through the default logger.
///
/// Returns without building a record when the default handler has
/// `INFO` disabled for `ctx`. The record's source is the caller of this
/// function, and any handler failure is discarded.
#[track_caller]
pub fn info(ctx: &Context, msg: &str, attrs: &[Attr]) {
    log(ctx, Level::Info, msg, attrs);
}

#[track_caller]
pub fn debug(ctx: &Context, msg: &str, attrs: &[Attr]) {
    log(ctx, Level::Debug, msg, attrs);
}

#[track_caller]
pub fn warn(ctx: &Context, msg: &str, attrs: &[Attr]) {
    log(ctx, Level::Warn, msg, attrs);
}

#[track_caller]
pub fn error(ctx: &Context, msg: &str, attrs: &[Attr]) {
    log(ctx, Level::Error, msg, attrs);
}

#[track_caller]
fn log(ctx: &Context, level: Level, msg: &str, attrs: &[Attr]) {
    // The slot lock must not be held while the handler runs.
    let logger = default_logger();
    logger.log(ctx, level, msg, attrs);
}
