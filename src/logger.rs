use crate::context::Context;
use crate::handler::Handler;
use crate::level::Level;
use crate::record::{Record, Source};
use crate::value::Attr;
use chrono::Utc;
use std::fmt;
use std::sync::Arc;

/// Leveled front end over a [`Handler`].
///
/// Every entry point asks the handler whether the level is enabled
/// before a [`Record`] is built, so disabled calls cost one virtual call.
/// Records carry the [`Source`] of the code that called the logger.
/// Handler failures are dropped: logging never fails the caller.
#[derive(Clone)]
pub struct Logger {
    handler: Arc<dyn Handler>,
}

impl Logger {
    pub fn new(handler: Arc<dyn Handler>) -> Self {
        Self { handler }
    }

    pub fn handler(&self) -> &Arc<dyn Handler> {
        &self.handler
    }

    pub fn enabled(&self, ctx: &Context, level: Level) -> bool {
        self.handler.enabled(ctx, level)
    }

    /// Logger whose records all carry `attrs`.
    pub fn with(&self, attrs: &[Attr]) -> Logger {
        if attrs.is_empty() {
            return self.clone();
        }
        Logger::new(self.handler.with_attrs(attrs.to_vec()))
    }

    /// Logger that nests all further attributes under `name`.
    pub fn with_group(&self, name: &str) -> Logger {
        if name.is_empty() {
            return self.clone();
        }
        Logger::new(self.handler.with_group(name))
    }

    #[track_caller]
    pub fn log(&self, ctx: &Context, level: Level, msg: &str, attrs: &[Attr]) {
        if !self.handler.enabled(ctx, level) {
            return;
        }
        let mut record = Record::new(Utc::now(), level, msg, Some(Source::caller()));
        record.add_attrs(attrs.iter().cloned());
        let _ = self.handler.handle(ctx, record);
    }

    #[track_caller]
    pub fn debug(&self, msg: &str, attrs: &[Attr]) {
        self.log(&Context::background(), Level::Debug, msg, attrs);
    }

    #[track_caller]
    pub fn debug_ctx(&self, ctx: &Context, msg: &str, attrs: &[Attr]) {
        self.log(ctx, Level::Debug, msg, attrs);
    }

    #[track_caller]
    pub fn info(&self, msg: &str, attrs: &[Attr]) {
        self.log(&Context::background(), Level::Info, msg, attrs);
    }

    #[track_caller]
    pub fn info_ctx(&self, ctx: &Context, msg: &str, attrs: &[Attr]) {
        self.log(ctx, Level::Info, msg, attrs);
    }

    #[track_caller]
    pub fn warn(&self, msg: &str, attrs: &[Attr]) {
        self.log(&Context::background(), Level::Warn, msg, attrs);
    }

    #[track_caller]
    pub fn warn_ctx(&self, ctx: &Context, msg: &str, attrs: &[Attr]) {
        self.log(ctx, Level::Warn, msg, attrs);
    }

    #[track_caller]
    pub fn error(&self, msg: &str, attrs: &[Attr]) {
        self.log(&Context::background(), Level::Error, msg, attrs);
    }

    #[track_caller]
    pub fn error_ctx(&self, ctx: &Context, msg: &str, attrs: &[Attr]) {
        self.log(ctx, Level::Error, msg, attrs);
    }
}

impl fmt::Debug for Logger {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Logger").finish_non_exhaustive()
    }
}
