use crate::context::Context;
use crate::error::HandleError;
use crate::handler::Handler;
use crate::level::Level;
use crate::record::Record;
use crate::value::Attr;
use std::sync::Arc;

/// A handler that reports every level as disabled and drops whatever it
/// is handed anyway.
///
/// Useful for silencing the default logger and for measuring the cost
/// of the logging call itself without any formatting or I/O.
#[derive(Clone, Copy, Debug, Default)]
pub struct DiscardHandler;

impl Handler for DiscardHandler {
    fn enabled(&self, _ctx: &Context, _level: Level) -> bool {
        false
    }

    fn handle(&self, _ctx: &Context, _record: Record) -> Result<(), HandleError> {
        Ok(())
    }

    fn with_attrs(&self, _attrs: Vec<Attr>) -> Arc<dyn Handler> {
        Arc::new(*self)
    }

    fn with_group(&self, _name: &str) -> Arc<dyn Handler> {
        Arc::new(*self)
    }
}
