use crate::context::Context;
use crate::error::HandleError;
use crate::handler::Handler;
use crate::level::Level;
use crate::record::Record;
use crate::value::Attr;
use std::fmt;
use std::sync::Arc;

/// Computes one attribute from the context a record is logged with.
pub type Extractor = Arc<dyn Fn(&Context) -> Attr + Send + Sync>;

/// Box a closure as an [`Extractor`].
pub fn extractor<F>(f: F) -> Extractor
where
    F: Fn(&Context) -> Attr + Send + Sync + 'static,
{
    Arc::new(f)
}

/// Decorator that appends context-derived attributes to every record
/// before passing it to the wrapped handler.
///
/// Level filtering, formatting and output all stay with the wrapped
/// handler: [`Handler::enabled`] answers exactly what it answers, so
/// extractors never run for records it would drop.
///
/// ```
/// use context_attrs::context::Context;
/// use context_attrs::context_handler::ContextHandler;
/// use context_attrs::handler::HandlerOptions;
/// use context_attrs::json::JsonHandler;
/// use context_attrs::logger::Logger;
/// use context_attrs::value::Attr;
/// use std::sync::Arc;
///
/// struct RequestId(String);
///
/// let base = Arc::new(JsonHandler::new(std::io::sink(), HandlerOptions::default()));
/// let handler = ContextHandler::new(base, vec![]).extractor(|ctx: &Context| {
///     let id = ctx.value::<RequestId>().map(|r| r.0.clone());
///     Attr::string("id", id.unwrap_or_else(|| "none".to_string()))
/// });
///
/// let logger = Logger::new(Arc::new(handler));
/// let ctx = Context::background().with_value(RequestId("ID-xxxxx".into()));
/// logger.info_ctx(&ctx, "handled", &[]);
/// ```
///
/// # Derived handlers
///
/// By default [`Handler::with_attrs`] and [`Handler::with_group`] return
/// the wrapped handler's result as is, so a logger built with
/// `logger.with(..)` or `logger.with_group(..)` no longer runs the
/// extractors. Call [`ContextHandler::preserve_on_derive`] to have the
/// derived handler wrapped again instead.
#[derive(Clone)]
pub struct ContextHandler {
    inner: Arc<dyn Handler>,
    extractors: Vec<Extractor>,
    preserve_on_derive: bool,
}

impl ContextHandler {
    /// Wrap `inner`; `extractors` run in the order given.
    pub fn new(inner: Arc<dyn Handler>, extractors: Vec<Extractor>) -> Self {
        Self {
            inner,
            extractors,
            preserve_on_derive: false,
        }
    }

    /// Register one more extractor, run after all earlier ones.
    pub fn extractor<F>(mut self, f: F) -> Self
    where
        F: Fn(&Context) -> Attr + Send + Sync + 'static,
    {
        self.extractors.push(Arc::new(f));
        self
    }

    /// Keep injecting attributes in handlers derived through
    /// `with_attrs` / `with_group`.
    pub fn preserve_on_derive(mut self, preserve: bool) -> Self {
        self.preserve_on_derive = preserve;
        self
    }

    fn rewrap(&self, inner: Arc<dyn Handler>) -> Arc<dyn Handler> {
        if !self.preserve_on_derive {
            return inner;
        }
        Arc::new(Self {
            inner,
            extractors: self.extractors.clone(),
            preserve_on_derive: true,
        })
    }
}

impl fmt::Debug for ContextHandler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ContextHandler")
            .field("extractors", &self.extractors.len())
            .field("preserve_on_derive", &self.preserve_on_derive)
            .finish()
    }
}

impl Handler for ContextHandler {
    fn enabled(&self, ctx: &Context, level: Level) -> bool {
        self.inner.enabled(ctx, level)
    }

    fn handle(&self, ctx: &Context, mut record: Record) -> Result<(), HandleError> {
        record.attrs.reserve(self.extractors.len());
        for f in &self.extractors {
            record.add_attr(f(ctx));
        }
        self.inner.handle(ctx, record)
    }

    fn with_attrs(&self, attrs: Vec<Attr>) -> Arc<dyn Handler> {
        self.rewrap(self.inner.with_attrs(attrs))
    }

    fn with_group(&self, name: &str) -> Arc<dyn Handler> {
        self.rewrap(self.inner.with_group(name))
    }
}
