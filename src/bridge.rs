use crate::context::Context;
use crate::handler::Handler;
use crate::level::Level;
use crate::record::{Record, Source};
use crate::value::{Attr, Value};
use chrono::Utc;
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::sync::Arc;
use tracing::field::{Field, Visit};
use tracing::span;
use tracing::{Event, Subscriber};
use tracing_subscriber::layer::{Context as LayerContext, Layer};
use tracing_subscriber::registry::LookupSpan;

/// `tracing_subscriber` layer that turns `tracing` events into
/// [`Record`]s and hands them to a [`Handler`].
///
/// The spans enclosing an event are exposed to the handler as a
/// [`SpanScope`] value in the [`Context`], so extractors registered on a
/// [`ContextHandler`](crate::context_handler::ContextHandler) can read
/// span fields the same way they read any other context value.
///
/// Level filtering is left to the handler: the layer asks
/// [`Handler::enabled`] with an empty context before collecting span
/// fields or building a record, so a handler's level decision cannot
/// depend on the [`SpanScope`].
///
/// Several layers may share one registry. Span fields are stored once
/// per span, by whichever layer saw the span first.
pub struct HandlerLayer {
    id: usize,
    handler: Arc<dyn Handler>,
    /// Total events seen by the layer (before filtering by level).
    pub seen_events: Arc<AtomicU64>,
    /// Events the handler accepted and handled without error.
    pub handled_events: Arc<AtomicU64>,
    /// Events whose handler call returned an error.
    pub failed_events: Arc<AtomicU64>,
}

impl HandlerLayer {
    pub fn new(handler: Arc<dyn Handler>) -> Self {
        Self {
            id: NEXT_LAYER_ID.fetch_add(1, Ordering::Relaxed),
            handler,
            seen_events: Arc::new(AtomicU64::new(0)),
            handled_events: Arc::new(AtomicU64::new(0)),
            failed_events: Arc::new(AtomicU64::new(0)),
        }
    }
}

/// Spans enclosing a bridged event, outermost first.
#[derive(Debug, Clone, Default)]
pub struct SpanScope {
    pub spans: Vec<SpanInfo>,
}

#[derive(Debug, Clone)]
pub struct SpanInfo {
    pub name: &'static str,
    pub fields: Vec<Attr>,
}

impl SpanScope {
    /// Value of the innermost span field named `key`.
    pub fn field(&self, key: &str) -> Option<&Value> {
        self.spans
            .iter()
            .rev()
            .flat_map(|span| span.fields.iter().rev())
            .find(|attr| attr.key == key)
            .map(|attr| &attr.value)
    }

    /// Names of the enclosing spans joined with `:`, e.g. `request:db`.
    pub fn path(&self) -> String {
        self.spans.iter().map(|s| s.name).collect::<Vec<_>>().join(":")
    }
}

static NEXT_LAYER_ID: AtomicUsize = AtomicUsize::new(0);

/// Fields recorded on a span, kept in the span's extensions. Only the
/// `owner` layer appends to them.
struct SpanFields {
    owner: usize,
    fields: Vec<Attr>,
}

impl<S> Layer<S> for HandlerLayer
where
    S: Subscriber + for<'span> LookupSpan<'span>,
{
    fn on_new_span(&self, attrs: &span::Attributes<'_>, id: &span::Id, ctx: LayerContext<'_, S>) {
        let Some(span) = ctx.span(id) else { return };
        if span.extensions().get::<SpanFields>().is_some() {
            return;
        }

        let mut fields = Vec::new();
        let mut message = None;
        attrs.record(&mut FieldVisitor { attrs: &mut fields, message: &mut message });
        if let Some(message) = message {
            fields.push(Attr::string("message", message));
        }
        span.extensions_mut().insert(SpanFields { owner: self.id, fields });
    }

    fn on_record(&self, id: &span::Id, values: &span::Record<'_>, ctx: LayerContext<'_, S>) {
        let Some(span) = ctx.span(id) else { return };
        let owned = span.extensions().get::<SpanFields>().map(|f| f.owner == self.id);
        if owned == Some(false) {
            return;
        }

        let mut recorded = Vec::new();
        let mut message = None;
        values.record(&mut FieldVisitor { attrs: &mut recorded, message: &mut message });
        if let Some(message) = message {
            recorded.push(Attr::string("message", message));
        }

        let mut extensions = span.extensions_mut();
        match extensions.get_mut::<SpanFields>() {
            Some(fields) => fields.fields.extend(recorded),
            None => extensions.insert(SpanFields { owner: self.id, fields: recorded }),
        }
    }

    fn on_event(&self, event: &Event<'_>, ctx: LayerContext<'_, S>) {
        self.seen_events.fetch_add(1, Ordering::Relaxed);

        let meta = event.metadata();
        let level = Level::from(*meta.level());
        if !self.handler.enabled(&Context::background(), level) {
            return;
        }

        let spans = ctx
            .event_scope(event)
            .map(|scope| {
                scope
                    .from_root()
                    .map(|span| {
                        let fields = span
                            .extensions()
                            .get::<SpanFields>()
                            .map(|f| f.fields.clone())
                            .unwrap_or_default();
                        SpanInfo { name: span.name(), fields }
                    })
                    .collect()
            })
            .unwrap_or_default();
        let log_ctx = Context::background().with_value(SpanScope { spans });

        let mut attrs = Vec::new();
        let mut message: Option<String> = None;
        event.record(&mut FieldVisitor { attrs: &mut attrs, message: &mut message });

        let source = meta.file().map(|file| Source {
            file: file.to_string(),
            line: meta.line().unwrap_or(0),
            column: None,
        });
        let mut record = Record::new(Utc::now(), level, message.unwrap_or_default(), source);
        record.add_attrs(attrs);

        match self.handler.handle(&log_ctx, record) {
            Ok(()) => self.handled_events.fetch_add(1, Ordering::Relaxed),
            Err(_) => self.failed_events.fetch_add(1, Ordering::Relaxed),
        };
    }
}

/// Collects `tracing` fields as [`Attr`]s, pulling out `message`.
pub struct FieldVisitor<'a> {
    pub attrs: &'a mut Vec<Attr>,
    pub message: &'a mut Option<String>,
}

impl<'a> Visit for FieldVisitor<'a> {
    fn record_str(&mut self, field: &Field, value: &str) {
        if field.name() == "message" {
            *self.message = Some(value.to_string());
        } else {
            self.attrs.push(Attr::string(field.name(), value));
        }
    }

    fn record_i64(&mut self, field: &Field, value: i64) {
        self.attrs.push(Attr::int(field.name(), value));
    }

    fn record_u64(&mut self, field: &Field, value: u64) {
        self.attrs.push(Attr::uint(field.name(), value));
    }

    fn record_f64(&mut self, field: &Field, value: f64) {
        self.attrs.push(Attr::float(field.name(), value));
    }

    fn record_bool(&mut self, field: &Field, value: bool) {
        self.attrs.push(Attr::bool(field.name(), value));
    }

    fn record_debug(&mut self, field: &Field, value: &dyn std::fmt::Debug) {
        if field.name() == "message" {
            *self.message = Some(format!("{:?}", value));
        } else {
            self.attrs.push(Attr::string(field.name(), format!("{:?}", value)));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::buffer::SharedBuffer;
    use crate::context_handler::ContextHandler;
    use crate::handler::HandlerOptions;
    use crate::json::JsonHandler;
    use tracing_subscriber::layer::SubscriberExt;
    use tracing_subscriber::Registry;

    #[test]
    fn events_reach_the_handler_with_span_scope() {
        let buf = SharedBuffer::new();
        let calls = Arc::new(AtomicUsize::new(0));
        let c = Arc::clone(&calls);

        let base = Arc::new(JsonHandler::new(buf.clone(), HandlerOptions::default()));
        let handler = ContextHandler::new(base, vec![]).extractor(move |ctx: &Context| {
            c.fetch_add(1, Ordering::SeqCst);
            let scope = ctx.value::<SpanScope>();
            let id = scope.and_then(|s| s.field("request_id")).map(|v| v.to_string());
            Attr::string("id", id.unwrap_or_else(|| "none".to_string()))
        });
        let layer = HandlerLayer::new(Arc::new(handler));
        let seen = Arc::clone(&layer.seen_events);
        let handled = Arc::clone(&layer.handled_events);

        let subscriber = Registry::default().with(layer);
        tracing::subscriber::with_default(subscriber, || {
            tracing::info!("outside");
            let span = tracing::info_span!("request", request_id = "ID-xxxxx");
            let _guard = span.enter();
            tracing::debug!("suppressed");
            tracing::warn!(attempt = 2, "inside");
        });

        assert_eq!(seen.load(Ordering::Relaxed), 3);
        assert_eq!(handled.load(Ordering::Relaxed), 2);
        assert_eq!(calls.load(Ordering::SeqCst), 2);

        let lines: Vec<serde_json::Value> = buf
            .lines()
            .iter()
            .map(|l| serde_json::from_str(l).unwrap())
            .collect();
        assert_eq!(lines[0]["msg"], "outside");
        assert_eq!(lines[0]["id"], "none");
        assert_eq!(lines[1]["msg"], "inside");
        assert_eq!(lines[1]["level"], "WARN");
        assert_eq!(lines[1]["attempt"], 2);
        assert_eq!(lines[1]["id"], "ID-xxxxx");
    }

    #[test]
    fn scope_lookup_prefers_innermost_span() {
        let scope = SpanScope {
            spans: vec![
                SpanInfo { name: "outer", fields: vec![Attr::string("k", "outer")] },
                SpanInfo { name: "inner", fields: vec![Attr::string("k", "inner")] },
            ],
        };
        assert_eq!(scope.field("k").map(|v| v.to_string()), Some("inner".to_string()));
        assert_eq!(scope.path(), "outer:inner");
        assert!(scope.field("missing").is_none());
    }

    #[test]
    fn stacked_layers_share_span_fields() {
        let json_buf = SharedBuffer::new();
        let other_buf = SharedBuffer::new();
        let span_id = |ctx: &Context| {
            let scope = ctx.value::<SpanScope>();
            let ids = scope
                .map(|s| s.spans.iter().flat_map(|span| &span.fields).filter(|a| a.key == "id").count())
                .unwrap_or(0);
            Attr::uint("id_fields", ids as u64)
        };
        let first = ContextHandler::new(
            Arc::new(JsonHandler::new(json_buf.clone(), HandlerOptions::default())),
            vec![],
        )
        .extractor(span_id);
        let second = ContextHandler::new(
            Arc::new(JsonHandler::new(other_buf.clone(), HandlerOptions::default())),
            vec![],
        )
        .extractor(span_id);

        let subscriber = Registry::default()
            .with(HandlerLayer::new(Arc::new(first)))
            .with(HandlerLayer::new(Arc::new(second)));
        tracing::subscriber::with_default(subscriber, || {
            let span = tracing::info_span!("request", id = 1, user = tracing::field::Empty);
            let _guard = span.enter();
            span.record("user", "alice");
            tracing::info!("inside");
        });

        for buf in [&json_buf, &other_buf] {
            let lines = buf.lines();
            assert_eq!(lines.len(), 1);
            let v: serde_json::Value = serde_json::from_str(&lines[0]).unwrap();
            assert_eq!(v["msg"], "inside");
            assert_eq!(v["id_fields"], 1);
        }
    }

    /// Remembers whether `enabled` was ever handed a span scope.
    #[derive(Default)]
    struct ScopeSpy {
        saw_scope: std::sync::atomic::AtomicBool,
    }

    impl Handler for ScopeSpy {
        fn enabled(&self, ctx: &Context, level: Level) -> bool {
            if ctx.value::<SpanScope>().is_some() {
                self.saw_scope.store(true, Ordering::SeqCst);
            }
            level >= Level::Warn
        }

        fn handle(&self, _ctx: &Context, _record: Record) -> Result<(), crate::error::HandleError> {
            Ok(())
        }

        fn with_attrs(&self, _attrs: Vec<Attr>) -> Arc<dyn Handler> {
            Arc::new(ScopeSpy::default())
        }

        fn with_group(&self, _name: &str) -> Arc<dyn Handler> {
            Arc::new(ScopeSpy::default())
        }
    }

    #[test]
    fn level_is_checked_before_span_fields_are_collected() {
        let spy = Arc::new(ScopeSpy::default());
        let layer = HandlerLayer::new(spy.clone());
        let handled = Arc::clone(&layer.handled_events);

        tracing::subscriber::with_default(Registry::default().with(layer), || {
            let span = tracing::info_span!("hot", n = 1);
            let _guard = span.enter();
            tracing::debug!("suppressed");
            tracing::info!("suppressed");
        });

        assert_eq!(handled.load(Ordering::Relaxed), 0);
        assert!(!spy.saw_scope.load(Ordering::SeqCst));
    }
}
