use context_attrs::json::JsonHandler;
use context_attrs::{Attr, Context, ContextHandler, HandlerOptions, Logger};
use criterion::{criterion_group, criterion_main, Criterion};
use std::io;
use std::sync::Arc;

struct Value(&'static str);

fn bound_attr_logger(c: &mut Criterion) {
    let base = JsonHandler::new(io::sink(), HandlerOptions::default());
    let logger = Logger::new(Arc::new(base)).with(&[Attr::string("count", "xxx")]);
    let ctx = Context::background().with_value(logger);

    c.bench_function("logger_from_context_with_bound_attr", |b| {
        b.iter(|| {
            if let Some(logger) = ctx.value::<Logger>() {
                logger.info("xxx", &[]);
            }
        })
    });
}

fn context_handler(c: &mut Criterion) {
    let base = Arc::new(JsonHandler::new(io::sink(), HandlerOptions::default()));
    let handler = ContextHandler::new(base, vec![]).extractor(|ctx: &Context| {
        Attr::string("c", ctx.value::<Value>().map_or("", |v| v.0))
    });
    let logger = Logger::new(Arc::new(handler));
    let ctx = Context::background().with_value(Value("xxx"));

    c.bench_function("context_handler_info_ctx", |b| {
        b.iter(|| logger.info_ctx(&ctx, "xxx", &[]))
    });

    c.bench_function("context_handler_suppressed_debug", |b| {
        b.iter(|| logger.debug_ctx(&ctx, "xxx", &[]))
    });
}

criterion_group!(benches, bound_attr_logger, context_handler);
criterion_main!(benches);
