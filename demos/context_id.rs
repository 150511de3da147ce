use std::sync::Arc;

use context_attrs::json::JsonHandler;
use context_attrs::{Attr, Context, ContextHandler, HandlerOptions, Level, Logger};

/// Request identifier carried in the call context.
struct RequestId(&'static str);

fn main() {
    let ctx = Context::background().with_value(RequestId("ID-xxxxx"));

    let base = Arc::new(JsonHandler::stdout(HandlerOptions::default().level(Level::Info)));
    let handler = ContextHandler::new(base, vec![]).extractor(|ctx: &Context| {
        println!("--called");
        Attr::string("id", ctx.value::<RequestId>().map_or("none", |r| r.0))
    });
    let logger = Logger::new(Arc::new(handler));

    logger.info("do1", &[]);
    logger.info_ctx(&ctx, "do2", &[]);
    logger.info_ctx(&ctx, "do3", &[]);
    logger.info("do4", &[]);
    logger.info_ctx(&ctx, "do5", &[]);
    // Below the handler's level: no "--called" for these two.
    logger.debug("do5", &[]);
    logger.debug_ctx(&ctx, "do6", &[]);
    logger.info_ctx(&ctx, "do7", &[]);
}
