use std::sync::Arc;
use tokio::time::{sleep, Duration};
use tracing::{info, info_span, warn, Instrument};

use context_attrs::bridge::SpanScope;
use context_attrs::init::init_tracing_bridge;
use context_attrs::json::JsonHandler;
use context_attrs::{Attr, Context, ContextHandler, HandlerOptions};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let base = Arc::new(JsonHandler::stdout(HandlerOptions::default().add_source(true)));
    let handler = ContextHandler::new(base, vec![]).extractor(|ctx: &Context| {
        let path = ctx.value::<SpanScope>().map(SpanScope::path).unwrap_or_default();
        Attr::string("span", path)
    });
    init_tracing_bridge(Arc::new(handler))?;

    info!("starting service");

    let mut tasks = Vec::new();
    for user_id in 0..3u64 {
        tasks.push(tokio::spawn(
            async move {
                sleep(Duration::from_millis(10 * user_id)).await;
                warn!(reason = "invalid password", "authentication failed");
            }
            .instrument(info_span!("request", user_id)),
        ));
    }
    for task in tasks {
        task.await?;
    }

    Ok(())
}
