use context_attrs::context_handler::extractor;
use context_attrs::global;
use context_attrs::init::{init, Format, InitConfig};
use context_attrs::{Attr, Context, HandlerOptions};

struct UserId(u64);

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = InitConfig {
        options: HandlerOptions::default().add_source(true),
        format: Format::Json,
        ..InitConfig::default()
    };
    init(
        config,
        vec![extractor(|ctx: &Context| {
            Attr::uint("user_id", ctx.value::<UserId>().map_or(0, |u| u.0))
        })],
    )?;

    let ctx = Context::background().with_value(UserId(42));
    // `source` points at this line, not at the crate's internals.
    global::info(&ctx, "user logged in", &[Attr::string("method", "password")]);
    global::debug(&ctx, "not printed", &[]);

    Ok(())
}
