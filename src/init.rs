use crate::context_handler::{ContextHandler, Extractor};
use crate::env::{env_or, FORMAT_ENV};
use crate::error::InitError;
use crate::global;
use crate::handler::{Handler, HandlerOptions};
use crate::json::JsonHandler;
use crate::logger::Logger;
use crate::text::TextHandler;
use std::str::FromStr;
use std::sync::Arc;

/// Output format of the base handler built by [`init`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum Format {
    /// [`JsonHandler`] on stdout.
    #[default]
    Json,
    /// [`TextHandler`] on stderr.
    Text,
}

impl FromStr for Format {
    type Err = InitError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "json" => Ok(Format::Json),
            "text" | "logfmt" => Ok(Format::Text),
            other => Err(InitError::Format(other.to_string())),
        }
    }
}

/// Wiring performed by [`init`].
///
/// **Fields**
/// - `options`: level and source settings for the base handler.
/// - `format`: which base handler to build.
/// - `preserve_on_derive`: forwarded to
///   [`ContextHandler::preserve_on_derive`].
/// - `bridge_tracing`: if `true`, a global `tracing` subscriber is
///   installed that forwards `tracing` events into the same handler
///   (requires the `bridge` feature).
#[derive(Clone, Debug, Default)]
pub struct InitConfig {
    pub options: HandlerOptions,
    pub format: Format,
    pub preserve_on_derive: bool,
    pub bridge_tracing: bool,
}

impl InitConfig {
    /// Read level, source and format settings from the environment; see
    /// [`env`](crate::env).
    pub fn from_env() -> Result<Self, InitError> {
        Ok(Self {
            options: HandlerOptions::from_env()?,
            format: env_or(FORMAT_ENV, "json").parse()?,
            ..Self::default()
        })
    }
}

/// Build a [`ContextHandler`] around the configured base handler,
/// install it as the default logger and return that logger.
///
/// **Parameters**
/// - `config`: [`InitConfig`] selecting the base handler.
/// - `extractors`: run, in order, for every record that passes the
///   base handler's level filter.
pub fn init(config: InitConfig, extractors: Vec<Extractor>) -> Result<Logger, InitError> {
    let base: Arc<dyn Handler> = match config.format {
        Format::Json => Arc::new(JsonHandler::stdout(config.options.clone())),
        Format::Text => Arc::new(TextHandler::stderr(config.options.clone())),
    };
    let handler: Arc<dyn Handler> = Arc::new(
        ContextHandler::new(base, extractors).preserve_on_derive(config.preserve_on_derive),
    );

    if config.bridge_tracing {
        install_bridge(Arc::clone(&handler))?;
    }

    let logger = Logger::new(handler);
    global::set_default(logger.clone());
    tracing::debug!(
        target: "context_attrs",
        format = ?config.format,
        level = %config.options.level,
        "logging initialized"
    );
    Ok(logger)
}

/// [`init`] with [`InitConfig::from_env`].
pub fn init_from_env(extractors: Vec<Extractor>) -> Result<Logger, InitError> {
    init(InitConfig::from_env()?, extractors)
}

/// Install a global `tracing` subscriber made of a
/// [`Registry`](tracing_subscriber::Registry) and a
/// [`HandlerLayer`](crate::bridge::HandlerLayer) forwarding to `handler`.
#[cfg(feature = "bridge")]
pub fn init_tracing_bridge(handler: Arc<dyn Handler>) -> Result<(), InitError> {
    use crate::bridge::HandlerLayer;
    use tracing_subscriber::layer::SubscriberExt;
    use tracing_subscriber::Registry;

    let subscriber = Registry::default().with(HandlerLayer::new(handler));
    tracing::subscriber::set_global_default(subscriber)?;
    Ok(())
}

#[cfg(feature = "bridge")]
fn install_bridge(handler: Arc<dyn Handler>) -> Result<(), InitError> {
    init_tracing_bridge(handler)
}

#[cfg(not(feature = "bridge"))]
fn install_bridge(_handler: Arc<dyn Handler>) -> Result<(), InitError> {
    Err(InitError::BridgeFeatureDisabled)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn format_parses_known_names() {
        assert_eq!("JSON".parse::<Format>().unwrap(), Format::Json);
        assert_eq!("logfmt".parse::<Format>().unwrap(), Format::Text);
        assert!(matches!("xml".parse::<Format>(), Err(InitError::Format(f)) if f == "xml"));
    }
}
