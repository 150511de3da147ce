use crate::context::Context;
use crate::error::HandleError;
use crate::handler::{Handler, HandlerOptions, Scope};
use crate::level::Level;
use crate::record::Record;
use crate::value::Attr;
use chrono::SecondsFormat;
use parking_lot::Mutex;
use serde_json::{Map, Value as Json};
use std::io::{self, Write};
use std::sync::Arc;

const BUILTIN_KEYS: [&str; 4] = ["time", "level", "source", "msg"];

/// Base handler writing one JSON object per record, newline terminated.
///
/// Output keys, in order: `time`, `level`, `source` (only with
/// [`HandlerOptions::add_source`]), `msg`, then attributes. When two
/// attributes share a key at the same nesting level the later one wins.
/// A top-level attribute named like a built-in key is written as
/// `attr.<key>` (`attr.level`, `attr.msg`, ...), so the record's own
/// fields are never replaced.
///
/// Handlers derived through `with_attrs` / `with_group` share the
/// writer, so their lines interleave whole, never torn.
pub struct JsonHandler<W> {
    writer: Arc<Mutex<W>>,
    options: HandlerOptions,
    scope: Scope,
}

impl<W> JsonHandler<W>
where
    W: Write + Send + 'static,
{
    pub fn new(writer: W, options: HandlerOptions) -> Self {
        Self {
            writer: Arc::new(Mutex::new(writer)),
            options,
            scope: Scope::default(),
        }
    }

    fn derive(&self, scope: Scope) -> Arc<dyn Handler> {
        Arc::new(Self {
            writer: Arc::clone(&self.writer),
            options: self.options.clone(),
            scope,
        })
    }

    fn encode(&self, record: &Record) -> Map<String, Json> {
        let mut map = Map::new();
        map.insert(
            "time".to_string(),
            Json::String(record.time.to_rfc3339_opts(SecondsFormat::AutoSi, true)),
        );
        map.insert("level".to_string(), Json::String(record.level.to_string()));
        if self.options.add_source {
            if let Some(source) = &record.source {
                // Source only holds strings and integers.
                if let Ok(v) = serde_json::to_value(source) {
                    map.insert("source".to_string(), v);
                }
            }
        }
        map.insert("msg".to_string(), Json::String(record.message.clone()));

        for attr in self.scope.assemble(&record.attrs) {
            if attr.is_empty_group() {
                continue;
            }
            let key = if BUILTIN_KEYS.contains(&attr.key.as_str()) {
                format!("attr.{}", attr.key)
            } else {
                attr.key
            };
            map.insert(key, attr.value.to_json());
        }
        map
    }
}

impl JsonHandler<io::Stdout> {
    pub fn stdout(options: HandlerOptions) -> Self {
        Self::new(io::stdout(), options)
    }
}

impl<W> Handler for JsonHandler<W>
where
    W: Write + Send + 'static,
{
    fn enabled(&self, _ctx: &Context, level: Level) -> bool {
        level >= self.options.level
    }

    fn handle(&self, _ctx: &Context, record: Record) -> Result<(), HandleError> {
        let mut line = serde_json::to_vec(&Json::Object(self.encode(&record)))?;
        line.push(b'\n');

        let mut writer = self.writer.lock();
        writer.write_all(&line)?;
        Ok(())
    }

    fn with_attrs(&self, attrs: Vec<Attr>) -> Arc<dyn Handler> {
        self.derive(self.scope.with_attrs(attrs))
    }

    fn with_group(&self, name: &str) -> Arc<dyn Handler> {
        self.derive(self.scope.with_group(name))
    }
}
