use crate::context::Context;
use crate::error::HandleError;
use crate::handler::{Handler, HandlerOptions, Scope};
use crate::level::Level;
use crate::record::Record;
use crate::value::{Attr, Value};
use chrono::SecondsFormat;
use parking_lot::Mutex;
use std::fmt::Write as _;
use std::io::{self, Write};
use std::sync::Arc;

/// Base handler writing `key=value` pairs, one record per line.
///
/// Group members are written with dotted keys (`req.method=GET`).
/// Duplicate keys are all written, in order.
pub struct TextHandler<W> {
    writer: Arc<Mutex<W>>,
    options: HandlerOptions,
    scope: Scope,
}

impl<W> TextHandler<W>
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

    fn encode(&self, record: &Record) -> String {
        let mut line = String::with_capacity(128);
        let _ = write!(
            line,
            "time={} level={}",
            record.time.to_rfc3339_opts(SecondsFormat::AutoSi, true),
            record.level
        );
        if self.options.add_source {
            if let Some(source) = &record.source {
                let _ = write!(line, " source={}:{}", source.file, source.line);
            }
        }
        let _ = write!(line, " msg={}", quote(&record.message));

        for attr in self.scope.assemble(&record.attrs) {
            write_attr(&mut line, "", &attr);
        }
        line.push('\n');
        line
    }
}

impl TextHandler<io::Stderr> {
    pub fn stderr(options: HandlerOptions) -> Self {
        Self::new(io::stderr(), options)
    }
}

fn write_attr(line: &mut String, prefix: &str, attr: &Attr) {
    match &attr.value {
        Value::Group(members) => {
            let prefix = format!("{}{}.", prefix, attr.key);
            for member in members {
                write_attr(line, &prefix, member);
            }
        }
        value => {
            let _ = write!(line, " {}{}={}", prefix, attr.key, quote(&value.to_string()));
        }
    }
}

fn quote(s: &str) -> String {
    let needs_quotes = s.is_empty()
        || s.chars().any(|c| c.is_whitespace() || c == '=' || c == '"' || c.is_control());
    if needs_quotes {
        format!("{:?}", s)
    } else {
        s.to_string()
    }
}

impl<W> Handler for TextHandler<W>
where
    W: Write + Send + 'static,
{
    fn enabled(&self, _ctx: &Context, level: Level) -> bool {
        level >= self.options.level
    }

    fn handle(&self, _ctx: &Context, record: Record) -> Result<(), HandleError> {
        let line = self.encode(&record);
        let mut writer = self.writer.lock();
        writer.write_all(line.as_bytes())?;
        Ok(())
    }

    fn with_attrs(&self, attrs: Vec<Attr>) -> Arc<dyn Handler> {
        self.derive(self.scope.with_attrs(attrs))
    }

    fn with_group(&self, name: &str) -> Arc<dyn Handler> {
        self.derive(self.scope.with_group(name))
    }
}
