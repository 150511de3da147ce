use crate::context::Context;
use crate::env::{env_or, LEVEL_ENV, ADD_SOURCE_ENV};
use crate::error::{HandleError, ParseLevelError};
use crate::level::Level;
use crate::record::Record;
use crate::value::Attr;
use std::sync::Arc;

/// Destination for [`Record`]s: filters by level, formats and writes.
///
/// This is the capability set shared by every handler in the crate, the
/// base sinks ([`JsonHandler`](crate::json::JsonHandler),
/// [`TextHandler`](crate::text::TextHandler)) as well as decorators such
/// as [`ContextHandler`](crate::context_handler::ContextHandler).
/// Implementations must be safe to call from many threads at once.
pub trait Handler: Send + Sync {
    /// Whether a record at `level` would be handled.
    ///
    /// Callers check this before building a [`Record`], so it must be
    /// cheap and side-effect free.
    fn enabled(&self, ctx: &Context, level: Level) -> bool;

    /// Handle a record that already passed [`Handler::enabled`].
    ///
    /// **Returns**
    /// - `Ok(())` if the record was written.
    /// - `Err(..)` if formatting or writing failed. Nothing is retried.
    fn handle(&self, ctx: &Context, record: Record) -> Result<(), HandleError>;

    /// A handler that adds `attrs` to every record it handles, inside
    /// the currently open group.
    fn with_attrs(&self, attrs: Vec<Attr>) -> Arc<dyn Handler>;

    /// A handler that nests all subsequent attributes under `name`.
    fn with_group(&self, name: &str) -> Arc<dyn Handler>;
}

/// Options shared by the built-in base handlers.
///
/// **Fields**
/// - `level`: minimum level handled; anything below is reported as
///   disabled.
/// - `add_source`: if `true`, records carrying a
///   [`Source`](crate::record::Source) are written with it.
#[derive(Clone, Debug)]
pub struct HandlerOptions {
    pub level: Level,
    pub add_source: bool,
}

impl Default for HandlerOptions {
    fn default() -> Self {
        Self {
            level: Level::Info,
            add_source: false,
        }
    }
}

impl HandlerOptions {
    pub fn level(mut self, level: Level) -> Self {
        self.level = level;
        self
    }

    pub fn add_source(mut self, add_source: bool) -> Self {
        self.add_source = add_source;
        self
    }

    /// Build options from [`LEVEL_ENV`] and [`ADD_SOURCE_ENV`], falling
    /// back to the defaults when a variable is unset.
    pub fn from_env() -> Result<Self, ParseLevelError> {
        let level = env_or(LEVEL_ENV, Level::Info.as_str()).parse()?;
        let add_source = matches!(
            env_or(ADD_SOURCE_ENV, "false").trim().to_ascii_lowercase().as_str(),
            "1" | "true" | "yes"
        );
        Ok(Self { level, add_source })
    }
}

/// Attributes and groups accumulated through `with_attrs` / `with_group`
/// on a base handler.
#[derive(Clone, Debug)]
pub(crate) struct Scope {
    frames: Vec<Frame>,
}

#[derive(Clone, Debug)]
struct Frame {
    group: Option<String>,
    attrs: Vec<Attr>,
}

impl Default for Scope {
    fn default() -> Self {
        Self {
            frames: vec![Frame { group: None, attrs: Vec::new() }],
        }
    }
}

impl Scope {
    /// Bound attributes are resolved once, here, not per record.
    pub(crate) fn with_attrs(&self, attrs: Vec<Attr>) -> Self {
        let mut scope = self.clone();
        if let Some(frame) = scope.frames.last_mut() {
            frame.attrs.extend(attrs.iter().map(Attr::resolved));
        }
        scope
    }

    pub(crate) fn with_group(&self, name: &str) -> Self {
        let mut scope = self.clone();
        if !name.is_empty() {
            scope.frames.push(Frame {
                group: Some(name.to_string()),
                attrs: Vec::new(),
            });
        }
        scope
    }

    /// Top-level attributes for a record: bound attributes first, record
    /// attributes last, each nested under the groups open when it was
    /// added. Groups that end up empty are dropped.
    pub(crate) fn assemble(&self, record_attrs: &[Attr]) -> Vec<Attr> {
        let mut tail: Vec<Attr> = record_attrs.iter().map(Attr::resolved).collect();
        for frame in self.frames.iter().rev() {
            let mut attrs = frame.attrs.clone();
            attrs.append(&mut tail);
            tail = match &frame.group {
                Some(_) if attrs.is_empty() => Vec::new(),
                Some(name) => vec![Attr::group(name.clone(), attrs)],
                None => attrs,
            };
        }
        tail
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::value::Value;

    fn keys(attrs: &[Attr]) -> Vec<String> {
        attrs.iter().map(|a| a.key.clone()).collect()
    }

    #[test]
    fn assemble_nests_record_attrs_in_open_groups() {
        let scope = Scope::default()
            .with_attrs(vec![Attr::string("svc", "api")])
            .with_group("req")
            .with_attrs(vec![Attr::string("method", "GET")]);

        let attrs = scope.assemble(&[Attr::int("status", 200)]);
        assert_eq!(keys(&attrs), ["svc", "req"]);
        match &attrs[1].value {
            Value::Group(inner) => assert_eq!(keys(inner), ["method", "status"]),
            other => panic!("expected group, got {:?}", other),
        }
    }

    #[test]
    fn empty_groups_are_dropped() {
        let scope = Scope::default().with_group("a").with_group("b");
        assert!(scope.assemble(&[]).is_empty());
    }

    #[test]
    fn options_builder_sets_fields() {
        let opts = HandlerOptions::default().level(Level::Warn).add_source(true);
        assert_eq!(opts.level, Level::Warn);
        assert!(opts.add_source);
    }
}
