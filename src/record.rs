use crate::level::Level;
use crate::value::Attr;
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::panic::Location;

/// One log event as handed to a [`Handler`](crate::handler::Handler).
///
/// Attributes are kept in insertion order and duplicates are not merged
/// here; each handler applies its own rule when it formats the record.
#[derive(Debug, Clone)]
pub struct Record {
    pub time: DateTime<Utc>,
    pub level: Level,
    pub message: String,
    pub attrs: Vec<Attr>,
    pub source: Option<Source>,
}

impl Record {
    pub fn new(time: DateTime<Utc>, level: Level, message: impl Into<String>, source: Option<Source>) -> Self {
        Self {
            time,
            level,
            message: message.into(),
            attrs: Vec::new(),
            source,
        }
    }

    pub fn add_attr(&mut self, attr: Attr) {
        self.attrs.push(attr);
    }

    pub fn add_attrs(&mut self, attrs: impl IntoIterator<Item = Attr>) {
        self.attrs.extend(attrs);
    }
}

/// Call site a record was emitted from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Source {
    pub file: String,
    pub line: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub column: Option<u32>,
}

impl Source {
    /// Source of the nearest caller not marked `#[track_caller]`.
    #[track_caller]
    pub fn caller() -> Self {
        Self::from(Location::caller())
    }
}

impl From<&Location<'_>> for Source {
    fn from(loc: &Location<'_>) -> Self {
        Self {
            file: loc.file().to_string(),
            line: loc.line(),
            column: Some(loc.column()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn caller_points_at_this_line() {
        let line = line!() + 1;
        let source = Source::caller();
        assert_eq!(source.line, line);
        assert!(source.file.ends_with("record.rs"));
    }

    #[test]
    fn attrs_keep_insertion_order_and_duplicates() {
        let mut r = Record::new(Utc::now(), Level::Info, "msg", None);
        r.add_attr(Attr::int("a", 1));
        r.add_attrs([Attr::int("b", 2), Attr::int("a", 3)]);
        let keys: Vec<_> = r.attrs.iter().map(|a| a.key.as_str()).collect();
        assert_eq!(keys, ["a", "b", "a"]);
    }
}
