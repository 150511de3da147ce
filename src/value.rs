use chrono::{DateTime, SecondsFormat, Utc};
use std::fmt;
use std::sync::Arc;
use std::time::Duration;

/// Lazy values may produce other lazy values; give up after this many hops.
const MAX_LAZY_DEPTH: usize = 100;

/// A single key/value pair attached to a [`Record`](crate::record::Record).
#[derive(Clone, Debug)]
pub struct Attr {
    pub key: String,
    pub value: Value,
}

impl Attr {
    pub fn new(key: impl Into<String>, value: impl Into<Value>) -> Self {
        Self { key: key.into(), value: value.into() }
    }

    pub fn string(key: impl Into<String>, value: impl Into<String>) -> Self {
        Self::new(key, Value::String(value.into()))
    }

    pub fn int(key: impl Into<String>, value: i64) -> Self {
        Self::new(key, Value::I64(value))
    }

    pub fn uint(key: impl Into<String>, value: u64) -> Self {
        Self::new(key, Value::U64(value))
    }

    pub fn float(key: impl Into<String>, value: f64) -> Self {
        Self::new(key, Value::F64(value))
    }

    pub fn bool(key: impl Into<String>, value: bool) -> Self {
        Self::new(key, Value::Bool(value))
    }

    pub fn time(key: impl Into<String>, value: DateTime<Utc>) -> Self {
        Self::new(key, Value::Time(value))
    }

    pub fn duration(key: impl Into<String>, value: Duration) -> Self {
        Self::new(key, Value::Duration(value))
    }

    pub fn json(key: impl Into<String>, value: serde_json::Value) -> Self {
        Self::new(key, Value::Json(value))
    }

    pub fn group(key: impl Into<String>, attrs: Vec<Attr>) -> Self {
        Self::new(key, Value::Group(attrs))
    }

    /// Attribute whose value is computed by `f` each time a handler
    /// formats it.
    pub fn lazy<F>(key: impl Into<String>, f: F) -> Self
    where
        F: Fn() -> Value + Send + Sync + 'static,
    {
        Self::new(key, Value::Lazy(LazyValue::new(f)))
    }

    /// Returns a copy with every lazy value (including nested ones)
    /// evaluated.
    pub fn resolved(&self) -> Attr {
        Attr { key: self.key.clone(), value: self.value.resolve() }
    }

    pub(crate) fn is_empty_group(&self) -> bool {
        matches!(&self.value, Value::Group(attrs) if attrs.is_empty())
    }
}

/// Value half of an [`Attr`].
#[derive(Clone, Debug)]
pub enum Value {
    String(String),
    I64(i64),
    U64(u64),
    F64(f64),
    Bool(bool),
    Time(DateTime<Utc>),
    Duration(Duration),
    Json(serde_json::Value),
    Group(Vec<Attr>),
    Lazy(LazyValue),
}

impl Value {
    /// Evaluate lazy values until a concrete one is reached.
    ///
    /// Groups are resolved member by member.
    pub fn resolve(&self) -> Value {
        let mut current = self.clone();
        for _ in 0..MAX_LAZY_DEPTH {
            match current {
                Value::Lazy(lazy) => current = lazy.eval(),
                Value::Group(attrs) => {
                    return Value::Group(attrs.iter().map(Attr::resolved).collect());
                }
                other => return other,
            }
        }
        Value::String("!ERROR: lazy value did not resolve".to_string())
    }

    /// JSON form used by [`JsonHandler`](crate::json::JsonHandler).
    ///
    /// Expects a resolved value; a lazy one is evaluated on the spot.
    pub fn to_json(&self) -> serde_json::Value {
        use serde_json::Value as Json;
        match self {
            Value::String(s) => Json::String(s.clone()),
            Value::I64(v) => Json::from(*v),
            Value::U64(v) => Json::from(*v),
            Value::F64(v) => Json::from(*v),
            Value::Bool(v) => Json::Bool(*v),
            Value::Time(t) => Json::String(t.to_rfc3339_opts(SecondsFormat::AutoSi, true)),
            Value::Duration(d) => Json::from(u64::try_from(d.as_nanos()).unwrap_or(u64::MAX)),
            Value::Json(v) => v.clone(),
            Value::Group(attrs) => {
                let mut map = serde_json::Map::new();
                for attr in attrs.iter().filter(|a| !a.is_empty_group()) {
                    map.insert(attr.key.clone(), attr.value.to_json());
                }
                Json::Object(map)
            }
            Value::Lazy(_) => self.resolve().to_json(),
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::String(s) => f.write_str(s),
            Value::I64(v) => write!(f, "{}", v),
            Value::U64(v) => write!(f, "{}", v),
            Value::F64(v) => write!(f, "{}", v),
            Value::Bool(v) => write!(f, "{}", v),
            Value::Time(t) => f.write_str(&t.to_rfc3339_opts(SecondsFormat::AutoSi, true)),
            Value::Duration(d) => write!(f, "{:?}", d),
            Value::Json(v) => write!(f, "{}", v),
            Value::Group(attrs) => {
                f.write_str("[")?;
                for (i, attr) in attrs.iter().enumerate() {
                    if i > 0 {
                        f.write_str(" ")?;
                    }
                    write!(f, "{}={}", attr.key, attr.value)?;
                }
                f.write_str("]")
            }
            Value::Lazy(_) => write!(f, "{}", self.resolve()),
        }
    }
}

/// Deferred value: the closure runs each time the value is resolved.
#[derive(Clone)]
pub struct LazyValue(Arc<dyn Fn() -> Value + Send + Sync>);

impl LazyValue {
    pub fn new<F>(f: F) -> Self
    where
        F: Fn() -> Value + Send + Sync + 'static,
    {
        Self(Arc::new(f))
    }

    pub fn eval(&self) -> Value {
        (self.0)()
    }
}

impl fmt::Debug for LazyValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("LazyValue(..)")
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Value::String(v.to_string())
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Value::String(v)
    }
}

impl From<i64> for Value {
    fn from(v: i64) -> Self {
        Value::I64(v)
    }
}

impl From<i32> for Value {
    fn from(v: i32) -> Self {
        Value::I64(v as i64)
    }
}

impl From<u64> for Value {
    fn from(v: u64) -> Self {
        Value::U64(v)
    }
}

impl From<u32> for Value {
    fn from(v: u32) -> Self {
        Value::U64(v as u64)
    }
}

impl From<usize> for Value {
    fn from(v: usize) -> Self {
        Value::U64(v as u64)
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Value::F64(v)
    }
}

impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Value::Bool(v)
    }
}

impl From<DateTime<Utc>> for Value {
    fn from(v: DateTime<Utc>) -> Self {
        Value::Time(v)
    }
}

impl From<Duration> for Value {
    fn from(v: Duration) -> Self {
        Value::Duration(v)
    }
}

impl From<serde_json::Value> for Value {
    fn from(v: serde_json::Value) -> Self {
        Value::Json(v)
    }
}

impl From<Vec<Attr>> for Value {
    fn from(v: Vec<Attr>) -> Self {
        Value::Group(v)
    }
}
